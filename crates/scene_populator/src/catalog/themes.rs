//! Visual themes applied to rooms and corridors

use super::CatalogError;
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decorative theme: palette, style and prop modifiers
///
/// Themes only feed placement tags; they never change positions or counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name
    pub name: String,
    /// Color names, primary first
    #[serde(default)]
    pub palette: Vec<String>,
    /// Overall style tag
    pub style_tag: String,
    /// Lighting mood
    #[serde(default)]
    pub lighting: String,
    /// Adjectives applied to props in this theme
    #[serde(default)]
    pub prop_modifiers: Vec<String>,
}

impl Theme {
    fn stock(name: &str, palette: [&str; 3], style_tag: &str, lighting: &str, modifiers: [&str; 3]) -> Self {
        Self {
            name: name.to_string(),
            palette: palette.iter().map(|c| (*c).to_string()).collect(),
            style_tag: style_tag.to_string(),
            lighting: lighting.to_string(),
            prop_modifiers: modifiers.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    /// Tags attached to every placement made under this theme
    pub fn tags(&self) -> Vec<String> {
        vec![format!("theme:{}", self.name), format!("style:{}", self.style_tag)]
    }
}

/// Lookup from theme name to theme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCatalog {
    /// Themes keyed by name
    #[serde(default)]
    pub themes: BTreeMap<String, Theme>,
}

impl ThemeCatalog {
    /// Build a catalog from themes
    pub fn from_themes(themes: impl IntoIterator<Item = Theme>) -> Self {
        Self {
            themes: themes.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    /// The five stock themes
    pub fn builtin() -> Self {
        Self::from_themes([
            Theme::stock("military", ["gray", "dark_green", "black"], "utilitarian", "harsh", ["armor", "weapon", "tactical"]),
            Theme::stock("luxury", ["gold", "white", "cream"], "elegant", "warm", ["plush", "ornate", "premium"]),
            Theme::stock("industrial", ["rust", "steel", "orange"], "functional", "bright", ["worn", "heavy_duty", "rugged"]),
            Theme::stock("civilian", ["blue", "white", "tan"], "comfortable", "soft", ["clean", "modern", "efficient"]),
            Theme::stock("alien", ["purple", "green", "cyan"], "organic", "bioluminescent", ["exotic", "strange", "advanced"]),
        ])
    }

    /// Look up a theme by name
    pub fn lookup(&self, name: &str) -> Result<&Theme, CatalogError> {
        self.themes.get(name).ok_or_else(|| CatalogError::NotFound {
            kind: "theme",
            name: name.to_string(),
        })
    }

    /// Number of themes
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

impl Config for ThemeCatalog {}
