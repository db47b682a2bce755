//! Scene composition
//!
//! [`SceneComposer`] resolves population requests (spawn groups, rooms,
//! corridors, station interiors, explicit instances, space layouts and whole
//! sectors) into [`PlacementRequest`]s,
//! hands each one to its [`InstantiationGateway`](crate::gateway::InstantiationGateway)
//! and records the returned handle in a [`SpawnRegistry`] so the whole batch
//! can be torn down again with [`SceneComposer::clear_all`].
//!
//! Batches are best-effort: a bad entry, a missing asset mapping or a refused
//! instantiation is logged and counted in the [`BatchReport`], and the rest of
//! the batch carries on.

mod interior;
mod registry;
mod scene;
mod space;

pub use interior::{MAX_CORRIDOR_SEGMENTS, MAX_ROOM_PROPS};
pub use registry::SpawnRegistry;
pub use scene::SceneComposer;
pub use space::{
    CombatLayout, EffectKind, FactionAssets, JumpGateNetwork, SectorAssets, SectorLayout, TerritoryLayout,
};

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::foundation::math::Pose;
use crate::gateway::GatewayError;
use crate::patterns::PatternError;
use crate::placement::PlacementError;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// One instance to create: asset, pose and descriptive tags
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    /// Asset to instantiate
    pub asset_reference: String,
    /// Where and how to place it
    pub pose: Pose,
    /// Free-form tags (`room:bridge`, `prop:console`, `theme:military`)
    pub tags: BTreeSet<String>,
}

impl PlacementRequest {
    /// Create an untagged request
    pub fn new(asset_reference: impl Into<String>, pose: Pose) -> Self {
        Self {
            asset_reference: asset_reference.into(),
            pose,
            tags: BTreeSet::new(),
        }
    }

    /// Builder pattern: add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Builder pattern: add several tags
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Whether the request carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Running counts of what a composer did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Instances the gateway created
    pub created: usize,
    /// Entries, groups or props dropped before reaching the gateway
    pub skipped: usize,
    /// Instantiations the gateway refused
    pub errored: usize,
    /// Slots a bounded random placement could not fill
    pub underfilled: usize,
}

impl BatchReport {
    /// Counts accumulated since an earlier snapshot of the same report
    pub const fn since(&self, earlier: &Self) -> Self {
        Self {
            created: self.created.saturating_sub(earlier.created),
            skipped: self.skipped.saturating_sub(earlier.skipped),
            errored: self.errored.saturating_sub(earlier.errored),
            underfilled: self.underfilled.saturating_sub(earlier.underfilled),
        }
    }

    /// Add another report's counts to this one
    pub fn merge(&mut self, other: &Self) {
        self.created += other.created;
        self.skipped += other.skipped;
        self.errored += other.errored;
        self.underfilled += other.underfilled;
    }

    /// Whether nothing was skipped, refused or under-filled
    pub const fn is_clean(&self) -> bool {
        self.skipped == 0 && self.errored == 0 && self.underfilled == 0
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, skipped {}, errored {}, underfilled {}",
            self.created, self.skipped, self.errored, self.underfilled
        )
    }
}

/// Composer errors
#[derive(Debug, Error)]
pub enum PopulateError {
    /// Pattern could not be evaluated
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Room footprint is unusable
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Room type or theme lookup failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The gateway refused an operation
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Config or export file problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A direct API argument is unusable
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl PopulateError {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_tags() {
        let request = PlacementRequest::new("/Game/SM_Crate", Pose::identity())
            .with_tag("prop:crate")
            .with_tags(["room:cargo_bay", "theme:industrial"]);

        assert!(request.has_tag("room:cargo_bay"));
        assert!(!request.has_tag("room:bridge"));
        assert_eq!(request.tags.len(), 3);
    }

    #[test]
    fn test_report_since_and_merge() {
        let earlier = BatchReport { created: 2, skipped: 1, errored: 0, underfilled: 0 };
        let now = BatchReport { created: 7, skipped: 1, errored: 2, underfilled: 3 };
        let batch = now.since(&earlier);

        assert_eq!(batch, BatchReport { created: 5, skipped: 0, errored: 2, underfilled: 3 });
        assert!(!batch.is_clean());

        let mut total = BatchReport::default();
        total.merge(&batch);
        total.merge(&batch);
        assert_eq!(total.created, 10);
        assert_eq!(total.to_string(), "created 10, skipped 0, errored 4, underfilled 6");
    }
}
