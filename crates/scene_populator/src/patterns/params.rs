//! Pattern parameters and specs

use super::PatternError;
use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single pattern parameter: a scalar or a short tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Scalar parameter such as `spacing` or `radius`
    Number(f64),
    /// Tuple parameter such as `start` or `direction`
    Tuple(Vec<f64>),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec3> for ParamValue {
    fn from(value: Vec3) -> Self {
        Self::Tuple(vec![value.x, value.y, value.z])
    }
}

impl From<[f64; 3]> for ParamValue {
    fn from(value: [f64; 3]) -> Self {
        Self::Tuple(value.to_vec())
    }
}

/// Named numeric parameters of a pattern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternParams(BTreeMap<String, ParamValue>);

impl PatternParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set a parameter
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Set a parameter in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Remove a parameter, returning it
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.0.remove(name)
    }

    /// Raw parameter lookup
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Scalar parameter, or `default` when absent
    pub fn number(&self, pattern: &str, name: &str, default: f64) -> Result<f64, PatternError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(ParamValue::Number(value)) if value.is_finite() => Ok(*value),
            Some(ParamValue::Number(value)) => Err(PatternError::invalid(pattern, name, format!("{value} is not finite"))),
            Some(ParamValue::Tuple(_)) => Err(PatternError::invalid(pattern, name, "expected a number, got a tuple")),
        }
    }

    /// Three-component parameter, or `default` when absent
    pub fn vector(&self, pattern: &str, name: &str, default: Vec3) -> Result<Vec3, PatternError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(ParamValue::Tuple(values)) if values.len() == 3 && values.iter().all(|v| v.is_finite()) => {
                Ok(Vec3::new(values[0], values[1], values[2]))
            }
            Some(ParamValue::Tuple(values)) => Err(PatternError::invalid(
                pattern,
                name,
                format!("expected three finite components, got {values:?}"),
            )),
            Some(ParamValue::Number(_)) => Err(PatternError::invalid(pattern, name, "expected a tuple, got a number")),
        }
    }
}

/// Request for a position list: pattern name, count, parameters and center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Pattern name (`grid`, `random_sphere`, `cluster`, `orbit`, `spiral`, `line`, `belt`)
    pub pattern_name: String,
    /// Number of positions wanted
    pub count: usize,
    /// Pattern parameters
    #[serde(default)]
    pub parameters: PatternParams,
    /// Pattern center (or start point, for `line`)
    #[serde(default = "zero_center")]
    pub center: Vec3,
}

fn zero_center() -> Vec3 {
    Vec3::zeros()
}

impl PatternSpec {
    /// Create a spec centered on the origin with no parameters
    pub fn new(pattern_name: impl Into<String>, count: usize) -> Self {
        Self {
            pattern_name: pattern_name.into(),
            count,
            parameters: PatternParams::new(),
            center: Vec3::zeros(),
        }
    }

    /// Builder pattern: set a parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name, value);
        self
    }

    /// Builder pattern: set the center
    #[must_use]
    pub const fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_defaults_and_type_checks() {
        let params = PatternParams::new().with("spacing", 250.0).with("start", [1.0, 2.0, 3.0]);

        assert_eq!(params.number("grid", "spacing", 5000.0).unwrap(), 250.0);
        assert_eq!(params.number("grid", "missing", 5000.0).unwrap(), 5000.0);
        assert!(params.number("line", "start", 0.0).is_err());
        assert_eq!(params.vector("line", "start", Vec3::zeros()).unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert!(params.vector("grid", "spacing", Vec3::zeros()).is_err());
    }

    #[test]
    fn test_short_tuple_is_rejected() {
        let params = PatternParams::new().with("direction", ParamValue::Tuple(vec![1.0, 0.0]));

        assert!(matches!(
            params.vector("line", "direction", Vec3::x()),
            Err(PatternError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_params_from_yaml_mixed_values() {
        let params: PatternParams = serde_yaml::from_str("spacing: 100\ndirection: [0, 1, 0]\n").unwrap();

        assert_eq!(params.get("spacing"), Some(&ParamValue::Number(100.0)));
        assert_eq!(params.get("direction"), Some(&ParamValue::Tuple(vec![0.0, 1.0, 0.0])));
    }
}
