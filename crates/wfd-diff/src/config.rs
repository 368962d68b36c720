//! Alignment tunables, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// Default cost of inserting or deleting one node.
pub const INDEL_COST: f64 = 1.0;

/// Match quality below which two nodes may not be substituted.
pub const SUBSTITUTION_THRESHOLD: f64 = 0.5;

/// Tolerance used when retracing the alignment grid.
pub const BACKTRACE_EPSILON: f64 = 1e-6;

/// Tunables for one structural comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Cost of a single insertion or deletion.
    pub indel_cost: f64,
    /// Nodes whose match quality falls below this cannot be aligned.
    pub substitution_threshold: f64,
    /// Floating point tolerance for backtrace transitions.
    pub epsilon: f64,
    /// When `false`, aligned pairs without any real difference (and no
    /// children) are left out of the diff tree.
    pub include_pseudo_conflicts: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            indel_cost: INDEL_COST,
            substitution_threshold: SUBSTITUTION_THRESHOLD,
            epsilon: BACKTRACE_EPSILON,
            include_pseudo_conflicts: true,
        }
    }
}

impl DiffConfig {
    /// Only report nodes that actually differ.
    pub fn changes_only() -> Self {
        Self {
            include_pseudo_conflicts: false,
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys take their default value.
    pub fn from_toml_str(text: &str) -> DiffResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| DiffError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> DiffResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DiffError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Reject values the alignment cannot work with.
    pub fn validate(&self) -> DiffResult<()> {
        if !(self.indel_cost > 0.0 && self.indel_cost.is_finite()) {
            return Err(DiffError::Config(format!(
                "indel_cost must be positive, got {}",
                self.indel_cost
            )));
        }
        if !(0.0..=1.0).contains(&self.substitution_threshold) {
            return Err(DiffError::Config(format!(
                "substitution_threshold must lie in [0, 1], got {}",
                self.substitution_threshold
            )));
        }
        if !(self.epsilon > 0.0) {
            return Err(DiffError::Config(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DiffConfig::default();
        assert_eq!(c.indel_cost, 1.0);
        assert_eq!(c.substitution_threshold, 0.5);
        assert_eq!(c.epsilon, 1e-6);
        assert!(c.include_pseudo_conflicts);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn changes_only_keeps_costs() {
        let c = DiffConfig::changes_only();
        assert!(!c.include_pseudo_conflicts);
        assert_eq!(c.indel_cost, INDEL_COST);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c = DiffConfig::from_toml_str("include_pseudo_conflicts = false\n").unwrap();
        assert!(!c.include_pseudo_conflicts);
        assert_eq!(c.indel_cost, 1.0);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(DiffConfig::from_toml_str("").unwrap(), DiffConfig::default());
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            DiffConfig::from_toml_str("indel_cost = 0.0"),
            Err(DiffError::Config(_))
        ));
        assert!(matches!(
            DiffConfig::from_toml_str("substitution_threshold = 1.5"),
            Err(DiffError::Config(_))
        ));
        assert!(matches!(
            DiffConfig::from_toml_str("epsilon = -1.0"),
            Err(DiffError::Config(_))
        ));
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(
            DiffConfig::from_toml_str("indel_cost = \"one\""),
            Err(DiffError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wfd.toml");
        std::fs::write(&path, "indel_cost = 2.0\n").unwrap();
        let c = DiffConfig::load(&path).unwrap();
        assert_eq!(c.indel_cost, 2.0);
    }
}
