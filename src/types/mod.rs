//! Common types used throughout the engine.

mod node_id;

pub use node_id::NodeId;

use crate::error::{BTreeError, Result};
use serde::{Deserialize, Serialize};

/// Smallest minimum degree that still yields a valid B-tree
pub const MIN_DEGREE: usize = 2;

/// Minimum degree used by `BTreeConfig::default()`
pub const DEFAULT_MIN_DEGREE: usize = 2;

/// BTree configuration
///
/// The minimum degree `t` bounds every non-root node to `t - 1 ..= 2t - 1`
/// keys. It is fixed for the lifetime of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BTreeConfig {
    /// Minimum degree `t`
    pub min_degree: usize,
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
        }
    }
}

impl BTreeConfig {
    /// Create a new config, rejecting degrees below [`MIN_DEGREE`]
    pub fn new(min_degree: usize) -> Result<Self> {
        let config = Self { min_degree };
        config.validate()?;
        Ok(config)
    }

    /// Check the config can back a tree
    pub fn validate(&self) -> Result<()> {
        if self.min_degree < MIN_DEGREE {
            return Err(BTreeError::InvalidConfiguration {
                min_degree: self.min_degree,
            });
        }
        Ok(())
    }

    /// Most keys a node may hold (`2t - 1`)
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Fewest keys a non-root node may hold (`t - 1`)
    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_bounds() {
        let config = BTreeConfig::new(3).unwrap();
        assert_eq!(config.max_keys(), 5);
        assert_eq!(config.min_keys(), 2);

        let default = BTreeConfig::default();
        assert_eq!(default.min_degree, 2);
        assert_eq!(default.max_keys(), 3);
    }

    #[test]
    fn test_config_rejects_small_degree() {
        assert!(matches!(
            BTreeConfig::new(1),
            Err(BTreeError::InvalidConfiguration { min_degree: 1 })
        ));
        assert!(matches!(
            BTreeConfig::new(0),
            Err(BTreeError::InvalidConfiguration { min_degree: 0 })
        ));
    }

    #[test]
    fn test_config_serde() {
        let config = BTreeConfig::new(4).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"minDegree":4}"#);

        let back: BTreeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
