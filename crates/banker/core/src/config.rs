//! Configuration documents for building a ledger.

use serde::{Deserialize, Serialize};

use crate::types::Units;

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankerConfig {
    /// Size limits applied while validating the ledger
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Initial ledger contents
    pub ledger: LedgerSpec,
}

/// Upper bounds on configuration size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of processes
    #[serde(default = "default_max_processes")]
    pub max_processes: usize,

    /// Maximum number of resource types
    #[serde(default = "default_max_resources")]
    pub max_resources: usize,

    /// Maximum total units of any single resource type
    #[serde(default = "default_max_units")]
    pub max_units: Units,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_processes: default_max_processes(),
            max_resources: default_max_resources(),
            max_units: default_max_units(),
        }
    }
}

fn default_max_processes() -> usize {
    1024
}

fn default_max_resources() -> usize {
    64
}

fn default_max_units() -> Units {
    1 << 32
}

/// Operator input for `configure`: counts, totals and the two matrices.
///
/// Rows of `max_claims` and `allocations` are indexed by process, columns by
/// resource. An empty `allocations` list means nothing is held yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSpec {
    pub processes: usize,
    pub resources: usize,
    pub totals: Vec<Units>,
    pub max_claims: Vec<Vec<Units>>,
    #[serde(default)]
    pub allocations: Vec<Vec<Units>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_default_when_omitted() {
        let config: BankerConfig = serde_json::from_str(
            r#"{
                "ledger": {
                    "processes": 1,
                    "resources": 2,
                    "totals": [3, 4],
                    "max_claims": [[1, 2]]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.limits, LimitsConfig::default());
        assert!(config.ledger.allocations.is_empty());
        assert_eq!(config.ledger.totals, vec![3, 4]);
    }

    #[test]
    fn partial_limits_keep_other_defaults() {
        let limits: LimitsConfig = serde_json::from_str(r#"{ "max_processes": 8 }"#).unwrap();
        assert_eq!(limits.max_processes, 8);
        assert_eq!(limits.max_resources, 64);
        assert_eq!(limits.max_units, 1 << 32);
    }
}
