//! License ledger configuration.

use serde::{Deserialize, Serialize};

/// License ledger configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Pools to register at startup, before any checkout traffic.
    ///
    /// Pools already present in the persistence collaborator take
    /// precedence; a seed entry whose name collides with a loaded pool
    /// is skipped.
    #[serde(default)]
    pub seed_pools: Vec<SeedPool>,
}

/// A pool declared administratively in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPool {
    /// Unique pool name, e.g. `"abaqus"`.
    pub name: String,
    /// Total capacity in interchangeable units.
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_pools_from_toml() {
        let cfg: LedgerConfig = toml_from_str(
            r#"
            [[seed_pools]]
            name = "matlab"
            total = 25
            "#,
        );
        assert_eq!(cfg.seed_pools.len(), 1);
        assert_eq!(cfg.seed_pools[0].name, "matlab");
        assert_eq!(cfg.seed_pools[0].total, 25);
    }

    fn toml_from_str(raw: &str) -> LedgerConfig {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("deserialize config")
    }
}
