use std::env;

use crate::utils::errors::{DBError, Result};

/// Partitions at or below this many entries are scanned on a single thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 100;

/// Environment variable overriding [`IndexConfig::parallel_threshold`].
pub const PARALLEL_THRESHOLD_ENV: &str = "VECTORDB_PARALLEL_THRESHOLD";

/// Tuning knobs for a [`VectorIndex`](crate::VectorIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Largest partition scanned without splitting. Must be at least 1.
    pub parallel_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl IndexConfig {
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Defaults, overridden by `VECTORDB_PARALLEL_THRESHOLD` when it is set.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(env::var(PARALLEL_THRESHOLD_ENV))
    }

    fn from_env_value(value: std::result::Result<String, env::VarError>) -> Result<Self> {
        let config = match value {
            Ok(raw) => Self::default().with_parallel_threshold(parse_threshold(&raw)?),
            Err(env::VarError::NotPresent) => Self::default(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(DBError::InvalidConfig(format!(
                    "{PARALLEL_THRESHOLD_ENV} is not valid unicode"
                )));
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.parallel_threshold == 0 {
            return Err(DBError::InvalidConfig(
                "parallel_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_threshold(raw: &str) -> Result<usize> {
    raw.trim().parse::<usize>().map_err(|e| {
        DBError::InvalidConfig(format!("{PARALLEL_THRESHOLD_ENV}={raw:?}: {e}"))
    })
}
