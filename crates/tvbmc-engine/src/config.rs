use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Options for an evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest timestep checked; the loop covers `start_from..=bound`.
    pub bound: usize,
    /// First timestep whose property formula is queried.
    pub start_from: usize,
    /// Overall wall-clock budget in seconds, 0 for none.
    pub timeout_secs: u64,
    /// Maximum abstract/concrete refinement rounds.
    pub max_refinements: usize,
    /// Write every query (and every model) into this directory.
    pub dump_queries: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bound: 10,
            start_from: 0,
            timeout_secs: 0,
            max_refinements: 32,
            dump_queries: None,
        }
    }
}

impl EngineConfig {
    pub fn with_bound(bound: usize) -> Self {
        Self {
            bound,
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.start_from > self.bound {
            return Err(EngineError::Configuration(format!(
                "start_from ({}) exceeds bound ({})",
                self.start_from, self.bound
            )));
        }
        if self.max_refinements == 0 {
            return Err(EngineError::Configuration(
                "max_refinements must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
