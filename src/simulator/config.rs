//! Economy tester configuration.

use crate::core::balance::{BalanceConfig, FeatureFlags};
use crate::core::constants::{
    DEFAULT_MAX_CHAPTERS, DEFAULT_MAX_ITERATIONS, DEFAULT_SEED, MAX_LOOTS_PER_PHASE,
};
use crate::core::data::Ruleset;
use crate::core::error::Result;

/// Configuration for one tester run.
#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// Stop once this chapter is cleared
    pub max_chapters: u32,

    /// Safety cap on loop iterations plus loots
    pub max_iterations: u64,

    /// Loot attempts allowed after a defeat before fighting again
    pub max_loots_per_phase: u32,

    /// Seed for the run's ChaCha8 RNG
    pub seed: u64,

    /// Balance tunables, already merged with any overrides
    pub balance: BalanceConfig,

    /// Log every cleared chapter at info level
    pub verbose: bool,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            max_chapters: DEFAULT_MAX_CHAPTERS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_loots_per_phase: MAX_LOOTS_PER_PHASE,
            seed: DEFAULT_SEED,
            balance: BalanceConfig::default(),
            verbose: false,
        }
    }
}

impl TesterConfig {
    /// Quick config for checking the first few chapters
    pub fn quick(max_chapters: u32, seed: u64) -> Self {
        Self {
            max_chapters,
            seed,
            ..Default::default()
        }
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.balance.features = features;
        self
    }

    /// Validates the balance and binds it to the embedded data tables.
    pub fn ruleset(&self) -> Result<Ruleset> {
        Ruleset::with_balance(self.balance.clone())
    }
}
