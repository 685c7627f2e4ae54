//! Embedded game data tables.
//!
//! The lamp, stage and experience tables ship as JSON under `data/` and are
//! parsed once into an immutable [`GameData`]. Lookups past the end of a table
//! clamp to its last row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::balance::BalanceConfig;
use super::error::{ConfigError, Result};
use crate::items::types::{Rarity, Slot};

const LAMP_LEVELS_JSON: &str = include_str!("../../data/lamp_levels.json");
const STAGES_JSON: &str = include_str!("../../data/stages.json");
const EXPERIENCE_JSON: &str = include_str!("../../data/experience.json");

/// One lamp level: the gold price to reach it and its rarity weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LampLevelRow {
    pub level: u32,
    pub price: u64,
    pub weights: BTreeMap<Rarity, f64>,
}

/// Base enemy power and XP reward for one global stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRow {
    pub stage: u32,
    pub power: u64,
    pub xp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceRow {
    pub level: u32,
    pub xp_to_next: u64,
}

/// Validated, immutable data tables.
#[derive(Debug, Clone, PartialEq)]
pub struct GameData {
    lamp_levels: Vec<LampLevelRow>,
    stages: Vec<StageRow>,
    experience: Vec<ExperienceRow>,
}

impl GameData {
    /// Parses and validates the tables embedded in the binary.
    pub fn load() -> Result<Self> {
        Self::from_json(LAMP_LEVELS_JSON, STAGES_JSON, EXPERIENCE_JSON)
    }

    pub fn from_json(lamp_levels: &str, stages: &str, experience: &str) -> Result<Self> {
        Self::from_tables(
            serde_json::from_str(lamp_levels)?,
            serde_json::from_str(stages)?,
            serde_json::from_str(experience)?,
        )
    }

    pub fn from_tables(
        lamp_levels: Vec<LampLevelRow>,
        stages: Vec<StageRow>,
        experience: Vec<ExperienceRow>,
    ) -> Result<Self> {
        let data = Self {
            lamp_levels,
            stages,
            experience,
        };
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> Result<()> {
        for slot in Slot::ALL {
            let (hp, damage) = slot.stat_ratios();
            if (hp + damage - 1.0).abs() > 1e-9 {
                return Err(ConfigError::SlotRatios {
                    slot,
                    sum: hp + damage,
                });
            }
        }

        if self.lamp_levels.is_empty() {
            return Err(ConfigError::EmptyTable("lamp_levels"));
        }
        for (row, entry) in self.lamp_levels.iter().enumerate() {
            check_sequence("lamp_levels", row, entry.level)?;
            if entry.weights.values().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(bad_row("lamp_levels", row, "weights must be non-negative"));
            }
            if !entry.weights.values().any(|w| *w > 0.0) {
                return Err(bad_row("lamp_levels", row, "no positive rarity weight"));
            }
        }

        if self.stages.is_empty() {
            return Err(ConfigError::EmptyTable("stages"));
        }
        for (row, entry) in self.stages.iter().enumerate() {
            check_sequence("stages", row, entry.stage)?;
            if entry.power == 0 {
                return Err(bad_row("stages", row, "power must be positive"));
            }
        }

        if self.experience.is_empty() {
            return Err(ConfigError::EmptyTable("experience"));
        }
        for (row, entry) in self.experience.iter().enumerate() {
            check_sequence("experience", row, entry.level)?;
            if entry.xp_to_next == 0 {
                return Err(bad_row("experience", row, "xp_to_next must be positive"));
            }
        }

        Ok(())
    }

    pub fn max_lamp_level(&self) -> u32 {
        self.lamp_levels.len() as u32
    }

    /// Row for a lamp level, clamped into the table.
    pub fn lamp_level(&self, level: u32) -> &LampLevelRow {
        &self.lamp_levels[clamp_index(level, self.lamp_levels.len())]
    }

    pub fn lamp_weights(&self, level: u32) -> &BTreeMap<Rarity, f64> {
        &self.lamp_level(level).weights
    }

    /// Row for a global stage, clamped into the table.
    pub fn stage(&self, global_stage: u32) -> &StageRow {
        &self.stages[clamp_index(global_stage, self.stages.len())]
    }

    pub fn xp_to_next(&self, level: u32) -> u64 {
        self.experience[clamp_index(level, self.experience.len())].xp_to_next
    }
}

/// 1-based key to a row index, clamped to `[0, len - 1]`.
fn clamp_index(key: u32, len: usize) -> usize {
    (key.max(1) as usize - 1).min(len - 1)
}

fn check_sequence(table: &'static str, row: usize, key: u32) -> Result<()> {
    if key as usize != row + 1 {
        return Err(bad_row(table, row, &format!("expected key {}, found {}", row + 1, key)));
    }
    Ok(())
}

fn bad_row(table: &'static str, row: usize, reason: &str) -> ConfigError {
    ConfigError::BadRow {
        table,
        row,
        reason: reason.to_string(),
    }
}

/// Everything a balance calculation reads: data tables plus tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct Ruleset {
    pub data: GameData,
    pub balance: BalanceConfig,
}

impl Ruleset {
    pub fn new(data: GameData, balance: BalanceConfig) -> Result<Self> {
        balance.validate()?;
        Ok(Self { data, balance })
    }

    /// Embedded tables with default balance.
    pub fn standard() -> Result<Self> {
        Self::new(GameData::load()?, BalanceConfig::default())
    }

    /// Embedded tables with the given balance.
    pub fn with_balance(balance: BalanceConfig) -> Result<Self> {
        Self::new(GameData::load()?, balance)
    }
}
