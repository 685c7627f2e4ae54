//! Balance configuration shared by the live game and the economy tester.
//!
//! Defaults live here. A tuning run layers a [`BalanceOverrides`] on top of the
//! defaults once, and the merged [`BalanceConfig`] is passed explicitly into every
//! calculation.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::constants::{GOLD_PER_ENEMY, GOLD_PER_STAGE_CLEAR};
use super::error::{ConfigError, Result};
use crate::items::types::Rarity;

// =============================================================================
// ITEMS
// =============================================================================

/// Power of a level 1 common item before variance.
pub const BASE_POWER_PER_LEVEL: f64 = 10.0;

/// Item power multiplies by this factor per item level.
pub const POWER_GROWTH_PER_LEVEL: f64 = 1.25;

/// Item power variance: actual power lies in `[1 - v, 1 + v]` of the target.
pub const POWER_VARIANCE: f64 = 0.15;

/// Item level range below the hero level for ordinary drops.
pub const MIN_LEVEL_OFFSET: u32 = 5;

/// Item level range for drops of the best rarity the lamp currently gives.
pub const MAX_RARITY_LEVEL_OFFSET: u32 = 0;

// =============================================================================
// GUARANTEED DROPS
// =============================================================================

/// Every N-th loot is a guaranteed upgrade for the weakest slot.
pub const GUARANTEED_UPGRADE_EVERY_N: u32 = 4;

/// N grows by one every this many global stages.
pub const GUARANTEED_UPGRADE_INCREASE_EVERY_N_STAGES: u32 = 10;

/// Scales the coupon-collector interval for guaranteed rarity drops.
pub const GUARANTEED_RARITY_INTERVAL_MULTIPLIER: f64 = 1.0;

// =============================================================================
// ADAPTIVE DIFFICULTY & ENEMIES
// =============================================================================

pub const DIFFICULTY_ON_VICTORY: f64 = 0.01;
pub const DIFFICULTY_ON_DEFEAT: f64 = -0.02;
pub const BOSS_POWER_MULTIPLIER: f64 = 1.5;

/// Enemy `hp / damage` ratio for single-enemy waves and bosses.
pub const HP_TO_DAMAGE_RATIO: f64 = 6.0;

// =============================================================================
// RARITY MULTIPLIER (coupon collector)
// =============================================================================

/// Tiers whose drop share is below this are ignored by the expected multiplier.
pub const MIN_PROB_FOR_GRADUAL_GROWTH: f64 = 0.01;

/// Kills needed for the smoothed multiplier to close most of the gap to target.
pub const STEPS_TO_TARGET: u32 = 20;

pub const BASE_DROPS_FOR_MULTIPLIER: f64 = 10.0;
pub const DROPS_PER_CHAPTER: f64 = 2.0;

/// Independently togglable generation features.
///
/// Each flag corresponds to one step of the loot model's history, so any
/// historical configuration can be reproduced by switching flags off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Item level rolled in `[hero_level - offset, hero_level]` instead of the hero level.
    pub item_level_range: bool,
    /// Item power varies by `power_variance` around the target.
    pub power_variance: bool,
    /// Every N-th loot is forced into the weakest slot at max level.
    pub guaranteed_upgrade: bool,
    /// Rarity rolled from lamp weights. When off, every drop is common.
    pub rarity_weighting: bool,
    /// Scheduled drops of at least the coupon-collector rarity.
    pub guaranteed_rarity: bool,
}

impl FeatureFlags {
    pub const NAMES: [&'static str; 5] = [
        "item-level-range",
        "power-variance",
        "guaranteed-upgrade",
        "rarity-weighting",
        "guaranteed-rarity",
    ];

    /// Every feature disabled.
    pub fn baseline() -> Self {
        Self {
            item_level_range: false,
            power_variance: false,
            guaranteed_upgrade: false,
            rarity_weighting: false,
            guaranteed_rarity: false,
        }
    }

    /// Every feature enabled (the authoritative live configuration).
    pub fn full() -> Self {
        Self {
            item_level_range: true,
            power_variance: true,
            guaranteed_upgrade: true,
            rarity_weighting: true,
            guaranteed_rarity: true,
        }
    }

    /// Parse `"full"`, `"baseline"`, or a comma separated list of feature names
    /// enabled on top of the baseline.
    pub fn parse(list: &str) -> Result<Self> {
        match list.trim() {
            "full" | "all" => return Ok(Self::full()),
            "baseline" | "none" | "" => return Ok(Self::baseline()),
            _ => {}
        }

        let mut flags = Self::baseline();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name {
                "item-level-range" => flags.item_level_range = true,
                "power-variance" => flags.power_variance = true,
                "guaranteed-upgrade" => flags.guaranteed_upgrade = true,
                "rarity-weighting" => flags.rarity_weighting = true,
                "guaranteed-rarity" => flags.guaranteed_rarity = true,
                other => return Err(ConfigError::UnknownFeature(other.to_string())),
            }
        }
        Ok(flags)
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::full()
    }
}

/// Power multiplier per rarity tier, indexed by [`Rarity::index`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityMultipliers(pub [f64; 7]);

impl RarityMultipliers {
    pub fn get(&self, rarity: Rarity) -> f64 {
        self.0[rarity.index()]
    }

    pub fn set(&mut self, rarity: Rarity, value: f64) {
        self.0[rarity.index()] = value;
    }
}

impl Default for RarityMultipliers {
    fn default() -> Self {
        Self(Rarity::ALL.map(|r| r.base_multiplier()))
    }
}

/// Flat set of numeric tunables read by every balance calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub base_power_per_level: f64,
    pub power_growth_per_level: f64,
    pub power_variance: f64,
    pub min_level_offset: u32,
    pub max_rarity_level_offset: u32,
    pub guaranteed_upgrade_every_n: u32,
    pub guaranteed_upgrade_increase_every_n_stages: u32,
    pub guaranteed_rarity_interval_multiplier: f64,
    pub rarity_multipliers: RarityMultipliers,
    pub difficulty_enabled: bool,
    pub difficulty_on_victory: f64,
    pub difficulty_on_defeat: f64,
    pub boss_power_multiplier: f64,
    pub hp_to_damage_ratio: f64,
    pub min_prob_for_gradual_growth: f64,
    pub steps_to_target: u32,
    pub base_drops_for_multiplier: f64,
    pub drops_per_chapter: f64,
    pub gold_per_enemy: u64,
    pub gold_per_stage_clear: u64,
    pub features: FeatureFlags,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            base_power_per_level: BASE_POWER_PER_LEVEL,
            power_growth_per_level: POWER_GROWTH_PER_LEVEL,
            power_variance: POWER_VARIANCE,
            min_level_offset: MIN_LEVEL_OFFSET,
            max_rarity_level_offset: MAX_RARITY_LEVEL_OFFSET,
            guaranteed_upgrade_every_n: GUARANTEED_UPGRADE_EVERY_N,
            guaranteed_upgrade_increase_every_n_stages: GUARANTEED_UPGRADE_INCREASE_EVERY_N_STAGES,
            guaranteed_rarity_interval_multiplier: GUARANTEED_RARITY_INTERVAL_MULTIPLIER,
            rarity_multipliers: RarityMultipliers::default(),
            difficulty_enabled: true,
            difficulty_on_victory: DIFFICULTY_ON_VICTORY,
            difficulty_on_defeat: DIFFICULTY_ON_DEFEAT,
            boss_power_multiplier: BOSS_POWER_MULTIPLIER,
            hp_to_damage_ratio: HP_TO_DAMAGE_RATIO,
            min_prob_for_gradual_growth: MIN_PROB_FOR_GRADUAL_GROWTH,
            steps_to_target: STEPS_TO_TARGET,
            base_drops_for_multiplier: BASE_DROPS_FOR_MULTIPLIER,
            drops_per_chapter: DROPS_PER_CHAPTER,
            gold_per_enemy: GOLD_PER_ENEMY,
            gold_per_stage_clear: GOLD_PER_STAGE_CLEAR,
            features: FeatureFlags::default(),
        }
    }
}

impl BalanceConfig {
    /// Defaults merged with `overrides`. Unset override fields keep the default.
    pub fn with_overrides(overrides: &BalanceOverrides) -> Self {
        let mut config = Self::default();
        config.apply(overrides);
        config
    }

    /// Layer `overrides` onto this config in place.
    pub fn apply(&mut self, o: &BalanceOverrides) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = o.$field { self.$field = value; })*
            };
        }
        take!(
            base_power_per_level,
            power_growth_per_level,
            power_variance,
            min_level_offset,
            max_rarity_level_offset,
            guaranteed_upgrade_every_n,
            guaranteed_upgrade_increase_every_n_stages,
            guaranteed_rarity_interval_multiplier,
            difficulty_enabled,
            difficulty_on_victory,
            difficulty_on_defeat,
            boss_power_multiplier,
            hp_to_damage_ratio,
            min_prob_for_gradual_growth,
            steps_to_target,
            base_drops_for_multiplier,
            drops_per_chapter,
            gold_per_enemy,
            gold_per_stage_clear,
            features,
        );
        for (&rarity, &value) in &o.rarity_multipliers {
            self.rarity_multipliers.set(rarity, value);
        }
    }

    /// Rejects values that would make the models meaningless.
    pub fn validate(&self) -> Result<()> {
        fn positive(field: &'static str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be positive, got {value}"),
                })
            }
        }

        positive("base_power_per_level", self.base_power_per_level)?;
        positive("power_growth_per_level", self.power_growth_per_level)?;
        positive("boss_power_multiplier", self.boss_power_multiplier)?;
        positive("hp_to_damage_ratio", self.hp_to_damage_ratio)?;
        positive(
            "guaranteed_rarity_interval_multiplier",
            self.guaranteed_rarity_interval_multiplier,
        )?;

        if !(0.0..1.0).contains(&self.power_variance) {
            return Err(ConfigError::InvalidValue {
                field: "power_variance",
                reason: format!("must be in [0, 1), got {}", self.power_variance),
            });
        }
        if !(0.0..=1.0).contains(&self.min_prob_for_gradual_growth) {
            return Err(ConfigError::InvalidValue {
                field: "min_prob_for_gradual_growth",
                reason: format!("must be in [0, 1], got {}", self.min_prob_for_gradual_growth),
            });
        }
        if self.steps_to_target == 0 {
            return Err(ConfigError::InvalidValue {
                field: "steps_to_target",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.guaranteed_upgrade_increase_every_n_stages == 0 {
            return Err(ConfigError::InvalidValue {
                field: "guaranteed_upgrade_increase_every_n_stages",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.base_drops_for_multiplier < 0.0 || self.drops_per_chapter < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "base_drops_for_multiplier",
                reason: "drop counts cannot be negative".to_string(),
            });
        }

        positive("rarity_multipliers", self.rarity_multipliers.get(Rarity::Common))?;
        for pair in Rarity::ALL.windows(2) {
            let lower_value = self.rarity_multipliers.get(pair[0]);
            let higher_value = self.rarity_multipliers.get(pair[1]);
            if !(higher_value > lower_value) {
                return Err(ConfigError::RarityOrder {
                    lower: pair[0],
                    lower_value,
                    higher: pair[1],
                    higher_value,
                });
            }
        }

        Ok(())
    }
}

/// Partial balance overrides, typically produced by a tuning UI or a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceOverrides {
    pub base_power_per_level: Option<f64>,
    pub power_growth_per_level: Option<f64>,
    pub power_variance: Option<f64>,
    pub min_level_offset: Option<u32>,
    pub max_rarity_level_offset: Option<u32>,
    pub guaranteed_upgrade_every_n: Option<u32>,
    pub guaranteed_upgrade_increase_every_n_stages: Option<u32>,
    pub guaranteed_rarity_interval_multiplier: Option<f64>,
    pub rarity_multipliers: BTreeMap<Rarity, f64>,
    pub difficulty_enabled: Option<bool>,
    pub difficulty_on_victory: Option<f64>,
    pub difficulty_on_defeat: Option<f64>,
    pub boss_power_multiplier: Option<f64>,
    pub hp_to_damage_ratio: Option<f64>,
    pub min_prob_for_gradual_growth: Option<f64>,
    pub steps_to_target: Option<u32>,
    pub base_drops_for_multiplier: Option<f64>,
    pub drops_per_chapter: Option<f64>,
    pub gold_per_enemy: Option<u64>,
    pub gold_per_stage_clear: Option<u64>,
    pub features: Option<FeatureFlags>,
}

impl BalanceOverrides {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        BalanceConfig::default().validate().unwrap();
    }

    #[test]
    fn test_empty_overrides_keep_defaults() {
        let merged = BalanceConfig::with_overrides(&BalanceOverrides::default());
        assert_eq!(merged, BalanceConfig::default());
    }

    #[test]
    fn test_overrides_replace_only_set_fields() {
        let overrides = BalanceOverrides {
            power_variance: Some(0.0),
            steps_to_target: Some(5),
            ..Default::default()
        };
        let merged = BalanceConfig::with_overrides(&overrides);
        assert_eq!(merged.power_variance, 0.0);
        assert_eq!(merged.steps_to_target, 5);
        assert_eq!(merged.power_growth_per_level, POWER_GROWTH_PER_LEVEL);
        assert_eq!(merged.difficulty_on_defeat, DIFFICULTY_ON_DEFEAT);
    }

    #[test]
    fn test_partial_rarity_multiplier_override() {
        let json = r#"{ "rarity_multipliers": { "epic": 4.0 }, "difficulty_enabled": false }"#;
        let overrides = BalanceOverrides::from_json(json).unwrap();
        let merged = BalanceConfig::with_overrides(&overrides);
        assert_eq!(merged.rarity_multipliers.get(Rarity::Epic), 4.0);
        assert_eq!(merged.rarity_multipliers.get(Rarity::Rare), 2.25);
        assert!(!merged.difficulty_enabled);
        merged.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_non_monotonic_rarities() {
        let mut config = BalanceConfig::default();
        config.rarity_multipliers.set(Rarity::Mythic, 1.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RarityOrder {
                higher: Rarity::Mythic,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_variance_and_steps() {
        let mut config = BalanceConfig::default();
        config.power_variance = 1.5;
        assert!(config.validate().is_err());

        let mut config = BalanceConfig::default();
        config.steps_to_target = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_feature_flag_parsing() {
        assert_eq!(FeatureFlags::parse("full").unwrap(), FeatureFlags::full());
        assert_eq!(
            FeatureFlags::parse("baseline").unwrap(),
            FeatureFlags::baseline()
        );

        let flags = FeatureFlags::parse("power-variance, guaranteed-upgrade").unwrap();
        assert!(flags.power_variance);
        assert!(flags.guaranteed_upgrade);
        assert!(!flags.item_level_range);
        assert!(!flags.rarity_weighting);

        assert!(matches!(
            FeatureFlags::parse("crits"),
            Err(ConfigError::UnknownFeature(name)) if name == "crits"
        ));
    }

    #[test]
    fn test_every_feature_name_parses() {
        for name in FeatureFlags::NAMES {
            let flags = FeatureFlags::parse(name).unwrap();
            assert_ne!(flags, FeatureFlags::baseline(), "{name} should enable a flag");
        }
    }
}
