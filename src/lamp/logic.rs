//! Rarity rolling and the coupon-collector rarity model.

use std::collections::BTreeMap;

use rand::Rng;

use super::types::{GuaranteedRarity, Lamp};
use crate::core::balance::BalanceConfig;
use crate::core::data::{GameData, Ruleset};
use crate::items::types::Rarity;

/// Weighted rarity draw.
///
/// One uniform draw scaled to the total weight, then cumulative subtraction in
/// catalog order; the first tier that brings the roll to `<= 0` wins.
pub fn roll_rarity(weights: &BTreeMap<Rarity, f64>, rng: &mut impl Rng) -> Rarity {
    let total: f64 = weights.values().sum();
    if total <= 0.0 {
        return Rarity::Common;
    }

    let mut roll = rng.gen::<f64>() * total;
    for (&rarity, &weight) in weights {
        roll -= weight;
        if roll <= 0.0 {
            return rarity;
        }
    }
    Rarity::Common
}

/// Rarity for a lamp roll. Always common when rarity weighting is disabled.
pub fn roll_lamp_rarity(lamp_level: u32, ruleset: &Ruleset, rng: &mut impl Rng) -> Rarity {
    if !ruleset.balance.features.rarity_weighting {
        return Rarity::Common;
    }
    roll_rarity(ruleset.data.lamp_weights(lamp_level), rng)
}

/// Best tier with a positive weight.
pub fn max_rarity(weights: &BTreeMap<Rarity, f64>) -> Rarity {
    weights
        .iter()
        .filter(|&(_, &weight)| weight > 0.0)
        .map(|(&rarity, _)| rarity)
        .max()
        .unwrap_or(Rarity::Common)
}

/// Best rarity the lamp can currently drop.
pub fn lamp_max_rarity(lamp_level: u32, ruleset: &Ruleset) -> Rarity {
    if !ruleset.balance.features.rarity_weighting {
        return Rarity::Common;
    }
    max_rarity(ruleset.data.lamp_weights(lamp_level))
}

/// Loot drops the coupon-collector model assumes by `chapter`.
pub fn total_drops(chapter: u32, config: &BalanceConfig) -> f64 {
    config.base_drops_for_multiplier
        + chapter.saturating_sub(1) as f64 * config.drops_per_chapter
}

/// Expected number of distinct slots hit at least once when `drops` draws land
/// uniformly over `remaining` slots.
fn expected_filled(remaining: f64, drops: f64) -> f64 {
    let filled = remaining * (1.0 - ((remaining - 1.0) / remaining).powf(drops));
    filled.min(remaining)
}

/// Drop share of each tier, best tier first.
fn shares_best_first(weights: &BTreeMap<Rarity, f64>) -> Vec<(Rarity, f64)> {
    let total: f64 = weights.values().sum();
    if total <= 0.0 {
        return Vec::new();
    }
    weights
        .iter()
        .rev()
        .map(|(&rarity, &weight)| (rarity, weight / total))
        .collect()
}

/// Average item multiplier expected once all `total_slots` slots are filled.
///
/// Tiers are swept best to worst. Each tier fills its coupon-collector share of
/// the slots still unfilled; tiers rarer than `min_prob_for_gradual_growth` are
/// ignored, and slots left over at the end count at 1.0.
pub fn calculate_slot_based_rarity_multiplier(
    lamp_level: u32,
    total_slots: usize,
    chapter: u32,
    data: &GameData,
    config: &BalanceConfig,
) -> f64 {
    if total_slots == 0 {
        return 1.0;
    }

    let drops = total_drops(chapter, config);
    let mut remaining = total_slots as f64;
    let mut total_power = 0.0;
    let mut any_tier = false;

    for (rarity, share) in shares_best_first(data.lamp_weights(lamp_level)) {
        if share < config.min_prob_for_gradual_growth {
            continue;
        }
        if remaining < 1.0 {
            break;
        }
        any_tier = true;
        let filled = expected_filled(remaining, drops * share);
        total_power += filled * config.rarity_multipliers.get(rarity);
        remaining -= filled;
    }

    if !any_tier {
        return 1.0;
    }
    total_power += remaining.max(0.0);
    total_power / total_slots as f64
}

/// One smoothing step after a victory: closes `1 / steps_to_target` of the gap
/// to the freshly computed target, never overshooting it. A target below the
/// current value pulls the multiplier straight down to the target.
///
/// Returns the target.
pub fn update_rarity_multiplier_after_kill(
    lamp: &mut Lamp,
    total_slots: usize,
    chapter: u32,
    ruleset: &Ruleset,
) -> f64 {
    let target = calculate_slot_based_rarity_multiplier(
        lamp.level,
        total_slots,
        chapter,
        &ruleset.data,
        &ruleset.balance,
    );
    let current = lamp.current_rarity_multiplier;
    let step = (target - current) / ruleset.balance.steps_to_target as f64;
    lamp.current_rarity_multiplier = (current + step).min(target);

    tracing::debug!(
        lamp_level = lamp.level,
        target,
        current = lamp.current_rarity_multiplier,
        convergence = lamp.convergence(target),
        "rarity multiplier step"
    );
    target
}

/// Best tier whose own expected fill reaches a whole slot.
///
/// Same sweep as [`calculate_slot_based_rarity_multiplier`] except that only
/// zero-weight tiers are skipped. Falls back to common with an expected fill of 1.0.
pub fn guaranteed_rarity_with_expected(
    lamp_level: u32,
    total_slots: usize,
    chapter: u32,
    ruleset: &Ruleset,
) -> GuaranteedRarity {
    let drops = total_drops(chapter, &ruleset.balance);
    let mut remaining = total_slots as f64;

    for (rarity, share) in shares_best_first(ruleset.data.lamp_weights(lamp_level)) {
        if share <= 0.0 {
            continue;
        }
        if remaining < 1.0 {
            break;
        }
        let filled = expected_filled(remaining, drops * share);
        if filled >= 1.0 {
            return GuaranteedRarity {
                rarity,
                expected_filled: filled,
                total_drops: drops,
            };
        }
        remaining -= filled;
    }

    GuaranteedRarity {
        rarity: Rarity::Common,
        expected_filled: 1.0,
        total_drops: drops,
    }
}

/// Loots between guaranteed-rarity drops. 0 disables the schedule.
pub fn guaranteed_rarity_interval(guaranteed: &GuaranteedRarity, config: &BalanceConfig) -> u32 {
    if guaranteed.expected_filled <= 0.0 {
        return 0;
    }
    let interval = guaranteed.total_drops / guaranteed.expected_filled
        * config.guaranteed_rarity_interval_multiplier;
    interval.round().max(0.0) as u32
}

/// Gold needed to go from `level` to the next lamp level; `None` at the top.
pub fn upgrade_cost(level: u32, data: &GameData) -> Option<u64> {
    if level >= data.max_lamp_level() {
        return None;
    }
    Some(data.lamp_level(level + 1).price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::{ExperienceRow, LampLevelRow, StageRow};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn weights(pairs: &[(Rarity, f64)]) -> BTreeMap<Rarity, f64> {
        pairs.iter().copied().collect()
    }

    fn data_with_weights(pairs: &[(Rarity, f64)]) -> GameData {
        GameData::from_tables(
            vec![LampLevelRow {
                level: 1,
                price: 0,
                weights: weights(pairs),
            }],
            vec![StageRow {
                stage: 1,
                power: 100,
                xp: 10,
            }],
            vec![ExperienceRow {
                level: 1,
                xp_to_next: 10,
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_roll_rarity_zero_total_is_common() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(roll_rarity(&BTreeMap::new(), &mut rng), Rarity::Common);
        let zero = weights(&[(Rarity::Epic, 0.0)]);
        assert_eq!(roll_rarity(&zero, &mut rng), Rarity::Common);
    }

    #[test]
    fn test_roll_rarity_single_tier() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let only_rare = weights(&[(Rarity::Common, 0.0), (Rarity::Rare, 5.0)]);
        for _ in 0..100 {
            assert_eq!(roll_rarity(&only_rare, &mut rng), Rarity::Rare);
        }
    }

    #[test]
    fn test_roll_rarity_converges() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let table = weights(&[(Rarity::Common, 90.0), (Rarity::Rare, 10.0)]);
        let draws = 100_000;
        let rares = (0..draws)
            .filter(|_| roll_rarity(&table, &mut rng) == Rarity::Rare)
            .count();
        let share = rares as f64 / draws as f64;
        assert!((0.095..=0.105).contains(&share), "rare share {share}");
    }

    #[test]
    fn test_max_rarity() {
        let table = weights(&[
            (Rarity::Common, 50.0),
            (Rarity::Epic, 2.0),
            (Rarity::Mythic, 0.0),
        ]);
        assert_eq!(max_rarity(&table), Rarity::Epic);
        assert_eq!(max_rarity(&BTreeMap::new()), Rarity::Common);
    }

    #[test]
    fn test_slot_multiplier_degenerate_cases() {
        let data = data_with_weights(&[(Rarity::Common, 50.0), (Rarity::Good, 50.0)]);
        let config = BalanceConfig {
            min_prob_for_gradual_growth: 1.0,
            ..Default::default()
        };
        assert_eq!(
            calculate_slot_based_rarity_multiplier(1, 6, 1, &data, &config),
            1.0
        );
        assert_eq!(
            calculate_slot_based_rarity_multiplier(1, 0, 1, &data, &BalanceConfig::default()),
            1.0
        );
    }

    #[test]
    fn test_slot_multiplier_all_common_is_one() {
        let data = data_with_weights(&[(Rarity::Common, 1.0)]);
        let value =
            calculate_slot_based_rarity_multiplier(1, 8, 3, &data, &BalanceConfig::default());
        assert!((value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_slot_multiplier_rises_with_lamp_level() {
        let ruleset = Ruleset::standard().unwrap();
        let at = |level| {
            calculate_slot_based_rarity_multiplier(level, 6, 2, &ruleset.data, &ruleset.balance)
        };
        assert!(at(10) > at(1));
        assert!(at(25) > at(10));
        assert!(at(31) < Rarity::Immortal.base_multiplier());
    }

    #[test]
    fn test_smoothing_is_monotonic_toward_fixed_target() {
        let ruleset = Ruleset::standard().unwrap();
        let mut lamp = Lamp {
            level: 15,
            ..Lamp::new()
        };
        let mut previous = lamp.current_rarity_multiplier;
        let mut target = 0.0;
        for _ in 0..100 {
            target = update_rarity_multiplier_after_kill(&mut lamp, 6, 2, &ruleset);
            assert!(lamp.current_rarity_multiplier >= previous);
            assert!(lamp.current_rarity_multiplier <= target);
            previous = lamp.current_rarity_multiplier;
        }
        assert!(target - lamp.current_rarity_multiplier < 0.01);
    }

    #[test]
    fn test_smoothing_clamps_when_target_drops() {
        let ruleset = Ruleset::standard().unwrap();
        let mut lamp = Lamp {
            level: 1,
            current_rarity_multiplier: 3.0,
            base_rarity_multiplier: 3.0,
        };
        let target = update_rarity_multiplier_after_kill(&mut lamp, 3, 1, &ruleset);
        assert_eq!(lamp.current_rarity_multiplier, target);
    }

    #[test]
    fn test_guaranteed_rarity_top_tier() {
        let data = data_with_weights(&[(Rarity::Common, 50.0), (Rarity::Immortal, 50.0)]);
        let ruleset = Ruleset::new(data, BalanceConfig::default()).unwrap();
        let guaranteed = guaranteed_rarity_with_expected(1, 6, 1, &ruleset);
        assert_eq!(guaranteed.rarity, Rarity::Immortal);
        assert!(guaranteed.expected_filled >= 1.0);
        assert_eq!(guaranteed.total_drops, 10.0);
    }

    #[test]
    fn test_guaranteed_rarity_fallback() {
        let data = data_with_weights(&[(Rarity::Common, 1.0)]);
        let config = BalanceConfig {
            base_drops_for_multiplier: 0.0,
            drops_per_chapter: 0.0,
            ..Default::default()
        };
        let ruleset = Ruleset::new(data, config).unwrap();
        let guaranteed = guaranteed_rarity_with_expected(1, 6, 1, &ruleset);
        assert_eq!(guaranteed.rarity, Rarity::Common);
        assert_eq!(guaranteed.expected_filled, 1.0);
        assert_eq!(guaranteed_rarity_interval(&guaranteed, &ruleset.balance), 0);
    }

    #[test]
    fn test_guaranteed_rarity_interval() {
        let guaranteed = GuaranteedRarity {
            rarity: Rarity::Rare,
            expected_filled: 1.6,
            total_drops: 12.0,
        };
        let config = BalanceConfig::default();
        assert_eq!(guaranteed_rarity_interval(&guaranteed, &config), 8);

        let doubled = BalanceConfig {
            guaranteed_rarity_interval_multiplier: 2.0,
            ..Default::default()
        };
        assert_eq!(guaranteed_rarity_interval(&guaranteed, &doubled), 15);
    }

    #[test]
    fn test_upgrade_cost() {
        let data = GameData::load().unwrap();
        assert_eq!(upgrade_cost(1, &data), Some(data.lamp_level(2).price));
        assert_eq!(upgrade_cost(31, &data), None);
        assert_eq!(upgrade_cost(40, &data), None);
    }

    #[test]
    fn test_rarity_weighting_disabled_rolls_common() {
        let mut balance = BalanceConfig::default();
        balance.features.rarity_weighting = false;
        let ruleset = Ruleset::with_balance(balance).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..50 {
            assert_eq!(roll_lamp_rarity(31, &ruleset, &mut rng), Rarity::Common);
        }
        assert_eq!(lamp_max_rarity(31, &ruleset), Rarity::Common);
    }
}
