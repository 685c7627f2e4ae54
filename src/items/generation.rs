use rand::Rng;
use uuid::Uuid;

use super::types::{effective_power, Item, Rarity, Slot};
use crate::core::balance::BalanceConfig;

/// Concrete stats produced for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStats {
    pub hp: u64,
    pub damage: u64,
    pub power: u64,
}

/// Target effective power before variance:
/// `base_power_per_level * growth^(level - 1) * rarity_multiplier`.
pub fn target_power(level: u32, rarity: Rarity, config: &BalanceConfig) -> f64 {
    let growth = config
        .power_growth_per_level
        .powi(level.saturating_sub(1) as i32);
    config.base_power_per_level * growth * config.rarity_multipliers.get(rarity)
}

/// Splits a target effective power into hp and damage using the slot ratios.
///
/// Damage is weighted 4:1 in effective power, so the internal budget is the
/// target divided by `hp_ratio + 4 * damage_ratio`. Power is recomputed from the
/// floored stats and may land slightly below the target.
pub fn stats_for_power(slot: Slot, target: f64) -> ItemStats {
    let (hp_ratio, damage_ratio) = slot.stat_ratios();
    let internal = target.max(0.0) / slot.effective_ratio();

    // f64 -> u64 casts saturate, so huge late-game targets stay finite.
    let hp = (internal * hp_ratio).floor() as u64;
    let damage = ((internal * damage_ratio).floor() as u64).max(1);

    ItemStats {
        hp,
        damage,
        power: effective_power(hp, damage),
    }
}

/// Rolls item stats for `(slot, level, rarity)`, applying power variance when enabled.
pub fn generate_stats(
    slot: Slot,
    level: u32,
    rarity: Rarity,
    config: &BalanceConfig,
    rng: &mut impl Rng,
) -> ItemStats {
    let mut target = target_power(level, rarity, config);
    let variance = config.power_variance;
    if config.features.power_variance && variance > 0.0 {
        target *= rng.gen_range((1.0 - variance)..=(1.0 + variance));
    }
    stats_for_power(slot, target)
}

/// Item level in `[max(1, anchor - offset), anchor]`.
///
/// Drops of the best rarity the lamp currently gives use the tighter
/// `max_rarity_level_offset`.
pub fn roll_item_level(
    anchor: u32,
    is_max_rarity: bool,
    config: &BalanceConfig,
    rng: &mut impl Rng,
) -> u32 {
    let anchor = anchor.max(1);
    if !config.features.item_level_range {
        return anchor;
    }

    let offset = if is_max_rarity {
        config.max_rarity_level_offset
    } else {
        config.min_level_offset
    };
    let min_level = anchor.saturating_sub(offset).max(1);
    rng.gen_range(min_level..=anchor)
}

/// Item ids come from the caller's RNG so seeded runs stay reproducible.
pub fn generate_item_id(rng: &mut impl Rng) -> String {
    Uuid::from_u128(rng.gen()).to_string()
}

/// Creates a complete item.
pub fn generate_item(
    slot: Slot,
    level: u32,
    rarity: Rarity,
    config: &BalanceConfig,
    rng: &mut impl Rng,
) -> Item {
    let level = level.max(1);
    let stats = generate_stats(slot, level, rarity, config, rng);
    Item {
        id: generate_item_id(rng),
        slot,
        rarity,
        level,
        hp: stats.hp,
        damage: stats.damage,
        power: stats.power,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::balance::FeatureFlags;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn no_variance() -> BalanceConfig {
        BalanceConfig {
            power_variance: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_weapon_level_one_common() {
        let config = BalanceConfig {
            power_growth_per_level: 1.5,
            ..no_variance()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let stats = generate_stats(Slot::Weapon, 1, Rarity::Common, &config, &mut rng);
        assert_eq!(
            stats,
            ItemStats {
                hp: 0,
                damage: 2,
                power: 8
            }
        );
    }

    #[test]
    fn test_power_is_hp_plus_four_damage() {
        let config = BalanceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for slot in Slot::ALL {
            for rarity in Rarity::ALL {
                for level in [1, 5, 20, 60] {
                    let item = generate_item(slot, level, rarity, &config, &mut rng);
                    assert_eq!(item.power, item.hp + 4 * item.damage);
                    assert!(item.damage >= 1);
                }
            }
        }
    }

    #[test]
    fn test_power_grows_with_level_and_rarity() {
        let config = no_variance();
        let low = stats_for_power(Slot::Armor, target_power(10, Rarity::Common, &config));
        let high_level = stats_for_power(Slot::Armor, target_power(20, Rarity::Common, &config));
        let high_rarity = stats_for_power(Slot::Armor, target_power(10, Rarity::Epic, &config));
        assert!(high_level.power > low.power);
        assert!(high_rarity.power > low.power);
    }

    #[test]
    fn test_variance_stays_in_bounds() {
        let config = BalanceConfig::default();
        let target = target_power(30, Rarity::Rare, &config);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let stats = generate_stats(Slot::Amulet, 30, Rarity::Rare, &config, &mut rng);
            assert!(stats.power as f64 <= target * 1.15 + 1.0);
            assert!(stats.power as f64 >= target * 0.85 - 8.0);
        }
    }

    #[test]
    fn test_variance_feature_off_is_deterministic() {
        let config = BalanceConfig {
            features: FeatureFlags::baseline(),
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let a = generate_stats(Slot::Ring, 12, Rarity::Good, &config, &mut rng);
        let b = generate_stats(Slot::Ring, 12, Rarity::Good, &config, &mut rng);
        assert_eq!(a, b);
    }

    #[test]
    fn test_roll_item_level_range() {
        let config = BalanceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let level = roll_item_level(20, false, &config, &mut rng);
            assert!((15..=20).contains(&level));
            assert_eq!(roll_item_level(20, true, &config, &mut rng), 20);
            assert!((1..=3).contains(&roll_item_level(3, false, &config, &mut rng)));
        }
    }

    #[test]
    fn test_roll_item_level_without_range_feature() {
        let config = BalanceConfig {
            features: FeatureFlags::baseline(),
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(roll_item_level(17, false, &config, &mut rng), 17);
        assert_eq!(roll_item_level(0, false, &config, &mut rng), 1);
    }

    #[test]
    fn test_item_ids_follow_the_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        assert_eq!(generate_item_id(&mut a), generate_item_id(&mut b));
        assert_ne!(generate_item_id(&mut a), generate_item_id(&mut a));
    }

    #[test]
    fn test_huge_targets_saturate() {
        let stats = stats_for_power(Slot::Weapon, f64::MAX);
        assert_eq!(stats.power, u64::MAX);
    }
}
