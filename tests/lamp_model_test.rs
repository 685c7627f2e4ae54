//! Integration test: lamp rarity model
//!
//! Weighted rolls, the coupon-collector multiplier, smoothing across kills
//! and lamp upgrades, and the guaranteed-rarity schedule.

use std::collections::BTreeMap;

use cult_battle::core::balance::BalanceConfig;
use cult_battle::core::data::{ExperienceRow, GameData, LampLevelRow, Ruleset, StageRow};
use cult_battle::core::game_state::GameState;
use cult_battle::items::types::Rarity;
use cult_battle::lamp::logic::{
    calculate_slot_based_rarity_multiplier, guaranteed_rarity_interval,
    guaranteed_rarity_with_expected, roll_rarity, update_rarity_multiplier_after_kill,
    upgrade_cost,
};
use cult_battle::lamp::types::Lamp;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn single_level_ruleset(weights: &[(Rarity, f64)], balance: BalanceConfig) -> Ruleset {
    let data = GameData::from_tables(
        vec![LampLevelRow {
            level: 1,
            price: 0,
            weights: weights.iter().copied().collect(),
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
    .unwrap();
    Ruleset::new(data, balance).unwrap()
}

// =========================================================================
// Rolling
// =========================================================================

#[test]
fn test_weighted_roll_matches_weights() {
    let weights: BTreeMap<Rarity, f64> = [(Rarity::Common, 90.0), (Rarity::Rare, 10.0)]
        .into_iter()
        .collect();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let rolls = 100_000;
    let rares = (0..rolls)
        .filter(|_| roll_rarity(&weights, &mut rng) == Rarity::Rare)
        .count();
    let share = rares as f64 / rolls as f64;
    assert!(
        (0.095..=0.105).contains(&share),
        "rare share {share} outside tolerance"
    );
}

#[test]
fn test_embedded_lamp_levels_only_roll_listed_tiers() {
    let ruleset = Ruleset::standard().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let weights = ruleset.data.lamp_weights(1);
    for _ in 0..1_000 {
        let rarity = roll_rarity(weights, &mut rng);
        assert!(weights.get(&rarity).copied().unwrap_or(0.0) > 0.0);
    }
}

// =========================================================================
// Coupon-collector multiplier
// =========================================================================

#[test]
fn test_multiplier_is_neutral_when_no_tier_qualifies() {
    let balance = BalanceConfig {
        min_prob_for_gradual_growth: 1.0,
        ..Default::default()
    };
    let ruleset = single_level_ruleset(&[(Rarity::Common, 50.0), (Rarity::Epic, 50.0)], balance);
    let multiplier =
        calculate_slot_based_rarity_multiplier(1, 6, 1, &ruleset.data, &ruleset.balance);
    assert_eq!(multiplier, 1.0);
}

#[test]
fn test_multiplier_grows_with_lamp_level() {
    let ruleset = Ruleset::standard().unwrap();
    let low = calculate_slot_based_rarity_multiplier(1, 6, 1, &ruleset.data, &ruleset.balance);
    let high = calculate_slot_based_rarity_multiplier(
        ruleset.data.max_lamp_level(),
        6,
        1,
        &ruleset.data,
        &ruleset.balance,
    );
    assert!(low >= 1.0);
    assert!(high > low, "top lamp {high} should beat level 1 {low}");
}

#[test]
fn test_smoothing_climbs_monotonically_to_target() {
    let ruleset = single_level_ruleset(
        &[(Rarity::Common, 50.0), (Rarity::Epic, 50.0)],
        BalanceConfig::default(),
    );
    let mut lamp = Lamp::new();
    let mut previous = lamp.current_rarity_multiplier;
    let target = calculate_slot_based_rarity_multiplier(1, 6, 1, &ruleset.data, &ruleset.balance);

    for _ in 0..200 {
        let step_target = update_rarity_multiplier_after_kill(&mut lamp, 6, 1, &ruleset);
        assert_eq!(step_target, target);
        assert!(lamp.current_rarity_multiplier >= previous);
        assert!(lamp.current_rarity_multiplier <= target);
        previous = lamp.current_rarity_multiplier;
    }
    assert!(target > 1.0);
    assert!((target - lamp.current_rarity_multiplier).abs() < 1e-3);
}

#[test]
fn test_lamp_upgrade_keeps_multiplier_continuous() {
    let ruleset = Ruleset::standard().unwrap();
    let mut state = GameState::new(&ruleset);
    for _ in 0..5 {
        update_rarity_multiplier_after_kill(&mut state.lamp, 3, 1, &ruleset);
    }
    let before = state.lamp.current_rarity_multiplier;

    state.add_gold(upgrade_cost(1, &ruleset.data).unwrap());
    assert!(state.upgrade_lamp(&ruleset));
    assert_eq!(state.lamp.level, 2);
    assert_eq!(state.lamp.current_rarity_multiplier, before);
    assert_eq!(state.lamp.base_rarity_multiplier, before);
    assert_eq!(state.hero.gold, 0);
}

// =========================================================================
// Guaranteed rarity
// =========================================================================

#[test]
fn test_guaranteed_tier_with_six_slots() {
    let ruleset = single_level_ruleset(
        &[(Rarity::Common, 50.0), (Rarity::Epic, 50.0)],
        BalanceConfig::default(),
    );
    let guaranteed = guaranteed_rarity_with_expected(1, 6, 1, &ruleset);
    assert_eq!(guaranteed.rarity, Rarity::Epic);
    assert!(guaranteed.expected_filled >= 1.0);

    // 10 drops over about 3.59 expected epic slots.
    assert_eq!(guaranteed_rarity_interval(&guaranteed, &ruleset.balance), 3);
}

#[test]
fn test_guaranteed_tier_skips_tiers_too_rare_to_fill_a_slot() {
    let ruleset = single_level_ruleset(
        &[(Rarity::Common, 99.9), (Rarity::Immortal, 0.1)],
        BalanceConfig::default(),
    );
    let guaranteed = guaranteed_rarity_with_expected(1, 6, 1, &ruleset);
    assert_eq!(guaranteed.rarity, Rarity::Common);
}

// =========================================================================
// Upgrade cost
// =========================================================================

#[test]
fn test_upgrade_cost_stops_at_top_level() {
    let ruleset = Ruleset::standard().unwrap();
    let top = ruleset.data.max_lamp_level();
    assert!(upgrade_cost(1, &ruleset.data).unwrap() > 0);
    assert_eq!(upgrade_cost(top, &ruleset.data), None);

    let mut state = GameState::new(&ruleset);
    state.lamp.level = top;
    state.add_gold(u64::MAX);
    assert!(!state.upgrade_lamp(&ruleset));
    assert_eq!(state.lamp.level, top);
}

#[test]
fn test_upgrade_needs_enough_gold() {
    let ruleset = Ruleset::standard().unwrap();
    let mut state = GameState::new(&ruleset);
    let cost = upgrade_cost(1, &ruleset.data).unwrap();
    state.hero.gold = cost - 1;
    assert!(!state.upgrade_lamp(&ruleset));
    assert_eq!(state.hero.gold, cost - 1);
}
