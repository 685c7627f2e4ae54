//! Loot pipeline: guaranteed upgrade, then guaranteed rarity, then a normal roll.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::equipment::Equipment;
use super::generation::{generate_item, roll_item_level};
use super::types::{Item, Rarity, Slot};
use crate::core::balance::BalanceConfig;
use crate::core::data::Ruleset;
use crate::lamp::logic::{
    guaranteed_rarity_interval, guaranteed_rarity_with_expected, lamp_max_rarity,
    roll_lamp_rarity,
};
use crate::lamp::types::GuaranteedRarity;

/// Why an item dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootKind {
    Normal,
    /// Forced into the weakest unlocked slot at the hero's level.
    GuaranteedUpgrade,
    /// Forced to the coupon-collector rarity at the hero's level.
    GuaranteedRarity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LootDrop {
    pub item: Item,
    pub kind: LootKind,
}

/// Loots since the last guaranteed drop of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootCounters {
    #[serde(default)]
    pub loot_counter: u32,
    #[serde(default)]
    pub rarity_loot_counter: u32,
}

/// Hero and dungeon facts a loot roll depends on.
#[derive(Debug, Clone, Copy)]
pub struct LootContext<'a> {
    pub hero_level: u32,
    pub chapter: u32,
    pub global_stage: u32,
    pub lamp_level: u32,
    pub equipment: &'a Equipment,
}

/// Every N-th loot is a guaranteed upgrade, with
/// `N = guaranteed_upgrade_every_n + global_stage / increase_every_n_stages`.
/// 0 means no guaranteed upgrades.
pub fn guaranteed_upgrade_interval(global_stage: u32, config: &BalanceConfig) -> u32 {
    if !config.features.guaranteed_upgrade {
        return 0;
    }
    config.guaranteed_upgrade_every_n
        + global_stage / config.guaranteed_upgrade_increase_every_n_stages.max(1)
}

/// Guaranteed-rarity tier and interval in effect for the context, when enabled.
pub fn guaranteed_rarity_schedule(
    ctx: &LootContext<'_>,
    ruleset: &Ruleset,
) -> Option<(GuaranteedRarity, u32)> {
    if !ruleset.balance.features.guaranteed_rarity {
        return None;
    }
    let slots = lootable_slots(ctx.global_stage);
    let guaranteed =
        guaranteed_rarity_with_expected(ctx.lamp_level, slots.len(), ctx.chapter, ruleset);
    let interval = guaranteed_rarity_interval(&guaranteed, &ruleset.balance);
    Some((guaranteed, interval))
}

/// Slots unlocked at the stage. Never empty.
pub fn lootable_slots(global_stage: u32) -> Vec<Slot> {
    Slot::unlocked_at(global_stage.max(1))
}

fn random_slot(slots: &[Slot], rng: &mut impl Rng) -> Slot {
    slots[rng.gen_range(0..slots.len())]
}

/// Rolls one loot and advances the counters.
pub fn roll_loot(
    ctx: &LootContext<'_>,
    counters: &mut LootCounters,
    ruleset: &Ruleset,
    rng: &mut impl Rng,
) -> LootDrop {
    let config = &ruleset.balance;
    counters.loot_counter += 1;
    counters.rarity_loot_counter += 1;

    let slots = lootable_slots(ctx.global_stage);
    let upgrade_every = guaranteed_upgrade_interval(ctx.global_stage, config);
    let schedule = guaranteed_rarity_schedule(ctx, ruleset);

    if upgrade_every > 0 && counters.loot_counter >= upgrade_every {
        counters.loot_counter = 0;
        let slot = ctx
            .equipment
            .weakest_slot(&slots)
            .unwrap_or(Slot::Weapon);
        let rarity = roll_lamp_rarity(ctx.lamp_level, ruleset, rng);
        return LootDrop {
            item: generate_item(slot, ctx.hero_level, rarity, config, rng),
            kind: LootKind::GuaranteedUpgrade,
        };
    }

    if let Some((guaranteed, interval)) = schedule {
        if interval > 0 && counters.rarity_loot_counter >= interval {
            counters.rarity_loot_counter = 0;
            let slot = random_slot(&slots, rng);
            return LootDrop {
                item: generate_item(slot, ctx.hero_level, guaranteed.rarity, config, rng),
                kind: LootKind::GuaranteedRarity,
            };
        }
    }

    let slot = random_slot(&slots, rng);
    let rarity = roll_lamp_rarity(ctx.lamp_level, ruleset, rng);
    let is_max_rarity = rarity == lamp_max_rarity(ctx.lamp_level, ruleset);
    let level = roll_item_level(ctx.hero_level, is_max_rarity, config, rng);

    // A natural drop at or above the guaranteed tier restarts the schedule.
    if let Some((guaranteed, _)) = schedule {
        if rarity >= guaranteed.rarity {
            counters.rarity_loot_counter = 0;
        }
    }

    LootDrop {
        item: generate_item(slot, level, rarity, config, rng),
        kind: LootKind::Normal,
    }
}

/// Gold paid for selling an item of `rarity`.
pub fn sell_price(rarity: Rarity, rng: &mut impl Rng) -> u64 {
    let (min, max) = rarity.sell_price_range();
    rng.gen_range(min..=max)
}
