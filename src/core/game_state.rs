use rand::Rng;
use serde::{Deserialize, Serialize};

use super::constants::{MAX_ENEMIES_PER_WAVE, MIN_ENEMIES_PER_WAVE, STAGES_PER_CHAPTER};
use super::data::Ruleset;
use crate::character::hero::Hero;
use crate::combat::logic::{battle_result, generate_wave, init_battle, run_full_battle};
use crate::combat::types::{BattleResult, BattleState};
use crate::dungeon::logic::{
    adjust_difficulty_on_defeat, adjust_difficulty_on_victory, adjusted_enemy_power,
    advance_progress, base_stage_power, stage_xp_reward,
};
use crate::dungeon::types::DungeonProgress;
use crate::items::drops::{
    lootable_slots, roll_loot, sell_price, LootContext, LootCounters, LootDrop,
};
use crate::items::generation::stats_for_power;
use crate::items::types::{Item, Slot};
use crate::lamp::logic::{update_rarity_multiplier_after_kill, upgrade_cost};
use crate::lamp::types::Lamp;

/// Main game state containing all player progress.
///
/// Fields added after the first save format carry `#[serde(default)]`, and
/// [`GameState::migrate`] repairs whatever the defaults leave inconsistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub hero: Hero,
    #[serde(default)]
    pub lamp: Lamp,
    pub dungeon: DungeonProgress,
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub loot_counters: LootCounters,
    #[serde(default)]
    pub last_save_time: i64,
    /// Outcome of the latest battle, for display only (transient, not saved).
    #[serde(skip)]
    pub last_battle_result: Option<BattleResult>,
    /// Latest lamp drop, for display only (transient, not saved).
    #[serde(skip)]
    pub last_looted_item: Option<Item>,
}

impl GameState {
    pub fn new(ruleset: &Ruleset) -> Self {
        Self {
            hero: Hero::new(),
            lamp: Lamp::new(),
            dungeon: DungeonProgress::new(&ruleset.data),
            inventory: Vec::new(),
            loot_counters: LootCounters::default(),
            last_save_time: chrono::Utc::now().timestamp(),
            last_battle_result: None,
            last_looted_item: None,
        }
    }

    /// Parses a saved snapshot and migrates it. `None` when the JSON is unusable.
    pub fn from_json(json: &str, ruleset: &Ruleset) -> Option<Self> {
        match serde_json::from_str::<GameState>(json) {
            Ok(mut state) => {
                state.migrate(ruleset);
                Some(state)
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable save");
                None
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Brings an older snapshot up to the current shape.
    pub fn migrate(&mut self, ruleset: &Ruleset) {
        let hero = &mut self.hero;
        hero.level = hero.level.max(1);
        for item in hero
            .equipment
            .iter_equipped_mut()
            .chain(self.inventory.iter_mut())
        {
            migrate_item(item);
        }

        let max_lamp = ruleset.data.max_lamp_level();
        self.lamp.level = self.lamp.level.clamp(1, max_lamp);
        let current = self.lamp.current_rarity_multiplier;
        if !current.is_finite() || current <= 0.0 {
            self.lamp.current_rarity_multiplier = 1.0;
        }
        let base = self.lamp.base_rarity_multiplier;
        if !base.is_finite() || base <= 0.0 {
            self.lamp.base_rarity_multiplier = self.lamp.current_rarity_multiplier;
        }

        let dungeon = &mut self.dungeon;
        dungeon.chapter = dungeon.chapter.max(1);
        dungeon.stage = dungeon.stage.clamp(1, STAGES_PER_CHAPTER);
        dungeon.current_enemy_power =
            base_stage_power(dungeon.chapter, dungeon.stage, &ruleset.data);
        if !dungeon.difficulty_modifier.is_finite() {
            dungeon.difficulty_modifier = 0.0;
        }

        self.hero.recalculate_stats();
        if self.hero.hp == 0 {
            self.hero.heal();
        }
    }

    pub fn global_stage(&self) -> u32 {
        self.dungeon.global_stage()
    }

    pub fn unlocked_slots(&self) -> Vec<Slot> {
        lootable_slots(self.global_stage())
    }

    /// Enemy power of the current stage, boss multiplier included.
    pub fn enemy_power(&self, ruleset: &Ruleset) -> u64 {
        adjusted_enemy_power(
            &self.dungeon,
            self.lamp.current_rarity_multiplier,
            &ruleset.balance,
        )
    }

    /// Rolls one loot and places it in the inventory without counting a lamp charge.
    pub fn roll_loot(&mut self, ruleset: &Ruleset, rng: &mut impl Rng) -> LootDrop {
        let ctx = LootContext {
            hero_level: self.hero.level,
            chapter: self.dungeon.chapter,
            global_stage: self.dungeon.global_stage(),
            lamp_level: self.lamp.level,
            equipment: &self.hero.equipment,
        };
        roll_loot(&ctx, &mut self.loot_counters, ruleset, rng)
    }

    /// Spends one lamp charge on a loot roll. `None` when out of charges.
    pub fn open_loot(&mut self, ruleset: &Ruleset, rng: &mut impl Rng) -> Option<Item> {
        if self.hero.lamps == 0 {
            return None;
        }
        self.hero.lamps -= 1;

        let drop = self.roll_loot(ruleset, rng);
        tracing::debug!(
            slot = drop.item.slot.name(),
            rarity = drop.item.rarity.name(),
            level = drop.item.level,
            power = drop.item.power,
            kind = ?drop.kind,
            "lamp opened"
        );
        self.inventory.push(drop.item.clone());
        self.last_looted_item = Some(drop.item.clone());
        Some(drop.item)
    }

    /// Equips an inventory item. The item it replaces is sold automatically.
    pub fn equip_from_inventory(&mut self, item_id: &str, rng: &mut impl Rng) -> bool {
        let Some(index) = self.inventory.iter().position(|item| item.id == item_id) else {
            return false;
        };
        let item = self.inventory.remove(index);
        if let Some(old) = self.hero.equip(item) {
            let price = sell_price(old.rarity, rng);
            self.hero.gold = self.hero.gold.saturating_add(price);
        }
        true
    }

    /// Sells an inventory item and returns the gold received.
    pub fn sell_from_inventory(&mut self, item_id: &str, rng: &mut impl Rng) -> Option<u64> {
        let index = self.inventory.iter().position(|item| item.id == item_id)?;
        let item = self.inventory.remove(index);
        let price = sell_price(item.rarity, rng);
        self.hero.gold = self.hero.gold.saturating_add(price);
        Some(price)
    }

    /// Heals the hero and sets up a battle against the current stage's wave.
    pub fn start_battle(&mut self, ruleset: &Ruleset, rng: &mut impl Rng) -> BattleState {
        self.hero.heal();
        let enemies = generate_wave(
            self.enemy_power(ruleset),
            MIN_ENEMIES_PER_WAVE,
            MAX_ENEMIES_PER_WAVE,
            self.dungeon.is_boss_stage(),
            &ruleset.balance,
            rng,
        );
        init_battle(self.hero.battle_unit(), enemies)
    }

    /// Applies a finished battle. An unfinished battle counts as a defeat.
    ///
    /// Victory pays gold and stage XP, steps the rarity multiplier, raises
    /// difficulty, advances the stage and heals. Defeat lowers difficulty once
    /// per stage.
    pub fn apply_battle_result(&mut self, ruleset: &Ruleset, battle: &BattleState) -> BattleResult {
        let balance = &ruleset.balance;
        let result = battle_result(battle, balance.gold_per_enemy);
        self.hero.hp = battle.hero.hp.min(self.hero.max_hp);

        if result.victory {
            let gold = result.gold_reward.saturating_add(balance.gold_per_stage_clear);
            self.hero.gold = self.hero.gold.saturating_add(gold);

            let xp = stage_xp_reward(self.dungeon.chapter, self.dungeon.stage, &ruleset.data);
            let levels = self.hero.add_xp(xp, &ruleset.data);

            let slots = self.unlocked_slots().len();
            update_rarity_multiplier_after_kill(&mut self.lamp, slots, self.dungeon.chapter, ruleset);
            adjust_difficulty_on_victory(&mut self.dungeon, balance);
            advance_progress(&mut self.dungeon, &ruleset.data);
            self.hero.heal();

            tracing::debug!(
                chapter = self.dungeon.chapter,
                stage = self.dungeon.stage,
                gold,
                xp,
                levels,
                "stage cleared"
            );
        } else {
            let applied = adjust_difficulty_on_defeat(&mut self.dungeon, balance);
            tracing::debug!(
                stage_id = self.dungeon.stage_id(),
                difficulty_lowered = applied,
                timed_out = result.timed_out,
                "battle lost"
            );
        }

        self.last_battle_result = Some(result.clone());
        result
    }

    /// Fights the current stage to completion and applies the result.
    pub fn fight(&mut self, ruleset: &Ruleset, rng: &mut impl Rng) -> BattleResult {
        let mut battle = self.start_battle(ruleset, rng);
        run_full_battle(&mut battle);
        self.apply_battle_result(ruleset, &battle)
    }

    /// Buys the next lamp level. False at max level or without enough gold.
    pub fn upgrade_lamp(&mut self, ruleset: &Ruleset) -> bool {
        let Some(cost) = upgrade_cost(self.lamp.level, &ruleset.data) else {
            return false;
        };
        if self.hero.gold < cost {
            return false;
        }
        self.hero.gold -= cost;
        self.lamp.upgrade();
        true
    }

    pub fn add_lamps(&mut self, amount: u32) {
        self.hero.lamps = self.hero.lamps.saturating_add(amount);
    }

    pub fn add_gold(&mut self, amount: u64) {
        self.hero.gold = self.hero.gold.saturating_add(amount);
    }
}

/// Rebuilds split stats for items saved before hp/damage existed.
fn migrate_item(item: &mut Item) {
    item.level = item.level.max(1);
    if item.hp == 0 && item.damage == 0 {
        let stats = stats_for_power(item.slot, item.power as f64);
        item.hp = stats.hp;
        item.damage = stats.damage;
        item.power = stats.power;
    }
}
