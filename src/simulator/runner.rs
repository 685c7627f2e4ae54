//! Economy tester: drives the real game state through loot, lamp upgrades and
//! battles, recording metrics per stage and per chapter.
//!
//! Each loop iteration runs three phases. The loot phase only happens after a
//! lost battle and stops at the first equip-worthy item. The upgrade phase
//! spends gold greedily on lamp levels. The battle phase makes a single
//! attempt at the current stage.

use super::config::TesterConfig;
use super::metrics::{ChapterCounters, ChapterMetrics, StageCounters, StageMetrics, TestSummary};
use crate::combat::logic::run_full_battle;
use crate::core::data::Ruleset;
use crate::core::error::Result;
use crate::core::game_state::GameState;
use crate::dungeon::logic::boss_power;
use crate::items::drops::{
    guaranteed_rarity_schedule, guaranteed_upgrade_interval, sell_price, LootContext, LootKind,
};
use crate::items::types::Rarity;
use crate::lamp::logic::{calculate_slot_based_rarity_multiplier, upgrade_cost};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct EconomyTester {
    config: TesterConfig,
    ruleset: Ruleset,
    state: GameState,
    rng: ChaCha8Rng,
    chapters: Vec<ChapterMetrics>,
    stages: Vec<StageMetrics>,
    chapter_counters: ChapterCounters,
    stage_counters: StageCounters,
    iterations: u64,
    last_battle_lost: bool,
    hit_iteration_cap: bool,
}

impl EconomyTester {
    /// Validates the config's balance and prepares a fresh game.
    pub fn new(config: TesterConfig) -> Result<Self> {
        let ruleset = config.ruleset()?;
        Ok(Self::with_ruleset(config, ruleset))
    }

    /// Uses `ruleset` as given. `config.balance` is ignored in favour of it.
    pub fn with_ruleset(config: TesterConfig, ruleset: Ruleset) -> Self {
        let state = GameState::new(&ruleset);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            ruleset,
            state,
            rng,
            chapters: Vec::new(),
            stages: Vec::new(),
            chapter_counters: ChapterCounters::default(),
            stage_counters: StageCounters::default(),
            iterations: 0,
            last_battle_lost: false,
            hit_iteration_cap: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Runs until `max_chapters` is cleared or the iteration cap is hit.
    pub fn run(mut self) -> TestSummary {
        tracing::debug!(
            seed = self.config.seed,
            max_chapters = self.config.max_chapters,
            features = ?self.ruleset.balance.features,
            "economy test started"
        );

        while self.state.dungeon.chapter <= self.config.max_chapters {
            self.iterations += 1;
            if self.cap_reached() {
                self.stop_at_cap();
                break;
            }

            let chapter = self.state.dungeon.chapter;
            self.loot_phase();
            self.upgrade_phase();
            let victory = self.battle_phase();

            if victory && self.state.dungeon.chapter > chapter {
                self.record_chapter(chapter, true);
            }
        }

        self.build_summary()
    }

    fn cap_reached(&self) -> bool {
        self.iterations > self.config.max_iterations
    }

    fn stop_at_cap(&mut self) {
        let hero = &self.state.hero;
        tracing::warn!(
            max_iterations = self.config.max_iterations,
            chapter = self.state.dungeon.chapter,
            stage = self.state.dungeon.stage,
            hero_level = hero.level,
            hero_power = hero.power(),
            gold = hero.gold,
            enemy_power = self.state.enemy_power(&self.ruleset),
            lamp_level = self.state.lamp.level,
            "economy test hit the iteration cap"
        );
        self.hit_iteration_cap = true;
        self.record_chapter(self.state.dungeon.chapter, false);
    }

    fn loot_phase(&mut self) {
        if !self.last_battle_lost {
            return;
        }
        self.last_battle_lost = false;

        for _ in 0..self.config.max_loots_per_phase {
            let upgraded = self.loot_one();
            if upgraded || self.cap_reached() {
                break;
            }
        }
    }

    /// Rolls one item and equips it if it beats the slot, otherwise sells it.
    /// Guaranteed upgrades are always equipped. Returns whether it was equipped.
    fn loot_one(&mut self) -> bool {
        self.iterations += 1;
        let drop = self.state.roll_loot(&self.ruleset, &mut self.rng);
        let item = drop.item;

        self.chapter_counters.loots += 1;
        self.stage_counters.loots += 1;
        *self
            .chapter_counters
            .loots_by_rarity
            .entry(item.rarity)
            .or_insert(0) += 1;

        let equip = drop.kind == LootKind::GuaranteedUpgrade
            || self.state.hero.equipment.is_upgrade(&item);
        if equip {
            self.state.hero.equip(item);
        } else {
            let price = sell_price(item.rarity, &mut self.rng);
            self.state.add_gold(price);
            self.chapter_counters.gold_earned += price;
        }
        equip
    }

    fn upgrade_phase(&mut self) {
        while let Some(cost) = upgrade_cost(self.state.lamp.level, &self.ruleset.data) {
            if !self.state.upgrade_lamp(&self.ruleset) {
                break;
            }
            self.chapter_counters.gold_spent += cost;
            tracing::debug!(lamp_level = self.state.lamp.level, cost, "lamp upgraded");
        }
    }

    fn battle_phase(&mut self) -> bool {
        let enemy_power = self.state.enemy_power(&self.ruleset);
        let hero_power = self.state.hero.power();

        let mut battle = self.state.start_battle(&self.ruleset, &mut self.rng);
        run_full_battle(&mut battle);

        self.chapter_counters.battles += 1;
        self.stage_counters.battles += 1;

        if battle.victory {
            self.record_stage(enemy_power);
            let result = self.state.apply_battle_result(&self.ruleset, &battle);
            self.chapter_counters.gold_earned +=
                result.gold_reward + self.ruleset.balance.gold_per_stage_clear;
            true
        } else {
            self.state.apply_battle_result(&self.ruleset, &battle);
            self.chapter_counters.defeats += 1;
            self.stage_counters.defeats += 1;
            if hero_power >= enemy_power {
                self.chapter_counters.unfair_defeats += 1;
            }
            self.last_battle_lost = true;
            self.state.hero.heal();
            false
        }
    }

    fn record_stage(&mut self, enemy_power: u64) {
        let state = &self.state;
        let hero = &state.hero;
        let dungeon = &state.dungeon;
        let global_stage = dungeon.global_stage();
        let slots = state.unlocked_slots().len();

        let ctx = LootContext {
            hero_level: hero.level,
            chapter: dungeon.chapter,
            global_stage,
            lamp_level: state.lamp.level,
            equipment: &hero.equipment,
        };
        let (guaranteed_rarity, guaranteed_rarity_every_n, total_drops) =
            match guaranteed_rarity_schedule(&ctx, &self.ruleset) {
                Some((guaranteed, interval)) => {
                    (guaranteed.rarity, interval, guaranteed.total_drops)
                }
                None => (Rarity::Common, 0, 0.0),
            };

        self.stages.push(StageMetrics {
            chapter: dungeon.chapter,
            stage: dungeon.stage,
            loots: self.stage_counters.loots,
            battles: self.stage_counters.battles,
            defeats: self.stage_counters.defeats,
            hero_level: hero.level,
            hero_power: hero.power(),
            hero_hp: hero.max_hp,
            hero_damage: hero.damage,
            slots: hero.filled_slots(),
            enemy_power,
            rarity_multiplier: calculate_slot_based_rarity_multiplier(
                state.lamp.level,
                slots,
                dungeon.chapter,
                &self.ruleset.data,
                &self.ruleset.balance,
            ),
            current_rarity_multiplier: state.lamp.current_rarity_multiplier,
            difficulty_modifier: dungeon.difficulty_modifier,
            lamp_level: state.lamp.level,
            gold: hero.gold,
            guaranteed_every_n: guaranteed_upgrade_interval(global_stage, &self.ruleset.balance),
            guaranteed_rarity,
            guaranteed_rarity_every_n,
            total_drops,
        });
        self.stage_counters = StageCounters::default();
    }

    fn record_chapter(&mut self, chapter: u32, completed: bool) {
        let counters = std::mem::take(&mut self.chapter_counters);
        let hero = &self.state.hero;
        let metrics = ChapterMetrics {
            chapter,
            loots: counters.loots,
            battles: counters.battles,
            defeats: counters.defeats,
            unfair_defeats: counters.unfair_defeats,
            lamp_level: self.state.lamp.level,
            hero_power: hero.power(),
            hero_level: hero.level,
            gold_earned: counters.gold_earned,
            gold_spent: counters.gold_spent,
            max_enemy_power: boss_power(
                chapter,
                self.state.lamp.current_rarity_multiplier,
                &self.ruleset.data,
                &self.ruleset.balance,
            ),
            loots_by_rarity: counters.loots_by_rarity,
            equipped_by_rarity: hero.equipment.count_by_rarity(),
            completed,
        };

        if self.config.verbose {
            tracing::info!(
                chapter,
                completed,
                loots = metrics.loots,
                battles = metrics.battles,
                defeats = metrics.defeats,
                lamp_level = metrics.lamp_level,
                hero_power = metrics.hero_power,
                "chapter recorded"
            );
        }
        self.chapters.push(metrics);
    }

    fn build_summary(self) -> TestSummary {
        let chapters = self.chapters;
        let hero = &self.state.hero;
        TestSummary {
            seed: self.config.seed,
            total_chapters: chapters.iter().filter(|c| c.completed).count() as u32,
            total_loots: chapters.iter().map(|c| c.loots).sum(),
            total_battles: chapters.iter().map(|c| c.battles).sum(),
            total_defeats: chapters.iter().map(|c| c.defeats).sum(),
            total_unfair_defeats: chapters.iter().map(|c| c.unfair_defeats).sum(),
            total_gold_earned: chapters.iter().map(|c| c.gold_earned).sum(),
            total_gold_spent: chapters.iter().map(|c| c.gold_spent).sum(),
            final_lamp_level: self.state.lamp.level,
            final_hero_power: hero.power(),
            final_hero_level: hero.level,
            final_chapter: self.state.dungeon.chapter,
            final_stage: self.state.dungeon.stage,
            iterations: self.iterations,
            hit_iteration_cap: self.hit_iteration_cap,
            chapters,
            stages: self.stages,
        }
    }
}

/// Runs a single tester pass with `config`.
pub fn run_tester(config: TesterConfig) -> Result<TestSummary> {
    Ok(EconomyTester::new(config)?.run())
}

/// Runs `runs` passes with consecutive seeds starting at `config.seed`.
pub fn run_many(config: &TesterConfig, runs: u32) -> Result<Vec<TestSummary>> {
    let ruleset = config.ruleset()?;
    let summaries = (0..runs)
        .map(|run| {
            let config = TesterConfig {
                seed: config.seed.wrapping_add(u64::from(run)),
                ..config.clone()
            };
            let summary = EconomyTester::with_ruleset(config, ruleset.clone()).run();
            tracing::debug!(
                run = run + 1,
                runs,
                seed = summary.seed,
                battles = summary.total_battles,
                capped = summary.hit_iteration_cap,
                "run finished"
            );
            summary
        })
        .collect();
    Ok(summaries)
}
