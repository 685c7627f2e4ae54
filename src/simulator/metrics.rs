//! Metrics recorded by the economy tester.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::items::types::Rarity;

/// Snapshot taken when a stage is cleared, before its rewards are applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageMetrics {
    pub chapter: u32,
    pub stage: u32,
    pub loots: u32,
    pub battles: u32,
    pub defeats: u32,
    pub hero_level: u32,
    pub hero_power: u64,
    pub hero_hp: u64,
    pub hero_damage: u64,
    pub slots: usize,
    /// Adjusted power the stage was fought at.
    pub enemy_power: u64,
    /// Target rarity multiplier for the current lamp level and slots.
    pub rarity_multiplier: f64,
    /// Smoothed multiplier enemy power was scaled by.
    pub current_rarity_multiplier: f64,
    pub difficulty_modifier: f64,
    pub lamp_level: u32,
    pub gold: u64,
    /// 0 when guaranteed upgrades are disabled.
    pub guaranteed_every_n: u32,
    pub guaranteed_rarity: Rarity,
    /// 0 when guaranteed rarity is disabled.
    pub guaranteed_rarity_every_n: u32,
    pub total_drops: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterMetrics {
    pub chapter: u32,
    pub loots: u32,
    pub battles: u32,
    pub defeats: u32,
    /// Defeats where the hero's power was at least the enemy's.
    pub unfair_defeats: u32,
    pub lamp_level: u32,
    pub hero_power: u64,
    pub hero_level: u32,
    pub gold_earned: u64,
    pub gold_spent: u64,
    /// Boss power at the lamp's multiplier when the chapter was recorded.
    pub max_enemy_power: u64,
    pub loots_by_rarity: BTreeMap<Rarity, u32>,
    pub equipped_by_rarity: BTreeMap<Rarity, u32>,
    /// False for the chapter cut short by the iteration cap.
    pub completed: bool,
}

/// Counters accumulated while a chapter is in progress.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChapterCounters {
    pub loots: u32,
    pub battles: u32,
    pub defeats: u32,
    pub unfair_defeats: u32,
    pub gold_earned: u64,
    pub gold_spent: u64,
    pub loots_by_rarity: BTreeMap<Rarity, u32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StageCounters {
    pub loots: u32,
    pub battles: u32,
    pub defeats: u32,
}

/// Result of one tester run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSummary {
    pub seed: u64,
    /// Chapters cleared.
    pub total_chapters: u32,
    pub total_loots: u32,
    pub total_battles: u32,
    pub total_defeats: u32,
    pub total_unfair_defeats: u32,
    pub total_gold_earned: u64,
    pub total_gold_spent: u64,
    pub final_lamp_level: u32,
    pub final_hero_power: u64,
    pub final_hero_level: u32,
    pub final_chapter: u32,
    pub final_stage: u32,
    pub iterations: u64,
    pub hit_iteration_cap: bool,
    pub chapters: Vec<ChapterMetrics>,
    pub stages: Vec<StageMetrics>,
}

impl TestSummary {
    pub fn defeat_rate(&self) -> f64 {
        if self.total_battles == 0 {
            return 0.0;
        }
        self.total_defeats as f64 / self.total_battles as f64
    }

    /// Loots per cleared stage, the headline pacing number.
    pub fn loots_per_stage(&self) -> f64 {
        if self.stages.is_empty() {
            return 0.0;
        }
        self.total_loots as f64 / self.stages.len() as f64
    }
}
