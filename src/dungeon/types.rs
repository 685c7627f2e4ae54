//! Dungeon progress state.

use serde::{Deserialize, Serialize};

use crate::core::constants::{STAGES_PER_CHAPTER, STAGE_ID_CHAPTER_FACTOR};
use crate::core::data::GameData;

/// Where the hero is in the dungeon and how hard it currently pushes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonProgress {
    pub chapter: u32,
    /// 1..=STAGES_PER_CHAPTER; the last stage is the boss.
    pub stage: u32,
    /// Base stage power before rarity, difficulty and boss multipliers.
    pub current_enemy_power: u64,
    /// Additive, unbounded. Nudged up per victory and down per new defeat.
    #[serde(default)]
    pub difficulty_modifier: f64,
    /// Packed `chapter * 100 + stage` of the last stage that lowered difficulty.
    #[serde(default)]
    pub last_defeat_stage: Option<u32>,
}

impl DungeonProgress {
    pub fn new(data: &GameData) -> Self {
        Self {
            chapter: 1,
            stage: 1,
            current_enemy_power: data.stage(1).power,
            difficulty_modifier: 0.0,
            last_defeat_stage: None,
        }
    }

    /// `(chapter - 1) * STAGES_PER_CHAPTER + stage`.
    pub fn global_stage(&self) -> u32 {
        global_stage(self.chapter, self.stage)
    }

    pub fn stage_id(&self) -> u32 {
        self.chapter * STAGE_ID_CHAPTER_FACTOR + self.stage
    }

    pub fn is_boss_stage(&self) -> bool {
        is_boss_stage(self.stage)
    }
}

pub fn global_stage(chapter: u32, stage: u32) -> u32 {
    chapter.saturating_sub(1) * STAGES_PER_CHAPTER + stage
}

pub fn is_boss_stage(stage: u32) -> bool {
    stage == STAGES_PER_CHAPTER
}
