//! Stage lookups, enemy power and adaptive difficulty.

use super::types::{global_stage, DungeonProgress};
use crate::core::balance::BalanceConfig;
use crate::core::constants::STAGES_PER_CHAPTER;
use crate::core::data::GameData;

pub fn base_stage_power(chapter: u32, stage: u32, data: &GameData) -> u64 {
    data.stage(global_stage(chapter, stage)).power
}

pub fn stage_xp_reward(chapter: u32, stage: u32, data: &GameData) -> u64 {
    data.stage(global_stage(chapter, stage)).xp
}

/// Moves to the next stage, wrapping into the next chapter after the boss.
pub fn advance_progress(progress: &mut DungeonProgress, data: &GameData) {
    progress.stage += 1;
    if progress.stage > STAGES_PER_CHAPTER {
        progress.stage = 1;
        progress.chapter += 1;
    }
    progress.current_enemy_power = base_stage_power(progress.chapter, progress.stage, data);
}

/// `round(base * rarity_multiplier * (1 + difficulty) * boss_multiplier)`,
/// rounded once; the boss factor is 1 off boss stages. Never below 1.
pub fn adjusted_enemy_power(
    progress: &DungeonProgress,
    rarity_multiplier: f64,
    config: &BalanceConfig,
) -> u64 {
    let difficulty = if config.difficulty_enabled {
        1.0 + progress.difficulty_modifier
    } else {
        1.0
    };
    let boss = if progress.is_boss_stage() {
        config.boss_power_multiplier
    } else {
        1.0
    };
    let power = (progress.current_enemy_power as f64 * rarity_multiplier * difficulty * boss).round();
    power.max(1.0) as u64
}

/// Power of the boss closing `chapter` before difficulty, at the given rarity multiplier.
pub fn boss_power(chapter: u32, rarity_multiplier: f64, data: &GameData, config: &BalanceConfig) -> u64 {
    let base = base_stage_power(chapter, STAGES_PER_CHAPTER, data) as f64;
    (base * rarity_multiplier * config.boss_power_multiplier).round() as u64
}

pub fn adjust_difficulty_on_victory(progress: &mut DungeonProgress, config: &BalanceConfig) {
    if !config.difficulty_enabled {
        return;
    }
    progress.difficulty_modifier += config.difficulty_on_victory;
}

/// Applies the defeat delta once per stage. Returns whether it was applied.
pub fn adjust_difficulty_on_defeat(progress: &mut DungeonProgress, config: &BalanceConfig) -> bool {
    if !config.difficulty_enabled {
        return false;
    }
    let stage_id = progress.stage_id();
    if progress.last_defeat_stage == Some(stage_id) {
        return false;
    }
    progress.difficulty_modifier += config.difficulty_on_defeat;
    progress.last_defeat_stage = Some(stage_id);
    true
}
