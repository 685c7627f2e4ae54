// Dungeon layout
pub const STAGES_PER_CHAPTER: u32 = 10;
/// Packed stage id multiplier: `chapter * STAGE_ID_CHAPTER_FACTOR + stage`.
pub const STAGE_ID_CHAPTER_FACTOR: u32 = 100;

// Combat
pub const MAX_BATTLE_ROUNDS: u32 = 100;
/// Effective power weighting: `power = hp + EFFECTIVE_DAMAGE_WEIGHT * damage`.
pub const EFFECTIVE_DAMAGE_WEIGHT: u64 = 4;
pub const HERO_NAME: &str = "Hero";

// Hero base stats (before equipment)
pub const HERO_BASE_HP: u64 = 100;
pub const HERO_BASE_DAMAGE: u64 = 10;
pub const HERO_HP_PER_LEVEL: u64 = 20;
pub const HERO_DAMAGE_PER_LEVEL: u64 = 5;
pub const STARTING_LAMPS: u32 = 5;

// Enemy waves
pub const MIN_ENEMIES_PER_WAVE: u32 = 1;
pub const MAX_ENEMIES_PER_WAVE: u32 = 3;
/// Combined party HP of a 2-3 enemy wave as a fraction of target power.
pub const MULTI_WAVE_HP_SHARE: f64 = 0.5;
/// Per-enemy damage share of target power in a 2 enemy wave.
pub const PAIR_WAVE_DAMAGE_SHARE: f64 = 0.083;
/// Per-enemy damage share of target power in a 3 enemy wave.
pub const TRIO_WAVE_DAMAGE_SHARE: f64 = 0.0625;

// Economy rewards
pub const GOLD_PER_ENEMY: u64 = 10;
pub const GOLD_PER_STAGE_CLEAR: u64 = 25;

// Economy tester
pub const MAX_LOOTS_PER_PHASE: u32 = 100;
pub const DEFAULT_MAX_CHAPTERS: u32 = 10;
pub const DEFAULT_MAX_ITERATIONS: u64 = 100_000;
pub const DEFAULT_SEED: u64 = 42;
