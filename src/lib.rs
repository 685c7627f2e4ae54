//! Cult Battle - idle loot RPG economy engine
//!
//! Item generation, the gacha lamp, dungeon progression, turn-based battles
//! and a headless economy tester. The crate has no UI; everything here is
//! deterministic given a seeded RNG.

pub mod build_info;
pub mod character;
pub mod combat;
pub mod core;
pub mod dungeon;
pub mod items;
pub mod lamp;
pub mod simulator;
