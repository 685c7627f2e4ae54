//! Lamp: the gacha that turns a lamp level into rarity rolls, plus the
//! smoothed rarity multiplier that enemy power follows.

pub mod logic;
pub mod types;

#[allow(unused_imports)]
pub use logic::*;
#[allow(unused_imports)]
pub use types::*;
