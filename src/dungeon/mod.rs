//! Chapter/stage progression and adaptive difficulty.

pub mod logic;
pub mod types;

#[allow(unused_imports)]
pub use logic::*;
#[allow(unused_imports)]
pub use types::*;
