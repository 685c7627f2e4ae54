//! Core game state, rules data and balance configuration.

#![allow(unused_imports)]

pub mod balance;
pub mod constants;
pub mod data;
pub mod error;
pub mod game_state;
pub mod session;

pub use balance::*;
pub use constants::*;
pub use data::*;
pub use error::*;
pub use game_state::*;
pub use session::*;
