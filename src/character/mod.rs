//! Hero model and persistence.

#![allow(unused_imports)]

pub mod hero;
pub mod save;

pub use hero::*;
pub use save::*;
