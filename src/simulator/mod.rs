//! Headless economy tester for balance analysis.
//!
//! Plays the real [`GameState`](crate::core::game_state::GameState) in a
//! tight loop to measure:
//! - Loots and battles needed per stage and chapter
//! - How hero power tracks enemy power
//! - Lamp progression and gold flow
//! - Where guaranteed drops kick in
//!
//! Runs are deterministic for a given seed.

mod config;
mod metrics;
mod report;
mod runner;

pub use config::TesterConfig;
pub use metrics::{ChapterMetrics, StageMetrics, TestSummary};
pub use report::{chapter_table, stages_csv, summary_text, to_json, MultiRunReport};
pub use runner::{run_many, run_tester, EconomyTester};
