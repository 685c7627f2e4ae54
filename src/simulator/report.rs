//! Tester report generation: chapter table, per-stage CSV, JSON, and an
//! aggregate over several seeds.

use super::metrics::TestSummary;
use serde::Serialize;
use std::fmt::Write;

const RULE: &str = "═══════════════════════════════════════════════════════════════════════════\n";

/// Human-readable report of one run.
pub fn summary_text(summary: &TestSummary) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("                         ECONOMY TEST REPORT\n");
    report.push_str(RULE);
    report.push('\n');

    let _ = writeln!(report, "  Seed:              {}", summary.seed);
    let _ = writeln!(report, "  Chapters cleared:  {}", summary.total_chapters);
    let _ = writeln!(
        report,
        "  Reached:           chapter {} stage {}",
        summary.final_chapter, summary.final_stage
    );
    let _ = writeln!(report, "  Iterations:        {}", summary.iterations);
    let _ = writeln!(
        report,
        "  Loots:             {} ({:.1} per stage)",
        summary.total_loots,
        summary.loots_per_stage()
    );
    let _ = writeln!(
        report,
        "  Battles:           {} ({} defeats, {} unfair, {:.1}% lost)",
        summary.total_battles,
        summary.total_defeats,
        summary.total_unfair_defeats,
        summary.defeat_rate() * 100.0
    );
    let _ = writeln!(
        report,
        "  Gold:              {} earned, {} spent",
        summary.total_gold_earned, summary.total_gold_spent
    );
    let _ = writeln!(
        report,
        "  Final hero:        level {}, power {}",
        summary.final_hero_level, summary.final_hero_power
    );
    let _ = writeln!(report, "  Final lamp level:  {}", summary.final_lamp_level);
    report.push('\n');

    report.push_str(&chapter_table(summary));

    if summary.hit_iteration_cap {
        report.push_str("\n  ⚠️  Iteration cap reached - results are partial\n");
    }
    report.push('\n');
    report.push_str(RULE);
    report
}

/// One row per recorded chapter.
pub fn chapter_table(summary: &TestSummary) -> String {
    let mut table = String::new();
    table.push_str("── CHAPTERS ───────────────────────────────────────────────────────────────\n");
    table.push_str("  Ch   Loots  Battles  Defeats  Unfair  Lamp  Level    Power     Boss   Gold+   Gold-\n");
    for c in &summary.chapters {
        let _ = writeln!(
            table,
            "  {:>2}{} {:>6} {:>8} {:>8} {:>7} {:>5} {:>6} {:>8} {:>8} {:>7} {:>7}",
            c.chapter,
            if c.completed { ' ' } else { '*' },
            c.loots,
            c.battles,
            c.defeats,
            c.unfair_defeats,
            c.lamp_level,
            c.hero_level,
            c.hero_power,
            c.max_enemy_power,
            c.gold_earned,
            c.gold_spent
        );
    }
    if summary.chapters.iter().any(|c| !c.completed) {
        table.push_str("  * chapter not finished\n");
    }
    table
}

const STAGE_CSV_HEADER: &str = "chapter,stage,loots,battles,defeats,hero_level,hero_power,hero_hp,\
hero_damage,slots,enemy_power,rarity_multiplier,current_rarity_multiplier,difficulty_modifier,\
lamp_level,gold,guaranteed_every_n,guaranteed_rarity,guaranteed_rarity_every_n,total_drops";

/// Per-stage metrics as CSV, one header line plus one line per cleared stage.
pub fn stages_csv(summary: &TestSummary) -> String {
    let mut csv = String::with_capacity(64 * (summary.stages.len() + 1));
    csv.push_str(STAGE_CSV_HEADER);
    csv.push('\n');
    for s in &summary.stages {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{:.4},{:.4},{:.4},{},{},{},{},{},{:.2}",
            s.chapter,
            s.stage,
            s.loots,
            s.battles,
            s.defeats,
            s.hero_level,
            s.hero_power,
            s.hero_hp,
            s.hero_damage,
            s.slots,
            s.enemy_power,
            s.rarity_multiplier,
            s.current_rarity_multiplier,
            s.difficulty_modifier,
            s.lamp_level,
            s.gold,
            s.guaranteed_every_n,
            s.guaranteed_rarity.name().to_lowercase(),
            s.guaranteed_rarity_every_n,
            s.total_drops
        );
    }
    csv
}

pub fn to_json(summary: &TestSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

fn average(runs: &[TestSummary], value: impl Fn(&TestSummary) -> f64) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().map(value).sum::<f64>() / runs.len() as f64
}

/// Aggregated results from several seeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiRunReport {
    pub num_runs: u32,
    pub runs_completed: u32,
    pub runs_capped: u32,
    pub avg_chapters: f64,
    pub avg_loots: f64,
    pub avg_battles: f64,
    pub avg_defeats: f64,
    pub avg_final_lamp_level: f64,
    pub avg_final_hero_level: f64,
    pub avg_final_hero_power: f64,
    pub min_battles: u32,
    pub max_battles: u32,
}

impl MultiRunReport {
    pub fn from_runs(runs: &[TestSummary]) -> Self {
        let num_runs = runs.len() as u32;
        Self {
            num_runs,
            runs_completed: runs.iter().filter(|r| !r.hit_iteration_cap).count() as u32,
            runs_capped: runs.iter().filter(|r| r.hit_iteration_cap).count() as u32,
            avg_chapters: average(runs, |r| r.total_chapters as f64),
            avg_loots: average(runs, |r| r.total_loots as f64),
            avg_battles: average(runs, |r| r.total_battles as f64),
            avg_defeats: average(runs, |r| r.total_defeats as f64),
            avg_final_lamp_level: average(runs, |r| r.final_lamp_level as f64),
            avg_final_hero_level: average(runs, |r| r.final_hero_level as f64),
            avg_final_hero_power: average(runs, |r| r.final_hero_power as f64),
            min_battles: runs.iter().map(|r| r.total_battles).min().unwrap_or(0),
            max_battles: runs.iter().map(|r| r.total_battles).max().unwrap_or(0),
        }
    }

    pub fn to_text(&self) -> String {
        let mut report = String::new();
        report.push_str(RULE);
        report.push_str("                       ECONOMY TEST - MULTI-SEED REPORT\n");
        report.push_str(RULE);
        report.push('\n');

        let _ = writeln!(
            report,
            "Runs: {} total, {} completed, {} hit the iteration cap\n",
            self.num_runs, self.runs_completed, self.runs_capped
        );
        let _ = writeln!(report, "  Avg Chapters:      {:.1}", self.avg_chapters);
        let _ = writeln!(report, "  Avg Loots:         {:.0}", self.avg_loots);
        let _ = writeln!(
            report,
            "  Avg Battles:       {:.0} (min {}, max {})",
            self.avg_battles, self.min_battles, self.max_battles
        );
        let _ = writeln!(report, "  Avg Defeats:       {:.1}", self.avg_defeats);
        let _ = writeln!(report, "  Avg Lamp Level:    {:.1}", self.avg_final_lamp_level);
        let _ = writeln!(report, "  Avg Hero Level:    {:.1}", self.avg_final_hero_level);
        let _ = writeln!(report, "  Avg Hero Power:    {:.0}", self.avg_final_hero_power);

        report.push_str("\n── BALANCE ASSESSMENT ─────────────────────────────────────────────────────\n");
        let defeat_rate = if self.avg_battles > 0.0 {
            self.avg_defeats / self.avg_battles
        } else {
            0.0
        };
        let rating = if defeat_rate < 0.05 {
            "TOO EASY - Hero rarely loses"
        } else if defeat_rate < 0.35 {
            "GOOD - Challenging but fair"
        } else if defeat_rate < 0.6 {
            "HARD - Frequent defeats"
        } else {
            "TOO HARD - Defeats dominate"
        };
        let _ = writeln!(report, "  Defeat Rate:  {:.1}%", defeat_rate * 100.0);
        let _ = writeln!(report, "  Rating:       {}", rating);
        if self.runs_capped > 0 {
            report.push_str("  ⚠️  Some runs hit the iteration cap - progression stalls\n");
        }

        report.push('\n');
        report.push_str(RULE);
        report
    }
}
