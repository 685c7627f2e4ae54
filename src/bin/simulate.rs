//! Economy tester CLI.
//!
//! Plays seeded games headlessly and prints a balance report.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                         # 10 chapters, seed 42
//!   cargo run --bin simulate -- -c 3 --seed 7        # first 3 chapters
//!   cargo run --bin simulate -- --runs 20            # 20 consecutive seeds
//!   cargo run --bin simulate -- --features baseline  # no loot features

use cult_battle::build_info::version_line;
use cult_battle::core::balance::{BalanceConfig, BalanceOverrides, FeatureFlags};
use cult_battle::simulator::{
    run_many, run_tester, stages_csv, summary_text, to_json, MultiRunReport, TesterConfig,
};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

struct CliOptions {
    config: TesterConfig,
    runs: u32,
    features: Option<String>,
    overrides: Option<PathBuf>,
    csv: Option<PathBuf>,
    json: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {}", message);
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    let default_level = if options.config.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(mut options: CliOptions) -> Result<(), Box<dyn std::error::Error>> {
    options.config.balance = build_balance(options.features.as_deref(), options.overrides.as_deref())?;
    let config = &options.config;

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              CULT BATTLE ECONOMY TESTER                       ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Runs:            {}", options.runs);
    println!("  Max Chapters:    {}", config.max_chapters);
    println!("  Max Iterations:  {}", config.max_iterations);
    println!("  Seed:            {}", config.seed);
    println!("  Features:        {}", describe_features(&config.balance.features));
    println!();

    if options.runs > 1 {
        let summaries = run_many(config, options.runs)?;
        println!("{}", MultiRunReport::from_runs(&summaries).to_text());
        if options.json {
            write_json_report(&serde_json::to_string_pretty(&summaries)?)?;
        }
        return Ok(());
    }

    let summary = run_tester(config.clone())?;
    println!("{}", summary_text(&summary));

    if let Some(path) = &options.csv {
        std::fs::write(path, stages_csv(&summary))?;
        println!("Stage CSV saved to: {}", path.display());
    }
    if options.json {
        write_json_report(&to_json(&summary)?)?;
    }
    Ok(())
}

/// Defaults, then the feature preset, then the overrides file.
fn build_balance(
    features: Option<&str>,
    overrides: Option<&Path>,
) -> Result<BalanceConfig, Box<dyn std::error::Error>> {
    let mut balance = BalanceConfig::default();
    if let Some(features) = features {
        balance.features = FeatureFlags::parse(features)?;
    }
    if let Some(path) = overrides {
        balance.apply(&BalanceOverrides::from_file(path)?);
    }
    balance.validate()?;
    Ok(balance)
}

fn describe_features(features: &FeatureFlags) -> String {
    let enabled: Vec<&str> = FeatureFlags::NAMES
        .iter()
        .zip([
            features.item_level_range,
            features.power_variance,
            features.guaranteed_upgrade,
            features.rarity_weighting,
            features.guaranteed_rarity,
        ])
        .filter(|(_, on)| *on)
        .map(|(name, _)| *name)
        .collect();
    if enabled.is_empty() {
        "baseline".to_string()
    } else {
        enabled.join(", ")
    }
}

fn write_json_report(json: &str) -> std::io::Result<()> {
    let filename = format!(
        "economy_report_{}.json",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    );
    std::fs::write(&filename, json)?;
    println!("JSON report saved to: {}", filename);
    Ok(())
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        config: TesterConfig::default(),
        runs: 1,
        features: None,
        overrides: None,
        csv: None,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match flag {
            "-c" | "--chapters" => {
                options.config.max_chapters = parse_number(flag, &value()?)?;
            }
            "-s" | "--seed" => {
                options.config.seed = parse_number(flag, &value()?)?;
            }
            "-n" | "--runs" => {
                options.runs = parse_number::<u32>(flag, &value()?)?.max(1);
            }
            "-i" | "--max-iterations" => {
                options.config.max_iterations = parse_number(flag, &value()?)?;
            }
            "-f" | "--features" => {
                options.features = Some(value()?);
            }
            "-o" | "--overrides" => {
                options.overrides = Some(PathBuf::from(value()?));
            }
            "--csv" => {
                options.csv = Some(PathBuf::from(value()?));
            }
            "--json" => {
                options.json = true;
            }
            "-v" | "--verbose" => {
                options.config.verbose = true;
            }
            "-V" | "--version" => {
                println!("simulate {}", version_line());
                std::process::exit(0);
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
        i += 1;
    }

    Ok(options)
}

fn parse_number<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{} expects a number, got '{}'", flag, raw))
}

fn print_help() {
    println!("Cult Battle Economy Tester");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --chapters <N>        Chapters to clear (default: 10)");
    println!("    -s, --seed <S>            RNG seed (default: 42)");
    println!("    -n, --runs <N>            Run N consecutive seeds and aggregate");
    println!("    -i, --max-iterations <N>  Iteration safety cap (default: 100000)");
    println!("    -f, --features <LIST>     full | baseline | comma list of:");
    println!("                              {}", FeatureFlags::NAMES.join(", "));
    println!("    -o, --overrides <FILE>    JSON file with balance overrides");
    println!("    --csv <FILE>              Write per-stage metrics as CSV");
    println!("    --json                    Save JSON report");
    println!("    -v, --verbose             Log each chapter");
    println!("    -V, --version             Show version");
    println!("    -h, --help                Show this help");
    println!();
    println!("Set RUST_LOG=debug for per-stage tracing.");
}
