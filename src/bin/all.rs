//! Command-line runner for the built-in suites.
//!
//! Usage:
//!   rankbench                      # Run all suites
//!   rankbench --list               # List available suites
//!   rankbench nested_break         # Run a specific suite
//!   rankbench small_sort --csv out.csv --trials 200 --best-of 20

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use rankbench::config::BenchConfig;
use rankbench::error::Result;
use rankbench::harness::run_suite;
use rankbench::registry::{build_registry, Suite};
use rankbench::report::export_csv;
use rankbench::tui;

#[derive(Parser)]
#[command(
    name = "rankbench",
    about = "Compare implementations with best-of timing and skill ranking",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Suite to run (omit for all)
    suite: Option<String>,

    /// List available suites
    #[arg(short, long)]
    list: bool,

    /// TOML benchmark configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Measured calls per configuration
    #[arg(long)]
    trials: Option<usize>,

    /// Chunk size for the best-of minimum; must divide --trials
    #[arg(long)]
    best_of: Option<usize>,

    /// Untimed calls before measuring each configuration
    #[arg(long)]
    warmup: Option<usize>,

    /// Only print the ranking summary and export only summary rows
    #[arg(short, long)]
    summary: bool,

    /// Export the long-form table as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Export the full report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn setup_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<BenchConfig> {
    let mut config = match &cli.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    if let Some(trials) = cli.trials {
        config.timing.num_trials = trials;
    }
    if let Some(best_of) = cli.best_of {
        config.timing.best_of = best_of;
    }
    if let Some(warmup) = cli.warmup {
        config.timing.warmup_iterations = warmup;
    }
    if cli.summary {
        config.record_all = false;
    }
    Ok(config)
}

/// `out.csv` becomes `out_<suite>.csv` when several suites share one path
fn output_path(path: &Path, suite: &str, shared: bool) -> PathBuf {
    if !shared {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, suite, ext.to_string_lossy()),
        None => format!("{}_{}", stem, suite),
    };
    path.with_file_name(name)
}

fn run_one(suite: &dyn Suite, mut config: BenchConfig, cli: &Cli, shared: bool) -> Result<()> {
    if config.axes.is_empty() {
        config.axes = suite.default_axes();
    }
    tui::print_suite_info_box(suite, &config.axes);
    let report = run_suite(suite, config)?;
    tui::print_report(&report, cli.summary);

    if let Some(path) = &cli.csv {
        let path = output_path(path, suite.name(), shared);
        export_csv(&path, &report.rows)?;
        info!(path = %path.display(), rows = report.rows.len(), "wrote CSV");
    }
    if let Some(path) = &cli.json {
        let path = output_path(path, suite.name(), shared);
        report.save_json(&path)?;
        info!(path = %path.display(), "wrote JSON report");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);
    let registry = build_registry();

    if cli.list {
        tui::print_available_suites(&registry);
        return ExitCode::SUCCESS;
    }

    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let suites: Vec<&dyn Suite> = match &cli.suite {
        Some(name) => match registry.find(name) {
            Some(suite) => vec![suite],
            None => {
                eprintln!("Suite '{}' not found.", name);
                eprintln!("Available: {:?}", registry.list_names());
                return ExitCode::FAILURE;
            }
        },
        None => {
            if !config.axes.is_empty() {
                warn!("configured axes only apply to a named suite; using suite defaults");
                config.axes = Default::default();
            }
            registry.all().iter().map(|s| s.as_ref()).collect()
        }
    };

    tui::print_header();

    let shared = suites.len() > 1;
    for suite in suites {
        if let Err(e) = run_one(suite, config.clone(), &cli, shared) {
            error!(suite = suite.name(), "{}", e);
            eprintln!("Error in suite '{}': {}", suite.name(), e);
            return ExitCode::FAILURE;
        }
    }

    println!("Note: speedups are relative to the slowest candidate of each group.");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let path = Path::new("out/data.csv");
        assert_eq!(output_path(path, "small_sort", false), PathBuf::from("out/data.csv"));
        assert_eq!(
            output_path(path, "small_sort", true),
            PathBuf::from("out/data_small_sort.csv")
        );
        assert_eq!(
            output_path(Path::new("report"), "nested_break", true),
            PathBuf::from("report_nested_break")
        );
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["rankbench", "small_sort", "--trials", "40", "--best-of", "8"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.timing.num_trials, 40);
        assert_eq!(config.timing.best_of, 8);
        assert!(config.record_all);
        assert_eq!(cli.suite.as_deref(), Some("small_sort"));
    }

    #[test]
    fn test_summary_disables_record_all() {
        let cli = Cli::parse_from(["rankbench", "small_sort", "--summary", "--csv", "sort.csv"]);
        let config = load_config(&cli).unwrap();
        assert!(!config.record_all);
        assert!(cli.summary);
    }
}
