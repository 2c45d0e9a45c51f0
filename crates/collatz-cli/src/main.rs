mod render;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use collatz_bench::BenchmarkHarness;
use collatz_config::{CollatzConfig, ThresholdMb};
use collatz_engine::{NumberResult, SequenceEngine};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "collatz",
    version,
    about = "Collatz trajectories with a memoized engine (bench, sequence, longest)"
)]
struct Cli {
    /// Path to a `collatz.toml` config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Benchmark cached against uncached computation over a range
    Bench(BenchArgs),
    /// Print the trajectory of a single number
    Sequence(SequenceArgs),
    /// Find the number below a limit with the longest trajectory
    Longest(LongestArgs),
    /// Print the JSON schema of `collatz.toml`
    ConfigSchema,
}

#[derive(Args)]
struct BenchArgs {
    /// First number of the range [default: 1]
    start: Option<u64>,
    /// Last number of the range, inclusive [default: 1000000]
    end: Option<u64>,
    /// Trajectory cache capacity [default: config or 80000]
    cache_size: Option<usize>,
    /// Numbers per batch [default: config or 40000]
    batch_size: Option<u64>,
    /// Memory threshold in MB [default: config or 400]
    memory_threshold_mb: Option<u64>,
    /// Measured samples per batch [default: config or 3]
    sample_size: Option<u32>,
    /// Discarded warmup passes [default: config or 1]
    warmup_runs: Option<u32>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SequenceArgs {
    /// Starting number
    n: u64,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct LongestArgs {
    /// Search numbers below this limit
    limit: u64,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

const DEFAULT_START: u64 = 1;
const DEFAULT_END: u64 = 1_000_000;

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = load_config(cli.config.as_ref())?;
    collatz_config::init_tracing(&config.logging);
    if let Some(path) = &cli.config {
        tracing::debug!(target = "collatz.cli", path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Bench(args) => {
            apply_bench_overrides(&mut config, &args);
            let start = args.start.unwrap_or(DEFAULT_START);
            let end = args.end.unwrap_or(DEFAULT_END);

            let mut engine = SequenceEngine::new(config.engine_config())?;
            let harness = BenchmarkHarness::new(config.bench_config())?;
            let report = harness
                .compare_implementations(&mut engine, start, end)
                .with_context(|| format!("benchmark over {start}..={end} failed"))?;

            if args.json {
                print_json(&report)?;
            } else {
                print!("{}", render::bench_report(&report));
            }
            Ok(0)
        }
        Command::Sequence(args) => {
            let mut engine = SequenceEngine::new(config.engine_config())?;
            let trajectory = engine.calculate_sequence(args.n, false)?;
            let result = NumberResult {
                number: args.n,
                trajectory,
            };
            if args.json {
                print_json(&result)?;
            } else {
                print!("{}", render::trajectory(&result));
            }
            Ok(0)
        }
        Command::Longest(args) => {
            if args.limit < 2 {
                bail!("limit must be at least 2 (numbers below the limit are searched)");
            }
            let mut engine = SequenceEngine::new(config.engine_config())?;
            let longest = engine
                .longest_in_range(1, args.limit - 1)?
                .context("empty search range")?;
            if args.json {
                print_json(&longest)?;
            } else {
                println!(
                    "The number under {} with the longest Collatz sequence is {}, with {} steps.",
                    args.limit, longest.number, longest.steps
                );
            }
            Ok(0)
        }
        Command::ConfigSchema => {
            print_json(&collatz_config::json_schema())?;
            Ok(0)
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<CollatzConfig> {
    let Some(path) = path else {
        return Ok(CollatzConfig::default());
    };

    let (config, diagnostics) = CollatzConfig::load_from_path_with_diagnostics(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    for key in &diagnostics.unknown_keys {
        eprintln!("warning: unknown config key `{key}`");
    }
    for warning in &diagnostics.warnings {
        eprintln!("warning: {warning:?}");
    }
    if !diagnostics.is_ok() {
        for error in &diagnostics.errors {
            eprintln!("error: {error:?}");
        }
        bail!("invalid config {}", path.display());
    }
    Ok(config)
}

fn apply_bench_overrides(config: &mut CollatzConfig, args: &BenchArgs) {
    if let Some(cache_size) = args.cache_size {
        config.cache_size = cache_size;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(threshold) = args.memory_threshold_mb {
        config.memory_threshold_mb = ThresholdMb(threshold);
    }
    if let Some(sample_size) = args.sample_size {
        config.sample_size = sample_size;
    }
    if let Some(warmup_runs) = args.warmup_runs {
        config.warmup_runs = warmup_runs;
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
