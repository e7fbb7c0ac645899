//! CLI argument definitions for regimpact.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `evaluate` | Score a regulation insight read from a file or stdin |
//! | `demo` | Score the bundled carbon-tax demonstration insight |
//! | `rules` | Print the active keyword rule table |
//! | `universe` | Print the active security directory |
//! | `snapshot` | Fetch market snapshots for tickers |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | none | YAML engine configuration |
//! | `--rules` | built-in | YAML rule table |
//! | `--directory` | built-in | YAML security directory |
//! | `--timeout-ms` | `3000` | Per-security market data budget |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--log-level` | `RUST_LOG` or `warn` | Log filter, written to stderr |
//!
//! # Examples
//!
//! ```bash
//! regimpact evaluate --input insight.json --pretty
//! cat insight.json | regimpact evaluate --offline
//! regimpact demo --market-data caps.json --with-severity
//! regimpact snapshot NVDA BA
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Regulatory impact risk scoring.
///
/// Turns keywords, sectors and tickers extracted from a regulation into
/// ranked per-security risk scores, sector aggregates and one recommendation.
#[derive(Debug, Parser)]
#[command(name = "regimpact", author, version, about = "Regulatory impact risk scoring")]
pub struct Cli {
    /// YAML engine configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// YAML rule table replacing the built-in one.
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// YAML security directory replacing the built-in one.
    #[arg(long, global = true)]
    pub directory: Option<PathBuf>,

    /// Per-security market data timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Upper bound on concurrent market data fetches.
    #[arg(long, global = true)]
    pub max_concurrent_fetches: Option<usize>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log filter directive (e.g. `debug`, `regimpact_core=trace`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a regulation insight.
    ///
    ///   regimpact evaluate --input insight.json
    ///   regimpact evaluate < insight.json
    Evaluate(EvaluateArgs),

    /// Score the bundled demonstration insight (carbon tax on aviation).
    Demo(DemoArgs),

    /// Print the active keyword rule table.
    Rules,

    /// Print the active security directory.
    Universe,

    /// Fetch market snapshots for one or more tickers.
    ///
    ///   regimpact snapshot NVDA BA XOM
    Snapshot(SnapshotArgs),
}

/// Where market data comes from.
#[derive(Debug, Clone, Default, Args)]
pub struct MarketDataArgs {
    /// JSON array of snapshots used instead of Yahoo Finance.
    #[arg(long, conflicts_with = "offline")]
    pub market_data: Option<PathBuf>,

    /// Skip market data entirely; every security gets the lowest systemic tier.
    #[arg(long, default_value_t = false)]
    pub offline: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EvaluateArgs {
    /// Insight JSON file, or `-` for stdin.
    #[arg(long, short, default_value = "-")]
    pub input: String,

    #[command(flatten)]
    pub market: MarketDataArgs,

    /// Attach a severity assessment of the summary under `enrichment`.
    #[arg(long, default_value_t = false)]
    pub with_severity: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DemoArgs {
    #[command(flatten)]
    pub market: MarketDataArgs,

    #[arg(long, default_value_t = false)]
    pub with_severity: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SnapshotArgs {
    /// Tickers to look up.
    #[arg(required = true, num_args = 1..)]
    pub tickers: Vec<String>,

    #[command(flatten)]
    pub market: MarketDataArgs,
}
