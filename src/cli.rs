//! Command-line arguments of the one-shot `analyze` binary

use std::path::PathBuf;

use clap::Parser;

/// Run one analysis and print the report as JSON on stdout.
///
/// Market data comes from CoinGecko unless a fixture is given. Settings are
/// read from the environment (and `.env`) the same way the server reads them.
#[derive(Debug, Parser)]
#[command(name = "analyze", version, about = "One-shot crypto swing-trading scan")]
pub struct AnalyzeArgs {
    /// JSON file with `{"assets": [...]}` to analyse instead of live data
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Also deliver the report through Telegram, or the log when Telegram
    /// is not configured
    #[arg(long, default_value_t = false)]
    pub notify: bool,
}
