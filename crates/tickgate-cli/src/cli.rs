//! CLI argument definitions for tickgate.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Download histories into the data lake |
//! | `validate` | Validate the latest row of one history CSV |
//! | `daily-update` | Fetch, validate, store and quarantine every configured ticker |
//! | `export` | Write one day's stored rows to `Today_Data.csv` |
//! | `reset` | Delete stored rows of tickers |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | none | Pipeline TOML file |
//! | `--db` | `$TICKGATE_HOME/warehouse.duckdb` | Warehouse file |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Exit non-zero when the result carries warnings |
//!
//! # Examples
//!
//! ```bash
//! tickgate daily-update --pretty
//! tickgate daily-update --offline --tickers AI.PA,MC.PA
//! tickgate validate ./financial_data_lake/AI.PA_Historical_Data.csv
//! tickgate export --date 2024-03-01
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Daily stock-price validation gate
#[derive(Debug, Parser)]
#[command(
    name = "tickgate",
    author,
    version,
    about = "Validate daily stock prices before they reach the warehouse"
)]
pub struct Cli {
    /// Pipeline configuration file (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Warehouse database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download full daily histories into the data lake.
    Fetch(FetchArgs),
    /// Validate the latest row of a history CSV file.
    Validate(ValidateArgs),
    /// Run the daily update over every configured ticker.
    DailyUpdate(DailyUpdateArgs),
    /// Export one day's stored rows.
    Export(ExportArgs),
    /// Delete stored rows.
    Reset(ResetArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Tickers to fetch instead of the configured list.
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// `<TICKER>_Historical_Data.csv` file.
    pub file: PathBuf,

    /// Upper bound of the date window (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub as_of: Option<String>,
}

#[derive(Debug, Args)]
pub struct DailyUpdateArgs {
    /// Read histories from the data lake instead of the network.
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// Tickers to process instead of the configured list.
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Upper bound of the date window (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub as_of: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Day to export (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Output file; defaults to `<export_dir>/Today_Data.csv`.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ResetArgs {
    /// Tickers to clear instead of the configured list.
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "tickgate",
            "daily-update",
            "--offline",
            "--tickers",
            "AI.PA,MC.PA",
            "--db",
            "/tmp/w.duckdb",
        ])
        .expect("parse");

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/w.duckdb")));
        match cli.command {
            Command::DailyUpdate(args) => {
                assert!(args.offline);
                assert_eq!(args.tickers, vec!["AI.PA", "MC.PA"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn validate_requires_a_file() {
        assert!(Cli::try_parse_from(["tickgate", "validate"]).is_err());
    }
}
