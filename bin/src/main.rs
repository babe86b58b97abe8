//! daybar CLI - Daily OHLCV bars from Polygon into PostgreSQL.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use daybar_lib::DEFAULT_TABLE;

mod commands;
mod display;
mod logging;

use logging::LogFormat;

#[derive(Parser)]
#[command(name = "daybar")]
#[command(about = "Load daily OHLCV bars into PostgreSQL", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only, no summary)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log and summary output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one pipeline run
    Run(commands::run::RunArgs),

    /// Print the DDL the loader ensures
    Schema {
        /// Destination table
        #[arg(long, default_value = DEFAULT_TABLE)]
        table: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet, cli.log_format)?;

    match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.log_format, cli.quiet).await,
        Commands::Schema { table } => commands::schema::print_schema(&table),
    }
}

/// Parses a `YYYY-MM-DD` date argument.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
