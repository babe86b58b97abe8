//! Run command implementation.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use daybar_lib::prelude::*;
use std::path::PathBuf;
use tracing::info;

use crate::display::print_run;
use crate::logging::LogFormat;

/// Flags for a single pipeline run. Each one overrides the file and
/// environment.
#[derive(Debug, Default, Args)]
pub(crate) struct RunArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Ticker symbol (e.g., AAPL)
    #[arg(short, long)]
    pub(crate) ticker: Option<String>,

    /// First day (YYYY-MM-DD)
    #[arg(long, value_parser = crate::parse_date)]
    pub(crate) from: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long, value_parser = crate::parse_date)]
    pub(crate) to: Option<NaiveDate>,

    /// Bars requested per page
    #[arg(long)]
    pub(crate) page_limit: Option<u32>,

    /// Skip the per-ticker audit log
    #[arg(long)]
    pub(crate) no_audit: bool,
}

impl RunArgs {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(ticker) = &self.ticker {
            config.ticker = Some(ticker.clone());
        }
        if self.from.is_some() {
            config.window.from = self.from;
        }
        if self.to.is_some() {
            config.window.to = self.to;
        }
        if let Some(page_limit) = self.page_limit {
            config.page_limit = page_limit;
        }
        if self.no_audit {
            config.audit.enabled = false;
        }
    }
}

/// Executes one pipeline run. A failed run exits non-zero.
pub(crate) async fn run(args: RunArgs, format: LogFormat, quiet: bool) -> Result<()> {
    let mut config =
        PipelineConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    let plan = config
        .plan(Utc::now().date_naive())
        .context("Invalid configuration")?;
    let client_config = config
        .provider
        .client_config()
        .context("Invalid provider configuration")?;
    let client = PolygonClient::new(client_config).context("Failed to create HTTP client")?;
    let store = PgStore::new(
        config
            .store
            .database_url()
            .context("Invalid store configuration")?,
        config
            .store
            .table_name()
            .context("Invalid store configuration")?,
    );

    info!(ticker = %plan.ticker, window = %plan.window, table = %store.table(), "Configured run");

    let mut pipeline = Pipeline::new(client, store, plan);
    if let Some(audit) = config.audit.audit_log() {
        pipeline = pipeline.with_audit_log(audit);
    }

    match pipeline.execute().await {
        Ok(run) => {
            if !quiet {
                print_run(&run, format)?;
            }
            Ok(())
        }
        Err(failure) => {
            if !quiet {
                print_run(failure.run(), format)?;
            }
            Err(failure.into())
        }
    }
}
