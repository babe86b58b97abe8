//! Daily OHLCV extract, transform and load pipeline for PostgreSQL.
//!
//! This is a facade crate that re-exports functionality from the daybar
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use daybar_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::load(None)?;
//!     let plan = config.plan(chrono::Utc::now().date_naive())?;
//!
//!     let client = PolygonClient::new(config.provider.client_config()?)?;
//!     let store = PgStore::new(config.store.database_url()?, config.store.table_name()?);
//!
//!     let run = Pipeline::new(client, store, plan).execute().await?;
//!     println!("Loaded {} rows for {}", run.attempted, run.ticker);
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/daybar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use daybar_types::*;

// Re-export extraction
#[cfg(feature = "fetch")]
pub use daybar_fetch::{
    AggregateBar, AggregatesPage, AggregatesQuery, AggregatesSource, AuditLog, ClientConfig,
    Extractor, FetchError, PageRequest, PolygonClient, ProviderError, ScriptedSource, bar_pages,
};

// Re-export normalization
#[cfg(feature = "transform")]
pub use daybar_transform::{TransformError, Transformer, derive_date};

// Re-export loading
#[cfg(feature = "store")]
pub use daybar_store::{
    DEFAULT_TABLE, LoadError, Loader, MemoryStore, PgStore, PriceStore, StoreSession, TableName,
    create_table_sql,
};

// Re-export orchestration
#[cfg(feature = "pipeline")]
pub use daybar_pipeline::{
    ConfigError, Pipeline, PipelineConfig, PipelineError, PipelineRun, RunFailure, RunPlan,
    RunState, Stage,
};

/// Prelude module for convenient imports.
///
/// ```
/// use daybar_lib::prelude::*;
/// ```
pub mod prelude {
    pub use daybar_types::{
        BarSpan, DateRange, DateRangeError, NormalizedRow, RawBar, Ticker, TickerError,
    };

    #[cfg(feature = "fetch")]
    pub use daybar_fetch::{AggregatesSource, AuditLog, Extractor, PolygonClient};

    #[cfg(feature = "transform")]
    pub use daybar_transform::Transformer;

    #[cfg(feature = "store")]
    pub use daybar_store::{Loader, MemoryStore, PgStore, PriceStore, TableName};

    #[cfg(feature = "pipeline")]
    pub use daybar_pipeline::{Pipeline, PipelineConfig, PipelineRun, RunPlan, RunState};
}
