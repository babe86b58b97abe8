//! Pipeline orchestration for daybar.
//!
//! This crate wires the three stages into one daily run:
//!
//! - [`Pipeline`] - Sequential extract, transform and load
//! - [`PipelineRun`] / [`RunState`] - Run record and state machine
//! - [`PipelineError`] / [`RunFailure`] - Stage-tagged failures
//! - [`PipelineConfig`] / [`RunPlan`] - Layered configuration

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/daybar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod pipeline;
mod run;

pub use config::{
    AuditSettings, ConfigError, DEFAULT_PAGE_LIMIT, ENV_API_KEY, ENV_DATABASE_URL, ENV_TICKER,
    MAX_PAGE_LIMIT, PipelineConfig, ProviderSettings, RunPlan, StoreSettings, WindowConfig,
};
pub use error::{PipelineError, RunFailure};
pub use pipeline::Pipeline;
pub use run::{PipelineRun, RunId, RunState, Stage};
