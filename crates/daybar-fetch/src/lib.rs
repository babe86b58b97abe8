//! Market-data provider client and extraction stage for daybar.
//!
//! This crate provides the extraction half of the pipeline:
//!
//! - [`AggregatesSource`] - Paginated provider interface
//! - [`PolygonClient`] - HTTP implementation against the Polygon aggregates API
//! - [`url::aggregates_url`] - Request URL construction
//! - [`decode_page`] - Response decoding
//! - [`bar_pages`] - Lazy, finite, non-restartable page stream
//! - [`Extractor`] - All-or-nothing extraction into [`RawBar`](daybar_types::RawBar)s
//! - [`AuditLog`] - Best-effort per-ticker dump of extracted batches
//! - [`ScriptedSource`] - In-memory source for tests

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/daybar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod audit;
mod client;
mod extract;
mod response;
mod scripted;
mod source;
mod stream;
pub mod url;

pub use audit::AuditLog;
pub use client::{ClientConfig, FetchError, PolygonClient};
pub use extract::{Extractor, ProviderError};
pub use response::{AggregateBar, decode_page};
pub use scripted::ScriptedSource;
pub use source::{AggregatesPage, AggregatesQuery, AggregatesSource, PageRequest};
pub use stream::{bar_pages, flatten_bars};
