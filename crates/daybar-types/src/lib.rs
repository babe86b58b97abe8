//! Core types for the daybar daily price bar pipeline.
//!
//! This crate provides the fundamental data structures shared by every stage:
//!
//! - [`Ticker`] - Validated instrument symbol
//! - [`DateRange`] - Closed calendar-date window for extraction
//! - [`BarSpan`] - Provider bar size (multiplier and [`Timespan`] unit)
//! - [`RawBar`] - Provider observation as extracted
//! - [`NormalizedRow`] - Canonical seven-column row as persisted

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/daybar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod date_range;
mod error;
mod span;
mod ticker;

pub use bar::{NormalizedRow, RawBar};
pub use date_range::DateRange;
pub use error::{DateRangeError, TickerError};
pub use span::{BarSpan, SpanParseError, Timespan};
pub use ticker::Ticker;
