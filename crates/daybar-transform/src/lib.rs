//! Normalization stage for daybar.
//!
//! This crate turns provider observations into rows ready for loading:
//!
//! - [`Transformer`] - All-or-nothing batch normalization
//! - [`derive_date`] - UTC calendar day of a millisecond timestamp
//! - [`TransformError`] - Per-row coercion failures

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/daybar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date;
mod error;
mod transformer;

pub use date::{MS_PER_DAY, derive_date};
pub use error::TransformError;
pub use transformer::{MAX_ABS_PRICE, PRICE_SCALE, Transformer};
