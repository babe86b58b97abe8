//! Loading stage for daybar.
//!
//! This crate persists normalized rows with insert-or-skip semantics:
//!
//! - [`Loader`] - Scoped, all-or-nothing batch load
//! - [`PriceStore`] / [`StoreSession`] - Store backend interface
//! - [`PgStore`] - PostgreSQL backend
//! - [`MemoryStore`] - In-memory backend for tests
//! - [`TableName`] / [`create_table_sql`] - Destination schema

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/daybar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod loader;
mod memory;
mod postgres;
mod schema;
mod store;

pub use error::{LoadError, StoreFailure, TableNameError};
pub use loader::Loader;
pub use memory::{FailurePoint, InjectedFailure, MemorySession, MemoryStore};
pub use postgres::{MAX_ROWS_PER_STATEMENT, PgSession, PgStore};
pub use schema::{DEFAULT_TABLE, TableName, create_table_sql};
pub use store::{PriceStore, StoreSession};
