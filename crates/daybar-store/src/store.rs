//! Store backend interface.

use async_trait::async_trait;
use daybar_types::NormalizedRow;

use crate::StoreFailure;

/// A destination that can open loading sessions.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Session type opened by this store.
    type Session: StoreSession;

    /// Opens a new session (one connection).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    async fn open(&self) -> Result<Self::Session, StoreFailure>;
}

/// One open connection to a store.
#[async_trait]
pub trait StoreSession: Send {
    /// Creates the destination table if it does not exist.
    ///
    /// Must succeed when another session creates the table concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    async fn ensure_schema(&mut self) -> Result<(), StoreFailure>;

    /// Inserts rows in one transaction, skipping keys that already exist.
    ///
    /// Returns the number of rows actually inserted. On error nothing is
    /// persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    async fn insert_ignoring_conflicts(
        &mut self,
        rows: &[NormalizedRow],
    ) -> Result<u64, StoreFailure>;

    /// Closes the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection does not shut down cleanly.
    async fn close(self) -> Result<(), StoreFailure>;
}
