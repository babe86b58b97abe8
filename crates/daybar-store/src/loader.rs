//! Loading stage.

use daybar_types::NormalizedRow;
use tracing::{error, info, warn};

use crate::{LoadError, PriceStore, StoreSession};

/// Persists normalized rows into a [`PriceStore`].
///
/// Each call opens exactly one session and closes it before returning,
/// whether the load succeeded or not.
#[derive(Debug, Clone)]
pub struct Loader<D> {
    store: D,
}

impl<D: PriceStore> Loader<D> {
    /// Creates a loader over the given store.
    pub const fn new(store: D) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub const fn store(&self) -> &D {
        &self.store
    }

    /// Loads rows with insert-or-skip semantics.
    ///
    /// Returns the number of rows attempted. Rows whose key already exists are
    /// skipped without error. An empty input returns 0 without touching the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] naming the step that failed. A failed insert
    /// leaves the store unchanged.
    pub async fn load(&self, rows: &[NormalizedRow]) -> Result<usize, LoadError> {
        let Some(first) = rows.first() else {
            warn!(stage = "load", "Nothing to load, skipping");
            return Ok(0);
        };
        let ticker = &first.ticker;

        let mut session = self
            .store
            .open()
            .await
            .map_err(LoadError::Connect)
            .inspect_err(|e| error!(ticker = %ticker, stage = "load", error = %e, "Load failed"))?;

        let written = Self::write(&mut session, rows).await;
        let closed = session.close().await.map_err(LoadError::Close);

        // A write failure outranks a close failure
        let inserted = written
            .and_then(|inserted| closed.map(|()| inserted))
            .inspect_err(|e| error!(ticker = %ticker, stage = "load", error = %e, "Load failed"))?;

        let attempted = rows.len();
        info!(
            ticker = %ticker,
            stage = "load",
            attempted,
            inserted,
            skipped = attempted as u64 - inserted,
            "Loaded rows"
        );
        Ok(attempted)
    }

    async fn write(session: &mut D::Session, rows: &[NormalizedRow]) -> Result<u64, LoadError> {
        session.ensure_schema().await.map_err(LoadError::Schema)?;
        session
            .insert_ignoring_conflicts(rows)
            .await
            .map_err(LoadError::Transaction)
    }
}
