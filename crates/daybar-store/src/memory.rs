//! In-memory store backend.

use async_trait::async_trait;
use chrono::NaiveDate;
use daybar_types::{NormalizedRow, Ticker};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::{PriceStore, StoreFailure, StoreSession};

/// Step at which [`MemoryStore`] fails on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Opening a session.
    Open,
    /// Ensuring the schema.
    Schema,
    /// Inserting rows.
    Insert,
    /// Closing the session.
    Close,
}

impl fmt::Display for FailurePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Schema => "schema",
            Self::Insert => "insert",
            Self::Close => "close",
        };
        f.write_str(name)
    }
}

/// Error raised by an injected failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("injected failure at {0}")]
pub struct InjectedFailure(pub FailurePoint);

#[derive(Debug, Default)]
struct MemoryState {
    rows: BTreeMap<(Ticker, NaiveDate), NormalizedRow>,
    schema_ready: bool,
    sessions_opened: usize,
    sessions_closed: usize,
    fail_at: Option<FailurePoint>,
}

/// `BTreeMap`-backed store with first-writer-wins, all-or-nothing inserts.
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later operation at `point` fail until cleared.
    pub fn fail_at(&self, point: FailurePoint) {
        self.lock().fail_at = Some(point);
    }

    /// Removes any injected failure.
    pub fn clear_failure(&self) {
        self.lock().fail_at = None;
    }

    /// Inserts rows directly, bypassing sessions. Existing keys are kept.
    pub fn seed(&self, rows: impl IntoIterator<Item = NormalizedRow>) {
        let mut state = self.lock();
        for row in rows {
            state
                .rows
                .entry((row.ticker.clone(), row.date))
                .or_insert(row);
        }
    }

    /// Returns all rows ordered by key.
    #[must_use]
    pub fn rows(&self) -> Vec<NormalizedRow> {
        self.lock().rows.values().cloned().collect()
    }

    /// Returns the row for a key, if present.
    #[must_use]
    pub fn get(&self, ticker: &Ticker, date: NaiveDate) -> Option<NormalizedRow> {
        self.lock().rows.get(&(ticker.clone(), date)).cloned()
    }

    /// Returns the number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    /// Returns true if no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().rows.is_empty()
    }

    /// Returns true once a session has ensured the schema.
    #[must_use]
    pub fn schema_ready(&self) -> bool {
        self.lock().schema_ready
    }

    /// Returns how many sessions have been opened.
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    /// Returns how many sessions have been closed.
    #[must_use]
    pub fn sessions_closed(&self) -> usize {
        self.lock().sessions_closed
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn check(state: &MemoryState, point: FailurePoint) -> Result<(), StoreFailure> {
    if state.fail_at == Some(point) {
        return Err(Box::new(InjectedFailure(point)));
    }
    Ok(())
}

#[async_trait]
impl PriceStore for MemoryStore {
    type Session = MemorySession;

    async fn open(&self) -> Result<MemorySession, StoreFailure> {
        let mut state = self.lock();
        check(&state, FailurePoint::Open)?;
        state.sessions_opened += 1;
        Ok(MemorySession {
            state: Arc::clone(&self.state),
        })
    }
}

/// A session on a [`MemoryStore`].
#[derive(Debug)]
pub struct MemorySession {
    state: Arc<Mutex<MemoryState>>,
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn ensure_schema(&mut self) -> Result<(), StoreFailure> {
        let mut state = lock(&self.state);
        check(&state, FailurePoint::Schema)?;
        state.schema_ready = true;
        Ok(())
    }

    async fn insert_ignoring_conflicts(
        &mut self,
        rows: &[NormalizedRow],
    ) -> Result<u64, StoreFailure> {
        let mut state = lock(&self.state);
        check(&state, FailurePoint::Insert)?;

        // Stage first so a failure never leaves part of the batch behind
        let mut staged = BTreeMap::new();
        for row in rows {
            let key = (row.ticker.clone(), row.date);
            if !state.rows.contains_key(&key) {
                staged.entry(key).or_insert_with(|| row.clone());
            }
        }

        let inserted = staged.len() as u64;
        state.rows.extend(staged);
        Ok(inserted)
    }

    async fn close(self) -> Result<(), StoreFailure> {
        let mut state = lock(&self.state);
        state.sessions_closed += 1;
        check(&state, FailurePoint::Close)
    }
}
