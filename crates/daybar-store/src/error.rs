//! Loading errors.

use thiserror::Error;

/// Backend-specific failure carried by [`LoadError`].
pub type StoreFailure = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while loading rows.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Could not open a session.
    #[error("Failed to connect to store: {0}")]
    Connect(#[source] StoreFailure),

    /// Could not ensure the destination table exists.
    #[error("Failed to ensure schema: {0}")]
    Schema(#[source] StoreFailure),

    /// The insert transaction failed and was rolled back.
    #[error("Insert transaction failed: {0}")]
    Transaction(#[source] StoreFailure),

    /// The session could not be closed cleanly.
    #[error("Failed to close store session: {0}")]
    Close(#[source] StoreFailure),
}

/// Invalid destination table name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableNameError {
    /// Empty name.
    #[error("Table name cannot be empty")]
    Empty,

    /// Longer than PostgreSQL's identifier limit.
    #[error("Table name '{0}' exceeds 63 characters")]
    TooLong(String),

    /// Not a plain lowercase SQL identifier.
    #[error("Table name '{0}' must match [a-z_][a-z0-9_]*")]
    InvalidIdentifier(String),
}
