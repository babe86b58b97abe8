//! Destination table definition.

use std::fmt;
use std::str::FromStr;

use crate::TableNameError;

/// Default destination table.
pub const DEFAULT_TABLE: &str = "stock_prices";

/// PostgreSQL's identifier length limit.
const MAX_IDENTIFIER_LEN: usize = 63;

/// A validated, unquoted SQL table identifier.
///
/// Table names are interpolated into DDL and DML, so only plain lowercase
/// identifiers are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Validates a table name.
    ///
    /// # Errors
    ///
    /// Returns an error unless the name matches `[a-z_][a-z0-9_]*` and is at
    /// most 63 characters long.
    pub fn new(name: impl Into<String>) -> Result<Self, TableNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TableNameError::Empty);
        }
        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(TableNameError::TooLong(name));
        }

        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !(valid_start && valid_rest) {
            return Err(TableNameError::InvalidIdentifier(name));
        }

        Ok(Self(name))
    }

    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TableName {
    type Err = TableNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Returns the idempotent DDL for the destination table.
///
/// # Example
///
/// ```
/// use daybar_store::{TableName, create_table_sql};
///
/// let ddl = create_table_sql(&TableName::default());
/// assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS stock_prices ("));
/// assert!(ddl.contains("PRIMARY KEY (ticker, date)"));
/// ```
#[must_use]
pub fn create_table_sql(table: &TableName) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
    ticker VARCHAR(10) NOT NULL,
    date   DATE        NOT NULL,
    open   NUMERIC(12,4),
    high   NUMERIC(12,4),
    low    NUMERIC(12,4),
    close  NUMERIC(12,4),
    volume BIGINT,
    PRIMARY KEY (ticker, date)
)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        assert_eq!(TableName::default().as_str(), "stock_prices");
    }

    #[test]
    fn test_valid_names() {
        assert!(TableName::new("prices_2024").is_ok());
        assert!(TableName::new("_staging").is_ok());
        assert!(TableName::new("a".repeat(63)).is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(TableName::new(""), Err(TableNameError::Empty));
        assert!(matches!(
            TableName::new("a".repeat(64)),
            Err(TableNameError::TooLong(_))
        ));
        for bad in ["1prices", "Prices", "stock prices", "prices;drop", "public.prices"] {
            assert!(
                matches!(TableName::new(bad), Err(TableNameError::InvalidIdentifier(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_ddl_uses_table_name() {
        let table: TableName = "daily_bars".parse().unwrap();
        let ddl = create_table_sql(&table);
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS daily_bars ("));
        assert!(ddl.contains("volume BIGINT"));
        assert_eq!(ddl.matches("NUMERIC(12,4)").count(), 4);
    }
}
