//! PostgreSQL store backend.

use async_trait::async_trait;
use daybar_types::NormalizedRow;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use std::fmt;
use tracing::debug;

use crate::{PriceStore, StoreFailure, StoreSession, TableName, create_table_sql};

/// PostgreSQL caps a statement at 65535 bind parameters; each row binds seven.
pub const MAX_ROWS_PER_STATEMENT: usize = u16::MAX as usize / NormalizedRow::COLUMNS.len();

/// SQLSTATE `unique_violation`, raised on `pg_type` when two sessions race
/// `CREATE TABLE IF NOT EXISTS`.
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE `duplicate_table`.
const DUPLICATE_TABLE: &str = "42P07";

/// PostgreSQL store. Each session is one dedicated connection.
#[derive(Clone)]
pub struct PgStore {
    database_url: String,
    table: TableName,
}

impl PgStore {
    /// Creates a store for the given connection string and table.
    pub fn new(database_url: impl Into<String>, table: TableName) -> Self {
        Self {
            database_url: database_url.into(),
            table,
        }
    }

    /// Returns the destination table.
    #[must_use]
    pub const fn table(&self) -> &TableName {
        &self.table
    }
}

impl fmt::Debug for PgStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgStore")
            .field("database_url", &"<redacted>")
            .field("table", &self.table)
            .finish()
    }
}

#[async_trait]
impl PriceStore for PgStore {
    type Session = PgSession;

    async fn open(&self) -> Result<PgSession, StoreFailure> {
        let conn = PgConnection::connect(&self.database_url).await?;
        debug!(table = %self.table, "Opened PostgreSQL session");
        Ok(PgSession {
            conn,
            table: self.table.clone(),
        })
    }
}

/// An open PostgreSQL connection.
#[derive(Debug)]
pub struct PgSession {
    conn: PgConnection,
    table: TableName,
}

#[async_trait]
impl StoreSession for PgSession {
    async fn ensure_schema(&mut self) -> Result<(), StoreFailure> {
        let ddl = create_table_sql(&self.table);
        match sqlx::query(&ddl).execute(&mut self.conn).await {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e))
                if matches!(e.code().as_deref(), Some(UNIQUE_VIOLATION | DUPLICATE_TABLE)) =>
            {
                debug!(table = %self.table, "Table created by a concurrent session");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_ignoring_conflicts(
        &mut self,
        rows: &[NormalizedRow],
    ) -> Result<u64, StoreFailure> {
        // Dropping the transaction without commit rolls it back
        let mut tx = self.conn.begin().await?;
        let mut inserted = 0;

        for chunk in rows.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut query_builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} ({}) ",
                self.table,
                NormalizedRow::COLUMNS.join(", ")
            ));

            query_builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.ticker.as_str())
                    .push_bind(row.date)
                    .push_bind(row.open)
                    .push_bind(row.high)
                    .push_bind(row.low)
                    .push_bind(row.close)
                    .push_bind(row.volume);
            });

            // Existing keys are left untouched
            query_builder.push(" ON CONFLICT (ticker, date) DO NOTHING");

            let result = query_builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn close(self) -> Result<(), StoreFailure> {
        self.conn.close().await?;
        Ok(())
    }
}
