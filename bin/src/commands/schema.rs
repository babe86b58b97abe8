//! Schema command implementation.

use anyhow::{Context, Result};
use daybar_lib::{TableName, create_table_sql};

/// Prints the destination DDL for a table.
pub(crate) fn print_schema(table: &str) -> Result<()> {
    let table = TableName::new(table).with_context(|| format!("Invalid table name: {table}"))?;
    println!("{};", create_table_sql(&table));
    Ok(())
}
