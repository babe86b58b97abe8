//! PostgreSQL round trips.
//!
//! These run only when `DAYBAR_TEST_DATABASE_URL` points at a disposable
//! database; otherwise each test returns early.

use chrono::NaiveDate;
use daybar_store::{Loader, PgStore, PriceStore, StoreSession, TableName};
use daybar_types::{NormalizedRow, Ticker};
use rust_decimal_macros::dec;
use sqlx::{Connection, PgConnection, Row};

fn database_url() -> Option<String> {
    std::env::var("DAYBAR_TEST_DATABASE_URL").ok()
}

fn row(ticker: &str, day: u32) -> NormalizedRow {
    NormalizedRow {
        ticker: Ticker::new(ticker).unwrap(),
        date: NaiveDate::from_ymd_opt(2024, 10, day).unwrap(),
        open: dec!(229.5200),
        high: dec!(229.6500),
        low: dec!(223.7400),
        close: dec!(226.2100),
        volume: 63_285_048,
    }
}

async fn fresh_table(url: &str, name: &str) -> TableName {
    let mut conn = PgConnection::connect(url).await.unwrap();
    sqlx::query(&format!("DROP TABLE IF EXISTS {name}"))
        .execute(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();
    TableName::new(name).unwrap()
}

async fn count(url: &str, table: &TableName) -> i64 {
    let mut conn = PgConnection::connect(url).await.unwrap();
    let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .fetch_one(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();
    row.get("n")
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let Some(url) = database_url() else {
        return;
    };
    let table = fresh_table(&url, "daybar_test_idempotent").await;
    let loader = Loader::new(PgStore::new(&url, table.clone()));
    let rows = [row("AAPL", 1), row("AAPL", 2)];

    assert_eq!(loader.load(&rows).await.unwrap(), 2);
    assert_eq!(loader.load(&rows).await.unwrap(), 2);
    assert_eq!(count(&url, &table).await, 2);
}

#[tokio::test]
async fn test_conflict_leaves_existing_row() {
    let Some(url) = database_url() else {
        return;
    };
    let table = fresh_table(&url, "daybar_test_conflict").await;
    let store = PgStore::new(&url, table.clone());

    let mut session = store.open().await.unwrap();
    session.ensure_schema().await.unwrap();
    assert_eq!(session.insert_ignoring_conflicts(&[row("MSFT", 1)]).await.unwrap(), 1);

    let mut changed = row("MSFT", 1);
    changed.close = dec!(1.0000);
    let inserted = session
        .insert_ignoring_conflicts(&[changed, row("MSFT", 2)])
        .await
        .unwrap();
    session.close().await.unwrap();
    assert_eq!(inserted, 1);

    let mut conn = PgConnection::connect(&url).await.unwrap();
    let close: rust_decimal::Decimal = sqlx::query(&format!(
        "SELECT close FROM {table} WHERE ticker = 'MSFT' AND date = '2024-10-01'"
    ))
    .fetch_one(&mut conn)
    .await
    .unwrap()
    .get("close");
    assert_eq!(close, dec!(226.2100));
}

#[tokio::test]
async fn test_concurrent_schema_creation() {
    let Some(url) = database_url() else {
        return;
    };
    let table = fresh_table(&url, "daybar_test_concurrent_ddl").await;
    let store = PgStore::new(&url, table);

    let ensure = || async {
        let mut session = store.open().await.unwrap();
        let result = session.ensure_schema().await;
        session.close().await.unwrap();
        result
    };

    let (a, b, c) = tokio::join!(ensure(), ensure(), ensure());
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
}
