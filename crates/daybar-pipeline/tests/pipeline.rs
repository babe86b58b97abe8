//! End-to-end runs against a scripted provider and an in-memory store.

use chrono::NaiveDate;
use daybar_fetch::{AggregateBar, AuditLog, FetchError, ScriptedSource};
use daybar_pipeline::{Pipeline, PipelineError, RunPlan, RunState, Stage};
use daybar_store::{FailurePoint, LoadError, MemoryStore};
use daybar_types::{DateRange, NormalizedRow, Ticker};
use rust_decimal_macros::dec;
use tempfile::TempDir;

const OCT_1: i64 = 1_727_740_800_000;
const OCT_2: i64 = 1_727_827_200_000;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn aapl() -> Ticker {
    Ticker::new("AAPL").unwrap()
}

fn plan() -> RunPlan {
    RunPlan::daily(
        aapl(),
        DateRange::new(date(2025, 10, 1), date(2025, 10, 2)).unwrap(),
    )
}

fn bar(timestamp: i64, close: f64, volume: Option<f64>) -> AggregateBar {
    AggregateBar {
        open: 229.52,
        high: 229.65,
        low: 223.74,
        close,
        volume,
        timestamp,
    }
}

fn scenario_source() -> ScriptedSource {
    ScriptedSource::paged(vec![
        vec![bar(OCT_1, 226.21, Some(63_285_048.0))],
        vec![bar(OCT_2, 226.78, None)],
    ])
}

#[tokio::test]
async fn test_scenario_run_loads_both_days() {
    let store = MemoryStore::new();
    let source = scenario_source();

    let run = Pipeline::new(&source, store.clone(), plan())
        .execute()
        .await
        .unwrap();

    assert_eq!(run.state, RunState::Succeeded);
    assert_eq!((run.extracted, run.transformed, run.attempted), (2, 2, 2));
    assert_eq!(source.requests().len(), 2);

    let rows = store.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, date(2024, 10, 1));
    assert_eq!(rows[0].close, dec!(226.2100));
    assert_eq!(rows[0].volume, 63_285_048);
    assert_eq!(rows[1].date, date(2024, 10, 2));
    assert_eq!(rows[1].volume, 0);
}

#[tokio::test]
async fn test_identical_runs_are_idempotent() {
    let store = MemoryStore::new();

    Pipeline::new(scenario_source(), store.clone(), plan())
        .execute()
        .await
        .unwrap();
    let after_first = store.rows();

    let second = Pipeline::new(scenario_source(), store.clone(), plan())
        .execute()
        .await
        .unwrap();

    assert_eq!(second.state, RunState::Succeeded);
    assert_eq!(second.attempted, 2);
    assert_eq!(store.rows(), after_first);
}

#[tokio::test]
async fn test_empty_window_succeeds_without_touching_store() {
    let store = MemoryStore::new();

    let run = Pipeline::new(ScriptedSource::empty(), store.clone(), plan())
        .execute()
        .await
        .unwrap();

    assert_eq!(run.state, RunState::Succeeded);
    assert_eq!((run.extracted, run.transformed, run.attempted), (0, 0, 0));
    assert!(store.is_empty());
    assert_eq!(store.sessions_opened(), 0);
}

#[tokio::test]
async fn test_existing_key_is_skipped() {
    let store = MemoryStore::new();
    store.seed([NormalizedRow {
        ticker: aapl(),
        date: date(2024, 10, 1),
        open: dec!(1.0000),
        high: dec!(1.0000),
        low: dec!(1.0000),
        close: dec!(1.0000),
        volume: 1,
    }]);

    let run = Pipeline::new(scenario_source(), store.clone(), plan())
        .execute()
        .await
        .unwrap();

    assert_eq!(run.attempted, 2);
    assert_eq!(store.len(), 2);
    let existing = store.get(&aapl(), date(2024, 10, 1)).unwrap();
    assert_eq!(existing.close, dec!(1.0000));
    assert_eq!(existing.volume, 1);
}

#[tokio::test]
async fn test_extract_failure_fails_run() {
    let store = MemoryStore::new();
    let source = ScriptedSource::new().failure(FetchError::Unauthorized("bad key".to_string()));

    let failure = Pipeline::new(source, store.clone(), plan())
        .execute()
        .await
        .unwrap_err();

    assert_eq!(failure.stage(), Stage::Extract);
    assert_eq!(failure.run().state, RunState::Failed);
    assert_eq!(failure.run().failed_stage, Some(Stage::Extract));
    assert!(failure.run().finished_at.is_some());
    assert!(matches!(failure.error(), PipelineError::Extract(e) if e.ticker == aapl()));
    assert_eq!(store.sessions_opened(), 0);
}

#[tokio::test]
async fn test_transform_failure_fails_whole_batch() {
    let store = MemoryStore::new();
    let source = ScriptedSource::paged(vec![vec![
        bar(OCT_1, 226.21, Some(1.0)),
        bar(OCT_2, 226.78, Some(1.5)),
    ]]);

    let failure = Pipeline::new(source, store.clone(), plan())
        .execute()
        .await
        .unwrap_err();

    let (run, error) = failure.into_parts();
    assert_eq!(run.failed_stage, Some(Stage::Transform));
    assert_eq!(run.extracted, 2);
    assert!(run.error_message.unwrap().contains("volume"));
    assert!(matches!(error, PipelineError::Transform(_)));
    assert!(store.is_empty());
    assert_eq!(store.sessions_opened(), 0);
}

#[tokio::test]
async fn test_load_failure_leaves_no_partial_rows() {
    let store = MemoryStore::new();
    store.fail_at(FailurePoint::Insert);

    let failure = Pipeline::new(scenario_source(), store.clone(), plan())
        .execute()
        .await
        .unwrap_err();

    assert_eq!(failure.stage(), Stage::Load);
    assert!(matches!(
        failure.error(),
        PipelineError::Load(LoadError::Transaction(_))
    ));
    assert_eq!(failure.run().transformed, 2);
    assert!(store.is_empty());
    assert_eq!(store.sessions_closed(), 1);

    // A re-triggered run starts from scratch and completes
    store.clear_failure();
    let run = Pipeline::new(scenario_source(), store.clone(), plan())
        .execute()
        .await
        .unwrap();
    assert_eq!(run.state, RunState::Succeeded);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_audit_log_written_once_per_run() {
    let temp_dir = TempDir::new().unwrap();
    let audit = AuditLog::new(temp_dir.path());

    Pipeline::new(scenario_source(), MemoryStore::new(), plan())
        .with_audit_log(audit.clone())
        .execute()
        .await
        .unwrap();

    let contents = std::fs::read_to_string(audit.path_for(&aapl())).unwrap();
    assert_eq!(contents.lines().count(), 1);
    let entry: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
    assert_eq!(entry["count"], 2);
}
