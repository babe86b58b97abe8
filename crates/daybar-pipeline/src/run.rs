//! Pipeline run records and state machine.

use chrono::{DateTime, Utc};
use daybar_types::{DateRange, Ticker};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Unique identifier for a pipeline run.
pub type RunId = Uuid;

/// State of a pipeline run.
///
/// `Idle -> Extracting -> Transforming -> Loading -> Succeeded`, and any
/// active state may move to `Failed`. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Created, not yet started.
    #[default]
    Idle,
    /// Pulling bars from the provider.
    Extracting,
    /// Normalizing bars into rows.
    Transforming,
    /// Persisting rows.
    Loading,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
}

impl RunState {
    /// Returns true if the run is in a terminal state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true while a stage is executing.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Extracting | Self::Transforming | Self::Loading)
    }

    /// Returns true if `next` is a legal successor of this state.
    #[must_use]
    pub const fn can_advance_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Extracting)
                | (Self::Extracting, Self::Transforming)
                | (Self::Transforming, Self::Loading)
                | (Self::Loading, Self::Succeeded)
        ) || (self.is_active() && matches!(next, Self::Failed))
    }

    /// Returns the stage executing in this state, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Extracting => Some(Stage::Extract),
            Self::Transforming => Some(Stage::Transform),
            Self::Loading => Some(Stage::Load),
            Self::Idle | Self::Succeeded | Self::Failed => None,
        }
    }

    /// Returns the state as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Transforming => "transforming",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the three pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Extraction from the provider.
    Extract,
    /// Normalization.
    Transform,
    /// Loading into the store.
    Load,
}

impl Stage {
    /// Returns the stage as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Transform => "transform",
            Self::Load => "load",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of a single pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// Unique identifier for this run.
    pub id: RunId,
    /// Ticker being processed.
    pub ticker: Ticker,
    /// Requested date window.
    pub window: DateRange,
    /// Current state.
    pub state: RunState,
    /// Timestamp when the run was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when extraction started.
    pub started_at: Option<DateTime<Utc>>,
    /// Timestamp when the run reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
    /// Number of bars extracted.
    pub extracted: usize,
    /// Number of rows produced by the transformer.
    pub transformed: usize,
    /// Number of rows handed to the loader.
    pub attempted: usize,
    /// Stage that failed, if any.
    pub failed_stage: Option<Stage>,
    /// Error message if the run failed.
    pub error_message: Option<String>,
}

impl PipelineRun {
    /// Creates a new idle run.
    #[must_use]
    pub fn new(ticker: Ticker, window: DateRange) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker,
            window,
            state: RunState::Idle,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            extracted: 0,
            transformed: 0,
            attempted: 0,
            failed_stage: None,
            error_message: None,
        }
    }

    /// Returns true if the run is in a terminal state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Marks extraction as started.
    pub fn mark_extracting(&mut self) {
        self.enter(RunState::Extracting);
        self.started_at = Some(Utc::now());
    }

    /// Records the extracted count and moves to transformation.
    pub fn mark_transforming(&mut self, extracted: usize) {
        self.extracted = extracted;
        self.enter(RunState::Transforming);
    }

    /// Records the transformed count and moves to loading.
    pub fn mark_loading(&mut self, transformed: usize) {
        self.transformed = transformed;
        self.enter(RunState::Loading);
    }

    /// Records the attempted count and finishes successfully.
    pub fn mark_succeeded(&mut self, attempted: usize) {
        self.attempted = attempted;
        self.enter(RunState::Succeeded);
        self.finished_at = Some(Utc::now());
    }

    /// Finishes the run as failed during the current stage.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.failed_stage = self.state.stage();
        self.error_message = Some(error.into());
        self.enter(RunState::Failed);
        self.finished_at = Some(Utc::now());
    }

    fn enter(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run transition {} -> {next}",
            self.state
        );
        info!(run_id = %self.id, ticker = %self.ticker, from = %self.state, to = %next, "Run state changed");
        self.state = next;
    }
}
