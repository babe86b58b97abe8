//! Pipeline errors.

use daybar_fetch::ProviderError;
use daybar_store::LoadError;
use daybar_transform::TransformError;
use thiserror::Error;

use crate::{PipelineRun, Stage};

/// A stage failure.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Extraction failed.
    #[error(transparent)]
    Extract(#[from] ProviderError),

    /// Normalization failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Loading failed.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl PipelineError {
    /// Returns the stage that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Extract(_) => Stage::Extract,
            Self::Transform(_) => Stage::Transform,
            Self::Load(_) => Stage::Load,
        }
    }
}

/// A failed run: the finished record plus the error that ended it.
#[derive(Error, Debug)]
#[error("Run {} for {} failed during {}", .run.id, .run.ticker, .error.stage())]
pub struct RunFailure {
    run: Box<PipelineRun>,
    #[source]
    error: PipelineError,
}

impl RunFailure {
    pub(crate) fn new(run: PipelineRun, error: PipelineError) -> Self {
        Self {
            run: Box::new(run),
            error,
        }
    }

    /// Returns the failed run record.
    #[must_use]
    pub fn run(&self) -> &PipelineRun {
        &self.run
    }

    /// Returns the stage error.
    #[must_use]
    pub const fn error(&self) -> &PipelineError {
        &self.error
    }

    /// Returns the stage that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.error.stage()
    }

    /// Splits the failure into the run record and the error.
    #[must_use]
    pub fn into_parts(self) -> (PipelineRun, PipelineError) {
        (*self.run, self.error)
    }
}
