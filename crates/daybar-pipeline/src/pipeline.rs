//! Sequential extract, transform and load.

use daybar_fetch::{AggregatesSource, AuditLog, Extractor};
use daybar_store::{Loader, PriceStore};
use daybar_transform::Transformer;
use tracing::{Instrument, error, info, info_span};

use crate::{PipelineError, PipelineRun, RunFailure, RunPlan};

/// One ticker's daily pipeline.
///
/// Stages run strictly in sequence and a failure ends the run immediately.
/// Nothing is retried: a failed run is re-triggered from scratch and
/// re-extracts the same window, which is safe because loading skips keys that
/// already exist.
#[derive(Debug)]
pub struct Pipeline<S, D> {
    extractor: Extractor<S>,
    transformer: Transformer,
    loader: Loader<D>,
    plan: RunPlan,
}

impl<S: AggregatesSource, D: PriceStore> Pipeline<S, D> {
    /// Creates a pipeline for the given plan.
    pub fn new(source: S, store: D, plan: RunPlan) -> Self {
        Self {
            extractor: Extractor::new(source).with_span(plan.span),
            transformer: Transformer::new(),
            loader: Loader::new(store),
            plan,
        }
    }

    /// Enables the extraction audit log.
    #[must_use]
    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.extractor = self.extractor.with_audit_log(audit);
        self
    }

    /// Executes one run.
    ///
    /// # Errors
    ///
    /// Returns a [`RunFailure`] carrying the failed run record and the stage
    /// error.
    pub async fn execute(&self) -> Result<PipelineRun, RunFailure> {
        let mut run = PipelineRun::new(self.plan.ticker.clone(), self.plan.window);
        let span = info_span!("pipeline", run_id = %run.id, ticker = %run.ticker);

        async move {
            info!(window = %run.window, "Starting pipeline run");

            match self.stages(&mut run).await {
                Ok(()) => {
                    info!(
                        extracted = run.extracted,
                        transformed = run.transformed,
                        attempted = run.attempted,
                        "Pipeline run succeeded"
                    );
                    Ok(run)
                }
                Err(e) => {
                    run.mark_failed(e.to_string());
                    error!(stage = %e.stage(), error = %e, "Pipeline run failed");
                    Err(RunFailure::new(run, e))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn stages(&self, run: &mut PipelineRun) -> Result<(), PipelineError> {
        run.mark_extracting();
        let bars = self
            .extractor
            .extract(&self.plan.ticker, self.plan.window, self.plan.page_limit)
            .await?;

        run.mark_transforming(bars.len());
        let rows = self.transformer.transform(&bars)?;

        run.mark_loading(rows.len());
        let attempted = self.loader.load(&rows).await?;

        run.mark_succeeded(attempted);
        Ok(())
    }
}
