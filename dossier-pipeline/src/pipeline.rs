use crate::summarize::SourceSummarizer;
use dossier_common::{Candidate, DossierError, SourceFailure, SourceResult};
use dossier_web::{ContentExtractor, SourceLocator};
use futures::StreamExt;
use futures::stream;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Query in, one [`SourceResult`] per located candidate out, in locator order.
#[derive(Clone)]
pub struct AggregationPipeline {
    locator: Arc<dyn SourceLocator>,
    extractor: Arc<dyn ContentExtractor>,
    summarizer: SourceSummarizer,
    concurrency: usize,
}

impl AggregationPipeline {
    pub fn new(
        locator: Arc<dyn SourceLocator>,
        extractor: Arc<dyn ContentExtractor>,
        summarizer: SourceSummarizer,
    ) -> Self {
        Self {
            locator,
            extractor,
            summarizer,
            concurrency: 1,
        }
    }

    /// Sources processed at once. Output order never depends on this.
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub async fn run(&self, query: &str, count: u32) -> dossier_common::Result<Vec<SourceResult>> {
        let run_id = Uuid::new_v4().simple().to_string();
        let started = Instant::now();
        tracing::info!(target: "pipeline", run_id = %run_id, count, concurrency = self.concurrency, "pipeline.run.start");

        let candidates = self.locator.locate(query, count).await.map_err(|e| {
            tracing::error!(target: "pipeline", run_id = %run_id, error = %e, "pipeline.locate.error");
            DossierError::Locator(e.to_string())
        })?;
        tracing::info!(target: "pipeline", run_id = %run_id, candidates = candidates.len(), "pipeline.locate.done");

        // `buffered` yields in input order whatever the completion order.
        let results: Vec<SourceResult> = stream::iter(
            candidates
                .into_iter()
                .enumerate()
                .map(|(idx, candidate)| self.process(&run_id, idx, candidate, query)),
        )
        .buffered(self.concurrency)
        .collect()
        .await;

        let failed = results.iter().filter(|r| r.is_failure()).count();
        tracing::info!(
            target: "pipeline",
            run_id = %run_id,
            sources = results.len(),
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline.run.done"
        );
        Ok(results)
    }

    /// Like [`run`](Self::run), but abandons all in-flight work once `cancel`
    /// fires. Partial results are dropped.
    pub async fn run_with_cancel(
        &self,
        query: &str,
        count: u32,
        cancel: &CancellationToken,
    ) -> dossier_common::Result<Vec<SourceResult>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(target: "pipeline", "pipeline.run.cancelled");
                Err(DossierError::Cancelled)
            }
            res = self.run(query, count) => res,
        }
    }

    async fn process(
        &self,
        run_id: &str,
        idx: usize,
        candidate: Candidate,
        query: &str,
    ) -> SourceResult {
        let started = Instant::now();
        let outcome = match self.extractor.extract(&candidate.link).await {
            Ok(excerpt) => self
                .summarizer
                .summarize(&excerpt, query)
                .await
                .map_err(SourceFailure::from),
            Err(e) => Err(SourceFailure::from(e)),
        };

        match &outcome {
            Ok(_) => tracing::info!(
                target: "pipeline",
                run_id = %run_id,
                idx,
                link = %candidate.link,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "pipeline.source.done"
            ),
            Err(failure) => tracing::warn!(
                target: "pipeline",
                run_id = %run_id,
                idx,
                link = %candidate.link,
                error = %failure,
                "pipeline.source.failed"
            ),
        }
        SourceResult::new(candidate, outcome)
    }
}
