//! Pipeline orchestrator.
//!
//! Runs the fixed source sequence against one shared rendering session,
//! strictly sequentially; the automation protocol is not safe for
//! concurrent commands on one session. One query may be in flight at a
//! time, and callers see per-source progress as each extractor
//! completes.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

use crate::config::ScrapeTuning;
use crate::models::{JobRecord, SearchQuery};
use crate::render::PageRenderer;
use crate::sources::{default_sources, JobSource, ScrapeError};

/// Error type for pipeline invocation.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A query is already using the shared session.
    #[error("a query is already in flight on this session")]
    Busy,
}

/// Progress report emitted after each source completes.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: String,
    pub records: usize,
}

/// Orchestrator over the shared renderer and the source sequence.
pub struct Pipeline {
    renderer: Arc<dyn PageRenderer>,
    sources: Vec<Arc<dyn JobSource>>,
    tuning: ScrapeTuning,
    gate: Mutex<()>,
}

impl Pipeline {
    /// Pipeline with the default source sequence.
    pub fn new(renderer: Arc<dyn PageRenderer>, tuning: ScrapeTuning) -> Self {
        Self::with_sources(renderer, tuning, default_sources())
    }

    /// Pipeline with a custom source sequence.
    pub fn with_sources(
        renderer: Arc<dyn PageRenderer>,
        tuning: ScrapeTuning,
        sources: Vec<Arc<dyn JobSource>>,
    ) -> Self {
        Self {
            renderer,
            sources,
            tuning,
            gate: Mutex::new(()),
        }
    }

    /// Run the full extraction sequence for one query.
    pub async fn run(&self, query: &SearchQuery) -> Result<Vec<JobRecord>, PipelineError> {
        self.run_with_progress(query, None).await
    }

    /// Run the full extraction sequence, reporting each source's record
    /// count as it completes.
    ///
    /// A dead rendering session aborts the remaining sources; records
    /// already collected from completed sources are preserved. Any other
    /// per-source failure only costs that source's contribution.
    pub async fn run_with_progress(
        &self,
        query: &SearchQuery,
        progress: Option<mpsc::Sender<SourceReport>>,
    ) -> Result<Vec<JobRecord>, PipelineError> {
        let _guard = self.gate.try_lock().map_err(|_| PipelineError::Busy)?;

        info!(
            "Starting search for '{}' in '{}'",
            query.designation, query.city
        );

        let mut collected = Vec::new();

        for source in &self.sources {
            match source
                .scrape(self.renderer.as_ref(), query, &self.tuning)
                .await
            {
                Ok(mut records) => {
                    info!("{}: {} records", source.name(), records.len());
                    if let Some(tx) = &progress {
                        let _ = tx
                            .send(SourceReport {
                                source: source.name().to_string(),
                                records: records.len(),
                            })
                            .await;
                    }
                    collected.append(&mut records);
                }
                Err(ScrapeError::Session(msg)) => {
                    error!(
                        "Rendering session lost during {}; aborting remaining sources: {}",
                        source.name(),
                        msg
                    );
                    break;
                }
                Err(err) => {
                    warn!("{} failed: {}", source.name(), err);
                }
            }
        }

        info!("Search finished with {} records", collected.len());
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::render::fake::FakeRenderer;
    use crate::render::PageRenderer;

    struct FixedSource {
        name: &'static str,
        titles: Vec<&'static str>,
    }

    #[async_trait]
    impl JobSource for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn scrape(
            &self,
            _renderer: &dyn PageRenderer,
            _query: &SearchQuery,
            _tuning: &ScrapeTuning,
        ) -> Result<Vec<JobRecord>, ScrapeError> {
            Ok(self
                .titles
                .iter()
                .map(|title| JobRecord::new(*title, "Co", "City", "https://example.com"))
                .collect())
        }
    }

    struct FailingSource {
        fatal: bool,
    }

    #[async_trait]
    impl JobSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn scrape(
            &self,
            _renderer: &dyn PageRenderer,
            _query: &SearchQuery,
            _tuning: &ScrapeTuning,
        ) -> Result<Vec<JobRecord>, ScrapeError> {
            if self.fatal {
                Err(ScrapeError::Session("connection dropped".to_string()))
            } else {
                Err(ScrapeError::Timeout(".results".to_string()))
            }
        }
    }

    struct BlockedSource {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl JobSource for BlockedSource {
        fn name(&self) -> &str {
            "blocked"
        }

        async fn scrape(
            &self,
            _renderer: &dyn PageRenderer,
            _query: &SearchQuery,
            _tuning: &ScrapeTuning,
        ) -> Result<Vec<JobRecord>, ScrapeError> {
            self.release.notified().await;
            Ok(Vec::new())
        }
    }

    fn query() -> SearchQuery {
        SearchQuery::new("Engineer", "Berlin").unwrap()
    }

    fn pipeline_with(sources: Vec<Arc<dyn JobSource>>) -> Pipeline {
        Pipeline::with_sources(
            Arc::new(FakeRenderer::new()),
            ScrapeTuning::instant(),
            sources,
        )
    }

    #[tokio::test]
    async fn aggregates_sources_in_sequence_order() {
        let pipeline = pipeline_with(vec![
            Arc::new(FixedSource {
                name: "first",
                titles: vec!["a", "b"],
            }),
            Arc::new(FixedSource {
                name: "second",
                titles: vec!["c"],
            }),
        ]);

        let records = pipeline.run(&query()).await.unwrap();

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn recoverable_source_failure_does_not_abort_the_run() {
        let pipeline = pipeline_with(vec![
            Arc::new(FailingSource { fatal: false }),
            Arc::new(FixedSource {
                name: "after",
                titles: vec!["survivor"],
            }),
        ]);

        let records = pipeline.run(&query()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "survivor");
    }

    #[tokio::test]
    async fn session_loss_preserves_collected_records() {
        let pipeline = pipeline_with(vec![
            Arc::new(FixedSource {
                name: "before",
                titles: vec!["kept"],
            }),
            Arc::new(FailingSource { fatal: true }),
            Arc::new(FixedSource {
                name: "never-reached",
                titles: vec!["lost"],
            }),
        ]);

        let records = pipeline.run(&query()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "kept");
    }

    #[tokio::test]
    async fn progress_reports_follow_source_completion() {
        let pipeline = pipeline_with(vec![
            Arc::new(FixedSource {
                name: "first",
                titles: vec!["a", "b"],
            }),
            Arc::new(FixedSource {
                name: "second",
                titles: vec![],
            }),
        ]);

        let (tx, mut rx) = mpsc::channel(4);
        pipeline
            .run_with_progress(&query(), Some(tx))
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.source, "first");
        assert_eq!(first.records, 2);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.source, "second");
        assert_eq!(second.records, 0);
    }

    #[tokio::test]
    async fn second_query_is_rejected_while_one_is_in_flight() {
        let release = Arc::new(Notify::new());
        let pipeline = Arc::new(pipeline_with(vec![Arc::new(BlockedSource {
            release: release.clone(),
        })]));

        let running = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.run(&query()).await }
        });

        // Let the first run take the gate.
        tokio::task::yield_now().await;

        let result = pipeline.run(&query()).await;
        assert!(matches!(result, Err(PipelineError::Busy)));

        release.notify_one();
        assert!(running.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn default_sequence_is_the_four_boards_in_order() {
        let names: Vec<String> = default_sources()
            .iter()
            .map(|source| source.name().to_string())
            .collect();

        assert_eq!(
            names,
            vec!["linkedin-jobs", "indeed", "internshala", "linkedin-posts"]
        );
    }
}
