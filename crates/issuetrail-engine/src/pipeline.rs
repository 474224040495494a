//! Row-by-row enrichment run

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use issuetrail_core::{
    InputRow, IssueDetail, IssueReference, NULL_VALUE, OutputRecord, ReportShape, Stage,
};
use issuetrail_sources::{
    AnchorQuery, BrowserHandle, IssueTracker, SourceError, extract_reference, fetch_detail,
};
use issuetrail_text::CommentFormatter;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use crate::builder;
use crate::scheduler::Scheduler;

/// Rows read ahead of the scheduler
const ROW_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub shape: ReportShape,
    /// Maximum number of rows processed at once
    pub concurrency: usize,
    pub anchor: AnchorQuery,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            shape: ReportShape::default(),
            concurrency: 5,
            anchor: AnchorQuery::default(),
        }
    }
}

/// Counts and timing of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub shape: ReportShape,
    pub rows: usize,
    pub references_found: usize,
    pub details_fetched: usize,
    /// Details whose fields call failed
    pub degraded: usize,
    /// Rows whose task failed and were written fully sentineled
    pub failed: usize,
    #[serde(with = "time::serde::timestamp")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::timestamp")]
    pub finished_at: OffsetDateTime,
}

/// A row whose task failed
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub index: usize,
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    /// One record per input row, in input order
    pub records: Vec<OutputRecord>,
    pub failures: Vec<RowFailure>,
}

/// Result of one row's task
struct RowOutcome {
    record: OutputRecord,
    reference_found: bool,
    detail_fetched: bool,
    degraded: bool,
    failure: Option<RowFailure>,
}

impl RowOutcome {
    fn new(record: OutputRecord) -> Self {
        Self {
            record,
            reference_found: false,
            detail_fetched: false,
            degraded: false,
            failure: None,
        }
    }

    fn failed(shape: ReportShape, row: &InputRow, error: String) -> Self {
        let mut outcome = Self::new(builder::failed_record(shape, row.raw()));
        outcome.failure = Some(RowFailure {
            index: row.index,
            source: row.raw().to_string(),
            error,
        });
        outcome
    }

    fn with_reference(mut self, reference: &Stage<IssueReference>) -> Self {
        self.reference_found = reference.is_found();
        self
    }

    fn with_detail(mut self, detail: Option<&Stage<IssueDetail>>) -> Self {
        if let Some(detail) = detail {
            self.detail_fetched = !detail.is_sentinel();
            self.degraded = detail.is_degraded();
        }
        self
    }
}

/// Everything a row task needs, shared between tasks
struct RowContext {
    shape: ReportShape,
    anchor: AnchorQuery,
    browser: Option<Arc<dyn BrowserHandle>>,
    tracker: Arc<dyn IssueTracker>,
    formatter: Arc<CommentFormatter>,
}

impl RowContext {
    async fn process(&self, row: InputRow) -> RowOutcome {
        match self.enrich(&row).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(source = row.raw(), error = %e, "Failed to process row");
                RowOutcome::failed(self.shape, &row, e.to_string())
            }
        }
    }

    async fn enrich(&self, row: &InputRow) -> Result<RowOutcome, SourceError> {
        let keywords = self.formatter.keywords();

        match self.shape {
            ReportShape::Reference => {
                let reference = self.reference(row).await;
                Ok(RowOutcome::new(builder::reference_record(row.raw(), &reference))
                    .with_reference(&reference))
            }
            ReportShape::Detail => {
                let detail = match row.value() {
                    Some(key) => fetch_detail(self.tracker.as_ref(), &self.formatter, key).await?,
                    None => Stage::sentinel(IssueDetail::absent(NULL_VALUE), "row has no issue id"),
                };
                Ok(RowOutcome::new(builder::detail_record(&detail, keywords))
                    .with_detail(Some(&detail)))
            }
            ReportShape::Full => {
                let reference = self.reference(row).await;
                let detail = match &reference {
                    Stage::Found(found) => Some(
                        fetch_detail(self.tracker.as_ref(), &self.formatter, &found.id).await?,
                    ),
                    _ => None,
                };
                let record = builder::full_record(row.raw(), &reference, detail.as_ref(), keywords);
                Ok(RowOutcome::new(record)
                    .with_reference(&reference)
                    .with_detail(detail.as_ref()))
            }
        }
    }

    async fn reference(&self, row: &InputRow) -> Stage<IssueReference> {
        let Some(url) = row.value() else {
            info!("Row has no URL");
            return Stage::sentinel(IssueReference::absent(), "row has no URL");
        };
        let Some(browser) = &self.browser else {
            return Stage::sentinel(IssueReference::absent(), "no browser available");
        };
        extract_reference(browser.as_ref(), url, &self.anchor).await
    }
}

/// Turns input rows into report records.
///
/// Rows are read lazily; at most `concurrency` rows are enriched at once and the
/// records come back in input order.
pub struct Pipeline {
    settings: PipelineSettings,
    browser: Option<Arc<dyn BrowserHandle>>,
    tracker: Arc<dyn IssueTracker>,
    formatter: Arc<CommentFormatter>,
}

impl Pipeline {
    pub fn new(
        settings: PipelineSettings,
        tracker: Arc<dyn IssueTracker>,
        formatter: Arc<CommentFormatter>,
    ) -> Self {
        Self {
            settings,
            browser: None,
            tracker,
            formatter,
        }
    }

    /// Required for the reference and full shapes
    pub fn with_browser(mut self, browser: Arc<dyn BrowserHandle>) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn run<I>(&self, rows: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = InputRow> + Send + 'static,
        I::IntoIter: Send,
    {
        let shape = self.settings.shape;
        if shape.needs_browser() && self.browser.is_none() {
            bail!("the {} report needs a browser", shape);
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id, %shape);
        self.run_rows(run_id, rows).instrument(span).await
    }

    async fn run_rows<I>(&self, run_id: Uuid, rows: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = InputRow> + Send + 'static,
        I::IntoIter: Send,
    {
        let shape = self.settings.shape;
        let started_at = OffsetDateTime::now_utc();
        info!(concurrency = self.settings.concurrency, "Starting run");

        let context = Arc::new(RowContext {
            shape,
            anchor: self.settings.anchor.clone(),
            browser: self.browser.clone(),
            tracker: self.tracker.clone(),
            formatter: self.formatter.clone(),
        });

        // CSV reading is blocking I/O
        let (tx, mut rx) = mpsc::channel(ROW_BUFFER);
        let reader = tokio::task::spawn_blocking(move || {
            for row in rows {
                if tx.blocking_send(row).is_err() {
                    break;
                }
            }
        });

        let mut scheduler = Scheduler::new(self.settings.concurrency);
        let mut admitted = Vec::new();

        while let Some(row) = rx.recv().await {
            debug!(index = row.index, source = row.raw(), "Queueing row");
            admitted.push(row.clone());

            let context = context.clone();
            let span = info_span!("row", index = row.index);
            scheduler
                .admit(async move { context.process(row).await }.instrument(span))
                .await?;
        }

        reader.await.context("row reader stopped unexpectedly")?;

        let outcomes = scheduler
            .settle(|index, e| {
                let row = &admitted[index];
                error!(index, source = row.raw(), error = %e, "Row task panicked");
                RowOutcome::failed(shape, row, format!("task panicked: {}", e))
            })
            .await;

        let mut summary = RunSummary {
            run_id,
            shape,
            rows: outcomes.len(),
            references_found: 0,
            details_fetched: 0,
            degraded: 0,
            failed: 0,
            started_at,
            finished_at: started_at,
        };
        let mut records = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();

        for outcome in outcomes {
            summary.references_found += usize::from(outcome.reference_found);
            summary.details_fetched += usize::from(outcome.detail_fetched);
            summary.degraded += usize::from(outcome.degraded);
            if let Some(failure) = outcome.failure {
                summary.failed += 1;
                failures.push(failure);
            }
            records.push(outcome.record);
        }
        summary.finished_at = OffsetDateTime::now_utc();

        info!("Total rows processed: {}", summary.rows);
        info!(
            references_found = summary.references_found,
            details_fetched = summary.details_fetched,
            degraded = summary.degraded,
            failed = summary.failed,
            "Run finished"
        );

        Ok(RunReport {
            summary,
            records,
            failures,
        })
    }
}
