//! Enrichment pipeline for issuetrail
//!
//! Rows stream in from a `RowSource`, each row becomes one task on a
//! concurrency-limited `Scheduler`, and the finished records come back in
//! input order once every task has settled.

pub mod builder;
pub mod pipeline;
pub mod scheduler;

pub use pipeline::{Pipeline, PipelineSettings, RowFailure, RunReport, RunSummary};
pub use scheduler::Scheduler;
