//! Core domain models for issuetrail
//!
//! This crate contains:
//! - Input rows and the per-stage enrichment values (references, details)
//! - The `Stage` outcome type shared by every enrichment stage
//! - Report shapes and the output records written for each row

pub mod error;
pub mod record;
pub mod report;
pub mod stage;

pub use error::{Error, Result};
pub use record::{InputRow, IssueDetail, IssueReference, Relevance, NULL_VALUE};
pub use report::{DetailRecord, FullRecord, OutputRecord, ReferenceRecord, ReportShape};
pub use stage::Stage;
