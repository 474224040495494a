//! Text cleanup for issue comments
//!
//! - `Normalizer` strips wiki markup in a fixed order
//! - `KeywordMatcher` decides whether text is about logging or severity
//! - `CommentFormatter` combines both into the numbered comment blocks written to reports

pub mod comment;
pub mod keywords;
pub mod normalize;

pub use comment::CommentFormatter;
pub use keywords::{DEFAULT_KEYWORDS, EXCLUDED_COMMENT, KeywordMatcher};
pub use normalize::Normalizer;
