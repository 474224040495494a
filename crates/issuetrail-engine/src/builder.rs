//! Composition of stage outcomes into report records

use issuetrail_core::{
    DetailRecord, FullRecord, IssueDetail, IssueReference, NULL_VALUE, OutputRecord,
    ReferenceRecord, Relevance, ReportShape, Stage,
};
use issuetrail_text::KeywordMatcher;

pub fn reference_record(git_url: &str, reference: &Stage<IssueReference>) -> OutputRecord {
    let reference = reference.value();
    OutputRecord::Reference(ReferenceRecord {
        issue_id: reference.id.clone(),
        issue_link: reference.link.clone(),
        git_url: git_url.to_string(),
    })
}

/// Detail-only record.
///
/// Fetched details whose summary does not match the keywords are replaced by
/// the excluded marker. Sentinel details are written as they are.
pub fn detail_record(detail: &Stage<IssueDetail>, keywords: &KeywordMatcher) -> OutputRecord {
    let value = detail.value();

    if !detail.is_sentinel() && !keywords.is_relevant(&value.summary) {
        return OutputRecord::Detail(DetailRecord::excluded(&value.id));
    }

    OutputRecord::Detail(DetailRecord {
        id: value.id.clone(),
        summary: value.summary.clone(),
        description: value.description.clone(),
        comments: value.comments.clone(),
    })
}

/// Full record. Without a found reference there is no detail to merge.
pub fn full_record(
    git_url: &str,
    reference: &Stage<IssueReference>,
    detail: Option<&Stage<IssueDetail>>,
    keywords: &KeywordMatcher,
) -> OutputRecord {
    let found = reference.value();

    let Some(detail) = detail.filter(|_| reference.is_found()) else {
        return OutputRecord::Full(FullRecord::without_issue(git_url, &found.id, &found.link));
    };

    let value = detail.value();
    let relevance = if detail.is_sentinel() {
        Relevance::No
    } else {
        Relevance::from_match(keywords.is_relevant(&value.summary))
    };

    OutputRecord::Full(FullRecord {
        issue_id: found.id.clone(),
        issue_link: found.link.clone(),
        git_url: git_url.to_string(),
        issue_summary: value.summary.clone(),
        issue_summary_relevance: relevance,
        issue_description: value.description.clone(),
        issue_comments: value.comments.clone(),
    })
}

/// Record written for a row whose task failed or panicked
pub fn failed_record(shape: ReportShape, source: &str) -> OutputRecord {
    match shape {
        ReportShape::Reference => reference_record(
            source,
            &Stage::sentinel(IssueReference::absent(), "task failed"),
        ),
        ReportShape::Detail => {
            let id = match source.trim() {
                "" => NULL_VALUE,
                key => key,
            };
            OutputRecord::Detail(DetailRecord {
                id: id.to_string(),
                summary: NULL_VALUE.to_string(),
                description: NULL_VALUE.to_string(),
                comments: NULL_VALUE.to_string(),
            })
        }
        ReportShape::Full => {
            OutputRecord::Full(FullRecord::without_issue(source, NULL_VALUE, NULL_VALUE))
        }
    }
}
