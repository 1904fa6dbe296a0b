//! Candidate filtering and merge decisions - pure functions
//!
//! No I/O happens here - all data is passed in, making it easy to unit test.

use crate::types::{MergeRequest, MergeStatus, TriageOutcome, TriageReport};
use regex::Regex;

/// Filtering options for candidate selection
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Source branches must match this pattern (a regular expression)
    pub pattern: Regex,
    /// Keep draft/WIP merge requests instead of dropping them
    pub accept_draft: bool,
}

/// Split open MRs into merge candidates and filtered-out reports
///
/// Candidates are sorted by creation time ascending (oldest first), fixing
/// merge order deterministically across runs. Filtered MRs come back as
/// reports so the caller can log them; nothing is silently dropped.
pub fn partition_candidates(
    mrs: Vec<MergeRequest>,
    options: &FilterOptions,
) -> (Vec<MergeRequest>, Vec<TriageReport>) {
    let mut candidates = Vec::new();
    let mut filtered = Vec::new();

    for mr in mrs {
        if !options.pattern.is_match(&mr.source_branch) {
            filtered.push(TriageReport::new(&mr, TriageOutcome::FilteredPattern));
        } else if mr.is_draft() && !options.accept_draft {
            filtered.push(TriageReport::new(&mr, TriageOutcome::FilteredDraft));
        } else {
            candidates.push(mr);
        }
    }

    // sort_by is stable, so equal timestamps keep listing order
    candidates.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    (candidates, filtered)
}

/// What to do with an MR once its merge status is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Merge immediately
    MergeNow,
    /// Consult the latest pipeline before merging
    CheckPipeline,
    /// Leave the MR alone this run
    Skip,
}

/// Classify a resolved merge status into a triage decision
///
/// `mergeable` merges outright. CI-gated statuses merge outright when
/// pipeline gating is bypassed, otherwise defer to the pipeline check.
/// Everything else is skipped.
pub const fn decide(status: &MergeStatus, no_pipeline_check: bool) -> Decision {
    match status {
        MergeStatus::Mergeable => Decision::MergeNow,
        MergeStatus::CiMustPass | MergeStatus::CiStillRunning => {
            if no_pipeline_check {
                Decision::MergeNow
            } else {
                Decision::CheckPipeline
            }
        }
        _ => Decision::Skip,
    }
}
