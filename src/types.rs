//! Core types for gitlab-automerge

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// An open merge request as returned by the GitLab REST API
///
/// Owned by the remote service; this tool only reads it and selectively
/// mutates the title and notes on conflict.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    /// Internal id, unique within the project
    pub iid: u64,
    /// Numeric project id the MR belongs to
    pub project_id: u64,
    /// MR title
    pub title: String,
    /// Branch to merge from
    pub source_branch: String,
    /// Branch the MR targets
    pub target_branch: String,
    /// Draft flag
    #[serde(default)]
    pub draft: bool,
    /// Legacy WIP flag (older GitLab versions)
    #[serde(default)]
    pub work_in_progress: bool,
    /// When the MR was created; fixes merge order deterministically
    pub created_at: DateTime<Utc>,
    /// Fine-grained merge readiness classification
    #[serde(default)]
    pub detailed_merge_status: MergeStatus,
    /// Web URL for the MR
    #[serde(default)]
    pub web_url: String,
}

impl MergeRequest {
    /// Whether this MR is flagged as not ready (either the modern draft flag
    /// or the legacy WIP flag)
    pub const fn is_draft(&self) -> bool {
        self.draft || self.work_in_progress
    }
}

/// Detailed merge status vocabulary
///
/// Only the variants the triage loop branches on are named; everything else
/// GitLab may report (`broken_status`, `not_approved`, ...) lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum MergeStatus {
    /// Ready to merge
    Mergeable,
    /// GitLab has not started evaluating mergeability yet
    Unchecked,
    /// GitLab is currently evaluating mergeability
    Checked,
    /// Blocked on a pipeline that must pass
    CiMustPass,
    /// Blocked on a pipeline that is still running
    CiStillRunning,
    /// Any other status reported by GitLab
    Other(String),
}

impl Default for MergeStatus {
    fn default() -> Self {
        Self::Unchecked
    }
}

impl From<String> for MergeStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "mergeable" => Self::Mergeable,
            "unchecked" => Self::Unchecked,
            "checked" => Self::Checked,
            "ci_must_pass" => Self::CiMustPass,
            "ci_still_running" => Self::CiStillRunning,
            _ => Self::Other(s),
        }
    }
}

impl MergeStatus {
    /// Whether GitLab is still evaluating this MR's mergeability
    ///
    /// The status poller keeps waiting while this holds.
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Unchecked | Self::Checked)
    }

    /// Whether the only thing standing between this MR and a merge is CI
    pub const fn is_ci_gated(&self) -> bool {
        matches!(self, Self::CiMustPass | Self::CiStillRunning)
    }
}

impl std::fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mergeable => write!(f, "mergeable"),
            Self::Unchecked => write!(f, "unchecked"),
            Self::Checked => write!(f, "checked"),
            Self::CiMustPass => write!(f, "ci_must_pass"),
            Self::CiStillRunning => write!(f, "ci_still_running"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A CI pipeline run for a branch
#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    /// Pipeline id
    pub id: u64,
    /// Most recent status of the run
    pub status: PipelineStatus,
    /// Ref the pipeline ran against
    #[serde(default, rename = "ref")]
    pub ref_name: String,
}

/// Pipeline status vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PipelineStatus {
    /// Pipeline finished successfully
    Success,
    /// Pipeline finished with failures
    Failed,
    /// Pipeline is still running
    Running,
    /// Pipeline has not started yet
    Pending,
    /// Any other status (canceled, skipped, manual, ...)
    Other(String),
}

impl From<String> for PipelineStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "running" => Self::Running,
            "pending" => Self::Pending,
            _ => Self::Other(s),
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Running => write!(f, "running"),
            Self::Pending => write!(f, "pending"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// How a merge request left the triage loop
///
/// Every listed MR ends the run classified as exactly one of these, so
/// nothing is ever silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageOutcome {
    /// Merged into the working copy's HEAD
    Merged,
    /// Merge conflicted; rolled back and marked draft with a failure note
    RolledBack,
    /// CI-gated and the latest pipeline is not successful (None = no
    /// pipeline exists for the branch)
    PipelineNotReady(Option<PipelineStatus>),
    /// Status is neither mergeable nor CI-gated
    Skipped(MergeStatus),
    /// Dropped in filtering: draft/WIP and drafts not accepted
    FilteredDraft,
    /// Dropped in filtering: source branch does not match the pattern
    FilteredPattern,
    /// A per-item external call failed; the run continued with the next MR
    Failed(String),
}

impl std::fmt::Display for TriageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merged => write!(f, "merged"),
            Self::RolledBack => write!(f, "rolled back (conflict)"),
            Self::PipelineNotReady(Some(status)) => write!(f, "pipeline is {status}"),
            Self::PipelineNotReady(None) => write!(f, "pipeline is not-found"),
            Self::Skipped(status) => write!(f, "skipped (status {status})"),
            Self::FilteredDraft => write!(f, "draft"),
            Self::FilteredPattern => write!(f, "branch does not match pattern"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Per-MR record of what the triage loop did
#[derive(Debug, Clone)]
pub struct TriageReport {
    /// MR internal id
    pub iid: u64,
    /// MR source branch, for display
    pub source_branch: String,
    /// How the MR left the run
    pub outcome: TriageOutcome,
}

impl TriageReport {
    /// Build a report for an MR
    pub fn new(mr: &MergeRequest, outcome: TriageOutcome) -> Self {
        Self {
            iid: mr.iid,
            source_branch: mr.source_branch.clone(),
            outcome,
        }
    }
}
