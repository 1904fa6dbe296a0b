//! Triage loop execution - effectful operations
//!
//! Takes the candidates selected by the pure filtering functions and
//! processes them one at a time: resolve merge status, gate on pipelines,
//! merge locally, roll back conflicts. Strictly sequential - the working
//! copy's HEAD can only hold one merge result at a time and merge order
//! affects which conflicts surface.

use crate::error::Result;
use crate::git::WorkingCopy;
use crate::gitlab::GitLabApi;
use crate::triage::filter::{decide, partition_candidates, Decision, FilterOptions};
use crate::triage::poll::poll_merge_status;
use crate::types::{MergeRequest, PipelineStatus, TriageOutcome, TriageReport};
use tracing::{error, info, warn};

/// Title prefix that marks a merge request as draft
pub const DRAFT_PREFIX: &str = "Draft: ";

/// Note posted on a merge request whose local merge conflicted
pub const CONFLICT_NOTE: &str = "[AUTOMERGE][FAILED] Conflict with other merge request";

/// Options for a triage run
#[derive(Debug, Clone)]
pub struct TriageOptions {
    /// Candidate filtering (branch pattern, draft acceptance)
    pub filter: FilterOptions,
    /// Merge CI-gated MRs without consulting their pipeline
    pub no_pipeline_check: bool,
    /// Branch the merged result is force-pushed to
    pub destination_branch: String,
    /// Merge locally but never push the destination branch
    pub dry_run: bool,
}

/// Run the triage loop over all open merge requests
///
/// Lists, filters, sorts, then processes each candidate sequentially.
/// Per-item failures never abort the run: a failed external call turns
/// into [`TriageOutcome::Failed`] for that MR and the loop continues.
/// The returned reports cover every listed MR exactly once.
///
/// After all MRs are processed, HEAD is force-pushed to the destination
/// branch unless dry-run is set. The force is intentional: the destination
/// is a disposable integration branch, rebuilt fresh each run. A push
/// failure is a run-level failure, not a per-item one.
pub async fn run_triage(
    api: &dyn GitLabApi,
    workdir: &dyn WorkingCopy,
    options: &TriageOptions,
) -> Result<Vec<TriageReport>> {
    // A listing failure degrades to an empty run rather than aborting
    let mrs = match api.list_open_merge_requests().await {
        Ok(mrs) => mrs,
        Err(e) => {
            error!(error = %e, "failed to list open merge requests");
            Vec::new()
        }
    };

    info!(count = mrs.len(), "found open merge requests");

    let (candidates, mut reports) = partition_candidates(mrs, &options.filter);
    for report in &reports {
        info!(
            source_branch = %report.source_branch,
            outcome = %report.outcome,
            "filtered out"
        );
    }

    for mr in candidates {
        let outcome = match process_merge_request(api, workdir, &mr, options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    mr_iid = mr.iid,
                    source_branch = %mr.source_branch,
                    error = %e,
                    "merge request processing failed, continuing"
                );
                TriageOutcome::Failed(e.to_string())
            }
        };
        reports.push(TriageReport::new(&mr, outcome));
    }

    if options.dry_run {
        info!("dry run, skipping push");
    } else {
        info!(destination = %options.destination_branch, "force-pushing HEAD");
        workdir
            .force_push("origin", &options.destination_branch)
            .await?;
    }

    Ok(reports)
}

/// Triage a single merge request
///
/// Any error returned here is confined to this MR by the caller.
async fn process_merge_request(
    api: &dyn GitLabApi,
    workdir: &dyn WorkingCopy,
    mr: &MergeRequest,
    options: &TriageOptions,
) -> Result<TriageOutcome> {
    let status = poll_merge_status(api, mr).await?;

    info!(
        mr_iid = mr.iid,
        source_branch = %mr.source_branch,
        status = %status,
        "resolved merge status"
    );

    match decide(&status, options.no_pipeline_check) {
        Decision::MergeNow => merge_merge_request(api, workdir, mr).await,
        Decision::CheckPipeline => {
            info!(source_branch = %mr.source_branch, "verifying pipeline");
            let pipeline_status = api
                .latest_pipeline(&mr.source_branch)
                .await?
                .map(|p| p.status);

            if pipeline_status == Some(PipelineStatus::Success) {
                merge_merge_request(api, workdir, mr).await
            } else {
                // A failed or missing pipeline is not a run failure and
                // never triggers draft handling; only conflicts do
                info!(
                    source_branch = %mr.source_branch,
                    pipeline = %pipeline_status
                        .as_ref()
                        .map_or_else(|| "not-found".to_string(), ToString::to_string),
                    "pipeline not ready, skipping"
                );
                Ok(TriageOutcome::PipelineNotReady(pipeline_status))
            }
        }
        Decision::Skip => {
            info!(
                source_branch = %mr.source_branch,
                status = %status,
                "ignored because of status"
            );
            Ok(TriageOutcome::Skipped(status))
        }
    }
}

/// Attempt the local no-fast-forward merge; roll back on failure
///
/// A fixed single attempt per MR per run. On failure the in-progress merge
/// is aborted (best-effort) and the conflict handler takes over.
async fn merge_merge_request(
    api: &dyn GitLabApi,
    workdir: &dyn WorkingCopy,
    mr: &MergeRequest,
) -> Result<TriageOutcome> {
    let remote_ref = format!("origin/{}", mr.source_branch);

    match workdir.merge_no_ff(&remote_ref).await {
        Ok(()) => {
            info!(source_branch = %mr.source_branch, "merged");
            Ok(TriageOutcome::Merged)
        }
        Err(e) => {
            error!(
                source_branch = %mr.source_branch,
                error = %e,
                "failed to merge, rolling back"
            );

            if let Err(abort_err) = workdir.abort_merge().await {
                warn!(error = %abort_err, "failed to abort merge");
            }

            mark_conflicted(api, mr).await;
            Ok(TriageOutcome::RolledBack)
        }
    }
}

/// Flag a conflicting merge request as draft and leave a failure note
///
/// Skipped when the MR is already draft/WIP or already carries the prefix.
/// Both mutations are best-effort: each failure is logged and swallowed so
/// one API hiccup does not cascade, and both are attempted regardless.
async fn mark_conflicted(api: &dyn GitLabApi, mr: &MergeRequest) {
    if mr.is_draft() || mr.title.starts_with(DRAFT_PREFIX) {
        return;
    }

    info!(
        mr_iid = mr.iid,
        source_branch = %mr.source_branch,
        "setting merge request to draft"
    );

    let draft_title = format!("{DRAFT_PREFIX}{}", mr.title);
    if let Err(e) = api.update_title(mr.iid, &draft_title).await {
        warn!(mr_iid = mr.iid, error = %e, "failed to set draft title");
    }

    if let Err(e) = api.create_note(mr.iid, CONFLICT_NOTE).await {
        warn!(mr_iid = mr.iid, error = %e, "failed to post conflict note");
    }
}
