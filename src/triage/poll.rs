//! Status polling - bounded wait for GitLab to evaluate mergeability

use crate::error::Result;
use crate::gitlab::GitLabApi;
use crate::types::{MergeRequest, MergeStatus};
use std::time::Duration;
use tracing::info;

/// Fixed delay between polling attempts
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Upper bound on polling attempts per merge request
pub const MAX_POLL_ATTEMPTS: u32 = 10;

/// Wait until a merge request leaves the in-progress evaluation set
///
/// GitLab reports `unchecked`/`checked` while it is still computing
/// mergeability. This refetches the MR every [`POLL_INTERVAL`] until the
/// status settles, bounded at [`MAX_POLL_ATTEMPTS`] refetches. Whatever
/// status is current after the bound is returned - possibly still pending
/// if GitLab never finished, which is a known edge case and not an error.
///
/// Refetch failures propagate; the triage loop treats them as that item's
/// failure and moves on.
pub async fn poll_merge_status(api: &dyn GitLabApi, mr: &MergeRequest) -> Result<MergeStatus> {
    let mut current = mr.clone();

    for _ in 0..MAX_POLL_ATTEMPTS {
        if !current.detailed_merge_status.is_pending() {
            return Ok(current.detailed_merge_status);
        }

        info!(
            source_branch = %current.source_branch,
            status = %current.detailed_merge_status,
            "waiting for merge status evaluation"
        );

        tokio::time::sleep(POLL_INTERVAL).await;
        current = api.get_merge_request(current.iid).await?;
    }

    Ok(current.detailed_merge_status)
}
