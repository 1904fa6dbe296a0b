//! GitLab API access
//!
//! Provides a trait seam over the handful of endpoints the triage loop
//! needs, so tests can substitute a mock service.

mod client;

pub use client::GitLabClient;

use crate::error::Result;
use crate::types::{MergeRequest, Pipeline};
use async_trait::async_trait;

/// GitLab API operations used by the triage loop
///
/// Implemented by [`GitLabClient`] over REST; tests provide a mock.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// List all open merge requests for the configured project
    ///
    /// Paginated at 100 per page, capped at 10 pages (1000 MRs max).
    async fn list_open_merge_requests(&self) -> Result<Vec<MergeRequest>>;

    /// Fetch a single merge request's current state by internal id
    async fn get_merge_request(&self, iid: u64) -> Result<MergeRequest>;

    /// Fetch the most recent pipeline run for a ref, if any
    async fn latest_pipeline(&self, ref_name: &str) -> Result<Option<Pipeline>>;

    /// Replace a merge request's title
    async fn update_title(&self, iid: u64, title: &str) -> Result<()>;

    /// Post a note (comment) on a merge request
    async fn create_note(&self, iid: u64, body: &str) -> Result<()>;
}
