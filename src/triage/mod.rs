//! Merge-request triage
//!
//! Split like the rest of the crate's command flow:
//! 1. Filter - pure candidate selection and ordering (testable, no I/O)
//! 2. Poll - bounded wait for GitLab to finish evaluating mergeability
//! 3. Run - effectful loop: merge, gate on pipelines, roll back conflicts

mod filter;
mod poll;
mod run;

pub use filter::{decide, partition_candidates, Decision, FilterOptions};
pub use poll::{poll_merge_status, MAX_POLL_ATTEMPTS, POLL_INTERVAL};
pub use run::{run_triage, TriageOptions, CONFLICT_NOTE, DRAFT_PREFIX};
