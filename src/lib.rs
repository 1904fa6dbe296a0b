//! gitlab-automerge - merge GitLab MRs matching a branch pattern into an
//! integration branch
//!
//! The core is the triage loop in [`triage`]: list open merge requests,
//! filter by branch pattern and draft status, wait for GitLab to evaluate
//! mergeability, optionally gate on the latest pipeline, merge locally with
//! no-fast-forward semantics, and roll conflicting MRs back into a draft
//! with a failure note. The [`gitlab`] and [`git`] modules wrap the two
//! external services this orchestrates.

pub mod error;
pub mod git;
pub mod gitlab;
pub mod triage;
pub mod types;
