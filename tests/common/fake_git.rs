//! Fake working copy for testing

#![allow(dead_code)]

use async_trait::async_trait;
use gitlab_automerge::error::{Error, Result};
use gitlab_automerge::git::WorkingCopy;
use std::collections::HashSet;
use std::sync::Mutex;

/// In-memory working copy that records every operation
///
/// Merges succeed unless the ref was registered as conflicting, mirroring a
/// real checkout where some branches apply cleanly and some collide.
pub struct FakeWorkingCopy {
    conflicting_refs: Mutex<HashSet<String>>,
    fail_abort: Mutex<bool>,
    fail_push: Mutex<bool>,
    // Call tracking
    clones: Mutex<Vec<String>>,
    checkouts: Mutex<Vec<String>>,
    merges: Mutex<Vec<String>>,
    aborts: Mutex<u32>,
    pushes: Mutex<Vec<(String, String)>>,
}

impl FakeWorkingCopy {
    pub fn new() -> Self {
        Self {
            conflicting_refs: Mutex::new(HashSet::new()),
            fail_abort: Mutex::new(false),
            fail_push: Mutex::new(false),
            clones: Mutex::new(Vec::new()),
            checkouts: Mutex::new(Vec::new()),
            merges: Mutex::new(Vec::new()),
            aborts: Mutex::new(0),
            pushes: Mutex::new(Vec::new()),
        }
    }

    /// Make merging this ref fail with a conflict
    pub fn set_conflicting(&self, ref_name: &str) {
        self.conflicting_refs
            .lock()
            .unwrap()
            .insert(ref_name.to_string());
    }

    /// Make `abort_merge` fail
    pub fn fail_abort(&self) {
        *self.fail_abort.lock().unwrap() = true;
    }

    /// Make `force_push` fail
    pub fn fail_push(&self) {
        *self.fail_push.lock().unwrap() = true;
    }

    /// Refs merged successfully, in order
    pub fn merged_refs(&self) -> Vec<String> {
        let conflicting = self.conflicting_refs.lock().unwrap();
        self.merges
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !conflicting.contains(*r))
            .cloned()
            .collect()
    }

    /// Every merge attempt, successful or not, in order
    pub fn merge_attempts(&self) -> Vec<String> {
        self.merges.lock().unwrap().clone()
    }

    pub fn abort_count(&self) -> u32 {
        *self.aborts.lock().unwrap()
    }

    pub fn pushes(&self) -> Vec<(String, String)> {
        self.pushes.lock().unwrap().clone()
    }

    /// Assert that a ref was never merged into the working copy
    pub fn assert_never_merged(&self, ref_name: &str) {
        let attempts = self.merge_attempts();
        assert!(
            !attempts.iter().any(|r| r == ref_name),
            "Expected {ref_name} never to be merged but attempts were: {attempts:?}"
        );
    }
}

impl Default for FakeWorkingCopy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkingCopy for FakeWorkingCopy {
    async fn clone_from(&self, url: &str) -> Result<()> {
        self.clones.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn checkout_tracking(&self, branch: &str) -> Result<()> {
        self.checkouts.lock().unwrap().push(branch.to_string());
        Ok(())
    }

    async fn merge_no_ff(&self, ref_name: &str) -> Result<()> {
        self.merges.lock().unwrap().push(ref_name.to_string());

        if self.conflicting_refs.lock().unwrap().contains(ref_name) {
            return Err(Error::Git(format!(
                "git merge {ref_name} failed: CONFLICT (content)"
            )));
        }
        Ok(())
    }

    async fn abort_merge(&self) -> Result<()> {
        *self.aborts.lock().unwrap() += 1;

        if *self.fail_abort.lock().unwrap() {
            return Err(Error::Git("git merge --abort failed".to_string()));
        }
        Ok(())
    }

    async fn force_push(&self, remote: &str, dest_branch: &str) -> Result<()> {
        if *self.fail_push.lock().unwrap() {
            return Err(Error::Git("git push failed".to_string()));
        }

        self.pushes
            .lock()
            .unwrap()
            .push((remote.to_string(), dest_branch.to_string()));
        Ok(())
    }
}
