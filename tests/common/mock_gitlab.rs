//! Mock GitLab API for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use gitlab_automerge::error::{Error, Result};
use gitlab_automerge::gitlab::GitLabApi;
use gitlab_automerge::types::{MergeRequest, Pipeline};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Call record for `update_title`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTitleCall {
    pub iid: u64,
    pub title: String,
}

/// Call record for `create_note`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNoteCall {
    pub iid: u64,
    pub body: String,
}

/// Simple mock GitLab API for testing
///
/// Features:
/// - Configurable list/get/pipeline responses
/// - `get_merge_request` responses as per-MR sequences, so polling tests
///   can script a status that settles after N refetches (the last response
///   is sticky)
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockGitLabApi {
    list_response: Mutex<Vec<MergeRequest>>,
    get_responses: Mutex<HashMap<u64, VecDeque<MergeRequest>>>,
    pipeline_responses: Mutex<HashMap<String, Option<Pipeline>>>,
    // Call tracking
    list_calls: Mutex<u32>,
    get_calls: Mutex<Vec<u64>>,
    pipeline_calls: Mutex<Vec<String>>,
    update_title_calls: Mutex<Vec<UpdateTitleCall>>,
    create_note_calls: Mutex<Vec<CreateNoteCall>>,
    // Error injection
    error_on_list: Mutex<Option<String>>,
    error_on_get: Mutex<Option<String>>,
    error_on_pipeline: Mutex<Option<String>>,
    error_on_update_title: Mutex<Option<String>>,
    error_on_create_note: Mutex<Option<String>>,
}

impl MockGitLabApi {
    pub fn new() -> Self {
        Self {
            list_response: Mutex::new(Vec::new()),
            get_responses: Mutex::new(HashMap::new()),
            pipeline_responses: Mutex::new(HashMap::new()),
            list_calls: Mutex::new(0),
            get_calls: Mutex::new(Vec::new()),
            pipeline_calls: Mutex::new(Vec::new()),
            update_title_calls: Mutex::new(Vec::new()),
            create_note_calls: Mutex::new(Vec::new()),
            error_on_list: Mutex::new(None),
            error_on_get: Mutex::new(None),
            error_on_pipeline: Mutex::new(None),
            error_on_update_title: Mutex::new(None),
            error_on_create_note: Mutex::new(None),
        }
    }

    // === Response configuration ===

    /// Set the MRs returned by `list_open_merge_requests`
    pub fn set_open_merge_requests(&self, mrs: Vec<MergeRequest>) {
        *self.list_response.lock().unwrap() = mrs;
    }

    /// Queue a `get_merge_request` response for an MR; the last queued
    /// response repeats once the queue is drained
    pub fn push_get_response(&self, mr: MergeRequest) {
        self.get_responses
            .lock()
            .unwrap()
            .entry(mr.iid)
            .or_default()
            .push_back(mr);
    }

    /// Set the latest pipeline for a ref (None = no pipeline exists)
    pub fn set_latest_pipeline(&self, ref_name: &str, pipeline: Option<Pipeline>) {
        self.pipeline_responses
            .lock()
            .unwrap()
            .insert(ref_name.to_string(), pipeline);
    }

    // === Error injection ===

    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_get(&self, msg: &str) {
        *self.error_on_get.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_pipeline(&self, msg: &str) {
        *self.error_on_pipeline.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_update_title(&self, msg: &str) {
        *self.error_on_update_title.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_create_note(&self, msg: &str) {
        *self.error_on_create_note.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification ===

    pub fn list_call_count(&self) -> u32 {
        *self.list_calls.lock().unwrap()
    }

    pub fn get_calls(&self) -> Vec<u64> {
        self.get_calls.lock().unwrap().clone()
    }

    pub fn pipeline_calls(&self) -> Vec<String> {
        self.pipeline_calls.lock().unwrap().clone()
    }

    pub fn update_title_calls(&self) -> Vec<UpdateTitleCall> {
        self.update_title_calls.lock().unwrap().clone()
    }

    pub fn create_note_calls(&self) -> Vec<CreateNoteCall> {
        self.create_note_calls.lock().unwrap().clone()
    }

    /// Assert that the title of an MR was updated to `title`
    pub fn assert_title_updated(&self, iid: u64, title: &str) {
        let calls = self.update_title_calls();
        assert!(
            calls.iter().any(|c| c.iid == iid && c.title == title),
            "Expected update_title({iid}, {title:?}) but got: {calls:?}"
        );
    }

    /// Assert that no draft mutation happened for an MR
    pub fn assert_not_marked_draft(&self, iid: u64) {
        let titles = self.update_title_calls();
        let notes = self.create_note_calls();
        assert!(
            !titles.iter().any(|c| c.iid == iid),
            "Expected no update_title({iid}) but got: {titles:?}"
        );
        assert!(
            !notes.iter().any(|c| c.iid == iid),
            "Expected no create_note({iid}) but got: {notes:?}"
        );
    }
}

impl Default for MockGitLabApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitLabApi for MockGitLabApi {
    async fn list_open_merge_requests(&self) -> Result<Vec<MergeRequest>> {
        *self.list_calls.lock().unwrap() += 1;

        if let Some(msg) = self.error_on_list.lock().unwrap().as_ref() {
            return Err(Error::GitLabApi(msg.clone()));
        }

        Ok(self.list_response.lock().unwrap().clone())
    }

    async fn get_merge_request(&self, iid: u64) -> Result<MergeRequest> {
        self.get_calls.lock().unwrap().push(iid);

        if let Some(msg) = self.error_on_get.lock().unwrap().as_ref() {
            return Err(Error::GitLabApi(msg.clone()));
        }

        let mut responses = self.get_responses.lock().unwrap();
        let queue = responses.get_mut(&iid).ok_or_else(|| {
            Error::GitLabApi(format!("get_merge_request: no response configured for !{iid}"))
        })?;

        let mr = queue.pop_front().ok_or_else(|| {
            Error::GitLabApi(format!("get_merge_request: response queue empty for !{iid}"))
        })?;
        if queue.is_empty() {
            // last response is sticky
            queue.push_back(mr.clone());
        }
        Ok(mr)
    }

    async fn latest_pipeline(&self, ref_name: &str) -> Result<Option<Pipeline>> {
        self.pipeline_calls.lock().unwrap().push(ref_name.to_string());

        if let Some(msg) = self.error_on_pipeline.lock().unwrap().as_ref() {
            return Err(Error::GitLabApi(msg.clone()));
        }

        Ok(self
            .pipeline_responses
            .lock()
            .unwrap()
            .get(ref_name)
            .cloned()
            .flatten())
    }

    async fn update_title(&self, iid: u64, title: &str) -> Result<()> {
        self.update_title_calls.lock().unwrap().push(UpdateTitleCall {
            iid,
            title: title.to_string(),
        });

        if let Some(msg) = self.error_on_update_title.lock().unwrap().as_ref() {
            return Err(Error::GitLabApi(msg.clone()));
        }

        Ok(())
    }

    async fn create_note(&self, iid: u64, body: &str) -> Result<()> {
        self.create_note_calls.lock().unwrap().push(CreateNoteCall {
            iid,
            body: body.to_string(),
        });

        if let Some(msg) = self.error_on_create_note.lock().unwrap().as_ref() {
            return Err(Error::GitLabApi(msg.clone()));
        }

        Ok(())
    }
}
