//! GitLab REST client implementation

use crate::error::{Error, Result};
use crate::gitlab::GitLabApi;
use crate::types::{MergeRequest, Pipeline};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size when listing open merge requests
const LIST_PAGE_SIZE: usize = 100;

/// Upper bound on pages fetched when listing (1000 MRs max)
const LIST_MAX_PAGES: usize = 10;

/// GitLab service using reqwest
pub struct GitLabClient {
    client: Client,
    token: String,
    base: Url,
    project: String,
}

impl GitLabClient {
    /// Create a new client for one project
    ///
    /// `host` is the GitLab base URL (e.g. `https://gitlab.com`); `project`
    /// is either a numeric project id or a `group/name` path.
    pub fn new(host: &str, token: String, project: String) -> Result<Self> {
        let base = Url::parse(host)?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::GitLabApi(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            base,
            project,
        })
    }

    fn api_url(&self, path: &str) -> String {
        let base = self.base.as_str().trim_end_matches('/');
        format!("{base}/api/v4{path}")
    }

    fn encoded_project(&self) -> String {
        urlencoding::encode(&self.project).into_owned()
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    async fn list_open_merge_requests(&self) -> Result<Vec<MergeRequest>> {
        debug!(project = %self.project, "listing open MRs");
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests",
            self.encoded_project()
        ));

        let per_page = LIST_PAGE_SIZE.to_string();
        let mut all = Vec::new();
        for page in 1..=LIST_MAX_PAGES {
            let page = page.to_string();
            let mrs: Vec<MergeRequest> = self
                .client
                .get(&url)
                .header("PRIVATE-TOKEN", &self.token)
                .query(&[
                    ("state", "opened"),
                    ("per_page", per_page.as_str()),
                    ("page", page.as_str()),
                ])
                .send()
                .await?
                .error_for_status()
                .map_err(|e| Error::GitLabApi(e.to_string()))?
                .json()
                .await?;

            let full_page = mrs.len() == LIST_PAGE_SIZE;
            all.extend(mrs);
            if !full_page {
                break;
            }
        }

        debug!(count = all.len(), "listed open MRs");
        Ok(all)
    }

    async fn get_merge_request(&self, iid: u64) -> Result<MergeRequest> {
        debug!(mr_iid = iid, "fetching MR");
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests/{}",
            self.encoded_project(),
            iid
        ));

        let mr: MergeRequest = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        debug!(mr_iid = iid, status = %mr.detailed_merge_status, "fetched MR");
        Ok(mr)
    }

    async fn latest_pipeline(&self, ref_name: &str) -> Result<Option<Pipeline>> {
        debug!(ref_name, "fetching latest pipeline");
        let url = self.api_url(&format!("/projects/{}/pipelines", self.encoded_project()));

        let pipelines: Vec<Pipeline> = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("ref", ref_name), ("per_page", "1"), ("page", "1")])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        let latest = pipelines.into_iter().next();
        if let Some(ref p) = latest {
            debug!(ref_name, status = %p.status, "found pipeline");
        } else {
            debug!(ref_name, "no pipeline found");
        }
        Ok(latest)
    }

    async fn update_title(&self, iid: u64, title: &str) -> Result<()> {
        debug!(mr_iid = iid, title, "updating MR title");
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests/{}",
            self.encoded_project(),
            iid
        ));

        self.client
            .put(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?;

        debug!(mr_iid = iid, "updated MR title");
        Ok(())
    }

    async fn create_note(&self, iid: u64, body: &str) -> Result<()> {
        debug!(mr_iid = iid, "creating MR note");
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests/{}/notes",
            self.encoded_project(),
            iid
        ));

        self.client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?;

        debug!(mr_iid = iid, "created MR note");
        Ok(())
    }
}
