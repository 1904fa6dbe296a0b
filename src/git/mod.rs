//! Local git working copy
//!
//! The working copy is the merge staging ground: one checkout, mutated only
//! by clone/checkout/merge/push. It is passed explicitly through the triage
//! loop behind a trait so tests can substitute a fake.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Operations the triage loop needs from a local checkout
#[async_trait]
pub trait WorkingCopy: Send + Sync {
    /// Clone a remote repository into the working directory
    async fn clone_from(&self, url: &str) -> Result<()>;

    /// Check out a branch tracking `origin/<branch>`
    async fn checkout_tracking(&self, branch: &str) -> Result<()>;

    /// Merge a ref into HEAD with no-fast-forward semantics
    async fn merge_no_ff(&self, ref_name: &str) -> Result<()>;

    /// Abort an in-progress merge
    async fn abort_merge(&self) -> Result<()>;

    /// Force-push HEAD to a branch on a remote
    async fn force_push(&self, remote: &str, dest_branch: &str) -> Result<()>;
}

/// Working copy backed by the `git` binary
pub struct GitWorkingCopy {
    dir: PathBuf,
}

impl GitWorkingCopy {
    /// Create a handle rooted at `dir`
    ///
    /// The directory must exist; it is created by the caller during
    /// working-directory setup.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this working copy operates in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        debug!(?args, dir = %self.dir.display(), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git {}: {e}", args.join(" "))))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl WorkingCopy for GitWorkingCopy {
    async fn clone_from(&self, url: &str) -> Result<()> {
        self.git(&["clone", "-q", url, "."]).await?;
        Ok(())
    }

    async fn checkout_tracking(&self, branch: &str) -> Result<()> {
        let remote_ref = format!("origin/{branch}");
        self.git(&["checkout", "-q", "--track", &remote_ref]).await?;
        Ok(())
    }

    async fn merge_no_ff(&self, ref_name: &str) -> Result<()> {
        self.git(&["merge", ref_name, "--no-ff", "--no-edit"]).await?;
        Ok(())
    }

    async fn abort_merge(&self) -> Result<()> {
        self.git(&["merge", "--abort"]).await?;
        Ok(())
    }

    async fn force_push(&self, remote: &str, dest_branch: &str) -> Result<()> {
        let refspec = format!("HEAD:{dest_branch}");
        self.git(&["push", "-f", remote, &refspec]).await?;
        Ok(())
    }
}
