//! Merge command - triage and merge open MRs into the integration branch

use crate::cli::style::{check, spinner_style, Stylize};
use anstream::println;
use gitlab_automerge::error::Result;
use gitlab_automerge::git::{GitWorkingCopy, WorkingCopy};
use gitlab_automerge::gitlab::GitLabClient;
use gitlab_automerge::triage::{run_triage, FilterOptions, TriageOptions};
use gitlab_automerge::types::{TriageOutcome, TriageReport};
use indicatif::ProgressBar;
use regex::Regex;
use std::path::Path;
use std::time::Duration;

/// Options for the merge command
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Source branches must match this regular expression
    pub branch_pattern: String,
    /// Clone URL; when set, the working directory is recreated and cloned
    pub clone: Option<String>,
    /// Working directory holding the local checkout
    pub dir: String,
    /// Branch the working copy starts from
    pub source_branch: String,
    /// Branch the merged result is force-pushed to
    pub destination_branch: String,
    /// Merge CI-gated MRs without consulting their pipeline
    pub no_pipeline: bool,
    /// Keep draft/WIP merge requests in the candidate set
    pub accept_draft: bool,
    /// Merge locally but never push the destination branch
    pub dry_run: bool,
}

/// Run the merge command
pub async fn run_merge(
    gitlab_url: &str,
    token: String,
    project_id: String,
    options: MergeOptions,
) -> Result<()> {
    // Validate the pattern before touching the network or the filesystem
    let triage_options = TriageOptions {
        filter: FilterOptions {
            pattern: Regex::new(&options.branch_pattern)?,
            accept_draft: options.accept_draft,
        },
        no_pipeline_check: options.no_pipeline,
        destination_branch: options.destination_branch.clone(),
        dry_run: options.dry_run,
    };

    let api = GitLabClient::new(gitlab_url, token, project_id)?;

    prepare_workdir(&options)?;
    let workdir = GitWorkingCopy::new(&options.dir);

    if let Some(ref clone_url) = options.clone {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!("Cloning {}...", clone_url.accent()));
        spinner.enable_steady_tick(Duration::from_millis(80));

        workdir.clone_from(clone_url).await?;

        spinner.finish_with_message(format!("{} Cloned {}", check(), clone_url.accent()));
    }

    println!(
        "{}",
        format!(
            "Checking out source branch origin/{}",
            options.source_branch
        )
        .muted()
    );
    // Best-effort: the branch may already be checked out from a prior run
    if let Err(e) = workdir.checkout_tracking(&options.source_branch).await {
        println!("{}", format!("Checkout skipped: {e}").muted());
    }

    let reports = run_triage(&api, &workdir, &triage_options).await?;
    print_reports(&reports);

    if options.dry_run {
        println!("{}", "Dry run, no push".muted());
    } else {
        println!(
            "{} Pushed {}",
            check(),
            options.destination_branch.accent()
        );
    }

    Ok(())
}

/// Recreate the working directory when a clone source is given
///
/// Without a clone URL the directory is reused as-is. `.` is never wiped.
fn prepare_workdir(options: &MergeOptions) -> Result<()> {
    if options.clone.is_none() || options.dir == "." || options.dir == "/." {
        return Ok(());
    }

    let dir = Path::new(&options.dir);
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Print one color-coded line per triaged merge request
fn print_reports(reports: &[TriageReport]) {
    for report in reports {
        let line = format!(
            "!{} {}: {}",
            report.iid, report.source_branch, report.outcome
        );
        let styled = match &report.outcome {
            TriageOutcome::Merged => line.success(),
            TriageOutcome::RolledBack | TriageOutcome::Failed(_) => line.fail(),
            TriageOutcome::PipelineNotReady(_) | TriageOutcome::FilteredDraft => line.warn(),
            TriageOutcome::Skipped(_) | TriageOutcome::FilteredPattern => line.muted(),
        };
        println!("{styled}");
    }

    let merged = reports
        .iter()
        .filter(|r| r.outcome == TriageOutcome::Merged)
        .count();
    println!();
    println!(
        "{} {}",
        "Merged".emphasis(),
        format!("{merged} of {} merge request(s)", reports.len()).accent()
    );
}
