//! glam - merge GitLab MRs matching a branch pattern into an integration
//! branch

mod cli;

use anstream::eprintln;
use clap::{Parser, Subcommand};
use cli::merge::{run_merge, MergeOptions};
use cli::style::Stylize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glam", version, about = "Merge GitLab features into an integration branch")]
struct Cli {
    /// GitLab base URL
    #[arg(short, long, global = true, env = "GITLAB_URL", default_value = "https://gitlab.com")]
    gitlab_url: String,

    /// Personal or project access token
    #[arg(short, long, global = true, env = "GITLAB_TOKEN")]
    token: Option<String>,

    /// Project id or group/name path
    #[arg(short, long, global = true, env = "GITLAB_PROJECT_ID")]
    project_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge open MRs matching the branch pattern into the destination branch
    Merge {
        /// Branch pattern (a regular expression matched against source branches)
        #[arg(long, default_value = "feature/.*")]
        branch_pattern: String,

        /// Clone the project from this URL into the working directory first
        #[arg(short, long)]
        clone: Option<String>,

        /// Working directory for the local checkout
        #[arg(short = 'b', long, default_value = "temp")]
        dir: String,

        /// Branch the working copy starts from
        #[arg(short, long, default_value = "master")]
        source_branch: String,

        /// Branch the merged result is force-pushed to
        #[arg(short, long, default_value = "dev")]
        destination_branch: String,

        /// Merge CI-gated MRs without checking their pipeline
        #[arg(long)]
        no_pipeline: bool,

        /// Also merge draft/WIP merge requests
        #[arg(long)]
        accept_draft: bool,

        /// Merge locally but do not push the destination branch
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge {
            branch_pattern,
            clone,
            dir,
            source_branch,
            destination_branch,
            no_pipeline,
            accept_draft,
            dry_run,
        } => {
            let (Some(token), Some(project_id)) = (cli.token, cli.project_id) else {
                eprintln!("{}", "--token and --project-id are required".fail());
                std::process::exit(2);
            };

            run_merge(
                &cli.gitlab_url,
                token,
                project_id,
                MergeOptions {
                    branch_pattern,
                    clone,
                    dir,
                    source_branch,
                    destination_branch,
                    no_pipeline,
                    accept_draft,
                    dry_run,
                },
            )
            .await
        }
    };

    // Per-item failures are logged, not surfaced as exit status; only a
    // run-level failure exits non-zero
    if let Err(e) = result {
        eprintln!("{} {e}", "Error:".fail());
        std::process::exit(1);
    }
}
