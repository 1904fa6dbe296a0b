//! Error types for gitlab-automerge

use thiserror::Error;

/// Errors that can occur during a merge run
#[derive(Error, Debug)]
pub enum Error {
    /// GitLab API returned an error or an unexpected payload
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A git subprocess failed
    #[error("git error: {0}")]
    Git(String),

    /// The branch pattern is not a valid regular expression
    #[error("invalid branch pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Working-directory setup failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The GitLab host URL could not be parsed
    #[error("invalid GitLab URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
