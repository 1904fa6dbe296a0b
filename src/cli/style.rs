//! Terminal styling helpers for CLI output

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;

/// Styling extensions for user-facing output
///
/// All outcomes are communicated via color-coded lines; there is no
/// machine-readable output.
pub trait Stylize {
    /// De-emphasized secondary text
    fn muted(&self) -> String;
    /// Highlighted value (branch names, counts)
    fn accent(&self) -> String;
    /// Successful outcome
    fn success(&self) -> String;
    /// Warning or degraded outcome
    fn warn(&self) -> String;
    /// Failure
    fn fail(&self) -> String;
    /// Section headers and key phrases
    fn emphasis(&self) -> String;
}

impl<T: std::fmt::Display> Stylize for T {
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    fn success(&self) -> String {
        self.green().to_string()
    }

    fn warn(&self) -> String {
        self.yellow().to_string()
    }

    fn fail(&self) -> String {
        self.red().to_string()
    }

    fn emphasis(&self) -> String {
        self.bold().to_string()
    }
}

/// Green check mark
pub fn check() -> String {
    "✓".green().to_string()
}

/// Spinner style for long-running steps
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
