//! Output formatters for lint results

mod compact;
mod github;
mod json;
mod text;

pub use compact::CompactFormatter;
pub use github::GithubFormatter;
pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::diagnostic::Diagnostic;
use crate::engine::LintResult;

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format the entire lint result
    fn format(&self, result: &LintResult) -> String;

    /// Format a single diagnostic
    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String;
}

/// File name, 1-based line and 1-based column of a diagnostic's start
pub(crate) fn location(diagnostic: &Diagnostic) -> (String, usize, usize) {
    let file = diagnostic
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<input>".to_string());
    let start = diagnostic.range.start;
    (file, start.line + 1, start.character + 1)
}
