//! GitHub Actions output formatter
//!
//! Outputs diagnostics in GitHub Actions workflow command format:
//! ::warning file={name},line={line},col={col}::{message}

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::LintResult;

/// Formatter for GitHub Actions annotations
pub struct GithubFormatter {
    /// Whether to include summary
    pub show_summary: bool,
}

impl GithubFormatter {
    /// Create a new GitHub formatter
    pub fn new() -> Self {
        Self { show_summary: true }
    }

    /// Disable summary output
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }
}

impl Default for GithubFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

impl OutputFormatter for GithubFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        for diag in &result.diagnostics {
            output.push_str(&self.format_diagnostic(diag));
            output.push('\n');
        }

        if self.show_summary && !result.diagnostics.is_empty() {
            output.push_str(&format!(
                "::notice::Linting complete: {} error(s), {} warning(s), {} info(s), {} hint(s) in {} file(s)\n",
                result.error_count,
                result.warning_count,
                result.info_count,
                result.hint_count,
                result.files_processed
            ));
        }

        output
    }

    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let level = match diagnostic.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information | Severity::Hint => "notice",
        };

        let (file, line, col) = super::location(diagnostic);
        let end_line = diagnostic.range.end.line + 1;

        format!(
            "::{} file={},line={},endLine={},col={},title={}::{}",
            level,
            escape_property(&file),
            line,
            end_line,
            col,
            escape_property(&diagnostic.code),
            escape_data(&diagnostic.message)
        )
    }
}
