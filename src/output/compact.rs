//! Compact output formatter
//!
//! One line per diagnostic, minimal output for scripting.

use super::OutputFormatter;
use crate::diagnostic::Diagnostic;
use crate::engine::LintResult;

/// Compact one-line-per-diagnostic formatter
pub struct CompactFormatter {
    /// Show severity prefix
    pub show_severity: bool,
    /// Show rule code
    pub show_rule: bool,
}

impl CompactFormatter {
    /// Create a new compact formatter
    pub fn new() -> Self {
        Self {
            show_severity: true,
            show_rule: true,
        }
    }

    /// Hide severity prefix
    pub fn without_severity(mut self) -> Self {
        self.show_severity = false;
        self
    }

    /// Hide rule code
    pub fn without_rule(mut self) -> Self {
        self.show_rule = false;
        self
    }
}

impl Default for CompactFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for CompactFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        for diag in &result.diagnostics {
            output.push_str(&self.format_diagnostic(diag));
            output.push('\n');
        }

        output
    }

    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let (file, line, col) = super::location(diagnostic);
        let mut parts = vec![format!("{}:{}:{}", file, line, col)];

        if self.show_severity {
            parts.push(diagnostic.severity.to_string());
        }

        if self.show_rule {
            parts.push(diagnostic.code.clone());
        }

        parts.push(diagnostic.message.clone());

        parts.join(": ")
    }
}
