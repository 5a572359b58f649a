//! JSON output formatter
//!
//! Diagnostics are written in their serialized shape
//! (`code`, `message`, `path`, `range`, `severity`, `source`).

use super::OutputFormatter;
use crate::diagnostic::Diagnostic;
use crate::engine::LintResult;
use serde::Serialize;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print with indentation
    pub pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| {
            log::error!("Failed to serialize JSON output: {}", e);
            String::new()
        })
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    diagnostics: &'a [Diagnostic],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    files_processed: usize,
    files_with_errors: usize,
    files_with_warnings: usize,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
    hint_count: usize,
    duration_ms: u128,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &LintResult) -> String {
        let output = JsonOutput {
            diagnostics: &result.diagnostics,
            summary: JsonSummary {
                files_processed: result.files_processed,
                files_with_errors: result.files_with_errors,
                files_with_warnings: result.files_with_warnings,
                error_count: result.error_count,
                warning_count: result.warning_count,
                info_count: result.info_count,
                hint_count: result.hint_count,
                duration_ms: result.duration.as_millis(),
            },
        };

        self.render(&output)
    }

    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        self.render(diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Position, Range, Severity};

    fn diagnostic() -> Diagnostic {
        Diagnostic::new(
            "test-rule",
            "Test message",
            vec!["paths".into(), "/test".into()],
            Range::new(Position::new(10, 2), Position::new(10, 7)),
            Severity::Error,
        )
    }

    #[test]
    fn test_json_format_diagnostic() {
        let output = JsonFormatter::new().format_diagnostic(&diagnostic());
        assert!(output.contains("\"code\":\"test-rule\""));
        assert!(output.contains("\"severity\":0"));
        assert!(output.contains("\"path\":[\"paths\",\"/test\"]"));
        assert!(output.contains("\"start\":{\"line\":10,\"character\":2}"));
    }

    #[test]
    fn test_json_format_result() {
        let result = LintResult {
            diagnostics: vec![diagnostic()],
            files_processed: 5,
            error_count: 2,
            warning_count: 3,
            ..Default::default()
        };

        let output = JsonFormatter::new().format(&result);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["summary"]["files_processed"], 5);
        assert_eq!(value["summary"]["warning_count"], 3);
        assert_eq!(value["diagnostics"][0]["code"], "test-rule");
    }

    #[test]
    fn test_json_pretty() {
        let output = JsonFormatter::new().pretty().format_diagnostic(&diagnostic());
        assert!(output.contains('\n'));
    }
}
