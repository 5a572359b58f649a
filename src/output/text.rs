//! Human-readable text output formatter

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::LintResult;
use colored::*;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show source context
    pub show_source: bool,

    /// Show the document path of each diagnostic
    pub show_path: bool,

    /// Show statistics
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_path: true,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.colored {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn severity_str(&self, severity: Severity) -> String {
        let s = severity.to_string();
        match severity {
            Severity::Error => self.paint(&s, |s| s.red().bold()),
            Severity::Warning => self.paint(&s, |s| s.yellow().bold()),
            Severity::Information => self.paint(&s, |s| s.blue()),
            Severity::Hint => self.paint(&s, |s| s.dimmed()),
        }
    }

    fn counts(&self, result: &LintResult) -> Vec<String> {
        let entries: [(usize, &str, &str, fn(&str) -> ColoredString); 4] = [
            (result.error_count, "error", "errors", |s| s.red()),
            (result.warning_count, "warning", "warnings", |s| s.yellow()),
            (result.info_count, "info", "infos", |s| s.blue()),
            (result.hint_count, "hint", "hints", |s| s.dimmed()),
        ];

        entries
            .iter()
            .filter(|(count, ..)| *count > 0)
            .map(|(count, one, many, style)| {
                let s = format!("{} {}", count, if *count == 1 { one } else { many });
                self.paint(&s, *style)
            })
            .collect()
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();
        let mut current_file: Option<String> = None;

        // Diagnostics keep their engine order; a header starts each file's run
        for diag in &result.diagnostics {
            let (file, _, _) = super::location(diag);
            if current_file.as_deref() != Some(file.as_str()) {
                if current_file.is_some() {
                    output.push('\n');
                }
                output.push_str(&format!("{}\n", self.paint(&file, |s| s.underline())));
                current_file = Some(file);
            }
            output.push_str(&self.format_diagnostic(diag));
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&format!(
                "\n{} {} processed",
                result.files_processed,
                if result.files_processed == 1 {
                    "file"
                } else {
                    "files"
                }
            ));

            let counts = self.counts(result);
            if !counts.is_empty() {
                output.push_str(&format!(": {}", counts.join(", ")));
            }
            output.push('\n');

            output.push_str(&format!(
                "Finished in {:.2}s\n",
                result.duration.as_secs_f64()
            ));
        }

        output
    }

    fn format_diagnostic(&self, diag: &Diagnostic) -> String {
        let mut output = String::new();
        let (file, line, col) = super::location(diag);
        let bar = self.paint("|", |s| s.blue());

        output.push_str(&format!(
            "{}:{}:{}: {}[{}]: {}\n",
            file,
            line,
            col,
            self.severity_str(diag.severity),
            self.paint(&diag.code, |s| s.cyan()),
            diag.message
        ));

        if self.show_source {
            if let Some(source) = &diag.source_line {
                let line_num = format!("{:>4}", line);
                output.push_str(&format!("   {}\n", bar));
                output.push_str(&format!(
                    "{} {} {}\n",
                    self.paint(&line_num, |s| s.blue()),
                    bar,
                    source
                ));

                let padding = " ".repeat(col - 1);
                let underline = "^".repeat(diag.range.width().max(1));
                output.push_str(&format!(
                    "   {} {}{}\n",
                    bar,
                    padding,
                    self.paint(&underline, |s| s.red())
                ));
            }
        }

        if self.show_path && !diag.path.is_empty() {
            output.push_str(&format!(
                "   {} path: {}\n",
                self.paint("=", |s| s.blue()),
                diag.path_string()
            ));
        }

        output
    }
}
