//! Core linter engine

use crate::config::Config;
use crate::diagnostic::{display_path, Diagnostic, Position, Range, Severity};
use crate::document::{Document, ParseError};
use crate::functions::CompiledFunction;
use crate::rule::Rule;
use crate::ruleset::Ruleset;
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use thiserror::Error;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern is valid"));

/// Error running rules over a document
#[derive(Debug, Error)]
pub enum LintError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Rule '{rule}' failed to evaluate: {message}")]
    RuleEvaluation { rule: String, message: String },
}

/// Result of linting operation
#[derive(Debug, Default)]
pub struct LintResult {
    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,

    /// Files processed
    pub files_processed: usize,

    /// Files with errors
    pub files_with_errors: usize,

    /// Files with warnings
    pub files_with_warnings: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Total hints
    pub hint_count: usize,

    /// Processing duration
    pub duration: Duration,
}

impl LintResult {
    fn single_file(diagnostics: Vec<Diagnostic>) -> Self {
        let mut result = LintResult {
            files_processed: 1,
            ..LintResult::default()
        };

        for diag in &diagnostics {
            match diag.severity {
                Severity::Error => result.error_count += 1,
                Severity::Warning => result.warning_count += 1,
                Severity::Information => result.info_count += 1,
                Severity::Hint => result.hint_count += 1,
            }
        }

        if result.error_count > 0 {
            result.files_with_errors = 1;
        }
        if result.warning_count > 0 {
            result.files_with_warnings = 1;
        }

        result.diagnostics = diagnostics;
        result
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Check if result is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if self.error_count > 0 {
            2
        } else if self.warning_count > 0 {
            1
        } else {
            0
        }
    }

    /// Exit code counting only diagnostics at least as severe as `threshold`
    pub fn exit_code_for(&self, threshold: Severity) -> i32 {
        let failing = self
            .diagnostics
            .iter()
            .any(|d| d.severity.is_at_least(threshold));
        if failing {
            self.exit_code().max(1)
        } else {
            0
        }
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: LintResult) {
        self.diagnostics.extend(other.diagnostics);
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.files_with_warnings += other.files_with_warnings;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.info_count += other.info_count;
        self.hint_count += other.hint_count;
    }
}

/// Runs a ruleset over documents
#[derive(Debug, Clone)]
pub struct Linter {
    ruleset: Ruleset,
    config: Config,
}

impl Linter {
    /// Create a linter with the default configuration
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            ruleset,
            config: Config::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rules that run, in evaluation order; `file` applies per-file ignores
    pub fn active_rules(&self, file: Option<&Path>) -> Vec<&Rule> {
        self.ruleset
            .rules()
            .iter()
            .filter(|rule| rule.enabled && self.config.is_rule_enabled(&rule.code, rule.recommended))
            .filter(|rule| {
                file.is_none_or(|path| !self.config.should_ignore_rule_for_file(&rule.code, path))
            })
            .collect()
    }

    /// Lint document text
    pub fn run(&self, text: &str) -> Result<Vec<Diagnostic>, LintError> {
        let document = Document::parse_str(text)?;
        self.run_document(&document)
    }

    /// Lint a parsed document
    pub fn run_document(&self, document: &Document) -> Result<Vec<Diagnostic>, LintError> {
        self.evaluate_rules(&self.active_rules(None), document)
    }

    /// Lint multiple files
    pub fn lint(&self, files: &[PathBuf]) -> LintResult {
        let start = Instant::now();

        let results: Vec<LintResult> = match self.thread_pool() {
            Some(pool) => pool.install(|| files.par_iter().map(|f| self.lint_file(f)).collect()),
            None => files.iter().map(|f| self.lint_file(f)).collect(),
        };

        let mut combined = LintResult::default();
        for result in results {
            combined.merge(result);
        }

        combined.duration = start.elapsed();
        combined
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        if !self.config.engine.parallel {
            return None;
        }

        let threads = if self.config.engine.jobs > 0 {
            self.config.engine.jobs
        } else {
            num_cpus::get()
        };

        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!("Falling back to sequential linting: {}", e);
                None
            }
        }
    }

    /// Lint a single file
    ///
    /// Read, parse and rule failures are reported as error diagnostics.
    pub fn lint_file(&self, path: &Path) -> LintResult {
        let start = Instant::now();
        let file_error = |code: &str, message: String| {
            LintResult::single_file(vec![Diagnostic::new(
                code,
                &message,
                Vec::new(),
                Range::point(Position::default()),
                Severity::Error,
            )
            .with_source(path.to_path_buf())])
        };

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                return file_error("file-read-error", format!("Failed to read file: {}", e));
            }
        };

        let document = match Document::parse(&content, path) {
            Ok(d) => d,
            Err(e) => return file_error("parse-error", format!("Parse error: {}", e)),
        };

        let rules = self.active_rules(Some(path));
        let diagnostics = match self.evaluate_rules(&rules, &document) {
            Ok(diagnostics) => diagnostics,
            Err(e) => return file_error("rule-evaluation-error", e.to_string()),
        };

        let diagnostics = diagnostics
            .into_iter()
            .map(|diag| {
                let line = document
                    .source_line(diag.range.start.line)
                    .map(String::from);
                let diag = diag.with_source(path.to_path_buf());
                match line {
                    Some(line) => diag.with_source_line(&line),
                    None => diag,
                }
            })
            .collect();

        let mut result = LintResult::single_file(diagnostics);
        result.duration = start.elapsed();
        log::debug!(
            "Linted {} in {:?}: {} diagnostics",
            path.display(),
            result.duration,
            result.diagnostics.len()
        );
        result
    }

    /// Evaluate rules against a document.
    ///
    /// Diagnostics come out grouped by rule, then in document order of the
    /// matched nodes, then in `then` order.
    fn evaluate_rules(
        &self,
        rules: &[&Rule],
        document: &Document,
    ) -> Result<Vec<Diagnostic>, LintError> {
        let mut diagnostics = Vec::new();

        for rule in rules {
            let evaluation_error = |message: String| LintError::RuleEvaluation {
                rule: rule.code.clone(),
                message,
            };

            let selectors = rule
                .selectors()
                .map_err(|e| evaluation_error(e.to_string()))?;
            let functions: Vec<CompiledFunction<'_>> = rule
                .then
                .iter()
                .map(|then| then.function.compile())
                .collect::<Result<_, _>>()
                .map_err(|e| evaluation_error(e.to_string()))?;

            if document.is_rule_disabled_for_file(&rule.code) {
                log::debug!("Rule {} disabled for {}", rule.code, document.path().display());
                continue;
            }

            let severity = self
                .config
                .get_severity_override(&rule.code)
                .unwrap_or(rule.severity);

            for selector in &selectors {
                let matches = selector.select(document.root());
                log::trace!("Rule {}: {} matched {} nodes", rule.code, selector, matches.len());

                for matched in &matches {
                    for (then, function) in rule.then.iter().zip(&functions) {
                        let target = then.target(matched.node, &matched.path);
                        let Some(error) = function.evaluate(target.node, then.property()) else {
                            continue;
                        };

                        let range = target.node.unwrap_or(matched.node).range;
                        if document.is_rule_disabled(&rule.code, range.start.line) {
                            continue;
                        }

                        let message = format_message(
                            rule,
                            &error,
                            then.property(),
                            &display_path(&target.path),
                            target.node.map(|n| n.display_value()),
                        );
                        diagnostics.push(Diagnostic::new(
                            &rule.code,
                            &message,
                            target.path,
                            range,
                            severity,
                        ));
                    }
                }
            }
        }

        Ok(diagnostics)
    }
}

/// Fill `{{description}}`, `{{error}}`, `{{property}}`, `{{path}}` and
/// `{{value}}`; unknown placeholders are left as written.
fn format_message(
    rule: &Rule,
    error: &str,
    property: Option<&str>,
    path: &str,
    value: Option<String>,
) -> String {
    PLACEHOLDER_RE
        .replace_all(rule.message_template(), |caps: &regex::Captures| {
            match &caps[1] {
                "description" => rule.description.clone(),
                "error" => error.to_string(),
                "property" => property.unwrap_or_default().to_string(),
                "path" => path.to_string(),
                "value" => value.clone().unwrap_or_default(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}
