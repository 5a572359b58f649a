//! apinter - API Linter
//!
//! A rule-driven linter for OpenAPI documents written in YAML or JSON.
//! Rules pick nodes with path selectors and check them with small predicate
//! functions; every finding carries the exact path and source range of the
//! offending node.
//!
//! # Architecture
//!
//! ```text
//! text -> Document (Node tree with ranges) -> Linter (Ruleset) -> Vec<Diagnostic>
//! ```
//!
//! # Rulesets
//!
//! The built-in api-insights ruleset can be extended with Spectral-style
//! YAML/JSON files:
//!
//! ```yaml
//! extends: api-insights-openapi-ruleset
//! rules:
//!   info-contact:
//!     description: Info object must have a contact
//!     severity: warn
//!     given: $.info
//!     then:
//!       field: contact
//!       function: truthy
//! ```

pub mod config;
pub mod diagnostic;
pub mod document;
pub mod engine;
pub mod functions;
pub mod node;
pub mod output;
pub mod rule;
pub mod ruleset;
pub mod selector;
pub mod testing;

// Re-export main types
pub use config::Config;
pub use diagnostic::{Diagnostic, PathSegment, Position, Range, Severity};
pub use document::{Document, ParseError};
pub use engine::{LintError, LintResult, Linter};
pub use functions::RuleFunction;
pub use node::{Node, NodeKind};
pub use output::{CompactFormatter, GithubFormatter, JsonFormatter, OutputFormatter, TextFormatter};
pub use rule::{Rule, Then};
pub use ruleset::{Ruleset, RulesetError, BUILTIN_RULESET};
pub use selector::Selector;

// Built-in rulesets
pub mod rulesets {
    pub mod api_insights;
}
