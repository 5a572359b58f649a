//! Rule definition

use crate::diagnostic::{PathSegment, Severity};
use crate::functions::{FunctionError, RuleFunction};
use crate::node::Node;
use crate::selector::{Selector, SelectorError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// A rule that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRule {
    #[error("rule '{rule}': {source}")]
    Selector {
        rule: String,
        #[source]
        source: SelectorError,
    },

    #[error("rule '{rule}': {source}")]
    Function {
        rule: String,
        #[source]
        source: FunctionError,
    },

    #[error("rule '{rule}': {message}")]
    Definition { rule: String, message: String },
}

/// One `then` clause: an optional field and the function applied to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThen", into = "RawThen")]
pub struct Then {
    /// Dotted field below the matched node (`None` targets the node itself)
    pub field: Option<String>,
    pub function: RuleFunction,
}

/// What a `then` clause resolved to on one matched node
#[derive(Debug, Clone)]
pub struct ThenTarget<'a> {
    /// The field's node, `None` when the field is missing
    pub node: Option<&'a Node>,
    /// Where a failure is reported
    pub path: Vec<PathSegment>,
}

impl Then {
    pub fn new(field: Option<&str>, function: RuleFunction) -> Self {
        Self {
            field: field.map(String::from),
            function,
        }
    }

    /// Property name used in messages (last field segment)
    pub fn property(&self) -> Option<&str> {
        self.field
            .as_deref()
            .map(|f| f.rsplit('.').next().unwrap_or(f))
    }

    /// Resolve the field below `node`, found at `path`.
    ///
    /// A missing field reports at the matched node's own path.
    pub fn target<'a>(&self, node: &'a Node, path: &[PathSegment]) -> ThenTarget<'a> {
        let Some(field) = &self.field else {
            return ThenTarget {
                node: Some(node),
                path: path.to_vec(),
            };
        };

        let mut current = node;
        let mut target_path = path.to_vec();
        for name in field.split('.') {
            let step = match name.parse::<usize>() {
                Ok(index) if current.is_sequence() => PathSegment::Index(index),
                _ => PathSegment::Key(name.to_string()),
            };
            match current.child(&step) {
                Some(child) => {
                    current = child;
                    target_path.push(step);
                }
                None => {
                    return ThenTarget {
                        node: None,
                        path: path.to_vec(),
                    }
                }
            }
        }

        ThenTarget {
            node: Some(current),
            path: target_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawThen {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    function: String,
    #[serde(
        rename = "functionOptions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    function_options: Option<Value>,
}

impl TryFrom<RawThen> for Then {
    type Error = FunctionError;

    fn try_from(raw: RawThen) -> Result<Self, Self::Error> {
        Ok(Then {
            field: raw.field,
            function: RuleFunction::from_parts(&raw.function, raw.function_options)?,
        })
    }
}

impl From<Then> for RawThen {
    fn from(then: Then) -> Self {
        RawThen {
            field: then.field,
            function: then.function.name().to_string(),
            function_options: then.function.options(),
        }
    }
}

/// A lint rule definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// Unique rule code (e.g., "date-response-header-format-pattern-requirement")
    pub code: String,

    /// Human-readable description
    pub description: String,

    /// Message template; the description is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Default severity level
    pub severity: Severity,

    /// Selectors picking the nodes this rule applies to
    pub given: Vec<String>,

    /// Checks run on every matched node, in order
    pub then: Vec<Then>,

    /// Part of the recommended preset
    pub recommended: bool,

    /// Whether this rule is enabled by default (`severity: off` disables it)
    pub enabled: bool,

    /// Documentation URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,

    /// Tags for categorization
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Rule {
    /// Create a new rule with minimal required fields
    pub fn new(code: &str, description: &str, given: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            message: None,
            severity: Severity::Warning,
            given: vec![given.to_string()],
            then: Vec::new(),
            recommended: true,
            enabled: true,
            docs: None,
            tags: Vec::new(),
        }
    }

    /// Add a `then` clause
    pub fn with_then(mut self, field: Option<&str>, function: RuleFunction) -> Self {
        self.then.push(Then::new(field, function));
        self
    }

    /// Add another selector
    pub fn with_given(mut self, given: &str) -> Self {
        self.given.push(given.to_string());
        self
    }

    /// Set the message template
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set whether the rule is in the recommended preset
    pub fn with_recommended(mut self, recommended: bool) -> Self {
        self.recommended = recommended;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Set documentation URL
    pub fn with_docs(mut self, url: &str) -> Self {
        self.docs = Some(url.to_string());
        self
    }

    /// Check if rule matches the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Check if rule matches any of the given tags
    pub fn has_any_tag(&self, tags: &HashSet<String>) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }

    /// Message template, falling back to the description
    pub fn message_template(&self) -> &str {
        self.message.as_deref().unwrap_or(&self.description)
    }

    /// Parse all selectors
    pub fn selectors(&self) -> Result<Vec<Selector>, InvalidRule> {
        self.given
            .iter()
            .map(|g| {
                g.parse().map_err(|source| InvalidRule::Selector {
                    rule: self.code.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Check selectors, functions and fields
    pub fn validate(&self) -> Result<(), InvalidRule> {
        let definition = |message: &str| InvalidRule::Definition {
            rule: self.code.clone(),
            message: message.to_string(),
        };

        if self.given.is_empty() {
            return Err(definition("'given' must not be empty"));
        }
        if self.then.is_empty() {
            return Err(definition("'then' must not be empty"));
        }
        self.selectors()?;

        for then in &self.then {
            if let Some(field) = &then.field {
                if field.is_empty() || field.split('.').any(str::is_empty) {
                    return Err(definition(&format!("invalid field '{}'", field)));
                }
            }
            then.function
                .compile()
                .map_err(|source| InvalidRule::Function {
                    rule: self.code.clone(),
                    source,
                })?;
        }

        Ok(())
    }
}

/// Accepts a single value or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Severity as written in a ruleset: a level, or `off`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeveritySetting {
    Off,
    Level(Severity),
}

impl<'de> Deserialize<'de> for SeveritySetting {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Rank(i64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(false) => Ok(SeveritySetting::Off),
            Repr::Flag(true) => Ok(SeveritySetting::Level(Severity::default())),
            Repr::Rank(-1) => Ok(SeveritySetting::Off),
            Repr::Rank(rank) => Severity::from_rank(rank)
                .map(SeveritySetting::Level)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid severity: {}", rank))),
            Repr::Name(name) if name.eq_ignore_ascii_case("off") => Ok(SeveritySetting::Off),
            Repr::Name(name) => name
                .parse()
                .map(SeveritySetting::Level)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Rule body as written in a ruleset file, keyed by code
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Option<SeveritySetting>,
    given: OneOrMany<String>,
    then: OneOrMany<Then>,
    #[serde(default)]
    pub recommended: Option<bool>,
    #[serde(default, rename = "documentationUrl")]
    pub docs: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub formats: Vec<String>,
}

impl RuleDefinition {
    /// Build the rule this definition describes
    pub fn into_rule(self, code: &str) -> Rule {
        let (enabled, severity) = match self.severity {
            Some(SeveritySetting::Off) => (false, Severity::default()),
            Some(SeveritySetting::Level(level)) => (true, level),
            None => (true, Severity::default()),
        };

        Rule {
            code: code.to_string(),
            description: self.description.unwrap_or_default(),
            message: self.message,
            severity,
            given: self.given.into_vec(),
            then: self.then.into_vec(),
            recommended: self.recommended.unwrap_or(true),
            enabled,
            docs: self.docs,
            tags: self.tags,
        }
    }
}
