//! Predicate functions applied by rule `then` clauses
//!
//! Each function inspects the targeted node (or its absence, when a `field`
//! is missing) and returns an error message on failure.

use crate::node::{Node, NodeKind, ScalarValue};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error building or evaluating a function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    #[error("Unknown function: {0}")]
    Unknown(String),

    #[error("Invalid options for '{function}': {message}")]
    InvalidOptions { function: String, message: String },

    #[error("Invalid regex '{pattern}': {message}")]
    Regex { pattern: String, message: String },
}

/// Options for `pattern`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternOptions {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    #[serde(rename = "notMatch", default, skip_serializing_if = "Option::is_none")]
    pub not_match: Option<String>,
}

/// Options for `enumeration`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumerationOptions {
    pub values: Vec<Value>,
}

/// Options for `length`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LengthOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

/// A predicate function
#[derive(Debug, Clone, PartialEq)]
pub enum RuleFunction {
    /// Value must be present and truthy
    Truthy,
    /// Value must be absent or falsy
    Falsy,
    /// Value must be present
    Defined,
    /// Value must be absent
    Undefined,
    /// String value must (not) match a regex
    Pattern(PatternOptions),
    /// Scalar value must be one of a fixed set
    Enumeration(EnumerationOptions),
    /// String, collection or number size must lie within bounds
    Length(LengthOptions),
}

impl RuleFunction {
    /// Function name as written in rulesets
    pub fn name(&self) -> &'static str {
        match self {
            RuleFunction::Truthy => "truthy",
            RuleFunction::Falsy => "falsy",
            RuleFunction::Defined => "defined",
            RuleFunction::Undefined => "undefined",
            RuleFunction::Pattern(_) => "pattern",
            RuleFunction::Enumeration(_) => "enumeration",
            RuleFunction::Length(_) => "length",
        }
    }

    /// Build from a ruleset `function` name and `functionOptions`
    pub fn from_parts(name: &str, options: Option<Value>) -> Result<Self, FunctionError> {
        fn parse<T: for<'de> Deserialize<'de>>(
            name: &str,
            options: Option<Value>,
        ) -> Result<T, FunctionError> {
            let options = options.ok_or_else(|| FunctionError::InvalidOptions {
                function: name.to_string(),
                message: "functionOptions are required".to_string(),
            })?;
            serde_json::from_value(options).map_err(|e| FunctionError::InvalidOptions {
                function: name.to_string(),
                message: e.to_string(),
            })
        }

        let function = match name {
            "truthy" => RuleFunction::Truthy,
            "falsy" => RuleFunction::Falsy,
            "defined" => RuleFunction::Defined,
            "undefined" => RuleFunction::Undefined,
            "pattern" => RuleFunction::Pattern(parse(name, options)?),
            "enumeration" => RuleFunction::Enumeration(parse(name, options)?),
            "length" => RuleFunction::Length(parse(name, options)?),
            other => return Err(FunctionError::Unknown(other.to_string())),
        };

        function.check_options()?;
        Ok(function)
    }

    /// Options as a JSON value, `None` for option-less functions
    pub fn options(&self) -> Option<Value> {
        match self {
            RuleFunction::Pattern(opts) => serde_json::to_value(opts).ok(),
            RuleFunction::Enumeration(opts) => serde_json::to_value(opts).ok(),
            RuleFunction::Length(opts) => serde_json::to_value(opts).ok(),
            _ => None,
        }
    }

    fn check_options(&self) -> Result<(), FunctionError> {
        let invalid = |message: &str| FunctionError::InvalidOptions {
            function: self.name().to_string(),
            message: message.to_string(),
        };

        match self {
            RuleFunction::Pattern(opts) if opts.matches.is_none() && opts.not_match.is_none() => {
                Err(invalid("one of 'match' or 'notMatch' is required"))
            }
            RuleFunction::Length(opts) if opts.min.is_none() && opts.max.is_none() => {
                Err(invalid("one of 'min' or 'max' is required"))
            }
            _ => Ok(()),
        }
    }

    /// Compile regexes and validate options
    pub fn compile(&self) -> Result<CompiledFunction<'_>, FunctionError> {
        self.check_options()?;

        let (matches, not_match) = match self {
            RuleFunction::Pattern(opts) => (
                opts.matches.as_deref().map(compile_pattern).transpose()?,
                opts.not_match.as_deref().map(compile_pattern).transpose()?,
            ),
            _ => (None, None),
        };

        Ok(CompiledFunction {
            function: self,
            matches,
            not_match,
        })
    }
}

/// A function ready for repeated evaluation
#[derive(Debug)]
pub struct CompiledFunction<'f> {
    function: &'f RuleFunction,
    matches: Option<Regex>,
    not_match: Option<Regex>,
}

impl CompiledFunction<'_> {
    /// Evaluate against `target` (`None` when the field is missing).
    ///
    /// Returns the failure message, or `None` when the check passes.
    pub fn evaluate(&self, target: Option<&Node>, property: Option<&str>) -> Option<String> {
        let subject = match property {
            Some(name) => format!("\"{}\" property", name),
            None => "Value".to_string(),
        };

        match self.function {
            RuleFunction::Truthy => match target {
                Some(node) if node.is_truthy() => None,
                _ => Some(format!("{} must be truthy", subject)),
            },
            RuleFunction::Falsy => match target {
                Some(node) if node.is_truthy() => Some(format!("{} must be falsy", subject)),
                _ => None,
            },
            RuleFunction::Defined => match target {
                Some(_) => None,
                None => Some(format!("{} must be defined", subject)),
            },
            RuleFunction::Undefined => match target {
                Some(_) => Some(format!("{} must be undefined", subject)),
                None => None,
            },
            RuleFunction::Pattern(opts) => {
                let text = target.and_then(Node::as_str)?;
                if let (Some(re), Some(source)) = (&self.matches, &opts.matches) {
                    if !re.is_match(text) {
                        return Some(format!(
                            "\"{}\" must match the pattern \"{}\"",
                            text, source
                        ));
                    }
                }
                if let (Some(re), Some(source)) = (&self.not_match, &opts.not_match) {
                    if re.is_match(text) {
                        return Some(format!(
                            "\"{}\" must not match the pattern \"{}\"",
                            text, source
                        ));
                    }
                }
                None
            }
            RuleFunction::Enumeration(opts) => {
                let node = target?;
                let text = node.as_str()?;
                let allowed = opts.values.iter().any(|v| value_matches(v, node, text));
                if allowed {
                    return None;
                }
                let listed = opts
                    .values
                    .iter()
                    .map(value_text)
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!(
                    "\"{}\" must be equal to one of the allowed values: {}",
                    text, listed
                ))
            }
            RuleFunction::Length(opts) => {
                let size = measure(target?)?;
                if let Some(min) = opts.min {
                    if size < min as f64 {
                        return Some(format!("{} must not be shorter than {}", subject, min));
                    }
                }
                if let Some(max) = opts.max {
                    if size > max as f64 {
                        return Some(format!("{} must not be longer than {}", subject, max));
                    }
                }
                None
            }
        }
    }
}

/// Compile a regex written either bare or as `/body/flags`
fn compile_pattern(source: &str) -> Result<Regex, FunctionError> {
    let error = |message: String| FunctionError::Regex {
        pattern: source.to_string(),
        message,
    };

    let delimited = source
        .strip_prefix('/')
        .and_then(|rest| rest.rsplit_once('/'))
        .filter(|(body, flags)| !body.is_empty() && flags.chars().all(|c| c.is_ascii_alphabetic()));

    let (body, flags) = match delimited {
        Some((body, flags)) => (body, flags),
        None => (source, ""),
    };

    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            // global and unicode have no effect on a single is_match
            'g' | 'u' => &mut builder,
            other => return Err(error(format!("unsupported flag '{}'", other))),
        };
    }

    builder.build().map_err(|e| error(e.to_string()))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_matches(allowed: &Value, node: &Node, text: &str) -> bool {
    match (allowed, node.value()) {
        (Value::String(s), _) => s == text,
        (Value::Bool(b), Some(ScalarValue::Bool(v))) => *b == v,
        (Value::Number(n), Some(ScalarValue::Int(v))) => n.as_i64() == Some(v),
        (Value::Number(n), Some(ScalarValue::Float(v))) => n.as_f64() == Some(v),
        (Value::Null, Some(ScalarValue::Null)) => true,
        _ => false,
    }
}

fn measure(node: &Node) -> Option<f64> {
    match &node.kind {
        NodeKind::Mapping(entries) => Some(entries.len() as f64),
        NodeKind::Sequence(items) => Some(items.len() as f64),
        NodeKind::Scalar { .. } => match node.value()? {
            ScalarValue::Int(i) => Some(i as f64),
            ScalarValue::Float(f) => Some(f),
            ScalarValue::Str(s) => Some(s.chars().count() as f64),
            ScalarValue::Bool(_) | ScalarValue::Null => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Range;
    use crate::node::ScalarStyle;
    use serde_json::json;

    fn plain(value: &str) -> Node {
        Node::scalar(value, ScalarStyle::Plain, Range::default())
    }

    fn eval(function: &RuleFunction, target: Option<&Node>) -> Option<String> {
        function.compile().unwrap().evaluate(target, Some("field"))
    }

    #[test]
    fn test_truthy_and_falsy() {
        let date = plain("date-time");
        let empty = Node::scalar("", ScalarStyle::Empty, Range::default());

        assert_eq!(eval(&RuleFunction::Truthy, Some(&date)), None);
        assert_eq!(
            eval(&RuleFunction::Truthy, None),
            Some("\"field\" property must be truthy".to_string())
        );
        assert!(eval(&RuleFunction::Truthy, Some(&empty)).is_some());

        assert_eq!(eval(&RuleFunction::Falsy, None), None);
        assert_eq!(eval(&RuleFunction::Falsy, Some(&empty)), None);
        assert_eq!(
            eval(&RuleFunction::Falsy, Some(&date)),
            Some("\"field\" property must be falsy".to_string())
        );
    }

    #[test]
    fn test_defined_and_undefined() {
        let empty = Node::scalar("", ScalarStyle::Empty, Range::default());
        assert_eq!(eval(&RuleFunction::Defined, Some(&empty)), None);
        assert!(eval(&RuleFunction::Defined, None).is_some());
        assert!(eval(&RuleFunction::Undefined, Some(&empty)).is_some());
        assert_eq!(eval(&RuleFunction::Undefined, None), None);
    }

    #[test]
    fn test_pattern() {
        let function = RuleFunction::from_parts(
            "pattern",
            Some(json!({ "match": "/^[a-z]+$/i", "notMatch": "^X" })),
        )
        .unwrap();

        assert_eq!(eval(&function, Some(&plain("Hello"))), None);
        assert!(eval(&function, Some(&plain("hello-world"))).is_some());
        assert!(eval(&function, Some(&plain("Xylophone"))).is_some());
        // missing values are not checked
        assert_eq!(eval(&function, None), None);
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        let function = RuleFunction::Pattern(PatternOptions {
            matches: Some("([unclosed".to_string()),
            not_match: None,
        });
        let err = function.compile().unwrap_err();
        assert!(matches!(err, FunctionError::Regex { .. }));

        let function = RuleFunction::Pattern(PatternOptions {
            matches: Some("/abc/q".to_string()),
            not_match: None,
        });
        assert!(function.compile().is_err());
    }

    #[test]
    fn test_enumeration() {
        let function = RuleFunction::from_parts(
            "enumeration",
            Some(json!({ "values": ["string", 200, true] })),
        )
        .unwrap();

        assert_eq!(eval(&function, Some(&plain("string"))), None);
        assert_eq!(eval(&function, Some(&plain("200"))), None);
        assert_eq!(eval(&function, Some(&plain("true"))), None);
        assert_eq!(
            eval(&function, Some(&plain("integer"))),
            Some("\"integer\" must be equal to one of the allowed values: string, 200, true".to_string())
        );
    }

    #[test]
    fn test_length() {
        let function =
            RuleFunction::from_parts("length", Some(json!({ "min": 2, "max": 4 }))).unwrap();

        assert_eq!(eval(&function, Some(&plain("abc"))), None);
        assert!(eval(&function, Some(&plain("a"))).is_some());
        assert!(eval(&function, Some(&plain("abcdef"))).is_some());
        assert!(eval(&function, Some(&plain("10"))).is_some());

        let seq = Node::sequence(vec![plain("a"), plain("b")], Range::default());
        assert_eq!(eval(&function, Some(&seq)), None);
    }

    #[test]
    fn test_from_parts_errors() {
        assert_eq!(
            RuleFunction::from_parts("casing", None),
            Err(FunctionError::Unknown("casing".to_string()))
        );
        assert!(RuleFunction::from_parts("pattern", None).is_err());
        assert!(RuleFunction::from_parts("pattern", Some(json!({}))).is_err());
        assert!(RuleFunction::from_parts("length", Some(json!({ "least": 1 }))).is_err());
    }

    #[test]
    fn test_options_round_trip() {
        let function =
            RuleFunction::from_parts("pattern", Some(json!({ "notMatch": "^x" }))).unwrap();
        assert_eq!(function.options(), Some(json!({ "notMatch": "^x" })));
        assert_eq!(RuleFunction::Truthy.options(), None);
    }
}
