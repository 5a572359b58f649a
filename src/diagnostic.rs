//! Diagnostic types for linting results

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Severity level for diagnostics.
///
/// Lower values are more severe. The numeric value is what gets serialized,
/// so `Warning` appears as `1` in JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Error - definite problem
    Error = 0,
    /// Warning - potential issue
    #[default]
    Warning = 1,
    /// Informational message
    Information = 2,
    /// Hint - lowest priority
    Hint = 3,
}

impl Severity {
    /// Numeric rank (0 = error, 3 = hint)
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Build from a numeric rank
    pub fn from_rank(rank: i64) -> Option<Self> {
        match rank {
            0 => Some(Severity::Error),
            1 => Some(Severity::Warning),
            2 => Some(Severity::Information),
            3 => Some(Severity::Hint),
            _ => None,
        }
    }

    /// Check if this severity is at least as severe as `threshold`
    pub fn is_at_least(self, threshold: Severity) -> bool {
        self <= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "information" | "info" => Ok(Severity::Information),
            "hint" | "note" => Ok(Severity::Hint),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.rank())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Rank(i64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Rank(rank) => Severity::from_rank(rank)
                .ok_or_else(|| de::Error::custom(format!("invalid severity rank: {}", rank))),
            Repr::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

/// Zero-based line/character position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Source range, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range spanning a single point
    pub fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// Check whether `other` lies entirely inside this range
    pub fn contains(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Length of the highlighted region on the start line
    pub fn width(&self) -> usize {
        if self.start.line == self.end.line {
            self.end.character.saturating_sub(self.start.character)
        } else {
            1
        }
    }
}

/// One step of a document path: a mapping key or a sequence index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Render a path as `a.b.0.c`
pub fn display_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// A lint diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule code that triggered this diagnostic
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Location of the offending node from the document root
    pub path: Vec<PathSegment>,
    /// Source range of the offending node
    pub range: Range,
    /// Severity level
    pub severity: Severity,
    /// File the diagnostic was produced for (file runs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// The source line (for display)
    #[serde(skip)]
    pub source_line: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        code: &str,
        message: &str,
        path: Vec<PathSegment>,
        range: Range,
        severity: Severity,
    ) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            path,
            range,
            severity,
            source: None,
            source_line: None,
        }
    }

    /// Attach the file this diagnostic belongs to
    pub fn with_source(mut self, source: PathBuf) -> Self {
        self.source = Some(source);
        self
    }

    /// Add source line for display
    pub fn with_source_line(mut self, line: &str) -> Self {
        self.source_line = Some(line.to_string());
        self
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Dotted rendering of the path
    pub fn path_string(&self) -> String {
        display_path(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Information);
        assert!(Severity::Error.is_at_least(Severity::Warning));
        assert!(!Severity::Hint.is_at_least(Severity::Warning));
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("info".parse::<Severity>(), Ok(Severity::Information));
        assert_eq!("hint".parse::<Severity>(), Ok(Severity::Hint));
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_serializes_as_rank() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "1");
        let parsed: Severity = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, Severity::Error);
        let parsed: Severity = serde_yaml::from_str("warn").unwrap();
        assert_eq!(parsed, Severity::Warning);
        assert!(serde_json::from_str::<Severity>("7").is_err());
    }

    #[test]
    fn test_diagnostic_json_shape() {
        let diag = Diagnostic::new(
            "test-rule",
            "Test message",
            vec!["paths".into(), "/test".into(), 0.into()],
            Range::new(Position::new(1, 2), Position::new(3, 4)),
            Severity::Warning,
        );

        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "test-rule",
                "message": "Test message",
                "path": ["paths", "/test", 0],
                "range": {
                    "start": { "line": 1, "character": 2 },
                    "end": { "line": 3, "character": 4 }
                },
                "severity": 1
            })
        );
    }

    #[test]
    fn test_range_contains() {
        let outer = Range::new(Position::new(1, 0), Position::new(5, 10));
        let inner = Range::new(Position::new(2, 4), Position::new(5, 2));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert_eq!(Range::new(Position::new(2, 4), Position::new(2, 9)).width(), 5);
    }

    #[test]
    fn test_display_path() {
        let path: Vec<PathSegment> = vec!["servers".into(), 1.into(), "url".into()];
        assert_eq!(display_path(&path), "servers.1.url");
    }
}
