//! Document tree nodes

use crate::diagnostic::{PathSegment, Range};

/// How a scalar was written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Block,
    /// Key present with no value (`key:`)
    Empty,
}

/// Typed view of a scalar, following the YAML core schema for plain scalars
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
}

/// A mapping entry
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub key_range: Range,
    pub value: Node,
}

/// Node payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Scalar { value: String, style: ScalarStyle },
    Mapping(Vec<Entry>),
    Sequence(Vec<Node>),
}

/// A node in the parsed document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: Range,
}

impl Node {
    pub fn scalar(value: &str, style: ScalarStyle, range: Range) -> Self {
        Self {
            kind: NodeKind::Scalar {
                value: value.to_string(),
                style,
            },
            range,
        }
    }

    pub fn mapping(entries: Vec<Entry>, range: Range) -> Self {
        Self {
            kind: NodeKind::Mapping(entries),
            range,
        }
    }

    pub fn sequence(items: Vec<Node>, range: Range) -> Self {
        Self {
            kind: NodeKind::Sequence(items),
            range,
        }
    }

    /// Node kind name ("scalar", "mapping", "sequence")
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Scalar { .. } => "scalar",
            NodeKind::Mapping(_) => "mapping",
            NodeKind::Sequence(_) => "sequence",
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::Sequence(_))
    }

    /// Mapping entries (empty for other kinds)
    pub fn entries(&self) -> &[Entry] {
        match &self.kind {
            NodeKind::Mapping(entries) => entries,
            _ => &[],
        }
    }

    /// Sequence items (empty for other kinds)
    pub fn items(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Sequence(items) => items,
            _ => &[],
        }
    }

    /// Look up a mapping value by key
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries()
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    /// Look up a sequence item by index
    pub fn index(&self, index: usize) -> Option<&Node> {
        self.items().get(index)
    }

    /// Direct children with the path segment leading to each, in source order
    pub fn children(&self) -> Vec<(PathSegment, &Node)> {
        match &self.kind {
            NodeKind::Scalar { .. } => Vec::new(),
            NodeKind::Mapping(entries) => entries
                .iter()
                .map(|e| (PathSegment::Key(e.key.clone()), &e.value))
                .collect(),
            NodeKind::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, n)| (PathSegment::Index(i), n))
                .collect(),
        }
    }

    /// Follow a single path segment
    pub fn child(&self, segment: &PathSegment) -> Option<&Node> {
        match segment {
            PathSegment::Key(key) => self.get(key),
            PathSegment::Index(index) => match &self.kind {
                NodeKind::Sequence(items) => items.get(*index),
                // numeric keys such as response codes are mapping keys
                NodeKind::Mapping(_) => self.get(&index.to_string()),
                NodeKind::Scalar { .. } => None,
            },
        }
    }

    /// Follow a path from this node
    pub fn resolve(&self, path: &[PathSegment]) -> Option<&Node> {
        path.iter().try_fold(self, |node, segment| node.child(segment))
    }

    /// Raw scalar text
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Typed scalar value, `None` for collections
    pub fn value(&self) -> Option<ScalarValue<'_>> {
        match &self.kind {
            NodeKind::Scalar { value, style } => Some(interpret(value, *style)),
            _ => None,
        }
    }

    /// Check if the value is present and non-empty-ish (not null, false, 0 or "")
    pub fn is_truthy(&self) -> bool {
        match self.value() {
            None => true,
            Some(ScalarValue::Null) => false,
            Some(ScalarValue::Bool(b)) => b,
            Some(ScalarValue::Int(i)) => i != 0,
            Some(ScalarValue::Float(f)) => f != 0.0 && !f.is_nan(),
            Some(ScalarValue::Str(s)) => !s.is_empty(),
        }
    }

    /// Short human-readable rendering, used in messages
    pub fn display_value(&self) -> String {
        match &self.kind {
            NodeKind::Scalar { value, .. } => value.clone(),
            NodeKind::Mapping(_) => "Object{}".to_string(),
            NodeKind::Sequence(items) => format!("Array[{}]", items.len()),
        }
    }

    /// Depth-first pre-order walk, calling `visit` with each node and its path
    pub fn walk<'a, F>(&'a self, path: &mut Vec<PathSegment>, visit: &mut F)
    where
        F: FnMut(&[PathSegment], &'a Node),
    {
        visit(path, self);
        for (segment, child) in self.children() {
            path.push(segment);
            child.walk(path, visit);
            path.pop();
        }
    }
}

fn interpret(value: &str, style: ScalarStyle) -> ScalarValue<'_> {
    match style {
        ScalarStyle::Empty => return ScalarValue::Null,
        ScalarStyle::Plain => {}
        _ => return ScalarValue::Str(value),
    }

    match value {
        "" | "~" | "null" | "Null" | "NULL" => return ScalarValue::Null,
        "true" | "True" | "TRUE" => return ScalarValue::Bool(true),
        "false" | "False" | "FALSE" => return ScalarValue::Bool(false),
        ".nan" | ".NaN" | ".NAN" => return ScalarValue::Float(f64::NAN),
        _ => {}
    }

    if let Ok(i) = value.parse::<i64>() {
        return ScalarValue::Int(i);
    }
    if let Some(hex) = value.strip_prefix("0x") {
        if let Ok(i) = i64::from_str_radix(hex, 16) {
            return ScalarValue::Int(i);
        }
    }
    if looks_numeric(value) {
        if let Ok(f) = value.parse::<f64>() {
            return ScalarValue::Float(f);
        }
    }

    ScalarValue::Str(value)
}

// f64::from_str accepts "inf" and "NaN", which YAML treats as strings
fn looks_numeric(value: &str) -> bool {
    let body = value.trim_start_matches(['-', '+']);
    body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && body.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Position;

    fn plain(value: &str) -> Node {
        Node::scalar(value, ScalarStyle::Plain, Range::default())
    }

    fn entry(key: &str, value: Node) -> Entry {
        Entry {
            key: key.to_string(),
            key_range: Range::default(),
            value,
        }
    }

    fn sample() -> Node {
        Node::mapping(
            vec![
                entry(
                    "responses",
                    Node::mapping(vec![entry("200", plain("ok"))], Range::default()),
                ),
                entry(
                    "tags",
                    Node::sequence(vec![plain("a"), plain("b")], Range::default()),
                ),
            ],
            Range::new(Position::new(0, 0), Position::new(4, 0)),
        )
    }

    #[test]
    fn test_resolve_keys_and_indices() {
        let root = sample();
        let path: Vec<PathSegment> = vec!["tags".into(), 1.into()];
        assert_eq!(root.resolve(&path).and_then(|n| n.as_str()), Some("b"));

        let path: Vec<PathSegment> = vec!["responses".into(), 200.into()];
        assert_eq!(root.resolve(&path).and_then(|n| n.as_str()), Some("ok"));

        let path: Vec<PathSegment> = vec!["missing".into()];
        assert!(root.resolve(&path).is_none());
    }

    #[test]
    fn test_scalar_interpretation() {
        assert_eq!(plain("~").value(), Some(ScalarValue::Null));
        assert_eq!(plain("false").value(), Some(ScalarValue::Bool(false)));
        assert_eq!(plain("42").value(), Some(ScalarValue::Int(42)));
        assert_eq!(plain("1.5").value(), Some(ScalarValue::Float(1.5)));
        assert_eq!(plain("inf").value(), Some(ScalarValue::Str("inf")));
        assert_eq!(plain("date-time").value(), Some(ScalarValue::Str("date-time")));

        let quoted = Node::scalar("false", ScalarStyle::SingleQuoted, Range::default());
        assert_eq!(quoted.value(), Some(ScalarValue::Str("false")));
    }

    #[test]
    fn test_truthiness() {
        assert!(plain("date-time").is_truthy());
        assert!(!plain("0").is_truthy());
        assert!(!plain("null").is_truthy());
        assert!(!Node::scalar("", ScalarStyle::Empty, Range::default()).is_truthy());
        assert!(!Node::scalar("", ScalarStyle::DoubleQuoted, Range::default()).is_truthy());
        assert!(Node::mapping(vec![], Range::default()).is_truthy());
    }

    #[test]
    fn test_walk_is_preorder() {
        let root = sample();
        let mut seen = Vec::new();
        root.walk(&mut Vec::new(), &mut |path: &[PathSegment], _: &Node| {
            seen.push(crate::diagnostic::display_path(path));
        });
        assert_eq!(
            seen,
            vec!["", "responses", "responses.200", "tags", "tags.0", "tags.1"]
        );
    }
}
