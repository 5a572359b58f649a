//! Path selectors for rule targets
//!
//! A selector picks nodes out of a document, e.g.
//! `$.paths.*.*.responses.*.headers.Date.schema`.
//!
//! # Supported Syntax
//!
//! - `$` - Root node
//! - `.key` / `['key']` / `["key"]` - Named child
//! - `*` / `[*]` - All children (wildcard)
//! - `[n]` - Sequence index
//! - `..key` / `..*` - Recursive descent

use crate::diagnostic::PathSegment;
use crate::node::Node;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a selector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid selector '{selector}' at offset {offset}: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub offset: usize,
    pub message: String,
}

/// A segment in a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Named child
    Child(String),
    /// Sequence index (also matches a mapping key with the same digits)
    Index(usize),
    /// All children
    Wildcard,
    /// Any descendant-or-self's child with this name, or any descendant (`None`)
    RecursiveDescent(Option<String>),
}

/// A parsed selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    segments: Vec<Segment>,
}

/// A node picked by a selector
#[derive(Debug, Clone)]
pub struct Match<'a> {
    pub path: Vec<PathSegment>,
    pub node: &'a Node,
}

impl Selector {
    /// Segments after the root
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// All nodes matched under `root`, in document order
    pub fn select<'a>(&self, root: &'a Node) -> Vec<Match<'a>> {
        let mut matches = Vec::new();
        let mut path = Vec::new();
        select_from(root, &self.segments, &mut path, &mut matches);
        matches
    }
}

fn select_from<'a>(
    node: &'a Node,
    segments: &[Segment],
    path: &mut Vec<PathSegment>,
    out: &mut Vec<Match<'a>>,
) {
    let Some((segment, rest)) = segments.split_first() else {
        out.push(Match {
            path: path.clone(),
            node,
        });
        return;
    };

    match segment {
        Segment::Child(key) => {
            if let Some(child) = node.get(key) {
                path.push(PathSegment::Key(key.clone()));
                select_from(child, rest, path, out);
                path.pop();
            }
        }
        Segment::Index(index) => {
            let step = if node.is_sequence() {
                PathSegment::Index(*index)
            } else {
                PathSegment::Key(index.to_string())
            };
            if let Some(child) = node.child(&step) {
                path.push(step);
                select_from(child, rest, path, out);
                path.pop();
            }
        }
        Segment::Wildcard => {
            for (step, child) in node.children() {
                path.push(step);
                select_from(child, rest, path, out);
                path.pop();
            }
        }
        Segment::RecursiveDescent(name) => {
            descend(node, name.as_deref(), rest, path, out);
        }
    }
}

fn descend<'a>(
    node: &'a Node,
    name: Option<&str>,
    rest: &[Segment],
    path: &mut Vec<PathSegment>,
    out: &mut Vec<Match<'a>>,
) {
    for (step, child) in node.children() {
        let named = match (&step, name) {
            (_, None) => true,
            (PathSegment::Key(key), Some(name)) => key == name,
            (PathSegment::Index(_), Some(_)) => false,
        };
        path.push(step);
        if named {
            select_from(child, rest, path, out);
        }
        descend(child, name, rest, path, out);
        path.pop();
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse()
    }
}

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.trim().chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: &str) -> SelectorError {
        SelectorError {
            selector: self.source.to_string(),
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        if self.chars.is_empty() {
            return Err(self.error("empty selector"));
        }

        let mut segments = Vec::new();
        let has_root = self.eat('$');
        if !has_root && self.peek() != Some('.') && self.peek() != Some('[') {
            // bare `paths.foo` is treated as rooted
            segments.push(self.name_segment()?);
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    if self.eat('.') {
                        let name = match self.peek() {
                            Some('*') => {
                                self.pos += 1;
                                None
                            }
                            Some('[') => {
                                let inner = self.bracket_segment()?;
                                match inner {
                                    Segment::Child(name) => Some(name),
                                    Segment::Wildcard => None,
                                    _ => return Err(self.error("index after '..'")),
                                }
                            }
                            _ => Some(self.name()?),
                        };
                        segments.push(Segment::RecursiveDescent(name));
                    } else {
                        segments.push(self.name_segment()?);
                    }
                }
                '[' => segments.push(self.bracket_segment()?),
                _ => return Err(self.error(&format!("unexpected '{}'", c))),
            }
        }

        Ok(Selector {
            source: self.source.trim().to_string(),
            segments,
        })
    }

    fn name_segment(&mut self) -> Result<Segment, SelectorError> {
        if self.eat('*') {
            return Ok(Segment::Wildcard);
        }
        Ok(Segment::Child(self.name()?))
    }

    fn name(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a property name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn bracket_segment(&mut self) -> Result<Segment, SelectorError> {
        if !self.eat('[') {
            return Err(self.error("expected '['"));
        }

        let segment = match self.peek() {
            Some('*') => {
                self.pos += 1;
                Segment::Wildcard
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let mut name = String::new();
                loop {
                    match self.peek() {
                        None => return Err(self.error("unterminated string")),
                        Some('\\') => {
                            self.pos += 1;
                            if let Some(escaped) = self.peek() {
                                name.push(escaped);
                                self.pos += 1;
                            }
                        }
                        Some(c) if c == quote => {
                            self.pos += 1;
                            break;
                        }
                        Some(c) => {
                            name.push(c);
                            self.pos += 1;
                        }
                    }
                }
                Segment::Child(name)
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                let index = digits
                    .parse()
                    .map_err(|_| self.error("index out of range"))?;
                Segment::Index(index)
            }
            _ => return Err(self.error("expected '*', a quoted name or an index")),
        };

        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }
        Ok(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::display_path;
    use crate::document::Document;

    const DOC: &str = "\
paths:
  /test:
    get:
      responses:
        '200':
          headers:
            Date:
              schema:
                type: string
    post:
      responses:
        '201':
          headers:
            Date:
              schema:
                type: string
  /other:
    parameters:
      - name: id
servers:
  - url: https://one
  - url: https://two
";

    fn selected(selector: &str) -> Vec<String> {
        let doc = Document::parse_str(DOC).unwrap();
        let selector: Selector = selector.parse().unwrap();
        selector
            .select(doc.root())
            .iter()
            .map(|m| display_path(&m.path))
            .collect()
    }

    #[test]
    fn test_parse_segments() {
        let selector: Selector = "$.paths.*['/test'][0]..Date".parse().unwrap();
        assert_eq!(
            selector.segments(),
            &[
                Segment::Child("paths".to_string()),
                Segment::Wildcard,
                Segment::Child("/test".to_string()),
                Segment::Index(0),
                Segment::RecursiveDescent(Some("Date".to_string())),
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Selector>().is_err());
        assert!("$.paths[".parse::<Selector>().is_err());
        assert!("$.paths['open".parse::<Selector>().is_err());
        assert!("$.paths.".parse::<Selector>().is_err());
        assert!("$paths".parse::<Selector>().is_err());
    }

    #[test]
    fn test_wildcards_in_document_order() {
        assert_eq!(
            selected("$.paths.*.*.responses.*.headers.Date.schema"),
            vec![
                "paths./test.get.responses.200.headers.Date.schema",
                "paths./test.post.responses.201.headers.Date.schema",
            ]
        );
    }

    #[test]
    fn test_index_and_bracket_names() {
        assert_eq!(selected("$.servers[1].url"), vec!["servers.1.url"]);
        assert_eq!(
            selected("$.paths['/test'].get.responses[200]"),
            vec!["paths./test.get.responses.200"]
        );
        assert!(selected("$.servers[5]").is_empty());
    }

    #[test]
    fn test_recursive_descent() {
        assert_eq!(
            selected("$..Date"),
            vec![
                "paths./test.get.responses.200.headers.Date",
                "paths./test.post.responses.201.headers.Date",
            ]
        );
        assert_eq!(selected("$..url"), vec!["servers.0.url", "servers.1.url"]);
        assert_eq!(selected("$.servers..*").len(), 4);
    }

    #[test]
    fn test_root_selector() {
        assert_eq!(selected("$"), vec![""]);
    }
}
