//! YAML/JSON document loading with source ranges

use crate::diagnostic::{PathSegment, Position, Range};
use crate::node::{Entry, Node, ScalarStyle};
use marked_yaml::{Node as MarkedNode, Span};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Error during parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("YAML parse error in {file}: {message}")]
    Yaml { file: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document: {0}")]
    Invalid(String),
}

/// Type alias for disable comment parsing result
type DisableParseResult = (
    HashMap<String, HashSet<usize>>,         // disabled_lines
    HashSet<String>,                         // disabled_file_rules
    HashMap<String, HashMap<usize, String>>, // disable_reasons
);

// Supported formats:
// # apinter-disable rule-code
// # apinter-disable rule-code: reason here
// # apinter-disable rule-code -- reason here
static DISABLE_RE: LazyLock<Regex> = LazyLock::new(|| directive_regex("apinter-disable"));
static DISABLE_NEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| directive_regex("apinter-disable-next-line"));
static DISABLE_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| directive_regex("apinter-disable-file"));

fn directive_regex(directive: &str) -> Regex {
    Regex::new(&format!(
        r"#\s*{}\s+([^\s:]+)(?:\s*:\s*(.+?)|\s+--\s+(.+?))?\s*$",
        directive
    ))
    .expect("directive pattern is valid")
}

/// Information about a disable comment
#[derive(Debug, Clone, PartialEq)]
pub struct DisableInfo {
    /// Zero-based line the directive applies to (`None` = whole file)
    pub line: Option<usize>,
    pub rule_id: String,
    pub reason: Option<String>,
}

/// A parsed document
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    root: Node,
    source_lines: Vec<String>,
    disabled_lines: HashMap<String, HashSet<usize>>,
    disabled_file_rules: HashSet<String>,
    /// Reasons for disable comments (rule_id -> line -> reason)
    disable_reasons: HashMap<String, HashMap<usize, String>>,
}

impl Document {
    /// Parse document text. `path` only labels errors and diagnostics.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ParseError> {
        if content.trim().is_empty() {
            return Err(ParseError::Invalid(format!(
                "{} is empty",
                path.display()
            )));
        }

        let raw = marked_yaml::parse_yaml(0, content).map_err(|e| ParseError::Yaml {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;

        let root = TreeBuilder::new(content).build(&raw, Anchor::Root, false);
        if !root.is_mapping() {
            return Err(ParseError::Invalid(format!(
                "top level of {} must be a mapping, found a {}",
                path.display(),
                root.kind_name()
            )));
        }
        let source_lines: Vec<String> = content.lines().map(String::from).collect();
        let (disabled_lines, disabled_file_rules, disable_reasons) =
            Self::parse_disable_comments(&source_lines);

        Ok(Self {
            path: path.to_path_buf(),
            root,
            source_lines,
            disabled_lines,
            disabled_file_rules,
            disable_reasons,
        })
    }

    /// Parse text that did not come from a file
    pub fn parse_str(content: &str) -> Result<Self, ParseError> {
        Self::parse(content, Path::new("<input>"))
    }

    /// Read and parse a file
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the root node
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Resolve a path from the root
    pub fn resolve(&self, path: &[PathSegment]) -> Option<&Node> {
        self.root.resolve(path)
    }

    /// Source range of the node at `path`
    pub fn range_of(&self, path: &[PathSegment]) -> Option<Range> {
        self.resolve(path).map(|n| n.range)
    }

    /// Get source line by zero-based line number
    pub fn source_line(&self, line: usize) -> Option<&str> {
        self.source_lines.get(line).map(String::as_str)
    }

    fn parse_disable_comments(lines: &[String]) -> DisableParseResult {
        let mut disabled_lines: HashMap<String, HashSet<usize>> = HashMap::new();
        let mut disabled_file_rules: HashSet<String> = HashSet::new();
        let mut disable_reasons: HashMap<String, HashMap<usize, String>> = HashMap::new();

        let reason_of = |cap: &regex::Captures| {
            cap.get(2)
                .or_else(|| cap.get(3))
                .map(|m| m.as_str().trim().to_string())
        };

        for (line_num, line) in lines.iter().enumerate() {
            if let Some(cap) = DISABLE_FILE_RE.captures(line) {
                let rule_id = cap[1].to_string();
                disabled_file_rules.insert(rule_id.clone());
                if let Some(reason) = reason_of(&cap) {
                    disable_reasons
                        .entry(rule_id)
                        .or_default()
                        .insert(usize::MAX, reason);
                }
            } else if let Some(cap) = DISABLE_NEXT_RE.captures(line) {
                let rule_id = cap[1].to_string();
                disabled_lines
                    .entry(rule_id.clone())
                    .or_default()
                    .insert(line_num + 1);
                if let Some(reason) = reason_of(&cap) {
                    disable_reasons
                        .entry(rule_id)
                        .or_default()
                        .insert(line_num + 1, reason);
                }
            } else if let Some(cap) = DISABLE_RE.captures(line) {
                let rule_id = cap[1].to_string();
                disabled_lines
                    .entry(rule_id.clone())
                    .or_default()
                    .insert(line_num);
                if let Some(reason) = reason_of(&cap) {
                    disable_reasons
                        .entry(rule_id)
                        .or_default()
                        .insert(line_num, reason);
                }
            }
        }

        (disabled_lines, disabled_file_rules, disable_reasons)
    }

    /// Check if a rule is disabled at a specific zero-based line
    pub fn is_rule_disabled(&self, rule_id: &str, line: usize) -> bool {
        ["all", rule_id].iter().any(|id| {
            self.disabled_lines
                .get(*id)
                .is_some_and(|lines| lines.contains(&line))
        })
    }

    /// Check if a rule is disabled for the entire file
    pub fn is_rule_disabled_for_file(&self, rule_id: &str) -> bool {
        self.disabled_file_rules.contains("all") || self.disabled_file_rules.contains(rule_id)
    }

    /// Get the reason why a rule was disabled at a specific line
    pub fn get_disable_reason(&self, rule_id: &str, line: usize) -> Option<&str> {
        for id in [rule_id, "all"] {
            if let Some(lines) = self.disable_reasons.get(id) {
                if let Some(reason) = lines.get(&line).or_else(|| lines.get(&usize::MAX)) {
                    return Some(reason);
                }
            }
        }
        None
    }

    /// Get all disable information for this document
    pub fn get_all_disables(&self) -> Vec<DisableInfo> {
        let mut disables = Vec::new();

        for rule_id in &self.disabled_file_rules {
            let reason = self
                .disable_reasons
                .get(rule_id)
                .and_then(|m| m.get(&usize::MAX))
                .cloned();
            disables.push(DisableInfo {
                line: None,
                rule_id: rule_id.clone(),
                reason,
            });
        }

        for (rule_id, lines) in &self.disabled_lines {
            for &line in lines {
                let reason = self
                    .disable_reasons
                    .get(rule_id)
                    .and_then(|m| m.get(&line))
                    .cloned();
                disables.push(DisableInfo {
                    line: Some(line),
                    rule_id: rule_id.clone(),
                    reason,
                });
            }
        }

        disables.sort_by(|a, b| (a.line, &a.rule_id).cmp(&(b.line, &b.rule_id)));
        disables
    }
}

/// Where a node sits relative to its parent; decides where its range starts
#[derive(Debug, Clone, Copy)]
enum Anchor {
    Root,
    /// Value of a mapping entry
    AfterKey {
        key_start: Position,
        after_colon: Position,
    },
    Item,
}

/// Converts the marked-yaml tree into [`Node`]s, measuring scalar extents
/// from the source text since the parser only records start markers.
struct TreeBuilder {
    lines: Vec<Vec<char>>,
}

impl TreeBuilder {
    fn new(content: &str) -> Self {
        Self {
            lines: content.lines().map(|l| l.chars().collect()).collect(),
        }
    }

    fn build(&self, raw: &MarkedNode, anchor: Anchor, flow: bool) -> Node {
        let marker = self.marker(raw.span());

        match raw {
            MarkedNode::Scalar(scalar) => self.build_scalar(scalar.as_str(), marker, anchor, flow),
            MarkedNode::Mapping(mapping) => {
                let opened = self.char_at(marker) == Some('{');
                let flow = flow || opened;
                let entries: Vec<Entry> = mapping
                    .iter()
                    .map(|(key, value)| {
                        let key_start = self.marker(key.span());
                        let (key_end, _) = self.scan_scalar(key_start, flow);
                        let after_colon = Position::new(key_end.line, key_end.character + 1);
                        let anchor = Anchor::AfterKey {
                            key_start,
                            after_colon,
                        };
                        Entry {
                            key: key.as_str().to_string(),
                            key_range: Range::new(key_start, key_end),
                            value: self.build(value, anchor, flow),
                        }
                    })
                    .collect();
                let end = match entries.last() {
                    Some(last) => self.collection_end(last.value.range.end, opened, '}'),
                    None => self.empty_collection_end(marker, '}'),
                };
                Node::mapping(entries, Range::new(self.start_for(anchor, marker), end))
            }
            MarkedNode::Sequence(sequence) => {
                let opened = self.char_at(marker) == Some('[');
                let flow = flow || opened;
                let items: Vec<Node> = sequence
                    .iter()
                    .map(|item| self.build(item, Anchor::Item, flow))
                    .collect();
                let end = match items.last() {
                    Some(last) => self.collection_end(last.range.end, opened, ']'),
                    None => self.empty_collection_end(marker, ']'),
                };
                Node::sequence(items, Range::new(self.start_for(anchor, marker), end))
            }
        }
    }

    fn build_scalar(&self, value: &str, marker: Position, anchor: Anchor, flow: bool) -> Node {
        if !flow {
            if let Some((header, indent)) = self.block_header(marker, anchor) {
                let end = self.scan_block(header, indent);
                return Node::scalar(value, ScalarStyle::Block, Range::new(header, end));
            }
        }

        // an absent value is reported by the parser at the next token
        let absent = matches!(value, "" | "~")
            && !matches!(self.char_at(marker), Some('~' | '\'' | '"'));
        if absent {
            let at = match anchor {
                Anchor::AfterKey { after_colon, .. } => after_colon,
                _ => marker,
            };
            return Node::scalar("", ScalarStyle::Empty, Range::point(at));
        }

        let (mut end, style) = self.scan_scalar(marker, flow);
        if style == ScalarStyle::Plain && !flow {
            end = self.scan_plain_continuation(end, self.parent_indent(marker, anchor));
        }
        Node::scalar(value, style, Range::new(marker, end))
    }

    fn start_for(&self, anchor: Anchor, marker: Position) -> Position {
        match anchor {
            Anchor::Root => Position::new(0, 0),
            Anchor::AfterKey { after_colon, .. } => after_colon,
            Anchor::Item => marker,
        }
    }

    fn marker(&self, span: &Span) -> Position {
        // marked-yaml markers are 1-based
        span.start()
            .map(|m| {
                Position::new(
                    m.line().saturating_sub(1),
                    m.column().saturating_sub(1),
                )
            })
            .unwrap_or_default()
    }

    fn char_at(&self, at: Position) -> Option<char> {
        self.lines
            .get(at.line)
            .and_then(|l| l.get(at.character))
            .copied()
    }

    fn is_blank(&self, line: usize) -> bool {
        self.lines
            .get(line)
            .is_none_or(|l| l.iter().all(|c| c.is_whitespace()))
    }

    /// Column a block scalar or a plain continuation line must indent past
    fn parent_indent(&self, marker: Position, anchor: Anchor) -> usize {
        if let Anchor::AfterKey { key_start, .. } = anchor {
            return key_start.character;
        }
        let dash = self.lines.get(marker.line).and_then(|line| {
            line[..marker.character.min(line.len())]
                .iter()
                .rposition(|c| !c.is_whitespace())
                .filter(|&i| line[i] == '-')
        });
        dash.unwrap_or(marker.character.saturating_sub(1))
    }

    /// Locate the `|` / `>` header of a block scalar and the indentation its
    /// content must exceed. marked-yaml marks block scalars at their first
    /// content line, so the header is searched from the key or the dash.
    fn block_header(&self, marker: Position, anchor: Anchor) -> Option<(Position, usize)> {
        match anchor {
            Anchor::AfterKey {
                key_start,
                after_colon,
            } => {
                let line = self.lines.get(after_colon.line)?;
                let token = (after_colon.character..line.len())
                    .find(|&i| !line[i].is_whitespace())
                    .map(|i| Position::new(after_colon.line, i))?;
                self.header_len(token)
                    .map(|_| (token, key_start.character))
            }
            Anchor::Item => {
                if self.header_len(marker).is_some() {
                    return Some((marker, self.parent_indent(marker, anchor)));
                }
                let line = self.lines.get(marker.line)?;
                let prefix = &line[..marker.character.min(line.len())];
                if prefix.iter().any(|c| !c.is_whitespace()) {
                    return None;
                }

                let header_line = (0..marker.line).rev().find(|&i| !self.is_blank(i))?;
                let line = &self.lines[header_line];
                let content = content_len(line);
                let token_start = line[..content]
                    .iter()
                    .rposition(|c| c.is_whitespace())
                    .map_or(0, |i| i + 1);
                let token = Position::new(header_line, token_start);
                self.header_len(token)?;

                let dash = line[..token_start]
                    .iter()
                    .rposition(|c| !c.is_whitespace())?;
                (line[dash] == '-').then_some((token, dash))
            }
            Anchor::Root => None,
        }
    }

    /// Length of a block scalar header (`|`, `>-`, `|2+` ...) starting at `at`
    fn header_len(&self, at: Position) -> Option<usize> {
        let line = self.lines.get(at.line)?;
        if !matches!(line.get(at.character), Some('|' | '>')) {
            return None;
        }

        let rest = &line[at.character + 1..];
        let modifiers = rest
            .iter()
            .take_while(|c| matches!(**c, '-' | '+' | '0'..='9'))
            .count();
        let trailing = &rest[modifiers..];
        match trailing.iter().position(|c| !c.is_whitespace()) {
            None => Some(1 + modifiers),
            Some(i) if i > 0 && trailing[i] == '#' => Some(1 + modifiers),
            Some(_) => None,
        }
    }

    fn collection_end(&self, last_end: Position, opened: bool, close: char) -> Position {
        if !opened {
            return last_end;
        }
        self.flow_close(last_end, close).unwrap_or(last_end)
    }

    /// Position just past the bracket closing a flow collection whose last
    /// entry ends at `from`
    fn flow_close(&self, from: Position, close: char) -> Option<Position> {
        let mut at = from;
        while let Some(line) = self.lines.get(at.line) {
            match line.get(at.character) {
                None | Some('#') => at = Position::new(at.line + 1, 0),
                Some(&c) if c == close => return Some(Position::new(at.line, at.character + 1)),
                Some(&c) if c == ',' || c.is_whitespace() => at.character += 1,
                Some(_) => return None,
            }
        }
        None
    }

    fn empty_collection_end(&self, start: Position, close: char) -> Position {
        let Some(line) = self.lines.get(start.line) else {
            return start;
        };
        line.iter()
            .skip(start.character)
            .position(|&c| c == close)
            .map(|offset| Position::new(start.line, start.character + offset + 1))
            .unwrap_or(start)
    }

    /// Find where the single-line or quoted scalar token starting at `start` ends
    fn scan_scalar(&self, start: Position, flow: bool) -> (Position, ScalarStyle) {
        match self.char_at(start) {
            Some('"') => (self.scan_quoted(start, '"'), ScalarStyle::DoubleQuoted),
            Some('\'') => (self.scan_quoted(start, '\''), ScalarStyle::SingleQuoted),
            _ => (self.scan_plain(start, flow), ScalarStyle::Plain),
        }
    }

    fn scan_quoted(&self, start: Position, quote: char) -> Position {
        let mut line_idx = start.line;
        let mut i = start.character + 1;

        while let Some(line) = self.lines.get(line_idx) {
            while i < line.len() {
                let c = line[i];
                if quote == '"' && c == '\\' {
                    i += 2;
                    continue;
                }
                if c == quote {
                    // '' is an escaped quote inside single-quoted scalars
                    if quote == '\'' && line.get(i + 1) == Some(&'\'') {
                        i += 2;
                        continue;
                    }
                    return Position::new(line_idx, i + 1);
                }
                i += 1;
            }
            line_idx += 1;
            i = 0;
        }

        let last = self.lines.len().saturating_sub(1);
        Position::new(last, self.lines.get(last).map_or(0, Vec::len))
    }

    /// End of a block scalar: its last non-blank line indented past `indent`
    fn scan_block(&self, header: Position, indent: usize) -> Position {
        let indent_of = |line: &[char]| line.iter().take_while(|c| **c == ' ').count();
        let header_len = self.header_len(header).unwrap_or(1);
        let mut end = Position::new(header.line, header.character + header_len);

        for (line_idx, line) in self.lines.iter().enumerate().skip(header.line + 1) {
            if line.iter().all(|c| c.is_whitespace()) {
                continue;
            }
            if indent_of(line.as_slice()) <= indent {
                break;
            }
            end = Position::new(line_idx, trimmed_len(line));
        }

        end
    }

    fn scan_plain(&self, start: Position, flow: bool) -> Position {
        let Some(line) = self.lines.get(start.line) else {
            return start;
        };

        let is_flow_indicator = |c: char| matches!(c, ',' | ']' | '}');
        let mut i = start.character;
        while i < line.len() {
            let c = line[i];
            let next = line.get(i + 1).copied();
            if c == ':'
                && next.is_none_or(|n| n.is_whitespace() || (flow && is_flow_indicator(n)))
            {
                break;
            }
            if c == '#' && i > start.character && line[i - 1].is_whitespace() {
                break;
            }
            if flow && is_flow_indicator(c) {
                break;
            }
            i += 1;
        }

        while i > start.character && line[i - 1].is_whitespace() {
            i -= 1;
        }
        Position::new(start.line, i)
    }

    /// Extend a block plain scalar over the following lines indented past
    /// `indent`; a comment or a blank-to-dedent ends it
    fn scan_plain_continuation(&self, first_end: Position, indent: usize) -> Position {
        let mut end = first_end;

        loop {
            let Some(line) = self.lines.get(end.line) else {
                break;
            };
            // stopped early at a comment or `: `
            if line[end.character.min(line.len())..]
                .iter()
                .any(|c| !c.is_whitespace())
            {
                break;
            }

            let Some(next) = (end.line + 1..self.lines.len()).find(|&i| !self.is_blank(i)) else {
                break;
            };
            let line = &self.lines[next];
            let start = line.iter().take_while(|c| c.is_whitespace()).count();
            if start <= indent || line[start] == '#' {
                break;
            }

            let line_end = self.scan_plain(Position::new(next, start), false);
            if line_end.character == start {
                break;
            }
            end = line_end;
        }

        end
    }
}

/// Line length without a trailing comment or whitespace
fn content_len(line: &[char]) -> usize {
    let comment = (0..line.len())
        .find(|&i| line[i] == '#' && (i == 0 || line[i - 1].is_whitespace()))
        .unwrap_or(line.len());
    trimmed_len(&line[..comment])
}

fn trimmed_len(line: &[char]) -> usize {
    line.len() - line.iter().rev().take_while(|c| c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
openapi: 3.0.0
info:
  title: 'Sample API'
  version: 1.0.0
paths:
  /test:
    get:
      tags: [one, two]
      responses:
        '200':
          description: OK
          headers:
            Date:
              schema:
                type: string
                format: date-time
";

    fn path(keys: &[&str]) -> Vec<PathSegment> {
        keys.iter().map(|k| PathSegment::from(*k)).collect()
    }

    fn doc() -> Document {
        Document::parse_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_root_range_starts_at_origin() {
        let doc = doc();
        assert_eq!(doc.root().range.start, Position::new(0, 0));
        assert_eq!(doc.root().range.end, Position::new(15, 33));
    }

    #[test]
    fn test_mapping_value_starts_after_key_colon() {
        let doc = doc();
        let schema = path(&[
            "paths", "/test", "get", "responses", "200", "headers", "Date", "schema",
        ]);
        assert_eq!(
            doc.range_of(&schema),
            Some(Range::new(Position::new(13, 21), Position::new(15, 33)))
        );
    }

    #[test]
    fn test_scalar_range_covers_token() {
        let doc = doc();
        let format = path(&[
            "paths", "/test", "get", "responses", "200", "headers", "Date", "schema", "format",
        ]);
        assert_eq!(
            doc.range_of(&format),
            Some(Range::new(Position::new(15, 24), Position::new(15, 33)))
        );

        let title = path(&["info", "title"]);
        assert_eq!(
            doc.range_of(&title),
            Some(Range::new(Position::new(2, 9), Position::new(2, 21)))
        );
    }

    #[test]
    fn test_quoted_keys_are_unquoted_in_paths() {
        let doc = doc();
        let description = path(&["paths", "/test", "get", "responses", "200", "description"]);
        assert_eq!(doc.resolve(&description).and_then(|n| n.as_str()), Some("OK"));
    }

    #[test]
    fn test_flow_sequence_items() {
        let doc = doc();
        let mut tags = path(&["paths", "/test", "get", "tags"]);
        let node = doc.resolve(&tags).unwrap();
        assert!(node.is_sequence());
        assert_eq!(node.items().len(), 2);

        assert_eq!(
            node.range,
            Range::new(Position::new(7, 11), Position::new(7, 22))
        );

        tags.push(PathSegment::Index(1));
        assert_eq!(
            doc.range_of(&tags),
            Some(Range::new(Position::new(7, 18), Position::new(7, 21)))
        );
    }

    #[test]
    fn test_flow_collections_end_at_closing_bracket() {
        let content = "schema: {format: date-time, items: [a, b] }\ntags: [one,\n  two]\nempty: []\n";
        let doc = Document::parse_str(content).unwrap();

        assert_eq!(
            doc.range_of(&path(&["schema"])),
            Some(Range::new(Position::new(0, 7), Position::new(0, 43)))
        );
        assert_eq!(
            doc.range_of(&path(&["schema", "items"])),
            Some(Range::new(Position::new(0, 34), Position::new(0, 41)))
        );
        assert_eq!(
            doc.range_of(&path(&["schema", "format"])),
            Some(Range::new(Position::new(0, 17), Position::new(0, 26)))
        );
        assert_eq!(
            doc.range_of(&path(&["tags"])),
            Some(Range::new(Position::new(1, 5), Position::new(2, 6)))
        );
        assert_eq!(
            doc.range_of(&path(&["empty"])),
            Some(Range::new(Position::new(3, 6), Position::new(3, 9)))
        );
        assert_eq!(doc.root().range.end, Position::new(3, 9));
    }

    #[test]
    fn test_descendant_ranges_are_contained() {
        let doc = doc();
        let mut violations = Vec::new();
        check_containment(doc.root(), &mut violations);
        assert!(violations.is_empty(), "{:?}", violations);
    }

    fn check_containment(node: &Node, violations: &mut Vec<Range>) {
        for (_, child) in node.children() {
            if !node.range.contains(&child.range) {
                violations.push(child.range);
            }
            check_containment(child, violations);
        }
    }

    #[test]
    fn test_empty_value() {
        let doc = Document::parse_str("info:\n  title:\n  version: 1\n").unwrap();
        let title = doc.resolve(&path(&["info", "title"])).unwrap();
        assert!(!title.is_truthy());
        assert_eq!(title.range, Range::point(Position::new(1, 8)));
    }

    #[test]
    fn test_block_scalar_range() {
        let doc = Document::parse_str("info:\n  description: |\n    line one\n    line two\n  version: 1\n")
            .unwrap();
        let range = doc.range_of(&path(&["info", "description"])).unwrap();
        assert_eq!(range.start, Position::new(1, 15));
        assert_eq!(range.end, Position::new(3, 12));
    }

    #[test]
    fn test_block_scalar_styles() {
        let content = "\
info:
  description: >-
    folded text
    continues here
  summary: | # keep
    kept

  notes:
    - |
      first item
      spans two
    - plain item
      continued
  empty: |
  title: last
";
        let doc = Document::parse_str(content).unwrap();
        let range = |keys: &[&str]| doc.range_of(&path(keys)).unwrap();

        assert_eq!(
            range(&["info", "description"]),
            Range::new(Position::new(1, 15), Position::new(3, 18))
        );
        assert_eq!(
            range(&["info", "summary"]),
            Range::new(Position::new(4, 11), Position::new(5, 8))
        );
        assert_eq!(
            range(&["info", "empty"]),
            Range::new(Position::new(13, 9), Position::new(13, 10))
        );
        assert_eq!(
            range(&["info", "title"]),
            Range::new(Position::new(14, 9), Position::new(14, 13))
        );

        let mut notes = path(&["info", "notes"]);
        assert_eq!(
            doc.range_of(&notes),
            Some(Range::new(Position::new(7, 8), Position::new(12, 15)))
        );
        notes.push(PathSegment::Index(0));
        assert_eq!(
            doc.range_of(&notes),
            Some(Range::new(Position::new(8, 6), Position::new(10, 15)))
        );
        notes.pop();
        notes.push(PathSegment::Index(1));
        let item = doc.resolve(&notes).unwrap();
        assert_eq!(item.as_str(), Some("plain item continued"));
        assert_eq!(
            item.range,
            Range::new(Position::new(11, 6), Position::new(12, 15))
        );

        assert_eq!(doc.root().range.end, Position::new(14, 13));
        let mut violations = Vec::new();
        check_containment(doc.root(), &mut violations);
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_block_scalar_closing_a_mapping() {
        let content = "\
schema:
  format: date-time
  description: |
    Sent by every response,
    formatted as RFC 5322.
";
        let doc = Document::parse_str(content).unwrap();
        assert_eq!(
            doc.range_of(&path(&["schema"])),
            Some(Range::new(Position::new(0, 7), Position::new(4, 26)))
        );
        assert_eq!(
            doc.range_of(&path(&["schema", "description"])),
            Some(Range::new(Position::new(2, 15), Position::new(4, 26)))
        );
    }

    #[test]
    fn test_multiline_plain_scalar() {
        let content = "\
schema:
  description: first line
    second line

    third line
  type: string
other: first
  second # note
";
        let doc = Document::parse_str(content).unwrap();

        let description = doc.resolve(&path(&["schema", "description"])).unwrap();
        assert_eq!(
            description.range,
            Range::new(Position::new(1, 15), Position::new(4, 14))
        );
        assert_eq!(
            doc.range_of(&path(&["schema", "type"])),
            Some(Range::new(Position::new(5, 8), Position::new(5, 14)))
        );
        assert_eq!(
            doc.range_of(&path(&["other"])),
            Some(Range::new(Position::new(6, 7), Position::new(7, 8)))
        );

        let mut violations = Vec::new();
        check_containment(doc.root(), &mut violations);
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_json_input() {
        let doc = Document::parse_str("{\"openapi\": \"3.0.0\", \"paths\": {}}").unwrap();
        assert_eq!(
            doc.resolve(&path(&["openapi"])).and_then(|n| n.as_str()),
            Some("3.0.0")
        );
        assert!(doc.resolve(&path(&["paths"])).unwrap().entries().is_empty());
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            Document::parse_str("paths: [unclosed"),
            Err(ParseError::Yaml { .. })
        ));
        assert!(matches!(
            Document::parse_str("   \n"),
            Err(ParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_disable_comments() {
        let content = "\
# apinter-disable-file some-rule: legacy document
openapi: 3.0.0 # apinter-disable other-rule
# apinter-disable-next-line all -- generated
info: {}
";
        let doc = Document::parse_str(content).unwrap();
        assert!(doc.is_rule_disabled_for_file("some-rule"));
        assert!(!doc.is_rule_disabled_for_file("other-rule"));
        assert!(doc.is_rule_disabled("other-rule", 1));
        assert!(!doc.is_rule_disabled("other-rule", 2));
        assert!(doc.is_rule_disabled("anything", 3));
        assert_eq!(doc.get_disable_reason("anything", 3), Some("generated"));
        assert_eq!(doc.get_disable_reason("some-rule", 10), Some("legacy document"));
        assert_eq!(doc.get_all_disables().len(), 3);
    }
}
