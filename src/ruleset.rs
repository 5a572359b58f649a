//! Rulesets: ordered collections of rules
//!
//! Rulesets come from the built-in api-insights rules or from YAML/JSON files
//! in the Spectral layout:
//!
//! ```yaml
//! extends: api-insights-openapi-ruleset
//! rules:
//!   my-rule:
//!     description: ...
//!     given: $.info
//!     then:
//!       field: contact
//!       function: truthy
//!   date-response-header-format-pattern-requirement: error
//! ```

use crate::rule::{InvalidRule, OneOrMany, Rule, RuleDefinition, SeveritySetting};
use crate::rulesets::api_insights;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the built-in ruleset, usable in `extends`
pub const BUILTIN_RULESET: &str = "api-insights-openapi-ruleset";

const MAX_EXTENDS_DEPTH: usize = 10;

/// Error loading or querying a ruleset
#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("IO error reading {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Invalid rule: {0}")]
    Invalid(#[from] InvalidRule),

    #[error("Maximum ruleset extends depth exceeded at {0}")]
    TooDeep(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesetFile {
    #[serde(default)]
    extends: Option<OneOrMany<String>>,
    #[serde(default, rename = "documentationUrl")]
    documentation_url: Option<String>,
    #[serde(default)]
    formats: Vec<String>,
    #[serde(default)]
    rules: serde_yaml::Mapping,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RuleEntry {
    Severity(SeveritySetting),
    Definition(Box<RuleDefinition>),
}

/// An ordered set of rules; evaluation follows insertion order
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    name: String,
    rules: Vec<Rule>,
}

impl Ruleset {
    /// Create an empty ruleset
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: Vec::new(),
        }
    }

    /// The built-in api-insights ruleset
    pub fn builtin() -> Self {
        let mut ruleset = Self::new(BUILTIN_RULESET);
        for rule in api_insights::builtin_rules() {
            ruleset.insert(rule);
        }
        ruleset
    }

    /// Load a ruleset file (`.yaml`, `.yml` or `.json`)
    pub fn load(path: &Path) -> Result<Self, RulesetError> {
        Self::load_with_depth(path, 0)
    }

    fn load_with_depth(path: &Path, depth: usize) -> Result<Self, RulesetError> {
        if depth >= MAX_EXTENDS_DEPTH {
            return Err(RulesetError::TooDeep(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| RulesetError::Io {
            file: path.display().to_string(),
            source,
        })?;

        let file = parse_file(&content, path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("ruleset");
        let base_dir = path.parent().unwrap_or(Path::new("."));

        Self::from_file(name, file, base_dir, depth, &path.display().to_string())
    }

    /// Parse a ruleset from YAML text; relative `extends` resolve against `base_dir`
    pub fn from_yaml_str(name: &str, content: &str, base_dir: &Path) -> Result<Self, RulesetError> {
        let file: RulesetFile = serde_yaml::from_str(content).map_err(|e| RulesetError::Parse {
            file: name.to_string(),
            message: e.to_string(),
        })?;
        Self::from_file(name, file, base_dir, 0, name)
    }

    fn from_file(
        name: &str,
        file: RulesetFile,
        base_dir: &Path,
        depth: usize,
        origin: &str,
    ) -> Result<Self, RulesetError> {
        let mut ruleset = Self::new(name);

        for parent in file.extends.map(OneOrMany::into_vec).unwrap_or_default() {
            let inherited = if parent == BUILTIN_RULESET {
                Self::builtin()
            } else {
                let parent_path = if Path::new(&parent).is_absolute() {
                    PathBuf::from(&parent)
                } else {
                    base_dir.join(&parent)
                };
                Self::load_with_depth(&parent_path, depth + 1)?
            };
            ruleset.extend(inherited);
        }

        for (key, value) in file.rules {
            let code = key.as_str().ok_or_else(|| RulesetError::Parse {
                file: origin.to_string(),
                message: format!("rule codes must be strings, found {:?}", key),
            })?;

            let entry: RuleEntry =
                serde_yaml::from_value(value).map_err(|e| RulesetError::Parse {
                    file: origin.to_string(),
                    message: format!("rule '{}': {}", code, e),
                })?;

            match entry {
                RuleEntry::Severity(setting) => {
                    let rule = ruleset
                        .get_mut(code)
                        .ok_or_else(|| RulesetError::UnknownRule(code.to_string()))?;
                    match setting {
                        SeveritySetting::Off => rule.enabled = false,
                        SeveritySetting::Level(level) => {
                            rule.enabled = true;
                            rule.severity = level;
                        }
                    }
                }
                RuleEntry::Definition(definition) => {
                    let mut rule = definition.into_rule(code);
                    if rule.docs.is_none() {
                        rule.docs = file.documentation_url.clone();
                    }
                    rule.validate()?;
                    ruleset.insert(rule);
                }
            }
        }

        log::debug!(
            "Loaded ruleset '{}' with {} rules (formats: {:?})",
            name,
            ruleset.len(),
            file.formats
        );
        Ok(ruleset)
    }

    /// Ruleset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by code
    pub fn get(&self, code: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.code == code)
    }

    fn get_mut(&mut self, code: &str) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|r| r.code == code)
    }

    /// Add a rule, replacing one with the same code in place
    pub fn insert(&mut self, rule: Rule) {
        match self.get_mut(&rule.code) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    /// Add all rules of another ruleset (later definitions win)
    pub fn extend(&mut self, other: Ruleset) {
        for rule in other.rules {
            self.insert(rule);
        }
    }

    /// A ruleset holding only the named rule, enabled
    pub fn only(&self, code: &str) -> Result<Self, RulesetError> {
        let mut rule = self
            .get(code)
            .cloned()
            .ok_or_else(|| RulesetError::UnknownRule(code.to_string()))?;
        rule.enabled = true;

        Ok(Self {
            name: self.name.clone(),
            rules: vec![rule],
        })
    }
}

fn parse_file(content: &str, path: &Path) -> Result<RulesetFile, RulesetError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parse_error = |message: String| RulesetError::Parse {
        file: path.display().to_string(),
        message,
    };

    match ext {
        "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
        "json" => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        other => Err(parse_error(format!("Unknown ruleset file format: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::functions::RuleFunction;
    use std::io::Write;
    use tempfile::TempDir;

    const DATE_RULE: &str = "date-response-header-format-pattern-requirement";

    #[test]
    fn test_builtin_ruleset() {
        let ruleset = Ruleset::builtin();
        assert_eq!(ruleset.name(), BUILTIN_RULESET);
        let rule = ruleset.get(DATE_RULE).unwrap();
        assert_eq!(rule.severity, Severity::Warning);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_only_restricts_to_one_rule() {
        let ruleset = Ruleset::builtin().only(DATE_RULE).unwrap();
        assert_eq!(ruleset.len(), 1);
        assert_eq!(ruleset.rules()[0].code, DATE_RULE);

        let err = Ruleset::builtin().only("no-such-rule").unwrap_err();
        assert!(matches!(err, RulesetError::UnknownRule(code) if code == "no-such-rule"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut ruleset = Ruleset::new("test");
        ruleset.insert(Rule::new("a", "first", "$").with_then(None, RuleFunction::Truthy));
        ruleset.insert(Rule::new("b", "second", "$").with_then(None, RuleFunction::Truthy));
        ruleset.insert(Rule::new("a", "replaced", "$").with_then(None, RuleFunction::Falsy));

        let codes: Vec<_> = ruleset.rules().iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["a", "b"]);
        assert_eq!(ruleset.get("a").unwrap().description, "replaced");
    }

    #[test]
    fn test_yaml_ruleset_with_extends_and_override() {
        let yaml = r#"
extends: api-insights-openapi-ruleset
rules:
  date-response-header-format-pattern-requirement: error
  info-contact:
    description: Info must have a contact
    given: $.info
    then:
      field: contact
      function: truthy
"#;

        let ruleset = Ruleset::from_yaml_str("custom", yaml, Path::new(".")).unwrap();
        let codes: Vec<_> = ruleset.rules().iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec![DATE_RULE, "info-contact"]);
        assert_eq!(ruleset.get(DATE_RULE).unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_override_can_turn_rule_off() {
        let yaml = format!("extends: [{}]\nrules:\n  {}: 'off'\n", BUILTIN_RULESET, DATE_RULE);
        let ruleset = Ruleset::from_yaml_str("custom", &yaml, Path::new(".")).unwrap();
        assert!(!ruleset.get(DATE_RULE).unwrap().enabled);
    }

    #[test]
    fn test_override_of_unknown_rule_fails() {
        let yaml = "rules:\n  missing-rule: warn\n";
        let err = Ruleset::from_yaml_str("custom", yaml, Path::new(".")).unwrap_err();
        assert!(matches!(err, RulesetError::UnknownRule(_)));
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let yaml = r#"
rules:
  bad-regex:
    given: $.info
    then:
      field: title
      function: pattern
      functionOptions:
        match: "([unclosed"
"#;
        let err = Ruleset::from_yaml_str("custom", yaml, Path::new(".")).unwrap_err();
        assert!(matches!(err, RulesetError::Invalid(_)));
    }

    #[test]
    fn test_load_json_and_relative_extends() {
        let dir = TempDir::new().unwrap();

        let base_path = dir.path().join("base.yaml");
        let mut base = std::fs::File::create(&base_path).unwrap();
        writeln!(
            base,
            "rules:\n  servers-defined:\n    given: $\n    then:\n      field: servers\n      function: defined"
        )
        .unwrap();

        let json_path = dir.path().join("ruleset.json");
        std::fs::write(
            &json_path,
            r#"{"extends": "base.yaml", "rules": {"servers-defined": "hint"}}"#,
        )
        .unwrap();

        let ruleset = Ruleset::load(&json_path).unwrap();
        assert_eq!(ruleset.name(), "ruleset");
        assert_eq!(ruleset.get("servers-defined").unwrap().severity, Severity::Hint);
    }

    #[test]
    fn test_self_extending_ruleset_is_too_deep() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loop.yaml");
        std::fs::write(&path, "extends: loop.yaml\n").unwrap();

        let err = Ruleset::load(&path).unwrap_err();
        assert!(matches!(err, RulesetError::TooDeep(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Ruleset::load(Path::new("/nonexistent/ruleset.yaml")).unwrap_err();
        assert!(matches!(err, RulesetError::Io { .. }));
    }
}
