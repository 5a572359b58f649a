//! Configuration system for the linter
//!
//! Reads configuration from:
//! - `.apinterrc.yaml` / `.apinterrc.yml` / `.apinterrc.json` (project-level)
//! - the same names in the home directory (user-level)

use crate::diagnostic::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file names, in lookup order
pub const CONFIG_FILE_NAMES: [&str; 3] = [".apinterrc.yaml", ".apinterrc.yml", ".apinterrc.json"];

const MAX_EXTENDS_DEPTH: usize = 10;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lint files in parallel
    pub parallel: bool,

    /// Number of parallel jobs (0 = auto-detect)
    pub jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Color mode
    pub color: ColorMode,

    /// Verbose output
    pub verbose: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: ColorMode::Auto,
            verbose: false,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Compact,
    Github,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "compact" => Ok(OutputFormat::Compact),
            "github" => Ok(OutputFormat::Github),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// File handling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Include patterns, used when no files are given on the command line
    pub include: Vec<String>,

    /// Exclude patterns
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: vec![
                "**/openapi.yaml".to_string(),
                "**/openapi.yml".to_string(),
                "**/openapi.json".to_string(),
            ],
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
            ],
        }
    }
}

/// Rule configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Disabled rules
    pub disabled: Vec<String>,

    /// Enabled rules (empty = all)
    pub enabled: Vec<String>,

    /// Severity overrides (rule code -> severity)
    pub severity: HashMap<String, Severity>,

    /// Per-file rule ignores (glob pattern -> rule codes, `all` for every rule)
    pub per_file: HashMap<String, Vec<String>>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extend from other configuration files or presets
    pub extends: Vec<String>,

    /// Engine settings
    pub engine: EngineConfig,

    /// Output settings
    pub output: OutputConfig,

    /// File handling settings
    pub files: FilesConfig,

    /// Rule configuration
    pub rules: RulesConfig,

    /// Extra ruleset files, relative to the config file
    pub rulesets: Vec<PathBuf>,

    /// Run rules that are not in the recommended preset
    pub all_rules: bool,
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a preset configuration by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::default()),
            "all" => Some(Self {
                all_rules: true,
                ..Self::default()
            }),
            _ => None,
        }
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_depth(path, 0)
    }

    fn load_with_depth(path: &Path, depth: usize) -> Result<Self, ConfigError> {
        if depth >= MAX_EXTENDS_DEPTH {
            return Err(ConfigError::Invalid(
                "Maximum config inheritance depth exceeded".to_string(),
            ));
        }

        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let mut config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        let base_dir = path.parent().unwrap_or(Path::new("."));
        config.rulesets = config
            .rulesets
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { base_dir.join(p) })
            .collect();

        if !config.extends.is_empty() {
            let mut base_config = Self::default();

            for extend in &config.extends.clone() {
                let extended = match Self::preset(extend) {
                    Some(preset) => preset,
                    None => {
                        let extend_path = if Path::new(extend).is_absolute() {
                            PathBuf::from(extend)
                        } else {
                            base_dir.join(extend)
                        };
                        Self::load_with_depth(&extend_path, depth + 1)?
                    }
                };
                base_config.merge(extended);
            }

            base_config.merge(config);
            config = base_config;
        }

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        if other.engine.jobs != 0 {
            self.engine.jobs = other.engine.jobs;
        }
        self.engine.parallel = other.engine.parallel;

        if other.output.format != OutputFormat::Text {
            self.output.format = other.output.format;
        }
        if other.output.verbose {
            self.output.verbose = true;
        }
        if other.output.color != ColorMode::Auto {
            self.output.color = other.output.color;
        }

        if other.files != FilesConfig::default() {
            self.files = other.files;
        }

        self.rules.disabled.extend(other.rules.disabled);
        if !other.rules.enabled.is_empty() {
            self.rules.enabled = other.rules.enabled;
        }
        self.rules.severity.extend(other.rules.severity);
        for (pattern, rules) in other.rules.per_file {
            self.rules.per_file.entry(pattern).or_default().extend(rules);
        }

        self.rulesets.extend(other.rulesets);
        if other.all_rules {
            self.all_rules = true;
        }
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        for name in &CONFIG_FILE_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            for name in &CONFIG_FILE_NAMES {
                let path = home.join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
        }

        Ok(Self::default())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        verbose: Option<bool>,
        jobs: Option<usize>,
        disabled_rules: Option<Vec<String>>,
        enabled_rules: Option<Vec<String>>,
    ) {
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(v) = verbose {
            self.output.verbose = v;
        }
        if let Some(j) = jobs {
            self.engine.jobs = j;
            if j == 1 {
                self.engine.parallel = false;
            }
        }
        if let Some(disabled) = disabled_rules {
            self.rules.disabled.extend(disabled);
        }
        if let Some(enabled) = enabled_rules {
            self.rules.enabled = enabled;
        }
    }

    /// Check if a rule is enabled
    ///
    /// Rules outside the recommended preset only run with `all_rules` or when
    /// listed in `rules.enabled`.
    pub fn is_rule_enabled(&self, code: &str, recommended: bool) -> bool {
        if self.rules.disabled.iter().any(|r| r == code) {
            return false;
        }

        if !self.rules.enabled.is_empty() {
            return self.rules.enabled.iter().any(|r| r == code);
        }

        recommended || self.all_rules
    }

    /// Get severity override for a rule
    pub fn get_severity_override(&self, code: &str) -> Option<Severity> {
        self.rules.severity.get(code).copied()
    }

    /// Check if a rule should be ignored for a file
    pub fn should_ignore_rule_for_file(&self, code: &str, file_path: &Path) -> bool {
        let file_str = file_path.to_string_lossy();

        self.rules.per_file.iter().any(|(pattern, rules)| {
            rules.iter().any(|r| r == "all" || r == code) && glob_matches(pattern, &file_str)
        })
    }

    /// Check if a file matches an exclude pattern
    pub fn is_excluded(&self, file_path: &Path) -> bool {
        let file_str = file_path.to_string_lossy();
        self.files
            .exclude
            .iter()
            .any(|pattern| glob_matches(pattern, &file_str))
    }
}

fn glob_matches(pattern: &str, path: &str) -> bool {
    match globset::Glob::new(pattern) {
        Ok(glob) => glob.compile_matcher().is_match(path),
        Err(e) => {
            log::warn!("Ignoring invalid glob '{}': {}", pattern, e);
            false
        }
    }
}
