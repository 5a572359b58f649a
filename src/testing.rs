//! Test support: single-rule linters and per-rule fixtures
//!
//! Fixtures live under `tests/resources/<rule-code>/`, usually as a
//! `negative.yml` that violates the rule and a `positive.yml` that does not.

use crate::config::Config;
use crate::diagnostic::PathSegment;
use crate::engine::Linter;
use crate::ruleset::{Ruleset, RulesetError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error reading a fixture
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Fixture not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Build a linter that runs only `rule` from `ruleset`
pub fn prep_linter(ruleset: &Ruleset, rule: &str) -> Result<Linter, RulesetError> {
    let ruleset = ruleset.only(rule)?;
    let config = Config {
        all_rules: true,
        ..Config::default()
    };
    Ok(Linter::new(ruleset).with_config(config))
}

/// Fixture directory for a rule
pub fn resource_dir(rule: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("resources")
        .join(rule)
}

/// Read a fixture file for a rule
pub fn read_fixture(rule: &str, name: &str) -> Result<String, FixtureError> {
    let path = resource_dir(rule).join(name);
    if !path.is_file() {
        return Err(FixtureError::NotFound(path));
    }
    std::fs::read_to_string(&path).map_err(|source| FixtureError::Io { path, source })
}

/// Build a path of mapping keys
pub fn path(keys: &[&str]) -> Vec<PathSegment> {
    keys.iter().map(|k| PathSegment::from(*k)).collect()
}
