//! Ignore-rule resolution and matching.
//!
//! An ignore-rule file (`.gitignore` by default) applies to the directory it
//! lives in and everything below it. For any path only the *nearest* such
//! file counts: lookup climbs from the path's directory toward the
//! filesystem root and stops at the first directory that has one.
//!
//! Rules are shell globs, one per line. Blank lines and `#` comments are
//! skipped and there is no negation. Any matching rule ignores the path.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use thiserror::Error;

/// Default ignore-rule file name.
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// `*` and `?` never cross a path separator.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Error)]
pub enum IgnoreError {
    #[error("Failed to read ignore file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern {pattern:?} at {path}:{line}: {source}")]
    Pattern {
        path: PathBuf,
        line: usize,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// A single compiled rule.
#[derive(Debug, Clone)]
struct IgnoreRule {
    raw: String,
    pattern: Pattern,
    /// Rules containing `/` match the path relative to the rule file's
    /// directory. Others match any single path component.
    anchored: bool,
}

impl IgnoreRule {
    fn matches(&self, relative: &Path) -> bool {
        if self.anchored {
            relative
                .ancestors()
                .filter(|p| !p.as_os_str().is_empty())
                .any(|p| self.pattern.matches_path_with(p, MATCH_OPTIONS))
        } else {
            relative.components().any(|c| match c {
                Component::Normal(name) => self
                    .pattern
                    .matches_with(&name.to_string_lossy(), MATCH_OPTIONS),
                _ => false,
            })
        }
    }
}

/// The ordered rules of one ignore-rule file.
#[derive(Debug, Clone)]
pub struct IgnoreRuleSet {
    /// The ignore-rule file itself.
    source: PathBuf,
    /// Directory the rules are relative to.
    base: PathBuf,
    rules: Vec<IgnoreRule>,
}

impl IgnoreRuleSet {
    /// Read and compile an ignore-rule file.
    pub fn load(ignore_file: &Path) -> Result<Self, IgnoreError> {
        let content = std::fs::read_to_string(ignore_file).map_err(|source| IgnoreError::Read {
            path: ignore_file.to_path_buf(),
            source,
        })?;
        Self::parse(ignore_file, &content)
    }

    /// Compile rules from `content` as if it had been read from `ignore_file`.
    pub fn parse(ignore_file: &Path, content: &str) -> Result<Self, IgnoreError> {
        let mut rules = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut glob = line.trim_end_matches('/');
            let mut anchored = glob.contains('/');
            if let Some(rest) = glob.strip_prefix('/') {
                glob = rest;
                anchored = true;
            }
            if glob.is_empty() {
                continue;
            }

            let pattern =
                Pattern::new(&collapse_stars(glob)).map_err(|source| IgnoreError::Pattern {
                    path: ignore_file.to_path_buf(),
                    line: index + 1,
                    pattern: line.to_string(),
                    source,
                })?;

            rules.push(IgnoreRule {
                raw: line.to_string(),
                pattern,
                anchored,
            });
        }

        Ok(Self {
            source: ignore_file.to_path_buf(),
            base: ignore_file.parent().map(Path::to_path_buf).unwrap_or_default(),
            rules,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule (in file order) that matches `path`.
    pub fn matching_rule(&self, path: &Path) -> Option<&str> {
        let relative = path.strip_prefix(&self.base).unwrap_or(path);
        self.rules
            .iter()
            .find(|rule| rule.matches(relative))
            .map(|rule| rule.raw.as_str())
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        self.matching_rule(path).is_some()
    }
}

/// Shell globs have no recursive wildcard: `**` is the same as `*`.
fn collapse_stars(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len());
    for c in glob.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Find the nearest ignore-rule file named `file_name`, starting in
/// `start_dir` and climbing toward the root.
///
/// Relative paths only climb as far as their first component, so callers
/// that want the full upward search should pass an absolute directory.
pub fn find_ignore_file(start_dir: &Path, file_name: &str) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}

/// Test `path` against the rules in `ignore_file`.
///
/// The file is read on every call. Use [`IgnoreMatcher`] to reuse parsed rules.
pub fn is_ignored(path: &Path, ignore_file: &Path) -> Result<bool, IgnoreError> {
    Ok(IgnoreRuleSet::load(ignore_file)?.is_ignored(path))
}

/// Why a path was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreMatch {
    pub rule_file: PathBuf,
    pub pattern: String,
}

/// Ignore lookups with per-directory caching.
///
/// Ignore files are assumed not to change while a matcher is alive.
#[derive(Debug)]
pub struct IgnoreMatcher {
    file_name: String,
    /// Directory → nearest ignore file (or none).
    resolved: HashMap<PathBuf, Option<PathBuf>>,
    /// Ignore file → parsed rules.
    rule_sets: HashMap<PathBuf, IgnoreRuleSet>,
}

impl IgnoreMatcher {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            resolved: HashMap::new(),
            rule_sets: HashMap::new(),
        }
    }

    /// Nearest ignore file for `dir`, cached.
    pub fn resolve(&mut self, dir: &Path) -> Option<PathBuf> {
        if let Some(cached) = self.resolved.get(dir) {
            return cached.clone();
        }
        let found = find_ignore_file(dir, &self.file_name);
        self.resolved.insert(dir.to_path_buf(), found.clone());
        found
    }

    /// Check `path` against the ignore file nearest to its parent directory.
    ///
    /// Returns `Ok(None)` when there is no ignore file or no rule matches.
    pub fn check(&mut self, path: &Path) -> Result<Option<IgnoreMatch>, IgnoreError> {
        let Some(dir) = path.parent() else {
            return Ok(None);
        };
        let Some(ignore_file) = self.resolve(dir) else {
            return Ok(None);
        };

        if !self.rule_sets.contains_key(&ignore_file) {
            let rules = IgnoreRuleSet::load(&ignore_file)?;
            tracing::debug!(
                "Loaded {} ignore rules from {}",
                rules.len(),
                ignore_file.display()
            );
            self.rule_sets.insert(ignore_file.clone(), rules);
        }

        let matched = self
            .rule_sets
            .get(&ignore_file)
            .and_then(|rules| rules.matching_rule(path))
            .map(|pattern| IgnoreMatch {
                rule_file: ignore_file.clone(),
                pattern: pattern.to_string(),
            });

        Ok(matched)
    }
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORE_FILE)
    }
}
