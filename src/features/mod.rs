//! Lexical feature extraction.
//!
//! A single pass over a file's lines, classifying each line with the rules in
//! [`rules`]. This is deliberately not a parser: multi-line constructs are
//! seen one line at a time, and the patterns may over- and under-match.
//!
//! # Record semantics
//!
//! - Every list keeps the first occurrence of each value, in scan order.
//! - `packageName` is overwritten by every matching line, so the last
//!   declaration wins.

mod rules;

use std::collections::HashSet;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use rules::{scan_line, Category};

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize feature record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Structural facts extracted from one file.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureRecord {
    pub package_name: String,
    pub imports: Vec<String>,
    pub structs: Vec<String>,
    /// Declared types of `var` declarations, not their names.
    pub variables: Vec<String>,
    /// Declared types of `const` declarations, not their names.
    pub constants: Vec<String>,
    pub comments: Vec<String>,
    pub interfaces: Vec<String>,
    /// `Receiver.method` pairs.
    pub methods: Vec<String>,
    pub channels: Vec<String>,
    /// Flattened `(a, b, f)` triples from `a, b := f(...)`.
    pub error_handling: Vec<String>,
    pub type_assertions: Vec<String>,
    pub control_flow: Vec<String>,
    pub defer_statements: Vec<String>,
    pub panic_recover: Vec<String>,
    pub function_calls: Vec<String>,
}

impl FeatureRecord {
    /// Record one captured value. List categories append; the package name
    /// is replaced.
    pub fn push(&mut self, category: Category, value: String) {
        let list = match category {
            Category::PackageName => {
                self.package_name = value;
                return;
            }
            Category::Imports => &mut self.imports,
            Category::Comments => &mut self.comments,
            Category::Structs => &mut self.structs,
            Category::Variables => &mut self.variables,
            Category::Constants => &mut self.constants,
            Category::Interfaces => &mut self.interfaces,
            Category::Channels => &mut self.channels,
            Category::ErrorHandling => &mut self.error_handling,
            Category::TypeAssertions => &mut self.type_assertions,
            Category::ControlFlow => &mut self.control_flow,
            Category::DeferStatements => &mut self.defer_statements,
            Category::PanicRecover => &mut self.panic_recover,
            Category::Methods => &mut self.methods,
            Category::FunctionCalls => &mut self.function_calls,
        };
        list.push(value);
    }

    /// List categories with their serialized keys, in key order.
    pub fn categories(&self) -> [(&'static str, &[String]); 14] {
        [
            ("imports", self.imports.as_slice()),
            ("structs", self.structs.as_slice()),
            ("variables", self.variables.as_slice()),
            ("constants", self.constants.as_slice()),
            ("comments", self.comments.as_slice()),
            ("interfaces", self.interfaces.as_slice()),
            ("methods", self.methods.as_slice()),
            ("channels", self.channels.as_slice()),
            ("errorHandling", self.error_handling.as_slice()),
            ("typeAssertions", self.type_assertions.as_slice()),
            ("controlFlow", self.control_flow.as_slice()),
            ("deferStatements", self.defer_statements.as_slice()),
            ("panicRecover", self.panic_recover.as_slice()),
            ("functionCalls", self.function_calls.as_slice()),
        ]
    }

    fn lists_mut(&mut self) -> [&mut Vec<String>; 14] {
        [
            &mut self.imports,
            &mut self.structs,
            &mut self.variables,
            &mut self.constants,
            &mut self.comments,
            &mut self.interfaces,
            &mut self.methods,
            &mut self.channels,
            &mut self.error_handling,
            &mut self.type_assertions,
            &mut self.control_flow,
            &mut self.defer_statements,
            &mut self.panic_recover,
            &mut self.function_calls,
        ]
    }

    /// Drop repeated values from every list, keeping first occurrences.
    pub fn dedup(&mut self) {
        for list in self.lists_mut() {
            *list = dedup_preserving_order(std::mem::take(list));
        }
    }
}

/// Remove duplicates while keeping the position of each first occurrence.
pub fn dedup_preserving_order<T: Eq + Hash + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Scan `content` and build its deduplicated record.
pub fn extract(content: &str) -> FeatureRecord {
    let mut record = FeatureRecord::default();
    for line in content.lines() {
        for (category, value) in scan_line(line) {
            record.push(category, value);
        }
    }
    record.dedup();
    record
}

/// Where the record for `source` is written: `<source>.json`.
pub fn record_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

/// Analyze `source` and write its record as pretty JSON next to it.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn analyze_file(source: &Path) -> Result<(PathBuf, FeatureRecord), AnalyzeError> {
    let bytes = std::fs::read(source).map_err(|e| AnalyzeError::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    let record = extract(&String::from_utf8_lossy(&bytes));

    let json = serde_json::to_string_pretty(&record)?;
    let target = record_path(source);
    std::fs::write(&target, json).map_err(|e| AnalyzeError::Write {
        path: target.clone(),
        source: e,
    })?;

    tracing::info!("Analysis result written to {}", target.display());
    Ok((target, record))
}
