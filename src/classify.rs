//! Per-entry filter chain for the walk.
//!
//! Entries go through `ignored? → directory? → excluded extension?` and the
//! first predicate that holds decides. Only entries that pass all three are
//! packaged.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::ignore::IgnoreMatch;
use crate::markdown::{extension_of, DOC_EXTENSION};

/// Extension of module-definition files (`go.mod`).
pub const MODULE_DEFINITION_EXTENSION: &str = "mod";
/// Extension of dependency-lock files (`go.sum`).
pub const DEPENDENCY_LOCK_EXTENSION: &str = "sum";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Ignored { rule_file: PathBuf, pattern: String },
    ExcludedDir,
    Documentation,
    ModuleDefinition,
    DependencyLock,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored { rule_file, pattern } => {
                write!(f, "ignored by {:?} in {}", pattern, rule_file.display())
            }
            Self::ExcludedDir => write!(f, "excluded directory"),
            Self::Documentation => write!(f, "already a .{} document", DOC_EXTENSION),
            Self::ModuleDefinition => {
                write!(f, "module definition (.{})", MODULE_DEFINITION_EXTENSION)
            }
            Self::DependencyLock => write!(f, "dependency lock (.{})", DEPENDENCY_LOCK_EXTENSION),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    /// A directory: recurse, nothing to package.
    Descend,
    /// Package and enrich.
    Process,
}

/// Skip reason implied by the extension alone, if any.
pub fn extension_skip(path: &Path) -> Option<SkipReason> {
    match extension_of(path) {
        DOC_EXTENSION => Some(SkipReason::Documentation),
        MODULE_DEFINITION_EXTENSION => Some(SkipReason::ModuleDefinition),
        DEPENDENCY_LOCK_EXTENSION => Some(SkipReason::DependencyLock),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathClassifier {
    exclude_dirs: Vec<String>,
}

impl PathClassifier {
    pub fn new(exclude_dirs: Vec<String>) -> Self {
        Self { exclude_dirs }
    }

    /// Whether `path` is a directory the walk never enters.
    pub fn is_excluded_dir(&self, path: &Path, is_dir: bool) -> bool {
        is_dir
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| self.exclude_dirs.iter().any(|d| d == name))
    }

    pub fn classify(&self, path: &Path, is_dir: bool, ignored: Option<IgnoreMatch>) -> Decision {
        if let Some(IgnoreMatch { rule_file, pattern }) = ignored {
            return Decision::Skip(SkipReason::Ignored { rule_file, pattern });
        }
        if is_dir {
            return Decision::Descend;
        }
        match extension_skip(path) {
            Some(reason) => Decision::Skip(reason),
            None => Decision::Process,
        }
    }
}
