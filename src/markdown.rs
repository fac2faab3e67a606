//! Wrapping source files into Markdown documents.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extension of generated documentation files.
pub const DOC_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How a generated document is named after its source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocNaming {
    /// `a.go` → `a.go.md`. Sources that differ only by extension stay apart.
    #[default]
    Append,
    /// `a.go` → `a.md`.
    Replace,
}

impl DocNaming {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Replace => "replace",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "append" => Some(Self::Append),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }

    /// Sibling path for `source` ending in `.{suffix}`.
    pub fn derive(&self, source: &Path, suffix: &str) -> PathBuf {
        match self {
            Self::Append => {
                let mut name = source.as_os_str().to_os_string();
                name.push(".");
                name.push(suffix);
                PathBuf::from(name)
            }
            Self::Replace => source.with_extension(suffix),
        }
    }

    /// Path of the generated Markdown document for `source`.
    pub fn doc_path(&self, source: &Path) -> PathBuf {
        self.derive(source, DOC_EXTENSION)
    }
}

/// Extension of `path` without the leading dot, or `""`.
pub fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Fence `content` in a code block tagged `lang`.
///
/// Layout: `` ```lang\n\n<content>\n\n```\n ``
pub fn fence(lang: &str, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + lang.len() + 12);
    out.extend_from_slice(b"```");
    out.extend_from_slice(lang.as_bytes());
    out.extend_from_slice(b"\n\n");
    out.extend_from_slice(content);
    out.extend_from_slice(b"\n\n```\n");
    out
}

/// Writes each source file into a fenced Markdown sibling.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownPackager {
    naming: DocNaming,
}

impl MarkdownPackager {
    pub fn new(naming: DocNaming) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> DocNaming {
        self.naming
    }

    pub fn doc_path(&self, source: &Path) -> PathBuf {
        self.naming.doc_path(source)
    }

    /// Package `source` into its Markdown document.
    ///
    /// Returns `Ok(None)` without touching the filesystem when `source` is
    /// itself a Markdown document. The destination is always overwritten,
    /// which drops anything appended to it by an earlier run.
    pub fn package(&self, source: &Path) -> Result<Option<PathBuf>, PackageError> {
        let ext = extension_of(source);
        if ext == DOC_EXTENSION {
            return Ok(None);
        }

        let content = std::fs::read(source).map_err(|e| PackageError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;

        let dest = self.doc_path(source);
        std::fs::write(&dest, fence(ext, &content)).map_err(|e| PackageError::Write {
            path: dest.clone(),
            source: e,
        })?;

        Ok(Some(dest))
    }
}
