//! Per-file reports combining a feature record with its generated document.
//!
//! Expects `rover analyze` (and normally `rover docs`) to have run first.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::features::{record_path, FeatureRecord};
use crate::markdown::DocNaming;

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed feature record {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the report for `source` is written.
pub fn report_path(source: &Path, naming: DocNaming) -> PathBuf {
    naming.derive(source, "doctor.md")
}

/// Render the report body.
pub fn render_report(source: &Path, record: &FeatureRecord, document: Option<&str>) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());

    let mut out = String::new();
    out.push_str(&format!("# Doctor report: {}\n\n", name));
    out.push_str("## Structure\n\n");

    let mut empty = true;
    if !record.package_name.is_empty() {
        out.push_str(&format!("- **packageName**: `{}`\n", record.package_name));
        empty = false;
    }
    for (key, values) in record.categories() {
        if values.is_empty() {
            continue;
        }
        let listed: Vec<String> = values.iter().map(|v| format!("`{}`", v)).collect();
        out.push_str(&format!(
            "- **{}** ({}): {}\n",
            key,
            values.len(),
            listed.join(", ")
        ));
        empty = false;
    }
    if empty {
        out.push_str("_No structural features found._\n");
    }

    out.push_str("\n## Document\n\n");
    match document {
        Some(doc) => out.push_str(doc),
        None => out.push_str("_No generated document found._\n"),
    }
    out
}

/// Build and write the report for `source`. Returns the report path.
pub fn diagnose(source: &Path, naming: DocNaming) -> Result<PathBuf, DoctorError> {
    let json_path = record_path(source);
    let json = std::fs::read_to_string(&json_path).map_err(|e| DoctorError::Read {
        path: json_path.clone(),
        source: e,
    })?;
    let record: FeatureRecord =
        serde_json::from_str(&json).map_err(|e| DoctorError::Parse {
            path: json_path.clone(),
            source: e,
        })?;

    tracing::info!("Processing {}", json_path.display());
    tracing::info!("packageName: {:?}", record.package_name);
    for (key, values) in record.categories() {
        tracing::info!("{}: {:?}", key, values);
    }

    let doc_path = naming.doc_path(source);
    let document = match std::fs::read(&doc_path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("No generated document at {}", doc_path.display());
            None
        }
        Err(e) => {
            return Err(DoctorError::Read {
                path: doc_path,
                source: e,
            })
        }
    };

    let target = report_path(source, naming);
    std::fs::write(&target, render_report(source, &record, document.as_deref())).map_err(
        |e| DoctorError::Write {
            path: target.clone(),
            source: e,
        },
    )?;

    tracing::info!("Report written to {}", target.display());
    Ok(target)
}
