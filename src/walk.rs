//! Repository walk: filter, package and enrich every eligible file.
//!
//! Traversal is depth first in file-name order, one file at a time. A file's
//! packaging and enrichment finish before the next entry is visited.
//!
//! Per-file failures are collected into the [`WalkReport`] and the walk goes
//! on, unless `fail_fast` is set. In that case it stops at the first failure
//! and records where.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use walkdir::WalkDir;

use crate::classify::{Decision, PathClassifier, SkipReason};
use crate::config::WalkConfig;
use crate::enrich::Enricher;
use crate::ignore::IgnoreMatcher;
use crate::markdown::{extension_of, MarkdownPackager};

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Cannot walk {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Step at which a file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Traverse,
    Ignore,
    Package,
    Enrich,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traverse => "traverse",
            Self::Ignore => "ignore",
            Self::Package => "package",
            Self::Enrich => "enrich",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub stage: Stage,
    pub error: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path.display(), self.stage.as_str(), self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of one walk.
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    /// Generated documents, in traversal order.
    pub packaged: Vec<PathBuf>,
    /// Generated documents that also received a diagram.
    pub enriched: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
    pub failures: Vec<FileFailure>,
    /// Set when a fail-fast walk stopped early.
    pub halted_at: Option<PathBuf>,
}

impl WalkReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn skip_reason(&self, path: &Path) -> Option<&SkipReason> {
        self.skipped
            .iter()
            .find(|s| s.path == path)
            .map(|s| &s.reason)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} packaged, {} enriched, {} skipped, {} failed",
            self.packaged.len(),
            self.enriched.len(),
            self.skipped.len(),
            self.failures.len()
        )
    }
}

pub struct WalkPipeline {
    packager: MarkdownPackager,
    classifier: PathClassifier,
    ignore: IgnoreMatcher,
    enricher: Option<Arc<dyn Enricher>>,
    fail_fast: bool,
}

impl WalkPipeline {
    /// A pipeline that packages only. Add enrichment with [`Self::with_enricher`].
    pub fn new(config: &WalkConfig) -> Self {
        Self {
            packager: MarkdownPackager::new(config.naming),
            classifier: PathClassifier::new(config.exclude_dirs.clone()),
            ignore: IgnoreMatcher::new(config.ignore_file_name.clone()),
            enricher: None,
            fail_fast: config.fail_fast,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Walk `root` and transform every eligible file below it.
    ///
    /// Only an unusable root is an error; everything else ends up in the report.
    pub async fn run(&mut self, root: &Path) -> Result<WalkReport, WalkError> {
        // Absolute, so ignore lookup can climb above the root.
        let root = root.canonicalize().map_err(|source| WalkError::Root {
            path: root.to_path_buf(),
            source,
        })?;

        tracing::info!("Walking {}", root.display());
        let mut report = WalkReport::default();
        let mut walker = WalkDir::new(&root).sort_by_file_name().into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                    if self.fail(&mut report, path, Stage::Traverse, e.to_string()) {
                        break;
                    }
                    continue;
                }
            };

            // The root was chosen explicitly; only its contents are filtered.
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let is_dir = entry.file_type().is_dir();

            if self.classifier.is_excluded_dir(path, is_dir) {
                walker.skip_current_dir();
                self.skip(&mut report, path, SkipReason::ExcludedDir);
                continue;
            }

            let ignored = match self.ignore.check(path) {
                Ok(ignored) => ignored,
                Err(e) => {
                    if is_dir {
                        walker.skip_current_dir();
                    }
                    if self.fail(&mut report, path.to_path_buf(), Stage::Ignore, e.to_string()) {
                        break;
                    }
                    continue;
                }
            };

            match self.classifier.classify(path, is_dir, ignored) {
                Decision::Skip(reason) => {
                    if is_dir {
                        walker.skip_current_dir();
                    }
                    self.skip(&mut report, path, reason);
                }
                Decision::Descend => {}
                Decision::Process => {
                    if let Err(failure) = self.process(path, &mut report).await {
                        if self.fail(&mut report, failure.path, failure.stage, failure.error) {
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("Walk finished: {}", report.summary());
        Ok(report)
    }

    /// Package `path`, then enrich the result.
    async fn process(&self, path: &Path, report: &mut WalkReport) -> Result<(), FileFailure> {
        let failure = |stage: Stage, error: String| FileFailure {
            path: path.to_path_buf(),
            stage,
            error,
        };

        let dest = match self.packager.package(path) {
            Ok(Some(dest)) => dest,
            Ok(None) => return Ok(()),
            Err(e) => return Err(failure(Stage::Package, e.to_string())),
        };
        tracing::info!("Copying {} to {}", path.display(), dest.display());
        report.packaged.push(dest.clone());

        if let Some(enricher) = &self.enricher {
            enricher
                .enrich(&dest, extension_of(path))
                .await
                .map_err(|e| failure(Stage::Enrich, e.to_string()))?;
            report.enriched.push(dest);
        }

        Ok(())
    }

    fn skip(&self, report: &mut WalkReport, path: &Path, reason: SkipReason) {
        tracing::info!("Skipping {}: {}", path.display(), reason);
        report.skipped.push(Skipped {
            path: path.to_path_buf(),
            reason,
        });
    }

    /// Record a failure. Returns true when the walk should stop.
    fn fail(&self, report: &mut WalkReport, path: PathBuf, stage: Stage, error: String) -> bool {
        let failure = FileFailure { path, stage, error };
        tracing::warn!("Failed {}", failure);
        if self.fail_fast {
            report.halted_at = Some(failure.path.clone());
        }
        report.failures.push(failure);
        self.fail_fast
    }
}
