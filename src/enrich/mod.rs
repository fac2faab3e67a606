//! Diagram enrichment for generated documents.
//!
//! An [`Enricher`] reads a generated Markdown document, asks a
//! text-generation service for a diagram of it, and appends the reply as a
//! second fenced block. [`EnrichmentClient`] is the HTTP implementation.

mod client;
mod retry;
mod types;

use std::path::Path;

use async_trait::async_trait;

pub use client::*;
pub use retry::*;
pub use types::*;

#[async_trait]
pub trait Enricher: Send + Sync {
    /// Append a generated diagram to the document at `markdown_path`.
    ///
    /// `language` is the extension of the document's source file. Returns
    /// the diagram text that was appended.
    async fn enrich(&self, markdown_path: &Path, language: &str) -> Result<String, EnrichError>;
}
