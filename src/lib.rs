//! Rover turns a source tree into a Markdown documentation corpus.
//!
//! Two pipelines live here:
//!
//! - [`walk`]: walks a directory, filters entries through [`ignore`] and
//!   [`classify`], wraps each eligible file with [`markdown`] and appends an
//!   AI-generated diagram through [`enrich`].
//! - [`features`]: scans a single file line by line and records structural
//!   facts (imports, structs, methods, ...) as JSON. [`doctor`] combines that
//!   record with the generated Markdown into a report.

pub mod classify;
pub mod config;
pub mod doctor;
pub mod enrich;
pub mod features;
pub mod ignore;
pub mod markdown;
pub mod walk;
