//! Common types and utilities shared across Dossier crates.
//!
//! This crate defines the research data model, the typed per-source failures,
//! observability helpers, and the workspace error type. It is intentionally
//! lightweight so that every crate can depend on it without introducing heavy
//! transitive costs.
//!
//! # Overview
//!
//! - [`Candidate`]: one search hit (title + link) in provider ranking order
//! - [`Excerpt`]: bounded plain text pulled from a candidate's page
//! - [`SourceResult`]: the per-candidate record that ends up in a report
//! - [`ReportRequest`]: query plus the ordered results handed to the renderer
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`DossierError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use dossier_common::{Candidate, Excerpt, SourceResult};
//!
//! let candidate = Candidate::new("Rust", "https://www.rust-lang.org/");
//! let excerpt = Excerpt::bounded("a".repeat(5000), Excerpt::DEFAULT_MAX_CHARS);
//! assert_eq!(excerpt.char_count(), 3000);
//!
//! let result = SourceResult::new(candidate, Ok("- fast".to_string()));
//! assert_eq!(result.summary_text(), "- fast");
//! ```

pub mod model;
pub mod observability;

pub use model::{
    Candidate, Excerpt, ExtractionError, ReportRequest, SourceFailure, SourceResult,
    SummarizationError, NO_CONTENT_SUMMARY,
};

/// Error types used across the Dossier workspace.
///
/// Per-source failures never surface here; they are carried inside each
/// [`SourceResult`]. Only failures that stop a whole stage do.
#[derive(thiserror::Error, Debug)]
pub enum DossierError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The search collaborator failed, so there is nothing to aggregate.
    #[error("Source lookup failed: {0}")]
    Locator(String),

    /// A report representation could not be produced.
    #[error("Rendering failed: {0}")]
    Render(String),

    /// The run was abandoned before completion; partial results are discarded.
    #[error("Run cancelled")]
    Cancelled,
}

/// Convenient alias for results that use [`DossierError`].
pub type Result<T> = std::result::Result<T, DossierError>;
