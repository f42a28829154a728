//! Query-to-sources orchestration.
//!
//! [`AggregationPipeline`] asks a [`dossier_web::SourceLocator`] for
//! candidates, then runs each one through a [`dossier_web::ContentExtractor`]
//! and the [`SourceSummarizer`]. Per-source failures stay attached to their
//! [`dossier_common::SourceResult`]; only a failed lookup aborts a run.

pub mod pipeline;
pub mod summarize;

pub use pipeline::AggregationPipeline;
pub use summarize::SourceSummarizer;
