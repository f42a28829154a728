//! Report rendering.
//!
//! Two representations of the same query and sources:
//! - [`render_markup`]: a Markdown report, one `##` section per source
//! - [`render_document`]: a paginated A4 PDF with clickable source links
//!
//! Per-source failures become display text here, at the rendering boundary.

pub mod document;
pub mod layout;
pub mod markup;

use dossier_common::DossierError;

pub use document::render_document;
pub use layout::{Block, split_summary};
pub use markup::render_markup;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("font unavailable: {0}")]
    Font(String),

    #[error("document assembly failed: {0}")]
    Document(String),
}

impl From<RenderError> for DossierError {
    fn from(e: RenderError) -> Self {
        DossierError::Render(e.to_string())
    }
}
