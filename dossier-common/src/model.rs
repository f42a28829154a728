//! Research data model: candidates in, per-source results out.
//!
//! Ordering is the provider's ranking order and is preserved end to end; a
//! run produces exactly one [`SourceResult`] per [`Candidate`].

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;

/// Summary used when a page yielded no text worth sending to the summarizer.
pub const NO_CONTENT_SUMMARY: &str = "No extractable content.";

/// A single search hit, taken verbatim from the provider response.
///
/// Missing fields come through as empty strings; an empty link is reported as
/// an extraction failure further down the line rather than filtered here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Plain text pulled from a page, hard-capped at a character budget.
///
/// The cap is counted in characters and never splits one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt(String);

impl Excerpt {
    /// Budget applied by the content extractor unless configured otherwise.
    pub const DEFAULT_MAX_CHARS: usize = 3000;

    /// Wrap `text`, cutting it at `max_chars` characters if it is longer.
    ///
    /// ```
    /// use dossier_common::Excerpt;
    ///
    /// let excerpt = Excerpt::bounded("héllo world", 5);
    /// assert_eq!(excerpt.as_str(), "héllo");
    /// ```
    pub fn bounded(text: impl Into<String>, max_chars: usize) -> Self {
        let mut text = text.into();
        if let Some((cut, _)) = text.char_indices().nth(max_chars) {
            text.truncate(cut);
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// True when there is nothing but whitespace to summarize.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Why a candidate's page could not be turned into an [`Excerpt`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{0}")]
    Fetch(String),
}

/// The summarization collaborator failed for one source.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SummarizationError(pub String);

/// Per-source failure kept alongside the source instead of aborting the run.
///
/// The display strings are what readers see in place of a summary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceFailure {
    #[error("Error extracting content: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Error summarizing: {0}")]
    Summarization(#[from] SummarizationError),
}

/// Per-candidate record aggregated into reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResult {
    pub title: String,
    pub link: String,
    pub outcome: Result<String, SourceFailure>,
}

impl SourceResult {
    pub fn new(candidate: Candidate, outcome: Result<String, SourceFailure>) -> Self {
        Self {
            title: candidate.title,
            link: candidate.link,
            outcome,
        }
    }

    /// Summary or human-readable failure, ready for display.
    pub fn summary_text(&self) -> Cow<'_, str> {
        match &self.outcome {
            Ok(summary) => Cow::Borrowed(summary.as_str()),
            Err(failure) => Cow::Owned(failure.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

impl Serialize for SourceResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SourceResult", 4)?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("link", &self.link)?;
        s.serialize_field("summary", self.summary_text().as_ref())?;
        s.serialize_field("failed", &self.is_failure())?;
        s.end()
    }
}

/// Input to the report renderer.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub query: String,
    pub sources: Vec<SourceResult>,
}

impl ReportRequest {
    pub fn new(query: impl Into<String>, sources: Vec<SourceResult>) -> Self {
        Self {
            query: query.into(),
            sources,
        }
    }
}
