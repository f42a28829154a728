//! Page fetch and paragraph extraction.
//!
//! Only `<p>` text is kept: each paragraph has its whitespace collapsed,
//! paragraphs are joined with a single space, and the result is bounded to
//! the configured number of characters.

use async_trait::async_trait;
use dossier_common::{Excerpt, ExtractionError};
use dossier_config::ExtractConfig;
use dossier_http::{HttpClient, RequestOpts};
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use url::Url;

/// Fetches a candidate's page and reduces it to a bounded excerpt.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, link: &str) -> Result<Excerpt, ExtractionError>;
}

#[derive(Clone)]
pub struct HttpContentExtractor {
    http: HttpClient,
    timeout: Duration,
    max_chars: usize,
}

impl HttpContentExtractor {
    pub fn new(config: &ExtractConfig) -> Result<Self, ExtractionError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = HttpClient::unanchored()
            .and_then(|c| c.with_user_agent(&config.user_agent))
            .map_err(|e| ExtractionError::Fetch(e.to_string()))?
            .with_timeout(timeout)
            .with_retries(0);
        Ok(Self {
            http,
            timeout,
            max_chars: config.max_chars,
        })
    }
}

#[async_trait]
impl ContentExtractor for HttpContentExtractor {
    async fn extract(&self, link: &str) -> Result<Excerpt, ExtractionError> {
        let url = parse_link(link)?;
        let started = Instant::now();
        tracing::debug!(target: "web.extract", url = %url, "extract.fetch.start");

        let html = self
            .http
            .get_text(
                url.as_str(),
                RequestOpts {
                    timeout: Some(self.timeout),
                    retries: Some(0),
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| {
                tracing::warn!(
                    target: "web.extract",
                    url = %url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "extract.fetch.error"
                );
                ExtractionError::Fetch(e.to_string())
            })?;

        let excerpt = Excerpt::bounded(paragraph_text(&html), self.max_chars);
        tracing::info!(
            target: "web.extract",
            url = %url,
            html_bytes = html.len(),
            excerpt_chars = excerpt.char_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "extract.fetch.success"
        );
        Ok(excerpt)
    }
}

fn parse_link(link: &str) -> Result<Url, ExtractionError> {
    let invalid = |reason: String| ExtractionError::InvalidUrl {
        url: link.to_string(),
        reason,
    };
    if link.trim().is_empty() {
        return Err(invalid("empty link".into()));
    }
    let url = Url::parse(link.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// Text of every `<p>` element, in document order, joined by single spaces.
pub fn paragraph_text(html: &str) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(|p| {
            // Text nodes abut: `<b>Rust</b>acean` is one word.
            let raw: String = p.text().collect();
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
