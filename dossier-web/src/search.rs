//! Source discovery through SerpAPI's Google engine.
//!
//! Titles and links are taken verbatim from `organic_results`, in ranking
//! order. Entries without a link are kept (with an empty link) so the
//! candidate list mirrors what the provider returned.

use async_trait::async_trait;
use dossier_common::Candidate;
use dossier_config::SearchConfig;
use dossier_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Instant;

pub const SERPAPI_BASE: &str = "https://serpapi.com/";

/// SerpAPI reports an empty result page through its `error` field.
const SERPAPI_NO_RESULTS: &str = "hasn't returned any results";

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] HttpError),

    #[error("search provider error: {0}")]
    Provider(String),

    #[error("search configuration error: {0}")]
    Config(String),
}

/// Turns a query into an ordered list of candidate sources.
#[async_trait]
pub trait SourceLocator: Send + Sync {
    /// Ask for at most `count` candidates; the provider may return fewer.
    async fn locate(&self, query: &str, count: u32) -> Result<Vec<Candidate>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Clone)]
pub struct SerpApiLocator {
    http: HttpClient,
    api_key: String,
}

impl SerpApiLocator {
    pub fn new(api_key: String) -> Result<Self, SearchError> {
        Self::with_endpoint(api_key, SERPAPI_BASE)
    }

    pub fn with_endpoint(api_key: String, endpoint: &str) -> Result<Self, SearchError> {
        if api_key.trim().is_empty() {
            return Err(SearchError::Config("SerpAPI key is empty".into()));
        }
        let base = if endpoint.ends_with('/') {
            endpoint.to_string()
        } else {
            format!("{endpoint}/")
        };
        let http = HttpClient::new(&base)?;
        Ok(Self { http, api_key })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::with_endpoint(config.api_key.clone(), &config.endpoint)
    }
}

#[async_trait]
impl SourceLocator for SerpApiLocator {
    async fn locate(&self, query: &str, count: u32) -> Result<Vec<Candidate>, SearchError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let query_snippet: String = if query.chars().count() > 160 {
            format!("{}…", query.chars().take(160).collect::<String>())
        } else {
            query.to_string()
        };
        let started = Instant::now();
        tracing::info!(target: "web.serpapi", query = %query_snippet, count, "search.serpapi.start");

        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("engine", "google".into()),
            ("q", query.into()),
            ("num", count.to_string().into()),
        ];

        let resp: SerpApiResponse = match self
            .http
            .get_json(
                "search.json",
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "api_key",
                        value: Cow::Borrowed(&self.api_key),
                    }),
                    query: Some(params),
                    retries: Some(1),
                    ..Default::default()
                },
            )
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(
                    target: "web.serpapi",
                    query = %query_snippet,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "search.serpapi.error"
                );
                return Err(e.into());
            }
        };

        if let Some(message) = resp.error {
            if message.contains(SERPAPI_NO_RESULTS) {
                tracing::info!(target: "web.serpapi", query = %query_snippet, "search.serpapi.empty");
                return Ok(Vec::new());
            }
            tracing::warn!(target: "web.serpapi", query = %query_snippet, error = %message, "search.serpapi.provider_error");
            return Err(SearchError::Provider(message));
        }

        let candidates: Vec<Candidate> = resp
            .organic_results
            .into_iter()
            .take(count as usize)
            .map(|r| Candidate {
                title: r.title.unwrap_or_default(),
                link: r.link.unwrap_or_default(),
            })
            .collect();

        tracing::info!(
            target: "web.serpapi",
            query = %query_snippet,
            hit_count = candidates.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search.serpapi.success"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            SerpApiLocator::new("".into()),
            Err(SearchError::Config(_))
        ));
    }

    #[test]
    fn organic_results_tolerate_missing_fields() {
        let resp: SerpApiResponse = serde_json::from_str(
            r#"{"organic_results":[{"title":"t1","link":"https://a"},{"title":"t2"},{"position":3}]}"#,
        )
        .unwrap();
        assert_eq!(resp.organic_results.len(), 3);
        assert!(resp.organic_results[1].link.is_none());
        assert!(resp.organic_results[2].title.is_none());
    }

    #[test]
    fn missing_organic_results_means_no_candidates() {
        let resp: SerpApiResponse = serde_json::from_str(r#"{"search_metadata":{}}"#).unwrap();
        assert!(resp.organic_results.is_empty());
        assert!(resp.error.is_none());
    }
}
