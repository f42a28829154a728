//! In-memory collaborators for pipeline tests.
#![allow(dead_code)]

use async_trait::async_trait;
use dossier_common::{Candidate, Excerpt, ExtractionError};
use dossier_config::LlmConfig;
use dossier_llm::traits::{Completion, LlmClient, LlmError, LlmResponse};
use dossier_pipeline::{AggregationPipeline, SourceSummarizer};
use dossier_web::{ContentExtractor, SearchError, SourceLocator};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct FakeLocator {
    pub candidates: Vec<Candidate>,
    pub fail_with: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeLocator {
    pub fn returning(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            candidates: Vec::new(),
            fail_with: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SourceLocator for FakeLocator {
    async fn locate(&self, _query: &str, count: u32) -> Result<Vec<Candidate>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.fail_with {
            return Err(SearchError::Provider(msg.clone()));
        }
        Ok(self
            .candidates
            .iter()
            .take(count as usize)
            .cloned()
            .collect())
    }
}

/// Serves canned page text per link; unknown links fail like a dead host.
#[derive(Default)]
pub struct FakeExtractor {
    pub pages: HashMap<String, Result<String, ExtractionError>>,
    pub delays: HashMap<String, Duration>,
}

impl FakeExtractor {
    pub fn page(mut self, link: &str, text: &str) -> Self {
        self.pages.insert(link.to_string(), Ok(text.to_string()));
        self
    }

    pub fn broken(mut self, link: &str, error: ExtractionError) -> Self {
        self.pages.insert(link.to_string(), Err(error));
        self
    }

    pub fn delayed(mut self, link: &str, delay: Duration) -> Self {
        self.delays.insert(link.to_string(), delay);
        self
    }
}

#[async_trait]
impl ContentExtractor for FakeExtractor {
    async fn extract(&self, link: &str) -> Result<Excerpt, ExtractionError> {
        if let Some(delay) = self.delays.get(link) {
            tokio::time::sleep(*delay).await;
        }
        match self.pages.get(link) {
            Some(Ok(text)) => Ok(Excerpt::bounded(text.clone(), 3000)),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ExtractionError::Fetch(format!("connection refused: {link}"))),
        }
    }
}

/// Answers with a bullet built from the prompt's content section.
#[derive(Default)]
pub struct EchoLlm {
    pub calls: AtomicUsize,
    pub prompts: std::sync::Mutex<Vec<String>>,
    /// Content containing this marker makes the call fail.
    pub fail_marker: Option<String>,
}

impl EchoLlm {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for EchoLlm {
    async fn generate(&self, request: Completion<'_>) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.to_string());
        }
        let content = request.prompt.rsplit("Content:\n").next().unwrap_or_default();
        if let Some(marker) = &self.fail_marker {
            if content.contains(marker.as_str()) {
                return Err(LlmError::Api("quota exceeded".into()));
            }
        }
        Ok(LlmResponse {
            text: format!("- {content}"),
            model: Some("echo".into()),
            tokens_used: Some(1),
        })
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

pub fn pipeline(
    locator: FakeLocator,
    extractor: FakeExtractor,
    llm: Arc<EchoLlm>,
) -> AggregationPipeline {
    let summarizer = SourceSummarizer::new(llm, &LlmConfig::default(), None);
    AggregationPipeline::new(Arc::new(locator), Arc::new(extractor), summarizer)
}

pub fn candidate(name: &str) -> Candidate {
    Candidate::new(
        format!("Title {name}"),
        format!("https://{}.example/page", name.to_lowercase()),
    )
}
