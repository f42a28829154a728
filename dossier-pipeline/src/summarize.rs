use dossier_common::{Excerpt, NO_CONTENT_SUMMARY, SummarizationError};
use dossier_config::{LlmConfig, SummaryTone};
use dossier_llm::traits::{Completion, LlmClient};
use std::sync::Arc;

/// Turns one excerpt into a bullet-point summary focused on the query.
#[derive(Clone)]
pub struct SourceSummarizer {
    llm: Arc<dyn LlmClient + Send + Sync>,
    temperature: f32,
    max_tokens: u32,
    tone: Option<SummaryTone>,
}

impl SourceSummarizer {
    pub fn new(
        llm: Arc<dyn LlmClient + Send + Sync>,
        config: &LlmConfig,
        tone: Option<SummaryTone>,
    ) -> Self {
        Self {
            llm,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            tone,
        }
    }

    pub fn build_prompt(&self, excerpt: &str, query: &str) -> String {
        let mut prompt = format!(
            "Summarize the following content relevant to the query: '{query}'.\n\
             Provide key points, facts, and insights in **bullet points**.\n\
             If there are debates or pros/cons, include them.\n"
        );
        if let Some(tone) = self.tone {
            prompt.push_str(&format!("Keep the tone of the summary {tone}.\n"));
        }
        prompt.push_str("\nContent:\n");
        prompt.push_str(excerpt);
        prompt
    }

    /// Blank excerpts short-circuit to [`NO_CONTENT_SUMMARY`] without a call.
    pub async fn summarize(
        &self,
        excerpt: &Excerpt,
        query: &str,
    ) -> Result<String, SummarizationError> {
        if excerpt.is_blank() {
            tracing::debug!(target: "pipeline.summarize", "summarize.skip.blank");
            return Ok(NO_CONTENT_SUMMARY.to_string());
        }

        let prompt = self.build_prompt(excerpt.as_str(), query);
        let response = self
            .llm
            .generate(
                Completion::new(&prompt)
                    .max_tokens(self.max_tokens)
                    .temperature(self.temperature),
            )
            .await
            .map_err(|e| {
                tracing::warn!(
                    target: "pipeline.summarize",
                    model = self.llm.model_name(),
                    error = %e,
                    "summarize.error"
                );
                SummarizationError(e.to_string())
            })?;

        tracing::debug!(
            target: "pipeline.summarize",
            model = self.llm.model_name(),
            tokens_used = ?response.tokens_used,
            "summarize.done"
        );
        Ok(response.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dossier_llm::traits::{LlmError, LlmResponse};

    struct Unreachable;

    #[async_trait]
    impl LlmClient for Unreachable {
        async fn generate(&self, _request: Completion<'_>) -> Result<LlmResponse, LlmError> {
            Err(LlmError::Api("model unavailable".into()))
        }

        fn model_name(&self) -> &str {
            "unreachable"
        }
    }

    struct Padded;

    #[async_trait]
    impl LlmClient for Padded {
        async fn generate(&self, _request: Completion<'_>) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse {
                text: "\n\n- first\n- second\n  \n".into(),
                model: None,
                tokens_used: None,
            })
        }

        fn model_name(&self) -> &str {
            "padded"
        }
    }

    fn summarizer(tone: Option<SummaryTone>) -> SourceSummarizer {
        SourceSummarizer::new(Arc::new(Unreachable), &LlmConfig::default(), tone)
    }

    #[test]
    fn base_prompt_layout() {
        let prompt = summarizer(None).build_prompt("page text", "rust async");
        assert_eq!(
            prompt,
            "Summarize the following content relevant to the query: 'rust async'.\n\
             Provide key points, facts, and insights in **bullet points**.\n\
             If there are debates or pros/cons, include them.\n\
             \n\
             Content:\n\
             page text"
        );
    }

    #[test]
    fn tone_adds_a_single_line() {
        let base = summarizer(None).build_prompt("x", "q");
        let toned = summarizer(Some(SummaryTone::Conversational)).build_prompt("x", "q");
        assert!(toned.contains("Keep the tone of the summary conversational.\n"));
        assert_eq!(toned.lines().count(), base.lines().count() + 1);
    }

    #[test]
    fn tone_line_reads_for_vowel_tones() {
        let toned = summarizer(Some(SummaryTone::Academic)).build_prompt("x", "q");
        assert!(toned.contains("Keep the tone of the summary academic.\n"));
        assert!(!toned.contains(" a academic"));
    }

    #[tokio::test]
    async fn collaborator_errors_become_summarization_errors() {
        let err = summarizer(None)
            .summarize(&Excerpt::bounded("some content", 3000), "q")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "provider rejected the request: model unavailable"
        );
    }

    #[tokio::test]
    async fn whitespace_excerpt_never_reaches_the_model() {
        let got = summarizer(None)
            .summarize(&Excerpt::bounded(" \t\n", 3000), "q")
            .await
            .unwrap();
        assert_eq!(got, NO_CONTENT_SUMMARY);
    }

    #[tokio::test]
    async fn surrounding_blank_lines_are_trimmed() {
        let got = SourceSummarizer::new(Arc::new(Padded), &LlmConfig::default(), None)
            .summarize(&Excerpt::bounded("content", 3000), "q")
            .await
            .unwrap();
        assert_eq!(got, "- first\n- second");
    }
}
