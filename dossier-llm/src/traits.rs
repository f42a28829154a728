use async_trait::async_trait;
use dossier_http::HttpError;
use serde::{Deserialize, Serialize};

/// One single-turn completion.
///
/// ```
/// use dossier_llm::traits::Completion;
///
/// let req = Completion::new("Summarize X").temperature(0.3).max_tokens(500);
/// assert_eq!(req.max_tokens, Some(500));
/// assert!(req.system.is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Completion<'a> {
    pub prompt: &'a str,
    pub system: Option<&'a str>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl<'a> Completion<'a> {
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            system: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn system(self, system: &'a str) -> Self {
        Self {
            system: Some(system),
            ..self
        }
    }

    pub fn max_tokens(self, max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..self
        }
    }

    pub fn temperature(self, temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    /// Model the provider says it used, which may differ from the requested alias.
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("{0}")]
    Http(#[from] HttpError),

    #[error("provider rejected the request: {0}")]
    Api(String),

    #[error("malformed completion: {0}")]
    Malformed(String),

    #[error("LLM client misconfigured: {0}")]
    Config(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: Completion<'_>) -> Result<LlmResponse, LlmError>;

    /// Requested model, for logs.
    fn model_name(&self) -> &str;
}
