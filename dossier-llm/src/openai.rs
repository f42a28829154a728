use crate::traits::{Completion, LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use dossier_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        Self::with_endpoint(api_key, model, OPENAI_API_BASE)
    }

    /// Any OpenAI-compatible base URL, such as a gateway or a local mock.
    pub fn with_endpoint(api_key: String, model: String, endpoint: &str) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("OpenAI API key is empty".into()));
        }
        let base = if endpoint.ends_with('/') {
            endpoint.to_string()
        } else {
            format!("{endpoint}/")
        };
        let client = HttpClient::new(&base)
            .map_err(|e| LlmError::Config(format!("endpoint {endpoint:?}: {e}")))?
            .with_timeout(Duration::from_secs(60));

        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(&self, request: Completion<'_>) -> Result<LlmResponse, LlmError> {
        let system = request.system.map(|content| ChatMessage {
            role: "system",
            content,
        });
        let user = ChatMessage {
            role: "user",
            content: request.prompt,
        };
        let req = ChatCompletionRequest {
            model: &self.model,
            messages: system.into_iter().chain(Some(user)).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(
            target: "llm.openai",
            model = %self.model,
            prompt_chars = request.prompt.chars().count(),
            max_tokens = ?request.max_tokens,
            temperature = ?request.temperature,
            "llm.openai.generate.start"
        );

        let resp: ChatCompletionResponse = self
            .client
            .post_json(
                "chat/completions",
                &req,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.api_key)),
                    ..Default::default()
                },
            )
            .await
            .map_err(provider_error)?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Malformed("response contained no message content".into()))?;

        let tokens_used = resp.usage.and_then(|u| u.total_tokens);
        tracing::debug!(
            target: "llm.openai",
            model = ?resp.model,
            ?tokens_used,
            response_chars = text.chars().count(),
            "llm.openai.generate.done"
        );

        Ok(LlmResponse {
            text,
            model: resp.model,
            tokens_used,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Upstream refusals (auth, quota, bad request) become [`LlmError::Api`];
/// transport and decoding problems stay [`LlmError::Http`].
fn provider_error(err: HttpError) -> LlmError {
    match err {
        HttpError::Api {
            status, message, ..
        } => LlmError::Api(format!("{status}: {message}")),
        other => LlmError::Http(other),
    }
}
