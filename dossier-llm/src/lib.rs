//! Provider‑agnostic LLM integration for Dossier.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and the OpenAI
//! chat-completions client used as the summarization collaborator. It also
//! provides a convenience function to build a client from the shared
//! [`dossier_config::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use dossier_config::LlmConfig;
//! use dossier_llm::ensure_llm_ready;
//!
//! let cfg = LlmConfig {
//!     auth_token: "sk-...".into(),
//!     ..LlmConfig::default()
//! };
//! let client = ensure_llm_ready(&cfg).expect("client builds");
//! assert_eq!(client.model_name(), "gpt-4o-mini");
//! ```
pub mod openai;
pub mod traits;

use dossier_common::DossierError;
use dossier_config::{LlmConfig, LlmProvider};
use openai::OpenAiClient;
use std::sync::Arc;
use traits::LlmClient;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Build the configured LLM client.
///
/// Credentials are checked here so a missing key fails at startup rather
/// than once per source.
pub fn ensure_llm_ready(
    config: &LlmConfig,
) -> dossier_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config.provider {
        LlmProvider::Openai => {
            if config.auth_token.trim().is_empty() {
                return Err(DossierError::Config(
                    "llm.auth_token is not set (export OPENAI_API_KEY or set DOSSIER__LLM__AUTH_TOKEN)"
                        .to_string(),
                ));
            }
            let model = if config.model.trim().is_empty() {
                DEFAULT_OPENAI_MODEL.to_string()
            } else {
                config.model.clone()
            };
            let client =
                OpenAiClient::with_endpoint(config.auth_token.clone(), model, &config.endpoint)
                    .map_err(|e| DossierError::Config(e.to_string()))?;
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_a_config_error() {
        let err = ensure_llm_ready(&LlmConfig::default()).err().unwrap();
        assert!(matches!(err, DossierError::Config(_)));
    }

    #[test]
    fn blank_model_falls_back_to_default() {
        let cfg = LlmConfig {
            auth_token: "sk-test".into(),
            model: " ".into(),
            ..LlmConfig::default()
        };
        let client = ensure_llm_ready(&cfg).unwrap();
        assert_eq!(client.model_name(), DEFAULT_OPENAI_MODEL);
    }
}
