use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const SNIPPET_BYTES: usize = 1024;
const SNIPPET_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("could not build request: {0}")]
    Build(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("transport failure: {0}")]
    Network(String),
    #[error("unexpected response body ({reason}); starts with: {snippet}")]
    Decode { reason: String, snippet: String },
    #[error("upstream answered {status}: {message} [request id {request_id}]")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

/// Best human-readable message in an error body.
///
/// Understands `{"error":{"message":..}}` (OpenAI) and flat `error`,
/// `message` or `detail` strings (SerpAPI and most others); anything else
/// falls back to a body snippet.
pub(crate) fn provider_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorField {
        Nested { message: String },
        Flat(String),
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct Envelope {
        error: Option<ErrorField>,
        message: Option<String>,
        detail: Option<String>,
    }

    let env: Envelope = serde_json::from_slice(body).unwrap_or_default();
    let from_error = env.error.map(|e| match e {
        ErrorField::Nested { message } | ErrorField::Flat(message) => message,
    });
    [from_error, env.message, env.detail]
        .into_iter()
        .flatten()
        .find(|m| !m.is_empty())
        .unwrap_or_else(|| body_snippet(body))
}

/// First few hundred characters of a body, for logs and decode errors.
pub(crate) fn body_snippet(body: &[u8]) -> String {
    let head = String::from_utf8_lossy(&body[..body.len().min(SNIPPET_BYTES)]);
    match head.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &head[..cut]),
        None => head.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_and_flat_error_messages() {
        assert_eq!(
            provider_message(br#"{"error":{"message":"bad key","type":"auth"}}"#),
            "bad key"
        );
        assert_eq!(
            provider_message(br#"{"error":"Invalid API key."}"#),
            "Invalid API key."
        );
        assert_eq!(provider_message(br#"{"detail":"slow down"}"#), "slow down");
    }

    #[test]
    fn unstructured_bodies_fall_back_to_snippet() {
        assert_eq!(provider_message(b"plain failure"), "plain failure");
        assert_eq!(provider_message(br#"{"error":""}"#), r#"{"error":""}"#);
    }

    #[test]
    fn snippet_is_cut_on_char_boundary() {
        let body = "é".repeat(700);
        let snip = body_snippet(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert_eq!(snip.chars().count(), SNIPPET_CHARS + 3);
    }
}
