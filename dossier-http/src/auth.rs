use crate::HttpError;
use reqwest::header::HeaderValue;
use std::borrow::Cow;
use std::time::Duration;

/// How a request proves who it is.
///
/// ```
/// use dossier_http::Auth;
/// use std::borrow::Cow;
///
/// let serp = Auth::Query { name: "api_key", value: Cow::Borrowed("k") };
/// assert_eq!(serp.kind(), "query");
/// assert_eq!(Auth::Bearer("sk-...").kind(), "bearer");
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>` (OpenAI).
    Bearer(&'a str),
    /// A query parameter carrying the key (SerpAPI `api_key`).
    Query { name: &'a str, value: Cow<'a, str> },
}

impl Auth<'_> {
    /// Label safe to log in place of the credential.
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::Query { .. } => "query",
        }
    }
}

/// Per-call overrides; unset fields use the client's defaults.
///
/// ```
/// use dossier_http::RequestOpts;
/// use std::time::Duration;
///
/// let page_fetch = RequestOpts {
///     timeout: Some(Duration::from_secs(10)),
///     retries: Some(0),
///     allow_absolute: true,
///     ..Default::default()
/// };
/// assert!(page_fetch.auth.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
    /// Accept a full URL as the path, bypassing the client's base.
    pub allow_absolute: bool,
}

/// Normalise a pasted bearer token: outer quotes and any ASCII whitespace
/// are dropped, and the result must be a legal header value.
pub(crate) fn clean_bearer_token(raw: &str) -> Result<String, HttpError> {
    let token: String = raw
        .trim()
        .trim_matches(['"', '\''])
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if token.is_empty() {
        return Err(HttpError::Build("bearer token is empty".into()));
    }
    if !token.is_ascii() || token.bytes().any(|b| b.is_ascii_control()) {
        return Err(HttpError::Build(
            "bearer token must be printable ASCII".into(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| HttpError::Build(format!("bearer token rejected: {e}")))?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pasted_tokens_are_cleaned() {
        assert_eq!(clean_bearer_token(" 'sk-abc\n123' ").unwrap(), "sk-abc123");
        assert_eq!(clean_bearer_token("\"sk-x\"").unwrap(), "sk-x");
    }

    #[test]
    fn unusable_tokens_are_rejected() {
        assert!(clean_bearer_token("  ").is_err());
        assert!(clean_bearer_token("''").is_err());
        assert!(clean_bearer_token("sk-ünïcode").is_err());
        assert!(clean_bearer_token("sk-\u{7f}").is_err());
    }
}
