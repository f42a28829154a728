//! Log-safe views of requests and responses.

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use std::borrow::Cow;

pub(crate) const RAW_ENV: &str = "DOSSIER_HTTP_RAW";
/// Raw body dumps stop after this many bytes.
pub(crate) const RAW_BODY_LIMIT: usize = 64 * 1024;

const SECRET_PARAMS: &[&str] = &[
    "api_key",
    "apikey",
    "key",
    "access_token",
    "token",
    "auth",
    "authorization",
    "bearer",
    "secret",
    "client_secret",
];

const MASK: &str = "<redacted>";

pub(crate) fn raw_logging_enabled() -> bool {
    std::env::var(RAW_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

pub(crate) fn is_secret_param(name: &str) -> bool {
    SECRET_PARAMS
        .iter()
        .any(|secret| secret.eq_ignore_ascii_case(name))
}

pub(crate) fn masked_query(query: &[(&str, Cow<'_, str>)]) -> Vec<(String, String)> {
    query
        .iter()
        .map(|(k, v)| {
            let shown = if is_secret_param(k) { MASK } else { v.as_ref() };
            (k.to_string(), shown.to_string())
        })
        .collect()
}

pub(crate) fn masked_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = match name.as_str() {
                "authorization" | "set-cookie" | "cookie" => MASK,
                _ => value.to_str().unwrap_or("<binary>"),
            };
            (name.as_str().to_string(), shown.to_string())
        })
        .collect()
}

/// A curl command that replays the request shape.
///
/// The query string is dropped entirely since it may carry a key; the body is
/// capped at [`RAW_BODY_LIMIT`].
pub(crate) fn curl_line(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let quote = |s: &str| format!("'{}'", s.replace('\'', r"'\''"));

    let mut bare = url.clone();
    bare.set_query(None);

    let mut cmd = format!("curl -X {method}");
    for (name, shown) in masked_headers(headers) {
        cmd.push_str(&format!(" -H {}", quote(&format!("{name}: {shown}"))));
    }
    match body.map(std::str::from_utf8) {
        Some(Ok(text)) => {
            let cut = text
                .char_indices()
                .map(|(i, _)| i)
                .take_while(|&i| i <= RAW_BODY_LIMIT)
                .last()
                .unwrap_or(0);
            let shown = if text.len() > RAW_BODY_LIMIT { &text[..cut] } else { text };
            cmd.push_str(&format!(" --data {}", quote(shown)));
        }
        Some(Err(_)) => cmd.push_str(" --data-binary @-"),
        None => {}
    }
    cmd.push(' ');
    cmd.push_str(&quote(bare.as_str()));
    cmd
}
