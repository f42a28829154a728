//! Shared HTTP plumbing for the search, page-fetch and LLM collaborators.
//!
//! One [`HttpClient`] wraps `reqwest` with:
//! - per-call [`RequestOpts`] (auth, query, timeout, retry budget)
//! - JSON helpers for APIs and a lossy-text helper for web pages
//! - retries on 429/5xx and transport errors, honouring `Retry-After`
//! - `tracing` events keyed by a per-call request id
//!
//! Credentials never reach the logs. Query parameters that look like secrets
//! are masked, bearer tokens are only reported by kind, and the opt-in raw
//! dump (`DOSSIER_HTTP_RAW=1`, target `http.raw`) drops the query string.
//!
//! ```no_run
//! # async fn demo() -> Result<(), dossier_http::HttpError> {
//! use dossier_http::{HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("https://api.example.com/v1/")?;
//! let items: serde_json::Value = client.get_json("items", RequestOpts::default()).await?;
//! # let _ = items;
//! # Ok(()) }
//! ```

mod auth;
mod client;
mod error;
mod redact;
mod retry;

pub use auth::{Auth, RequestOpts};
pub use client::HttpClient;
pub use error::HttpError;
