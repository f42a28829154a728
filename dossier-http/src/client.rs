use crate::auth::{Auth, RequestOpts, clean_bearer_token};
use crate::error::{HttpError, body_snippet, provider_message};
use crate::redact::{RAW_BODY_LIMIT, curl_line, masked_headers, masked_query, raw_logging_enabled};
use crate::retry::{backoff, delay_for, is_retryable};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use uuid::Uuid;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_RETRIES: usize = 2;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REDIRECTS: usize = 10;

/// `reqwest` client plus the defaults and policies shared by every call.
#[derive(Clone)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    user_agent: Option<HeaderValue>,
    timeout: Duration,
    retries: usize,
}

/// Everything needed to (re)send one logical request.
struct Prepared {
    req_id: String,
    method: Method,
    url: Url,
    query: Vec<(String, String)>,
    bearer: Option<String>,
    body: Option<Vec<u8>>,
    timeout: Duration,
    retries: usize,
    auth_kind: &'static str,
}

/// A 2xx response with its body read.
struct Delivered {
    req_id: String,
    body: Vec<u8>,
}

impl HttpClient {
    /// Client for one API; relative paths join onto `base`.
    ///
    /// ```
    /// use dossier_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.openai.com/v1/")?;
    /// assert_eq!(client.timeout(), Duration::from_secs(15));
    /// assert_eq!(client.retries(), 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(format!("{base:?}: {e}")))?;
        Self::build(Some(base))
    }

    /// Client without a base; every path must be a full URL.
    pub fn unanchored() -> Result<Self, HttpError> {
        Self::build(None)
    }

    fn build(base: Option<Url>) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        })
    }

    /// ```
    /// use dossier_http::HttpClient;
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::unanchored().unwrap().with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.timeout(), Duration::from_secs(2));
    /// ```
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Retries after the first attempt; 0 disables retrying.
    pub fn with_retries(self, retries: usize) -> Self {
        Self { retries, ..self }
    }

    /// Identify as `ua` on every request.
    pub fn with_user_agent(self, ua: &str) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(ua)
            .map_err(|e| HttpError::Build(format!("User-Agent {ua:?} rejected: {e}")))?;
        Ok(Self {
            user_agent: Some(value),
            ..self
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError> {
        let delivered = self.send(Method::GET, path, None, opts).await?;
        decode_json(delivered)
    }

    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|e| HttpError::Build(format!("serializing body: {e}")))?;
        let delivered = self.send(Method::POST, path, Some(payload), opts).await?;
        decode_json(delivered)
    }

    /// Body as text, invalid UTF-8 replaced. Meant for HTML pages.
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let delivered = self.send(Method::GET, path, None, opts).await?;
        Ok(String::from_utf8_lossy(&delivered.body).into_owned())
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        let joined = |base: &Url| base.join(path).map_err(|e| HttpError::Url(e.to_string()));
        let url = match &self.base {
            Some(base) if allow_absolute => Url::parse(path).or_else(|_| joined(base))?,
            Some(base) => joined(base)?,
            None => Url::parse(path).map_err(|e| HttpError::Url(format!("{path:?}: {e}")))?,
        };
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(HttpError::Url(format!("{other}:// is not fetchable"))),
        }
    }

    fn prepare(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        opts: RequestOpts<'_>,
    ) -> Result<(Prepared, Vec<(String, String)>), HttpError> {
        let url = self.resolve(path, opts.allow_absolute)?;
        let auth_kind = opts.auth.as_ref().map_or("none", Auth::kind);

        let mut query = opts.query.unwrap_or_default();
        let mut bearer = None;
        match opts.auth {
            Some(Auth::Query { name, value }) => query.push((name, value)),
            Some(Auth::Bearer(token)) => bearer = Some(clean_bearer_token(token)?),
            None => {}
        }
        let shown_query = masked_query(&query);
        let query = query
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.into_owned()))
            .collect();

        let prepared = Prepared {
            req_id: format!("r{}", Uuid::new_v4().simple()),
            method,
            url,
            query,
            bearer,
            body,
            timeout: opts.timeout.unwrap_or(self.timeout),
            retries: opts.retries.unwrap_or(self.retries),
            auth_kind,
        };
        Ok((prepared, shown_query))
    }

    fn request(&self, p: &Prepared) -> reqwest::RequestBuilder {
        let mut rb = self
            .inner
            .request(p.method.clone(), p.url.clone())
            .timeout(p.timeout);
        if !p.query.is_empty() {
            rb = rb.query(&p.query);
        }
        if let Some(ua) = &self.user_agent {
            rb = rb.header(USER_AGENT, ua.clone());
        }
        if let Some(token) = &p.bearer {
            rb = rb.bearer_auth(token);
        }
        if let Some(body) = &p.body {
            rb = rb
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }
        rb
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        opts: RequestOpts<'_>,
    ) -> Result<Delivered, HttpError> {
        let (p, shown_query) = self.prepare(method, path, body, opts)?;
        let endpoint = format!("{}{}", p.url.host_str().unwrap_or("-"), p.url.path());
        let mut retry = 0usize;

        loop {
            tracing::debug!(
                req_id = %p.req_id,
                attempt = retry + 1,
                retries = p.retries,
                method = %p.method,
                endpoint = %endpoint,
                query = ?shown_query,
                timeout_ms = p.timeout.as_millis() as u64,
                auth_kind = p.auth_kind,
                "http.request.start"
            );
            if raw_logging_enabled() {
                let mut shown = HeaderMap::new();
                if let Some(ua) = &self.user_agent {
                    shown.insert(USER_AGENT, ua.clone());
                }
                let curl = curl_line(&p.method, &p.url, &shown, p.body.as_deref());
                tracing::debug!(target: "http.raw", req_id = %p.req_id, %curl, "http.raw.request");
            }

            let started = Instant::now();
            let outcome = match self.request(&p).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    resp.bytes().await.map(|b| (status, headers, b.to_vec()))
                }
                Err(e) => Err(e),
            };

            let (status, headers, bytes) = match outcome {
                Ok(parts) => parts,
                Err(e) if e.is_timeout() => {
                    tracing::warn!(req_id = %p.req_id, endpoint = %endpoint, timeout_ms = p.timeout.as_millis() as u64, "http.timeout");
                    return Err(HttpError::Timeout(p.timeout));
                }
                Err(e) if retry < p.retries => {
                    retry += 1;
                    let delay = backoff(retry);
                    tracing::warn!(req_id = %p.req_id, retry, delay_ms = delay.as_millis() as u64, error = %e, "http.retry.transport");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(req_id = %p.req_id, endpoint = %endpoint, error = %e, "http.transport_error");
                    return Err(HttpError::Network(e.to_string()));
                }
            };

            let upstream_id = upstream_request_id(&headers);
            tracing::debug!(
                req_id = %p.req_id,
                %status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                body_len = bytes.len(),
                upstream_id = %upstream_id,
                "http.response"
            );
            if raw_logging_enabled() {
                let shown = &bytes[..bytes.len().min(RAW_BODY_LIMIT)];
                tracing::debug!(
                    target: "http.raw",
                    req_id = %p.req_id,
                    %status,
                    headers = ?masked_headers(&headers),
                    body = %String::from_utf8_lossy(shown),
                    truncated = bytes.len() > RAW_BODY_LIMIT,
                    "http.raw.response"
                );
            }

            if status.is_success() {
                return Ok(Delivered {
                    req_id: p.req_id,
                    body: bytes,
                });
            }

            let message = provider_message(&bytes);
            if is_retryable(status) && retry < p.retries {
                retry += 1;
                let delay = delay_for(status, &headers, retry);
                tracing::warn!(req_id = %p.req_id, %status, retry, delay_ms = delay.as_millis() as u64, message = %message, "http.retry.status");
                tokio::time::sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id = %p.req_id,
                endpoint = %endpoint,
                %status,
                upstream_id = %upstream_id,
                message = %message,
                "http.error"
            );
            return Err(api_error(status, message, upstream_id));
        }
    }
}

fn api_error(status: StatusCode, message: String, request_id: String) -> HttpError {
    HttpError::Api {
        status,
        message,
        request_id,
    }
}

fn upstream_request_id(headers: &HeaderMap) -> String {
    ["x-request-id", "x-correlation-id"]
        .iter()
        .find_map(|name| headers.get(*name)?.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

fn decode_json<T: DeserializeOwned>(delivered: Delivered) -> Result<T, HttpError> {
    serde_json::from_slice(&delivered.body).map_err(|e| {
        let snippet = body_snippet(&delivered.body);
        tracing::warn!(
            req_id = %delivered.req_id,
            line = e.line(),
            column = e.column(),
            error = %e,
            "http.response.decode_error"
        );
        HttpError::Decode {
            reason: e.to_string(),
            snippet,
        }
    })
}
