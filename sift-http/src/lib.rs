//! JSON-over-HTTP client used by the search providers.
//!
//! One entry point, [`HttpClient::get_json`], with per-call [`RequestOpts`]
//! (timeout, retries, [`Auth`], extra headers, query pairs). Transient
//! failures (network errors, 429, 5xx) are retried under a [`RetryPolicy`];
//! everything else is surfaced as an [`HttpError`] right away.
//!
//! ```no_run
//! # async fn demo() -> Result<(), sift_http::HttpError> {
//! let client = sift_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", sift_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Every call gets a UUID request id that tags its `tracing` events
//! (`http.request.start`, `http.response`, `http.retrying`, `http.error`).
//! Credential values never reach the log and secret-looking query params are
//! logged as `<redacted>`.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

const SNIPPET_CHARS: usize = 500;
const REDACTED: &str = "<redacted>";
const SECRET_PARAMS: &[&str] = &[
    "access_token",
    "api_key",
    "apikey",
    "auth",
    "authorization",
    "bearer",
    "client_secret",
    "key",
    "secret",
    "token",
];

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

/// How a request authenticates.
///
/// ```
/// use sift_http::Auth;
/// use reqwest::header::{HeaderName, HeaderValue};
///
/// let brave = Auth::Header {
///     name: HeaderName::from_static("x-subscription-token"),
///     value: HeaderValue::from_static("demo"),
/// };
/// assert!(matches!(brave, Auth::Header { .. }));
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>`. Quotes and whitespace are stripped first.
    Bearer(&'a str),
    /// A provider-specific header, e.g. `X-Subscription-Token`.
    Header { name: HeaderName, value: HeaderValue },
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::Header { .. } => "header",
            Auth::None => "none",
        }
    }

    fn header(&self) -> Result<Option<(HeaderName, HeaderValue)>, HttpError> {
        match self {
            Auth::Bearer(raw) => {
                let token = clean_token(raw)?;
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
                value.set_sensitive(true);
                Ok(Some((AUTHORIZATION, value)))
            }
            Auth::Header { name, value } => Ok(Some((name.clone(), value.clone()))),
            Auth::None => Ok(None),
        }
    }
}

/// Per-request overrides; `None` falls back to the client's settings.
///
/// ```
/// use sift_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(3)),
///     query: Some(vec![("q", Cow::Borrowed("rust"))]),
///     ..Default::default()
/// };
/// assert_eq!(opts.retries, None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

/// Exponential backoff for transient failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    /// Minimum wait after a 429 without `Retry-After`.
    pub rate_limit_floor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(200),
            rate_limit_floor: Duration::from_millis(1100),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(16) as u32;
        self.base_delay.saturating_mul(1 << shift)
    }

    /// Wait before retrying a response, or `None` if `status` is final.
    fn delay_for(&self, attempt: usize, status: StatusCode, headers: &HeaderMap) -> Option<Duration> {
        let rate_limited = status == StatusCode::TOO_MANY_REQUESTS;
        if !rate_limited && !status.is_server_error() {
            return None;
        }
        if let Some(wait) = retry_after(headers) {
            return Some(wait);
        }
        let delay = self.backoff(attempt);
        Some(if rate_limited {
            delay.max(self.rate_limit_floor)
        } else {
            delay
        })
    }
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Client rooted at `base`; paths passed to [`get_json`](Self::get_json)
    /// are resolved against it.
    ///
    /// ```
    /// use sift_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.timeout(), Duration::from_secs(15));
    /// assert_eq!(client.retry_policy().max_retries, 2);
    /// assert!(HttpClient::new("not a url").is_err());
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: usize) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// GET `path` and decode the JSON body. `""` targets the base URL itself.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let auth = opts.auth.unwrap_or(Auth::None);
        let auth_header = auth.header()?;
        let pairs: Vec<(&str, &str)> = opts
            .query
            .iter()
            .flatten()
            .map(|(k, v)| (*k, v.as_ref()))
            .collect();
        let timeout = opts.timeout.unwrap_or(self.timeout);
        let max_retries = opts.retries.unwrap_or(self.retry.max_retries);
        let req_id = Uuid::new_v4();
        let mut attempt = 0;

        loop {
            let mut request = self.inner.get(url.clone()).timeout(timeout);
            if !pairs.is_empty() {
                request = request.query(&pairs);
            }
            if let Some(headers) = &opts.headers {
                request = request.headers(headers.clone());
            }
            if let Some((name, value)) = &auth_header {
                request = request.header(name.clone(), value.clone());
            }

            tracing::debug!(
                target: "http",
                %req_id,
                attempt = attempt + 1,
                max_retries,
                url = %format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                query = ?redacted(&pairs),
                timeout_ms = timeout.as_millis() as u64,
                auth = auth.kind(),
                "http.request.start"
            );

            let started = Instant::now();
            let (status, headers, body) = match receive(request).await {
                Ok(parts) => parts,
                Err(message) if attempt < max_retries => {
                    attempt += 1;
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        target: "http",
                        %req_id,
                        attempt,
                        backoff_ms = delay.as_millis() as u64,
                        %message,
                        "http.retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(message) => {
                    tracing::warn!(target: "http", %req_id, attempt, %message, "http.error");
                    return Err(HttpError::Network(message));
                }
            };
            let server_id = server_request_id(&headers);

            tracing::debug!(
                target: "http",
                %req_id,
                %status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                bytes = body.len(),
                server_id = server_id.unwrap_or("-"),
                "http.response"
            );

            if status.is_success() {
                return serde_json::from_slice(&body).map_err(|e| {
                    let body_snippet = snippet(&body);
                    tracing::warn!(
                        target: "http",
                        %req_id,
                        error = %e,
                        body_snippet = %body_snippet,
                        "http.decode_error"
                    );
                    HttpError::Decode(e.to_string(), body_snippet)
                });
            }

            let message = error_message(&body);
            if attempt < max_retries {
                if let Some(delay) = self.retry.delay_for(attempt + 1, status, &headers) {
                    attempt += 1;
                    tracing::warn!(
                        target: "http",
                        %req_id,
                        %status,
                        attempt,
                        backoff_ms = delay.as_millis() as u64,
                        %message,
                        "http.retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            tracing::warn!(target: "http", %req_id, %status, %message, "http.error");
            return Err(HttpError::Api {
                status,
                message,
                request_id: server_id.map_or_else(|| req_id.to_string(), str::to_owned),
            });
        }
    }
}

async fn receive(
    request: reqwest::RequestBuilder,
) -> Result<(StatusCode, HeaderMap, Vec<u8>), String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await.map_err(|e| e.to_string())?;
    Ok((status, headers, body.to_vec()))
}

fn server_request_id(headers: &HeaderMap) -> Option<&str> {
    ["x-request-id", "x-correlation-id"]
        .into_iter()
        .find_map(|name| headers.get(name)?.to_str().ok())
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    Some(Duration::from_secs(secs))
}

fn is_secret_param(name: &str) -> bool {
    SECRET_PARAMS.iter().any(|s| s.eq_ignore_ascii_case(name))
}

fn redacted<'a>(pairs: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    pairs
        .iter()
        .map(|&(k, v)| (k, if is_secret_param(k) { REDACTED } else { v }))
        .collect()
}

/// Best human-readable message from an error body: `error.message`,
/// `error.detail`, then top-level `message`/`detail`/`error`, else the raw text.
fn error_message(body: &[u8]) -> String {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let found = parsed.as_ref().and_then(|json| {
        let nested = json.get("error").filter(|e| e.is_object());
        let candidates = match nested {
            Some(err) => [err.get("message"), err.get("detail"), None],
            None => [json.get("message"), json.get("detail"), json.get("error")],
        };
        candidates
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .find(|s| !s.is_empty())
    });
    match found {
        Some(message) => message.to_owned(),
        None => snippet(body),
    }
}

fn snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}

fn clean_token(raw: &str) -> Result<String, HttpError> {
    let token: String = raw
        .trim()
        .trim_matches(['"', '\''])
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if token.is_empty() {
        return Err(HttpError::Build("bearer token is empty".into()));
    }
    if let Some(bad) = token.chars().find(|c| !c.is_ascii() || c.is_ascii_control()) {
        return Err(HttpError::Build(format!(
            "bearer token contains invalid character {bad:?}"
        )));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
        assert_eq!(policy.backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn only_transient_statuses_are_retried() {
        let policy = RetryPolicy::default();
        let none = HeaderMap::new();
        assert_eq!(policy.delay_for(1, StatusCode::NOT_FOUND, &none), None);
        assert_eq!(
            policy.delay_for(1, StatusCode::BAD_GATEWAY, &none),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            policy.delay_for(1, StatusCode::TOO_MANY_REQUESTS, &none),
            Some(Duration::from_millis(1100))
        );

        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(
            policy.delay_for(1, StatusCode::TOO_MANY_REQUESTS, &headers),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn secret_params_are_redacted() {
        let out = redacted(&[("q", "rust"), ("API_KEY", "hunter2")]);
        assert_eq!(out, vec![("q", "rust"), ("API_KEY", REDACTED)]);
    }

    #[test]
    fn error_message_prefers_structured_fields() {
        assert_eq!(
            error_message(br#"{"error":{"message":"quota exceeded"}}"#),
            "quota exceeded"
        );
        assert_eq!(error_message(br#"{"detail":"bad query"}"#), "bad query");
        assert_eq!(error_message(br#"{"error":"denied"}"#), "denied");
        assert_eq!(error_message(b"plain text"), "plain text");
    }

    #[test]
    fn snippet_is_truncated_by_characters() {
        let body = "é".repeat(SNIPPET_CHARS + 100);
        let snip = snippet(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert_eq!(snip.chars().count(), SNIPPET_CHARS + 3);
    }

    #[test]
    fn bearer_tokens_are_cleaned() {
        assert_eq!(clean_token(" 'abc def' ").unwrap(), "abcdef");
        assert!(clean_token("   ").is_err());
        assert!(clean_token("clé").is_err());
    }
}
