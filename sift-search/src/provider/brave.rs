use super::{ProviderError, SearchProvider};
use crate::types::{QuestionAnswer, SearchOptions, SearchResult, SearchResultSet, Vertical};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use sift_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;
use std::time::Instant;
use url::Url;

pub const BRAVE_BASE: &str = "https://api.search.brave.com";
const WEB_SEARCH_PATH: &str = "res/v1/web/search";
const MAX_COUNT: u32 = 20;
const MAX_OFFSET: u32 = 9;

/// Brave Search web endpoint.
#[derive(Clone)]
pub struct BraveProvider {
    http: HttpClient,
    token: HeaderValue,
}

impl BraveProvider {
    pub fn new(subscription_token: &str) -> Result<Self, ProviderError> {
        Self::with_endpoint(subscription_token, BRAVE_BASE)
    }

    pub fn with_endpoint(subscription_token: &str, endpoint: &str) -> Result<Self, ProviderError> {
        let token = subscription_token.trim();
        if token.is_empty() {
            return Err(ProviderError::Unavailable(
                "brave subscription token is empty".into(),
            ));
        }
        let mut token =
            HeaderValue::from_str(token).map_err(|e| HttpError::Build(e.to_string()))?;
        token.set_sensitive(true);
        Ok(Self {
            http: HttpClient::new(endpoint)?,
            token,
        })
    }
}

#[async_trait]
impl SearchProvider for BraveProvider {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResultSet, ProviderError> {
        let count = options.limit.clamp(1, MAX_COUNT);
        let offset = options.page.saturating_sub(1).min(MAX_OFFSET);
        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("q", Cow::Borrowed(query)),
            ("count", Cow::Owned(count.to_string())),
            ("offset", Cow::Owned(offset.to_string())),
            ("safesearch", Cow::Borrowed("moderate")),
        ];
        if let Some(filter) = result_filter(options.vertical) {
            params.push(("result_filter", Cow::Borrowed(filter)));
        }

        let started = Instant::now();
        let resp: WebSearchResponse = self
            .http
            .get_json(
                WEB_SEARCH_PATH,
                RequestOpts {
                    auth: Some(Auth::Header {
                        name: HeaderName::from_static("x-subscription-token"),
                        value: self.token.clone(),
                    }),
                    query: Some(params),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    target: "search.provider",
                    provider = "brave",
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "search.provider.brave.error"
                );
            })?;

        let set = resp.into_result_set(options.vertical);
        tracing::info!(
            target: "search.provider",
            provider = "brave",
            vertical = options.vertical.as_param(),
            organic = set.organic_results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search.provider.brave.ok"
        );
        Ok(set)
    }
}

fn result_filter(vertical: Vertical) -> Option<&'static str> {
    match vertical {
        Vertical::News => Some("news"),
        Vertical::Videos => Some("videos"),
        Vertical::All | Vertical::Images | Vertical::Maps => Some("web,faq,query"),
    }
}

// Only the parts of the Brave response that end up in a result set.

#[derive(Debug, Default, Deserialize)]
struct WebSearchResponse {
    #[serde(default)]
    query: Option<QueryInfo>,
    #[serde(default)]
    web: Option<Hits>,
    #[serde(default)]
    news: Option<Hits>,
    #[serde(default)]
    videos: Option<Hits>,
    #[serde(default)]
    faq: Option<Faq>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryInfo {
    #[serde(default)]
    original: String,
    #[serde(default)]
    altered: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Hits {
    #[serde(default)]
    results: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    profile: Option<Profile>,
    #[serde(default)]
    meta_url: Option<MetaUrl>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetaUrl {
    #[serde(default)]
    hostname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Faq {
    #[serde(default)]
    results: Vec<FaqEntry>,
}

#[derive(Debug, Deserialize)]
struct FaqEntry {
    question: String,
    answer: String,
}

impl WebSearchResponse {
    fn into_result_set(self, vertical: Vertical) -> SearchResultSet {
        let hits = match vertical {
            Vertical::News => self.news.or(self.web),
            Vertical::Videos => self.videos.or(self.web),
            Vertical::All | Vertical::Images | Vertical::Maps => self.web,
        };
        let organic_results = hits
            .map(|h| h.results)
            .unwrap_or_default()
            .into_iter()
            .filter_map(Hit::into_result)
            .collect();

        let people_also_ask = self
            .faq
            .map(|f| f.results)
            .unwrap_or_default()
            .into_iter()
            .map(|qa| QuestionAnswer {
                question: strip_markup(&qa.question),
                answer: strip_markup(&qa.answer),
            })
            .collect();

        let related_searches = self
            .query
            .and_then(|q| {
                let altered = q.altered?;
                let altered = altered.trim();
                (!altered.is_empty() && altered != q.original.trim()).then(|| altered.to_string())
            })
            .into_iter()
            .collect();

        SearchResultSet {
            organic_results,
            related_searches,
            people_also_ask,
        }
    }
}

impl Hit {
    fn into_result(self) -> Option<SearchResult> {
        let link = self.url.filter(|u| !u.trim().is_empty())?;
        let source = self
            .profile
            .and_then(|p| p.name)
            .or_else(|| self.meta_url.and_then(|m| m.hostname))
            .or_else(|| Url::parse(&link).ok()?.host_str().map(str::to_string))
            .filter(|s| !s.is_empty());
        Some(SearchResult {
            title: strip_markup(self.title.as_deref().unwrap_or(&link)),
            snippet: strip_markup(self.description.as_deref().unwrap_or_default()),
            link,
            source,
        })
    }
}

/// Brave highlights matches with inline tags (`<strong>`); drop them and
/// decode HTML entities, named and numeric.
fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&out).into_owned()
}
