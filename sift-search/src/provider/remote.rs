use super::{ProviderError, SearchProvider};
use crate::types::{SearchOptions, SearchResultSet, Vertical};
use async_trait::async_trait;
use sift_http::{Auth, HttpClient, RequestOpts};
use std::borrow::Cow;

/// Generic JSON endpoint: `GET <endpoint>?q=…&limit=…[&vertical=…][&page=…]`
/// answering with a `SearchResultSet` body.
#[derive(Clone)]
pub struct RemoteProvider {
    http: HttpClient,
    auth_token: Option<String>,
}

impl RemoteProvider {
    pub fn new(endpoint: &str, auth_token: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::new(endpoint)?,
            auth_token: auth_token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.http.base().as_str()
    }
}

#[async_trait]
impl SearchProvider for RemoteProvider {
    fn name(&self) -> &str {
        "remote"
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResultSet, ProviderError> {
        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("q", Cow::Borrowed(query)),
            ("limit", Cow::Owned(options.limit.to_string())),
        ];
        if options.vertical != Vertical::All {
            params.push(("vertical", Cow::Borrowed(options.vertical.as_param())));
        }
        if options.page > 1 {
            params.push(("page", Cow::Owned(options.page.to_string())));
        }

        let opts = RequestOpts {
            retries: Some(0),
            auth: self.auth_token.as_deref().map(Auth::Bearer),
            query: Some(params),
            ..Default::default()
        };

        let set: SearchResultSet = self.http.get_json("", opts).await?;
        tracing::debug!(
            target: "search.provider",
            provider = "remote",
            organic = set.organic_results.len(),
            related = set.related_searches.len(),
            "search.provider.remote.ok"
        );
        Ok(set)
    }
}
