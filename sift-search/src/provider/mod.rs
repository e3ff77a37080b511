//! The search backend capability.
//!
//! Providers are injected into the orchestrator as `Arc<dyn SearchProvider>`;
//! there is no global instance. Timeouts and panic capture are applied by the
//! orchestrator, so implementations only report their own failures.

mod brave;
mod remote;

pub use brave::BraveProvider;
pub use remote::RemoteProvider;

use crate::types::{SearchOptions, SearchResultSet};
use async_trait::async_trait;
use sift_http::HttpError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider panicked: {0}")]
    Panicked(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResultSet, ProviderError>;
}

/// Provider for running without a backend. Every call fails, so every
/// dispatch settles on synthesized results.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProvider;

#[async_trait]
impl SearchProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn search(
        &self,
        _query: &str,
        _options: &SearchOptions,
    ) -> Result<SearchResultSet, ProviderError> {
        Err(ProviderError::Unavailable("no search backend configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_provider_always_fails() {
        let err = OfflineProvider
            .search("cats", &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
