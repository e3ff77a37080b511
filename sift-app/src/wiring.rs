use anyhow::Result;
use sift_common::SiftError;
use sift_config::{ProviderSettings, SearchSettings, SiftConfig};
use sift_search::provider::{BraveProvider, OfflineProvider, RemoteProvider};
use sift_search::{OrchestratorConfig, SearchOrchestrator, SearchProvider, TitleSink};
use std::sync::Arc;
use std::time::Duration;

pub fn build_provider(cfg: &SiftConfig) -> sift_common::Result<Arc<dyn SearchProvider>> {
    let provider: Arc<dyn SearchProvider> = match &cfg.provider {
        ProviderSettings::Offline => Arc::new(OfflineProvider),
        ProviderSettings::Brave { config } => Arc::new(
            BraveProvider::with_endpoint(&config.auth_token, &config.endpoint)
                .map_err(|e| SiftError::Config(format!("brave provider: {e}")))?,
        ),
        ProviderSettings::Remote { config } => Arc::new(
            RemoteProvider::new(&config.endpoint, config.auth_token.clone()).map_err(|e| {
                SiftError::Config(format!("remote provider at {:?}: {e}", config.endpoint))
            })?,
        ),
    };
    Ok(provider)
}

pub fn orchestrator_config(settings: &SearchSettings) -> OrchestratorConfig {
    OrchestratorConfig {
        limit: settings.limit,
        timeout: Duration::from_secs(settings.timeout_secs),
        title_suffix: settings.title_suffix.clone(),
    }
}

pub fn build_orchestrator(cfg: &SiftConfig, title: Arc<dyn TitleSink>) -> Result<SearchOrchestrator> {
    let provider = build_provider(cfg)?;
    Ok(SearchOrchestrator::new(provider, orchestrator_config(&cfg.search)).with_title_sink(title))
}
