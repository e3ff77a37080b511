use anyhow::Result;
use sift_search::{Location, RequestState, SearchView};
use std::io::Write;
use std::process::ExitCode;

/// Exit status when there is nothing to search for.
const EXIT_USAGE: u8 = 2;

/// Dispatch the entry location once and print the settled state.
pub async fn run(view: SearchView, entry: Option<Location>) -> Result<ExitCode> {
    let Some(state) = settle(view, entry).await? else {
        eprintln!("sift: --json needs a non-empty query (positional or --location)");
        return Ok(ExitCode::from(EXIT_USAGE));
    };
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &state)?;
    writeln!(out)?;
    Ok(ExitCode::SUCCESS)
}

/// `None` when `entry` carries no dispatchable query.
pub async fn settle(mut view: SearchView, entry: Option<Location>) -> Result<Option<RequestState>> {
    let Some(dispatch) = entry.and_then(|location| view.enter(location)) else {
        return Ok(None);
    };
    let state = dispatch.await?;
    tracing::info!(
        target: "app",
        ready = state.is_ready(),
        query = state.query().unwrap_or_default(),
        "app.headless.settled"
    );
    Ok(Some(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_search::provider::OfflineProvider;
    use sift_search::{OrchestratorConfig, SearchOrchestrator, synthesize};
    use std::sync::Arc;

    fn offline_view() -> SearchView {
        SearchView::new(Arc::new(SearchOrchestrator::new(
            Arc::new(OfflineProvider),
            OrchestratorConfig::default(),
        )))
    }

    #[tokio::test]
    async fn offline_search_settles_on_fallback() {
        let state = settle(offline_view(), Some(Location::parse("?q=cats")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.results(), Some(&synthesize("cats")));

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["results"]["organic_results"][0]["title"], "cats - Wikipedia");
    }

    #[tokio::test]
    async fn blank_entry_settles_nothing() {
        assert!(settle(offline_view(), None).await.unwrap().is_none());
        assert!(
            settle(offline_view(), Some(Location::parse("?q=%20")))
                .await
                .unwrap()
                .is_none()
        );
    }
}
