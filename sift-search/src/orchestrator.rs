//! Query dispatch: `Idle → Loading → Ready`, with stale-response protection.
//!
//! Each dispatch takes the next generation number and a fresh cancellation
//! token; starting a dispatch cancels the token of the one in flight. A
//! completion only commits if its generation is still the latest, so the
//! final state always belongs to the most recent query no matter how the
//! provider calls finish.
//!
//! Provider failures of any kind (error, timeout, panic) settle into
//! `Ready(synthesize(q))` and are only visible in logs.

use crate::provider::{ProviderError, SearchProvider};
use crate::query::Query;
use crate::synth::synthesize;
use crate::types::{RequestState, SearchOptions, SearchResultSet, Vertical};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Receives `"<q> - <suffix>"` when a dispatch starts.
pub trait TitleSink: Send + Sync {
    fn set_title(&self, title: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTitle;

impl TitleSink for NoopTitle {
    fn set_title(&self, _title: &str) {}
}

/// Shared cell holding the latest title; readers poll [`TitleCell::get`].
#[derive(Debug, Default, Clone)]
pub struct TitleCell(Arc<RwLock<String>>);

impl TitleCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> String {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TitleSink for TitleCell {
    fn set_title(&self, title: &str) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = title.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Result limit handed to the provider.
    pub limit: u32,
    /// Upper bound on a single provider call.
    pub timeout: Duration,
    pub title_suffix: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            timeout: Duration::from_secs(10),
            title_suffix: "Search".to_string(),
        }
    }
}

/// A dispatch that has been started but not yet run.
#[derive(Debug)]
pub struct Ticket {
    generation: u64,
    query: Query,
    options: SearchOptions,
    cancel: CancellationToken,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

#[derive(Default)]
struct Ledger {
    generation: u64,
    inflight: Option<CancellationToken>,
}

pub struct SearchOrchestrator {
    provider: Arc<dyn SearchProvider>,
    title: Arc<dyn TitleSink>,
    config: OrchestratorConfig,
    ledger: Mutex<Ledger>,
    state: watch::Sender<RequestState>,
}

impl SearchOrchestrator {
    pub fn new(provider: Arc<dyn SearchProvider>, config: OrchestratorConfig) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            provider,
            title: Arc::new(NoopTitle),
            config,
            ledger: Mutex::new(Ledger::default()),
            state,
        }
    }

    pub fn with_title_sink(mut self, sink: Arc<dyn TitleSink>) -> Self {
        self.title = sink;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// Number of dispatches started so far.
    pub fn generation(&self) -> u64 {
        self.lock_ledger().generation
    }

    pub fn title_for(&self, query: &str) -> String {
        format!("{query} - {}", self.config.title_suffix)
    }

    /// Dispatch on the default tab, first page.
    pub async fn dispatch(&self, raw: &str) -> RequestState {
        self.dispatch_with(raw, Vertical::All, 1).await
    }

    /// Run one query to settlement and return the state it produced.
    ///
    /// A blank query is a no-op that returns the current state. If a newer
    /// dispatch starts before this one settles, this one commits nothing and
    /// returns whatever the state is at that point.
    pub async fn dispatch_with(&self, raw: &str, vertical: Vertical, page: u32) -> RequestState {
        match self.start(raw, vertical, page) {
            Some(ticket) => self.run(ticket).await,
            None => self.state(),
        }
    }

    /// Synchronous half of a dispatch: claim the next generation, cancel the
    /// one in flight, publish `Loading`, and set the title. `None` for a blank
    /// query.
    ///
    /// Splitting this from [`run`](Self::run) lets callers that spawn the
    /// provider call fix dispatch order before the task is scheduled.
    pub fn start(&self, raw: &str, vertical: Vertical, page: u32) -> Option<Ticket> {
        let Some(query) = Query::parse(raw) else {
            tracing::debug!(target: "search.orchestrator", "search.dispatch.blank");
            return None;
        };
        let options = SearchOptions {
            limit: self.config.limit,
            vertical,
            page: page.max(1),
        };
        let (generation, cancel) = self.begin(&query);
        self.title.set_title(&self.title_for(&query));
        tracing::info!(
            target: "search.orchestrator",
            generation,
            query = %query,
            provider = self.provider.name(),
            vertical = vertical.as_param(),
            page = options.page,
            "search.dispatch.start"
        );
        Some(Ticket {
            generation,
            query,
            options,
            cancel,
        })
    }

    /// Await the provider for a started dispatch and commit the outcome.
    pub async fn run(&self, ticket: Ticket) -> RequestState {
        let Ticket {
            generation,
            query,
            options,
            cancel,
        } = ticket;
        let mut pending = Pending {
            orchestrator: self,
            generation,
            query: &query,
            armed: true,
        };
        let started = Instant::now();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.call_provider(&query, &options) => Some(result),
        };

        let Some(result) = outcome else {
            pending.armed = false;
            tracing::debug!(
                target: "search.orchestrator",
                generation,
                query = %query,
                "search.dispatch.superseded"
            );
            return self.state();
        };

        let results = match result {
            Ok(set) => {
                tracing::info!(
                    target: "search.orchestrator",
                    generation,
                    origin = "provider",
                    organic = set.organic_results.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "search.dispatch.settled"
                );
                set
            }
            Err(err) => {
                tracing::warn!(
                    target: "search.orchestrator",
                    generation,
                    origin = "fallback",
                    query = %query,
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "search.dispatch.fallback"
                );
                synthesize(&query)
            }
        };

        pending.armed = false;
        let ready = RequestState::Ready {
            query: query.to_string(),
            results,
        };
        if self.settle(generation, ready.clone()) {
            ready
        } else {
            tracing::debug!(
                target: "search.orchestrator",
                generation,
                "search.dispatch.stale_discarded"
            );
            self.state()
        }
    }

    fn begin(&self, query: &Query) -> (u64, CancellationToken) {
        let mut ledger = self.lock_ledger();
        ledger.generation += 1;
        let token = CancellationToken::new();
        if let Some(previous) = ledger.inflight.replace(token.clone()) {
            previous.cancel();
        }
        self.state.send_replace(RequestState::Loading {
            query: query.to_string(),
        });
        (ledger.generation, token)
    }

    /// Commit `state` if `generation` is still current.
    fn settle(&self, generation: u64, state: RequestState) -> bool {
        let mut ledger = self.lock_ledger();
        if ledger.generation != generation {
            return false;
        }
        ledger.inflight = None;
        self.state.send_replace(state);
        true
    }

    async fn call_provider(
        &self,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<SearchResultSet, ProviderError> {
        let call = AssertUnwindSafe(self.provider.search(query, options)).catch_unwind();
        match tokio::time::timeout(self.config.timeout, call).await {
            Err(_) => Err(ProviderError::Timeout(self.config.timeout)),
            Ok(Err(payload)) => Err(ProviderError::Panicked(panic_message(payload.as_ref()))),
            Ok(Ok(result)) => result,
        }
    }

    fn lock_ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Settles the dispatch with fallback data if its future is dropped while it
/// is still the latest one, so `Loading` cannot outlive its caller.
struct Pending<'a> {
    orchestrator: &'a SearchOrchestrator,
    generation: u64,
    query: &'a Query,
    armed: bool,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let fallback = RequestState::Ready {
            query: self.query.to_string(),
            results: synthesize(self.query),
        };
        if self.orchestrator.settle(self.generation, fallback) {
            tracing::warn!(
                target: "search.orchestrator",
                generation = self.generation,
                query = %self.query,
                "search.dispatch.abandoned"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
