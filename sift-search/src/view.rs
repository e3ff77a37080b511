//! One results-view session: the query source plus tab and page selection,
//! dispatching through a shared orchestrator.
//!
//! Every operation that should trigger a search spawns the dispatch on the
//! current tokio runtime and hands back its `JoinHandle`. Callers that only
//! care about the state stream can drop the handle and watch
//! [`SearchView::subscribe`] instead.

use crate::orchestrator::SearchOrchestrator;
use crate::query::{Location, Query, QuerySource};
use crate::types::{RequestState, Vertical};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const MAX_PAGE: u32 = 10;

pub type Dispatch = JoinHandle<RequestState>;

pub struct SearchView {
    source: QuerySource,
    orchestrator: Arc<SearchOrchestrator>,
    vertical: Vertical,
    page: u32,
}

impl SearchView {
    pub fn new(orchestrator: Arc<SearchOrchestrator>) -> Self {
        Self {
            source: QuerySource::new(),
            orchestrator,
            vertical: Vertical::All,
            page: 1,
        }
    }

    pub fn orchestrator(&self) -> &Arc<SearchOrchestrator> {
        &self.orchestrator
    }

    pub fn source(&self) -> &QuerySource {
        &self.source
    }

    pub fn committed(&self) -> Option<&Query> {
        self.source.committed()
    }

    pub fn draft(&self) -> &str {
        self.source.draft()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.source.set_draft(text);
    }

    pub fn vertical(&self) -> Vertical {
        self.vertical
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn state(&self) -> RequestState {
        self.orchestrator.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.orchestrator.subscribe()
    }

    /// Arrive at `location`. A location with a query starts a dispatch on
    /// page 1; one without leaves the current state alone.
    pub fn enter(&mut self, location: Location) -> Option<Dispatch> {
        let query = self.source.navigate(location)?;
        self.page = 1;
        self.spawn(query)
    }

    pub fn submit(&mut self) -> Option<Dispatch> {
        let nav = self.source.submit()?;
        self.page = 1;
        self.spawn(nav.query)
    }

    pub fn submit_lucky(&mut self) -> Option<Dispatch> {
        let nav = self.source.submit_lucky()?;
        self.page = 1;
        self.spawn(nav.query)
    }

    /// Navigate to the `index`th related search of the current results.
    pub fn follow_related(&mut self, index: usize) -> Option<Dispatch> {
        let related = match self.orchestrator.state() {
            RequestState::Ready { results, .. } => results.related_searches.get(index).cloned()?,
            _ => return None,
        };
        let query = Query::parse(&related)?;
        self.enter(Location::search(&query))
    }

    /// Switch tabs. Re-dispatches the committed query on page 1 when the tab
    /// actually changes. No-op without a committed query; the selection is
    /// kept for the next submit.
    pub fn select_vertical(&mut self, vertical: Vertical) -> Option<Dispatch> {
        if vertical == self.vertical {
            return None;
        }
        self.vertical = vertical;
        self.page = 1;
        let query = self.source.committed()?.clone();
        self.spawn(query)
    }

    /// Jump to result page `page` (1..=10). Without a committed query the
    /// page is recorded but nothing is dispatched.
    pub fn select_page(&mut self, page: u32) -> Option<Dispatch> {
        if !(1..=MAX_PAGE).contains(&page) || page == self.page {
            return None;
        }
        self.page = page;
        let query = self.source.committed()?.clone();
        self.spawn(query)
    }

    // Generation is claimed here, before spawning, so dispatch order
    // follows call order rather than task scheduling.
    fn spawn(&self, query: Query) -> Option<Dispatch> {
        let ticket = self.orchestrator.start(&query, self.vertical, self.page)?;
        let orchestrator = Arc::clone(&self.orchestrator);
        Some(tokio::spawn(async move { orchestrator.run(ticket).await }))
    }
}
