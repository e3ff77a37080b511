//! Query dispatch and fallback synthesis for a search results view.
//!
//! - [`query`]: committed query + draft, navigation locations (`?q=…&lucky=true`)
//! - [`synth`]: deterministic fallback result sets
//! - [`provider`]: the search backend capability and its implementations
//! - [`orchestrator`]: the `Idle → Loading → Ready` state machine with stale
//!   response protection
//! - [`view`]: a view session tying the above together, plus tab/page selection
//! - [`display`]: presentation-only helpers (result banner, counts)
//!
//! A provider failure never reaches the caller: the orchestrator settles into
//! `Ready` with [`synth::synthesize`] output instead.

pub mod display;
pub mod orchestrator;
pub mod provider;
pub mod query;
pub mod synth;
pub mod types;
pub mod view;

pub use orchestrator::{
    NoopTitle, OrchestratorConfig, SearchOrchestrator, Ticket, TitleCell, TitleSink,
};
pub use provider::{ProviderError, SearchProvider};
pub use query::{Location, Navigation, Query, QuerySource};
pub use synth::synthesize;
pub use types::{
    QuestionAnswer, RequestState, SearchOptions, SearchResult, SearchResultSet, Vertical,
};
pub use view::SearchView;
