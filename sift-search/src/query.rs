//! The committed query, the user's draft, and the navigation location that
//! encodes them.
//!
//! A location looks like `/search?q=<encoded>` with an optional
//! `&lucky=true`. The committed query is always derived from the location;
//! the draft only follows it when a navigation carries a query.

use sift_common::SiftError;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use url::form_urlencoded;

pub const SEARCH_PATH: &str = "/search";

/// A trimmed, non-empty query string. The only thing the orchestrator
/// will dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// Trim `raw`; `None` if nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for Query {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| SiftError::InvalidQuery(s.to_string()))
    }
}

impl Deref for Query {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed navigation target.
///
/// `q` holds the decoded parameter as found (untrimmed); use
/// [`Location::query`] to get something dispatchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub q: Option<String>,
    pub lucky: bool,
}

impl Location {
    pub fn search(query: &Query) -> Self {
        Self {
            q: Some(query.to_string()),
            lucky: false,
        }
    }

    pub fn lucky(query: &Query) -> Self {
        Self {
            q: Some(query.to_string()),
            lucky: true,
        }
    }

    /// Accepts `/search?q=…`, `?q=…`, `q=…`, or a full URL. Both `+` and
    /// `%20` decode to a space. The first `q` wins; `lucky` is set only by
    /// `lucky=true`. Anything unparseable yields an empty location.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let raw = raw.split_once('#').map_or(raw, |(head, _)| head);
        let query_string = match raw.split_once('?') {
            Some((_, qs)) => qs,
            None if raw.contains('=') => raw,
            None => return Self::default(),
        };

        let mut location = Self::default();
        for (key, value) in form_urlencoded::parse(query_string.as_bytes()) {
            match key.as_ref() {
                "q" if location.q.is_none() => location.q = Some(value.into_owned()),
                "lucky" => location.lucky = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }
        location
    }

    /// Dispatchable query, if the location carries a non-blank `q`.
    pub fn query(&self) -> Option<Query> {
        self.q.as_deref().and_then(Query::parse)
    }

    /// Canonical form: `/search?q=<percent-encoded>[&lucky=true]`, spaces as
    /// `%20`.
    pub fn to_href(&self) -> String {
        let mut href = String::from(SEARCH_PATH);
        if let Some(q) = &self.q {
            href.push_str("?q=");
            href.push_str(&encode_component(q));
            if self.lucky {
                href.push_str("&lucky=true");
            }
        }
        href
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_href())
    }
}

// form encoding escapes a literal '+' as %2B, so any '+' left is a space.
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Result of committing the draft: where to go and what to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub location: Location,
    pub query: Query,
}

/// Owner of the committed query and the draft text.
#[derive(Debug, Clone, Default)]
pub struct QuerySource {
    location: Location,
    committed: Option<Query>,
    draft: String,
}

impl QuerySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn committed(&self) -> Option<&Query> {
        self.committed.as_ref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Keystroke binding. Never dispatches.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Apply an external navigation and return the query to dispatch, if
    /// any. A location with a query also resets the draft to it.
    pub fn navigate(&mut self, location: Location) -> Option<Query> {
        let query = location.query();
        if let Some(q) = &query {
            self.draft = q.to_string();
        }
        self.committed = query.clone();
        self.location = location;
        query
    }

    /// Commit the draft. Blank drafts are ignored.
    pub fn submit(&mut self) -> Option<Navigation> {
        self.commit_draft(false)
    }

    /// Like [`submit`](Self::submit) but the location carries `lucky=true`.
    /// The flag is kept on the location and otherwise has no effect.
    pub fn submit_lucky(&mut self) -> Option<Navigation> {
        self.commit_draft(true)
    }

    fn commit_draft(&mut self, lucky: bool) -> Option<Navigation> {
        let query = Query::parse(&self.draft)?;
        let location = if lucky {
            tracing::debug!(target: "search.query", query = %query, "search.query.lucky_ignored");
            Location::lucky(&query)
        } else {
            Location::search(&query)
        };
        self.navigate(location.clone());
        Some(Navigation { location, query })
    }
}
