use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single organic hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// Everything the results view renders. Missing lists decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultSet {
    #[serde(default)]
    pub organic_results: Vec<SearchResult>,
    #[serde(default)]
    pub related_searches: Vec<String>,
    #[serde(default)]
    pub people_also_ask: Vec<QuestionAnswer>,
}

/// Lifecycle of the view's data. There is deliberately no failed state:
/// provider failures settle into `Ready` with synthesized results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RequestState {
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Ready {
        query: String,
        results: SearchResultSet,
    },
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { query } | Self::Ready { query, .. } => Some(query),
        }
    }

    pub fn results(&self) -> Option<&SearchResultSet> {
        match self {
            Self::Ready { results, .. } => Some(results),
            _ => None,
        }
    }
}

/// Results tab. Forwarded to the provider as a dispatch parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    #[default]
    All,
    Images,
    Videos,
    News,
    Maps,
}

impl Vertical {
    pub const ALL: [Vertical; 5] = [
        Vertical::All,
        Vertical::Images,
        Vertical::Videos,
        Vertical::News,
        Vertical::Maps,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Vertical::All => "All",
            Vertical::Images => "Images",
            Vertical::Videos => "Videos",
            Vertical::News => "News",
            Vertical::Maps => "Maps",
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Vertical::All => "all",
            Vertical::Images => "images",
            Vertical::Videos => "videos",
            Vertical::News => "news",
            Vertical::Maps => "maps",
        }
    }

    /// Next tab, wrapping around.
    pub fn next(self) -> Vertical {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown results tab: {0:?}")]
pub struct UnknownVertical(pub String);

impl FromStr for Vertical {
    type Err = UnknownVertical;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_param().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownVertical(wanted.to_string()))
    }
}

/// Parameters handed to a provider alongside the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: u32,
    pub vertical: Vertical,
    /// 1-based.
    pub page: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            vertical: Vertical::All,
            page: 1,
        }
    }
}
