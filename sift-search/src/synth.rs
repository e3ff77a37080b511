//! Deterministic stand-in results for when the provider cannot answer.

use crate::types::{SearchResult, SearchResultSet};

/// Build the fallback set for `q`: five organic results and eight related
/// searches, all derived from the query text alone.
///
/// ```
/// let set = sift_search::synthesize("Open AI");
/// assert_eq!(set.organic_results[1].link, "https://openai.com");
/// assert!(set.organic_results[2].link.ends_with("/Open-AI"));
/// assert_eq!(set.related_searches.len(), 8);
/// ```
pub fn synthesize(q: &str) -> SearchResultSet {
    let organic_results = vec![
        result(
            format!("{q} - Wikipedia"),
            format!("https://en.wikipedia.org/wiki/{}", join_words(q, "_")),
            format!(
                "{q} is a search term that you entered. Wikipedia is a free online encyclopedia, \
                 created and edited by volunteers around the world and hosted by the Wikimedia \
                 Foundation."
            ),
        ),
        result(
            format!("{q} - Official Website"),
            format!("https://{}.com", join_words(&q.to_lowercase(), "")),
            format!(
                "Official website for {q}. Find the latest information, news, and updates about \
                 {q}. Discover comprehensive resources and detailed information."
            ),
        ),
        result(
            format!("Learn more about {q} - Complete Guide"),
            format!("https://guide.example.com/{}", join_words(q, "-")),
            format!(
                "Comprehensive guide and information about {q}. Everything you need to know \
                 about this topic including tutorials, best practices, and expert insights."
            ),
        ),
        result(
            format!("{q} News and Updates"),
            format!("https://news.example.com/{q}"),
            format!(
                "Latest news and updates about {q}. Stay informed with the most recent \
                 developments, announcements, and industry insights."
            ),
        ),
        result(
            format!("Best {q} Resources"),
            format!("https://resources.example.com/{q}"),
            format!(
                "Curated collection of the best resources for {q}. Tools, guides, tutorials, \
                 and expert recommendations to help you succeed."
            ),
        ),
    ];

    let related_searches = vec![
        format!("{q} meaning"),
        format!("{q} definition"),
        format!("{q} examples"),
        format!("{q} guide"),
        format!("best {q}"),
        format!("{q} tutorial"),
        format!("{q} vs alternatives"),
        format!("{q} tips"),
    ];

    SearchResultSet {
        organic_results,
        related_searches,
        people_also_ask: Vec::new(),
    }
}

fn result(title: String, link: String, snippet: String) -> SearchResult {
    SearchResult {
        title,
        link,
        snippet,
        source: None,
    }
}

/// Replace each run of whitespace with `sep`.
fn join_words(text: &str, sep: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_gap = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_gap {
                out.push_str(sep);
                in_gap = true;
            }
        } else {
            out.push(ch);
            in_gap = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cats_fallback_matches_templates() {
        let set = synthesize("cats");
        assert_eq!(set.organic_results.len(), 5);
        let first = &set.organic_results[0];
        assert_eq!(first.title, "cats - Wikipedia");
        assert_eq!(first.link, "https://en.wikipedia.org/wiki/cats");
        assert!(first.snippet.contains("cats"));
        assert!(first.snippet.ends_with("hosted by the Wikimedia Foundation."));
        assert_eq!(
            set.related_searches,
            vec![
                "cats meaning",
                "cats definition",
                "cats examples",
                "cats guide",
                "best cats",
                "cats tutorial",
                "cats vs alternatives",
                "cats tips",
            ]
        );
        assert!(set.people_also_ask.is_empty());
        assert!(set.organic_results.iter().all(|r| r.source.is_none()));
    }

    #[test]
    fn multi_word_queries_shape_links_per_slot() {
        let set = synthesize("Open  AI");
        let links: Vec<&str> = set.organic_results.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://en.wikipedia.org/wiki/Open_AI",
                "https://openai.com",
                "https://guide.example.com/Open-AI",
                "https://news.example.com/Open  AI",
                "https://resources.example.com/Open  AI",
            ]
        );
        assert_eq!(set.organic_results[2].title, "Learn more about Open  AI - Complete Guide");
    }

    #[test]
    fn synthesis_is_deterministic() {
        assert_eq!(synthesize("rust"), synthesize("rust"));
    }

    #[test]
    fn snippets_are_single_spaced() {
        let set = synthesize("x");
        assert_eq!(
            set.organic_results[1].snippet,
            "Official website for x. Find the latest information, news, and updates about x. \
             Discover comprehensive resources and detailed information."
        );
    }
}
