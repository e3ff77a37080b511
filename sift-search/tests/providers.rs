use sift_search::provider::{BraveProvider, RemoteProvider};
use sift_search::{
    OrchestratorConfig, RequestState, SearchOptions, SearchOrchestrator, SearchProvider,
    Vertical, synthesize,
};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn remote_provider_decodes_result_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "open ai"))
        .and(query_param("limit", "10"))
        .and(query_param_is_missing("vertical"))
        .and(query_param_is_missing("page"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "organic_results": [
                { "title": "OpenAI", "link": "https://openai.com", "snippet": "AI lab", "source": "openai.com" }
            ],
            "related_searches": ["chatgpt"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = RemoteProvider::new(
        &format!("{}/api/search", server.uri()),
        Some("s3cret".into()),
    )
    .unwrap();
    let set = provider
        .search("open ai", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(set.organic_results.len(), 1);
    assert_eq!(set.organic_results[0].source.as_deref(), Some("openai.com"));
    assert_eq!(set.related_searches, vec!["chatgpt"]);
    assert!(set.people_also_ask.is_empty());
}

#[tokio::test]
async fn remote_provider_forwards_tab_and_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("vertical", "news"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = RemoteProvider::new(&format!("{}/search", server.uri()), None).unwrap();
    let set = provider
        .search(
            "cats",
            &SearchOptions {
                limit: 10,
                vertical: Vertical::News,
                page: 3,
            },
        )
        .await
        .unwrap();
    assert!(set.organic_results.is_empty());
    assert!(set.related_searches.is_empty());
}

#[tokio::test]
async fn malformed_remote_response_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let provider = RemoteProvider::new(&server.uri(), None).unwrap();
    let orch = SearchOrchestrator::new(Arc::new(provider), OrchestratorConfig::default());
    let state = orch.dispatch("cats").await;
    assert_eq!(
        state,
        RequestState::Ready {
            query: "cats".into(),
            results: synthesize("cats"),
        }
    );
}

#[tokio::test]
async fn remote_server_error_falls_back_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let provider = RemoteProvider::new(&server.uri(), None).unwrap();
    let orch = SearchOrchestrator::new(Arc::new(provider), OrchestratorConfig::default());
    let state = orch.dispatch("dogs").await;
    assert_eq!(state.results(), Some(&synthesize("dogs")));
}

#[tokio::test]
async fn brave_provider_maps_web_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(query_param("q", "rust"))
        .and(query_param("count", "20"))
        .and(query_param("offset", "1"))
        .and(header("x-subscription-token", "brave-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "search",
            "query": { "original": "rust" },
            "web": { "results": [
                {
                    "title": "<strong>Rust</strong> Programming Language",
                    "url": "https://www.rust-lang.org/",
                    "description": "Fast, reliable, productive.",
                    "meta_url": { "hostname": "www.rust-lang.org" }
                }
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = BraveProvider::with_endpoint("brave-key", &server.uri()).unwrap();
    let set = provider
        .search(
            "rust",
            &SearchOptions {
                limit: 50,
                vertical: Vertical::All,
                page: 2,
            },
        )
        .await
        .unwrap();

    assert_eq!(set.organic_results.len(), 1);
    assert_eq!(set.organic_results[0].title, "Rust Programming Language");
    assert_eq!(
        set.organic_results[0].source.as_deref(),
        Some("www.rust-lang.org")
    );
    assert!(set.related_searches.is_empty());
}

#[tokio::test]
async fn brave_rejection_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "error": { "message": "bad token" } })),
        )
        .mount(&server)
        .await;

    let provider = BraveProvider::with_endpoint("nope", &server.uri()).unwrap();
    let orch = SearchOrchestrator::new(Arc::new(provider), OrchestratorConfig::default());
    let state = orch.dispatch("cats").await;
    assert_eq!(state.results(), Some(&synthesize("cats")));
}
