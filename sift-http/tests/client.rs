use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use sift_http::{Auth, HttpClient, HttpError, RequestOpts, RetryPolicy};
use std::borrow::Cow;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: u32,
    name: String,
}

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(&server.uri())
        .expect("mock server uri")
        .with_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn decodes_json_with_query_and_header_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/items"))
        .and(query_param("q", "rust lang"))
        .and(header("x-subscription-token", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 7,
            "name": "crab"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item: Item = client_for(&server)
        .get_json(
            "v1/items",
            RequestOpts {
                auth: Some(Auth::Header {
                    name: HeaderName::from_static("x-subscription-token"),
                    value: HeaderValue::from_static("tok"),
                }),
                query: Some(vec![("q", Cow::Borrowed("rust lang"))]),
                ..Default::default()
            },
        )
        .await
        .expect("decoded item");

    assert_eq!(
        item,
        Item {
            id: 7,
            name: "crab".into()
        }
    );
}

#[tokio::test]
async fn bearer_token_is_sanitized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1,
            "name": "me"
        })))
        .mount(&server)
        .await;

    let item: Item = client_for(&server)
        .get_json(
            "me",
            RequestOpts {
                auth: Some(Auth::Bearer(" \"abc123\"\n")),
                ..Default::default()
            },
        )
        .await
        .expect("authorized");
    assert_eq!(item.id, 1);
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 2,
            "name": "second try"
        })))
        .mount(&server)
        .await;

    let item: Item = client_for(&server)
        .with_retry_policy(RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
            ..RetryPolicy::default()
        })
        .get_json("flaky", RequestOpts::default())
        .await
        .expect("retry succeeds");
    assert_eq!(item.name, "second try");
}

#[tokio::test]
async fn rate_limit_honours_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3,
            "name": "ok"
        })))
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    let item: Item = client_for(&server)
        .get_json("limited", RequestOpts::default())
        .await
        .expect("retry after 429");
    assert_eq!(item.id, 3);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-request-id", "req-42")
                .set_body_json(serde_json::json!({ "error": { "message": "no such thing" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_json::<Item>("missing", RequestOpts::default())
        .await
        .unwrap_err();

    match err {
        HttpError::Api {
            status,
            message,
            request_id,
        } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "no such thing");
            assert_eq!(request_id, "req-42");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_json::<Item>("garbled", RequestOpts::default())
        .await
        .unwrap_err();
    match err {
        HttpError::Decode(_, snippet) => assert_eq!(snippet, "{not json"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_path_targets_the_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 9,
            "name": "base"
        })))
        .mount(&server)
        .await;

    let client = HttpClient::new(&format!("{}/api/search", server.uri())).unwrap();
    let item: Item = client
        .get_json("", RequestOpts::default())
        .await
        .expect("base url request");
    assert_eq!(item.id, 9);
}
