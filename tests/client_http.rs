// tests/client_http.rs
//
// HTTP-level tests for NewsClient against an in-process axum stub bound to an
// ephemeral port.
//
// Covered:
// - POST /news request body (limit present / omitted)
// - success, empty list, malformed body
// - service error bodies, unexpected status
// - transport failures (refused connection, timeouts)
// - GET /health

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

use news_agent_cli::repl::dispatch;
use news_agent_cli::{ClientError, NewsClient, Settings};

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    delay: Duration,
    seen: Arc<Mutex<Vec<Value>>>,
}

impl Stub {
    fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

async fn news(State(stub): State<Stub>, Json(body): Json<Value>) -> impl IntoResponse {
    stub.seen.lock().push(body);
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    (
        stub.status,
        [("content-type", "application/json")],
        stub.body.clone(),
    )
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Serve the stub and return its base URL.
async fn spawn(stub: Stub) -> String {
    let app = Router::new()
        .route("/news", post(news))
        .route("/health", get(health))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub");
    });
    format!("http://{addr}")
}

fn settings(base_url: &str, timeout: Duration) -> Settings {
    Settings {
        base_url: base_url.to_string(),
        limit: 5,
        timeout,
        request_timeout: timeout,
    }
}

fn client(base_url: &str) -> NewsClient {
    NewsClient::new(&settings(base_url, Duration::from_secs(5))).expect("build client")
}

const TWO_ITEMS: &str = r#"[
  {
    "title": "Fed holds rates steady",
    "url": "https://example.test/fed",
    "source": "Reuters",
    "published_at": "2024-03-05T14:30:00+00:00",
    "summary": "Policy unchanged.",
    "sentiment": "neutral",
    "sentiment_score": 0.02,
    "excerpt": null
  },
  {
    "title": "Chipmaker beats estimates",
    "url": "https://example.test/chips",
    "source": "Wired",
    "published_at": null,
    "summary": null,
    "sentiment": "positive",
    "sentiment_score": 0.71,
    "excerpt": "Revenue rose 40%."
  }
]"#;

#[tokio::test]
async fn query_posts_json_and_decodes_items() {
    let stub = Stub::new(StatusCode::OK, TWO_ITEMS);
    let seen = stub.seen.clone();
    let base = spawn(stub).await;

    let items = client(&base).query("fed rates", 5).await.expect("query ok");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Fed holds rates steady");
    assert_eq!(items[0].source.as_deref(), Some("Reuters"));
    assert_eq!(items[1].excerpt.as_deref(), Some("Revenue rose 40%."));
    assert_eq!(items[1].sentiment_score, Some(0.71));

    let bodies = seen.lock().clone();
    assert_eq!(bodies, vec![json!({ "query": "fed rates", "limit": 5 })]);
}

#[tokio::test]
async fn non_positive_limit_is_not_sent() {
    let stub = Stub::new(StatusCode::OK, "[]");
    let seen = stub.seen.clone();
    let base = spawn(stub).await;
    let c = client(&base);

    c.query("a", 0).await.expect("limit 0");
    c.query("b", -3).await.expect("limit -3");

    let bodies = seen.lock().clone();
    assert_eq!(bodies, vec![json!({ "query": "a" }), json!({ "query": "b" })]);
}

#[tokio::test]
async fn trailing_slash_on_base_is_ignored() {
    let base = spawn(Stub::new(StatusCode::OK, "[]")).await;
    let c = client(&format!("{base}/"));
    assert_eq!(c.base_url(), base);
    assert!(c.query("x", 1).await.expect("query ok").is_empty());
}

#[tokio::test]
async fn empty_array_is_a_valid_result() {
    let base = spawn(Stub::new(StatusCode::OK, "[]")).await;
    let items = client(&base).query("nothing", 5).await.expect("query ok");
    assert!(items.is_empty());
}

#[tokio::test]
async fn null_body_is_an_empty_result() {
    let base = spawn(Stub::new(StatusCode::OK, "null")).await;
    let items = client(&base).query("nothing", 5).await.expect("query ok");
    assert!(items.is_empty());
}

#[tokio::test]
async fn service_error_with_detail() {
    let body = json!({ "error": "rate_limited", "detail": "try later" }).to_string();
    let base = spawn(Stub::new(StatusCode::TOO_MANY_REQUESTS, body)).await;

    let err = client(&base).query("x", 5).await.unwrap_err();
    assert!(matches!(err, ClientError::Service { .. }), "{err:?}");
    assert_eq!(err.to_string(), "rate_limited: try later");
}

#[tokio::test]
async fn service_error_without_detail() {
    let body = json!({ "error": "bad_request" }).to_string();
    let base = spawn(Stub::new(StatusCode::BAD_REQUEST, body)).await;

    let err = client(&base).query("x", 5).await.unwrap_err();
    assert_eq!(err.to_string(), "bad_request");
}

#[tokio::test]
async fn unexpected_status_carries_status_text() {
    let base = spawn(Stub::new(StatusCode::BAD_GATEWAY, "upstream down")).await;

    let err = client(&base).query("x", 5).await.unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedStatus(_)), "{err:?}");
    assert_eq!(err.to_string(), "agent returned status 502 Bad Gateway");
}

#[tokio::test]
async fn success_with_wrong_shape_is_malformed() {
    let base = spawn(Stub::new(StatusCode::OK, r#"{"items": []}"#)).await;

    let err = client(&base).query("x", 5).await.unwrap_err();
    assert!(matches!(err, ClientError::Malformed(_)), "{err:?}");
    assert!(!err.is_transport());
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .query("x", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
    assert!(err.is_transport());
    let msg = err.to_string().to_ascii_lowercase();
    assert!(msg.contains("connection refused"), "{msg}");
}

#[tokio::test]
async fn transport_timeout_surfaces_as_transport_error() {
    let stub = Stub::new(StatusCode::OK, "[]").delayed(Duration::from_secs(2));
    let base = spawn(stub).await;
    let c = NewsClient::new(&settings(&base, Duration::from_millis(200))).expect("client");

    let err = c.query("slow", 5).await.unwrap_err();
    match err {
        ClientError::Transport(e) => assert!(e.is_timeout(), "{e:?}"),
        other => panic!("expected transport timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn per_query_bound_expires_independently_of_transport_timeout() {
    let stub = Stub::new(StatusCode::OK, "[]").delayed(Duration::from_secs(2));
    let base = spawn(stub).await;
    let c = client(&base);

    let bound = Duration::from_millis(100);
    let err = dispatch(&c, "slow", 5, bound).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(d) if d == bound), "{err:?}");
    assert!(err.is_transport());
}

#[tokio::test]
async fn health_probe_reads_status() {
    let base = spawn(Stub::new(StatusCode::OK, "[]")).await;
    let h = client(&base).health().await.expect("health ok");
    assert_eq!(h.status, "ok");
}
