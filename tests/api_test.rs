use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, Uri},
    Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use recommender_rs::config::Config;
use recommender_rs::gemini::{Completer, CompletionError, GeminiClient};
use recommender_rs::recommend::fallback::NoFallback;
use recommender_rs::recommend::{Prompt, Recommender};
use recommender_rs::server::{build_router, AppState};

/// One request as seen by the fake Gemini endpoint.
#[derive(Debug, Clone)]
struct Seen {
    path: String,
    query: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    body: String,
    delay: Duration,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Upstream {
    fn answering(text: &str) -> Self {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
        });
        Self::raw(StatusCode::OK, body.to_string())
    }

    fn raw(status: StatusCode, body: String) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    async fn spawn(&self) -> String {
        let stub = self.clone();
        let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, body: Bytes| {
            let stub = stub.clone();
            async move {
                stub.seen.lock().unwrap().push(Seen {
                    path: uri.path().to_string(),
                    query: uri.query().unwrap_or("").to_string(),
                    api_key: headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(|v| v.to_string()),
                    body: serde_json::from_slice(&body).unwrap_or(Value::Null),
                });
                tokio::time::sleep(stub.delay).await;
                (stub.status, stub.body.clone())
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

fn client_for(base_url: &str, timeout: Duration) -> GeminiClient {
    client_with_key(base_url, "test-key", timeout)
}

fn client_with_key(base_url: &str, api_key: &str, timeout: Duration) -> GeminiClient {
    let mut config = Config::default();
    config.gemini.base_url = base_url.to_string();
    config.gemini.api_key = api_key.to_string();
    GeminiClient::new(&config.gemini)
        .unwrap()
        .with_timeout(timeout)
        .unwrap()
}

async fn app_for(upstream: &Upstream) -> Router {
    let base_url = upstream.spawn().await;
    let client = client_for(&base_url, Duration::from_secs(5));
    let recommender = Recommender::new(Arc::new(client), Arc::new(NoFallback));
    build_router(AppState::new(Config::default(), Arc::new(recommender)))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

fn ten_titles() -> Vec<String> {
    [
        "The Prestige",
        "Interstellar",
        "Shutter Island",
        "The Matrix",
        "Memento",
        "Tenet",
        "Source Code",
        "Paprika",
        "Dark City",
        "Minority Report",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[tokio::test]
async fn test_recommend_movies_end_to_end() {
    let titles = ten_titles();
    let text = titles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            if i % 2 == 0 {
                format!("{}. **{}**", i + 1, t)
            } else {
                format!("{}. {}", i + 1, t)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let upstream = Upstream::answering(&format!("Here are some picks:\n{}\nEnjoy!", text));
    let app = app_for(&upstream).await;

    let (status, body) = send(
        app,
        post_json("/api/recommend-movies", r#"{"movieName": "Inception"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({ "items": titles }));

    let seen = upstream.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/models/gemini-2.0-flash:generateContent");
    assert_eq!(seen[0].query, "");
    assert_eq!(seen[0].api_key.as_deref(), Some("test-key"));
    let prompt = seen[0].body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("'Inception'"));
    assert!(seen[0].body["contents"][0]["parts"].as_array().unwrap().len() == 1);
}

#[tokio::test]
async fn test_query_parameter_preferred_over_body() {
    let upstream = Upstream::answering("1. Dark");
    let app = app_for(&upstream).await;

    let (status, _) = send(
        app,
        post_json(
            "/api/recommend-tvshows?tvShowName=The%20Leftovers",
            r#"{"tvShowName": "Lost"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let prompt = upstream.seen()[0].body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prompt.contains("'The Leftovers'"));
    assert!(!prompt.contains("Lost"));
}

#[tokio::test]
async fn test_query_only_request() {
    let upstream = Upstream::answering("1. [Movie] Se7en\n2. [TV] True Detective");
    let app = app_for(&upstream).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/recommend-by-genre?genre=crime")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["items"], json!(["[Movie] Se7en", "[TV] True Detective"]));
}

#[tokio::test]
async fn test_missing_field_never_reaches_upstream() {
    let upstream = Upstream::answering("1. Anything");
    let app = app_for(&upstream).await;

    let (status, body) = send(
        app.clone(),
        post_json("/api/recommend-movies", r#"{"movieName": ""}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(&body[..], b"Movie name is required");

    let (status, body) = send(app, post_json("/api/find-movie", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(&body[..], b"Description is required");

    assert!(upstream.seen().is_empty());
}

#[tokio::test]
async fn test_malformed_body() {
    let upstream = Upstream::answering("1. Anything");
    let app = app_for(&upstream).await;

    let (status, body) = send(app, post_json("/api/recommend-by-description", "{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(&body[..], b"Invalid request body");
    assert!(upstream.seen().is_empty());
}

#[tokio::test]
async fn test_upstream_error_status() {
    let upstream = Upstream::raw(StatusCode::TOO_MANY_REQUESTS, "quota exceeded".to_string());
    let app = app_for(&upstream).await;

    let (status, body) = send(app, post_json("/api/recommend-by-genre", r#"{"genre": "noir"}"#)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(&body[..], b"upstream error (429): quota exceeded");
}

#[tokio::test]
async fn test_empty_upstream_response() {
    let upstream = Upstream::raw(StatusCode::OK, r#"{"candidates": []}"#.to_string());
    let app = app_for(&upstream).await;

    let (status, body) = send(app, post_json("/api/find-movie", r#"{"description": "x"}"#)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(&body[..], b"empty response from model");
}

#[tokio::test]
async fn test_no_numbered_lines_is_empty_list() {
    let upstream = Upstream::answering("I could not think of anything.");
    let app = app_for(&upstream).await;

    let (status, body) = send(app, post_json("/api/recommend-movies", r#"{"movieName": "x"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({ "items": [] }));
}

#[tokio::test]
async fn test_upstream_timeout() {
    let mut upstream = Upstream::answering("1. Too late");
    upstream.delay = Duration::from_secs(3);
    let base_url = upstream.spawn().await;
    let client = client_for(&base_url, Duration::from_millis(200));

    let result = client.complete(&Prompt::text("hello")).await;
    assert!(matches!(result, Err(CompletionError::Timeout)));

    let recommender = Recommender::new(Arc::new(client), Arc::new(NoFallback));
    let app = build_router(AppState::new(Config::default(), Arc::new(recommender)));
    let (status, body) = send(app, post_json("/api/recommend-movies", r#"{"movieName": "x"}"#)).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(&body[..], b"request timeout");
}

#[tokio::test]
async fn test_transport_error_hides_api_key() {
    // Bind and drop a listener so the port refuses connections.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_with_key(
        &format!("http://{}", addr),
        "SUPER-SECRET-KEY",
        Duration::from_secs(5),
    );
    let recommender = Recommender::new(Arc::new(client), Arc::new(NoFallback));
    let app = build_router(AppState::new(Config::default(), Arc::new(recommender)));

    let (status, body) = send(app, post_json("/api/recommend-movies", r#"{"movieName": "Inception"}"#)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let body = String::from_utf8_lossy(&body);
    assert!(body.starts_with("error sending request"));
    assert!(!body.contains("SUPER-SECRET-KEY"));
    assert!(!body.contains(&addr.to_string()));
}

fn multipart_request(field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "X-RECOMMENDER-BOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/search-by-image")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_search_by_image() {
    let upstream = Upstream::answering("1. Akira\n2. **Ghost in the Shell**");
    let app = app_for(&upstream).await;

    let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    let (status, body) = send(app, multipart_request("image", "neon.png", &png)).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["items"], json!(["Akira", "Ghost in the Shell"]));
    assert_eq!(json["summary"], "1. Akira\n2. **Ghost in the Shell**");

    let seen = upstream.seen();
    assert_eq!(seen.len(), 2);
    for call in &seen {
        assert_eq!(call.path, "/models/gemini-1.5-flash:generateContent");
        let inline = &call.body["contents"][0]["parts"][1]["inlineData"];
        assert_eq!(inline["mimeType"], "image/png");
        assert_eq!(inline["data"], "iVBORw0KGgoAAA==");
    }
}

#[tokio::test]
async fn test_search_by_image_without_image_field() {
    let upstream = Upstream::answering("1. Akira");
    let app = app_for(&upstream).await;

    let (status, body) = send(app, multipart_request("poster", "neon.png", b"\xFF\xD8")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(&body[..], b"No image file was uploaded");
    assert!(upstream.seen().is_empty());
}

#[tokio::test]
async fn test_search_by_image_not_multipart() {
    let upstream = Upstream::answering("1. Akira");
    let app = app_for(&upstream).await;

    let (status, _) = send(app, post_json("/api/search-by-image", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let upstream = Upstream::answering("");
    let app = app_for(&upstream).await;

    let (status, _) = send(app, post_json("/api/nope", "{}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
