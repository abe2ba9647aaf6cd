// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, Method, Request, StatusCode},
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use caption_server::{config::VisionConfig, handlers, state::AppState};

pub const TEST_VISION_KEY: &str = "test-vision-key";

/// Build the application router wired to the given vision configuration.
/// `None` reproduces a server whose vision credentials were never set.
pub fn create_test_app(vision: Option<VisionConfig>) -> Router {
    let state = AppState {
        vision,
        http_client: reqwest::Client::new(),
    };
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/caption",
            post(handlers::caption::generate_caption)
                .layer(DefaultBodyLimit::max(8 * 1024 * 1024)),
        )
        .with_state(state)
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn get_plain(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ── Mock vision service ──────────────────────────────────────────────────────

/// One request as seen by the mock vision service.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path_and_query: String,
    pub content_type: Option<String>,
    pub subscription_key: Option<String>,
    pub body: Vec<u8>,
}

/// A stand-in vision service on an ephemeral local port. Every request it
/// receives is recorded, so tests can assert both on the relayed payload and
/// on "no call was made at all".
pub struct VisionMock {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl VisionMock {
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> VisionConfig {
        VisionConfig {
            endpoint: self.endpoint(),
            key: TEST_VISION_KEY.to_string(),
        }
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Spawn a mock vision service answering every request with `status` and
/// `body`.
pub async fn spawn_vision_mock(status: StatusCode, body: &'static str) -> VisionMock {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorder = requests.clone();

    let app = Router::new().fallback(move |req: Request<Body>| {
        let recorder = recorder.clone();
        async move {
            let (parts, req_body) = req.into_parts();
            let bytes = axum::body::to_bytes(req_body, usize::MAX)
                .await
                .unwrap_or_default();
            recorder.lock().unwrap().push(RecordedRequest {
                path_and_query: parts
                    .uri
                    .path_and_query()
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                content_type: parts
                    .headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from),
                subscription_key: parts
                    .headers
                    .get("Ocp-Apim-Subscription-Key")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from),
                body: bytes.to_vec(),
            });
            (status, body)
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock vision listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    VisionMock { addr, requests }
}
