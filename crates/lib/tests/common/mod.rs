//! In-process mock servers for integration tests: a package directory and an Ollama endpoint.
//! Each mock binds its own port and records the requests it sees.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub const GOOD_TOKEN: &str = "good-token";
pub const MOCK_REPLY: &str = "Mock reply";

/// Shared log of what a mock received.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.contains(needle))
    }
}

/// Serve `app` on an ephemeral port; returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn tracked_package() -> Value {
    json!({
        "_id": "507f1f77bcf86cd799439011",
        "trackingId": "TR123456789",
        "status": "In Transit",
        "name": "Books",
        "location": "Denver",
        "recipientName": "Ada",
        "recipientAddress": "1 Main St",
        "progress": 60
    })
}

async fn track(State(rec): State<Recorder>, Path(id): Path<String>) -> Response {
    rec.push(format!("GET /api/track/{}", id));
    match id.as_str() {
        "TR123456789" | "PKG100" | "507f1f77bcf86cd799439011" => {
            Json(tracked_package()).into_response()
        }
        "PKGBADJSON" => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            "<html>maintenance</html>",
        )
            .into_response(),
        "PKGSLOW" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(tracked_package()).into_response()
        }
        "PKG500" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn package(
    State(rec): State<Recorder>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    rec.push(format!("GET /api/packages/{}", id));
    if bearer(&headers) != Some(GOOD_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == "PKGPRIVATE" {
        Json(json!({
            "_id": "65a1b2c3d4e5f60718293a4b",
            "trackingId": "TR999",
            "status": "Pending",
            "name": "Private parcel"
        }))
        .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn user_packages(
    State(rec): State<Recorder>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    rec.push(format!("GET /api/packages/user/{}", user_id));
    if bearer(&headers) != Some(GOOD_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match user_id.as_str() {
        "empty-user" => Json(json!([])).into_response(),
        _ => Json(json!([
            tracked_package(),
            { "_id": "65a1b2c3d4e5f60718293a4b", "trackingId": "TR999", "status": "Delivered" }
        ]))
        .into_response(),
    }
}

/// Package directory mock.
///
/// `/api/track/{id}`: TR123456789, PKG100 and 507f1f77bcf86cd799439011 found, PKGBADJSON answers 200 with HTML,
/// PKGSLOW sleeps 2s, PKG500 fails, anything else 404.
/// `/api/packages/{id}`: 401 without the good token, PKGPRIVATE found, anything else 404.
/// `/api/packages/user/{id}`: 401 without the good token, `empty-user` has none, others have two.
pub async fn mock_directory() -> (String, Recorder) {
    let rec = Recorder::default();
    let app = Router::new()
        .route("/api/track/:id", get(track))
        .route("/api/packages/:id", get(package))
        .route("/api/packages/user/:user_id", get(user_packages))
        .with_state(rec.clone());
    (spawn(app).await, rec)
}

#[derive(Clone)]
struct OllamaMock {
    prompts: Recorder,
    fail: bool,
}

async fn ollama_chat(State(mock): State<OllamaMock>, Json(body): Json<Value>) -> Response {
    let prompt = body["messages"][0]["content"].as_str().unwrap_or("");
    mock.prompts.push(prompt);
    if mock.fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response();
    }
    Json(json!({
        "model": body["model"],
        "message": { "role": "assistant", "content": MOCK_REPLY },
        "done": true
    }))
    .into_response()
}

/// Ollama `/api/chat` mock. Records each prompt; answers 500 when `fail` is set.
pub async fn mock_ollama(fail: bool) -> (String, Recorder) {
    let prompts = Recorder::default();
    let app = Router::new()
        .route("/api/chat", post(ollama_chat))
        .with_state(OllamaMock {
            prompts: prompts.clone(),
            fail,
        });
    (spawn(app).await, prompts)
}
