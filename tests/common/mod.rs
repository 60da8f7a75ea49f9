//! In-process stand-in for the GitHub REST endpoints the service calls.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use gh_contents::{AppState, Settings};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const APP_ID: &str = "12345";
pub const PRIVATE_KEY: &str = include_str!("../fixtures/app_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/app_key.pub.pem");

pub const OWNER: &str = "acme";
pub const REPO: &str = "widgets";
pub const INSTALLATION_ID: u64 = 42;
pub const INSTALLATION_TOKEN: &str = "ghs_installation_token";

// Owners that make the mock misbehave at a given step.
pub const REVOKED_OWNER: &str = "revoked";
pub const REVOKED_INSTALLATION_ID: u64 = 99;
pub const FORBIDDEN_OWNER: &str = "forbidden";
pub const FLAKY_OWNER: &str = "flaky";

#[derive(Clone, Default)]
pub struct MockGitHub {
    pub requests: Arc<AtomicUsize>,
    pub app_tokens: Arc<std::sync::Mutex<Vec<String>>>,
}

impl MockGitHub {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn app_tokens(&self) -> Vec<String> {
        self.app_tokens.lock().unwrap().clone()
    }

    fn record(&self, headers: &HeaderMap) -> String {
        self.requests.fetch_add(1, Ordering::SeqCst);
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.trim_start_matches("Bearer ")
                    .trim_start_matches("token ")
                    .to_string()
            })
            .unwrap_or_default()
    }

    /// App endpoints only accept a JWT, never the installation token.
    fn require_app_token(&self, headers: &HeaderMap) -> Result<(), Response> {
        let token = self.record(headers);
        if token.split('.').count() != 3 {
            return Err(github_error(
                StatusCode::UNAUTHORIZED,
                "A JSON web token could not be decoded",
            ));
        }
        self.app_tokens.lock().unwrap().push(token);
        Ok(())
    }
}

fn github_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "message": message,
            "documentation_url": "https://docs.github.com/rest",
        })),
    )
        .into_response()
}

fn installation(id: u64, login: &str) -> Value {
    json!({ "id": id, "account": { "login": login, "type": "Organization" } })
}

pub fn encode_content(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    // GitHub wraps the payload in 60 character lines.
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

async fn repository_installation(
    State(mock): State<MockGitHub>,
    headers: HeaderMap,
    Path((owner, _repo)): Path<(String, String)>,
) -> Response {
    if let Err(response) = mock.require_app_token(&headers) {
        return response;
    }
    match owner.to_ascii_lowercase().as_str() {
        OWNER => Json(installation(INSTALLATION_ID, OWNER)).into_response(),
        REVOKED_OWNER => {
            Json(installation(REVOKED_INSTALLATION_ID, REVOKED_OWNER)).into_response()
        }
        FORBIDDEN_OWNER => github_error(
            StatusCode::FORBIDDEN,
            "Resource not accessible by integration",
        ),
        FLAKY_OWNER => github_error(StatusCode::BAD_GATEWAY, "Server Error"),
        _ => github_error(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn list_installations(State(mock): State<MockGitHub>, headers: HeaderMap) -> Response {
    if let Err(response) = mock.require_app_token(&headers) {
        return response;
    }
    Json(json!([installation(7, "someone-else"), installation(INSTALLATION_ID, "Acme")]))
        .into_response()
}

async fn access_tokens(
    State(mock): State<MockGitHub>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if let Err(response) = mock.require_app_token(&headers) {
        return response;
    }
    if id != INSTALLATION_ID {
        return github_error(StatusCode::NOT_FOUND, "Not Found");
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "token": INSTALLATION_TOKEN,
            "expires_at": "2030-01-01T00:00:00Z",
            "permissions": { "contents": "read" },
        })),
    )
        .into_response()
}

async fn contents(
    State(mock): State<MockGitHub>,
    headers: HeaderMap,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
) -> Response {
    if mock.record(&headers) != INSTALLATION_TOKEN {
        return github_error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let body = match path.as_str() {
        "data.json" => r#"{"a":1}"#,
        "jellyfish.json" => r#"{"species":"moon jelly","count":3}"#,
        "broken.json" => "{not json",
        _ => return github_error(StatusCode::NOT_FOUND, "Not Found"),
    };
    Json(json!({
        "type": "file",
        "encoding": "base64",
        "size": body.len(),
        "name": path,
        "path": path,
        "sha": "3d21ec53a331a6f037a91c368710b99387d012c1",
        "content": encode_content(body),
    }))
    .into_response()
}

/// Starts the mock on an ephemeral port and returns it with its base URL.
pub async fn spawn_mock_github() -> (MockGitHub, String) {
    let mock = MockGitHub::default();
    let router = Router::new()
        .route("/repos/{owner}/{repo}/installation", get(repository_installation))
        .route("/app/installations", get(list_installations))
        .route("/app/installations/{id}/access_tokens", post(access_tokens))
        .route("/repos/{owner}/{repo}/contents/{*path}", get(contents))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (mock, format!("http://{addr}"))
}

pub fn settings(vars: &[(&str, &str)]) -> Settings {
    let vars: Vec<(String, String)> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_vars(|name| {
        vars.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

pub fn configured_settings(api_url: &str, extra: &[(&str, &str)]) -> Settings {
    let mut vars = vec![
        ("GITHUB_APP_ID", APP_ID),
        ("GITHUB_PRIVATE_KEY", PRIVATE_KEY),
        ("GITHUB_API_URL", api_url),
    ];
    vars.extend_from_slice(extra);
    settings(&vars)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn call(settings: Settings, uri: &str) -> TestResponse {
    let app = gh_contents::create_root_app(AppState::new(settings));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}
