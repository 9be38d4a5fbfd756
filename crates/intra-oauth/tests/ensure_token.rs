use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use intra_oauth::{CodePrompt, OAuthConfig, OAuthError, OAuthToken, TokenStore, ensure_token};
use serde_json::json;

#[derive(Default)]
struct MockTokenEndpoint {
    refresh_ok: bool,
    requests: Mutex<Vec<HashMap<String, String>>>,
}

impl MockTokenEndpoint {
    fn grants(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|params| params.get("grant_type").cloned())
            .collect()
    }
}

async fn token_handler(
    State(state): State<Arc<MockTokenEndpoint>>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    state.requests.lock().unwrap().push(params.clone());

    match params.get("grant_type").map(String::as_str) {
        Some("authorization_code") if params.get("code").map(String::as_str) == Some("good-code") => {
            Json(json!({
                "access_token": "issued-access",
                "token_type": "bearer",
                "refresh_token": "issued-refresh",
                "expires_in": 7200,
                "scope": "public",
            }))
            .into_response()
        }
        Some("authorization_code")
            if params.get("code").map(String::as_str) == Some("no-refresh-code") =>
        {
            Json(json!({
                "access_token": "issued-access",
                "token_type": "bearer",
                "expires_in": 7200,
            }))
            .into_response()
        }
        Some("refresh_token") if state.refresh_ok => Json(json!({
            "access_token": "refreshed-access",
            "token_type": "bearer",
            "expires_in": 7200,
        }))
        .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response(),
    }
}

async fn spawn_token_endpoint(refresh_ok: bool) -> (String, Arc<MockTokenEndpoint>) {
    let state = Arc::new(MockTokenEndpoint {
        refresh_ok,
        ..Default::default()
    });
    let app = Router::new()
        .route("/oauth/token", post(token_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{}", addr), state)
}

struct ScriptedPrompt {
    code: String,
    urls: Vec<String>,
}

impl ScriptedPrompt {
    fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            urls: Vec::new(),
        }
    }
}

impl CodePrompt for ScriptedPrompt {
    fn read_code(&mut self, auth_url: &str) -> Result<String, OAuthError> {
        self.urls.push(auth_url.to_string());
        Ok(format!("{}\n", self.code))
    }
}

fn stored_token() -> OAuthToken {
    OAuthToken {
        access_token: "stored-access".to_string(),
        token_type: "bearer".to_string(),
        refresh_token: "stored-refresh".to_string(),
        expiry: Utc::now() + Duration::hours(1),
    }
}

fn config(base: &str) -> OAuthConfig {
    OAuthConfig::new("uid".to_string(), "secret".to_string()).with_api_url(base)
}

#[tokio::test]
async fn stored_token_is_refreshed_without_prompting() {
    let (base, endpoint) = spawn_token_endpoint(true).await;
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    store.save(&stored_token()).unwrap();
    let mut prompt = ScriptedPrompt::new("unused");

    let token = ensure_token(&reqwest::Client::new(), &config(&base), &store, &mut prompt)
        .await
        .unwrap();

    assert!(prompt.urls.is_empty());
    assert_eq!(token.access_token, "refreshed-access");
    assert_eq!(token.refresh_token, "stored-refresh");
    assert_eq!(store.load(), Some(token));
    assert_eq!(endpoint.grants(), vec!["refresh_token"]);
}

#[tokio::test]
async fn failed_refresh_keeps_stored_token() {
    let (base, _endpoint) = spawn_token_endpoint(false).await;
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    let stored = stored_token();
    store.save(&stored).unwrap();
    let mut prompt = ScriptedPrompt::new("unused");

    let token = ensure_token(&reqwest::Client::new(), &config(&base), &store, &mut prompt)
        .await
        .unwrap();

    assert!(prompt.urls.is_empty());
    assert_eq!(token, stored);
    assert_eq!(store.load(), Some(stored));
}

#[tokio::test]
async fn missing_token_prompts_once_and_persists() {
    let (base, endpoint) = spawn_token_endpoint(false).await;
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    let mut prompt = ScriptedPrompt::new("good-code");

    let token = ensure_token(&reqwest::Client::new(), &config(&base), &store, &mut prompt)
        .await
        .unwrap();

    assert_eq!(prompt.urls.len(), 1);
    assert!(prompt.urls[0].starts_with(&format!("{}/oauth/authorize?", base)));
    assert_eq!(token.access_token, "issued-access");
    assert_eq!(token.refresh_token, "issued-refresh");
    assert_eq!(store.load(), Some(token));
    assert_eq!(endpoint.grants(), vec!["authorization_code", "refresh_token"]);
}

#[tokio::test]
async fn exchange_without_refresh_token_is_persisted() {
    let (base, endpoint) = spawn_token_endpoint(false).await;
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    let mut prompt = ScriptedPrompt::new("no-refresh-code");

    let token = ensure_token(&reqwest::Client::new(), &config(&base), &store, &mut prompt)
        .await
        .unwrap();

    assert_eq!(prompt.urls.len(), 1);
    assert_eq!(token.access_token, "issued-access");
    assert!(token.refresh_token.is_empty());
    assert_eq!(store.load(), Some(token));
    assert_eq!(endpoint.grants(), vec!["authorization_code", "refresh_token"]);
}

#[tokio::test]
async fn corrupt_token_file_triggers_authorization() {
    let (base, _endpoint) = spawn_token_endpoint(true).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    std::fs::write(&path, "garbage").unwrap();
    let store = TokenStore::new(&path);
    let mut prompt = ScriptedPrompt::new("good-code");

    let token = ensure_token(&reqwest::Client::new(), &config(&base), &store, &mut prompt)
        .await
        .unwrap();

    assert_eq!(prompt.urls.len(), 1);
    assert_eq!(token.access_token, "refreshed-access");
    assert_eq!(token.refresh_token, "issued-refresh");
    assert_eq!(store.load(), Some(token));
}

#[tokio::test]
async fn rejected_code_is_fatal_and_not_persisted() {
    let (base, _endpoint) = spawn_token_endpoint(true).await;
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    let mut prompt = ScriptedPrompt::new("bad-code");

    let err = ensure_token(&reqwest::Client::new(), &config(&base), &store, &mut prompt)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OAuthError::TokenEndpoint { status, .. } if status == reqwest::StatusCode::UNAUTHORIZED
    ));
    assert_eq!(prompt.urls.len(), 1);
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn blank_code_is_rejected() {
    let (base, endpoint) = spawn_token_endpoint(true).await;
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    let mut prompt = ScriptedPrompt::new("   ");

    let err = ensure_token(&reqwest::Client::new(), &config(&base), &store, &mut prompt)
        .await
        .unwrap_err();

    assert!(matches!(err, OAuthError::EmptyCode));
    assert!(endpoint.grants().is_empty());
}
