#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use buildwise_api::auth::jwt::{generate_access_token, JwtConfig};
use buildwise_api::auth::password::hash_password;
use buildwise_api::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use buildwise_api::router::build_app_router;
use buildwise_api::state::AppState;
use buildwise_db::models::user::{CreateUser, User};
use buildwise_db::repositories::UserRepo;
use buildwise_llm::{CompletionProvider, LlmConfig, LlmError};

pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uploads go to a fresh directory under the system temp dir; it is created
/// on first upload.
pub fn test_config() -> ServerConfig {
    let upload_dir: PathBuf =
        std::env::temp_dir().join(format!("buildwise-test-{}", uuid::Uuid::new_v4()));
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir,
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        llm: LlmConfig::default(),
        bootstrap_admin: None,
    }
}

/// Completion provider that answers every prompt with a fixed reply and
/// remembers what it was asked.
#[derive(Default)]
pub struct FakeCompletion {
    pub reply: String,
    pub fail: bool,
    pub prompts: Mutex<Vec<(String, u32)>>,
}

impl FakeCompletion {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            ..Default::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn prompts(&self) -> Vec<(String, u32)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_tokens));
        if self.fail {
            return Err(LlmError::EmptyResponse);
        }
        Ok(self.reply.clone())
    }
}

/// Build the full application router using the given pool and a provider
/// that always answers "No analysis available.".
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_llm(pool, FakeCompletion::replying("No analysis available."))
}

/// Build the application router with a specific completion provider.
///
/// Uses the production [`build_app_router`] so tests exercise the same
/// middleware stack.
pub fn build_test_app_with_llm(pool: PgPool, llm: Arc<dyn CompletionProvider>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        llm,
    };
    build_app_router(state, &config)
}

/// Build the application router storing uploads under `upload_dir`, so a
/// test can inspect what reached the disk.
pub fn build_test_app_in(pool: PgPool, upload_dir: &Path) -> Router {
    let mut config = test_config();
    config.upload_dir = upload_dir.to_path_buf();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        llm: FakeCompletion::replying("No analysis available."),
    };
    build_app_router(state, &config)
}

/// Count regular files anywhere below `dir`; a missing directory has none.
pub fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

/// Insert an active user with [`TEST_PASSWORD`] directly in the database.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash,
            first_name: role.to_string(),
            last_name: "Tester".to_string(),
            role: role.to_string(),
            company: None,
            address: None,
            phone: None,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Sign an access token for `user` with the test secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, &test_config().jwt)
        .expect("token generation should succeed")
}

/// Create a user and return it with a ready-to-use access token.
pub async fn user_with_token(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let user = create_user(pool, email, role).await;
    let token = token_for(&user);
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should be handled")
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {token}")),
        None => builder,
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    builder(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, builder(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        builder(Method::GET, uri, Some(token)).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        builder(Method::DELETE, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// POST a `multipart/form-data` body with one `file` part plus text fields.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    token: &str,
    file_name: &str,
    file_bytes: &[u8],
    fields: &[(&str, &str)],
) -> Response<Body> {
    let boundary = "buildwise-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    send(
        app,
        builder(Method::POST, uri, Some(token))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}
