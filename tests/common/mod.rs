#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{body::Body, http::Request, response::Response, Router};
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use astro_api::auth::{issue_token, JwtKeys};
use astro_api::blacklist::{MemoryBlacklist, TokenBlacklist};
use astro_api::config::{AppConfig, RateLimitConfig, RateLimitRule};
use astro_api::database::models::User;
use astro_api::database::DatabaseManager;
use astro_api::routes;
use astro_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

// ---------------------------------------------------------------------------
// In-process app driven with `oneshot`. The pool is lazy and never connects,
// so only requests rejected before reaching the database can be exercised.
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub blacklist: Arc<MemoryBlacklist>,
}

pub fn generous_limits() -> RateLimitConfig {
    let rule = RateLimitRule::new(10_000, 60);
    RateLimitConfig {
        enabled: true,
        get: rule,
        head: rule,
        cud: rule,
        options: rule,
        auth: rule,
    }
}

pub fn test_app(limits: RateLimitConfig) -> TestApp {
    let blacklist = Arc::new(MemoryBlacklist::new());
    let (router, state) = build_router(limits, blacklist.clone());
    TestApp { router, state, blacklist }
}

/// Router backed by a caller-supplied blacklist store
pub fn test_router_with(limits: RateLimitConfig, blacklist: Arc<dyn TokenBlacklist>) -> Router {
    build_router(limits, blacklist).0
}

fn build_router(limits: RateLimitConfig, blacklist: Arc<dyn TokenBlacklist>) -> (Router, AppState) {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.rate_limit = limits;

    let pool = DatabaseManager::connect_lazy(&config.database).expect("lazy pool");
    let state = AppState::new(pool, &config, blacklist).expect("app state");
    (routes::app(state.clone(), &config.security.cors_origins), state)
}

pub fn user_with_role(role: &str) -> User {
    User {
        id: Uuid::new_v4(),
        first_name: "Test".into(),
        last_name: "User".into(),
        email_address: format!("{}@astro.com", role.to_lowercase()),
        password: String::new(),
        role: role.into(),
        planet_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn token_for(role: &str) -> String {
    let keys = JwtKeys::new(TEST_SECRET, 1).expect("keys");
    issue_token(&keys, &user_with_role(role)).expect("token").0
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("infallible")
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

// ---------------------------------------------------------------------------
// Live server: spawns the built binary against DATABASE_URL
// ---------------------------------------------------------------------------

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/astro-api");
        cmd.arg("serve")
            .env("ASTRO_API_PORT", port.to_string())
            .env("DATABASE_RUN_MIGRATIONS", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if std::env::var("JWT_SECRET").is_err() {
            cmd.env("JWT_SECRET", TEST_SECRET);
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;
        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
