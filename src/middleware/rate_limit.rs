use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::{RateLimitConfig, RateLimitRule};
use crate::error::ApiError;

/// Windows are pruned once this many clients are being tracked
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window ends
    pub reset_secs: u64,
}

/// Fixed-window request counter keyed by client
#[derive(Debug)]
pub struct RateLimiter {
    rule: RateLimitRule,
    enabled: bool,
    windows: RwLock<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(rule: RateLimitRule, enabled: bool) -> Self {
        Self {
            rule,
            enabled,
            windows: RwLock::new(HashMap::new()),
        }
    }

    pub async fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let window_len = Duration::from_secs(self.rule.window_secs.max(1));
        let mut windows = self.windows.write().await;

        if windows.len() >= PRUNE_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < window_len);
        }

        let window = windows.entry(key.to_string()).or_insert(Window { count: 0, started: now });
        if now.duration_since(window.started) >= window_len {
            *window = Window { count: 0, started: now };
        }

        let allowed = window.count < self.rule.max;
        if allowed {
            window.count += 1;
        }

        let elapsed = now.duration_since(window.started);
        let reset = window_len.saturating_sub(elapsed);
        RateLimitDecision {
            allowed,
            limit: self.rule.max,
            remaining: self.rule.max.saturating_sub(window.count),
            reset_secs: reset.as_secs() + u64::from(reset.subsec_nanos() > 0),
        }
    }
}

/// One limiter per request class
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub get: Arc<RateLimiter>,
    pub head: Arc<RateLimiter>,
    pub cud: Arc<RateLimiter>,
    pub options: Arc<RateLimiter>,
    pub auth: Arc<RateLimiter>,
}

impl RateLimits {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let limiter = |rule: RateLimitRule| Arc::new(RateLimiter::new(rule, config.enabled));
        Self {
            get: limiter(config.get),
            head: limiter(config.head),
            cud: limiter(config.cud),
            options: limiter(config.options),
            auth: limiter(config.auth),
        }
    }
}

/// Client identity: first `X-Forwarded-For` hop, then the peer address
pub fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(State(limiter): State<Arc<RateLimiter>>, request: Request, next: Next) -> Response {
    if !limiter.enabled {
        return next.run(request).await;
    }

    let key = client_key(&request);
    let decision = limiter.check(&key).await;

    if !decision.allowed {
        warn!("Rate limit exceeded for {} on {} {}", key, request.method(), request.uri().path());
        let mut response = ApiError::too_many_requests("Too many requests, please try again later.").into_response();
        apply_headers(response.headers_mut(), &decision);
        response
            .headers_mut()
            .insert(HeaderName::from_static("retry-after"), HeaderValue::from(decision.reset_secs));
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(response.headers_mut(), &decision);
    response
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(HeaderName::from_static("ratelimit-limit"), HeaderValue::from(decision.limit));
    headers.insert(HeaderName::from_static("ratelimit-remaining"), HeaderValue::from(decision.remaining));
    headers.insert(HeaderName::from_static("ratelimit-reset"), HeaderValue::from(decision.reset_secs));
}
