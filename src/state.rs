use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{JwtError, JwtKeys};
use crate::blacklist::TokenBlacklist;
use crate::config::{AppConfig, PaginationConfig};
use crate::middleware::rate_limit::RateLimits;

/// Shared application state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt: Arc<JwtKeys>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub limits: RateLimits,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig, blacklist: Arc<dyn TokenBlacklist>) -> Result<Self, JwtError> {
        Ok(Self {
            pool,
            jwt: Arc::new(JwtKeys::from_config(&config.security)?),
            blacklist,
            limits: RateLimits::from_config(&config.rate_limit),
            pagination: config.pagination.clone(),
        })
    }
}
