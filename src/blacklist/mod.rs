//! Revoked-token store consulted by the authentication middleware.

mod memory;
mod postgres;

pub use memory::MemoryBlacklist;
pub use postgres::PgBlacklist;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::database::DatabaseError;

#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    async fn is_revoked(&self, token: &str) -> Result<bool, DatabaseError>;

    /// Revoking an already revoked token is a no-op
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), DatabaseError>;

    /// Drop entries whose token has expired anyway; returns how many were removed
    async fn purge_expired(&self) -> Result<u64, DatabaseError>;
}

/// Tokens are stored as SHA-256 hex digests, never verbatim
pub fn token_hash(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Periodically purge expired entries until the runtime shuts down
pub fn spawn_purge_task(blacklist: Arc<dyn TokenBlacklist>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match blacklist.purge_expired().await {
                Ok(0) => debug!("Blacklist purge: nothing to remove"),
                Ok(n) => info!("Blacklist purge removed {} expired tokens", n),
                Err(e) => error!("Blacklist purge failed: {}", e),
            }
        }
    })
}
