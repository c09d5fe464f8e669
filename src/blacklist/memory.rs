use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{token_hash, TokenBlacklist};
use crate::database::DatabaseError;

/// Process-local blacklist for tests and single-node development
#[derive(Debug, Default)]
pub struct MemoryBlacklist {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl TokenBlacklist for MemoryBlacklist {
    async fn is_revoked(&self, token: &str) -> Result<bool, DatabaseError> {
        Ok(self.entries.read().await.contains_key(&token_hash(token)))
    }

    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.entries
            .write()
            .await
            .entry(token_hash(token))
            .or_insert(expires_at);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, DatabaseError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
