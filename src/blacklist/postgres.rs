use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::{token_hash, TokenBlacklist};
use crate::database::DatabaseError;

/// Blacklist backed by the `Blacklist` table so revocations survive restarts
/// and are shared between instances.
#[derive(Clone)]
pub struct PgBlacklist {
    pool: PgPool,
}

impl PgBlacklist {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklist for PgBlacklist {
    async fn is_revoked(&self, token: &str) -> Result<bool, DatabaseError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM \"Blacklist\" WHERE \"tokenHash\" = $1) AS found")
            .bind(token_hash(token))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("found")?)
    }

    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"INSERT INTO "Blacklist" ("tokenHash", "expiresAt") VALUES ($1, $2)
               ON CONFLICT ("tokenHash") DO NOTHING"#,
        )
        .bind(token_hash(token))
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM \"Blacklist\" WHERE \"expiresAt\" <= now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
