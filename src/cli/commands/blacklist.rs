use anyhow::Context;

use crate::blacklist::{PgBlacklist, TokenBlacklist};
use crate::config;
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config::config().database)
        .await
        .context("failed to connect to database")?;
    let removed = PgBlacklist::new(pool)
        .purge_expired()
        .await
        .context("failed to purge blacklist")?;
    println!("Removed {} expired tokens", removed);
    Ok(())
}
