use clap::Parser;
use tracing_subscriber::EnvFilter;

use astro_api::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and JWT_SECRET can live there
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("astro_api=info,tower_http=info")),
        )
        .init();

    cli::run(Cli::parse()).await
}
