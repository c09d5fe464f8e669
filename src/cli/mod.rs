pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "astro-api")]
#[command(about = "Astronomy catalog REST API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overriding PORT / ASTRO_API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Delete expired entries from the token blacklist")]
    PurgeBlacklist,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Migrate => commands::migrate::handle().await,
        Commands::PurgeBlacklist => commands::blacklist::handle().await,
    }
}
