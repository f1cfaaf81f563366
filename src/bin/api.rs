//! Taskdeck API server binary.
//!
//! Opens the database, runs migrations, and starts the HTTP server with
//! the MCP service nested under `/mcp`.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use miette::Diagnostic;
use taskdeck::api::{self, ApiError, Config};
use taskdeck::auth::{AuthConfig, AuthService};
use taskdeck::db::{DbError, SqliteDatabase};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Database error: {0}")]
    #[diagnostic(code(taskdeck::binary::database))]
    Database(#[from] DbError),

    #[error("Failed to create data directory: {0}")]
    #[diagnostic(code(taskdeck::binary::io))]
    Io(#[from] std::io::Error),

    #[error("API server error: {0}")]
    #[diagnostic(code(taskdeck::binary::api))]
    Api(#[from] ApiError),
}

#[derive(Parser)]
#[command(name = "taskdeck-api")]
#[command(author, version, about = "Taskdeck API server", long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Database file path
    #[arg(long, default_value = "taskdeck.db")]
    db: PathBuf,
}

fn cors_origins_from_env() -> Vec<String> {
    std::env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), BinaryError> {
    let cli = Cli::parse();

    println!("Opening database at {:?}", cli.db);

    if let Some(parent) = cli.db.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let db = SqliteDatabase::open(&cli.db).await?;

    db.migrate().await?;
    println!("Database migrations complete");

    let auth = AuthService::new(AuthConfig::from_env());

    api::run(
        Config {
            host: cli.host,
            port: cli.port,
            cors_origins: cors_origins_from_env(),
        },
        db,
        auth,
    )
    .await?;

    Ok(())
}
