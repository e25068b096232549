//! Schema repository server.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file (optional)          built-in defaults
//!            │                             │
//!            └──────────▶ overlay ◀────────┘
//!                            │
//!                            ▼
//!                  effective Configuration
//!                            │
//!             ┌──────────────┼──────────────┐
//!             ▼              ▼              ▼
//!        log bridge    ServiceGraph    listener settings
//!                     (repository,
//!                      validators,
//!                      codec, config)
//!                            │
//!                            ▼
//!                       route table
//!              machine │ human │ auxiliary
//!                            │
//!                            ▼
//!                  RepositoryServer: start ─▶ serve ─▶ stop
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;

use schema_repo_server::config::loader;
use schema_repo_server::lifecycle::signals;
use schema_repo_server::observability::logging;
use schema_repo_server::RepositoryServer;

#[derive(Parser)]
#[command(name = "schema-repo-server")]
#[command(about = "Schema repository HTTP server", long_about = None)]
struct Args {
    /// TOML file whose keys override the built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logging::init_tracing(logging::DEFAULT_FILTER)?;
    tracing::info!("schema-repo-server v{} starting", env!("CARGO_PKG_VERSION"));

    let overrides = match &args.config {
        Some(path) => {
            let overrides = loader::load_overrides(path)?;
            tracing::info!(
                path = %path.display(),
                keys = overrides.len(),
                "Configuration file loaded"
            );
            overrides
        }
        None => BTreeMap::new(),
    };

    let mut server = RepositoryServer::new(overrides)?;
    let addr = server.start().await?;
    tracing::info!(address = %addr, base_url = %server.base_url(), "Listening for connections");

    signals::wait_for_termination().await;

    server.stop().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
