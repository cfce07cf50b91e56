//! filedrop server - chunked file transfer over gRPC.
//!
//! Serves the `filedrop.v1.FileService` gRPC API alongside an HTTP API and a
//! WebSocket feed of file-list changes. The registry is in memory only.

use anyhow::Result;
use clap::Parser;
use filedrop_server::{logging, server, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    logging::init_logging(config.debug, config.log_json);

    info!("filedrop server v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    server::run(config, shutdown).await
}
