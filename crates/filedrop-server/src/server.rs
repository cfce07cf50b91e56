//! Process wiring: storage, shared state and both listeners

use crate::config::ServerConfig;
use crate::grpc::FileServiceImpl;
use crate::http;
use crate::state::AppState;
use anyhow::{Context, Result};
use filedrop_core::{Depot, LocalStorage, Registry};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tracing::info;

/// Build the shared state for a server writing into `config.upload_dir`.
pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let storage = LocalStorage::new(&config.upload_dir);
    storage.ensure_root().await.with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    let depot = Depot::new(Arc::new(Registry::new()), Arc::new(storage))
        .with_chunk_size(config.chunk_size);
    Ok(AppState::new(depot))
}

/// Run the gRPC and HTTP listeners until `shutdown` resolves.
pub async fn run(config: ServerConfig, shutdown: impl Future<Output = ()>) -> Result<()> {
    config.validate()?;

    let grpc_addr = config.grpc_addr()?;
    let http_addr = config.http_addr()?;
    let state = build_state(&config).await?;

    info!("Upload directory: {}", config.upload_dir.display());

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(filedrop_proto::FILE_DESCRIPTOR_SET)
        .build_v1()
        .context("Failed to build reflection service")?;

    let token = CancellationToken::new();

    let grpc_server = Server::builder()
        .add_service(reflection)
        .add_service(FileServiceImpl::new(state.clone()).into_service())
        .serve_with_shutdown(grpc_addr, token.clone().cancelled_owned());

    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", http_addr))?;
    let http_server = axum::serve(listener, http::router(state))
        .with_graceful_shutdown(token.clone().cancelled_owned());

    info!("gRPC server running on {}", grpc_addr);
    info!("HTTP server running on http://{}", http_addr);
    info!("WebSocket server running on ws://{}/ws", http_addr);

    let grpc_task = tokio::spawn(grpc_server);
    let http_task = tokio::spawn(async move { http_server.await });

    shutdown.await;
    info!("Shutting down servers...");
    token.cancel();

    grpc_task
        .await
        .context("gRPC server task panicked")?
        .context("gRPC server failed")?;
    info!("gRPC server closed");

    http_task
        .await
        .context("HTTP server task panicked")?
        .context("HTTP server failed")?;
    info!("HTTP server closed");

    Ok(())
}
