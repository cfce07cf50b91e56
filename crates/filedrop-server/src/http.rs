//! HTTP polling API and WebSocket push channel
//!
//! Routes:
//!
//! - `GET    /api/files`       list all files
//! - `POST   /api/files`       multipart upload (field `file`)
//! - `GET    /api/files/:id`   download
//! - `DELETE /api/files/:id`   delete
//! - `GET    /ws`              file-list push channel
//!
//! Uploads go through the same core pipeline as gRPC uploads, and both
//! transports publish changes to the same broadcast channel.

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, FileEvent};
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Multipart, Path, State, WebSocketUpgrade,
    },
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use filedrop_core::{FileInfo, FileMetadata, Frame, TransferError, DEFAULT_CONTENT_TYPE};
use futures::{stream, SinkExt, StreamExt};
use serde::Serialize;
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the HTTP router over shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/files", get(list_files).post(upload_file))
        .route("/api/files/:file_id", get(download_file).delete(delete_file))
        .route("/ws", get(ws_handler))
        .route(
            "/api/health",
            get(|State(state): State<AppState>| async move {
                Json(serde_json::json!({
                    "status": "ok",
                    "service": "filedrop",
                    "version": env!("CARGO_PKG_VERSION"),
                    "uploads": state.upload_stats(),
                }))
            }),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub message: String,
    pub files: Vec<FileMetadata>,
}

pub async fn list_files(State(state): State<AppState>) -> Json<Vec<FileMetadata>> {
    Json(state.depot.list())
}

/// Accepts a multipart form whose `file` part is streamed through the upload
/// pipeline chunk by chunk.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let info = FileInfo::new(
            field.file_name().unwrap_or("unnamed"),
            field.content_type().unwrap_or(DEFAULT_CONTENT_TYPE),
        );

        let chunks = stream::unfold(field, |mut field| async move {
            match field.chunk().await {
                Ok(Some(bytes)) => Some((Ok(Frame::Chunk(bytes)), field)),
                Ok(None) => None,
                Err(e) => Some((Err(TransferError::TransferAborted(e.to_string())), field)),
            }
        });
        let frames = stream::once(async move { Ok(Frame::Metadata(info)) }).chain(chunks);

        let tracker = state.begin_upload();
        let result = state.depot.upload(frames).await;
        tracker.finish(&result);
        let metadata = result?;
        state.notify_changed();

        return Ok(Json(UploadResponse {
            file_id: metadata.file_id,
            message: "File uploaded successfully".to_string(),
            files: state.depot.list(),
        }));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> ApiResult<Response> {
    let download = state.depot.download(&file_id).await?;
    let meta = &download.metadata;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        meta.filename.replace(['"', '\\', '\r', '\n'], "_")
    );

    Response::builder()
        .header(header::CONTENT_TYPE, meta.content_type.as_str())
        .header(header::CONTENT_LENGTH, meta.size)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(download.chunks))
        .map_err(|e| ApiError::Internal(format!("Invalid response headers: {}", e)))
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.depot.delete(&file_id) {
        return Err(ApiError::NotFound("File not found".to_string()));
    }

    state.notify_changed();
    Ok(Json(
        serde_json::json!({ "message": "File deleted successfully" }),
    ))
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn encode(event: &FileEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!("Failed to serialize event: {}", e);
            None
        }
    }
}

/// Sends the current file list on connect, then again after every change.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut event_rx = state.subscribe();

    tracing::info!("WebSocket client connected");

    if let Some(message) = encode(&state.snapshot()) {
        if sender.send(message).await.is_err() {
            return;
        }
    }

    loop {
        select! {
            event = event_rx.recv() => {
                let event = match event {
                    Ok(event) => event,
                    // Missed some updates; the latest snapshot supersedes them
                    Err(RecvError::Lagged(_)) => state.snapshot(),
                    Err(RecvError::Closed) => break,
                };
                if let Some(message) = encode(&event) {
                    if sender.send(message).await.is_err() {
                        tracing::debug!("Client disconnected");
                        break;
                    }
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    tracing::info!("WebSocket client disconnected");
}
