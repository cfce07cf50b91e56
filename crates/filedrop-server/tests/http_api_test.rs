//! Integration tests for the HTTP polling API
//!
//! Requests are driven straight through the router with `oneshot`, so no
//! listener is needed.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use filedrop_core::{Depot, MemoryStorage, Registry};
use filedrop_server::http::router;
use filedrop_server::{AppState, FileEvent};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "filedrop-test-boundary";

fn memory_state() -> AppState {
    let depot = Depot::new(Arc::new(Registry::new()), Arc::new(MemoryStorage::new()))
        .with_chunk_size(4);
    AppState::new(depot)
}

fn multipart_request(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/files")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_upload_list_download_delete() {
    let state = memory_state();
    let app = router(state.clone());

    let (status, _, body) = send(
        &app,
        multipart_request("file", "notes.txt", "text/plain", b"hello over http"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let uploaded = json(&body);
    let file_id = uploaded["file_id"].as_str().unwrap().to_string();
    assert_eq!(file_id.len(), 32);
    assert_eq!(uploaded["message"], "File uploaded successfully");
    assert_eq!(uploaded["files"].as_array().unwrap().len(), 1);

    let (status, _, body) = send(&app, get("/api/files")).await;
    assert_eq!(status, StatusCode::OK);
    let files = json(&body);
    let entry = &files.as_array().unwrap()[0];
    assert_eq!(entry["file_id"], file_id.as_str());
    assert_eq!(entry["filename"], "notes.txt");
    assert_eq!(entry["size"], 15);
    assert_eq!(entry["content_type"], "text/plain");

    let (status, headers, body) = send(&app, get(&format!("/api/files/{}", file_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"hello over http");
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(headers[header::CONTENT_LENGTH], "15");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"notes.txt\""
    );

    let (status, _, body) = send(&app, delete(&format!("/api/files/{}", file_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["message"], "File deleted successfully");

    let (status, _, body) = send(&app, get(&format!("/api/files/{}", file_id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "File not found");

    assert!(state.depot.list().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_part_is_rejected() {
    let state = memory_state();
    let app = router(state.clone());

    let (status, _, body) = send(
        &app,
        multipart_request("attachment", "notes.txt", "text/plain", b"ignored"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "No file uploaded");
    assert!(state.depot.list().is_empty());
}

#[tokio::test]
async fn test_delete_unknown_is_not_found() {
    let app = router(memory_state());

    let (status, _, _) = send(&app, delete("/api/files/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_changes_are_published() {
    let state = memory_state();
    let app = router(state.clone());
    let mut events = state.subscribe();

    let (status, _, body) = send(
        &app,
        multipart_request("file", "a.bin", "application/octet-stream", &[1, 2, 3]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let file_id = json(&body)["file_id"].as_str().unwrap().to_string();

    let FileEvent::FileList(files) = events.recv().await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_id, file_id);

    send(&app, delete(&format!("/api/files/{}", file_id))).await;
    let FileEvent::FileList(files) = events.recv().await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_health() {
    let app = router(memory_state());

    send(
        &app,
        multipart_request("file", "a.txt", "text/plain", b"counted"),
    )
    .await;

    let (status, _, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health = json(&body);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["uploads"]["completed"], 1);
    assert_eq!(health["uploads"]["in_flight"], 0);
}
