//! End-to-end tests for the CLI commands against an in-process server

use filedrop::commands;
use filedrop_connect::TransferClient;
use filedrop_core::{Depot, MemoryStorage, Registry};
use filedrop_server::{AppState, FileServiceImpl};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

async fn start_server() -> (TransferClient, AppState) {
    let depot = Depot::new(Arc::new(Registry::new()), Arc::new(MemoryStorage::new()))
        .with_chunk_size(8);
    let state = AppState::new(depot);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = FileServiceImpl::new(state.clone()).into_service();

    tokio::spawn(async move {
        Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .expect("gRPC server failed");
    });

    let client = TransferClient::connect(format!("http://{}", addr))
        .await
        .unwrap()
        .with_chunk_size(16);
    (client, state)
}

#[tokio::test]
async fn test_upload_list_download_delete() {
    let (client, state) = start_server().await;
    let dir = tempfile::tempdir().unwrap();

    let source = dir.path().join("report.txt");
    std::fs::write(&source, b"quarterly numbers, all of them").unwrap();

    let file_id = commands::upload(&client, &source).await.unwrap();
    assert_eq!(state.depot.list().len(), 1);

    let files = commands::list(&client).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_id, file_id);
    assert_eq!(files[0].filename, "report.txt");

    let target = dir.path().join("copy.txt");
    let written = commands::download(&client, &file_id, Some(target.clone()))
        .await
        .unwrap();
    assert_eq!(written, target);
    assert_eq!(
        std::fs::read(&target).unwrap(),
        b"quarterly numbers, all of them"
    );

    assert!(commands::delete(&client, Some(file_id.clone()), true)
        .await
        .unwrap());
    assert!(state.depot.list().is_empty());
}

#[tokio::test]
async fn test_missing_file_errors() {
    let (client, _state) = start_server().await;
    let dir = tempfile::tempdir().unwrap();

    assert!(commands::upload(&client, &dir.path().join("absent.bin"))
        .await
        .is_err());

    let target = dir.path().join("never.bin");
    assert!(commands::download(&client, "feedface", Some(target.clone()))
        .await
        .is_err());
    assert!(!target.exists());

    assert!(commands::delete(&client, Some("feedface".to_string()), true)
        .await
        .is_err());
}

#[tokio::test]
async fn test_list_empty_server() {
    let (client, _state) = start_server().await;
    assert!(commands::list(&client).await.unwrap().is_empty());
}
