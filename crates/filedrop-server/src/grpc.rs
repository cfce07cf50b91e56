//! gRPC server implementation of `FileService`.
//!
//! Translates between the protobuf messages and core frames. All state lives
//! in the shared [`AppState`]; the service itself holds nothing else.

use crate::error::{aborted_from, to_status};
use crate::state::AppState;
use bytes::Bytes;
use filedrop_core::{FileInfo, Frame};
use filedrop_proto::file_service_server::{FileService, FileServiceServer};
use filedrop_proto::upload_file_request::Data;
use filedrop_proto::{
    DeleteFileRequest, DeleteFileResponse, DownloadFileRequest, DownloadFileResponse, FileEntry,
    ListFilesRequest, ListFilesResponse, UploadFileRequest, UploadFileResponse,
};
use futures::{future, StreamExt};
use std::pin::Pin;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, error, info, warn};

/// Convert one wire message into a frame. Messages with no payload set are
/// skipped.
pub fn frame_from_wire(message: UploadFileRequest) -> Option<Frame> {
    match message.data? {
        Data::Info(info) => Some(Frame::Metadata(FileInfo::new(
            info.filename,
            info.content_type,
        ))),
        Data::Chunk(chunk) => Some(Frame::Chunk(Bytes::from(chunk))),
    }
}

pub struct FileServiceImpl {
    state: AppState,
}

impl FileServiceImpl {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Wrap into the tonic service type
    pub fn into_service(self) -> FileServiceServer<Self> {
        FileServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl FileService for FileServiceImpl {
    /// Receives a metadata frame followed by chunk frames and registers the
    /// file once the client closes its side.
    async fn upload_file(
        &self,
        request: Request<Streaming<UploadFileRequest>>,
    ) -> Result<Response<UploadFileResponse>, Status> {
        let remote = request.remote_addr();
        let tracker = self.state.begin_upload();
        let frames = request.into_inner().filter_map(|message| {
            future::ready(match message {
                Ok(message) => frame_from_wire(message).map(Ok),
                Err(status) => Some(Err(aborted_from(status))),
            })
        });

        let result = self.state.depot.upload(frames).await;
        tracker.finish(&result);
        let metadata = result.map_err(|e| {
            warn!("Upload from {:?} failed: {}", remote, e);
            to_status(e)
        })?;

        self.state.notify_changed();

        Ok(Response::new(UploadFileResponse {
            success: true,
            message: "File uploaded successfully".to_string(),
            file_id: metadata.file_id,
        }))
    }

    type DownloadFileStream =
        Pin<Box<dyn Stream<Item = Result<DownloadFileResponse, Status>> + Send>>;

    /// Streams a stored file back as chunk frames.
    ///
    /// An unknown identifier fails before the response stream is created.
    async fn download_file(
        &self,
        request: Request<DownloadFileRequest>,
    ) -> Result<Response<Self::DownloadFileStream>, Status> {
        let file_id = request.into_inner().file_id;

        let download = self.state.depot.download(&file_id).await.map_err(|e| {
            debug!("Download of {} refused: {}", file_id, e);
            to_status(e)
        })?;

        let (tx, rx) = tokio::sync::mpsc::channel(16);

        tokio::spawn(async move {
            let mut chunks = download.chunks;
            let mut sent: u64 = 0;

            while let Some(chunk) = chunks.next().await {
                let message = match chunk {
                    Ok(bytes) => {
                        sent += bytes.len() as u64;
                        Ok(DownloadFileResponse {
                            chunk: bytes.to_vec(),
                        })
                    }
                    Err(e) => {
                        error!("Error reading {} after {} bytes: {}", file_id, sent, e);
                        Err(to_status(e))
                    }
                };

                let failed = message.is_err();
                if tx.send(message).await.is_err() {
                    debug!("Client disconnected during download of {}", file_id);
                    return;
                }
                if failed {
                    return;
                }
            }

            info!("Download of {} complete: {} bytes", file_id, sent);
        });

        let stream = ReceiverStream::new(rx);
        Ok(Response::new(Box::pin(stream) as Self::DownloadFileStream))
    }

    async fn list_files(
        &self,
        _request: Request<ListFilesRequest>,
    ) -> Result<Response<ListFilesResponse>, Status> {
        let files = self
            .state
            .depot
            .list()
            .into_iter()
            .map(|meta| FileEntry {
                file_id: meta.file_id,
                filename: meta.filename,
                size: meta.size,
                uploaded_at: meta.uploaded_at.to_rfc3339(),
                content_type: meta.content_type,
            })
            .collect();

        Ok(Response::new(ListFilesResponse { files }))
    }

    async fn delete_file(
        &self,
        request: Request<DeleteFileRequest>,
    ) -> Result<Response<DeleteFileResponse>, Status> {
        let file_id = request.into_inner().file_id;

        if !self.state.depot.delete(&file_id) {
            return Err(Status::not_found("File not found"));
        }

        self.state.notify_changed();

        Ok(Response::new(DeleteFileResponse {
            success: true,
            message: "File deleted successfully".to_string(),
        }))
    }
}
