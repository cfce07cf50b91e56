//! TransferClient: chunked uploads and downloads against a filedrop server

use crate::error::{ClientError, Result};
use crate::sink::DownloadSink;
use chrono::{DateTime, Utc};
use filedrop_core::{read_chunks, FileMetadata, TransferProgress, DEFAULT_CHUNK_SIZE};
use filedrop_proto::file_service_client::FileServiceClient;
use filedrop_proto::upload_file_request::Data;
use filedrop_proto::{
    DeleteFileRequest, DownloadFileRequest, FileEntry, FileInfo, ListFilesRequest,
    UploadFileRequest,
};
use futures::{stream, StreamExt};
use prost::Message;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tonic::transport::Channel;
use tonic::Code;
use tracing::{debug, info, warn};

/// Messages handed from the source reader to the outbound request stream
enum Outbound {
    Frame(UploadFileRequest),
    Finish,
}

/// Room for the oneof tag and length prefix around a payload
const FRAME_OVERHEAD: usize = 16;

/// Largest encoded upload message a transfer may send: big enough for the
/// metadata frame and any full chunk.
fn encoding_limit(chunk_size: usize, info: &FileInfo) -> usize {
    chunk_size.max(info.encoded_len()) + FRAME_OVERHEAD
}

/// A chunk frame the encoder is guaranteed to refuse under `limit`
fn oversized_frame(limit: usize) -> UploadFileRequest {
    UploadFileRequest {
        data: Some(Data::Chunk(vec![0; limit + 1])),
    }
}

/// Client for a filedrop gRPC server.
///
/// Cheap to clone; clones share the underlying channel.
///
/// # Example
///
/// ```rust,no_run
/// use filedrop_connect::TransferClient;
///
/// # async fn example() -> Result<(), filedrop_connect::ClientError> {
/// let client = TransferClient::connect("http://localhost:50051").await?;
///
/// let file_id = client
///     .upload_file("report.pdf", |p| println!("{:.0}%", p.fraction() * 100.0))
///     .await?;
/// client.download_file(&file_id, "copy.pdf", |_| {}).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TransferClient {
    client: FileServiceClient<Channel>,
    chunk_size: usize,
}

impl TransferClient {
    /// Connect to a server at `addr` (e.g. `http://localhost:50051`)
    pub async fn connect(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        debug!("Connecting to {}", addr);
        let client = FileServiceClient::connect(addr).await?;
        Ok(Self::new(client))
    }

    /// Wrap an already connected generated client
    pub fn new(client: FileServiceClient<Channel>) -> Self {
        Self {
            client,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the size of outbound upload chunks
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// All files currently held by the server
    pub async fn list(&self) -> Result<Vec<FileMetadata>> {
        let response = self
            .client
            .clone()
            .list_files(ListFilesRequest {})
            .await?
            .into_inner();

        response.files.into_iter().map(metadata_from_wire).collect()
    }

    /// Metadata for a single file, resolved through the listing
    pub async fn stat(&self, file_id: &str) -> Result<FileMetadata> {
        self.list()
            .await?
            .into_iter()
            .find(|meta| meta.file_id == file_id)
            .ok_or_else(|| ClientError::NotFound(file_id.to_string()))
    }

    /// Delete a file. Returns `false` when the server holds no such file.
    pub async fn delete(&self, file_id: &str) -> Result<bool> {
        let request = DeleteFileRequest {
            file_id: file_id.to_string(),
        };

        match self.client.clone().delete_file(request).await {
            Ok(response) => {
                let response = response.into_inner();
                debug!("Delete {}: {}", file_id, response.message);
                Ok(response.success)
            }
            Err(status) if status.code() == Code::NotFound => Ok(false),
            Err(status) => Err(status.into()),
        }
    }

    /// Upload `total` bytes read from `source` and return the new identifier.
    ///
    /// `progress` is called after every chunk is handed to the transport. An
    /// empty source reports completion once, after the metadata frame. If the
    /// source fails, or this future is dropped mid-transfer, the request stream
    /// is reset instead of closed, so the server discards everything it
    /// received.
    pub async fn upload<R, F>(
        &self,
        filename: &str,
        content_type: &str,
        source: R,
        total: u64,
        mut progress: F,
    ) -> Result<String>
    where
        R: AsyncRead + Unpin + Send + 'static,
        F: FnMut(TransferProgress) + Send,
    {
        let (tx, rx) = mpsc::channel::<Outbound>(8);
        let chunk_size = self.chunk_size;
        let info = FileInfo {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        };
        let limit = encoding_limit(chunk_size, &info);

        let feed = async move {
            let closed =
                || ClientError::TransferAborted("server closed the upload stream".to_string());

            tx.send(Outbound::Frame(UploadFileRequest {
                data: Some(Data::Info(info)),
            }))
            .await
            .map_err(|_| closed())?;

            let mut chunks = read_chunks(source, chunk_size);
            let mut sent: u64 = 0;

            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                sent += chunk.len() as u64;
                tx.send(Outbound::Frame(UploadFileRequest {
                    data: Some(Data::Chunk(chunk.to_vec())),
                }))
                .await
                .map_err(|_| closed())?;
                progress(TransferProgress::new(sent, total));
            }

            if sent == 0 {
                progress(TransferProgress::new(0, total));
            }

            tx.send(Outbound::Finish).await.map_err(|_| closed())?;
            Ok::<_, ClientError>(sent)
        };

        // The request body outlives this call inside the connection task, so
        // it must fail on its own when the feeder goes away. A frame over the
        // encoding limit makes tonic fail the body and the stream is reset.
        let outbound = stream::unfold(Some(rx), move |rx| async move {
            let mut rx = rx?;
            match rx.recv().await {
                Some(Outbound::Frame(message)) => Some((message, Some(rx))),
                Some(Outbound::Finish) => None,
                None => {
                    debug!("Upload feeder stopped early, resetting the request stream");
                    Some((oversized_frame(limit), None))
                }
            }
        });

        let mut client = self.client.clone().max_encoding_message_size(limit);
        let call = async move {
            client
                .upload_file(outbound)
                .await
                .map_err(ClientError::from)
        };

        let (fed, called) = tokio::join!(feed, call);
        let (sent, response) = match (fed, called) {
            (Ok(sent), Ok(response)) => (sent, response.into_inner()),
            // A local source failure explains the reset better than the status it caused
            (Err(e @ ClientError::Io(_)), _) => return Err(e),
            (_, Err(e)) => return Err(e),
            (Err(e), Ok(_)) => return Err(e),
        };

        if !response.success {
            return Err(ClientError::TransferAborted(response.message));
        }

        info!(
            "Uploaded {} ({} bytes) as {}",
            filename, sent, response.file_id
        );
        Ok(response.file_id)
    }

    /// Upload a local file. The filename is the final path component and the
    /// content type is guessed from its extension.
    pub async fn upload_file<F>(&self, path: impl AsRef<Path>, progress: F) -> Result<String>
    where
        F: FnMut(TransferProgress) + Send,
    {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                ClientError::InvalidRequest(format!("{} has no file name", path.display()))
            })?;
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        let file = tokio::fs::File::open(path).await?;
        let total = file.metadata().await?.len();

        self.upload(&filename, &content_type, file, total, progress)
            .await
    }

    /// Download a file into `sink` and return its metadata.
    ///
    /// The size is looked up in the listing first, so an unknown identifier
    /// fails before any stream is opened. If the transfer fails after that,
    /// the sink is discarded before the error is returned.
    pub async fn download<W, F>(
        &self,
        file_id: &str,
        sink: &mut W,
        progress: F,
    ) -> Result<FileMetadata>
    where
        W: DownloadSink + ?Sized,
        F: FnMut(TransferProgress),
    {
        let metadata = self.stat(file_id).await?;

        if let Err(e) = self.receive(&metadata, sink, progress).await {
            if let Err(cleanup) = sink.discard().await {
                warn!("Failed to discard partial download of {}: {}", file_id, cleanup);
            }
            return Err(e);
        }

        Ok(metadata)
    }

    /// Download a file to `path`, removing the output again if the transfer
    /// fails.
    pub async fn download_file<F>(
        &self,
        file_id: &str,
        path: impl AsRef<Path>,
        progress: F,
    ) -> Result<FileMetadata>
    where
        F: FnMut(TransferProgress),
    {
        let path = path.as_ref();
        let metadata = self.stat(file_id).await?;

        let mut file = tokio::fs::File::create(path).await?;
        let result = self.receive(&metadata, &mut file, progress).await;
        drop(file);

        if let Err(e) = result {
            if let Err(cleanup) = tokio::fs::remove_file(path).await {
                warn!(
                    "Failed to remove partial download {}: {}",
                    path.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        Ok(metadata)
    }

    async fn receive<W, F>(
        &self,
        metadata: &FileMetadata,
        sink: &mut W,
        mut progress: F,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
        F: FnMut(TransferProgress),
    {
        let total = metadata.size;
        let mut stream = self
            .client
            .clone()
            .download_file(DownloadFileRequest {
                file_id: metadata.file_id.clone(),
            })
            .await?
            .into_inner();

        let mut received: u64 = 0;
        while let Some(message) = stream.message().await? {
            sink.write_all(&message.chunk).await?;
            received += message.chunk.len() as u64;
            progress(TransferProgress::new(received, total));
        }
        sink.flush().await?;

        if received != total {
            return Err(ClientError::TransferAborted(format!(
                "expected {} bytes for {}, received {}",
                total, metadata.file_id, received
            )));
        }

        if received == 0 {
            progress(TransferProgress::new(0, 0));
        }

        info!("Downloaded {} ({} bytes)", metadata.file_id, received);
        Ok(received)
    }
}

fn metadata_from_wire(entry: FileEntry) -> Result<FileMetadata> {
    let uploaded_at = DateTime::parse_from_rfc3339(&entry.uploaded_at)
        .map_err(|e| {
            ClientError::InvalidResponse(format!(
                "bad timestamp {:?} for {}: {}",
                entry.uploaded_at, entry.file_id, e
            ))
        })?
        .with_timezone(&Utc);

    Ok(FileMetadata {
        file_id: entry.file_id,
        filename: entry.filename,
        size: entry.size,
        content_type: entry.content_type,
        uploaded_at,
    })
}
