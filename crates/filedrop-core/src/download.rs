//! Download pipeline: identifier in, chunk stream out

use crate::codec::read_chunks;
use crate::error::{Result, TransferError};
use crate::registry::Registry;
use crate::storage::ByteStorage;
use crate::types::FileMetadata;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::debug;

/// Chunk frames of one download, ending with `StorageFailure` if a read
/// fails partway through.
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// An opened download: the stored metadata and its chunk stream.
pub struct Download {
    pub metadata: FileMetadata,
    pub chunks: ChunkStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Resolve `file_id` and open its bytes.
///
/// Both the lookup and the open happen before any chunk is produced, so
/// `NotFound` (and a storage failure on open) are reported with zero frames
/// emitted. Dropping the returned stream releases the read handle.
pub async fn open_download(
    registry: &Registry,
    storage: &dyn ByteStorage,
    file_id: &str,
    chunk_size: usize,
) -> Result<Download> {
    let object = registry
        .get(file_id)
        .ok_or_else(|| TransferError::NotFound(file_id.to_string()))?;

    let reader = storage.open_read(&object.locator).await?;
    debug!(
        "Streaming {} ({} bytes) in chunks of {}",
        file_id, object.metadata.size, chunk_size
    );

    let chunks = read_chunks(reader, chunk_size)
        .map(|chunk| chunk.map_err(TransferError::from))
        .boxed();

    Ok(Download {
        metadata: object.metadata,
        chunks,
    })
}
