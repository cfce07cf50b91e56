//! Upload pipeline: frame stream in, registered object out

use crate::codec::{Frame, FrameAssembler};
use crate::error::Result;
use crate::id::generate_file_id;
use crate::registry::Registry;
use crate::storage::ByteStorage;
use crate::types::{FileMetadata, StoredObject, DEFAULT_CONTENT_TYPE};
use chrono::Utc;
use futures::{Stream, StreamExt};
use std::path::Path;
use tracing::{debug, info, warn};

/// Storage name for an upload: the identifier plus the original extension.
///
/// Extensions that are not plain alphanumerics are dropped rather than
/// passed through to storage.
pub fn object_name(file_id: &str, filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{}.{}", file_id, ext),
        None => file_id.to_string(),
    }
}

/// Consume one inbound transfer and register the result.
///
/// The transport is responsible for turning its own stream failures into
/// `TransferError::TransferAborted` items. Any error, whether from the
/// stream, the framing rules or storage, returns before the registry is
/// touched, so a failed upload leaves no entry behind.
pub async fn receive_upload<S>(
    registry: &Registry,
    storage: &dyn ByteStorage,
    frames: S,
) -> Result<FileMetadata>
where
    S: Stream<Item = Result<Frame>>,
{
    futures::pin_mut!(frames);

    let mut assembler = FrameAssembler::new();
    while let Some(frame) = frames.next().await {
        let frame = frame.inspect_err(|e| {
            warn!(
                "Upload stream failed after {} bytes: {}",
                assembler.received(),
                e
            )
        })?;
        assembler.accept(frame)?;
    }

    let chunk_count = assembler.chunk_count();
    let (file_info, payload) = assembler.finish()?;
    let size = payload.len() as u64;

    let file_id = generate_file_id();
    let name = object_name(&file_id, &file_info.filename);
    debug!(
        "Upload of {} complete: {} bytes in {} chunks, storing as {}",
        file_info.filename, size, chunk_count, name
    );

    let locator = storage.write(&name, payload).await?;

    let content_type = if file_info.content_type.is_empty() {
        DEFAULT_CONTENT_TYPE.to_string()
    } else {
        file_info.content_type
    };

    let metadata = FileMetadata {
        file_id,
        filename: file_info.filename,
        size,
        content_type,
        uploaded_at: Utc::now(),
    };

    registry.put(StoredObject {
        metadata: metadata.clone(),
        locator,
    });

    info!(
        "Registered {} ({}, {} bytes)",
        metadata.file_id, metadata.filename, metadata.size
    );

    Ok(metadata)
}
