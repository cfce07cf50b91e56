//! Chunk framing for a single transfer
//!
//! A transfer is exactly one metadata frame followed by zero or more chunk
//! frames, terminated by the sender closing its side of the stream. There is
//! no end marker and no size field: the receiver derives the size by summing
//! chunk lengths.
//!
//! ```text
//! ┌──────────────────────┐┌─────────┐┌─────────┐     ┌─────────┐
//! │ Metadata{name, type} ││ Chunk 1 ││ Chunk 2 │ ... │ Chunk N │ <close>
//! └──────────────────────┘└─────────┘└─────────┘     └─────────┘
//! ```

use crate::error::{Result, TransferError};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Chunk size used when a sender does not pick one
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Contents of the metadata frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub filename: String,
    pub content_type: String,
}

impl FileInfo {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }
}

/// One unit on the transfer stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Metadata(FileInfo),
    Chunk(Bytes),
}

/// Receiving side of the framing rules.
///
/// Frames are fed in arrival order; chunk boundaries are kept as received
/// and only flattened by [`FrameAssembler::finish`].
#[derive(Debug, Default)]
pub struct FrameAssembler {
    info: Option<FileInfo>,
    chunks: Vec<Bytes>,
    total: u64,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the next frame.
    ///
    /// A chunk before the metadata frame, or a second metadata frame, is a
    /// protocol violation.
    pub fn accept(&mut self, frame: Frame) -> Result<()> {
        match frame {
            Frame::Metadata(info) => {
                if self.info.is_some() {
                    return Err(TransferError::InvalidRequest(
                        "duplicate file info frame".to_string(),
                    ));
                }
                self.info = Some(info);
            }
            Frame::Chunk(chunk) => {
                if self.info.is_none() {
                    return Err(TransferError::InvalidRequest(
                        "chunk received before file info".to_string(),
                    ));
                }
                if !chunk.is_empty() {
                    self.total += chunk.len() as u64;
                    self.chunks.push(chunk);
                }
            }
        }
        Ok(())
    }

    /// Bytes received so far
    pub fn received(&self) -> u64 {
        self.total
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Close the frame sequence, yielding the metadata and the concatenated
    /// payload in receipt order.
    pub fn finish(self) -> Result<(FileInfo, Bytes)> {
        let info = self
            .info
            .ok_or_else(|| TransferError::InvalidRequest("no file info provided".to_string()))?;

        let payload = match self.chunks.len() {
            0 => Bytes::new(),
            1 => self.chunks.into_iter().next().unwrap_or_default(),
            _ => {
                let mut buf = BytesMut::with_capacity(self.total as usize);
                for chunk in &self.chunks {
                    buf.extend_from_slice(chunk);
                }
                buf.freeze()
            }
        };

        Ok((info, payload))
    }
}

/// Split a payload into chunk frames of at most `chunk_size` bytes.
pub fn split_chunks(payload: &Bytes, chunk_size: usize) -> Vec<Frame> {
    let chunk_size = chunk_size.max(1);
    let mut frames = Vec::with_capacity(payload.len().div_ceil(chunk_size));
    let mut offset = 0;
    while offset < payload.len() {
        let end = (offset + chunk_size).min(payload.len());
        frames.push(Frame::Chunk(payload.slice(offset..end)));
        offset = end;
    }
    frames
}

/// Read `reader` as a stream of chunks of exactly `chunk_size` bytes, except
/// for a shorter final chunk. An empty reader yields no chunks.
pub fn read_chunks<R>(reader: R, chunk_size: usize) -> BoxStream<'static, io::Result<Bytes>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let chunk_size = chunk_size.max(1);
    stream::try_unfold(reader, move |mut reader| async move {
        let mut buf = BytesMut::with_capacity(chunk_size);
        {
            let mut limited = (&mut reader).take(chunk_size as u64);
            while limited.read_buf(&mut buf).await? != 0 {}
        }

        let next = if buf.is_empty() {
            None
        } else {
            Some((buf.freeze(), reader))
        };
        Ok::<_, io::Error>(next)
    })
    .boxed()
}
