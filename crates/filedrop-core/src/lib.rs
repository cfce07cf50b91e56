//! Filedrop Core: chunked transfer pipelines over a shared registry
//!
//! This crate holds everything the transports have in common:
//!
//! - **Registry**: the authoritative, in-memory map of identifier → stored object
//! - **Codec**: framing rules (one metadata frame, then chunk frames)
//! - **Upload / Download pipelines**: reassemble and register, or stream back out
//! - **ByteStorage**: the collaborator that persists and reads blobs
//!
//! Transports (gRPC, HTTP) translate their own messages into [`Frame`]s and
//! call into a [`Depot`].
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use filedrop_core::{Depot, FileInfo, Frame, MemoryStorage, Registry};
//! use std::sync::Arc;
//!
//! # async fn example() -> filedrop_core::Result<()> {
//! let depot = Depot::new(Arc::new(Registry::new()), Arc::new(MemoryStorage::new()));
//!
//! let frames = futures::stream::iter(vec![
//!     Ok(Frame::Metadata(FileInfo::new("hello.txt", "text/plain"))),
//!     Ok(Frame::Chunk(Bytes::from_static(b"hello"))),
//! ]);
//! let meta = depot.upload(frames).await?;
//! assert_eq!(meta.size, 5);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod depot;
pub mod download;
pub mod error;
pub mod id;
pub mod registry;
pub mod storage;
pub mod types;
pub mod upload;

pub use codec::{read_chunks, split_chunks, FileInfo, Frame, FrameAssembler, DEFAULT_CHUNK_SIZE};
pub use depot::Depot;
pub use download::{open_download, ChunkStream, Download};
pub use error::{Result, TransferError};
pub use id::generate_file_id;
pub use registry::Registry;
pub use storage::{ByteReader, ByteStorage, LocalStorage, MemoryStorage};
pub use types::{FileMetadata, Locator, StoredObject, TransferProgress, DEFAULT_CONTENT_TYPE};
pub use upload::{object_name, receive_upload};
