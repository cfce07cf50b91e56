//! Transport-agnostic entry points
//!
//! `Depot` bundles the registry, the byte storage and the outbound chunk size
//! so every transport calls the same four operations: upload, download, list
//! and delete.

use crate::codec::{Frame, DEFAULT_CHUNK_SIZE};
use crate::download::{open_download, Download};
use crate::error::Result;
use crate::registry::Registry;
use crate::storage::ByteStorage;
use crate::types::FileMetadata;
use crate::upload::receive_upload;
use futures::Stream;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Depot {
    registry: Arc<Registry>,
    storage: Arc<dyn ByteStorage>,
    chunk_size: usize,
}

impl Depot {
    pub fn new(registry: Arc<Registry>, storage: Arc<dyn ByteStorage>) -> Self {
        Self {
            registry,
            storage,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the size of outbound download chunks
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub async fn upload<S>(&self, frames: S) -> Result<FileMetadata>
    where
        S: Stream<Item = Result<Frame>>,
    {
        receive_upload(&self.registry, self.storage.as_ref(), frames).await
    }

    pub async fn download(&self, file_id: &str) -> Result<Download> {
        open_download(
            &self.registry,
            self.storage.as_ref(),
            file_id,
            self.chunk_size,
        )
        .await
    }

    pub fn get(&self, file_id: &str) -> Option<FileMetadata> {
        self.registry.get(file_id).map(|object| object.metadata)
    }

    pub fn list(&self) -> Vec<FileMetadata> {
        self.registry.list()
    }

    /// Remove a file from the registry. Stored bytes are kept.
    pub fn delete(&self, file_id: &str) -> bool {
        let removed = self.registry.delete(file_id);
        if removed {
            info!("Deleted {}", file_id);
        }
        removed
    }
}
