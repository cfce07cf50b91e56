//! Byte storage collaborator
//!
//! The pipelines only need two things from storage: write a named blob and
//! hand back a locator, and open a previously returned locator for reading.
//! `LocalStorage` keeps blobs in a directory on disk; `MemoryStorage` keeps
//! them in memory and can inject failures for tests.

use crate::types::Locator;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt, ReadBuf};
use tracing::{debug, warn};

pub type ByteReader = Box<dyn AsyncRead + Unpin + Send>;

#[async_trait]
pub trait ByteStorage: Send + Sync + 'static {
    /// Durably write `bytes` under `name`, returning a locator for later reads.
    ///
    /// On error nothing readable is left behind under `name`.
    async fn write(&self, name: &str, bytes: Bytes) -> io::Result<Locator>;

    /// Open the blob behind `locator` for streaming reads.
    async fn open_read(&self, locator: &Locator) -> io::Result<ByteReader>;
}

fn validate_name(name: &str) -> io::Result<()> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0');
    if plain {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid object name: {:?}", name),
        ))
    }
}

/// Blobs stored as plain files inside one directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if it does not exist yet
    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ByteStorage for LocalStorage {
    async fn write(&self, name: &str, bytes: Bytes) -> io::Result<Locator> {
        validate_name(name)?;

        let final_path = self.root.join(name);
        let part_path = self.root.join(format!("{}.part", name));

        let result = async {
            let mut file = fs::File::create(&part_path).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&part_path, &final_path).await
        }
        .await;

        if let Err(e) = result {
            warn!("Failed to store {}: {}", final_path.display(), e);
            if let Err(cleanup) = fs::remove_file(&part_path).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", part_path.display(), cleanup);
                }
            }
            return Err(e);
        }

        debug!("Stored {} bytes at {}", bytes.len(), final_path.display());
        Ok(Locator::new(final_path.to_string_lossy()))
    }

    async fn open_read(&self, locator: &Locator) -> io::Result<ByteReader> {
        let file = fs::File::open(locator.as_str()).await?;
        Ok(Box::new(file))
    }
}

/// In-memory blobs for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<RwLock<HashMap<String, Bytes>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads_after: Arc<RwLock<Option<usize>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make readers fail after yielding `limit` bytes (`None` restores normal reads)
    pub fn set_fail_reads_after(&self, limit: Option<usize>) {
        *self.fail_reads_after.write() = limit;
    }

    pub fn contents(&self, locator: &Locator) -> Option<Bytes> {
        self.blobs.read().get(locator.as_str()).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.blobs.read().len()
    }
}

#[async_trait]
impl ByteStorage for MemoryStorage {
    async fn write(&self, name: &str, bytes: Bytes) -> io::Result<Locator> {
        validate_name(name)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("injected write failure"));
        }

        let locator = Locator::new(format!("mem://{}", name));
        self.blobs.write().insert(locator.as_str().to_string(), bytes);
        Ok(locator)
    }

    async fn open_read(&self, locator: &Locator) -> io::Result<ByteReader> {
        let data = self.contents(locator).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no object at {}", locator))
        })?;
        let fail_after = *self.fail_reads_after.read();
        Ok(Box::new(MemoryReader {
            data,
            pos: 0,
            fail_after,
        }))
    }
}

struct MemoryReader {
    data: Bytes,
    pos: usize,
    fail_after: Option<usize>,
}

impl AsyncRead for MemoryReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let limit = self.fail_after.unwrap_or(usize::MAX).min(self.data.len());
        if self.pos >= limit && self.fail_after.is_some_and(|n| n < self.data.len()) {
            return Poll::Ready(Err(io::Error::other("injected read failure")));
        }

        let n = (limit - self.pos).min(buf.remaining());
        let start = self.pos;
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}
