//! Data model: file metadata, stored objects and transfer progress

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content type recorded when the sender does not provide one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Immutable description of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Server-generated identifier, unique for the lifetime of the process
    pub file_id: String,

    /// Original filename as sent by the uploader
    pub filename: String,

    /// Size in bytes, i.e. the sum of received chunk lengths
    pub size: u64,

    /// Content-type label supplied by the uploader
    pub content_type: String,

    /// Completion time of the upload
    pub uploaded_at: DateTime<Utc>,
}

/// Opaque handle returned by byte storage and handed back to it on read.
///
/// The registry stores it but never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registry entry: metadata plus where its bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub metadata: FileMetadata,
    pub locator: Locator,
}

/// Bytes moved so far within a single upload or download call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn new(bytes_transferred: u64, total_bytes: u64) -> Self {
        Self {
            bytes_transferred,
            total_bytes,
        }
    }

    /// Completed fraction, clamped to `[0, 1]`.
    ///
    /// An empty transfer has nothing left to move and counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_transferred as f64 / self.total_bytes as f64).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_transferred >= self.total_bytes
    }
}
