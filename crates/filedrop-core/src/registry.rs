//! In-memory file registry
//!
//! The registry is the single source of truth for which files exist. Every
//! transport (gRPC, HTTP, WebSocket push) reads and mutates the same
//! instance, handed to it as an `Arc<Registry>`.
//!
//! A single read-write lock guards the map: `put` and `delete` are serialized
//! against each other, and `get`/`list` never observe a half-applied change.
//! No lock is ever held across an `.await`.

use crate::types::{FileMetadata, StoredObject};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Registry {
    entries: RwLock<HashMap<String, StoredObject>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, replacing any entry with the same identifier.
    ///
    /// Upload always calls this with a freshly generated identifier.
    pub fn put(&self, object: StoredObject) {
        let id = object.metadata.file_id.clone();
        let previous = self.entries.write().insert(id.clone(), object);
        if previous.is_some() {
            debug!("Registry entry {} replaced", id);
        }
    }

    pub fn get(&self, file_id: &str) -> Option<StoredObject> {
        self.entries.read().get(file_id).cloned()
    }

    /// Remove an entry. Returns `true` if it existed.
    ///
    /// Stored bytes are left untouched.
    pub fn delete(&self, file_id: &str) -> bool {
        self.entries.write().remove(file_id).is_some()
    }

    /// Snapshot of all metadata, oldest upload first.
    pub fn list(&self) -> Vec<FileMetadata> {
        let mut files: Vec<FileMetadata> = self
            .entries
            .read()
            .values()
            .map(|object| object.metadata.clone())
            .collect();

        files.sort_by(|a, b| {
            a.uploaded_at
                .cmp(&b.uploaded_at)
                .then_with(|| a.file_id.cmp(&b.file_id))
        });
        files
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Locator;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn object(id: &str, size: u64) -> StoredObject {
        StoredObject {
            metadata: FileMetadata {
                file_id: id.to_string(),
                filename: format!("{}.bin", id),
                size,
                content_type: "application/octet-stream".to_string(),
                uploaded_at: Utc::now(),
            },
            locator: Locator::new(format!("/uploads/{}.bin", id)),
        }
    }

    #[test]
    fn test_put_get_delete() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        registry.put(object("a", 10));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().metadata.size, 10);
        assert!(registry.get("missing").is_none());

        assert!(registry.delete("a"));
        assert!(registry.get("a").is_none());
        assert!(!registry.delete("a"));
    }

    #[test]
    fn test_delete_missing_leaves_others_untouched() {
        let registry = Registry::new();
        registry.put(object("keep", 1));

        assert!(!registry.delete("nope"));
        assert_eq!(registry.list().len(), 1);
        assert!(registry.get("keep").is_some());
    }

    #[test]
    fn test_list_is_ordered_by_upload_time() {
        let registry = Registry::new();
        let now = Utc::now();

        let mut newer = object("newer", 1);
        newer.metadata.uploaded_at = now;
        let mut older = object("older", 2);
        older.metadata.uploaded_at = now - Duration::seconds(10);

        registry.put(newer);
        registry.put(older);

        let ids: Vec<_> = registry.list().into_iter().map(|m| m.file_id).collect();
        assert_eq!(ids, vec!["older", "newer"]);
    }

    #[test]
    fn test_concurrent_puts_and_lists() {
        let registry = Arc::new(Registry::new());

        let writers: Vec<_> = (0..8)
            .map(|t| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        registry.put(object(&format!("{}-{}", t, i), i));
                    }
                })
            })
            .collect();

        let reader = {
            let registry = registry.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let snapshot = registry.list();
                    let mut ids: Vec<_> = snapshot.iter().map(|m| m.file_id.clone()).collect();
                    ids.dedup();
                    assert_eq!(ids.len(), snapshot.len());
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(registry.len(), 800);
    }
}
