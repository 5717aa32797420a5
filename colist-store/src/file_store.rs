//! File-backed document store.
//!
//! One pretty-printed JSON document per list at `<root>/<hex(list id)>.json`.
//! List ids arrive from the wire, so they are hex-encoded rather than trusted
//! as file names. Ids too long for that become `sha256-<digest>.json`.
//! Writes go to `<path>.tmp` and are renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use colist_core::{List, ListId};
use sha2::{Digest, Sha256};

use crate::document::DocumentStore;
use crate::error::{io_err, StoreError};

/// Longest hex stem kept verbatim. Leaves room for `.json.tmp` under the
/// usual 255-byte file name limit.
const MAX_HEX_STEM: usize = 200;

#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<hex(id)>.json`, or `<root>/sha256-<hex digest>.json` for
    /// long ids. No I/O.
    pub fn path_for(&self, id: &ListId) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(id)))
    }
}

fn file_stem(id: &ListId) -> String {
    let stem = hex::encode(id.as_str());
    if stem.len() <= MAX_HEX_STEM {
        return stem;
    }
    format!("sha256-{}", hex::encode(Sha256::digest(id.as_str().as_bytes())))
}

impl DocumentStore for FileDocumentStore {
    fn get(&self, id: &ListId) -> Result<Option<List>, StoreError> {
        let path = self.path_for(id);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_err(&path, err)),
        };
        let list = serde_json::from_str(&contents)
            .map_err(|source| StoreError::Corrupt { path, source })?;
        Ok(Some(list))
    }

    fn put(&self, list: &List) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|e| io_err(&self.root, e))?;

        let path = self.path_for(&list.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(list)?;
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        if let Err(err) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&path, err));
        }
        tracing::debug!("wrote list document: {}", path.display());
        Ok(())
    }

    fn ids(&self) -> Result<Vec<ListId>, StoreError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(io_err(&self.root, err)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&self.root, e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            match serde_json::from_str::<List>(&contents) {
                Ok(list) if self.path_for(&list.id) == path => ids.push(list.id),
                Ok(_) => tracing::debug!("skipping misplaced document: {}", path.display()),
                Err(err) => tracing::warn!("skipping unreadable document {}: {err}", path.display()),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
