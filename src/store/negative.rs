// src/store/negative.rs
//! Identifiers confirmed absent remotely. Stored as one JSON array, rewritten whole.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{Error, Result};
use crate::file::write_atomic;

#[derive(Debug)]
pub struct NegativeCache {
    path: PathBuf,
    ids: BTreeSet<u32>,
    dirty: bool,
}

impl NegativeCache {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ids = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeSet::new(),
            Ok(text) => match serde_json::from_str::<Vec<u32>>(&text) {
                Ok(v) => v.into_iter().collect(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "unreadable negative cache, starting empty");
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(Error::io(&path, e)),
        };
        Ok(Self { path, ids, dirty: false })
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Add `id` and rewrite the snapshot. A failed rewrite leaves the cache dirty
    /// for the final `flush`; it does not lose the id.
    pub fn insert(&mut self, id: u32) -> bool {
        if !self.ids.insert(id) {
            return false;
        }
        self.dirty = true;
        if let Err(e) = self.flush() {
            warn!(id, error = %e, "negative cache write failed, will retry on exit");
        }
        true
    }

    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let ids: Vec<u32> = self.ids.iter().copied().collect();
        let json = serde_json::to_string_pretty(&ids)?;
        write_atomic(&self.path, json.as_bytes())?;
        self.dirty = false;
        Ok(())
    }
}
