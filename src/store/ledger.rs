// src/store/ledger.rs
//! Completion ledger: `id;derived_key`, one line per completed identifier.
//! Append-only. The only source of truth for "already fetched".

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::warn;

use crate::config::consts::LEDGER_SEP;
use crate::error::{Error, Result};
use crate::file::append_line;

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    done: BTreeMap<u32, String>,
    malformed: usize,
}

/// `Some((id, key))` for a well-formed line. The key is everything after the first separator.
pub fn parse_line(line: &str) -> Option<(u32, String)> {
    let (id, key) = match line.split_once(LEDGER_SEP) {
        Some((id, key)) => (id, key),
        None => (line, ""),
    };
    let id = id.trim().parse::<u32>().ok()?;
    Some((id, key.trim().to_string()))
}

impl Ledger {
    /// A missing file is an empty ledger. Malformed lines are skipped with a warning.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(Error::io(&path, e)),
        };

        let text = String::from_utf8_lossy(&bytes);
        let mut done = BTreeMap::new();
        let mut malformed = 0usize;

        for (n, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some((id, key)) => {
                    done.insert(id, key);
                }
                None => {
                    malformed += 1;
                    warn!(path = %path.display(), line = n + 1, content = line, "skipping malformed ledger line");
                }
            }
        }

        Ok(Self { path, done, malformed })
    }

    pub fn contains(&self, id: u32) -> bool {
        self.done.contains_key(&id)
    }

    pub fn key(&self, id: u32) -> Option<&str> {
        self.done.get(&id).map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.done.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.done.iter().map(|(id, key)| (*id, key.as_str()))
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Lines skipped while loading.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Record one completed id. Durable when this returns.
    pub fn append(&mut self, id: u32, key: &str) -> Result<()> {
        append_line(&self.path, &format!("{id}{LEDGER_SEP}{key}"))?;
        self.done.insert(id, key.to_string());
        Ok(())
    }
}
