// src/store/mod.rs
//! The output directory of one job.
//!
//! ```text
//! <out_dir>/
//!   index.log           ledger, `id;base` per completed id (append-only)
//!   missing_ids.json    negative cache (rewritten whole)
//!   <base>.json         one artifact per completed id
//!   <base>.txt          optional plain-text rendering of the same record
//! ```
//!
//! Persist order is JSON, then text, then ledger. A crash anywhere before the
//! ledger line leaves at most an orphan artifact, which the next run overwrites.

pub mod ledger;
pub mod negative;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::consts::{LEDGER_FILE, NEGATIVE_CACHE_FILE};
use crate::error::{Error, Result};
use crate::file::{ensure_directory, write_atomic};

pub use ledger::Ledger;
pub use negative::NegativeCache;

/// Files to write for one completed identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// File stem, also the ledger's derived key.
    pub base: String,
    pub json: String,
    pub text: Option<String>,
}

/// Ledger vs. directory consistency report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Audit {
    pub ledger_entries: usize,
    pub malformed_lines: usize,
    pub negative_entries: usize,
    pub artifacts: usize,
    /// In the ledger, but `<base>.json` is gone.
    pub missing_artifacts: Vec<u32>,
    /// On disk, but never logged: an interrupted persist. Re-fetched next run.
    pub orphans: Vec<u32>,
}

impl Audit {
    pub fn is_consistent(&self) -> bool {
        self.missing_artifacts.is_empty() && self.orphans.is_empty()
    }
}

#[derive(Debug)]
pub struct Store {
    dir: PathBuf,
    ledger: Ledger,
    negative: NegativeCache,
}

impl Store {
    /// Create the directory if needed and load ledger + negative cache.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        ensure_directory(&dir)?;
        let ledger = Ledger::load(dir.join(LEDGER_FILE))?;
        let negative = NegativeCache::load(dir.join(NEGATIVE_CACHE_FILE))?;
        debug!(
            dir = %dir.display(),
            done = ledger.len(),
            missing = negative.len(),
            "store opened"
        );
        Ok(Self { dir, ledger, negative })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn negative(&self) -> &NegativeCache {
        &self.negative
    }

    /// Identifiers already completed.
    pub fn resume_set(&self) -> BTreeSet<u32> {
        self.ledger.ids().collect()
    }

    /// Completed ids plus known-missing ones: everything a run must not visit.
    pub fn settled(&self) -> BTreeSet<u32> {
        self.ledger.ids().chain(self.negative.ids()).collect()
    }

    pub fn is_done(&self, id: u32) -> bool {
        self.ledger.contains(id)
    }

    pub fn is_missing(&self, id: u32) -> bool {
        self.negative.contains(id)
    }

    /// Either already fetched or known not to exist.
    pub fn should_skip(&self, id: u32) -> bool {
        self.is_done(id) || self.is_missing(id)
    }

    pub fn json_path(&self, base: &str) -> PathBuf {
        self.dir.join(format!("{base}.json"))
    }

    pub fn text_path(&self, base: &str) -> PathBuf {
        self.dir.join(format!("{base}.txt"))
    }

    /// Write the artifact, then log the id. Returns the JSON path.
    pub fn persist(&mut self, id: u32, artifact: &Artifact) -> Result<PathBuf> {
        let json_path = self.json_path(&artifact.base);
        write_atomic(&json_path, artifact.json.as_bytes())?;
        if let Some(text) = &artifact.text {
            write_atomic(&self.text_path(&artifact.base), text.as_bytes())?;
        }
        self.ledger.append(id, &artifact.base)?;
        Ok(json_path)
    }

    pub fn remember_missing(&mut self, id: u32) -> bool {
        self.negative.insert(id)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.negative.flush()
    }

    pub fn audit(&self) -> Result<Audit> {
        let mut on_disk = BTreeSet::new();
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.dir, e))?.path();
            if let Some(id) = artifact_id(&path) {
                on_disk.insert(id);
            }
        }

        let missing_artifacts = self
            .ledger
            .entries()
            .filter(|(_, base)| base.is_empty() || !self.json_path(base).is_file())
            .map(|(id, _)| id)
            .collect();
        let orphans = on_disk.iter().copied().filter(|id| !self.ledger.contains(*id)).collect();

        Ok(Audit {
            ledger_entries: self.ledger.len(),
            malformed_lines: self.ledger.malformed(),
            negative_entries: self.negative.len(),
            artifacts: on_disk.len(),
            missing_artifacts,
            orphans,
        })
    }
}

/// Leading digits of `<digits>[_...].json`.
fn artifact_id(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
    let rest = &stem[digits.len()..];
    if digits.is_empty() || !(rest.is_empty() || rest.starts_with('_')) {
        return None;
    }
    digits.parse().ok()
}
