// src/engine/types.rs
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{Error, FetchError, Result};

/// Which identifiers a run covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdSpace {
    /// Dense, inclusive, ascending.
    Range { start: u32, end: u32 },
    /// Dense from `start`; the source discovers the last id before the run.
    From { start: u32 },
    /// Explicit ids, ascending and de-duplicated.
    List(Vec<u32>),
    /// Up to `probes` distinct random ids from `[0, max_id]`.
    Sample { max_id: u32, probes: usize },
}

/// Spaces up to this size are sampled by shuffling the candidate list;
/// larger ones by rejection, so memory stays bounded by the sample size.
const SHUFFLE_SAMPLE_LIMIT: u64 = 1 << 20;

/// Ids left to visit after skipping finished ones.
///
/// A dense range is not materialised: `ids()` walks the whole range and the loop
/// drops settled ids as it goes. `len()` already excludes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    order: Order,
    len: usize,
    skipped: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Order {
    Dense { start: u32, end: u32 },
    Listed(Vec<u32>),
}

impl Plan {
    /// Number of ids the run will visit.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ids of the space that were already settled.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn ids(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match &self.order {
            Order::Dense { start, end } => Box::new(*start..=*end),
            Order::Listed(ids) => Box::new(ids.iter().copied()),
        }
    }
}

impl IdSpace {
    pub fn validate(&self) -> Result<()> {
        match self {
            IdSpace::Range { start, end } if start > end => {
                Err(Error::Config(format!("empty id range {start}..={end}")))
            }
            IdSpace::List(ids) if ids.is_empty() => Err(Error::Config("empty id list".into())),
            IdSpace::Sample { probes: 0, .. } => Err(Error::Config("sample size is zero".into())),
            _ => Ok(()),
        }
    }

    /// Order of visit. `settled` holds the ids already done or known missing.
    /// A `Sample` only draws among unsettled ids, so it never wastes a probe.
    pub fn plan<R: Rng + ?Sized>(&self, settled: &BTreeSet<u32>, rng: &mut R) -> Result<Plan> {
        let plan = match self {
            IdSpace::Range { start, end } => {
                let skipped = settled.range(*start..=*end).count();
                let size = u64::from(*end - *start) + 1;
                Plan {
                    order: Order::Dense { start: *start, end: *end },
                    len: (size - skipped as u64) as usize,
                    skipped,
                }
            }
            IdSpace::List(ids) => {
                let keep: Vec<u32> = ids.iter().copied().filter(|id| !settled.contains(id)).collect();
                Plan { len: keep.len(), skipped: ids.len() - keep.len(), order: Order::Listed(keep) }
            }
            IdSpace::Sample { max_id, probes } => {
                let picked = sample(*max_id, *probes, settled, rng);
                let skipped = settled.range(..=*max_id).count();
                Plan { len: picked.len(), skipped, order: Order::Listed(picked) }
            }
            IdSpace::From { start } => {
                return Err(Error::Config(format!(
                    "open-ended range from {start} must be resolved before planning"
                )));
            }
        };
        Ok(plan)
    }

/// Parse `"1-5,9, 12"` into a sorted, de-duplicated list.
    pub fn parse_list(s: &str) -> Result<Vec<u32>> {
        let bad = |part: &str| Error::Config(format!("invalid id or range: {part:?}"));
        let mut out = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() { continue; }
            if let Some((a, b)) = part.split_once('-') {
                let a: u32 = a.trim().parse().map_err(|_| bad(part))?;
                let b: u32 = b.trim().parse().map_err(|_| bad(part))?;
                if a > b { return Err(bad(part)); }
                out.extend(a..=b);
            } else {
                out.push(part.parse().map_err(|_| bad(part))?);
            }
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }
}

/// Up to `probes` distinct unsettled ids from `[0, max_id]`, in draw order.
fn sample<R: Rng + ?Sized>(max_id: u32, probes: usize, settled: &BTreeSet<u32>, rng: &mut R) -> Vec<u32> {
    let space = u64::from(max_id) + 1;
    let candidates = space - settled.range(..=max_id).count() as u64;
    let take = (probes as u64).min(candidates) as usize;

    if space <= SHUFFLE_SAMPLE_LIMIT {
        let mut pool: Vec<u32> = (0..=max_id).filter(|id| !settled.contains(id)).collect();
        let (picked, _) = pool.partial_shuffle(rng, take);
        return picked.to_vec();
    }

    let mut seen = HashSet::with_capacity(take);
    let mut picked = Vec::with_capacity(take);
    while picked.len() < take {
        let id = rng.random_range(0..=max_id);
        if !settled.contains(&id) && seen.insert(id) {
            picked.push(id);
        }
    }
    picked
}

/// Result of fetching one identifier.
#[derive(Debug)]
pub enum FetchOutcome<R> {
    /// Parsed, with at least one content unit. Gets persisted.
    Success(R),
    /// Reachable, but nothing to extract. Not logged; retried next run.
    Empty,
    /// No such remote resource.
    NotFound { status: Option<u16> },
    /// May work later. Not logged; retried next run.
    Transient(FetchError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    Interrupted,
    /// Scan stopped at this id under the end-of-data policy.
    EndOfData(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Saved { path: PathBuf },
    Empty,
    NotFound { status: Option<u16>, remembered: bool },
    Failed { reason: String },
}

/// One line of progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemReport {
    pub id: u32,
    pub status: ItemStatus,
    /// Wall time spent on this id (all its sub-pages included).
    pub took: Duration,
    pub remaining: usize,
    /// `None` on the last id or when the scan is stopping.
    pub next_delay: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: Vec<u32>,
    pub empty: Vec<u32>,
    pub not_found: Vec<u32>,
    pub failed: Vec<(u32, String)>,
    /// Ids of the space that were already settled before the run.
    pub skipped: usize,
    pub planned: usize,
    pub requests: usize,
    pub stop: StopReason,
}

impl RunSummary {
    pub fn new(planned: usize, skipped: usize) -> Self {
        Self {
            saved: Vec::new(),
            empty: Vec::new(),
            not_found: Vec::new(),
            failed: Vec::new(),
            skipped,
            planned,
            requests: 0,
            stop: StopReason::Exhausted,
        }
    }

    pub fn visited(&self) -> usize {
        self.saved.len() + self.empty.len() + self.not_found.len() + self.failed.len()
    }
}
