// src/engine/engine.rs
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::pacer::{Pacer, Sleeper};
use super::stop::StopSignal;
use super::types::*;
use crate::config::{FetchOptions, NotFoundPolicy};
use crate::core::net::{HttpClient, Response};
use crate::error::{Error, FetchError, Result};
use crate::progress::Progress;
use crate::store::{Artifact, Store};

/// One kind of remote collection: how to fetch an id and how to name what comes back.
pub trait Source {
    type Record;

    fn name(&self) -> &'static str;

    /// Fetch and parse one identifier. Sub-pages go through `session`, which paces them.
    fn fetch_one(&self, id: u32, session: &mut Session<'_>) -> FetchOutcome<Self::Record>;

    /// Render a fetched record into the files to persist.
    fn artifact(&self, id: u32, record: &Self::Record, with_text: bool) -> Result<Artifact>;

    /// Last valid id, for open-ended scans. `Ok(None)` when the source cannot tell.
    fn last_id(&self, _session: &mut Session<'_>) -> std::result::Result<Option<u32>, FetchError> {
        Ok(None)
    }
}

/// Collaborators the loop runs against. Tests swap in a scripted client and a recording sleeper.
pub struct Runtime<'a> {
    pub http: &'a dyn HttpClient,
    pub sleeper: Box<dyn Sleeper + 'a>,
    pub stop: StopSignal,
}

/// Request-side state shared by the loop and the source during one run.
pub struct Session<'a> {
    http: &'a dyn HttpClient,
    pacer: Pacer<'a>,
    stop: StopSignal,
    requests: usize,
}

impl<'a> Session<'a> {
    pub fn new(opts: &FetchOptions, rt: Runtime<'a>) -> Self {
        Self {
            http: rt.http,
            pacer: Pacer::new(opts, rt.sleeper),
            stop: rt.stop,
            requests: 0,
        }
    }

    pub fn get(&mut self, url: &str) -> std::result::Result<Response, FetchError> {
        self.requests += 1;
        self.http.get(url)
    }

    /// Randomized pause before the next sub-page of the same id.
    /// `Err(Interrupted)` if a stop was requested before or during the pause.
    pub fn page_pause(&mut self) -> std::result::Result<(), FetchError> {
        if self.stop_requested() {
            return Err(FetchError::Interrupted);
        }
        let d = self.pacer.next_page_delay();
        debug!(delay = ?d, "sub-page pause");
        self.pacer.sleep(d, &self.stop);
        if self.stop_requested() {
            return Err(FetchError::Interrupted);
        }
        Ok(())
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.is_requested()
    }

    pub fn requests(&self) -> usize {
        self.requests
    }

    fn item_pause(&mut self, d: Duration) {
        self.pacer.sleep(d, &self.stop);
    }
}

/// The resumable fetch loop.
///
/// Opens (or creates) the store in `opts.out_dir`, skips every id already in the ledger
/// or the negative cache, and visits the rest one at a time with a randomized pause in
/// between. Per-id failures are reported and skipped; only configuration and storage
/// failures end the run with an error. The negative cache is flushed on every exit path.
pub fn run<S: Source>(
    source: &S,
    opts: &FetchOptions,
    rt: Runtime<'_>,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary> {
    opts.validate()?;
    let mut store = Store::open(&opts.out_dir)?;
    let mut session = Session::new(opts, rt);

    let before = session.requests();
    let space = resolve_space(source, &opts.ids, &mut session)?;
    let plan = space.plan(&store.settled(), session.pacer.rng())?;
    info!(
        source = source.name(),
        planned = plan.len(),
        skipped = plan.skipped(),
        dir = %store.dir().display(),
        "starting run"
    );

    let mut summary = RunSummary::new(plan.len(), plan.skipped());
    if let Some(p) = progress.as_deref_mut() {
        p.begin(plan.len());
    }

    // End discovery already hit the site: the first id waits like any other.
    if session.requests() > before && !plan.is_empty() && !session.stop_requested() {
        let d = session.pacer.next_item_delay();
        debug!(delay = ?d, "pause after end discovery");
        session.item_pause(d);
    }

    let result = visit(source, opts, &plan, &mut store, &mut session, &mut summary, &mut progress);
    summary.requests = session.requests();
    let flushed = store.flush();

    result?;
    flushed?;

    info!(
        source = source.name(),
        saved = summary.saved.len(),
        empty = summary.empty.len(),
        not_found = summary.not_found.len(),
        failed = summary.failed.len(),
        stop = ?summary.stop,
        "run finished"
    );
    if let Some(p) = progress.as_deref_mut() {
        p.finish(&summary);
    }
    Ok(summary)
}

fn resolve_space<S: Source>(source: &S, space: &IdSpace, session: &mut Session<'_>) -> Result<IdSpace> {
    let IdSpace::From { start } = space else {
        return Ok(space.clone());
    };
    match source.last_id(session) {
        Ok(Some(end)) if end >= *start => {
            info!(source = source.name(), start, end, "discovered last id");
            Ok(IdSpace::Range { start: *start, end })
        }
        Ok(Some(end)) => Err(Error::Config(format!(
            "{}: start {start} is past the last id {end}",
            source.name()
        ))),
        Ok(None) => Err(Error::Config(format!(
            "{}: cannot discover the last id, pass an explicit end",
            source.name()
        ))),
        Err(e) => Err(Error::Config(format!("{}: end discovery failed: {e}", source.name()))),
    }
}

fn visit<S: Source>(
    source: &S,
    opts: &FetchOptions,
    plan: &Plan,
    store: &mut Store,
    session: &mut Session<'_>,
    summary: &mut RunSummary,
    progress: &mut Option<&mut dyn Progress>,
) -> Result<()> {
    let mut left = plan.len();
    for id in plan.ids() {
        if left == 0 {
            break;
        }
        if session.stop_requested() {
            summary.stop = StopReason::Interrupted;
            break;
        }
        if store.should_skip(id) {
            continue;
        }
        left -= 1;

        let started = Instant::now();
        let mut end_of_data = false;

        let status = match source.fetch_one(id, session) {
            FetchOutcome::Success(record) => {
                let artifact = source.artifact(id, &record, opts.write_text)?;
                let path = store.persist(id, &artifact)?;
                debug!(id, path = %path.display(), "saved");
                summary.saved.push(id);
                ItemStatus::Saved { path }
            }
            FetchOutcome::Empty => {
                warn!(id, "nothing to extract, will retry next run");
                summary.empty.push(id);
                ItemStatus::Empty
            }
            FetchOutcome::NotFound { status } => {
                summary.not_found.push(id);
                let remembered = match opts.not_found {
                    NotFoundPolicy::Continue => false,
                    NotFoundPolicy::Remember => {
                        store.remember_missing(id);
                        true
                    }
                    NotFoundPolicy::EndOfData => {
                        end_of_data = true;
                        false
                    }
                };
                info!(id, ?status, remembered, end_of_data, "not found");
                ItemStatus::NotFound { status, remembered }
            }
            FetchOutcome::Transient(e) => {
                warn!(id, error = %e, "fetch failed, will retry next run");
                summary.failed.push((id, e.to_string()));
                ItemStatus::Failed { reason: e.to_string() }
            }
        };

        let remaining = left;
        let next_delay = if end_of_data || remaining == 0 || session.stop_requested() {
            None
        } else {
            Some(session.pacer.next_item_delay())
        };

        if let Some(p) = progress.as_deref_mut() {
            p.item(&ItemReport { id, status, took: started.elapsed(), remaining, next_delay });
        }

        if end_of_data {
            summary.stop = StopReason::EndOfData(id);
            break;
        }
        if let Some(d) = next_delay {
            session.item_pause(d);
        }
    }

    if summary.stop == StopReason::Exhausted && session.stop_requested() {
        summary.stop = StopReason::Interrupted;
    }
    Ok(())
}
