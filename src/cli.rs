// src/cli.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::consts::{API_URL, DEBUG_LOG_FILE, REQUEST_TIMEOUT_SECS, SITE_URL, USER_AGENT};
use crate::config::{secs_to_duration, DelayRange, FetchOptions, JobKind, NetOptions, NotFoundPolicy};
use crate::core::ReqwestClient;
use crate::engine::{self, IdSpace, RunSummary, Runtime, StopSignal, ThreadSleeper};
use crate::error::{Error, Result};
use crate::file::ensure_directory;
use crate::progress::ConsoleProgress;
use crate::scrape::{Oneliners, Topics, Users};
use crate::store::Store;

#[derive(Debug, Parser)]
#[command(name = "pouet_scrape", version, about = "Resumable, polite pouet.net scraper")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Site root for HTML pages.
    #[arg(long, global = true, env = "POUET_SITE_URL", default_value = SITE_URL)]
    pub site_url: String,

    /// JSON API root.
    #[arg(long, global = true, env = "POUET_API_URL", default_value = API_URL)]
    pub api_url: String,

    #[arg(long, global = true, env = "POUET_USER_AGENT", default_value = USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout, seconds.
    #[arg(long, global = true, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Debug log file. Defaults to `debug.log` in the output directory.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, conflicts_with = "log_file")]
    pub no_log_file: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forum threads, one artifact per topic id.
    Topics(ScanArgs),
    /// Oneliner shoutbox pages, one artifact per page.
    Oneliners(ScanArgs),
    /// User records from the JSON API.
    Users(UserArgs),
    /// Ledger, negative cache and artifact consistency of an output directory.
    Status {
        #[arg(value_enum)]
        job: JobArg,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum JobArg {
    Topics,
    Oneliners,
    Users,
}

impl From<JobArg> for JobKind {
    fn from(j: JobArg) -> Self {
        match j {
            JobArg::Topics => JobKind::Topics,
            JobArg::Oneliners => JobKind::Oneliners,
            JobArg::Users => JobKind::Users,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Report and go on.
    Continue,
    /// Treat as the end of the data and stop.
    Stop,
    /// Remember in the negative cache and go on.
    Remember,
}

impl From<PolicyArg> for NotFoundPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Continue => NotFoundPolicy::Continue,
            PolicyArg::Stop => NotFoundPolicy::EndOfData,
            PolicyArg::Remember => NotFoundPolicy::Remember,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Output directory (ledger, negative cache, artifacts).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// First id of a dense scan.
    #[arg(long)]
    pub start: Option<u32>,

    /// Last id of a dense scan (inclusive).
    #[arg(long)]
    pub end: Option<u32>,

    /// Explicit ids, e.g. `1-5,9,12`.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub ids: Option<String>,

    /// Shortest pause between ids, seconds.
    #[arg(long)]
    pub delay_min: Option<f64>,

    /// Longest pause between ids, seconds.
    #[arg(long)]
    pub delay_max: Option<f64>,

    /// Shortest pause between sub-pages of one id, seconds.
    #[arg(long)]
    pub page_delay_min: Option<f64>,

    /// Longest pause between sub-pages of one id, seconds.
    #[arg(long)]
    pub page_delay_max: Option<f64>,

    /// Hard ceiling on request rate.
    #[arg(long)]
    pub max_per_minute: Option<f64>,

    /// What to do when an id does not exist remotely.
    #[arg(long, value_enum)]
    pub on_not_found: Option<PolicyArg>,

    /// Skip the plain-text rendering.
    #[arg(long)]
    pub no_text: bool,

    /// Seed delays and sampling (reproducible runs).
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct UserArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Probe this many random ids instead of a range.
    #[arg(long, conflicts_with_all = ["ids", "start", "end"])]
    pub sample: Option<usize>,

    /// Upper bound of the sampled id space.
    #[arg(long)]
    pub max_id: Option<u32>,
}

/// Merge command-line overrides into the job defaults.
pub fn fetch_options(kind: JobKind, args: &ScanArgs) -> Result<FetchOptions> {
    let mut opts = FetchOptions::for_job(kind);

    if let Some(out) = &args.out {
        opts.out_dir = out.clone();
    }

    if let Some(list) = &args.ids {
        opts.ids = IdSpace::List(IdSpace::parse_list(list)?);
    } else if args.start.is_some() || args.end.is_some() {
        opts.ids = match (&opts.ids, args.start, args.end) {
            (IdSpace::Range { start, end }, s, e) => {
                IdSpace::Range { start: s.unwrap_or(*start), end: e.unwrap_or(*end) }
            }
            (IdSpace::From { start }, s, Some(e)) => IdSpace::Range { start: s.unwrap_or(*start), end: e },
            (IdSpace::From { start }, s, None) => IdSpace::From { start: s.unwrap_or(*start) },
            (IdSpace::Sample { max_id, .. }, s, e) => {
                IdSpace::Range { start: s.unwrap_or(0), end: e.unwrap_or(*max_id) }
            }
            (IdSpace::List(_), s, e) => IdSpace::Range { start: s.unwrap_or(0), end: e.unwrap_or(s.unwrap_or(0)) },
        };
    }

    opts.item_delay = override_range(opts.item_delay, args.delay_min, args.delay_max);
    opts.page_delay = override_range(opts.page_delay, args.page_delay_min, args.page_delay_max);
    if let Some(rate) = args.max_per_minute {
        opts.max_per_minute = rate;
    }
    if let Some(policy) = args.on_not_found {
        opts.not_found = policy.into();
    }
    if args.no_text {
        opts.write_text = false;
    }
    opts.seed = args.seed;

    opts.validate()?;
    Ok(opts)
}

pub fn user_options(args: &UserArgs) -> Result<FetchOptions> {
    let mut opts = fetch_options(JobKind::Users, &args.scan)?;
    if let IdSpace::Sample { max_id, probes } = &mut opts.ids {
        if let Some(n) = args.sample {
            *probes = n;
        }
        if let Some(m) = args.max_id {
            *max_id = m;
        }
    }
    opts.validate()?;
    Ok(opts)
}

fn override_range(base: DelayRange, min: Option<f64>, max: Option<f64>) -> DelayRange {
    let min = min.map(secs_to_duration).unwrap_or(base.min);
    let max = max.map(secs_to_duration).unwrap_or(base.max);
    DelayRange { min, max }
}

impl Cli {
    pub fn net_options(&self) -> NetOptions {
        NetOptions {
            site_url: self.site_url.clone(),
            api_url: self.api_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }

    fn log_path(&self, out_dir: &std::path::Path) -> Option<PathBuf> {
        if self.no_log_file {
            return None;
        }
        Some(self.log_file.clone().unwrap_or_else(|| out_dir.join(DEBUG_LOG_FILE)))
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let net = cli.net_options();

    let (kind, opts) = match &cli.command {
        Command::Status { job, out } => {
            let kind = JobKind::from(*job);
            let dir = out.clone().unwrap_or_else(|| PathBuf::from(kind.default_dir()));
            crate::log::init("warn", None)?;
            return print_status(kind, &dir);
        }
        Command::Topics(args) => (JobKind::Topics, fetch_options(JobKind::Topics, args)?),
        Command::Oneliners(args) => (JobKind::Oneliners, fetch_options(JobKind::Oneliners, args)?),
        Command::Users(args) => (JobKind::Users, user_options(args)?),
    };

    ensure_directory(&opts.out_dir)?;
    crate::log::init("warn", cli.log_path(&opts.out_dir).as_deref())?;

    let http = ReqwestClient::new(&net)?;
    let rt = Runtime { http: &http, sleeper: Box::new(ThreadSleeper), stop: StopSignal::install()? };

    let width = if kind == JobKind::Users { 6 } else { 5 };
    let mut progress = ConsoleProgress::stdout(width);

    let summary: RunSummary = match kind {
        JobKind::Topics => engine::run(&Topics::new(&net), &opts, rt, Some(&mut progress))?,
        JobKind::Oneliners => engine::run(&Oneliners::new(&net), &opts, rt, Some(&mut progress))?,
        JobKind::Users => engine::run(&Users::new(&net), &opts, rt, Some(&mut progress))?,
    };

    if !summary.failed.is_empty() {
        eprintln!("{} id(s) failed and will be retried on the next run", summary.failed.len());
    }
    Ok(())
}

fn print_status(kind: JobKind, dir: &std::path::Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(Error::Config(format!("no output directory at {}", dir.display())));
    }
    let store = Store::open(dir)?;
    let audit = store.audit()?;
    println!("{} in {}", kind.name(), dir.display());
    println!("  completed (ledger): {}", audit.ledger_entries);
    println!("  malformed lines:    {}", audit.malformed_lines);
    println!("  known missing:      {}", audit.negative_entries);
    println!("  artifacts on disk:  {}", audit.artifacts);
    if !audit.missing_artifacts.is_empty() {
        println!("  logged but missing: {:?}", audit.missing_artifacts);
    }
    if !audit.orphans.is_empty() {
        println!("  orphans (re-fetched next run): {:?}", audit.orphans);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pouet_scrape").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn topics_range_override() {
        let cli = parse(&["topics", "--start", "8079", "--end", "8100", "--on-not-found", "stop"]);
        let Command::Topics(args) = &cli.command else { panic!("wrong command") };
        let opts = fetch_options(JobKind::Topics, args).unwrap();
        assert_eq!(opts.ids, IdSpace::Range { start: 8079, end: 8100 });
        assert_eq!(opts.not_found, NotFoundPolicy::EndOfData);
    }

    #[test]
    fn oneliners_end_resolves_open_range() {
        let args = ScanArgs { end: Some(20), ..Default::default() };
        let opts = fetch_options(JobKind::Oneliners, &args).unwrap();
        assert_eq!(opts.ids, IdSpace::Range { start: 1, end: 20 });

        let opts = fetch_options(JobKind::Oneliners, &ScanArgs::default()).unwrap();
        assert_eq!(opts.ids, IdSpace::From { start: 1 });
    }

    #[test]
    fn id_list_and_delays() {
        let cli = parse(&["topics", "--ids", "3,1-2", "--delay-min", "0.5", "--delay-max", "1", "--no-text"]);
        let Command::Topics(args) = &cli.command else { panic!("wrong command") };
        let opts = fetch_options(JobKind::Topics, args).unwrap();
        assert_eq!(opts.ids, IdSpace::List(vec![1, 2, 3]));
        assert_eq!(opts.item_delay, DelayRange::secs(0.5, 1.0));
        assert!(!opts.write_text);
    }

    #[test]
    fn users_sample_flags() {
        let cli = parse(&["users", "--sample", "10", "--max-id", "500", "--seed", "3"]);
        let Command::Users(args) = &cli.command else { panic!("wrong command") };
        let opts = user_options(args).unwrap();
        assert_eq!(opts.ids, IdSpace::Sample { max_id: 500, probes: 10 });
        assert_eq!(opts.not_found, NotFoundPolicy::Remember);
        assert_eq!(opts.seed, Some(3));
    }

    #[test]
    fn inverted_delays_are_rejected() {
        let args = ScanArgs { delay_min: Some(9.0), delay_max: Some(1.0), ..Default::default() };
        assert!(matches!(fetch_options(JobKind::Topics, &args), Err(Error::Config(_))));
    }

    #[test]
    fn infinite_delay_is_a_config_error() {
        let cli = parse(&["topics", "--delay-max", "inf"]);
        let Command::Topics(args) = &cli.command else { panic!("wrong command") };
        assert!(matches!(fetch_options(JobKind::Topics, args), Err(Error::Config(_))));

        let args = ScanArgs { max_per_minute: Some(1e-30), ..Default::default() };
        assert!(matches!(fetch_options(JobKind::Users, &args), Err(Error::Config(_))));
    }

    #[test]
    fn ids_conflict_with_range() {
        let res = Cli::try_parse_from(["pouet_scrape", "topics", "--ids", "1", "--start", "2"]);
        assert!(res.is_err());
    }
}
