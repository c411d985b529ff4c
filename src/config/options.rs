// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;
use crate::engine::IdSpace;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    Topics,
    Oneliners,
    Users,
}

impl JobKind {
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Topics => "topics",
            JobKind::Oneliners => "oneliners",
            JobKind::Users => "users",
        }
    }

    pub fn default_dir(&self) -> &'static str {
        match self {
            JobKind::Topics => TOPICS_DIR,
            JobKind::Oneliners => ONELINERS_DIR,
            JobKind::Users => USERS_DIR,
        }
    }
}

/// What the loop does when an identifier turns out not to exist remotely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// Report it and move on to the next identifier.
    Continue,
    /// The scan has run past the last valid identifier: stop here.
    EndOfData,
    /// Record it in the negative cache so no later run probes it again, then move on.
    Remember,
}

/// Closed interval a randomized pause is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange { min: Duration::ZERO, max: Duration::ZERO };

    /// Negative and NaN clamp to zero, out-of-range values saturate; `validate` rejects
    /// anything past `MAX_DELAY_SECS`.
    pub fn secs(min: f64, max: f64) -> Self {
        Self { min: secs_to_duration(min), max: secs_to_duration(max) }
    }

    fn from_pair((min, max): (f64, f64)) -> Self {
        Self::secs(min, max)
    }
}

/// Saturating float-seconds conversion.
pub fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchOptions {
    pub ids: IdSpace,
    pub out_dir: PathBuf,
    /// Pause between two identifiers.
    pub item_delay: DelayRange,
    /// Pause between two sub-pages of the same identifier.
    pub page_delay: DelayRange,
    /// Rate ceiling. Any sampled pause shorter than `60 / max_per_minute` seconds is stretched.
    pub max_per_minute: f64,
    pub not_found: NotFoundPolicy,
    /// Also write the plain-text rendering next to each JSON artifact.
    pub write_text: bool,
    /// Fixed RNG seed (delays and sampling). `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl FetchOptions {
    /// Defaults the original batch jobs ran with.
    pub fn for_job(kind: JobKind) -> Self {
        let (ids, item_delay, page_delay, not_found) = match kind {
            JobKind::Topics => (
                IdSpace::Range { start: TOPICS_FIRST_ID, end: TOPICS_LAST_ID },
                DelayRange::from_pair(TOPIC_DELAY_SECS),
                DelayRange::from_pair(TOPIC_PAGE_DELAY_SECS),
                NotFoundPolicy::Continue,
            ),
            JobKind::Oneliners => (
                IdSpace::From { start: ONELINERS_FIRST_PAGE },
                DelayRange::from_pair(ONELINER_DELAY_SECS),
                DelayRange::ZERO,
                NotFoundPolicy::EndOfData,
            ),
            JobKind::Users => (
                IdSpace::Sample { max_id: USERS_MAX_ID, probes: USERS_SAMPLE },
                DelayRange::from_pair(USER_DELAY_SECS),
                DelayRange::ZERO,
                NotFoundPolicy::Remember,
            ),
        };

        Self {
            ids,
            out_dir: PathBuf::from(kind.default_dir()),
            item_delay,
            page_delay,
            max_per_minute: MAX_PER_MINUTE,
            not_found,
            write_text: true,
            seed: None,
        }
    }

    /// Shortest pause allowed between two requests.
    pub fn min_interval(&self) -> Duration {
        secs_to_duration(60.0 / self.max_per_minute)
    }

    pub fn validate(&self) -> Result<()> {
        let longest = Duration::from_secs(MAX_DELAY_SECS);
        for (what, range) in [("item", &self.item_delay), ("page", &self.page_delay)] {
            if range.min > range.max {
                return Err(Error::Config(format!(
                    "{what} delay range is inverted: {:?} > {:?}",
                    range.min, range.max
                )));
            }
            if range.max > longest {
                return Err(Error::Config(format!(
                    "{what} delay {:?} exceeds the {MAX_DELAY_SECS} s limit",
                    range.max
                )));
            }
        }
        if !self.max_per_minute.is_finite() || self.max_per_minute <= 0.0 {
            return Err(Error::Config(format!(
                "max requests per minute must be positive, got {}",
                self.max_per_minute
            )));
        }
        if self.min_interval() > longest {
            return Err(Error::Config(format!(
                "max requests per minute {} means pauses over {MAX_DELAY_SECS} s",
                self.max_per_minute
            )));
        }
        self.ids.validate()?;
        if self.out_dir.as_os_str().is_empty() {
            return Err(Error::Config("output directory is empty".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetOptions {
    pub site_url: String,
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            site_url: SITE_URL.to_string(),
            api_url: API_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}
