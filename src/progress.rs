// src/progress.rs
//! Lightweight progress reporting for a fetch run.
//! Frontends implement `Progress` to surface status to users.

use std::io::Write;
use std::time::{Duration, Instant};

use crate::engine::{ItemReport, ItemStatus, RunSummary, StopReason};

pub trait Progress {
    /// Called once with the number of ids the run will visit.
    fn begin(&mut self, _total: usize) {}

    /// Called after each id, whatever the outcome.
    fn item(&mut self, _report: &ItemReport) {}

    /// Called at the end of a run that did not fail.
    fn finish(&mut self, _summary: &RunSummary) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Remaining time, extrapolated from the running average per id.
pub fn estimate(elapsed: Duration, done: usize, remaining: usize) -> Option<Duration> {
    if done == 0 {
        return None;
    }
    Some(elapsed.div_f64(done as f64).mul_f64(remaining as f64))
}

/// `1d 03h12m`, `3h05m`, `12m`.
pub fn format_eta(d: Duration) -> String {
    let secs = d.as_secs();
    let (days, hours, minutes) = (secs / 86_400, (secs % 86_400) / 3_600, (secs % 3_600) / 60);
    match (days, hours) {
        (0, 0) => format!("{minutes}m"),
        (0, _) => format!("{hours}h{minutes:02}m"),
        _ => format!("{days}d {hours:02}h{minutes:02}m"),
    }
}

/// One line per id on a writer (stdout for the CLI):
/// `[00042] OK → 00042_2004-03-04_title.json | next in 33s | 12 remaining | ETA ≈ 1h05m`
pub struct ConsoleProgress<W: Write> {
    out: W,
    width: usize,
    started: Instant,
    done: usize,
}

impl ConsoleProgress<std::io::Stdout> {
    pub fn stdout(width: usize) -> Self {
        Self::new(std::io::stdout(), width)
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self { out, width, started: Instant::now(), done: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, report: &ItemReport) -> String {
        let status = match &report.status {
            ItemStatus::Saved { path } => {
                let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                format!("OK → {name}")
            }
            ItemStatus::Empty => "Skipped (nothing found)".to_string(),
            ItemStatus::NotFound { status: Some(code), remembered } => {
                format!("Not found (HTTP {code}){}", if *remembered { ", remembered" } else { "" })
            }
            ItemStatus::NotFound { status: None, remembered } => {
                format!("Not found{}", if *remembered { ", remembered" } else { "" })
            }
            ItemStatus::Failed { reason } => format!("ERROR: {reason}"),
        };

        let mut line = format!("[{:0width$}] {status}", report.id, width = self.width);
        if let Some(d) = report.next_delay {
            line.push_str(&format!(" | next in {:.0}s", d.as_secs_f64()));
        }
        line.push_str(&format!(" | {} remaining", report.remaining));
        if let Some(eta) = estimate(self.started.elapsed(), self.done, report.remaining) {
            line.push_str(&format!(" | ETA ≈ {}", format_eta(eta)));
        }
        line
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn begin(&mut self, total: usize) {
        self.started = Instant::now();
        self.done = 0;
        let _ = writeln!(self.out, "{total} to fetch");
    }

    fn item(&mut self, report: &ItemReport) {
        self.done += 1;
        let line = self.line(report);
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }

    fn finish(&mut self, summary: &RunSummary) {
        let why = match summary.stop {
            StopReason::Exhausted => "done".to_string(),
            StopReason::Interrupted => "interrupted".to_string(),
            StopReason::EndOfData(id) => format!("end of data at {id}"),
        };
        let _ = writeln!(
            self.out,
            "{why}: {} saved, {} empty, {} not found, {} failed, {} already done",
            summary.saved.len(),
            summary.empty.len(),
            summary.not_found.len(),
            summary.failed.len(),
            summary.skipped,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn eta_is_average_times_remaining() {
        assert_eq!(estimate(Duration::from_secs(60), 3, 6), Some(Duration::from_secs(120)));
        assert_eq!(estimate(Duration::from_secs(60), 0, 6), None);
        assert_eq!(estimate(Duration::from_secs(60), 4, 0), Some(Duration::ZERO));
    }

    #[test]
    fn eta_formatting() {
        assert_eq!(format_eta(Duration::from_secs(59)), "0m");
        assert_eq!(format_eta(Duration::from_secs(12 * 60)), "12m");
        assert_eq!(format_eta(Duration::from_secs(3 * 3600 + 5 * 60)), "3h05m");
        assert_eq!(format_eta(Duration::from_secs(86_400 + 3 * 3600 + 12 * 60)), "1d 03h12m");
    }

    #[test]
    fn console_lines_name_the_id() {
        let mut p = ConsoleProgress::new(Vec::new(), 5);
        p.begin(2);
        p.item(&ItemReport {
            id: 42,
            status: ItemStatus::Saved { path: PathBuf::from("bbs/00042_x.json") },
            took: Duration::from_millis(5),
            remaining: 1,
            next_delay: Some(Duration::from_secs(33)),
        });
        p.item(&ItemReport {
            id: 43,
            status: ItemStatus::NotFound { status: Some(404), remembered: false },
            took: Duration::from_millis(5),
            remaining: 0,
            next_delay: None,
        });
        let out = String::from_utf8(p.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "2 to fetch");
        assert!(lines[1].starts_with("[00042] OK → 00042_x.json | next in 33s | 1 remaining"));
        assert!(lines[2].starts_with("[00043] Not found (HTTP 404) | 0 remaining"));
    }
}
