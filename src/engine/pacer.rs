// src/engine/pacer.rs
// Randomized polite pauses. The pause IS the concurrency control.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::stop::StopSignal;
use crate::config::consts::SLEEP_SLICE_MS;
use crate::config::{secs_to_duration, DelayRange, FetchOptions};

pub trait Sleeper {
    /// Pause for `d`, or less if `stop` is raised meanwhile.
    fn sleep(&mut self, d: Duration, stop: &StopSignal);
}

/// Real sleeping, in short slices so a stop request is noticed quickly.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, d: Duration, stop: &StopSignal) {
        // No deadline when `d` is past what `Instant` can hold: only a stop ends it.
        let deadline = Instant::now().checked_add(d);
        let slice = Duration::from_millis(SLEEP_SLICE_MS);
        loop {
            if stop.is_requested() {
                return;
            }
            let step = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return;
                    }
                    slice.min(deadline - now)
                }
                None => slice,
            };
            thread::sleep(step);
        }
    }
}

pub struct Pacer<'a> {
    item: DelayRange,
    page: DelayRange,
    floor: Duration,
    rng: StdRng,
    sleeper: Box<dyn Sleeper + 'a>,
}

impl<'a> Pacer<'a> {
    pub fn new(opts: &FetchOptions, sleeper: Box<dyn Sleeper + 'a>) -> Self {
        let rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            item: opts.item_delay,
            page: opts.page_delay,
            floor: opts.min_interval(),
            rng,
            sleeper,
        }
    }

    /// Uniform draw from `range`, never below the rate-ceiling floor.
    pub fn sample(&mut self, range: DelayRange) -> Duration {
        let (lo, hi) = (range.min.as_secs_f64(), range.max.as_secs_f64());
        let secs = if hi > lo { self.rng.random_range(lo..=hi) } else { lo };
        secs_to_duration(secs).max(self.floor)
    }

    pub fn next_item_delay(&mut self) -> Duration {
        self.sample(self.item)
    }

    pub fn next_page_delay(&mut self) -> Duration {
        self.sample(self.page)
    }

    pub fn sleep(&mut self, d: Duration, stop: &StopSignal) {
        self.sleeper.sleep(d, stop);
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobKind;

    fn opts(min: f64, max: f64, per_minute: f64) -> FetchOptions {
        let mut o = FetchOptions::for_job(JobKind::Topics);
        o.item_delay = DelayRange::secs(min, max);
        o.page_delay = DelayRange::secs(min, max);
        o.max_per_minute = per_minute;
        o.seed = Some(42);
        o
    }

    #[test]
    fn draws_stay_in_range() {
        let mut pacer = Pacer::new(&opts(2.0, 5.0, 600.0), Box::new(ThreadSleeper));
        for _ in 0..200 {
            let d = pacer.next_item_delay();
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(5), "{d:?}");
        }
    }

    #[test]
    fn draws_vary() {
        let mut pacer = Pacer::new(&opts(2.0, 5.0, 600.0), Box::new(ThreadSleeper));
        let first = pacer.next_item_delay();
        assert!((0..50).any(|_| pacer.next_item_delay() != first));
    }

    #[test]
    fn rate_ceiling_stretches_short_pauses() {
        // 6 per minute => at least 10 s between requests.
        let mut pacer = Pacer::new(&opts(0.0, 1.0, 6.0), Box::new(ThreadSleeper));
        for _ in 0..50 {
            assert!(pacer.next_page_delay() >= Duration::from_secs(10));
        }
    }

    #[test]
    fn same_seed_same_delays() {
        let mut a = Pacer::new(&opts(1.0, 9.0, 600.0), Box::new(ThreadSleeper));
        let mut b = Pacer::new(&opts(1.0, 9.0, 600.0), Box::new(ThreadSleeper));
        for _ in 0..10 {
            assert_eq!(a.next_item_delay(), b.next_item_delay());
        }
    }

    #[test]
    fn stop_cuts_sleep_short() {
        let stop = StopSignal::new();
        stop.request();
        let started = Instant::now();
        ThreadSleeper.sleep(Duration::from_secs(30), &stop);
        ThreadSleeper.sleep(Duration::MAX, &stop);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
