//! Sliding-window throughput tracker and report throttling for bulk
//! ingestion.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Window length used by the ingestion pipeline, in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Counts increments in one-second buckets over a sliding window and
/// reports the average per-second rate across that window.
pub struct RateTracker {
    window_secs: u64,
    inner: Mutex<RateInner>,
}

struct RateInner {
    started: Instant,
    /// (seconds since `started`, count) per bucket; front = oldest.
    buckets: VecDeque<(u64, u64)>,
    /// Cumulative count since construction, never pruned.
    total: u64,
}

impl RateTracker {
    /// Create a tracker with the given window length in seconds.
    pub fn new(window_secs: u64) -> Self {
        Self {
            window_secs: window_secs.max(1),
            inner: Mutex::new(RateInner {
                started: Instant::now(),
                buckets: VecDeque::new(),
                total: 0,
            }),
        }
    }

    /// Record one event.
    pub fn inc(&self) {
        let mut inner = self.inner.lock().expect("rate lock poisoned");
        let now_sec = inner.started.elapsed().as_secs();
        inner.total += 1;

        match inner.buckets.back_mut() {
            Some((sec, count)) if *sec == now_sec => *count += 1,
            _ => inner.buckets.push_back((now_sec, 1)),
        }

        Self::prune(&mut inner, now_sec, self.window_secs);
    }

    /// Average events per second over the sliding window.
    pub fn rate(&self) -> f64 {
        let mut inner = self.inner.lock().expect("rate lock poisoned");
        let now_sec = inner.started.elapsed().as_secs();
        Self::prune(&mut inner, now_sec, self.window_secs);

        let in_window: u64 = inner.buckets.iter().map(|(_, count)| count).sum();
        in_window as f64 / self.window_secs as f64
    }

    /// Cumulative count since construction.
    pub fn total(&self) -> u64 {
        self.inner.lock().expect("rate lock poisoned").total
    }

    fn prune(inner: &mut RateInner, now_sec: u64, window_secs: u64) {
        while let Some((sec, _)) = inner.buckets.front() {
            if sec + window_secs <= now_sec {
                inner.buckets.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Throttles progress reporting to at most one report per interval.
///
/// The first call is always due; each due call stamps the gate, so
/// subsequent calls stay shut until the interval has elapsed again.
pub struct ReportGate {
    interval: Duration,
    last: Option<Instant>,
}

impl ReportGate {
    /// Create a gate with the given minimum interval between reports.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether a report is due now; stamps the gate when it is.
    pub fn due(&mut self) -> bool {
        let due = self.last.map_or(true, |at| at.elapsed() >= self.interval);
        if due {
            self.last = Some(Instant::now());
        }
        due
    }
}
