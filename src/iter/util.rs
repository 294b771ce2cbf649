use serde::Serialize;
use std::time::{Duration, Instant};

///
/// Where a scan stands, handed to `ScanListener::on_progress`.
///
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct Progress {
    /// index of the last block read, `None` before the first one
    pub block: Option<u32>,
    /// bytes of the file consumed so far
    pub offset: u64,
    /// total file length
    pub len: u64,
    pub elapsed: Duration,
    /// set on the final report of a scan
    pub done: bool,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.len == 0 {
            100.0
        } else {
            self.offset as f64 * 100.0 / self.len as f64
        }
    }
}

///
/// Lets a progress report through at most once per `interval`,
/// and always on the final step.
///
pub(crate) struct ProgressTimer {
    started: Instant,
    last: Option<Instant>,
    interval: Duration,
}

impl ProgressTimer {
    pub(crate) fn new(interval: Duration) -> Self {
        ProgressTimer {
            started: Instant::now(),
            last: None,
            interval,
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// whether a report is due now
    pub(crate) fn tick(&mut self, done: bool) -> bool {
        let now = Instant::now();
        let due = match self.last {
            None => now.duration_since(self.started) >= self.interval,
            Some(last) => now.duration_since(last) >= self.interval,
        };
        if due || done {
            self.last = Some(now);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle() {
        let mut timer = ProgressTimer::new(Duration::from_secs(3600));
        assert!(!timer.tick(false));
        assert!(!timer.tick(false));
        assert!(timer.tick(true));
        assert!(!timer.tick(false));

        let mut timer = ProgressTimer::new(Duration::from_secs(0));
        assert!(timer.tick(false));
        assert!(timer.tick(false));
    }

    #[test]
    fn test_percent() {
        let progress = Progress {
            block: Some(3),
            offset: 250,
            len: 1000,
            elapsed: Duration::from_millis(10),
            done: false,
        };
        assert_eq!(progress.percent(), 25.0);
        let empty = Progress {
            len: 0,
            offset: 0,
            ..progress
        };
        assert_eq!(empty.percent(), 100.0);
    }
}
