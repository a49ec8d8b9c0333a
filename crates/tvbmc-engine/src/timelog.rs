use std::time::{Duration, Instant};

/// Elapsed-time bookkeeping for one evaluation run.
#[derive(Debug, Clone)]
pub struct TimeLog {
    start: Instant,
    lap_start: Option<Instant>,
    last_lap: Option<Duration>,
}

impl TimeLog {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            lap_start: None,
            last_lap: None,
        }
    }

    /// Time since construction.
    pub fn total_time(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn total_nanos(&self) -> u128 {
        self.total_time().as_nanos()
    }

    pub fn start_lap(&mut self) {
        self.lap_start = Some(Instant::now());
    }

    /// Close the current lap and return its length. Without an open lap the
    /// lap is measured from construction.
    pub fn end_lap(&mut self) -> Duration {
        let from = self.lap_start.take().unwrap_or(self.start);
        let lap = from.elapsed();
        self.last_lap = Some(lap);
        lap
    }

    pub fn last_lap_time(&self) -> Option<Duration> {
        self.last_lap
    }

    /// True once the run has taken at least `budget`.
    pub fn exceeds(&self, budget: Duration) -> bool {
        self.total_time() >= budget
    }
}

impl Default for TimeLog {
    fn default() -> Self {
        Self::new()
    }
}
