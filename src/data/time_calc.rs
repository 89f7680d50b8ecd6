use std::time::Duration;

/// Accumulates durations of one repeated step.
#[derive(Debug, Default, Clone)]
pub struct TimeCalc {
    n: u32,
    total: Duration,
}

impl TimeCalc {
    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn avg(&self) -> Duration {
        if self.n == 0 {
            return Duration::ZERO;
        }
        self.total / self.n
    }

    pub fn push(&mut self, x: Duration) {
        self.total += x;
        self.n += 1;
    }
}
