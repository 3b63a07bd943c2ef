/// Millisecond time source. Wraps at `u32::MAX`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Non-blocking fixed-period tick.
///
/// Call `poll` as often as convenient; it returns true when a tick is due.
/// The first poll always fires. After that a tick fires once `period_ms` has
/// passed since the previous one, measured from the time it was polled, so
/// a late poll delays later ticks rather than bunching them up.
#[derive(Clone, Copy, Debug)]
pub struct Ticker {
    period_ms: u32,
    last: Option<u32>,
    ticks: u32,
}

impl Ticker {
    pub const fn new(period_ms: u32) -> Self {
        Self { period_ms, last: None, ticks: 0 }
    }

    pub fn poll<C: Clock>(&mut self, clock: &C) -> bool {
        let now = clock.now_ms();
        let due = match self.last {
            None => true,
            Some(last) => now.wrapping_sub(last) >= self.period_ms,
        };
        if due {
            self.last = Some(now);
            self.ticks = self.ticks.wrapping_add(1);
        }
        due
    }

    /// Number of ticks fired so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}
