//! Coarse time keeping for hostchat.
//!
//! Two pieces:
//!
//! - [`SecondClock`] turns arbitrary millisecond deltas into whole seconds,
//!   keeping the remainder. The relay's flood table advances once per
//!   second it reports, so a stalled loop that reports 3 400 ms at once
//!   still gets three decay steps.
//! - [`TickScheduler`] is an optional async driver for embedders that run
//!   on tokio. It wakes at a fixed interval and reports how much time
//!   really passed since the previous wake-up.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(packet) = inbound.recv() => { relay.receive_packet(packet.from, &packet.data).ok(); }
//!         info = scheduler.wait_for_tick() => { relay.tick(info.elapsed_ms()); }
//!     }
//! }
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// SecondClock
// ---------------------------------------------------------------------------

/// Accumulates elapsed milliseconds and hands them out in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecondClock {
    pending_ms: u64,
}

impl SecondClock {
    /// Milliseconds in one clock step.
    pub const STEP_MS: u64 = 1000;

    /// Creates a clock with nothing accumulated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `elapsed_ms` and returns how many whole seconds are now due.
    ///
    /// The sub-second remainder carries over to the next call.
    pub fn advance(&mut self, elapsed_ms: u64) -> u64 {
        self.pending_ms = self.pending_ms.saturating_add(elapsed_ms);
        let seconds = self.pending_ms / Self::STEP_MS;
        self.pending_ms %= Self::STEP_MS;
        seconds
    }

    /// Milliseconds accumulated toward the next second.
    pub fn pending_ms(&self) -> u64 {
        self.pending_ms
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between wake-ups. Default: 250 ms.
    pub interval: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
        }
    }
}

impl TickConfig {
    /// Shortest interval the scheduler accepts.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Config with a specific interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Raises an interval below [`Self::MIN_INTERVAL`] to the minimum.
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_us = self.interval.as_micros() as u64,
                "tick interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Real time since the previous tick (or since creation/resume).
    /// Larger than the interval when the loop ran late.
    pub elapsed: Duration,
    /// `true` if the wake-up came more than one interval late.
    pub late: bool,
    whole_ms: u64,
}

impl TickInfo {
    /// Whole milliseconds to feed the relay's clock for this tick.
    ///
    /// The scheduler carries each tick's sub-millisecond remainder into the
    /// next one, so summing this over many ticks tracks real time.
    pub fn elapsed_ms(&self) -> u64 {
        self.whole_ms
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Interval scheduler that reports real elapsed time.
pub struct TickScheduler {
    interval: Duration,
    tick_count: u64,
    next_tick: Instant,
    last_tick: Instant,
    carry: Duration,
    paused: bool,
}

impl TickScheduler {
    /// Creates a scheduler whose first tick is one interval from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let now = Instant::now();
        debug!(
            interval_ms = config.interval.as_secs_f64() * 1000.0,
            "tick scheduler created"
        );
        Self {
            interval: config.interval,
            tick_count: 0,
            next_tick: now + config.interval,
            last_tick: now,
            carry: Duration::ZERO,
            paused: false,
        }
    }

    /// Creates a scheduler with a specific interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(TickConfig::with_interval(interval))
    }

    /// Waits until the next tick is due.
    ///
    /// While paused this future pends forever; `tokio::select!` keeps
    /// servicing its other branches.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        time::sleep_until(self.next_tick).await;

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_tick);
        let late = now.saturating_duration_since(self.next_tick) > self.interval;
        if late {
            warn!(
                tick = self.tick_count + 1,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "tick ran late"
            );
        }

        let owed = elapsed + self.carry;
        let whole_ms = u64::try_from(owed.as_millis()).unwrap_or(u64::MAX);
        self.carry = owed.saturating_sub(Duration::from_millis(whole_ms));

        self.tick_count += 1;
        self.last_tick = now;
        // Schedule from now, not from the missed deadline: the elapsed
        // time already carries whatever was missed.
        self.next_tick = now + self.interval;

        trace!(tick = self.tick_count, late, "tick fired");

        TickInfo {
            tick: self.tick_count,
            elapsed,
            late,
            whole_ms,
        }
    }

    /// Stops ticking until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Resumes ticking. Time spent paused is not reported as elapsed.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            let now = Instant::now();
            self.last_tick = now;
            self.next_tick = now + self.interval;
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    /// Whether the scheduler is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_below_one_second_yields_nothing() {
        let mut clock = SecondClock::new();
        assert_eq!(clock.advance(999), 0);
        assert_eq!(clock.pending_ms(), 999);
    }

    #[test]
    fn test_clock_carries_remainder() {
        let mut clock = SecondClock::new();
        assert_eq!(clock.advance(600), 0);
        assert_eq!(clock.advance(600), 1);
        assert_eq!(clock.pending_ms(), 200);
        assert_eq!(clock.advance(800), 1);
        assert_eq!(clock.pending_ms(), 0);
    }

    #[test]
    fn test_clock_stall_yields_many_seconds() {
        let mut clock = SecondClock::new();
        assert_eq!(clock.advance(3_400), 3);
        assert_eq!(clock.pending_ms(), 400);
    }

    #[test]
    fn test_clock_zero_delta_is_noop() {
        let mut clock = SecondClock::new();
        clock.advance(500);
        assert_eq!(clock.advance(0), 0);
        assert_eq!(clock.pending_ms(), 500);
    }

    #[test]
    fn test_config_clamps_zero_interval() {
        let cfg = TickConfig::with_interval(Duration::ZERO).validated();
        assert_eq!(cfg.interval, TickConfig::MIN_INTERVAL);
    }
}
