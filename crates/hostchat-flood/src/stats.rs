//! Per-address flood record.

/// Anti-spam state for one source address.
///
/// All counters floor at zero. A record whose score, timeout, and reset
/// window are all zero carries no information and is dropped by the
/// controller on its next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientSpamStats {
    /// Accumulated severity. Decays by 1 per second.
    pub spam_score: u32,
    /// Seconds left in the active timeout.
    pub timeout_seconds: u32,
    /// Length of the next timeout. 0 means the default length.
    pub next_timeout_seconds: u32,
    /// Seconds left before `next_timeout_seconds` is forgotten.
    /// Only counts down while no timeout is active.
    pub timeout_reset_seconds: u32,
}

impl ClientSpamStats {
    /// Applies one elapsed second.
    pub fn advance_second(&mut self) {
        self.spam_score = self.spam_score.saturating_sub(1);
        self.timeout_seconds = self.timeout_seconds.saturating_sub(1);
        if self.timeout_seconds == 0 {
            self.timeout_reset_seconds = self.timeout_reset_seconds.saturating_sub(1);
        }
        if self.timeout_reset_seconds == 0 {
            self.next_timeout_seconds = 0;
        }
    }

    /// Whether the address is serving a timeout.
    pub fn is_timed_out(&self) -> bool {
        self.timeout_seconds > 0
    }

    /// Whether the record can be dropped.
    pub fn is_idle(&self) -> bool {
        self.timeout_seconds == 0 && self.spam_score == 0 && self.timeout_reset_seconds == 0
    }
}
