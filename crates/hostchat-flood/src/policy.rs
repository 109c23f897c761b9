//! Flood filter tunables.

use hostchat_protocol::MAX_MESSAGE_LENGTH;

/// The flood filter's tunable values.
///
/// The relay builds one from its live configuration for every evaluation,
/// so changes take effect on the next message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodPolicy {
    /// Severity of an empty message.
    pub short_score: u32,
    /// Severity of a maximum-length message.
    pub long_score: u32,
    /// Accumulated score at which a timeout starts.
    pub timeout_score: u32,
    /// Length of a first timeout, in seconds.
    pub timeout_seconds: u32,
    /// Seconds without an active timeout before escalation is forgotten.
    pub timeout_reset_seconds: u32,
}

impl Default for FloodPolicy {
    fn default() -> Self {
        Self {
            short_score: 2,
            long_score: 5,
            timeout_score: 10,
            timeout_seconds: 120,
            timeout_reset_seconds: 1800,
        }
    }
}

impl FloodPolicy {
    /// Severity of a message with a `body_len`-byte body.
    ///
    /// Linear between `short_score` and `long_score`, integer floor
    /// division: `short + len * (long + 1 - short) / (MAX + 1)`.
    /// Clamped at zero if `long_score` is configured below `short_score`.
    pub fn severity(&self, body_len: usize) -> u32 {
        let short = i64::from(self.short_score);
        let long = i64::from(self.long_score);
        let len = body_len.min(MAX_MESSAGE_LENGTH) as i64;
        let span = MAX_MESSAGE_LENGTH as i64 + 1;
        let score = short + (len * (long + 1 - short)).div_euclid(span);
        score.clamp(0, i64::from(u32::MAX)) as u32
    }
}
