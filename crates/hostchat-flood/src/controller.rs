//! The per-address flood table.
//!
//! Records are created lazily on the first message from an address and
//! deleted by [`FloodController::advance_second`] once they go idle. There
//! is no TTL: an address that keeps chatting keeps its record, an address
//! that goes quiet loses it as soon as every counter has run down.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use hostchat_protocol::MessageBody;

use crate::{ClientSpamStats, FloodPolicy};

/// Outcome of evaluating one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodVerdict {
    /// The message may be broadcast.
    Accept,
    /// The address is timed out. The sender should be told how long.
    Rejected {
        /// Seconds until the address may chat again.
        remaining_secs: u32,
    },
}

/// Owns one [`ClientSpamStats`] per source address.
#[derive(Debug, Default)]
pub struct FloodController {
    stats: HashMap<Ipv4Addr, ClientSpamStats>,
}

impl FloodController {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether a message from `address` is accepted.
    ///
    /// While a timeout is active the message is rejected immediately and
    /// its severity is not counted. Otherwise the severity is added to the
    /// score; reaching `policy.timeout_score` starts a timeout (doubling
    /// the previous one if its escalation window is still open), and the
    /// message that triggered it is itself rejected.
    pub fn evaluate(
        &mut self,
        address: Ipv4Addr,
        body: &MessageBody,
        policy: &FloodPolicy,
    ) -> FloodVerdict {
        let stats = self.stats.entry(address).or_default();

        if !stats.is_timed_out() {
            let score = policy.severity(body.len());
            stats.spam_score = stats.spam_score.saturating_add(score);

            if stats.spam_score >= policy.timeout_score {
                stats.next_timeout_seconds = if stats.next_timeout_seconds > 0 {
                    stats.next_timeout_seconds.saturating_mul(2)
                } else {
                    policy.timeout_seconds
                };
                stats.timeout_seconds = stats.next_timeout_seconds;
                stats.timeout_reset_seconds = policy.timeout_reset_seconds;
                tracing::info!(
                    %address,
                    spam_score = stats.spam_score,
                    timeout_secs = stats.timeout_seconds,
                    "flood limit reached, address timed out"
                );
            }
        }

        if stats.is_timed_out() {
            FloodVerdict::Rejected {
                remaining_secs: stats.timeout_seconds,
            }
        } else {
            FloodVerdict::Accept
        }
    }

    /// Applies one elapsed second to every record and drops idle ones.
    pub fn advance_second(&mut self) {
        let before = self.stats.len();
        self.stats.retain(|_, stats| {
            stats.advance_second();
            !stats.is_idle()
        });
        let dropped = before - self.stats.len();
        if dropped > 0 {
            tracing::trace!(dropped, live = self.stats.len(), "flood records expired");
        }
    }

    /// The record for `address`, if one is live.
    pub fn stats(&self, address: Ipv4Addr) -> Option<&ClientSpamStats> {
        self.stats.get(&address)
    }

    /// Inserts or replaces a record. Used to restore state and in tests.
    pub fn insert(&mut self, address: Ipv4Addr, stats: ClientSpamStats) {
        self.stats.insert(address, stats);
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Returns `true` if no address has a live record.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
