//! Chat flood control for hostchat.
//!
//! The host keeps one [`ClientSpamStats`] record per source address.
//! Every accepted submission adds a length-scaled severity score; when the
//! running score reaches the configured threshold the address is timed
//! out. Timeouts double if the address offends again before its
//! escalation window has fully elapsed.
//!
//! Time only moves when the embedder calls
//! [`FloodController::advance_second`], once per whole elapsed second.
//!
//! # Key types
//!
//! - [`FloodController`]: the per-address table and its state machine
//! - [`FloodPolicy`]: the tunables, passed in fresh on every evaluation
//! - [`FloodVerdict`]: accept, or reject with the seconds left
//! - [`ClientSpamStats`]: one address's record

mod controller;
mod policy;
mod stats;

pub use controller::{FloodController, FloodVerdict};
pub use policy::FloodPolicy;
pub use stats::ClientSpamStats;
