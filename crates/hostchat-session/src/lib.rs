//! Session membership for hostchat.
//!
//! The chat relay doesn't own the session. It asks a directory who is
//! connected, who the host is, which team a peer is on, and which player
//! and address sit behind a peer slot:
//!
//! 1. **Directory contract**: the [`SessionDirectory`] trait the relay is
//!    generic over
//! 2. **In-memory directory**: [`Membership`], a plain implementation
//!    for embedders without their own session layer (and for tests)
//!
//! # How it fits in the stack
//!
//! ```text
//! Relay (above)  ← routes by peer set, rewrites sender names
//!     ↕
//! Session Layer (this crate)  ← peer slots, identities, teams, addresses
//!     ↕
//! Protocol Layer (below)  ← PeerId, PeerSet, PlayerUid
//! ```

mod directory;
mod error;
mod membership;

pub use directory::{PlayerIdentity, SessionDirectory, TeamIndex};
pub use error::SessionError;
pub use membership::{Membership, PeerEntry};
