//! Transport abstraction layer for hostchat.
//!
//! Provides the [`Transport`] trait that moves encoded packets between
//! peers of a session. The chat core never opens sockets itself; whatever
//! reliable-packet layer the embedding game uses implements this trait.
//!
//! Everything here is synchronous: a `send` call completes (or fails)
//! before it returns. The chat core runs on the single thread that drives
//! the game/network loop.

mod error;
mod memory;

pub use error::TransportError;
pub use memory::{MemoryTransport, SentPacket};

use std::fmt;

/// A peer slot index inside a session.
///
/// Slots are small integers handed out by the session directory. A peer
/// slot is not a player identity and not a network address: the same
/// slot may be reused by a different player after a disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(u8);

impl PeerId {
    /// Creates a `PeerId` from a raw slot index.
    pub const fn new(slot: u8) -> Self {
        Self(slot)
    }

    /// Returns the raw slot index.
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// Handle for a named packet kind registered with a transport.
///
/// Returned by [`Transport::register_packet`] and passed back on every
/// [`Transport::send`] so the remote side can route the payload to the
/// right decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketKind(u16);

impl PacketKind {
    /// Creates a `PacketKind` from a raw id.
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub const fn id(self) -> u16 {
        self.0
    }
}

/// Moves encoded packets to peers.
pub trait Transport {
    /// Registers a named packet kind. Names must be unique per transport.
    ///
    /// # Errors
    /// Returns [`TransportError::DuplicatePacket`] if `name` is already
    /// registered.
    fn register_packet(
        &mut self,
        name: &'static str,
    ) -> Result<PacketKind, TransportError>;

    /// Sends one packet to `peer`.
    ///
    /// # Errors
    /// Returns [`TransportError`] if the packet kind is unknown or the
    /// peer cannot be reached.
    fn send(
        &mut self,
        peer: PeerId,
        kind: PacketKind,
        payload: &[u8],
    ) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_id_new_and_index() {
        let id = PeerId::new(3);
        assert_eq!(id.index(), 3);
    }

    #[test]
    fn test_peer_id_display() {
        assert_eq!(PeerId::new(7).to_string(), "peer-7");
    }

    #[test]
    fn test_peer_id_orders_by_slot() {
        let mut peers = vec![PeerId::new(4), PeerId::new(1), PeerId::new(2)];
        peers.sort();
        assert_eq!(peers, vec![PeerId::new(1), PeerId::new(2), PeerId::new(4)]);
    }

    #[test]
    fn test_peer_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(PeerId::new(1), "alice");
        map.insert(PeerId::new(2), "bob");
        assert_eq!(map[&PeerId::new(1)], "alice");
    }
}
