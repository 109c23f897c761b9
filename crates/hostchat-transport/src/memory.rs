//! In-memory transport that records outgoing packets.
//!
//! Used by the demo binary and by tests that need to observe exactly which
//! peers a broadcast reached. Individual peers can be marked unreachable,
//! or broken with an I/O error, to exercise the mid-fan-out failure path.

use std::collections::{HashMap, HashSet};
use std::io;

use crate::{PacketKind, PeerId, Transport, TransportError};

/// A packet captured by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPacket {
    /// Destination peer.
    pub peer: PeerId,
    /// Packet kind the payload was sent under.
    pub kind: PacketKind,
    /// Encoded payload.
    pub payload: Vec<u8>,
}

/// A [`Transport`] that queues packets in an outbox instead of sending them.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    kinds: HashMap<&'static str, PacketKind>,
    unreachable: HashSet<PeerId>,
    broken: HashMap<PeerId, io::ErrorKind>,
    outbox: Vec<SentPacket>,
}

impl MemoryTransport {
    /// Creates an empty transport with no registered packet kinds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later send to `peer` fail with [`TransportError::Unreachable`].
    pub fn set_unreachable(&mut self, peer: PeerId) {
        self.unreachable.insert(peer);
    }

    /// Makes every later send to `peer` fail with
    /// [`TransportError::SendFailed`] carrying an error of `kind`.
    pub fn set_broken(&mut self, peer: PeerId, kind: io::ErrorKind) {
        self.broken.insert(peer, kind);
    }

    /// Makes `peer` reachable again, clearing any injected failure.
    pub fn set_reachable(&mut self, peer: PeerId) {
        self.unreachable.remove(&peer);
        self.broken.remove(&peer);
    }

    /// Looks up a registered packet kind by name.
    pub fn packet_kind(&self, name: &str) -> Option<PacketKind> {
        self.kinds.get(name).copied()
    }

    /// Packets sent so far, oldest first.
    pub fn sent(&self) -> &[SentPacket] {
        &self.outbox
    }

    /// Removes and returns all queued packets.
    pub fn drain(&mut self) -> Vec<SentPacket> {
        std::mem::take(&mut self.outbox)
    }
}

impl Transport for MemoryTransport {
    fn register_packet(
        &mut self,
        name: &'static str,
    ) -> Result<PacketKind, TransportError> {
        if self.kinds.contains_key(name) {
            return Err(TransportError::DuplicatePacket(name));
        }
        let kind = PacketKind::new(self.kinds.len() as u16);
        self.kinds.insert(name, kind);
        tracing::debug!(name, id = kind.id(), "packet kind registered");
        Ok(kind)
    }

    fn send(
        &mut self,
        peer: PeerId,
        kind: PacketKind,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        if !self.kinds.values().any(|k| *k == kind) {
            return Err(TransportError::UnknownPacket(kind.id()));
        }
        if self.unreachable.contains(&peer) {
            return Err(TransportError::Unreachable(peer));
        }
        if let Some(&kind) = self.broken.get(&peer) {
            return Err(TransportError::SendFailed {
                peer,
                source: io::Error::from(kind),
            });
        }
        self.outbox.push(SentPacket {
            peer,
            kind,
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
