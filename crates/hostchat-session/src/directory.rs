//! The directory contract the relay consumes.
//!
//! Whatever owns the real session (a game's network layer, a lobby
//! service) implements [`SessionDirectory`]. The relay only reads from it.

use std::fmt;
use std::net::Ipv4Addr;

use hostchat_protocol::{PeerId, PeerSet, PlayerUid};

/// A team number inside a team-based session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeamIndex(pub u8);

impl fmt::Display for TeamIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team-{}", self.0)
    }
}

/// The player behind a peer slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    /// Display name. This is what the host writes into the sender field.
    pub name: String,
    /// The player's unique id.
    pub uid: PlayerUid,
}

impl PlayerIdentity {
    /// Creates an identity.
    pub fn new(name: impl Into<String>, uid: PlayerUid) -> Self {
        Self {
            name: name.into(),
            uid,
        }
    }
}

/// Read-only view of a session's membership.
///
/// All lookups return `None` for slots that aren't connected.
pub trait SessionDirectory {
    /// Whether a session is up and chat may be sent.
    fn is_established(&self) -> bool;

    /// Whether the session is split into teams.
    fn has_teams(&self) -> bool;

    /// Connected peer slots. Iterating the set yields session order.
    fn peers(&self) -> PeerSet;

    /// The slot of the local endpoint.
    fn local_peer(&self) -> PeerId;

    /// The slot of the session host.
    fn host_peer(&self) -> PeerId;

    /// Whether the local endpoint is the host.
    fn is_host(&self) -> bool {
        self.local_peer() == self.host_peer()
    }

    /// The team a peer is on, if teams are in play and it has one.
    fn peer_team(&self, peer: PeerId) -> Option<TeamIndex>;

    /// The player using a peer slot.
    fn peer_player(&self, peer: PeerId) -> Option<&PlayerIdentity>;

    /// The IPv4 address a peer connects from.
    fn peer_address(&self, peer: PeerId) -> Option<Ipv4Addr>;
}
