//! The in-memory session directory.
//!
//! `Membership` keeps one [`PeerEntry`] per occupied slot in a `BTreeMap`,
//! so iteration order is slot order, the same order [`PeerSet`] iterates.
//!
//! # Concurrency note
//!
//! Not thread-safe by itself. The relay and its directory are owned by the
//! single thread driving the game loop.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use hostchat_protocol::{PeerId, PeerSet};

use crate::{PlayerIdentity, SessionDirectory, SessionError, TeamIndex};

/// What the directory knows about one connected peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEntry {
    /// The player on this slot. `None` while the peer is still joining.
    pub player: Option<PlayerIdentity>,
    /// Remote address. The local peer usually reports loopback.
    pub address: Ipv4Addr,
    /// Team assignment, if any.
    pub team: Option<TeamIndex>,
}

impl PeerEntry {
    /// A peer with a known player and no team.
    pub fn new(player: PlayerIdentity, address: Ipv4Addr) -> Self {
        Self {
            player: Some(player),
            address,
            team: None,
        }
    }

    /// Sets the team assignment.
    pub fn with_team(mut self, team: TeamIndex) -> Self {
        self.team = Some(team);
        self
    }
}

/// A [`SessionDirectory`] backed by a map of slots.
#[derive(Debug, Clone)]
pub struct Membership {
    peers: BTreeMap<PeerId, PeerEntry>,
    local: PeerId,
    host: PeerId,
    established: bool,
    teams: bool,
}

impl Membership {
    /// Creates an empty, not-yet-established session.
    pub fn new(local: PeerId, host: PeerId) -> Self {
        Self {
            peers: BTreeMap::new(),
            local,
            host,
            established: false,
            teams: false,
        }
    }

    /// Marks the session established (or torn down).
    pub fn set_established(&mut self, established: bool) {
        self.established = established;
        tracing::debug!(established, "session state changed");
    }

    /// Switches team mode on or off.
    pub fn set_teams(&mut self, teams: bool) {
        self.teams = teams;
    }

    /// Hands host authority to another slot (host migration).
    pub fn set_host(&mut self, host: PeerId) {
        tracing::info!(from = %self.host, to = %host, "host changed");
        self.host = host;
    }

    /// Puts a peer into a free slot.
    ///
    /// # Errors
    /// - [`SessionError::SlotOutOfRange`]: slot can't be held in a [`PeerSet`]
    /// - [`SessionError::SlotTaken`]: slot already occupied
    pub fn join(&mut self, peer: PeerId, entry: PeerEntry) -> Result<(), SessionError> {
        if peer.index() as usize >= PeerSet::CAPACITY {
            return Err(SessionError::SlotOutOfRange(peer));
        }
        if self.peers.contains_key(&peer) {
            return Err(SessionError::SlotTaken(peer));
        }
        tracing::info!(%peer, address = %entry.address, "peer joined");
        self.peers.insert(peer, entry);
        Ok(())
    }

    /// Removes a peer and returns its entry.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the slot is empty.
    pub fn leave(&mut self, peer: PeerId) -> Result<PeerEntry, SessionError> {
        let entry = self
            .peers
            .remove(&peer)
            .ok_or(SessionError::NotFound(peer))?;
        tracing::info!(%peer, "peer left");
        Ok(entry)
    }

    /// Changes a peer's team.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the slot is empty.
    pub fn set_team(
        &mut self,
        peer: PeerId,
        team: Option<TeamIndex>,
    ) -> Result<(), SessionError> {
        let entry = self
            .peers
            .get_mut(&peer)
            .ok_or(SessionError::NotFound(peer))?;
        entry.team = team;
        Ok(())
    }

    /// The entry for a slot.
    pub fn entry(&self, peer: PeerId) -> Option<&PeerEntry> {
        self.peers.get(&peer)
    }

    /// Number of connected peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl SessionDirectory for Membership {
    fn is_established(&self) -> bool {
        self.established
    }

    fn has_teams(&self) -> bool {
        self.teams
    }

    fn peers(&self) -> PeerSet {
        self.peers.keys().copied().collect()
    }

    fn local_peer(&self) -> PeerId {
        self.local
    }

    fn host_peer(&self) -> PeerId {
        self.host
    }

    fn peer_team(&self, peer: PeerId) -> Option<TeamIndex> {
        if !self.teams {
            return None;
        }
        self.peers.get(&peer).and_then(|e| e.team)
    }

    fn peer_player(&self, peer: PeerId) -> Option<&PlayerIdentity> {
        self.peers.get(&peer).and_then(|e| e.player.as_ref())
    }

    fn peer_address(&self, peer: PeerId) -> Option<Ipv4Addr> {
        self.peers.get(&peer).map(|e| e.address)
    }
}

#[cfg(test)]
mod tests {
    use hostchat_protocol::PlayerUid;

    use super::*;

    fn peer(slot: u8) -> PeerId {
        PeerId::new(slot)
    }

    fn entry(name: &str, last_octet: u8) -> PeerEntry {
        PeerEntry::new(
            PlayerIdentity::new(name, PlayerUid(u64::from(last_octet))),
            Ipv4Addr::new(10, 0, 0, last_octet),
        )
    }

    // =====================================================================
    // join() / leave()
    // =====================================================================

    #[test]
    fn test_join_adds_peer_to_directory() {
        let mut m = Membership::new(peer(0), peer(0));
        m.join(peer(0), entry("host", 1)).unwrap();
        m.join(peer(3), entry("guest", 2)).unwrap();

        let peers: Vec<_> = m.peers().iter().collect();
        assert_eq!(peers, vec![peer(0), peer(3)]);
        assert_eq!(m.peer_player(peer(3)).unwrap().name, "guest");
        assert_eq!(m.peer_address(peer(3)), Some(Ipv4Addr::new(10, 0, 0, 2)));
    }

    #[test]
    fn test_join_rejects_occupied_slot() {
        let mut m = Membership::new(peer(0), peer(0));
        m.join(peer(1), entry("a", 1)).unwrap();

        let result = m.join(peer(1), entry("b", 2));

        assert!(matches!(result, Err(SessionError::SlotTaken(p)) if p == peer(1)));
        assert_eq!(m.peer_player(peer(1)).unwrap().name, "a");
    }

    #[test]
    fn test_join_rejects_slot_beyond_peer_set_capacity() {
        let mut m = Membership::new(peer(0), peer(0));
        let result = m.join(peer(PeerSet::CAPACITY as u8), entry("far", 1));
        assert!(matches!(result, Err(SessionError::SlotOutOfRange(_))));
    }

    #[test]
    fn test_leave_unknown_peer_fails() {
        let mut m = Membership::new(peer(0), peer(0));
        assert!(matches!(m.leave(peer(5)), Err(SessionError::NotFound(_))));
    }

    #[test]
    fn test_leave_removes_lookups() {
        let mut m = Membership::new(peer(0), peer(0));
        m.join(peer(2), entry("gone", 9)).unwrap();

        m.leave(peer(2)).unwrap();

        assert!(m.is_empty());
        assert!(m.peer_player(peer(2)).is_none());
        assert!(m.peer_address(peer(2)).is_none());
    }

    // =====================================================================
    // Teams and host
    // =====================================================================

    #[test]
    fn test_peer_team_hidden_when_teams_disabled() {
        let mut m = Membership::new(peer(0), peer(0));
        m.join(peer(1), entry("red", 1).with_team(TeamIndex(0))).unwrap();

        assert_eq!(m.peer_team(peer(1)), None);
        m.set_teams(true);
        assert_eq!(m.peer_team(peer(1)), Some(TeamIndex(0)));
    }

    #[test]
    fn test_set_team_changes_assignment() {
        let mut m = Membership::new(peer(0), peer(0));
        m.set_teams(true);
        m.join(peer(1), entry("swap", 1)).unwrap();

        m.set_team(peer(1), Some(TeamIndex(1))).unwrap();

        assert_eq!(m.peer_team(peer(1)), Some(TeamIndex(1)));
        assert!(m.set_team(peer(7), None).is_err());
    }

    #[test]
    fn test_is_host_follows_host_slot() {
        let mut m = Membership::new(peer(1), peer(0));
        assert!(!m.is_host());
        m.set_host(peer(1));
        assert!(m.is_host());
    }

    #[test]
    fn test_peer_without_player_has_no_identity() {
        let mut m = Membership::new(peer(0), peer(0));
        let pending = PeerEntry {
            player: None,
            address: Ipv4Addr::LOCALHOST,
            team: None,
        };
        m.join(peer(4), pending).unwrap();

        assert!(m.peers().contains(peer(4)));
        assert!(m.peer_player(peer(4)).is_none());
    }
}
