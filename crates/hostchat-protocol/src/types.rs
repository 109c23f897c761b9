//! Core protocol types for hostchat's wire format.
//!
//! A chat message is a tagged union: which fields exist depends on the
//! kind. Server notices have no player sender, and only whispers carry a
//! target. Modelling that as an enum means the codec can't forget a
//! field or read one that isn't there.

use std::fmt;

use hostchat_transport::PeerId;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of a message body, in UTF-8 bytes.
pub const MAX_MESSAGE_LENGTH: usize = 128;

/// Maximum length of a sender display name, in UTF-8 bytes.
pub const MAX_SENDER_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// BoundedText
// ---------------------------------------------------------------------------

/// A string with at most `MAX` UTF-8 bytes and no NUL characters.
///
/// Construction never fails: the input is cut at its first NUL and then
/// truncated to `MAX` bytes on a char boundary. Decoding is stricter and
/// rejects oversized or NUL-bearing text (see [`crate::read_message`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BoundedText<const MAX: usize>(String);

/// A message body.
pub type MessageBody = BoundedText<MAX_MESSAGE_LENGTH>;

/// A sender display name.
pub type SenderName = BoundedText<MAX_SENDER_LENGTH>;

impl<const MAX: usize> BoundedText<MAX> {
    /// The byte bound for this text type.
    pub const MAX_LEN: usize = MAX;

    /// Creates bounded text, truncating at the first NUL and at `MAX` bytes.
    pub fn new(text: &str) -> Self {
        let text = match text.find('\0') {
            Some(nul) => &text[..nul],
            None => text,
        };
        let mut end = text.len().min(MAX);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Self(text[..end].to_owned())
    }

    /// Wraps already-validated text. Callers check the bound and NULs.
    pub(crate) fn from_validated(text: String) -> Self {
        debug_assert!(text.len() <= MAX && !text.contains('\0'));
        Self(text)
    }

    /// Returns the text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const MAX: usize> fmt::Display for BoundedText<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const MAX: usize> AsRef<str> for BoundedText<MAX> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<const MAX: usize> From<&str> for BoundedText<MAX> {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

// ---------------------------------------------------------------------------
// PlayerUid
// ---------------------------------------------------------------------------

/// A player's 64-bit unique id, as issued by the session directory.
///
/// Printed as 16 zero-padded hex digits, the same form the audit log uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlayerUid(pub u64);

impl fmt::Display for PlayerUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ChatKind: the wire discriminant
// ---------------------------------------------------------------------------

/// The kind of a chat message. Its ordinal is the wire discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChatKind {
    /// Sent to every peer in the session.
    Global = 0,
    /// Sent to peers on the sender's team.
    Team = 1,
    /// Addressed to one player. Routing is not supported; the kind exists
    /// so the codec stays aligned with peers that send it.
    Whisper = 2,
    /// A notice from the host. Never accepted from a client.
    Server = 3,
}

impl ChatKind {
    /// Number of valid kinds. Decoded ordinals must be below this.
    pub const COUNT: u32 = 4;

    /// Every kind, in ordinal order.
    pub const ALL: [ChatKind; 4] = [
        ChatKind::Global,
        ChatKind::Team,
        ChatKind::Whisper,
        ChatKind::Server,
    ];

    /// The wire ordinal.
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Maps a wire ordinal back to a kind. `None` if `>= COUNT`.
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "Global"),
            Self::Team => write!(f, "Team"),
            Self::Whisper => write!(f, "Whisper"),
            Self::Server => write!(f, "Server"),
        }
    }
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// A chat message, with the fields its kind defines.
///
/// The `sender` of a player message is only meaningful once the host has
/// filled it in from session membership; whatever a client puts there is
/// overwritten before the message is broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    /// A message to everyone.
    Global { sender: SenderName, body: MessageBody },

    /// A message to the sender's team.
    Team { sender: SenderName, body: MessageBody },

    /// A message to a single player.
    Whisper {
        sender: SenderName,
        target: PlayerUid,
        body: MessageBody,
    },

    /// A host notice. No player sender.
    Server { body: MessageBody },
}

impl ChatMessage {
    /// A global message with an empty sender.
    pub fn global(body: &str) -> Self {
        Self::Global {
            sender: SenderName::default(),
            body: MessageBody::new(body),
        }
    }

    /// A team message with an empty sender.
    pub fn team(body: &str) -> Self {
        Self::Team {
            sender: SenderName::default(),
            body: MessageBody::new(body),
        }
    }

    /// A whisper to `target` with an empty sender.
    pub fn whisper(target: PlayerUid, body: &str) -> Self {
        Self::Whisper {
            sender: SenderName::default(),
            target,
            body: MessageBody::new(body),
        }
    }

    /// A host notice.
    pub fn server(body: &str) -> Self {
        Self::Server {
            body: MessageBody::new(body),
        }
    }

    /// The message's kind.
    pub fn kind(&self) -> ChatKind {
        match self {
            Self::Global { .. } => ChatKind::Global,
            Self::Team { .. } => ChatKind::Team,
            Self::Whisper { .. } => ChatKind::Whisper,
            Self::Server { .. } => ChatKind::Server,
        }
    }

    /// The message body.
    pub fn body(&self) -> &MessageBody {
        match self {
            Self::Global { body, .. }
            | Self::Team { body, .. }
            | Self::Whisper { body, .. }
            | Self::Server { body } => body,
        }
    }

    /// The sender name. `None` for server notices.
    pub fn sender(&self) -> Option<&SenderName> {
        match self {
            Self::Global { sender, .. }
            | Self::Team { sender, .. }
            | Self::Whisper { sender, .. } => Some(sender),
            Self::Server { .. } => None,
        }
    }

    /// The whisper target. `None` for every other kind.
    pub fn target(&self) -> Option<PlayerUid> {
        match self {
            Self::Whisper { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Replaces the sender name. Server notices are returned unchanged.
    pub fn with_sender(mut self, name: SenderName) -> Self {
        match &mut self {
            Self::Global { sender, .. }
            | Self::Team { sender, .. }
            | Self::Whisper { sender, .. } => *sender = name,
            Self::Server { .. } => {}
        }
        self
    }
}

// ---------------------------------------------------------------------------
// PeerSet: broadcast audience
// ---------------------------------------------------------------------------

/// A fixed-capacity set of peer slots.
///
/// Used both as the destination list of a broadcast and as the audience
/// of a server notice. Iteration is in ascending slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PeerSet(u32);

impl PeerSet {
    /// Number of slots the set can hold. Slots `>= CAPACITY` are never members.
    pub const CAPACITY: usize = 32;

    /// The empty set.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Every slot.
    pub const fn all() -> Self {
        Self(u32::MAX)
    }

    /// A set containing just `peer`.
    pub fn single(peer: PeerId) -> Self {
        let mut set = Self::new();
        set.insert(peer);
        set
    }

    /// Adds `peer`. Returns `false` if the slot is out of range.
    pub fn insert(&mut self, peer: PeerId) -> bool {
        match Self::bit(peer) {
            Some(bit) => {
                self.0 |= bit;
                true
            }
            None => false,
        }
    }

    /// Removes `peer`.
    pub fn remove(&mut self, peer: PeerId) {
        if let Some(bit) = Self::bit(peer) {
            self.0 &= !bit;
        }
    }

    /// Returns `true` if `peer` is in the set.
    pub fn contains(&self, peer: PeerId) -> bool {
        Self::bit(peer).is_some_and(|bit| self.0 & bit != 0)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = PeerId> + '_ {
        let bits = self.0;
        (0..Self::CAPACITY as u8)
            .filter(move |slot| bits & (1 << slot) != 0)
            .map(PeerId::new)
    }

    fn bit(peer: PeerId) -> Option<u32> {
        let slot = peer.index() as usize;
        (slot < Self::CAPACITY).then(|| 1u32 << slot)
    }
}

impl FromIterator<PeerId> for PeerSet {
    fn from_iter<I: IntoIterator<Item = PeerId>>(iter: I) -> Self {
        let mut set = Self::new();
        for peer in iter {
            set.insert(peer);
        }
        set
    }
}

// =========================================================================
// Tests
// =========================================================================
