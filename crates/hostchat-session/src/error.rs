//! Error types for the session layer.

use hostchat_protocol::PeerId;

/// Errors that can occur while editing session membership.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No peer occupies this slot.
    #[error("{0} is not in the session")]
    NotFound(PeerId),

    /// Another peer already occupies this slot.
    #[error("{0} is already occupied")]
    SlotTaken(PeerId),

    /// The slot index can't be represented in a peer set.
    #[error("{0} is outside the session's slot range")]
    SlotOutOfRange(PeerId),
}
