//! Unified error types for the chat relay.

use hostchat_protocol::{PeerId, ProtocolError};
use hostchat_session::SessionError;
use hostchat_transport::TransportError;

/// Why a submission could not be routed.
///
/// A routing failure drops the message before anything is logged,
/// counted, or sent.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The submitting slot is not a connected peer.
    #[error("{0} is not a connected peer")]
    InvalidPeer(PeerId),

    /// The peer has no player to take a sender name from.
    #[error("{0} has no player identity")]
    UnknownPlayer(PeerId),

    /// Empty messages are never broadcast.
    #[error("message body is empty")]
    EmptyBody,

    /// A client claimed to send a server notice.
    #[error("{0} tried to send a server message")]
    ServerImpersonation(PeerId),

    /// Whisper delivery is not implemented.
    #[error("whisper messages cannot be routed")]
    WhisperUnsupported,

    /// A team message in a session without teams.
    #[error("session has no teams")]
    NoTeams,

    /// A team message from a peer without a team.
    #[error("{0} is not on a team")]
    UnknownTeam(PeerId),
}

/// Errors loading a [`ChatConfig`](crate::ChatConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON didn't parse or had wrongly typed fields.
    #[error("invalid chat config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapping variant auto-generates `From`
/// impls, so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// There is no established session to chat in.
    #[error("no established session")]
    NoSession,

    /// The operation is reserved for the host.
    #[error("only the session host can do this")]
    NotHost,

    /// The message was dropped by routing rules.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A send failed during fan-out. Peers before it kept the message.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An inbound packet was malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A membership edit failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_route_error() {
        let err: ChatError = RouteError::EmptyBody.into();
        assert!(matches!(err, ChatError::Route(RouteError::EmptyBody)));
        assert_eq!(err.to_string(), "message body is empty");
    }

    #[test]
    fn test_from_transport_error() {
        let err: ChatError = TransportError::Unreachable(PeerId::new(2)).into();
        assert!(matches!(err, ChatError::Transport(_)));
        assert!(err.to_string().contains("peer-2"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: ChatError = ProtocolError::InvalidKind(6).into();
        assert!(matches!(err, ChatError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err: ChatError = SessionError::NotFound(PeerId::new(1)).into();
        assert!(matches!(err, ChatError::Session(_)));
    }
}
