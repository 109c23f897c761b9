use crate::PeerId;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A packet kind with this name was already registered.
    #[error("packet kind {0:?} already registered")]
    DuplicatePacket(&'static str),

    /// The packet kind was never registered with this transport.
    #[error("unknown packet kind {0}")]
    UnknownPacket(u16),

    /// The peer has no live channel.
    #[error("{0} is not reachable")]
    Unreachable(PeerId),

    /// Sending data failed.
    #[error("send to {peer} failed: {source}")]
    SendFailed {
        peer: PeerId,
        #[source]
        source: std::io::Error,
    },
}
