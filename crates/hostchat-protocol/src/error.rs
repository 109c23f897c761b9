//! Error types for the protocol layer.
//!
//! Every variant means the same thing to the relay: the packet is
//! malformed and gets discarded without a response.

/// Errors that can occur while decoding a chat packet.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The kind discriminant is outside `[0, ChatKind::COUNT)`.
    ///
    /// Checked before any kind-dependent field is read.
    #[error("invalid message kind {0}")]
    InvalidKind(u64),

    /// The stream ended before a field could be read.
    #[error("truncated stream: needed {needed} bits, {remaining} left")]
    Truncated { needed: u32, remaining: usize },

    /// A text field declared a length above its bound.
    #[error("text field of {len} bytes exceeds maximum of {max}")]
    TextTooLong { len: usize, max: usize },

    /// A text field is not valid UTF-8.
    #[error("text field is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A text field contains a NUL byte.
    #[error("text field contains a NUL byte")]
    EmbeddedNul,
}
