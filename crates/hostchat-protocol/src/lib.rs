//! Wire protocol for hostchat.
//!
//! This crate defines what a chat message is and how it travels:
//!
//! - **Types** ([`ChatMessage`], [`ChatKind`], [`PeerSet`], etc.): the
//!   message variants and the audience specifier used by the relay.
//! - **Bit stream** ([`BitWriter`], [`BitReader`]): MSB-first bit
//!   packing, the primitive the wire format is built on.
//! - **Codec** ([`PacketCodec`] trait, [`ChatCodec`]): the bit-exact
//!   encoding of a `ChatMessage`, whose shape depends on the kind
//!   discriminant.
//! - **Errors** ([`ProtocolError`]): why a packet was malformed.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ChatMessage) → Relay (routing, flood policy)
//! ```

mod bitstream;
mod codec;
mod error;
mod types;

pub use bitstream::{bits_for, BitReader, BitWriter};
pub use codec::{read_message, write_message, ChatCodec, PacketCodec};
pub use error::ProtocolError;
pub use types::{
    BoundedText, ChatKind, ChatMessage, MessageBody, PeerSet, PlayerUid,
    SenderName, MAX_MESSAGE_LENGTH, MAX_SENDER_LENGTH,
};

// Peer addressing is defined by the transport; re-exported so protocol
// users don't need a direct dependency on it.
pub use hostchat_transport::PeerId;
