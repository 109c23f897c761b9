//! Codec trait and the chat message wire codec.
//!
//! The chat packet is a discriminated union, not a fixed record. In order:
//!
//! ```text
//! kind     unsigned, bits_for(COUNT) = 3 bits, must be < COUNT
//! body     length-prefixed text (8-bit length, max 128 bytes)
//! sender   length-prefixed text (6-bit length, max 32 bytes)  -- not for Server
//! target   64 bits                                             -- Whisper only
//! ```
//!
//! The kind is validated before any other field is read, so a bad
//! discriminant never causes the rest of the packet to be interpreted.

use crate::{
    bits_for, BitReader, BitWriter, BoundedText, ChatKind, ChatMessage,
    PlayerUid, ProtocolError,
};

/// A codec for one named packet kind.
///
/// The relay registers [`PacketCodec::PACKET_NAME`] with its transport
/// and runs every inbound payload of that kind through [`decode`]. Packets
/// that fail to decode are discarded.
///
/// [`decode`]: PacketCodec::decode
pub trait PacketCodec {
    /// The decoded message type.
    type Message;

    /// Name the packet kind is registered under.
    const PACKET_NAME: &'static str;

    /// Encodes a message. Message types are bounded, so this can't fail.
    fn encode(&self, message: &Self::Message) -> Vec<u8>;

    /// Decodes a packet payload.
    ///
    /// # Errors
    /// Returns [`ProtocolError`] if the payload is malformed.
    fn decode(&self, data: &[u8]) -> Result<Self::Message, ProtocolError>;
}

// ---------------------------------------------------------------------------
// ChatCodec
// ---------------------------------------------------------------------------

/// The [`PacketCodec`] for [`ChatMessage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatCodec;

impl PacketCodec for ChatCodec {
    type Message = ChatMessage;

    const PACKET_NAME: &'static str = "hostchat-text-chat";

    fn encode(&self, message: &ChatMessage) -> Vec<u8> {
        let mut writer = BitWriter::new();
        write_message(&mut writer, message);
        writer.finish()
    }

    fn decode(&self, data: &[u8]) -> Result<ChatMessage, ProtocolError> {
        read_message(&mut BitReader::new(data))
    }
}

fn kind_bits() -> u32 {
    bits_for(u64::from(ChatKind::COUNT))
}

fn kind_from_raw(raw: u64) -> Result<ChatKind, ProtocolError> {
    u32::try_from(raw)
        .ok()
        .and_then(ChatKind::from_ordinal)
        .ok_or(ProtocolError::InvalidKind(raw))
}

/// Writes `message` to a bit stream.
pub fn write_message(writer: &mut BitWriter, message: &ChatMessage) {
    writer.write_bits(u64::from(message.kind().ordinal()), kind_bits());
    write_text(writer, message.body());
    if let Some(sender) = message.sender() {
        write_text(writer, sender);
    }
    if let Some(target) = message.target() {
        writer.write_bits(target.0, 64);
    }
}

/// Reads a message from a bit stream.
///
/// # Errors
/// - [`ProtocolError::InvalidKind`]: discriminant `>= ChatKind::COUNT`
/// - [`ProtocolError::Truncated`]: a field the kind requires is missing
/// - [`ProtocolError::TextTooLong`], [`ProtocolError::InvalidUtf8`],
///   [`ProtocolError::EmbeddedNul`]: a text field is malformed
pub fn read_message(reader: &mut BitReader<'_>) -> Result<ChatMessage, ProtocolError> {
    let kind = kind_from_raw(reader.read_bits(kind_bits())?)?;

    let body = read_text(reader)?;
    let message = match kind {
        ChatKind::Global => ChatMessage::Global {
            sender: read_text(reader)?,
            body,
        },
        ChatKind::Team => ChatMessage::Team {
            sender: read_text(reader)?,
            body,
        },
        ChatKind::Whisper => ChatMessage::Whisper {
            sender: read_text(reader)?,
            target: PlayerUid(reader.read_bits(64)?),
            body,
        },
        ChatKind::Server => ChatMessage::Server { body },
    };
    Ok(message)
}

fn write_text<const MAX: usize>(writer: &mut BitWriter, text: &BoundedText<MAX>) {
    writer.write_bits(text.len() as u64, bits_for(MAX as u64));
    writer.write_bytes(text.as_str().as_bytes());
}

fn read_text<const MAX: usize>(
    reader: &mut BitReader<'_>,
) -> Result<BoundedText<MAX>, ProtocolError> {
    let len = reader.read_bits(bits_for(MAX as u64))? as usize;
    if len > MAX {
        return Err(ProtocolError::TextTooLong { len, max: MAX });
    }
    let text = String::from_utf8(reader.read_bytes(len)?)?;
    if text.contains('\0') {
        return Err(ProtocolError::EmbeddedNul);
    }
    Ok(BoundedText::from_validated(text))
}
