//! Chat handlers: screening outbound broadcasts and receiving delivered
//! messages.
//!
//! Handlers are registered once, typically at startup, and consulted in
//! registration order. Registration is additive; there is no removal.

use std::sync::Arc;

use hostchat_protocol::{ChatMessage, PeerId, PeerSet};

/// What a handler decided about a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerVerdict {
    /// Let the broadcast go ahead.
    Continue,
    /// Cancel the broadcast. Nobody receives the message.
    Veto,
}

/// An observer of chat traffic on this endpoint.
///
/// Both methods have no-op defaults, so an implementation overrides only
/// the side it cares about. Handlers are shared (`Arc`) and must be
/// `Send + Sync` so a relay can move between threads.
pub trait ChatHandler: Send + Sync {
    /// Called on the host before a message is fanned out.
    ///
    /// `sender` is the slot that originated the message and `recipients`
    /// the resolved destination set. Returning [`HandlerVerdict::Veto`]
    /// cancels the whole broadcast.
    fn on_send(
        &self,
        _sender: PeerId,
        _message: &ChatMessage,
        _recipients: PeerSet,
    ) -> HandlerVerdict {
        HandlerVerdict::Continue
    }

    /// Called when a message is delivered to this endpoint.
    fn on_receive(&self, _message: &ChatMessage) {}
}

/// Ordered list of registered handlers.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn ChatHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler. The same handler may be registered twice, in
    /// which case it is consulted twice.
    pub fn register(&mut self, handler: Arc<dyn ChatHandler>) {
        self.handlers.push(handler);
    }

    /// Asks each handler in order whether the broadcast may proceed.
    ///
    /// Stops at the first veto; later handlers are not consulted.
    pub fn screen(
        &self,
        sender: PeerId,
        message: &ChatMessage,
        recipients: PeerSet,
    ) -> HandlerVerdict {
        for (index, handler) in self.handlers.iter().enumerate() {
            if handler.on_send(sender, message, recipients) == HandlerVerdict::Veto {
                tracing::debug!(%sender, handler = index, "broadcast vetoed");
                return HandlerVerdict::Veto;
            }
        }
        HandlerVerdict::Continue
    }

    /// Hands a delivered message to every handler in order.
    pub fn deliver(&self, message: &ChatMessage) {
        for handler in &self.handlers {
            handler.on_receive(message);
        }
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
