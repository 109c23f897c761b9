//! # hostchat
//!
//! Host-authoritative text chat for peer-to-peer game sessions.
//!
//! One peer, the host, receives every chat submission, rewrites the sender
//! from the session's own records, runs a per-address flood filter, logs the
//! message and rebroadcasts it to the right audience. Clients only ever
//! forward their messages to the host and display what the host sends back.
//!
//! The crate is synchronous: the embedding game loop calls
//! [`ChatRelay::receive_packet`] for inbound packets and [`ChatRelay::tick`]
//! with the elapsed time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hostchat::prelude::*;
//!
//! struct Print;
//! impl ChatHandler for Print {
//!     fn on_receive(&self, message: &ChatMessage) {
//!         println!("{}", message.body());
//!     }
//! }
//!
//! # fn run(session: Membership) -> Result<(), ChatError> {
//! let mut relay = ChatRelay::new(session, MemoryTransport::new(), ChatConfig::default())?;
//! relay.register_handler(Arc::new(Print));
//! relay.send_global("glhf")?;
//! relay.tick(250);
//! # Ok(())
//! # }
//! ```

mod audit;
mod config;
mod error;
mod handler;
mod relay;

pub use audit::{AuditEntry, AuditSink, FileAuditSink};
pub use config::ChatConfig;
pub use error::{ChatError, ConfigError, RouteError};
pub use handler::{ChatHandler, HandlerRegistry, HandlerVerdict};
pub use relay::{ChatRelay, Delivery};

pub use hostchat_flood as flood;
pub use hostchat_protocol as protocol;
pub use hostchat_session as session;
pub use hostchat_tick as tick;
pub use hostchat_transport as transport;

pub mod prelude {
    pub use crate::{
        ChatConfig, ChatError, ChatHandler, ChatRelay, Delivery, HandlerVerdict, RouteError,
    };
    pub use hostchat_protocol::{ChatKind, ChatMessage, PeerId, PeerSet, PlayerUid};
    pub use hostchat_session::{Membership, PeerEntry, PlayerIdentity, SessionDirectory, TeamIndex};
    pub use hostchat_tick::TickScheduler;
    pub use hostchat_transport::{MemoryTransport, Transport};
}
