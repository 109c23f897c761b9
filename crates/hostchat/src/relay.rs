//! `ChatRelay`: routing, flood filtering, and broadcast.
//!
//! The relay ties the layers together: session directory → protocol →
//! flood controller → handlers → transport. It is synchronous. The
//! embedding loop feeds it inbound packets and elapsed time; every call
//! completes before returning.
//!
//! On the host, a submission goes through:
//!
//! 1. validation (connected peer, non-empty body, not a forged Server kind)
//! 2. sender rewrite from the session's player identity
//! 3. destination resolution (Global, Team)
//! 4. flood filter (remote peers only, when enabled)
//! 5. chat log
//! 6. handler screening and fan-out
//!
//! A failure at steps 1 to 3 leaves no trace in the flood table or the log.

use std::net::Ipv4Addr;
use std::sync::Arc;

use hostchat_flood::{FloodController, FloodVerdict};
use hostchat_protocol::{
    ChatCodec, ChatKind, ChatMessage, PacketCodec, PeerId, PeerSet, PlayerUid, SenderName,
};
use hostchat_session::SessionDirectory;
use hostchat_tick::SecondClock;
use hostchat_transport::{PacketKind, Transport};

use crate::audit::{AuditEntry, AuditSink, FileAuditSink};
use crate::handler::{ChatHandler, HandlerRegistry, HandlerVerdict};
use crate::{ChatConfig, ChatError, RouteError};

/// What the relay did with a message that didn't fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Fanned out to this many peers, the local loopback included.
    Broadcast { recipients: usize },
    /// A handler vetoed the broadcast. Nobody received it.
    Vetoed,
    /// The sender is flood-limited. They were sent a notice instead.
    Throttled { remaining_secs: u32 },
    /// Sent to the host for validation (client side).
    Forwarded,
    /// Handed to local handlers after arriving from the host (client side).
    Delivered,
    /// Dropped without action: no session, or a client got a packet from
    /// someone other than the host.
    Ignored,
}

/// The chat relay for one endpoint of a session.
///
/// Generic over the session directory and transport so embedders can plug
/// in their own. Whether this endpoint acts as host or client is read from
/// the directory on every call.
pub struct ChatRelay<S, T> {
    session: S,
    transport: T,
    packet: PacketKind,
    codec: ChatCodec,
    config: ChatConfig,
    flood: FloodController,
    clock: SecondClock,
    handlers: HandlerRegistry,
    audit: Box<dyn AuditSink>,
}

impl<S: SessionDirectory, T: Transport> ChatRelay<S, T> {
    /// Creates a relay and registers the chat packet kind with `transport`.
    ///
    /// The chat log goes to disk through [`FileAuditSink`]; use
    /// [`with_audit_sink`](Self::with_audit_sink) to send it elsewhere.
    ///
    /// # Errors
    /// Returns [`ChatError::Transport`] if the packet name is already taken.
    pub fn new(session: S, mut transport: T, config: ChatConfig) -> Result<Self, ChatError> {
        let packet = transport.register_packet(ChatCodec::PACKET_NAME)?;
        tracing::debug!(packet = packet.id(), "chat packet registered");

        Ok(Self {
            session,
            transport,
            packet,
            codec: ChatCodec,
            config,
            flood: FloodController::new(),
            clock: SecondClock::new(),
            handlers: HandlerRegistry::new(),
            audit: Box::new(FileAuditSink),
        })
    }

    /// Replaces the chat log sink.
    pub fn with_audit_sink(mut self, sink: impl AuditSink + 'static) -> Self {
        self.audit = Box::new(sink);
        self
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Sends a message to everyone in the session.
    ///
    /// On the host this runs the full validation path with the local peer
    /// as sender. On a client it forwards the message to the host.
    ///
    /// # Errors
    /// [`ChatError::NoSession`] without an established session, otherwise
    /// whatever routing or the transport report.
    pub fn send_global(&mut self, body: &str) -> Result<Delivery, ChatError> {
        if !self.session.is_established() {
            return Err(ChatError::NoSession);
        }
        self.submit_local(ChatMessage::global(body))
    }

    /// Sends a message to the local player's team.
    ///
    /// # Errors
    /// [`ChatError::NoSession`] without an established session and
    /// [`RouteError::NoTeams`] if the session has no teams.
    pub fn send_team(&mut self, body: &str) -> Result<Delivery, ChatError> {
        if !self.session.is_established() {
            return Err(ChatError::NoSession);
        }
        if !self.session.has_teams() {
            return Err(RouteError::NoTeams.into());
        }
        self.submit_local(ChatMessage::team(body))
    }

    /// Broadcasts a server notice to `peers`. Host only.
    ///
    /// Skips sender rewriting, the flood filter and the chat log; handlers
    /// may still veto it.
    ///
    /// # Errors
    /// [`ChatError::NoSession`] or [`ChatError::NotHost`], or a transport
    /// failure during fan-out.
    pub fn send_server(&mut self, body: &str, peers: PeerSet) -> Result<Delivery, ChatError> {
        if !self.session.is_established() {
            return Err(ChatError::NoSession);
        }
        if !self.session.is_host() {
            return Err(ChatError::NotHost);
        }
        let local = self.session.local_peer();
        self.broadcast(local, &ChatMessage::server(body), peers)
    }

    /// Appends a handler. Handlers are never removed.
    pub fn register_handler(&mut self, handler: Arc<dyn ChatHandler>) {
        self.handlers.register(handler);
    }

    /// Advances the flood clock by `elapsed_ms`.
    ///
    /// Runs one flood decay step per whole second accumulated; the
    /// remainder carries over. Returns the number of steps run.
    pub fn tick(&mut self, elapsed_ms: u64) -> u64 {
        let seconds = self.clock.advance(elapsed_ms);
        for _ in 0..seconds {
            self.flood.advance_second();
        }
        seconds
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Handles a chat packet that arrived from `from`.
    ///
    /// # Errors
    /// [`ChatError::Protocol`] if the payload doesn't decode; the caller
    /// should drop it. Otherwise the same errors as [`receive`](Self::receive).
    pub fn receive_packet(&mut self, from: PeerId, payload: &[u8]) -> Result<Delivery, ChatError> {
        let message = self.codec.decode(payload).inspect_err(|e| {
            tracing::debug!(%from, error = %e, "discarding malformed chat packet");
        })?;
        self.receive(from, message)
    }

    /// Handles an already decoded message from `from`.
    ///
    /// The host validates and rebroadcasts it. A client passes it to its
    /// handlers if it came from the host and ignores it otherwise.
    pub fn receive(&mut self, from: PeerId, message: ChatMessage) -> Result<Delivery, ChatError> {
        if !self.session.is_established() {
            tracing::debug!(%from, "chat received outside a session");
            return Ok(Delivery::Ignored);
        }

        if self.session.is_host() {
            return self.host_submit(from, message);
        }

        if from == self.session.host_peer() {
            self.handlers.deliver(&message);
            Ok(Delivery::Delivered)
        } else {
            tracing::debug!(%from, "client ignoring chat from a non-host peer");
            Ok(Delivery::Ignored)
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The live configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Edits apply from the next message on.
    pub fn config_mut(&mut self) -> &mut ChatConfig {
        &mut self.config
    }

    pub fn flood(&self) -> &FloodController {
        &self.flood
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// The packet kind chat travels under.
    pub fn packet_kind(&self) -> PacketKind {
        self.packet
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn submit_local(&mut self, message: ChatMessage) -> Result<Delivery, ChatError> {
        if self.session.is_host() {
            let local = self.session.local_peer();
            return self.host_submit(local, message);
        }

        let host = self.session.host_peer();
        let payload = self.codec.encode(&message);
        self.transport.send(host, self.packet, &payload)?;
        tracing::debug!(%host, kind = %message.kind(), "chat forwarded to host");
        Ok(Delivery::Forwarded)
    }

    fn host_submit(&mut self, peer: PeerId, message: ChatMessage) -> Result<Delivery, ChatError> {
        if !self.session.peers().contains(peer) {
            return Err(RouteError::InvalidPeer(peer).into());
        }
        if message.body().is_empty() {
            return Err(RouteError::EmptyBody.into());
        }
        if message.kind() == ChatKind::Server {
            return Err(RouteError::ServerImpersonation(peer).into());
        }

        let player = self
            .session
            .peer_player(peer)
            .cloned()
            .ok_or(RouteError::UnknownPlayer(peer))?;
        let message = message.with_sender(SenderName::new(&player.name));
        let targets = self.resolve_targets(peer, &message)?;

        if peer != self.session.local_peer() && self.config.flood_filter_enabled {
            let address = self
                .session
                .peer_address(peer)
                .ok_or(RouteError::InvalidPeer(peer))?;
            let policy = self.config.flood_policy();
            if let FloodVerdict::Rejected { remaining_secs } =
                self.flood.evaluate(address, message.body(), &policy)
            {
                self.notify_throttled(peer, remaining_secs);
                return Ok(Delivery::Throttled { remaining_secs });
            }
        }

        self.write_log(peer, player.uid, &message);
        self.broadcast(peer, &message, targets)
    }

    fn resolve_targets(&self, peer: PeerId, message: &ChatMessage) -> Result<PeerSet, RouteError> {
        match message.kind() {
            ChatKind::Global => Ok(self.session.peers()),
            ChatKind::Team => self.team_of(peer),
            ChatKind::Whisper => Err(RouteError::WhisperUnsupported),
            ChatKind::Server => Err(RouteError::ServerImpersonation(peer)),
        }
    }

    fn team_of(&self, peer: PeerId) -> Result<PeerSet, RouteError> {
        if !self.session.has_teams() {
            return Err(RouteError::NoTeams);
        }
        let team = self
            .session
            .peer_team(peer)
            .ok_or(RouteError::UnknownTeam(peer))?;

        Ok(self
            .session
            .peers()
            .iter()
            .filter(|&other| self.session.peer_team(other) == Some(team))
            .collect())
    }

    fn notify_throttled(&mut self, peer: PeerId, remaining_secs: u32) {
        let notice = format!(
            "You have exceeded the server's spam limit. You can chat again in {remaining_secs} second(s)."
        );
        if let Err(e) = self.send_server(&notice, PeerSet::single(peer)) {
            tracing::warn!(%peer, error = %e, "failed to deliver flood notice");
        }
    }

    fn write_log(&mut self, peer: PeerId, uid: PlayerUid, message: &ChatMessage) {
        if !self.config.chat_log_enabled {
            return;
        }

        let sender = message.sender().map_or("", |name| name.as_str());
        let entry = AuditEntry {
            timestamp: chrono::Utc::now(),
            sender,
            uid,
            address: self
                .session
                .peer_address(peer)
                .unwrap_or(Ipv4Addr::UNSPECIFIED),
            body: message.body().as_str(),
        };

        if let Err(e) = self.audit.append(&self.config.chat_log_path, &entry) {
            tracing::debug!(path = %self.config.chat_log_path.display(), error = %e, "chat log write failed");
        }
    }

    /// Screens `message` through the handlers, then delivers it to every
    /// connected peer in `targets`, in session order.
    ///
    /// The local peer gets it in-process. The first transport error stops
    /// the fan-out; peers already sent to keep the message.
    fn broadcast(
        &mut self,
        sender: PeerId,
        message: &ChatMessage,
        targets: PeerSet,
    ) -> Result<Delivery, ChatError> {
        if self.handlers.screen(sender, message, targets) == HandlerVerdict::Veto {
            return Ok(Delivery::Vetoed);
        }

        let local = self.session.local_peer();
        let mut payload = None;
        let mut recipients = 0;

        for peer in self.session.peers().iter() {
            if !targets.contains(peer) {
                continue;
            }

            if peer == local {
                self.handlers.deliver(message);
            } else {
                let bytes = payload.get_or_insert_with(|| self.codec.encode(message));
                self.transport
                    .send(peer, self.packet, bytes)
                    .inspect_err(|e| {
                        tracing::warn!(%peer, delivered = recipients, error = %e, "chat fan-out aborted");
                    })?;
            }
            recipients += 1;
        }

        tracing::debug!(%sender, kind = %message.kind(), recipients, "chat broadcast");
        Ok(Delivery::Broadcast { recipients })
    }
}

impl<S, T> std::fmt::Debug for ChatRelay<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRelay")
            .field("packet", &self.packet)
            .field("config", &self.config)
            .field("flood_records", &self.flood.len())
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}
