//! Three endpoints of one session chatting over in-memory transports.
//!
//! Alice hosts, Bob and Carol are clients. Bob floods the lobby, gets timed
//! out, waits it out, and apologises. Run with `RUST_LOG=debug` to watch
//! the relay's decisions.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use hostchat::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Session setup
// ---------------------------------------------------------------------------

const ALICE: PeerId = PeerId::new(0);
const BOB: PeerId = PeerId::new(1);
const CAROL: PeerId = PeerId::new(2);

const CONFIG: &str = r#"{
    "flood_timeout_score": 10,
    "flood_timeout_seconds": 3,
    "flood_timeout_reset_seconds": 10
}"#;

type Relay = ChatRelay<Membership, MemoryTransport>;

fn membership(local: PeerId) -> Result<Membership, ChatError> {
    let mut session = Membership::new(local, ALICE);
    for (peer, name, uid) in [(ALICE, "Alice", 0xa1), (BOB, "Bob", 0xb0b), (CAROL, "Carol", 0xca)] {
        let address = Ipv4Addr::new(192, 168, 1, 10 + peer.index());
        session.join(peer, PeerEntry::new(PlayerIdentity::new(name, PlayerUid(uid)), address))?;
    }
    session.set_established(true);
    Ok(session)
}

/// Prints what an endpoint's player would see in their chat box.
struct ChatBox {
    owner: &'static str,
}

impl ChatHandler for ChatBox {
    fn on_receive(&self, message: &ChatMessage) {
        let from = message.sender().map_or("*server*", |name| name.as_str());
        println!("[{:>5}] {from}: {}", self.owner, message.body());
    }
}

fn endpoint(local: PeerId, owner: &'static str, config: &ChatConfig) -> Result<Relay, ChatError> {
    let mut relay = ChatRelay::new(membership(local)?, MemoryTransport::new(), config.clone())?;
    relay.register_handler(Arc::new(ChatBox { owner }));
    Ok(relay)
}

// ---------------------------------------------------------------------------
// Network simulation
// ---------------------------------------------------------------------------

/// Moves queued packets between endpoints until every outbox is empty.
/// Endpoint `i` owns slot `i`.
fn pump(relays: &mut [Relay]) {
    loop {
        let mut in_flight = Vec::new();
        for (slot, relay) in relays.iter_mut().enumerate() {
            let from = PeerId::new(slot as u8);
            in_flight.extend(relay.transport_mut().drain().into_iter().map(|p| (from, p)));
        }
        if in_flight.is_empty() {
            return;
        }

        for (from, packet) in in_flight {
            let Some(relay) = relays.get_mut(packet.peer.index() as usize) else {
                tracing::warn!(%from, to = %packet.peer, "packet for unknown endpoint");
                continue;
            };
            match relay.receive_packet(from, &packet.payload) {
                Ok(delivery) => tracing::debug!(%from, to = %packet.peer, ?delivery, "packet handled"),
                Err(e) => tracing::warn!(%from, to = %packet.peer, error = %e, "packet rejected"),
            }
        }
    }
}

/// What happens on a given tick.
fn script(relays: &mut [Relay], tick: u64) -> Result<(), ChatError> {
    let [alice, bob, carol] = relays else {
        return Ok(());
    };

    match tick {
        1 => {
            alice.send_global("welcome to the lobby")?;
        }
        2 => {
            carol.send_global("hi all")?;
        }
        3..=8 => {
            bob.send_global("BUY CHEAP GOLD at totally-legit.example")?;
        }
        24 => {
            bob.send_global("sorry about that")?;
        }
        26 => {
            alice.send_server("server restarting in 5 seconds", PeerSet::all())?;
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ChatError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let mut config = ChatConfig::from_json(CONFIG)?;
    config.chat_log_path = std::env::temp_dir().join("hostchat-lan-chat.log");
    tracing::info!(path = %config.chat_log_path.display(), "chat log");

    let mut relays = vec![
        endpoint(ALICE, "Alice", &config)?,
        endpoint(BOB, "Bob", &config)?,
        endpoint(CAROL, "Carol", &config)?,
    ];

    let mut scheduler = TickScheduler::with_interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
            info = scheduler.wait_for_tick() => {
                for relay in &mut relays {
                    relay.tick(info.elapsed_ms());
                }
                script(&mut relays, info.tick)?;
                pump(&mut relays);
                if info.tick >= 28 {
                    break;
                }
            }
        }
    }

    tracing::info!(flood_records = relays[0].flood().len(), "demo finished");
    Ok(())
}
