//! Integration tests for the in-memory transport.

use std::error::Error;
use std::io;

use hostchat_transport::{MemoryTransport, PeerId, Transport, TransportError};

#[test]
fn test_register_packet_assigns_distinct_kinds() {
    let mut transport = MemoryTransport::new();

    let chat = transport.register_packet("chat").expect("first registration");
    let voice = transport.register_packet("voice").expect("second registration");

    assert_ne!(chat, voice);
    assert_eq!(transport.packet_kind("chat"), Some(chat));
    assert_eq!(transport.packet_kind("missing"), None);
}

#[test]
fn test_register_packet_rejects_duplicate_name() {
    let mut transport = MemoryTransport::new();
    transport.register_packet("chat").unwrap();

    let err = transport.register_packet("chat").unwrap_err();

    assert!(matches!(err, TransportError::DuplicatePacket("chat")));
}

#[test]
fn test_send_records_packets_in_order() {
    let mut transport = MemoryTransport::new();
    let kind = transport.register_packet("chat").unwrap();

    transport.send(PeerId::new(2), kind, b"first").unwrap();
    transport.send(PeerId::new(1), kind, b"second").unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].peer, PeerId::new(2));
    assert_eq!(sent[0].payload, b"first");
    assert_eq!(sent[1].peer, PeerId::new(1));
}

#[test]
fn test_send_with_unregistered_kind_fails() {
    let mut transport = MemoryTransport::new();
    let bogus = hostchat_transport::PacketKind::new(9);

    let err = transport.send(PeerId::new(1), bogus, b"x").unwrap_err();

    assert!(matches!(err, TransportError::UnknownPacket(9)));
    assert!(transport.sent().is_empty());
}

#[test]
fn test_unreachable_peer_fails_until_restored() {
    let mut transport = MemoryTransport::new();
    let kind = transport.register_packet("chat").unwrap();
    transport.set_unreachable(PeerId::new(3));

    let err = transport.send(PeerId::new(3), kind, b"x").unwrap_err();
    assert!(matches!(err, TransportError::Unreachable(p) if p == PeerId::new(3)));

    transport.set_reachable(PeerId::new(3));
    transport.send(PeerId::new(3), kind, b"x").unwrap();
    assert_eq!(transport.drain().len(), 1);
    assert!(transport.sent().is_empty());
}

#[test]
fn test_broken_peer_reports_send_failure_with_source() {
    let mut transport = MemoryTransport::new();
    let kind = transport.register_packet("chat").unwrap();
    transport.set_broken(PeerId::new(2), io::ErrorKind::ConnectionReset);

    let err = transport.send(PeerId::new(2), kind, b"x").unwrap_err();

    match &err {
        TransportError::SendFailed { peer, source } => {
            assert_eq!(*peer, PeerId::new(2));
            assert_eq!(source.kind(), io::ErrorKind::ConnectionReset);
        }
        other => panic!("expected SendFailed, got {other:?}"),
    }
    assert!(err.source().is_some());
    assert!(err.to_string().contains("peer-2"));
    assert!(transport.sent().is_empty());

    transport.set_reachable(PeerId::new(2));
    transport.send(PeerId::new(2), kind, b"x").unwrap();
    assert_eq!(transport.sent().len(), 1);
}
