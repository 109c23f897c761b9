//! Integration tests for the flood controller state machine.

use std::net::Ipv4Addr;

use hostchat_flood::{ClientSpamStats, FloodController, FloodPolicy, FloodVerdict};
use hostchat_protocol::MessageBody;

// =========================================================================
// Helpers
// =========================================================================

const ALICE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const BOB: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

/// Every message scores 5, so two messages reach the threshold of 10.
fn policy() -> FloodPolicy {
    FloodPolicy {
        short_score: 5,
        long_score: 5,
        timeout_score: 10,
        timeout_seconds: 10,
        timeout_reset_seconds: 30,
    }
}

fn body() -> MessageBody {
    MessageBody::new("spam")
}

fn advance(flood: &mut FloodController, seconds: u32) {
    for _ in 0..seconds {
        flood.advance_second();
    }
}

/// Sends messages until one is rejected; returns the rejection.
fn burst(flood: &mut FloodController, address: Ipv4Addr) -> u32 {
    for _ in 0..100 {
        if let FloodVerdict::Rejected { remaining_secs } =
            flood.evaluate(address, &body(), &policy())
        {
            return remaining_secs;
        }
    }
    panic!("burst never triggered a timeout");
}

// =========================================================================
// Evaluation
// =========================================================================

#[test]
fn test_first_message_creates_record_and_is_accepted() {
    let mut flood = FloodController::new();
    assert!(flood.is_empty());

    let verdict = flood.evaluate(ALICE, &body(), &policy());

    assert_eq!(verdict, FloodVerdict::Accept);
    assert_eq!(flood.stats(ALICE).unwrap().spam_score, 5);
    assert_eq!(flood.len(), 1);
}

#[test]
fn test_message_reaching_threshold_is_itself_rejected() {
    let mut flood = FloodController::new();
    flood.evaluate(ALICE, &body(), &policy());

    let verdict = flood.evaluate(ALICE, &body(), &policy());

    assert_eq!(verdict, FloodVerdict::Rejected { remaining_secs: 10 });
    let stats = flood.stats(ALICE).unwrap();
    assert_eq!(stats.timeout_seconds, 10);
    assert_eq!(stats.next_timeout_seconds, 10);
    assert_eq!(stats.timeout_reset_seconds, 30);
}

#[test]
fn test_rejection_during_timeout_does_not_add_score() {
    let mut flood = FloodController::new();
    burst(&mut flood, ALICE);
    let score = flood.stats(ALICE).unwrap().spam_score;
    advance(&mut flood, 3);

    let verdict = flood.evaluate(ALICE, &body(), &policy());

    assert_eq!(verdict, FloodVerdict::Rejected { remaining_secs: 7 });
    assert_eq!(flood.stats(ALICE).unwrap().spam_score, score - 3);
}

#[test]
fn test_addresses_are_tracked_independently() {
    let mut flood = FloodController::new();
    burst(&mut flood, ALICE);

    let verdict = flood.evaluate(BOB, &body(), &policy());

    assert_eq!(verdict, FloodVerdict::Accept);
    assert_eq!(flood.len(), 2);
}

#[test]
fn test_policy_changes_apply_on_next_evaluation() {
    let mut flood = FloodController::new();
    let strict = FloodPolicy {
        timeout_score: 5,
        ..policy()
    };

    assert_eq!(
        flood.evaluate(ALICE, &body(), &strict),
        FloodVerdict::Rejected { remaining_secs: 10 }
    );
}

// =========================================================================
// Decay
// =========================================================================

#[test]
fn test_score_decays_one_per_second() {
    let mut flood = FloodController::new();
    flood.insert(
        ALICE,
        ClientSpamStats {
            spam_score: 7,
            ..ClientSpamStats::default()
        },
    );

    advance(&mut flood, 3);
    assert_eq!(flood.stats(ALICE).unwrap().spam_score, 4);

    advance(&mut flood, 3);
    assert_eq!(flood.stats(ALICE).unwrap().spam_score, 1);
}

#[test]
fn test_timeout_expires_and_address_may_chat_again() {
    let mut flood = FloodController::new();
    burst(&mut flood, ALICE);

    advance(&mut flood, 10);

    assert_eq!(flood.stats(ALICE).unwrap().timeout_seconds, 0);
    assert_eq!(flood.evaluate(ALICE, &body(), &policy()), FloodVerdict::Accept);
}

// =========================================================================
// Escalation
// =========================================================================

#[test]
fn test_repeat_offence_inside_window_doubles_timeout() {
    let mut flood = FloodController::new();
    assert_eq!(burst(&mut flood, ALICE), 10);
    advance(&mut flood, 10);

    assert_eq!(burst(&mut flood, ALICE), 20);
    advance(&mut flood, 20);

    assert_eq!(burst(&mut flood, ALICE), 40);
}

#[test]
fn test_escalation_resets_after_window_elapses() {
    let mut flood = FloodController::new();
    assert_eq!(burst(&mut flood, ALICE), 10);
    // Serve the timeout, then the whole reset window.
    advance(&mut flood, 10 + 30);

    assert!(flood.stats(ALICE).is_none(), "record should have been dropped");
    assert_eq!(burst(&mut flood, ALICE), 10);
}

#[test]
fn test_reset_window_does_not_run_during_timeout() {
    let mut flood = FloodController::new();
    burst(&mut flood, ALICE);

    advance(&mut flood, 9);

    let stats = flood.stats(ALICE).unwrap();
    assert_eq!(stats.timeout_seconds, 1);
    assert_eq!(stats.timeout_reset_seconds, 30);
}

// =========================================================================
// Garbage collection
// =========================================================================

#[test]
fn test_all_zero_record_removed_on_next_pass() {
    let mut flood = FloodController::new();
    flood.insert(ALICE, ClientSpamStats::default());
    assert_eq!(flood.len(), 1);

    flood.advance_second();

    assert!(flood.is_empty());
}

#[test]
fn test_record_with_live_counter_survives_pass() {
    let live = [
        ClientSpamStats {
            spam_score: 5,
            ..ClientSpamStats::default()
        },
        ClientSpamStats {
            timeout_seconds: 5,
            ..ClientSpamStats::default()
        },
        ClientSpamStats {
            timeout_reset_seconds: 5,
            next_timeout_seconds: 10,
            ..ClientSpamStats::default()
        },
    ];

    for stats in live {
        let mut flood = FloodController::new();
        flood.insert(ALICE, stats);
        flood.advance_second();
        assert_eq!(flood.len(), 1, "{stats:?} should survive one pass");
    }
}
