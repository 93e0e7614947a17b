//! End-to-end pairing flows between two simulated units.

use pulsepair::app::TickOutcome;
use pulsepair::protocol::state::{PairingState, PartnerRef, Role};

use crate::mock_ports::{ferry, Unit, FOLLOWER_ADDR, LEADER_ADDR};

const TICK_MS: u32 = 250;

fn boot_pair() -> (Unit, Unit) {
    (
        Unit::fresh(Role::Leader, LEADER_ADDR),
        Unit::fresh(Role::Follower, FOLLOWER_ADDR),
    )
}

#[test]
fn two_fresh_units_pair_within_two_ticks() {
    let (mut leader, mut follower) = boot_pair();
    let mut now = TICK_MS;

    // Tick 1: both leave Blank; the leader broadcasts its request.
    leader.tick(now);
    follower.tick(now);
    assert_eq!(leader.service.state(), PairingState::Pairing);
    assert_eq!(follower.service.state(), PairingState::Pairing);

    ferry(&mut leader, &follower);
    now += TICK_MS;
    follower.tick(now);
    assert_eq!(follower.service.state(), PairingState::PairedSynced);

    ferry(&mut follower, &leader);
    now += TICK_MS;
    leader.tick(now);
    assert_eq!(leader.service.state(), PairingState::PairedSynced);

    assert_eq!(leader.service.device().partner, PartnerRef::new(FOLLOWER_ADDR));
    assert_eq!(follower.service.device().partner, PartnerRef::new(LEADER_ADDR));
    assert!(leader.service.device().is_synced);
    assert!(follower.service.device().is_synced);
}

#[test]
fn leader_keeps_broadcasting_until_the_follower_appears() {
    let mut leader = Unit::fresh(Role::Leader, LEADER_ADDR);
    let mut now = 0;

    // Follower stays dark for 50 ticks; the leader re-broadcasts on its
    // resend schedule (entry send + ticks 20 and 40 of the pairing state).
    for _ in 0..50 {
        now += TICK_MS;
        assert_eq!(leader.tick(now), TickOutcome::Running);
    }
    assert_eq!(leader.transport.sent.len(), 3);
    assert_eq!(leader.service.state(), PairingState::Pairing);

    // Follower finally boots; the next broadcast completes the handshake.
    let mut follower = Unit::fresh(Role::Follower, FOLLOWER_ADDR);
    now += TICK_MS;
    follower.tick(now);
    for _ in 0..20 {
        now += TICK_MS;
        leader.tick(now);
        ferry(&mut leader, &follower);
        follower.tick(now);
        ferry(&mut follower, &leader);
    }
    now += TICK_MS;
    leader.tick(now);
    assert_eq!(leader.service.state(), PairingState::PairedSynced);
    assert_eq!(follower.service.state(), PairingState::PairedSynced);
}

#[test]
fn malformed_frames_never_reach_the_engine() {
    let mut leader = Unit::fresh(Role::Leader, LEADER_ADDR);
    leader.tick(TICK_MS);

    // Garbage, wrong version, unknown tag: all dropped at the radio edge.
    leader.transport.inject(FOLLOWER_ADDR, b"garbage");
    leader.transport.inject(FOLLOWER_ADDR, &[0x50, 0x50, 2, 2]);
    leader.transport.inject(FOLLOWER_ADDR, &[0x50, 0x50, 1, 9]);

    leader.tick(TICK_MS * 2);
    assert_eq!(leader.service.state(), PairingState::Pairing);
    assert!(leader.service.device().partner.is_empty());
    // Nothing was rejected by the engine — the frames never got that far.
    assert!(leader.display.warnings.is_empty());
}

#[test]
fn wrong_kind_during_pairing_is_rejected_with_a_warning() {
    let (mut leader, mut follower) = boot_pair();
    leader.tick(TICK_MS);
    follower.tick(TICK_MS);

    // The follower hears another follower's echo instead of a request.
    follower
        .transport
        .inject(LEADER_ADDR, &pulsepair::protocol::message::encode(
            pulsepair::protocol::message::MessageKind::PairEcho,
        ));
    follower.tick(TICK_MS * 2);

    assert_eq!(follower.service.state(), PairingState::Pairing);
    assert!(follower.service.device().partner.is_empty());
    assert_eq!(follower.display.warnings.len(), 1);
}

#[test]
fn pairing_timeout_powers_down_blank() {
    let mut leader = Unit::fresh(Role::Leader, LEADER_ADDR);
    let mut now = 0;

    now += TICK_MS;
    leader.tick(now); // Blank -> Pairing

    let timeout = 600;
    let mut outcome = TickOutcome::Running;
    for _ in 0..=timeout {
        now += TICK_MS;
        outcome = leader.tick(now);
        if outcome != TickOutcome::Running {
            break;
        }
    }
    assert!(matches!(outcome, TickOutcome::PowerDown(_)));
    assert_eq!(leader.service.state(), PairingState::Blank);
    assert!(leader.display.messages.iter().any(|(m, _)| m.contains("Pairing")));

    // The next boot starts blank again.
    let reboot = Unit::with_storage(Role::Leader, LEADER_ADDR, leader.storage);
    assert_eq!(reboot.service.state(), PairingState::Blank);
}
