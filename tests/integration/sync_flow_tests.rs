//! Re-synchronization flows across simulated power cycles.

use pulsepair::app::TickOutcome;
use pulsepair::drivers::button::ButtonIntent;
use pulsepair::protocol::context::PowerDownReason;
use pulsepair::protocol::state::{PairingState, PartnerRef, Role};

use crate::mock_ports::{ferry, Unit, FOLLOWER_ADDR, LEADER_ADDR};

const TICK_MS: u32 = 250;

/// Pair two fresh units, then power both down with a short press.
/// Returns the surviving storage backends.
fn pair_and_power_down() -> (pulsepair::adapters::nvs::NvsAdapter, pulsepair::adapters::nvs::NvsAdapter) {
    let mut leader = Unit::fresh(Role::Leader, LEADER_ADDR);
    let mut follower = Unit::fresh(Role::Follower, FOLLOWER_ADDR);

    leader.tick(TICK_MS);
    follower.tick(TICK_MS);
    ferry(&mut leader, &follower);
    follower.tick(TICK_MS * 2);
    ferry(&mut follower, &leader);
    leader.tick(TICK_MS * 2);
    assert_eq!(leader.service.state(), PairingState::PairedSynced);
    assert_eq!(follower.service.state(), PairingState::PairedSynced);

    assert_eq!(
        leader.tick_with(TICK_MS * 3, ButtonIntent::Short),
        TickOutcome::PowerDown(PowerDownReason::UserShutdown)
    );
    assert_eq!(
        follower.tick_with(TICK_MS * 3, ButtonIntent::Short),
        TickOutcome::PowerDown(PowerDownReason::UserShutdown)
    );

    (leader.storage, follower.storage)
}

#[test]
fn power_cycle_resumes_paired_and_resyncs() {
    let (leader_nvs, follower_nvs) = pair_and_power_down();

    let mut leader = Unit::with_storage(Role::Leader, LEADER_ADDR, leader_nvs);
    let mut follower = Unit::with_storage(Role::Follower, FOLLOWER_ADDR, follower_nvs);

    // Both resume the stable paired state, not the synced one.
    assert_eq!(leader.service.state(), PairingState::PairedNotSynced);
    assert_eq!(follower.service.state(), PairingState::PairedNotSynced);
    assert!(!leader.service.device().is_synced);

    // Tick 1: both advance to Syncing; the leader unicasts its request.
    leader.tick(TICK_MS);
    follower.tick(TICK_MS);
    assert_eq!(leader.service.state(), PairingState::Syncing);
    assert_eq!(follower.service.state(), PairingState::Syncing);

    ferry(&mut leader, &follower);
    follower.tick(TICK_MS * 2);
    assert_eq!(follower.service.state(), PairingState::PairedSynced);

    ferry(&mut follower, &leader);
    leader.tick(TICK_MS * 2);
    assert_eq!(leader.service.state(), PairingState::PairedSynced);

    // The partner binding survived the power cycle.
    assert_eq!(leader.service.device().partner, PartnerRef::new(FOLLOWER_ADDR));
    assert_eq!(follower.service.device().partner, PartnerRef::new(LEADER_ADDR));
}

#[test]
fn resynced_pair_alternates_outputs() {
    let (leader_nvs, follower_nvs) = pair_and_power_down();
    let mut leader = Unit::with_storage(Role::Leader, LEADER_ADDR, leader_nvs);
    let mut follower = Unit::with_storage(Role::Follower, FOLLOWER_ADDR, follower_nvs);

    leader.tick(TICK_MS);
    follower.tick(TICK_MS);
    ferry(&mut leader, &follower);
    follower.tick(TICK_MS * 2);
    ferry(&mut follower, &leader);
    leader.tick(TICK_MS * 2);

    // Both anchored their slot clock at the same simulated instant, so the
    // outputs are complementary at every subsequent tick.
    for step in 3..64 {
        let now = TICK_MS * step;
        leader.tick(now);
        follower.tick(now);
        assert_ne!(
            leader.outputs.vibration, follower.outputs.vibration,
            "at {now} ms"
        );
        assert_ne!(leader.outputs.led, follower.outputs.led, "at {now} ms");
    }
}

#[test]
fn sync_timeout_powers_down_but_keeps_the_partner() {
    let (leader_nvs, _follower_nvs) = pair_and_power_down();
    let mut leader = Unit::with_storage(Role::Leader, LEADER_ADDR, leader_nvs);

    // The follower never comes back. The leader re-sends, then gives up.
    let mut now = 0;
    let mut outcome = TickOutcome::Running;
    for _ in 0..1300 {
        now += TICK_MS;
        outcome = leader.tick(now);
        if outcome != TickOutcome::Running {
            break;
        }
    }
    assert_eq!(outcome, TickOutcome::PowerDown(PowerDownReason::SyncTimeout));
    assert_eq!(leader.service.state(), PairingState::PairedNotSynced);

    // A later boot still knows the partner and tries again.
    let reboot = Unit::with_storage(Role::Leader, LEADER_ADDR, leader.storage);
    assert_eq!(reboot.service.state(), PairingState::PairedNotSynced);
    assert_eq!(reboot.service.device().partner, PartnerRef::new(FOLLOWER_ADDR));
}

#[test]
fn stranger_cannot_hijack_a_sync() {
    let (leader_nvs, _follower_nvs) = pair_and_power_down();
    let mut leader = Unit::with_storage(Role::Leader, LEADER_ADDR, leader_nvs);

    leader.tick(TICK_MS); // -> Syncing

    // An unknown device replays a perfectly valid SyncEcho.
    let stranger = [0x66, 0x06, 0x66, 0x06, 0x66, 0x06];
    leader.transport.inject(
        stranger,
        &pulsepair::protocol::message::encode(pulsepair::protocol::message::MessageKind::SyncEcho),
    );
    leader.tick(TICK_MS * 2);

    assert_eq!(leader.service.state(), PairingState::Syncing);
    assert!(!leader.service.device().is_synced);
    assert_eq!(leader.service.device().partner, PartnerRef::new(FOLLOWER_ADDR));
    assert_eq!(leader.display.warnings.len(), 1);
}
