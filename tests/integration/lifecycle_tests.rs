//! Boot, shutdown, and factory-reset lifecycle flows.

use pulsepair::app::events::AppEvent;
use pulsepair::app::ports::StoragePort;
use pulsepair::app::service::{DEVICE_STATE_KEY, STORAGE_NAMESPACE};
use pulsepair::app::TickOutcome;
use pulsepair::drivers::button::ButtonIntent;
use pulsepair::protocol::context::PowerDownReason;
use pulsepair::protocol::state::{PairingState, Role};

use crate::mock_ports::{ferry, Unit, FOLLOWER_ADDR, LEADER_ADDR};

const TICK_MS: u32 = 250;

fn paired_leader() -> Unit {
    let mut leader = Unit::fresh(Role::Leader, LEADER_ADDR);
    let mut follower = Unit::fresh(Role::Follower, FOLLOWER_ADDR);
    leader.tick(TICK_MS);
    follower.tick(TICK_MS);
    ferry(&mut leader, &follower);
    follower.tick(TICK_MS * 2);
    ferry(&mut follower, &leader);
    leader.tick(TICK_MS * 2);
    assert_eq!(leader.service.state(), PairingState::PairedSynced);
    leader
}

#[test]
fn fresh_boot_auto_starts_pairing() {
    let mut unit = Unit::fresh(Role::Follower, FOLLOWER_ADDR);
    assert_eq!(unit.service.state(), PairingState::Blank);
    unit.tick(TICK_MS);
    assert_eq!(unit.service.state(), PairingState::Pairing);
    assert!(unit
        .sink
        .events
        .contains(&AppEvent::StateChanged {
            from: PairingState::Blank,
            to: PairingState::Pairing,
        }));
}

#[test]
fn short_press_while_synced_shuts_down_cleanly() {
    let mut leader = paired_leader();
    let outcome = leader.tick_with(TICK_MS * 3, ButtonIntent::Short);
    assert_eq!(outcome, TickOutcome::PowerDown(PowerDownReason::UserShutdown));
    // Outputs must be dead on the way out.
    assert!(!leader.outputs.vibration);
    assert!(!leader.outputs.led);
    // And the stable form was written.
    let reboot = Unit::with_storage(Role::Leader, LEADER_ADDR, leader.storage);
    assert_eq!(reboot.service.state(), PairingState::PairedNotSynced);
}

#[test]
fn factory_reset_survives_the_power_cycle() {
    let mut leader = paired_leader();
    let outcome = leader.tick_with(TICK_MS * 3, ButtonIntent::VeryLong);
    assert_eq!(outcome, TickOutcome::PowerDown(PowerDownReason::FactoryReset));
    assert!(leader.sink.events.contains(&AppEvent::FactoryReset));
    assert!(leader.display.messages.iter().any(|(m, _)| m.contains("reset")));

    let reboot = Unit::with_storage(Role::Leader, LEADER_ADDR, leader.storage);
    assert_eq!(reboot.service.state(), PairingState::Blank);
    assert!(reboot.service.device().partner.is_empty());
}

#[test]
fn long_press_reenters_pairing_from_syncing() {
    let mut leader = paired_leader();
    // Simulate a lost partner: power cycle into Syncing.
    let mut leader = {
        leader.tick_with(TICK_MS * 3, ButtonIntent::Short);
        Unit::with_storage(Role::Leader, LEADER_ADDR, leader.storage)
    };
    leader.tick(TICK_MS); // -> Syncing

    // The user decides to pair with a replacement unit instead.
    leader.tick_with(TICK_MS * 2, ButtonIntent::Long);
    assert_eq!(leader.service.state(), PairingState::Pairing);
    assert!(leader.service.device().partner.is_empty());
}

#[test]
fn corrupted_record_boots_blank() {
    let mut leader = paired_leader();
    leader.tick_with(TICK_MS * 3, ButtonIntent::Short);
    let mut nvs = leader.storage;
    nvs.write(STORAGE_NAMESPACE, DEVICE_STATE_KEY, &[0xDE, 0xAD, 0xBE])
        .unwrap();

    let reboot = Unit::with_storage(Role::Leader, LEADER_ADDR, nvs);
    assert_eq!(reboot.service.state(), PairingState::Blank);
}

#[test]
fn started_event_reports_resumed_state() {
    let mut leader = paired_leader();
    leader.tick_with(TICK_MS * 3, ButtonIntent::Short);
    let reboot = Unit::with_storage(Role::Leader, LEADER_ADDR, leader.storage);
    assert_eq!(
        reboot.sink.events[0],
        AppEvent::Started(PairingState::PairedNotSynced)
    );
}
