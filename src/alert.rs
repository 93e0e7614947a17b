//! Alternating alert scheduler.
//!
//! Once a pair is synced, the two units divide time into 1-second slots
//! measured from each unit's own sync instant. The leader vibrates in even
//! slots and the follower in odd slots, so exactly one unit is active at
//! any moment. Because each unit anchors the slot count at its own receipt
//! of the sync handshake, the two clocks agree to within one radio
//! round-trip — well under the slot width.

use crate::protocol::state::DeviceState;

/// Whether the vibration output should be on at `now_ms`.
///
/// Always `false` unless the device is synced and buzzing is enabled.
pub fn vibration_on(device: &DeviceState, now_ms: u32, alert_period_ms: u32) -> bool {
    if !device.buzz_enabled || !device.is_synced {
        return false;
    }
    let elapsed = now_ms.wrapping_sub(device.time_offset_ms);
    let slot_parity = (elapsed / alert_period_ms) & 1 == 1;
    slot_parity ^ device.role.is_leader()
}

/// Whether the status LED should be lit. Mirrors the vibration slot so the
/// user can see the cadence with the motor muted.
pub fn led_on(device: &DeviceState, now_ms: u32, alert_period_ms: u32) -> bool {
    if !device.led_enabled || !device.is_synced {
        return false;
    }
    let elapsed = now_ms.wrapping_sub(device.time_offset_ms);
    let slot_parity = (elapsed / alert_period_ms) & 1 == 1;
    slot_parity ^ device.role.is_leader()
}
