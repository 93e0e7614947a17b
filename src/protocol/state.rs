//! Device identity, role, pairing state, and the persisted-state reduction.
//!
//! `DeviceState` is the persisted+live aggregate the protocol engine
//! mutates. It is created once at boot (loaded from NVS or defaulted to
//! blank) and written back only through [`to_stable`], which maps any
//! in-flight protocol state to the nearest state that is safe to resume
//! from after deep sleep.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Fixed-width hardware address (the ESP32 factory MAC). Used both as this
/// device's own identity and to identify a partner or sender.
pub type DeviceIdentity = [u8; 6];

/// ESP-NOW broadcast sentinel.
pub const BROADCAST_ADDR: DeviceIdentity = [0xFF; 6];

/// All-zero sentinel meaning "no partner known".
pub const EMPTY_ADDR: DeviceIdentity = [0x00; 6];

/// Optional partner identity. All-zero means no partner is known.
///
/// Set only by successful pairing, cleared only by factory reset (or by a
/// long press abandoning a sync attempt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerRef(DeviceIdentity);

impl PartnerRef {
    pub const EMPTY: Self = Self(EMPTY_ADDR);

    pub fn new(addr: DeviceIdentity) -> Self {
        Self(addr)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == EMPTY_ADDR
    }

    /// The partner address, or `None` when no partner is known.
    pub fn get(&self) -> Option<DeviceIdentity> {
        if self.is_empty() { None } else { Some(self.0) }
    }

    pub fn set(&mut self, addr: DeviceIdentity) {
        self.0 = addr;
    }

    pub fn clear(&mut self) {
        self.0 = EMPTY_ADDR;
    }

    /// True when `addr` equals the stored partner (empty never matches).
    pub fn matches(&self, addr: DeviceIdentity) -> bool {
        !self.is_empty() && self.0 == addr
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Fixed asymmetric protocol role. The leader initiates pairing and sync
/// requests; the follower only validates and echoes. Set at provisioning
/// time in [`SystemConfig`](crate::config::SystemConfig), never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Leader,
    Follower,
}

impl Role {
    pub fn is_leader(self) -> bool {
        matches!(self, Self::Leader)
    }
}

// ---------------------------------------------------------------------------
// Pairing state
// ---------------------------------------------------------------------------

/// Enumeration of all protocol states.
/// Must stay in sync with the state table built in
/// [`states::build_state_table`](super::states::build_state_table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PairingState {
    /// No partner known, nothing in flight.
    Blank = 0,
    /// Discovering a partner (transient).
    Pairing = 1,
    /// Partner known, no time reference this power cycle.
    PairedNotSynced = 2,
    /// Re-establishing the time reference (transient).
    Syncing = 3,
    /// Partner known and time reference shared (transient across sleep).
    PairedSynced = 4,
}

impl PairingState {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 5;

    /// Convert a `u8` index back to `PairingState`. Panics on out-of-range
    /// in debug builds; returns `Blank` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Blank,
            1 => Self::Pairing,
            2 => Self::PairedNotSynced,
            3 => Self::Syncing,
            4 => Self::PairedSynced,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Blank
            }
        }
    }

    /// States that are safe to persist and resume from. Transient states
    /// (`Pairing`, `Syncing`, `PairedSynced`) are never directly resumed.
    pub fn is_stable(self) -> bool {
        matches!(self, Self::Blank | Self::PairedNotSynced)
    }
}

// ---------------------------------------------------------------------------
// DeviceState
// ---------------------------------------------------------------------------

/// The persisted+live protocol aggregate, mutated exclusively by the engine.
///
/// Invariants:
/// - `is_synced == true` implies `pairing_state == PairedSynced`.
/// - `partner` is non-empty whenever `pairing_state` is
///   `PairedNotSynced`, `Syncing`, or `PairedSynced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub pairing_state: PairingState,
    pub partner: PartnerRef,
    pub role: Role,
    /// True only while a valid time reference exists in this power cycle.
    /// Always false immediately after load from persistence.
    pub is_synced: bool,
    pub buzz_enabled: bool,
    pub led_enabled: bool,
    /// Monotonic reference point (ms since boot) defining phase zero for
    /// the alternation parity.
    pub time_offset_ms: u32,
}

impl DeviceState {
    /// Fresh factory-state device.
    pub fn blank(role: Role) -> Self {
        Self {
            pairing_state: PairingState::Blank,
            partner: PartnerRef::EMPTY,
            role,
            is_synced: false,
            buzz_enabled: true,
            led_enabled: true,
            time_offset_ms: 0,
        }
    }

    /// Whether the state invariants hold (used by tests and debug asserts).
    pub fn invariants_hold(&self) -> bool {
        if self.is_synced && self.pairing_state != PairingState::PairedSynced {
            return false;
        }
        let needs_partner = matches!(
            self.pairing_state,
            PairingState::PairedNotSynced | PairingState::Syncing | PairingState::PairedSynced
        );
        !(needs_partner && self.partner.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Persistence reduction
// ---------------------------------------------------------------------------

/// Map the live (possibly transient) state to the nearest stable state.
///
/// Applied immediately before every flash write; never mutates the live
/// state. A resume from sleep must not assume a prior synchronization is
/// still valid, and must not resume mid-protocol: it resumes only into
/// "start fresh" (`Blank`) or "resync" (`PairedNotSynced`).
pub fn to_stable(state: &DeviceState) -> DeviceState {
    let mut stable = *state;
    stable.pairing_state = match state.pairing_state {
        PairingState::Blank | PairingState::Pairing => PairingState::Blank,
        PairingState::PairedNotSynced | PairingState::Syncing | PairingState::PairedSynced => {
            PairingState::PairedNotSynced
        }
    };
    if stable.pairing_state == PairingState::Blank {
        stable.partner.clear();
    }
    stable.is_synced = false;
    stable.time_offset_ms = 0;
    stable
}

// ---------------------------------------------------------------------------
// Persisted record codec
// ---------------------------------------------------------------------------

/// On-flash record version. Bump on layout changes; unknown versions load
/// as "no prior state".
pub const RECORD_VERSION: u8 = 1;

/// The serialized subset of `DeviceState`. Role is configuration, not
/// device state; `is_synced` and `time_offset_ms` are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedRecord {
    version: u8,
    pairing_state: u8,
    partner: DeviceIdentity,
    buzz_enabled: bool,
    led_enabled: bool,
}

/// Serialize the reduced form of `state` for storage.
pub fn encode_stable(state: &DeviceState) -> Vec<u8> {
    let stable = to_stable(state);
    let record = PersistedRecord {
        version: RECORD_VERSION,
        pairing_state: stable.pairing_state as u8,
        partner: stable.partner.get().unwrap_or(EMPTY_ADDR),
        buzz_enabled: stable.buzz_enabled,
        led_enabled: stable.led_enabled,
    };
    // Serializing a Copy record of primitives cannot fail.
    postcard::to_allocvec(&record).unwrap_or_default()
}

/// Decode a persisted record back into a boot-time `DeviceState`.
///
/// Corruption, an unknown version, a transient stored state, or a paired
/// record with an empty partner all degrade to "no prior state".
pub fn decode_record(bytes: &[u8], role: Role) -> Result<DeviceState, StorageError> {
    let record: PersistedRecord =
        postcard::from_bytes(bytes).map_err(|_| StorageError::Corrupted)?;
    if record.version != RECORD_VERSION {
        return Err(StorageError::Corrupted);
    }
    let pairing_state = match record.pairing_state {
        0 => PairingState::Blank,
        2 => PairingState::PairedNotSynced,
        _ => return Err(StorageError::Corrupted),
    };
    let partner = PartnerRef::new(record.partner);
    if pairing_state == PairingState::PairedNotSynced && partner.is_empty() {
        return Err(StorageError::Corrupted);
    }
    Ok(DeviceState {
        pairing_state,
        partner,
        role,
        is_synced: false,
        buzz_enabled: record.buzz_enabled,
        led_enabled: record.led_enabled,
        time_offset_ms: 0,
    })
}
