//! Fuzz target: persisted-record decoding.
//!
//! A flash blob can contain anything after a partial write or a firmware
//! downgrade; decoding must never panic and must only ever produce stable,
//! invariant-respecting boot states.
//!
//! cargo fuzz run fuzz_record_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use pulsepair::protocol::state::{decode_record, Role};

fuzz_target!(|data: &[u8]| {
    for role in [Role::Leader, Role::Follower] {
        if let Ok(state) = decode_record(data, role) {
            assert!(state.invariants_hold());
            assert!(state.pairing_state.is_stable());
            assert!(!state.is_synced);
            assert_eq!(state.time_offset_ms, 0);
        }
    }
});
