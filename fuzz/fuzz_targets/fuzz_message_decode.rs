//! Fuzz target: wire-frame decoding.
//!
//! Drives arbitrary byte sequences into `message::decode` and asserts it
//! never panics and that every accepted frame re-encodes byte-identically.
//!
//! cargo fuzz run fuzz_message_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use pulsepair::protocol::message;

fuzz_target!(|data: &[u8]| {
    if let Ok(kind) = message::decode(data) {
        assert_eq!(&message::encode(kind)[..], data, "decode must be the inverse of encode");
    }
});
