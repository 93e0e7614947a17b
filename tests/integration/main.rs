//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a protocol flow against
//! the simulation adapters. All tests run on the host (x86_64) with no
//! real hardware required.

mod lifecycle_tests;
mod mock_ports;
mod pairing_flow_tests;
mod sync_flow_tests;
