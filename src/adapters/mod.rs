//! Driven adapters: hardware and OS bindings behind the port traits.
//!
//! Every adapter has an `espidf` backend and a host simulation backend
//! selected by `cfg(target_os = "espidf")`, so the full stack runs under
//! `cargo test` on the host.

pub mod device_id;
pub mod display;
pub mod espnow;
pub mod log_sink;
pub mod nvs;
pub mod outputs;
pub mod sleep;
pub mod time;
