//! PulsePair firmware library.
//!
//! Control firmware for a pair of battery-powered wearable vibration
//! stimulators that alternate output in lock-step over ESP-NOW. Exposes
//! the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod alert;
pub mod app;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod pins;
pub mod protocol;

// The adapters and drivers carry host simulation backends alongside the
// ESP-IDF implementations, selected by cfg attributes inside.
pub mod adapters;
pub mod drivers;
