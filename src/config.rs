//! System configuration parameters
//!
//! All tunable parameters for a PulsePair unit. Values can be overridden
//! via NVS (non-volatile storage); the device role is fixed here at
//! provisioning time and never mutated at runtime.

use serde::{Deserialize, Serialize};

use crate::protocol::state::Role;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// Protocol role of this unit. The leader initiates pairing and
    /// re-synchronization; the follower only validates and echoes.
    pub role: Role,

    // --- Pairing ---
    /// Start pairing automatically when booting with no partner.
    /// When `false`, a blank device waits for a long button press.
    pub auto_start_pairing: bool,
    /// Resend the outstanding request every N control ticks.
    pub resend_interval_ticks: u32,
    /// Give up on pairing after N control ticks without a valid echo.
    pub pairing_timeout_ticks: u32,
    /// Give up on re-synchronization after N control ticks.
    pub syncing_timeout_ticks: u32,

    // --- Button ---
    /// Presses shorter than this (ms) classify as `Short`.
    pub short_press_max_ms: u32,
    /// Presses at least this long (ms) classify as `VeryLong`.
    pub very_long_press_min_ms: u32,
    /// Settle delay (ms) before a press sample is trusted.
    pub button_settle_ms: u32,
    /// Upper bound (ms) on the blocking press-duration sample.
    pub button_sample_ceiling_ms: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds).
    pub control_loop_interval_ms: u32,
    /// Length of one alternation half-period (milliseconds).
    pub alert_period_ms: u32,
    /// How long transient display messages stay up (milliseconds).
    pub show_message_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Identity
            role: Role::Leader,

            // Pairing
            auto_start_pairing: true,
            resend_interval_ticks: 20,
            pairing_timeout_ticks: 600,
            syncing_timeout_ticks: 1200,

            // Button
            short_press_max_ms: 3000,
            very_long_press_min_ms: 12000,
            button_settle_ms: 150,
            button_sample_ceiling_ms: 15000,

            // Timing
            control_loop_interval_ms: 250,
            alert_period_ms: 1000,
            show_message_ms: 1500,
        }
    }
}
