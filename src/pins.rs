//! GPIO pin assignments for the M5StickC-based stimulator unit.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

/// Vibration motor driver (active HIGH).
pub const VIBRATION_GPIO: i32 = 26;

/// Front button (active LOW, input-only pin with external pull-up).
/// Doubles as the ext0 deep-sleep wake source.
pub const BUTTON_GPIO: i32 = 37;

/// On-board red LED (active LOW — the pin sinks the LED current).
pub const LED_GPIO: i32 = 10;
