//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (radio, storage, display, outputs, event sinks) implement
//! these traits. The [`AppService`](super::service::AppService) consumes them
//! via generics, so the domain core never touches hardware directly and the
//! whole protocol runs unmodified in host tests against mocks.

use crate::config::SystemConfig;
use crate::error::{StorageError, TransportError};
use crate::protocol::state::{DeviceIdentity, DeviceState};

// ───────────────────────────────────────────────────────────────
// Transport port (domain → radio)
// ───────────────────────────────────────────────────────────────

/// Datagram transmit side. Receive is not a port: inbound frames arrive via
/// the radio callback and the [`Mailbox`](crate::mailbox::Mailbox), which
/// the main loop drains before each tick.
pub trait TransportPort {
    /// Transmit one frame to `dest` (unicast address or the broadcast
    /// address). Fire-and-forget; delivery is not confirmed.
    fn send(&mut self, dest: DeviceIdentity, payload: &[u8]) -> Result<(), TransportError>;

    /// Shut the radio down ahead of power-down. Idempotent.
    fn power_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Storage port (domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Write operations MUST be atomic — no partial records on power loss.
/// The ESP-IDF NVS API guarantees this natively; in-memory simulation
/// achieves it trivially.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting. Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Display port (domain → screen)
// ───────────────────────────────────────────────────────────────

/// User-facing status surface. Failures are cosmetic, so the methods are
/// infallible; adapters log internally if the panel is unreachable.
pub trait DisplayPort {
    /// Redraw the standing status view for the current device state.
    fn show_status(&mut self, device: &DeviceState);

    /// Show a transient informational message, held for `duration_ms`
    /// before the standing status view returns.
    fn show_message(&mut self, text: &str, duration_ms: u32);

    /// Show a transient warning (e.g. a rejected datagram).
    fn show_warning(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Output port (domain → vibration motor + LED)
// ───────────────────────────────────────────────────────────────

/// The two binary outputs driven by the alert scheduler.
pub trait OutputPort {
    fn set_vibration(&mut self, on: bool);

    fn set_led(&mut self, on: bool);

    /// Kill both outputs — called on every power-down path.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, a
/// test-captured `Vec`, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
