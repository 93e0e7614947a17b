//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, capture in a test, etc.

use crate::protocol::context::PowerDownReason;
use crate::protocol::state::{DeviceIdentity, PairingState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the resumed or initial state).
    Started(PairingState),

    /// The protocol engine transitioned between states.
    StateChanged {
        from: PairingState,
        to: PairingState,
    },

    /// Pairing handshake completed; the partner address is now bound.
    PairingComplete { partner: DeviceIdentity },

    /// Synchronization (re-)established; carries the local slot-zero anchor.
    SyncEstablished { offset_ms: u32 },

    /// The stored partner binding was erased by a factory reset.
    FactoryReset,

    /// The device is about to enter deep sleep.
    PoweringDown(PowerDownReason),
}
