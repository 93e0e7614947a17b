//! Single-slot mailbox between the radio receive callback and the control
//! loop.
//!
//! The ESP-NOW receive callback runs on the WiFi task, the control loop on
//! the main task. Exactly one datagram is buffered; a second arrival while
//! the slot is full is dropped (load shedding — the protocol's retry timers
//! make every message re-sendable, so the freshest undelivered message is
//! the only one worth keeping around).

use std::sync::Mutex;

use log::debug;

use crate::protocol::message::InboundMessage;

/// Single-slot, drop-on-full message buffer. All methods are non-blocking
/// apart from the uncontended mutex acquisition.
pub struct Mailbox {
    slot: Mutex<Option<InboundMessage>>,
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Deposit a message. Returns `false` (and drops `msg`) if the slot is
    /// already occupied. Called from the receive callback.
    pub fn try_put(&self, msg: InboundMessage) -> bool {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.is_some() {
            debug!("mailbox full, dropping {} from {:02X?}", msg.kind.name(), msg.sender);
            return false;
        }
        *slot = Some(msg);
        true
    }

    /// Remove and return the buffered message, if any. Called once per
    /// control tick.
    pub fn take(&self) -> Option<InboundMessage> {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.take()
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
