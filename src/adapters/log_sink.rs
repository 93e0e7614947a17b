//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::PairingComplete { partner } => {
                info!(
                    "PAIR  | bound to {:02X}{:02X}{:02X}",
                    partner[3], partner[4], partner[5]
                );
            }
            AppEvent::SyncEstablished { offset_ms } => {
                info!("SYNC  | slot anchor at {offset_ms} ms");
            }
            AppEvent::FactoryReset => {
                info!("RESET | partner binding erased");
            }
            AppEvent::PoweringDown(reason) => {
                info!("POWER | down ({:?})", reason);
            }
        }
    }
}
