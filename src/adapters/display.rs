//! Status display adapter.
//!
//! Implements [`DisplayPort`] by rendering the standing status view and
//! transient messages to the serial console. The port boundary keeps the
//! domain unaware of the rendering target, so an LCD-backed adapter can
//! replace this one without touching the protocol core.

use log::{info, warn};

use crate::app::ports::DisplayPort;
use crate::protocol::state::DeviceState;

pub struct ConsoleDisplay {
    device_id: crate::adapters::device_id::DeviceIdString,
}

impl ConsoleDisplay {
    pub fn new(device_id: crate::adapters::device_id::DeviceIdString) -> Self {
        Self { device_id }
    }
}

impl DisplayPort for ConsoleDisplay {
    fn show_status(&mut self, device: &DeviceState) {
        let partner = match device.partner.get() {
            Some(addr) => format!("{:02X}{:02X}{:02X}", addr[3], addr[4], addr[5]),
            None => "----".to_string(),
        };
        info!(
            "STATUS | {} | {:?} {:?} | partner={} | synced={} buzz={} led={}",
            self.device_id.as_str(),
            device.role,
            device.pairing_state,
            partner,
            device.is_synced,
            device.buzz_enabled,
            device.led_enabled,
        );
    }

    fn show_message(&mut self, text: &str, duration_ms: u32) {
        info!("MSG    | {text} (held {duration_ms} ms)");
    }

    fn show_warning(&mut self, text: &str) {
        warn!("WARN   | {text}");
    }
}
