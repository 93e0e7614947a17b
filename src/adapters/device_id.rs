//! Device identity derived from the ESP32 factory MAC address.
//!
//! The 6-byte MAC doubles as the ESP-NOW address the partner stores, so
//! identity and routing are the same value. The short, human-readable form
//! `PP-XXYYZZ` (last 3 bytes in uppercase hex) is what the display and the
//! boot banner show.

use crate::protocol::state::DeviceIdentity;

/// Fixed-size device ID string: "PP-XXYYZZ".
pub type DeviceIdString = heapless::String<16>;

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> DeviceIdentity {
    let mut mac: DeviceIdentity = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> DeviceIdentity {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive the short device ID from the last 3 MAC bytes.
/// Format: `PP-XXYYZZ` (e.g., `PP-EFCAFE`).
pub fn device_id(mac: &DeviceIdentity) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    use core::fmt::Write;
    let _ = write!(id, "PP-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}
