//! ESP-NOW datagram transport adapter.
//!
//! Implements [`TransportPort`] over the connectionless ESP-NOW protocol.
//! The radio receive callback runs on the WiFi task: it validates the
//! frame, pairs it with the sender MAC the stack delivers out of band, and
//! deposits the result in the shared [`Mailbox`]. Malformed frames are
//! dropped at this boundary, so the protocol engine only ever sees decoded
//! messages.
//!
//! The host build records transmitted frames in memory, which the
//! integration tests use to ferry datagrams between two simulated units.

use std::sync::Arc;

use log::{debug, info};

use crate::app::ports::TransportPort;
use crate::error::TransportError;
use crate::mailbox::Mailbox;
use crate::protocol::message::{self, InboundMessage};
use crate::protocol::state::{DeviceIdentity, BROADCAST_ADDR};

pub struct EspNowTransport {
    #[cfg(target_os = "espidf")]
    driver: Option<esp_idf_svc::espnow::EspNow<'static>>,
    #[cfg(not(target_os = "espidf"))]
    mailbox: Arc<Mailbox>,
    /// Host build: frames handed to the radio, oldest first.
    #[cfg(not(target_os = "espidf"))]
    pub sent: Vec<(DeviceIdentity, Vec<u8>)>,
    #[cfg(not(target_os = "espidf"))]
    powered_off: bool,
}

impl EspNowTransport {
    /// Bring up ESP-NOW and register the receive path into `mailbox`.
    /// The WiFi driver must already be started in station mode.
    #[cfg(target_os = "espidf")]
    pub fn new(mailbox: Arc<Mailbox>) -> Result<Self, TransportError> {
        use esp_idf_svc::espnow::{EspNow, PeerInfo};

        let driver = EspNow::take().map_err(|_| TransportError::InitFailed)?;

        driver
            .register_recv_cb(move |mac: &[u8], data: &[u8]| {
                dispatch_frame(&mailbox, mac, data);
            })
            .map_err(|_| TransportError::InitFailed)?;

        let peer = PeerInfo {
            peer_addr: BROADCAST_ADDR,
            channel: 0,
            encrypt: false,
            ..Default::default()
        };
        driver
            .add_peer(peer)
            .map_err(|_| TransportError::PeerAddFailed)?;

        info!("EspNowTransport: radio up, broadcast peer registered");
        Ok(Self {
            driver: Some(driver),
        })
    }

    /// Simulation backend: transmitted frames accumulate in `sent`.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(mailbox: Arc<Mailbox>) -> Result<Self, TransportError> {
        info!("EspNowTransport: simulation backend");
        Ok(Self {
            mailbox,
            sent: Vec::new(),
            powered_off: false,
        })
    }

    /// Host-side receive injection: what the radio callback does on device.
    #[cfg(not(target_os = "espidf"))]
    pub fn inject(&self, sender: DeviceIdentity, payload: &[u8]) {
        dispatch_frame(&self.mailbox, &sender, payload);
    }

    #[cfg(target_os = "espidf")]
    fn ensure_peer(&self, addr: DeviceIdentity) -> Result<(), TransportError> {
        use esp_idf_svc::espnow::PeerInfo;

        let Some(driver) = self.driver.as_ref() else {
            return Err(TransportError::RadioOff);
        };
        let known = driver
            .peer_exists(addr)
            .map_err(|_| TransportError::PeerAddFailed)?;
        if !known {
            let peer = PeerInfo {
                peer_addr: addr,
                channel: 0,
                encrypt: false,
                ..Default::default()
            };
            driver
                .add_peer(peer)
                .map_err(|_| TransportError::PeerAddFailed)?;
            debug!("EspNowTransport: added peer {:02X?}", addr);
        }
        Ok(())
    }
}

/// Validate one received frame and deposit it in the mailbox.
fn dispatch_frame(mailbox: &Mailbox, mac: &[u8], data: &[u8]) {
    let Ok(sender) = DeviceIdentity::try_from(mac) else {
        debug!("dropping frame with {}-byte sender address", mac.len());
        return;
    };
    match message::decode(data) {
        Ok(kind) => {
            mailbox.try_put(InboundMessage { kind, sender });
        }
        Err(err) => {
            debug!("dropping malformed frame from {:02X?}: {err}", sender);
        }
    }
}

impl TransportPort for EspNowTransport {
    #[cfg(target_os = "espidf")]
    fn send(&mut self, dest: DeviceIdentity, payload: &[u8]) -> Result<(), TransportError> {
        self.ensure_peer(dest)?;
        let Some(driver) = self.driver.as_ref() else {
            return Err(TransportError::RadioOff);
        };
        driver
            .send(dest, payload)
            .map_err(|_| TransportError::SendFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn send(&mut self, dest: DeviceIdentity, payload: &[u8]) -> Result<(), TransportError> {
        if self.powered_off {
            return Err(TransportError::RadioOff);
        }
        self.sent.push((dest, payload.to_vec()));
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn power_off(&mut self) {
        // Dropping the driver deinitialises ESP-NOW; the modem itself is
        // stopped so deep sleep draws minimum current.
        if self.driver.take().is_some() {
            unsafe {
                esp_idf_svc::sys::esp_wifi_stop();
            }
            info!("EspNowTransport: radio stopped");
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn power_off(&mut self) {
        self.powered_off = true;
    }
}
