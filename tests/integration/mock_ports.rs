//! Simulated unit harness for integration tests.
//!
//! A [`Unit`] bundles a full firmware stack — service, simulation
//! transport, mailbox, NVS — for one device. Tests run two units side by
//! side and [`ferry`] datagrams between them, so everything from the radio
//! boundary to the persistence reduction is exercised exactly as on
//! hardware, minus the physics.

use std::sync::Arc;

use pulsepair::adapters::espnow::EspNowTransport;
use pulsepair::adapters::nvs::NvsAdapter;
use pulsepair::app::events::AppEvent;
use pulsepair::app::ports::{DisplayPort, EventSink, OutputPort};
use pulsepair::app::{AppService, TickOutcome};
use pulsepair::config::SystemConfig;
use pulsepair::drivers::button::ButtonIntent;
use pulsepair::mailbox::Mailbox;
use pulsepair::protocol::state::{DeviceIdentity, DeviceState, Role, BROADCAST_ADDR};

pub const LEADER_ADDR: DeviceIdentity = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
pub const FOLLOWER_ADDR: DeviceIdentity = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];

// ── Recording mocks ───────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDisplay {
    /// Transient messages with their display duration in ms.
    pub messages: Vec<(String, u32)>,
    pub warnings: Vec<String>,
    pub status_draws: usize,
}

impl DisplayPort for RecordingDisplay {
    fn show_status(&mut self, _device: &DeviceState) {
        self.status_draws += 1;
    }

    fn show_message(&mut self, text: &str, duration_ms: u32) {
        self.messages.push((text.to_string(), duration_ms));
    }

    fn show_warning(&mut self, text: &str) {
        self.warnings.push(text.to_string());
    }
}

#[derive(Default)]
pub struct RecordingOutputs {
    pub vibration: bool,
    pub led: bool,
}

impl OutputPort for RecordingOutputs {
    fn set_vibration(&mut self, on: bool) {
        self.vibration = on;
    }

    fn set_led(&mut self, on: bool) {
        self.led = on;
    }

    fn all_off(&mut self) {
        self.vibration = false;
        self.led = false;
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Simulated unit ────────────────────────────────────────────

pub struct Unit {
    pub addr: DeviceIdentity,
    pub service: AppService,
    pub transport: EspNowTransport,
    pub mailbox: Arc<Mailbox>,
    pub storage: NvsAdapter,
    pub display: RecordingDisplay,
    pub outputs: RecordingOutputs,
    pub sink: RecordingSink,
}

impl Unit {
    /// Fresh unit with no persisted state (first boot).
    pub fn fresh(role: Role, addr: DeviceIdentity) -> Self {
        Self::with_storage(role, addr, NvsAdapter::new().unwrap())
    }

    /// Boot a unit against an existing storage backend, resuming whatever
    /// state a previous power cycle persisted.
    pub fn with_storage(role: Role, addr: DeviceIdentity, storage: NvsAdapter) -> Self {
        let mut config = SystemConfig::default();
        config.role = role;
        let device = AppService::load_device_state(&storage, role);
        let mailbox = Arc::new(Mailbox::new());
        let transport = EspNowTransport::new(Arc::clone(&mailbox)).unwrap();
        let mut unit = Self {
            addr,
            service: AppService::new(config, addr, device),
            transport,
            mailbox,
            storage,
            display: RecordingDisplay::default(),
            outputs: RecordingOutputs::default(),
            sink: RecordingSink::default(),
        };
        unit.service.start(&mut unit.sink);
        unit
    }

    /// One control tick with no button activity.
    pub fn tick(&mut self, now_ms: u32) -> TickOutcome {
        self.tick_with(now_ms, ButtonIntent::None)
    }

    pub fn tick_with(&mut self, now_ms: u32, intent: ButtonIntent) -> TickOutcome {
        let inbound = self.mailbox.take();
        self.service.tick(
            now_ms,
            intent,
            inbound,
            &mut self.transport,
            &mut self.storage,
            &mut self.display,
            &mut self.outputs,
            &mut self.sink,
        )
    }
}

/// Deliver every frame `from` has transmitted to `to` (unicast match or
/// broadcast), the way the radio would.
pub fn ferry(from: &mut Unit, to: &Unit) {
    let sender = from.addr;
    for (dest, frame) in from.transport.sent.drain(..) {
        if dest == to.addr || dest == BROADCAST_ADDR {
            to.transport.inject(sender, &frame);
        }
    }
}
