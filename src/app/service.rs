//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the protocol engine and its context. Each control
//! tick it feeds the engine this tick's inputs (button intent, mailbox
//! message, clock), drains the engine's action queue into port calls, and
//! drives the alternating alert outputs. All I/O flows through port traits
//! injected at call sites, so the whole pairing protocol is testable with
//! mock adapters.
//!
//! ```text
//!  Mailbox ───▶ ┌───────────────────────────┐ ──▶ TransportPort
//!  Button  ───▶ │        AppService          │ ──▶ StoragePort
//!  Clock   ───▶ │  Engine · Alerts · Persist │ ──▶ DisplayPort / OutputPort
//!               └───────────────────────────┘ ──▶ EventSink
//! ```

use log::{info, warn};

use crate::alert;
use crate::config::SystemConfig;
use crate::drivers::button::ButtonIntent;
use crate::protocol::context::{Action, EngineContext, PowerDownReason};
use crate::protocol::message::{self, InboundMessage};
use crate::protocol::state::{self, DeviceIdentity, DeviceState, PairingState, Role};
use crate::protocol::states::build_state_table;
use crate::protocol::Engine;

use super::events::AppEvent;
use super::ports::{DisplayPort, EventSink, OutputPort, StoragePort, TransportPort};

// ───────────────────────────────────────────────────────────────
// Storage layout
// ───────────────────────────────────────────────────────────────

/// NVS namespace shared by all persisted records.
pub const STORAGE_NAMESPACE: &str = "pulsepair";

/// Key holding the reduced device-state record.
pub const DEVICE_STATE_KEY: &str = "devstate";

/// Key holding the serialized [`SystemConfig`].
pub const CONFIG_KEY: &str = "syscfg";

/// Result of one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep looping.
    Running,
    /// The engine requested power-down; the caller must stop ticking and
    /// enter deep sleep.
    PowerDown(PowerDownReason),
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    engine: Engine,
    ctx: EngineContext,
}

impl AppService {
    /// Construct the service around a (possibly resumed) device state.
    ///
    /// Does **not** run the initial state's entry logic — call [`start`]
    /// next.
    ///
    /// [`start`]: Self::start
    pub fn new(config: SystemConfig, own_addr: DeviceIdentity, device: DeviceState) -> Self {
        debug_assert!(device.invariants_hold());
        let initial = device.pairing_state;
        let ctx = EngineContext::new(config, own_addr, device);
        let engine = Engine::new(build_state_table(), initial);
        Self { engine, ctx }
    }

    /// Load the persisted device state, falling back to a blank state for
    /// `role` on first boot or when the record is unreadable.
    pub fn load_device_state(storage: &impl StoragePort, role: Role) -> DeviceState {
        let mut buf = [0u8; 64];
        match storage.read(STORAGE_NAMESPACE, DEVICE_STATE_KEY, &mut buf) {
            Ok(len) => match state::decode_record(&buf[..len], role) {
                Ok(device) => {
                    info!("resuming persisted state: {:?}", device.pairing_state);
                    device
                }
                Err(err) => {
                    warn!("persisted state unusable ({err}), starting blank");
                    DeviceState::blank(role)
                }
            },
            Err(err) => {
                info!("no persisted state ({err}), starting blank");
                DeviceState::blank(role)
            }
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run the initial state's entry logic. Any actions it queues are
    /// applied on the first [`tick`](Self::tick).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.engine.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.engine.current_state()));
        info!("service started in {:?}", self.engine.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: feed inputs → engine tick → apply
    /// actions → drive alert outputs.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        now_ms: u32,
        intent: ButtonIntent,
        inbound: Option<InboundMessage>,
        transport: &mut impl TransportPort,
        storage: &mut impl StoragePort,
        display: &mut impl DisplayPort,
        outputs: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        self.ctx.now_ms = now_ms;
        self.ctx.intent = intent;
        self.ctx.inbox = inbound;

        let prev_state = self.engine.current_state();
        self.engine.tick(&mut self.ctx);
        let new_state = self.engine.current_state();

        let outcome = self.apply_actions(transport, storage, display, outputs, sink);

        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
            if new_state == PairingState::PairedSynced {
                if let Some(partner) = self.ctx.device.partner.get() {
                    if prev_state == PairingState::Pairing {
                        sink.emit(&AppEvent::PairingComplete { partner });
                    }
                    sink.emit(&AppEvent::SyncEstablished {
                        offset_ms: self.ctx.device.time_offset_ms,
                    });
                }
            }
        }

        match outcome {
            TickOutcome::Running => {
                let cfg = &self.ctx.config;
                let device = &self.ctx.device;
                outputs.set_vibration(alert::vibration_on(device, now_ms, cfg.alert_period_ms));
                outputs.set_led(alert::led_on(device, now_ms, cfg.alert_period_ms));
            }
            TickOutcome::PowerDown(_) => outputs.all_off(),
        }

        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current protocol state.
    pub fn state(&self) -> PairingState {
        self.engine.current_state()
    }

    /// The live device aggregate.
    pub fn device(&self) -> &DeviceState {
        &self.ctx.device
    }

    // ── Internal ──────────────────────────────────────────────

    /// Drain the engine's action queue into port calls, in queue order.
    fn apply_actions(
        &mut self,
        transport: &mut impl TransportPort,
        storage: &mut impl StoragePort,
        display: &mut impl DisplayPort,
        outputs: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::Running;

        for action in self.ctx.actions.iter().copied() {
            match action {
                Action::Send { dest, kind } => {
                    let frame = message::encode(kind);
                    if let Err(err) = transport.send(dest, &frame) {
                        // The retry timer covers the loss.
                        warn!("send {} failed: {err}", kind.name());
                    }
                }
                Action::Persist => {
                    // A state that reduces to Blank is stored as absence:
                    // the record is erased, not overwritten.
                    let stable = state::to_stable(&self.ctx.device);
                    let result = if stable.pairing_state == PairingState::Blank {
                        storage.delete(STORAGE_NAMESPACE, DEVICE_STATE_KEY)
                    } else {
                        let bytes = state::encode_stable(&self.ctx.device);
                        storage.write(STORAGE_NAMESPACE, DEVICE_STATE_KEY, &bytes)
                    };
                    if let Err(err) = result {
                        warn!("persist failed: {err}");
                    }
                }
                Action::ShowStatus => display.show_status(&self.ctx.device),
                Action::ShowMessage(text) => {
                    display.show_message(text, self.ctx.config.show_message_ms);
                }
                Action::ShowWarning(text) => display.show_warning(text),
                Action::RadioOff => transport.power_off(),
                Action::PowerDown(reason) => {
                    if reason == PowerDownReason::FactoryReset {
                        sink.emit(&AppEvent::FactoryReset);
                    }
                    sink.emit(&AppEvent::PoweringDown(reason));
                    outputs.all_off();
                    outcome = TickOutcome::PowerDown(reason);
                }
            }
        }
        self.ctx.actions.clear();

        outcome
    }
}
