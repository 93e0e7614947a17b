//! PulsePair Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single synchronous control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  EspNowTransport   NvsAdapter     ConsoleDisplay   GpioOutputs │
//! │  (TransportPort)   (Config+NVS)   (DisplayPort)    (OutputPort)│
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Protocol engine · Alert scheduler · Persistence       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Mailbox (radio callback → loop) · ButtonSampler · deep sleep  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every boot is a button wake: the boot path measures the in-progress
//! press first, then resumes the persisted protocol state and ticks the
//! engine at the control-loop rate until it requests power-down.

#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi};

use pulsepair::adapters::device_id;
use pulsepair::adapters::display::ConsoleDisplay;
use pulsepair::adapters::espnow::EspNowTransport;
use pulsepair::adapters::log_sink::LogEventSink;
use pulsepair::adapters::nvs::NvsAdapter;
use pulsepair::adapters::outputs::GpioOutputs;
use pulsepair::adapters::sleep::enter_deep_sleep;
use pulsepair::adapters::time::{delay_ms, UptimeClock};
use pulsepair::app::ports::ConfigPort;
use pulsepair::app::{AppService, TickOutcome};
use pulsepair::config::SystemConfig;
use pulsepair::drivers::button::{ButtonIntent, ButtonSampler};
use pulsepair::mailbox::Mailbox;
use pulsepair::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("PulsePair v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Storage + configuration ────────────────────────────
    let mut nvs = NvsAdapter::new()
        .map_err(|e| anyhow::anyhow!("NVS init failed: {e}"))?;
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({e}), using defaults");
            SystemConfig::default()
        }
    };

    // ── 3. Device identity ────────────────────────────────────
    let mac = device_id::read_mac();
    let dev_id = device_id::device_id(&mac);
    info!("Device ID: {} ({:?})", dev_id, config.role);

    // ── 4. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take().context("peripherals takeover")?;

    let button_pin =
        PinDriver::input(peripherals.pins.gpio37).context("button pin")?;
    let mut sampler = ButtonSampler::new(|| button_pin.is_low(), delay_ms);

    // Measure the press that woke us before anything else: a very long
    // hold must factory-reset even if the radio refuses to come up.
    let boot_intent = sampler.sample_intent(&config);
    info!("boot press: {:?}", boot_intent);
    // A short press is the power-on gesture, not a shutdown request.
    let mut pending_intent = match boot_intent {
        ButtonIntent::Short => ButtonIntent::None,
        other => other,
    };

    let mut outputs = GpioOutputs::new(
        peripherals.pins.gpio26.into(),
        peripherals.pins.gpio10.into(),
    )?;

    // ── 5. Radio: WiFi STA (idle) + ESP-NOW ───────────────────
    let sysloop = EspSystemEventLoop::take().context("system event loop")?;
    let mut wifi =
        EspWifi::new(peripherals.modem, sysloop, None).context("wifi driver")?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))
        .context("wifi configuration")?;
    wifi.start().context("wifi start")?;

    let mailbox = Arc::new(Mailbox::new());
    let mut transport = EspNowTransport::new(Arc::clone(&mailbox))?;

    // ── 6. App service ────────────────────────────────────────
    let mut display = ConsoleDisplay::new(dev_id);
    let mut sink = LogEventSink::new();
    let clock = UptimeClock::new();

    let device = AppService::load_device_state(&nvs, config.role);
    let tick_interval = config.control_loop_interval_ms;
    let mut service = AppService::new(config.clone(), mac, device);
    service.start(&mut sink);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();
        let intent = match core::mem::take(&mut pending_intent) {
            ButtonIntent::None => sampler.sample_intent(&config),
            carried => carried,
        };
        let inbound = mailbox.take();

        let outcome = service.tick(
            now_ms,
            intent,
            inbound,
            &mut transport,
            &mut nvs,
            &mut display,
            &mut outputs,
            &mut sink,
        );

        if let TickOutcome::PowerDown(reason) = outcome {
            info!("control loop finished: {:?}", reason);
            break;
        }

        delay_ms(tick_interval);
    }

    enter_deep_sleep(pins::BUTTON_GPIO);
}
