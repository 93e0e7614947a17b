//! Vibration motor and status LED adapter.
//!
//! Implements [`OutputPort`] over two GPIO lines. The motor driver is
//! active-high; the on-board LED is active-low (sinks through the pin).
//! Host builds hold plain booleans so tests can observe the alert cadence.

use log::info;

use crate::app::ports::OutputPort;

#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

pub struct GpioOutputs {
    #[cfg(target_os = "espidf")]
    vibration: PinDriver<'static, AnyOutputPin, Output>,
    #[cfg(target_os = "espidf")]
    led: PinDriver<'static, AnyOutputPin, Output>,
    #[cfg(not(target_os = "espidf"))]
    pub vibration: bool,
    #[cfg(not(target_os = "espidf"))]
    pub led: bool,
}

impl GpioOutputs {
    #[cfg(target_os = "espidf")]
    pub fn new(
        vibration_pin: AnyOutputPin,
        led_pin: AnyOutputPin,
    ) -> Result<Self, crate::error::Error> {
        let vibration = PinDriver::output(vibration_pin)
            .map_err(|_| crate::error::Error::Init("vibration pin"))?;
        let mut led =
            PinDriver::output(led_pin).map_err(|_| crate::error::Error::Init("led pin"))?;
        // Active-low LED: park it off.
        led.set_high()
            .map_err(|_| crate::error::Error::Init("led pin"))?;
        info!("GpioOutputs: motor and LED pins configured");
        Ok(Self { vibration, led })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, crate::error::Error> {
        info!("GpioOutputs: simulation backend");
        Ok(Self {
            vibration: false,
            led: false,
        })
    }
}

impl OutputPort for GpioOutputs {
    #[cfg(target_os = "espidf")]
    fn set_vibration(&mut self, on: bool) {
        let _ = if on {
            self.vibration.set_high()
        } else {
            self.vibration.set_low()
        };
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_vibration(&mut self, on: bool) {
        self.vibration = on;
    }

    #[cfg(target_os = "espidf")]
    fn set_led(&mut self, on: bool) {
        // Sinking driver: low = lit.
        let _ = if on {
            self.led.set_low()
        } else {
            self.led.set_high()
        };
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_led(&mut self, on: bool) {
        self.led = on;
    }

    fn all_off(&mut self) {
        self.set_vibration(false);
        self.set_led(false);
    }
}
