//! Front-button press classification.
//!
//! ## Hardware
//!
//! Active-low momentary switch on the front face, also wired as the
//! deep-sleep wake source. Because every boot is caused by this button,
//! the press that woke the device is still in progress when the firmware
//! starts: the sampler measures how long it stays held and the duration
//! is classified into an intent.
//!
//! ## Classification
//!
//! | Held for        | Intent     | Meaning                      |
//! |-----------------|------------|------------------------------|
//! | 0 ms            | `None`     | no press this tick           |
//! | < 3 s           | `Short`    | power toggle                 |
//! | 3 s .. < 12 s   | `Long`     | start / restart pairing      |
//! | >= 12 s         | `VeryLong` | factory reset                |

use log::debug;

use crate::config::SystemConfig;

/// Poll cadence while waiting for release.
const SAMPLE_INTERVAL_MS: u32 = 10;

/// User intent derived from a completed button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonIntent {
    #[default]
    None,
    Short,
    Long,
    VeryLong,
}

/// Map a measured hold duration to an intent.
pub fn classify(held_ms: u32, config: &SystemConfig) -> ButtonIntent {
    if held_ms == 0 {
        ButtonIntent::None
    } else if held_ms < config.short_press_max_ms {
        ButtonIntent::Short
    } else if held_ms < config.very_long_press_min_ms {
        ButtonIntent::Long
    } else {
        ButtonIntent::VeryLong
    }
}

/// Measures press duration by polling a level-read closure, yielding to the
/// scheduler between samples via the delay closure. The loop is bounded by
/// `button_sample_ceiling_ms`, so a stuck or shorted switch cannot hang the
/// boot path; a press still held at the ceiling classifies as `VeryLong`.
pub struct ButtonSampler<R, D>
where
    R: FnMut() -> bool,
    D: FnMut(u32),
{
    is_pressed: R,
    delay_ms: D,
}

impl<R, D> ButtonSampler<R, D>
where
    R: FnMut() -> bool,
    D: FnMut(u32),
{
    /// `is_pressed` returns the logical level (true while held);
    /// `delay_ms` must actually yield, not spin.
    pub fn new(is_pressed: R, delay_ms: D) -> Self {
        Self {
            is_pressed,
            delay_ms,
        }
    }

    /// Measure the in-progress press, in milliseconds. Returns 0 if the
    /// button is not held when called. Blocks (yielding) until release or
    /// the sampling ceiling.
    pub fn measure_press(&mut self, config: &SystemConfig) -> u32 {
        if !(self.is_pressed)() {
            return 0;
        }

        // Mechanical settle: the wake edge bounces for a few ms.
        (self.delay_ms)(config.button_settle_ms);
        let mut held_ms = config.button_settle_ms;

        while (self.is_pressed)() && held_ms < config.button_sample_ceiling_ms {
            (self.delay_ms)(SAMPLE_INTERVAL_MS);
            held_ms += SAMPLE_INTERVAL_MS;
        }

        debug!("button held {held_ms} ms");
        held_ms
    }

    /// Measure and classify in one call.
    pub fn sample_intent(&mut self, config: &SystemConfig) -> ButtonIntent {
        classify(self.measure_press(config), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn classify_boundaries() {
        let config = SystemConfig::default();
        assert_eq!(classify(0, &config), ButtonIntent::None);
        assert_eq!(classify(1, &config), ButtonIntent::Short);
        assert_eq!(classify(2999, &config), ButtonIntent::Short);
        assert_eq!(classify(3000, &config), ButtonIntent::Long);
        assert_eq!(classify(11_999, &config), ButtonIntent::Long);
        assert_eq!(classify(12_000, &config), ButtonIntent::VeryLong);
        assert_eq!(classify(u32::MAX, &config), ButtonIntent::VeryLong);
    }

    /// Drives the sampler with a scripted release time on a fake clock.
    fn measure_with_release_at(release_ms: u32) -> u32 {
        let config = SystemConfig::default();
        let clock = Cell::new(0u32);
        let mut sampler = ButtonSampler::new(
            || clock.get() < release_ms,
            |ms| clock.set(clock.get() + ms),
        );
        sampler.measure_press(&config)
    }

    #[test]
    fn unpressed_button_measures_zero() {
        assert_eq!(measure_with_release_at(0), 0);
    }

    #[test]
    fn short_tap_classifies_short() {
        let config = SystemConfig::default();
        let held = measure_with_release_at(400);
        assert_eq!(classify(held, &config), ButtonIntent::Short);
    }

    #[test]
    fn five_second_hold_classifies_long() {
        let config = SystemConfig::default();
        let held = measure_with_release_at(5000);
        assert!(held >= 5000 && held < 5000 + 2 * SAMPLE_INTERVAL_MS);
        assert_eq!(classify(held, &config), ButtonIntent::Long);
    }

    #[test]
    fn stuck_button_stops_at_ceiling() {
        let config = SystemConfig::default();
        let clock = Cell::new(0u32);
        let mut sampler = ButtonSampler::new(|| true, |ms| clock.set(clock.get() + ms));
        let held = sampler.measure_press(&config);
        assert!(held >= config.button_sample_ceiling_ms);
        assert!(held < config.button_sample_ceiling_ms + SAMPLE_INTERVAL_MS);
        assert_eq!(classify(held, &config), ButtonIntent::VeryLong);
    }

    #[test]
    fn sampler_yields_between_samples() {
        let config = SystemConfig::default();
        let yields = Cell::new(0u32);
        let clock = Cell::new(0u32);
        let mut sampler = ButtonSampler::new(
            || clock.get() < 1000,
            |ms| {
                yields.set(yields.get() + 1);
                clock.set(clock.get() + ms);
            },
        );
        sampler.measure_press(&config);
        assert!(yields.get() > 1);
    }
}
