//! Deep-sleep entry.
//!
//! Power-down on this device is deep sleep with the front button armed as
//! the ext0 wake source (active low). Waking is therefore always caused by
//! a button press, which the boot path measures and classifies.

use log::info;

/// Arm the button as wake source and enter deep sleep. Does not return:
/// the next button press resets the chip and boots from scratch.
#[cfg(target_os = "espidf")]
pub fn enter_deep_sleep(wake_gpio: i32) -> ! {
    info!("entering deep sleep, wake on GPIO {wake_gpio}");
    unsafe {
        esp_idf_svc::sys::esp_sleep_enable_ext0_wakeup(wake_gpio, 0);
        esp_idf_svc::sys::esp_deep_sleep_start();
    }
    unreachable!("deep sleep does not return");
}

/// Host simulation: exit the process instead of sleeping.
#[cfg(not(target_os = "espidf"))]
pub fn enter_deep_sleep(wake_gpio: i32) -> ! {
    info!("simulated deep sleep (wake on GPIO {wake_gpio}), exiting");
    std::process::exit(0);
}
