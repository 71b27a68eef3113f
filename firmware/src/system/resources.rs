//! Hardware Resource Management
//!
//! Allocates pins and peripherals to the tasks that own them.
//!
//! # Resource Groups
//! - Sonar trigger: HC-SR04 trigger pin, driven by the ranging loop
//! - Sonar echo: HC-SR04 echo pin, timed by the echo listener
//! - Line sensors: two reflectance sensors on ADC-capable pins, plus the ADC
//! - Calibration buttons: operator confirmation during line calibration

use assign_resources::assign_resources;
use embassy_rp::peripherals;

assign_resources! {
    /// HC-SR04 trigger pin
    sonar_trigger: SonarTriggerResources {
        trigger_pin: PIN_15,
    },
    /// HC-SR04 echo pin (through a 5V to 3.3V divider)
    sonar_echo: SonarEchoResources {
        echo_pin: PIN_14,
    },
    /// Reflectance line sensors, analog outputs
    line_sensors: LineSensorResources {
        adc: ADC,
        left_pin: PIN_26,
        right_pin: PIN_27,
    },
    /// Buttons confirming the white and black calibration steps
    calibration_buttons: CalibrationButtonResources {
        btn_a: PIN_16,
        btn_b: PIN_17,
    },
}
