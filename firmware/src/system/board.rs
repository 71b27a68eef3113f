//! Board bindings
//!
//! Implements the sensing library's hardware seams on RP2350 peripherals.

use embassy_rp::adc::{self, Adc, Blocking};
use embassy_rp::gpio::{Input, Output, Pin, Pull};
use embassy_time::{block_for, Duration, Timer};
use robot_sense::hal::{AnalogInput, Button, OperatorInput, PinId, PulseTrigger};

use crate::system::resources::{CalibrationButtonResources, LineSensorResources};

/// HC-SR04 wants at least 10µs high on the trigger pin
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

/// Settle time with the trigger held low before the pulse
const TRIGGER_SETTLE: Duration = Duration::from_micros(2);

/// Button debounce delay
const DEBOUNCE_DURATION: Duration = Duration::from_millis(30);

/// Trigger side of the ultrasonic sensor
pub struct SonarTrigger {
    pin: Output<'static>,
}

impl SonarTrigger {
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }
}

impl PulseTrigger for SonarTrigger {
    fn trigger(&mut self) {
        // A few µs, busy waiting keeps the pulse width exact
        self.pin.set_low();
        block_for(TRIGGER_SETTLE);
        self.pin.set_high();
        block_for(TRIGGER_PULSE);
        self.pin.set_low();
    }
}

/// ADC with the two line sensor channels
pub struct LineAdc {
    adc: Adc<'static, Blocking>,
    left_pin: PinId,
    left: adc::Channel<'static>,
    right: adc::Channel<'static>,
}

impl LineAdc {
    /// Returns the ADC together with the left and right pin numbers
    pub fn new(r: LineSensorResources) -> (Self, PinId, PinId) {
        let left_pin = r.left_pin.pin();
        let right_pin = r.right_pin.pin();
        let line_adc = Self {
            adc: Adc::new_blocking(r.adc, adc::Config::default()),
            left_pin,
            left: adc::Channel::new_pin(r.left_pin, Pull::None),
            right: adc::Channel::new_pin(r.right_pin, Pull::None),
        };
        (line_adc, left_pin, right_pin)
    }
}

impl AnalogInput for LineAdc {
    fn read(&mut self, pin: PinId) -> u16 {
        let channel = if pin == self.left_pin {
            &mut self.left
        } else {
            &mut self.right
        };
        // A failed conversion reads as full reflection rather than stalling the poll loop
        self.adc.blocking_read(channel).unwrap_or(0)
    }
}

/// Operator buttons, pulled down, high while pressed
pub struct CalibrationButtons {
    a: Input<'static>,
    b: Input<'static>,
}

impl CalibrationButtons {
    pub fn new(r: CalibrationButtonResources) -> Self {
        Self {
            a: Input::new(r.btn_a, Pull::Down),
            b: Input::new(r.btn_b, Pull::Down),
        }
    }
}

impl OperatorInput for CalibrationButtons {
    async fn wait_for_press(&mut self, button: Button) {
        let input = match button {
            Button::A => &mut self.a,
            Button::B => &mut self.b,
        };
        loop {
            input.wait_for_rising_edge().await;
            Timer::after(DEBOUNCE_DURATION).await;
            if input.is_high() {
                break;
            }
        }
    }
}
