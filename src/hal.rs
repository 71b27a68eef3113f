//! Hardware seams
//!
//! The conditioning logic only needs a handful of primitives from the board.
//! The firmware implements these on top of embassy-rp; tests use fakes.

/// GPIO/ADC pin number as printed on the board
pub type PinId = u8;

/// Pins an ultrasonic sensor is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SonarPins {
    pub trigger: PinId,
    pub echo: PinId,
}

/// Emits the trigger pulse that starts one ultrasonic measurement
pub trait PulseTrigger {
    fn trigger(&mut self);
}

/// Blocking analog read returning the raw ADC code
pub trait AnalogInput {
    fn read(&mut self, pin: PinId) -> u16;
}

/// Operator buttons used to confirm calibration steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
}

/// Waits for the operator to press a button
#[allow(async_fn_in_trait)]
pub trait OperatorInput {
    async fn wait_for_press(&mut self, button: Button);
}
