//! Two-point calibration of the line sensors
//!
//! Each sensor is sampled once over a white surface and once over the black
//! line. A live reading strictly between the two counts as "on the line".
//! Wiring decides whether black reads higher than white; the classifier
//! expects white below black and calibration refuses anything else.

use super::LineSensor;
use crate::error::Error;

/// White and black reference readings of one sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Baselines {
    pub white: f32,
    pub black: f32,
}

impl Baselines {
    /// Checks that white reads strictly below black
    pub fn new(sensor: LineSensor, white: f32, black: f32) -> Result<Self, Error> {
        if white < black {
            Ok(Self { white, black })
        } else {
            Err(Error::InvertedBaselines {
                sensor,
                white,
                black,
            })
        }
    }

    /// On the line iff `white < reading < black`
    pub fn classify(&self, reading: u16) -> bool {
        let reading = f32::from(reading);
        self.white < reading && reading < self.black
    }
}

/// Baselines of the left and right sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub left: Baselines,
    pub right: Baselines,
}

impl Calibration {
    pub fn baselines(&self, sensor: LineSensor) -> &Baselines {
        match sensor {
            LineSensor::Left => &self.left,
            LineSensor::Right => &self.right,
        }
    }
}
