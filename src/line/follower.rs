//! Line follower sensor pair
//!
//! Polled by the caller: every read samples the ADC, runs the sensor's
//! smoothing filter and, for classification, compares against the
//! calibrated baselines. Nothing runs in the background.

use embassy_time::{with_timeout, Duration};

use super::calibration::{Baselines, Calibration};
use super::filter::{ReadMode, SmoothingFilter};
use super::LineSensor;
use crate::config::LineConfig;
use crate::error::Error;
use crate::hal::{AnalogInput, Button, OperatorInput, PinId};

/// One reflectance sensor and its filter state
#[derive(Debug, Clone, Copy)]
struct SensorChannel {
    pin: PinId,
    filter: SmoothingFilter,
}

/// Left/right reflectance sensors with smoothing and calibration
pub struct LineFollower<A: AnalogInput> {
    adc: A,
    left: SensorChannel,
    right: SensorChannel,
    calibration: Option<Calibration>,
}

impl<A: AnalogInput> LineFollower<A> {
    /// Binds the sensors to their ADC pins, uncalibrated
    pub fn new(adc: A, left_pin: PinId, right_pin: PinId, config: LineConfig) -> Self {
        let filter = SmoothingFilter::new(config.alpha);
        Self {
            adc,
            left: SensorChannel {
                pin: left_pin,
                filter,
            },
            right: SensorChannel {
                pin: right_pin,
                filter,
            },
            calibration: None,
        }
    }

    pub fn pin(&self, sensor: LineSensor) -> PinId {
        match sensor {
            LineSensor::Left => self.left.pin,
            LineSensor::Right => self.right.pin,
        }
    }

    /// Samples `pin` and runs it through the filter bound to that pin
    ///
    /// Any pin other than the left one feeds the right filter.
    pub fn filtered_reading(&mut self, pin: PinId, mode: ReadMode) -> f32 {
        let raw = self.adc.read(pin);
        let channel = if pin == self.left.pin {
            &mut self.left
        } else {
            &mut self.right
        };
        channel.filter.update(f32::from(raw), mode)
    }

    /// Smoothed reading of `sensor`, rounded to the nearest ADC code
    pub fn read(&mut self, sensor: LineSensor) -> u16 {
        let value = self.filtered_reading(self.pin(sensor), ReadMode::Tracking);
        libm::roundf(value) as u16
    }

    /// Whether `sensor` currently sees the line
    pub fn is_on_line(&mut self, sensor: LineSensor) -> Result<bool, Error> {
        let calibration = self.calibration.ok_or(Error::NotCalibrated)?;
        let reading = self.read(sensor);
        Ok(calibration.baselines(sensor).classify(reading))
    }

    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration
    }

    /// Operator-guided two-point calibration
    ///
    /// Waits for button A with both sensors over white, then for button B with
    /// both over black. Readings bypass smoothing. The new baselines replace
    /// the old ones only if white reads below black on both sensors.
    pub async fn calibrate<I: OperatorInput>(&mut self, input: &mut I) -> Result<Calibration, Error> {
        info!("Calibration: place sensors on white and press A");
        input.wait_for_press(Button::A).await;
        let white_left = self.filtered_reading(self.left.pin, ReadMode::Calibration);
        let white_right = self.filtered_reading(self.right.pin, ReadMode::Calibration);
        debug!("White baselines: left {} right {}", white_left, white_right);

        info!("Calibration: place sensors on black and press B");
        input.wait_for_press(Button::B).await;
        let black_left = self.filtered_reading(self.left.pin, ReadMode::Calibration);
        let black_right = self.filtered_reading(self.right.pin, ReadMode::Calibration);
        debug!("Black baselines: left {} right {}", black_left, black_right);

        let calibration = Baselines::new(LineSensor::Left, white_left, black_left)
            .and_then(|left| {
                Baselines::new(LineSensor::Right, white_right, black_right)
                    .map(|right| Calibration { left, right })
            })
            .inspect_err(|e| warn!("Calibration rejected: {:?}", e))?;

        self.calibration = Some(calibration);
        info!("Calibration done");
        Ok(calibration)
    }

    /// [`LineFollower::calibrate`] bounded by `timeout` for the whole procedure
    pub async fn calibrate_within<I: OperatorInput>(
        &mut self,
        input: &mut I,
        timeout: Duration,
    ) -> Result<Calibration, Error> {
        with_timeout(timeout, self.calibrate(input))
            .await
            .map_err(|_| {
                warn!("Calibration timed out");
                Error::CalibrationTimeout
            })?
    }
}
