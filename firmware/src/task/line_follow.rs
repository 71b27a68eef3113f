//! Line sensing
//!
//! Calibrates the two reflectance sensors with the operator, then polls them
//! and reports when the robot's position over the line changes.
//!
//! # Calibration
//! - Sensors over white, press A; sensors over black, press B
//! - Rejected or timed out attempts are reported and started over
//! - Pressing A while tracking starts a new calibration
//!
//! # Polling
//! - Both sensors are read every 20ms through the smoothing filter
//! - Only changes are sent to the orchestrator

use defmt::{info, warn};
use embassy_futures::select::select;
use embassy_time::{Duration, Timer};
use robot_sense::config::LineConfig;
use robot_sense::hal::{AnalogInput, Button, OperatorInput};
use robot_sense::line::{LineFollower, LineSensor};

use crate::system::board::{CalibrationButtons, LineAdc};
use crate::system::event::{self, Events};
use crate::system::resources::{CalibrationButtonResources, LineSensorResources};
use crate::system::state::LinePosition;

/// Time between two line polls
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Time the operator has to finish one calibration attempt
const CALIBRATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Line sensing task
#[embassy_executor::task]
pub async fn line_follow(r: LineSensorResources, b: CalibrationButtonResources) {
    let (adc, left_pin, right_pin) = LineAdc::new(r);
    let mut buttons = CalibrationButtons::new(b);
    let mut line = LineFollower::new(adc, left_pin, right_pin, LineConfig::DEFAULT);

    loop {
        calibrate(&mut line, &mut buttons).await;

        info!("Line following started, press A to recalibrate");
        select(buttons.wait_for_press(Button::A), track(&mut line)).await;
        info!("Recalibration requested");
    }
}

/// Runs calibration attempts until one is accepted
async fn calibrate<A: AnalogInput>(line: &mut LineFollower<A>, buttons: &mut CalibrationButtons) {
    loop {
        match line.calibrate_within(buttons, CALIBRATION_TIMEOUT).await {
            Ok(calibration) => {
                event::send(Events::LineCalibrated(calibration)).await;
                return;
            }
            Err(e) => {
                warn!("Line calibration failed: {:?}", e);
                event::send(Events::LineCalibrationFailed(e)).await;
            }
        }
    }
}

/// Polls both sensors and reports position changes, never returns
async fn track<A: AnalogInput>(line: &mut LineFollower<A>) {
    let mut last_position: Option<LinePosition> = None;
    loop {
        // Calibrated before tracking starts, classification cannot fail here
        let position = LinePosition {
            left: line.is_on_line(LineSensor::Left).unwrap_or(false),
            right: line.is_on_line(LineSensor::Right).unwrap_or(false),
        };

        // Only send event if position has changed
        if last_position != Some(position) {
            event::send(Events::LinePositionChanged(position)).await;
            last_position = Some(position);
        }

        Timer::after(POLL_INTERVAL).await;
    }
}
