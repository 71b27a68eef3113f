//! Ultrasonic ranging loop
//!
//! Drives the HC-SR04 trigger pin from the ranger's background loop.
//!
//! # Sensor Operation
//! - One trigger pulse every 145ms, echoes are timed by the echo listener
//! - Distances are handled as round-trip time, 58µs per cm
//!
//! # Signal Processing
//! - Moving median over the last 3 round trips
//! - Missing echoes age out: after 155ms without a sample a "no object"
//!   placeholder enters the window, so an unplugged sensor reads max range
//!
//! # Obstacle Detection
//! - Observers registered on [`RANGER`] fire once per approach
//! - Events are picked up by the orchestrator

use embassy_rp::gpio::{Level, Output};
use robot_sense::config::RangingConfig;
use robot_sense::ranging::Ranger;

use crate::system::board::SonarTrigger;
use crate::system::resources::SonarTriggerResources;

/// The robot's single ultrasonic sensor
pub static RANGER: Ranger = Ranger::new(RangingConfig::DEFAULT);

/// Runs the ranging loop for the lifetime of the firmware
#[embassy_executor::task]
pub async fn ranging(r: SonarTriggerResources) {
    let mut trigger = SonarTrigger::new(Output::new(r.trigger_pin, Level::Low));
    RANGER.run(&mut trigger).await;
}
