//! Robot sensor firmware entry point
//!
//! Binds the ultrasonic sensor, the line sensors and the calibration buttons
//! and spawns the sensing tasks.

#![no_std]
#![no_main]

use crate::task::{
    echo_listen::echo_listen,
    line_follow::line_follow,
    orchestrate::orchestrate,
    ranging::{ranging, RANGER},
};
use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::gpio::Pin;
use robot_sense::hal::SonarPins;
use robot_sense::ranging::DistanceUnit;
use system::resources::AssignedResources;
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Objects closer than this raise an obstacle event (cm)
const OBSTACLE_DISTANCE: u32 = 20;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups for each task
    let r = split_resources!(p);

    // Bind the sonar before anything can query it, so distance reads are real from the start
    RANGER.connect(SonarPins {
        trigger: r.sonar_trigger.trigger_pin.pin(),
        echo: r.sonar_echo.echo_pin.pin(),
    });
    match RANGER.watch(OBSTACLE_DISTANCE, DistanceUnit::Centimeters) {
        Ok(id) => info!("Obstacle observer {} at {}cm", id.0, OBSTACLE_DISTANCE),
        Err(e) => warn!("Obstacle observer not registered: {:?}", e),
    }

    spawner.spawn(orchestrate()).unwrap();
    // Listen for echoes before the first trigger pulse goes out
    spawner.spawn(echo_listen(r.sonar_echo)).unwrap();
    spawner.spawn(ranging(r.sonar_trigger)).unwrap();
    spawner
        .spawn(line_follow(r.line_sensors, r.calibration_buttons))
        .unwrap();
}
