//! Reflectance line sensing
//!
//! Two analog sensors look down at the floor. Readings are smoothed with an
//! exponential filter, and a two-point calibration on a white surface and on
//! the black line turns them into an on/off-line decision per sensor.

pub mod calibration;
pub mod filter;
pub mod follower;

pub use calibration::{Baselines, Calibration};
pub use filter::{ReadMode, SmoothingFilter};
pub use follower::LineFollower;

/// Which of the two line sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineSensor {
    Left,
    Right,
}
