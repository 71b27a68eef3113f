//! Ultrasonic ranging
//!
//! Round trips from an HC-SR04 are collected in a short rolling window, the
//! median of the window is the robot's view of the distance ahead, and
//! threshold observers turn that distance into "object detected" events.
//!
//! All arithmetic happens on round-trip time in µs; [`DistanceUnit`] converts
//! at the edges.

pub mod engine;
pub mod observer;
pub mod unit;
pub mod window;

pub use engine::{Ranger, NOT_CONNECTED};
pub use observer::{ObserverId, ObserverSet, ObserverState, RangeEvent};
pub use unit::DistanceUnit;
pub use window::{RoundTrip, RoundTripWindow};
