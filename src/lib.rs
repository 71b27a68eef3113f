//! Sensor conditioning for a small tracked robot
//!
//! Turns raw, noisy sensor samples into values and events the robot logic can
//! act on:
//! - [`ranging`]: HC-SR04 round trips go through a rolling median filter and
//!   drive a set of hysteretic distance thresholds that raise one event per
//!   approach.
//! - [`line`]: two analog reflectance sensors are smoothed, calibrated on a
//!   white and a black surface and classified as on/off the line.
//!
//! Everything here is hardware independent and runs on the host for tests.
//! The firmware crate binds it to pins, the ADC and the embassy executor.

#![cfg_attr(not(test), no_std)]

// This must go first so the macros are visible to the other modules
mod fmt;

pub mod config;
pub mod error;
pub mod hal;
pub mod line;
pub mod ranging;

pub use error::Error;
