//! System Events
//!
//! Defines events and channels for inter-task communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use robot_sense::line::Calibration;
use robot_sense::Error;

use crate::system::state::LinePosition;

/// Multi-producer, single-consumer event channel with capacity of 10
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Events, 10> = Channel::new();

/// Sends an event to the system channel
pub async fn send(event: Events) {
    EVENT_CHANNEL.sender().send(event).await;
}

/// Receives the next event from the system channel
pub async fn wait() -> Events {
    EVENT_CHANNEL.receiver().receive().await
}

/// System-wide events
///
/// Range events do not go through this channel; the orchestrator takes them
/// straight from the ranger's own queue.
#[derive(Debug, Clone)]
pub enum Events {
    /// Line sensors calibrated
    LineCalibrated(Calibration),
    /// Line sensor calibration rejected or timed out
    LineCalibrationFailed(Error),
    /// At least one line sensor changed between on and off the line
    LinePositionChanged(LinePosition),
}
