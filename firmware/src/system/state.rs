//! System State Management
//!
//! Holds what the robot currently knows about its surroundings:
//! - Last obstacle reported by the ranging observers
//! - Line sensor calibration status
//! - Which line sensors currently see the line
//!
//! The state is protected by a mutex and only written by the orchestrator.

use defmt::Format;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::Instant;

/// Global system state protected by a mutex
///
/// Initialized to:
/// - No obstacle seen yet
/// - Line sensors not calibrated
/// - Both line sensors off the line
pub static SYSTEM_STATE: Mutex<CriticalSectionRawMutex, SystemState> = Mutex::new(SystemState {
    last_obstacle: None,
    line_calibration: CalibrationStatus::Pending,
    line_position: LinePosition {
        left: false,
        right: false,
    },
});

/// Robot sensing state
#[derive(Format)]
pub struct SystemState {
    /// Most recent obstacle event
    /// - None: nothing came within range since boot
    /// - Some(obstacle): distance and time of the latest approach
    pub last_obstacle: Option<Obstacle>,
    /// Line sensor calibration status
    pub line_calibration: CalibrationStatus,
    /// Last reported line position
    pub line_position: LinePosition,
}

/// An object that came within an observer's threshold
#[derive(Debug, Clone, Copy, PartialEq, Format)]
pub struct Obstacle {
    /// Filtered distance when the observer fired (cm)
    pub distance_cm: u32,
    pub seen_at: Instant,
}

/// Line sensor calibration status
#[derive(Debug, Clone, Copy, PartialEq, Format)]
pub enum CalibrationStatus {
    /// Waiting for the operator to run calibration
    Pending,
    /// Baselines are set, classification is live
    Calibrated,
    /// Last attempt was rejected or timed out, a new one is running
    Failed,
}

/// Which line sensors see the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub struct LinePosition {
    pub left: bool,
    pub right: bool,
}
