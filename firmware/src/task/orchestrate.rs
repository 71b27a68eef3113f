//! Orchestrator Module
//!
//! This module contains the orchestrator task that collects sensing events,
//! keeps the system state current and logs what the robot perceives.

use defmt::info;
use embassy_futures::select::{select, Either};
use embassy_time::Instant;
use robot_sense::ranging::{DistanceUnit, RangeEvent};

use crate::system::event::{self, Events};
use crate::system::state::{CalibrationStatus, Obstacle, SYSTEM_STATE};
use crate::task::ranging::RANGER;

/// Main orchestrator task
///
/// Waits on both the system event channel and the ranger's event queue and
/// serves whichever has something first.
#[embassy_executor::task]
pub async fn orchestrate() {
    info!("Orchestrator started");
    loop {
        match select(event::wait(), RANGER.next_event()).await {
            Either::First(event) => {
                if let Some(state_change) = process_event(event).await {
                    handle_state_changes(state_change).await;
                }
            }
            Either::Second(range_event) => handle_range_event(range_event).await,
        }
    }
}

/// Records an obstacle reported by a ranging observer
async fn handle_range_event(range_event: RangeEvent) {
    let obstacle = Obstacle {
        distance_cm: DistanceUnit::Centimeters.from_round_trip(range_event.round_trip_us),
        seen_at: Instant::now(),
    };
    info!(
        "Obstacle at {}cm (observer {}, threshold {}cm)",
        obstacle.distance_cm,
        range_event.observer.0,
        DistanceUnit::Centimeters.from_round_trip(range_event.threshold_us)
    );
    SYSTEM_STATE.lock().await.last_obstacle = Some(obstacle);
}

/// Processes incoming system events and determines if they result in a state change
///
/// # Returns
///
/// * `Option<Events>` - The event that caused a state change, if any
async fn process_event(event: Events) -> Option<Events> {
    let mut state = SYSTEM_STATE.lock().await;

    match event {
        Events::LineCalibrated(_) => {
            state.line_calibration = CalibrationStatus::Calibrated;
            Some(event)
        }
        Events::LineCalibrationFailed(_) => {
            state.line_calibration = CalibrationStatus::Failed;
            Some(event)
        }
        Events::LinePositionChanged(position) => {
            if state.line_position != position {
                state.line_position = position;
                Some(event)
            } else {
                None
            }
        }
    }
}

/// Handles state changes resulting from events
async fn handle_state_changes(event: Events) {
    match event {
        Events::LineCalibrated(calibration) => {
            info!(
                "Line sensors calibrated: left {}..{} right {}..{}",
                calibration.left.white,
                calibration.left.black,
                calibration.right.white,
                calibration.right.black
            );
        }
        Events::LineCalibrationFailed(e) => {
            info!("Line calibration failed ({:?}), waiting for a new attempt", e);
        }
        Events::LinePositionChanged(position) => {
            let distance = RANGER.distance(DistanceUnit::Centimeters).await;
            info!(
                "Line left: {} right: {} (free ahead: {}cm)",
                position.left, position.right, distance
            );
        }
    }
}
