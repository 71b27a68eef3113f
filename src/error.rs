//! Error type shared by the ranging and line sensing modules

use crate::line::LineSensor;

/// Errors surfaced to callers
///
/// The control surface itself never fails loudly: distance queries return
/// sentinels and missing echoes read as "no object". These variants cover the
/// cases a caller may want to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Threshold of zero, nothing was registered
    #[error("threshold must be greater than zero")]
    InvalidThreshold,
    /// All observer slots are taken
    #[error("observer set is full")]
    ObserverSetFull,
    /// Classification requested before a calibration run
    #[error("line sensors are not calibrated")]
    NotCalibrated,
    /// White reading was not below the black reading for a sensor
    #[error("white baseline {white} is not below black baseline {black} on {sensor:?} sensor")]
    InvertedBaselines {
        sensor: LineSensor,
        white: f32,
        black: f32,
    },
    /// Operator did not confirm a calibration step in time
    #[error("calibration timed out")]
    CalibrationTimeout,
}
