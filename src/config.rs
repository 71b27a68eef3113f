//! Tuning constants and runtime configuration
//!
//! Defaults follow the HC-SR04 timing the robot was tuned with. The firmware
//! may hand its own [`RangingConfig`] / [`LineConfig`] to the constructors.

use embassy_time::Duration;

/// Time between two trigger pulses (145ms keeps successive echoes apart)
pub const MEASUREMENT_INTERVAL: Duration = Duration::from_millis(145);

/// Extra time a sample may age past one interval before it counts as stale
pub const STALENESS_MARGIN: Duration = Duration::from_millis(10);

/// Number of round trips the median is taken over
pub const MEDIAN_WINDOW_SIZE: usize = 3;

/// Round trip reported when nothing reflects (300cm at 58µs/cm)
pub const MAX_ROUND_TRIP_US: u32 = 300 * 58;

/// Maximum number of distance thresholds watched at once
pub const MAX_OBSERVERS: usize = 8;

// Observer ids are u8
const _: () = assert!(MAX_OBSERVERS <= u8::MAX as usize + 1);

/// Capacity of the range event queue
pub const EVENT_QUEUE_SIZE: usize = 8;

/// Weight of the newest reading in the line sensor low-pass filter
pub const SMOOTHING_ALPHA: f32 = 0.5;

/// Ranging loop configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangingConfig {
    /// Cycle period, one trigger pulse per cycle
    pub interval: Duration,
    /// Grace period on top of `interval` before a placeholder is inserted
    pub staleness_margin: Duration,
    /// Saturated round trip in µs, used for timeouts and placeholders
    pub max_round_trip_us: u32,
}

impl RangingConfig {
    pub const DEFAULT: Self = Self {
        interval: MEASUREMENT_INTERVAL,
        staleness_margin: STALENESS_MARGIN,
        max_round_trip_us: MAX_ROUND_TRIP_US,
    };

    /// Age after which the newest sample no longer represents the scene
    pub fn stale_after(&self) -> Duration {
        self.interval + self.staleness_margin
    }
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Line sensor configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineConfig {
    /// Low-pass weight of the newest raw reading, 0.0..=1.0
    pub alpha: f32,
}

impl LineConfig {
    pub const DEFAULT: Self = Self {
        alpha: SMOOTHING_ALPHA,
    };
}

impl Default for LineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
