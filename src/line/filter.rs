//! Single-pole low-pass filter for reflectance readings

/// How a reading feeds the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadMode {
    /// Blend the reading into the running value
    Tracking,
    /// Take the reading as is, so a baseline is not skewed by history
    Calibration,
}

/// Exponential smoothing: `value = alpha * raw + (1 - alpha) * value`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmoothingFilter {
    alpha: f32,
    value: f32,
}

impl SmoothingFilter {
    /// Filter starting from zero
    pub const fn new(alpha: f32) -> Self {
        Self::with_value(alpha, 0.0)
    }

    pub const fn with_value(alpha: f32, value: f32) -> Self {
        Self { alpha, value }
    }

    /// Feeds one raw reading and returns the new filtered value
    pub fn update(&mut self, raw: f32, mode: ReadMode) -> f32 {
        self.value = match mode {
            ReadMode::Tracking => self.alpha * raw + (1.0 - self.alpha) * self.value,
            ReadMode::Calibration => raw,
        };
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_blends_half_and_half() {
        let mut filter = SmoothingFilter::with_value(0.5, 100.0);
        assert_eq!(filter.update(200.0, ReadMode::Tracking), 150.0);
        assert_eq!(filter.update(200.0, ReadMode::Tracking), 175.0);
    }

    #[test]
    fn test_calibration_bypasses_history() {
        let mut filter = SmoothingFilter::new(0.5);
        filter.update(800.0, ReadMode::Tracking);
        assert_eq!(filter.update(120.0, ReadMode::Calibration), 120.0);
        assert_eq!(filter.value(), 120.0);
    }

    #[test]
    fn test_starts_from_zero() {
        let mut filter = SmoothingFilter::new(0.5);
        assert_eq!(filter.update(300.0, ReadMode::Tracking), 150.0);
    }
}
