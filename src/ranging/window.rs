//! Rolling window of ultrasonic round trips and its median

use embassy_time::{Duration, Instant};
use heapless::Vec;

/// One ultrasonic measurement, real echo or "no object" placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RoundTrip {
    /// When the sample was taken
    pub timestamp: Instant,
    /// Echo round trip in µs
    pub duration_us: u32,
}

impl RoundTrip {
    pub const fn new(timestamp: Instant, duration_us: u32) -> Self {
        Self {
            timestamp,
            duration_us,
        }
    }
}

/// FIFO of the last `K` round trips
///
/// Never empty: it starts out holding a single placeholder, so the median is
/// always defined. Pushing into a full window evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct RoundTripWindow<const K: usize> {
    samples: [RoundTrip; K],
    /// Index of the oldest sample
    head: usize,
    len: usize,
}

impl<const K: usize> RoundTripWindow<K> {
    const NON_EMPTY: () = assert!(K > 0, "window must hold at least one sample");

    /// Window holding only `placeholder`
    pub const fn seeded(placeholder: RoundTrip) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            samples: [placeholder; K],
            head: 0,
            len: 1,
        }
    }

    /// Appends a sample, evicting the oldest one once `K` are held
    pub fn push(&mut self, sample: RoundTrip) {
        if self.len < K {
            self.samples[(self.head + self.len) % K] = sample;
            self.len += 1;
        } else {
            self.samples[self.head] = sample;
            self.head = (self.head + 1) % K;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Most recently pushed sample
    pub fn newest(&self) -> &RoundTrip {
        &self.samples[(self.head + self.len - 1) % K]
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &RoundTrip> + '_ {
        (0..self.len).map(move |i| &self.samples[(self.head + i) % K])
    }

    /// True if the newest sample is older than `max_age` at `now`
    pub fn is_stale(&self, now: Instant, max_age: Duration) -> bool {
        now.saturating_duration_since(self.newest().timestamp) > max_age
    }

    /// Median round trip in µs
    ///
    /// Sorts a copy of the durations and takes index `(n - 1) >> 1`, the lower
    /// middle for even counts. No interpolation, so the result is always one
    /// of the measured values.
    pub fn median(&self) -> u32 {
        let mut durations: Vec<u32, K> = self.iter().map(|s| s.duration_us).collect();
        durations.sort_unstable();
        durations[(durations.len() - 1) >> 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ms: u64, duration_us: u32) -> RoundTrip {
        RoundTrip::new(Instant::from_millis(ms), duration_us)
    }

    #[test]
    fn test_median_single_sample() {
        let window = RoundTripWindow::<3>::seeded(sample(0, 900));
        assert_eq!(window.len(), 1);
        assert_eq!(window.median(), 900);
    }

    #[test]
    fn test_median_two_samples_takes_lower() {
        let mut window = RoundTripWindow::<3>::seeded(sample(0, 900));
        window.push(sample(10, 300));
        assert_eq!(window.median(), 300);
    }

    #[test]
    fn test_median_three_samples() {
        let mut window = RoundTripWindow::<3>::seeded(sample(0, 900));
        window.push(sample(10, 300));
        window.push(sample(20, 600));
        assert_eq!(window.median(), 600);
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut window = RoundTripWindow::<3>::seeded(sample(0, 900));
        for (i, duration) in [100, 200, 300, 400].into_iter().enumerate() {
            window.push(sample(10 * (i as u64 + 1), duration));
        }
        assert_eq!(window.len(), 3);
        let held: Vec<u32, 3> = window.iter().map(|s| s.duration_us).collect();
        assert_eq!(held.as_slice(), &[200, 300, 400]);
        assert_eq!(window.newest().duration_us, 400);
        assert_eq!(window.median(), 300);
    }

    #[test]
    fn test_single_outlier_is_rejected() {
        let mut window = RoundTripWindow::<3>::seeded(sample(0, 1200));
        window.push(sample(145, 17_400));
        window.push(sample(290, 1180));
        assert_eq!(window.median(), 1200);
    }

    #[test]
    fn test_staleness() {
        let window = RoundTripWindow::<3>::seeded(sample(1000, 900));
        let max_age = Duration::from_millis(155);
        assert!(!window.is_stale(Instant::from_millis(1155), max_age));
        assert!(window.is_stale(Instant::from_millis(1156), max_age));
        // A clock reading before the sample is not stale
        assert!(!window.is_stale(Instant::from_millis(500), max_age));
    }
}
