//! Distance thresholds with hysteresis
//!
//! An observer fires once when the filtered range drops to or below its
//! threshold and stays quiet until the range has risen above it again. A
//! caller watching for "closer than 20cm" is told once per approach, not once
//! per cycle while the object lingers.

use heapless::Vec;

use crate::config::MAX_OBSERVERS;
use crate::error::Error;

/// Handle of a registered observer, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObserverId(pub u8);

/// Hysteresis state of one threshold, threshold in µs round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ObserverState {
    /// Waiting for the range to reach the threshold
    Armed(u32),
    /// Already reported, waiting for the range to clear the threshold
    Fired(u32),
}

impl ObserverState {
    pub fn threshold(self) -> u32 {
        match self {
            ObserverState::Armed(t) | ObserverState::Fired(t) => t,
        }
    }
}

/// Raised when an object comes within an observer's threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeEvent {
    pub observer: ObserverId,
    /// Threshold that was crossed, µs round trip
    pub threshold_us: u32,
    /// Filtered round trip that crossed it
    pub round_trip_us: u32,
}

/// Ordered set of threshold observers
#[derive(Debug, Clone, Default)]
pub struct ObserverSet {
    observers: Vec<ObserverState, MAX_OBSERVERS>,
}

impl ObserverSet {
    pub const fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Adds an armed observer for `threshold_us`
    ///
    /// Zero thresholds are refused and leave the set untouched. Registering
    /// the same threshold twice yields two independent observers.
    pub fn register(&mut self, threshold_us: u32) -> Result<ObserverId, Error> {
        if threshold_us == 0 {
            return Err(Error::InvalidThreshold);
        }
        // Fits, MAX_OBSERVERS is asserted to stay within the u8 range
        let id = ObserverId(self.observers.len() as u8);
        self.observers
            .push(ObserverState::Armed(threshold_us))
            .map_err(|_| Error::ObserverSetFull)?;
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn state(&self, id: ObserverId) -> Option<ObserverState> {
        self.observers.get(id.0 as usize).copied()
    }

    /// Compares `round_trip_us` against every observer
    ///
    /// Returns one event per observer that went from armed to fired. Fired
    /// observers whose threshold has been cleared re-arm without an event.
    pub fn evaluate(&mut self, round_trip_us: u32) -> Vec<RangeEvent, MAX_OBSERVERS> {
        let mut events = Vec::new();
        for (index, state) in self.observers.iter_mut().enumerate() {
            match *state {
                ObserverState::Armed(threshold) if round_trip_us <= threshold => {
                    *state = ObserverState::Fired(threshold);
                    // Cannot overflow, there is at most one event per observer
                    let _ = events.push(RangeEvent {
                        observer: ObserverId(index as u8),
                        threshold_us: threshold,
                        round_trip_us,
                    });
                }
                ObserverState::Fired(threshold) if round_trip_us > threshold => {
                    *state = ObserverState::Armed(threshold);
                }
                _ => {}
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u32 = 20 * 58;

    #[test]
    fn test_zero_threshold_is_ignored() {
        let mut set = ObserverSet::new();
        assert_eq!(set.register(0), Err(Error::InvalidThreshold));
        assert!(set.is_empty());
    }

    #[test]
    fn test_fires_once_while_object_lingers() {
        let mut set = ObserverSet::new();
        let id = set.register(THRESHOLD).unwrap();

        assert!(set.evaluate(3000).is_empty());
        let fired = set.evaluate(1000);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].observer, id);
        assert_eq!(fired[0].threshold_us, THRESHOLD);

        for _ in 0..5 {
            assert!(set.evaluate(900).is_empty());
        }
        assert_eq!(set.state(id), Some(ObserverState::Fired(THRESHOLD)));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut set = ObserverSet::new();
        set.register(THRESHOLD).unwrap();
        assert_eq!(set.evaluate(THRESHOLD).len(), 1);
        // Sitting exactly on the threshold does not re-arm
        assert!(set.evaluate(THRESHOLD).is_empty());
        assert!(set.evaluate(THRESHOLD).is_empty());
    }

    #[test]
    fn test_rearms_silently_and_fires_again() {
        let mut set = ObserverSet::new();
        let id = set.register(THRESHOLD).unwrap();

        assert_eq!(set.evaluate(1000).len(), 1);
        assert!(set.evaluate(THRESHOLD + 1).is_empty());
        assert_eq!(set.state(id), Some(ObserverState::Armed(THRESHOLD)));
        assert_eq!(set.evaluate(1000).len(), 1);
    }

    #[test]
    fn test_duplicate_thresholds_fire_independently() {
        let mut set = ObserverSet::new();
        let first = set.register(THRESHOLD).unwrap();
        let second = set.register(THRESHOLD).unwrap();
        assert_ne!(first, second);

        let fired = set.evaluate(500);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].observer, first);
        assert_eq!(fired[1].observer, second);
    }

    #[test]
    fn test_only_crossed_thresholds_fire() {
        let mut set = ObserverSet::new();
        let near = set.register(10 * 58).unwrap();
        let far = set.register(50 * 58).unwrap();

        let fired = set.evaluate(30 * 58);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].observer, far);
        assert_eq!(set.state(near), Some(ObserverState::Armed(10 * 58)));
    }

    #[test]
    fn test_full_set_refuses_registration() {
        let mut set = ObserverSet::new();
        for expected in 0..MAX_OBSERVERS {
            let id = set.register(THRESHOLD).unwrap();
            assert_eq!(usize::from(id.0), expected);
        }
        assert_eq!(set.register(THRESHOLD), Err(Error::ObserverSetFull));
        assert_eq!(set.len(), MAX_OBSERVERS);
    }
}
