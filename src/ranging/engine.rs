//! Continuous ranging
//!
//! The [`Ranger`] owns everything the ultrasonic path needs: the bound pins,
//! the round-trip window, the last filtered value and the threshold
//! observers. Two writers feed it:
//! - the echo listener calls [`Ranger::record_echo`] whenever a pulse returns
//! - the ranging loop ([`Ranger::run`]) runs one cycle per interval
//!
//! Both go through a critical-section mutex, so an echo recorded from an
//! interrupt can never interleave with a cycle.
//!
//! # Cycle
//! 1. If the newest sample is older than interval + margin, a "no object"
//!    placeholder is appended. A lost sensor therefore drifts to max range.
//! 2. The window drops samples beyond its length.
//! 3. The median is recomputed.
//! 4. Observers are evaluated against the median.
//! 5. A new trigger pulse is sent and the loop sleeps one interval.

use core::cell::RefCell;

use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};
use heapless::Vec;

use super::observer::{ObserverId, ObserverSet, ObserverState, RangeEvent};
use super::unit::DistanceUnit;
use super::window::{RoundTrip, RoundTripWindow};
use crate::config::{RangingConfig, EVENT_QUEUE_SIZE, MAX_OBSERVERS, MEDIAN_WINDOW_SIZE};
use crate::error::Error;
use crate::hal::{PulseTrigger, SonarPins};

/// Distance reported while no sensor has been connected
pub const NOT_CONNECTED: i32 = -1;

/// Mutable part of the ranger, only touched inside the critical section
struct RangingState {
    pins: Option<SonarPins>,
    window: RoundTripWindow<MEDIAN_WINDOW_SIZE>,
    filtered_us: u32,
    observers: ObserverSet,
}

/// Ranging context for one ultrasonic sensor
pub struct Ranger {
    config: RangingConfig,
    state: Mutex<CriticalSectionRawMutex, RefCell<RangingState>>,
    events: Channel<CriticalSectionRawMutex, RangeEvent, EVENT_QUEUE_SIZE>,
    stop: Signal<CriticalSectionRawMutex, ()>,
}

impl Ranger {
    /// Creates an unconnected ranger whose window reads "no object"
    pub const fn new(config: RangingConfig) -> Self {
        let placeholder = RoundTrip::new(Instant::from_ticks(0), config.max_round_trip_us);
        Self {
            config,
            state: Mutex::new(RefCell::new(RangingState {
                pins: None,
                window: RoundTripWindow::seeded(placeholder),
                filtered_us: config.max_round_trip_us,
                observers: ObserverSet::new(),
            })),
            events: Channel::new(),
            stop: Signal::new(),
        }
    }

    pub fn config(&self) -> &RangingConfig {
        &self.config
    }

    /// Binds the sensor pins
    ///
    /// Only the first call has an effect; returns whether it bound the pins.
    pub fn connect(&self, pins: SonarPins) -> bool {
        let bound = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.pins.is_some() {
                return false;
            }
            state.pins = Some(pins);
            true
        });
        if bound {
            info!("Ultrasonic sensor on trigger {} echo {}", pins.trigger, pins.echo);
        } else {
            debug!("Ultrasonic sensor already connected, ignoring");
        }
        bound
    }

    pub fn pins(&self) -> Option<SonarPins> {
        self.state.lock(|state| state.borrow().pins)
    }

    pub fn is_connected(&self) -> bool {
        self.pins().is_some()
    }

    /// Watches for objects closer than or at `distance`
    ///
    /// Works without a connected sensor too; such an observer simply never
    /// fires because the range stays at its maximum.
    pub fn watch(&self, distance: u32, unit: DistanceUnit) -> Result<ObserverId, Error> {
        let threshold_us = unit.to_round_trip(distance);
        let result = self
            .state
            .lock(|state| state.borrow_mut().observers.register(threshold_us));
        match result {
            Ok(id) => debug!("Observer {} watching {} us", id.0, threshold_us),
            Err(e) => warn!("Observer for {} us not registered: {:?}", threshold_us, e),
        }
        result
    }

    pub fn observer_state(&self, id: ObserverId) -> Option<ObserverState> {
        self.state.lock(|state| state.borrow().observers.state(id))
    }

    /// Records a returned echo
    ///
    /// Zero and over-range durations are what a timed-out measurement looks
    /// like and are saturated to the maximum round trip.
    pub fn record_echo(&self, at: Instant, duration_us: u32) {
        let max = self.config.max_round_trip_us;
        let duration_us = if duration_us == 0 || duration_us > max {
            max
        } else {
            duration_us
        };
        trace!("Echo {} us", duration_us);
        self.push(RoundTrip::new(at, duration_us));
    }

    /// Records a measurement that never saw its echo
    pub fn record_timeout(&self, at: Instant) {
        self.push(RoundTrip::new(at, self.config.max_round_trip_us));
    }

    fn push(&self, sample: RoundTrip) {
        self.state.lock(|state| state.borrow_mut().window.push(sample));
    }

    /// Runs one filtering cycle at `now` and returns the observers that fired
    pub fn cycle(&self, now: Instant) -> Vec<RangeEvent, MAX_OBSERVERS> {
        let stale_after = self.config.stale_after();
        let max = self.config.max_round_trip_us;
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.window.is_stale(now, stale_after) {
                state.window.push(RoundTrip::new(now, max));
            }
            // The window evicts on push, so it is already trimmed here
            let filtered = state.window.median();
            state.filtered_us = filtered;
            state.observers.evaluate(filtered)
        })
    }

    /// Last filtered round trip in µs
    pub fn filtered_round_trip(&self) -> u32 {
        self.state.lock(|state| state.borrow().filtered_us)
    }

    /// Filtered distance in whole `unit`s, [`NOT_CONNECTED`] without a sensor
    ///
    /// Yields once first so a caller polling in a tight loop still lets the
    /// ranging and echo tasks run.
    pub async fn distance(&self, unit: DistanceUnit) -> i32 {
        yield_now().await;
        self.state.lock(|state| {
            let state = state.borrow();
            match state.pins {
                Some(_) => unit.from_round_trip(state.filtered_us) as i32,
                None => NOT_CONNECTED,
            }
        })
    }

    /// True if the filtered distance is below `distance`, false without a sensor
    pub async fn is_within(&self, distance: u32, unit: DistanceUnit) -> bool {
        match self.distance(unit).await {
            NOT_CONNECTED => false,
            current => (current as u32) < distance,
        }
    }

    /// Waits for the next observer event
    pub async fn next_event(&self) -> RangeEvent {
        self.events.receive().await
    }

    pub fn try_next_event(&self) -> Option<RangeEvent> {
        self.events.try_receive().ok()
    }

    /// Asks a running loop to return after its current cycle
    pub fn stop(&self) {
        self.stop.signal(());
    }

    /// Ranging loop, runs until [`Ranger::stop`] is called
    pub async fn run<T: PulseTrigger>(&self, trigger: &mut T) {
        info!("Ranging started");
        loop {
            for event in self.cycle(Instant::now()) {
                debug!(
                    "Observer {} fired at {} us",
                    event.observer.0,
                    event.round_trip_us
                );
                if self.events.try_send(event).is_err() {
                    warn!("Range event queue full, dropped event of observer {}", event.observer.0);
                }
            }

            if self.is_connected() {
                trigger.trigger();
            }

            if let Either::Second(()) = select(Timer::after(self.config.interval), self.stop.wait()).await {
                info!("Ranging stopped");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::config::MAX_ROUND_TRIP_US;

    const PINS: SonarPins = SonarPins { trigger: 15, echo: 14 };

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn cm(distance: u32) -> u32 {
        DistanceUnit::Centimeters.to_round_trip(distance)
    }

    struct CountingTrigger(u32);

    impl PulseTrigger for CountingTrigger {
        fn trigger(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_distance_without_sensor_is_sentinel() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        assert_eq!(block_on(ranger.distance(DistanceUnit::Centimeters)), NOT_CONNECTED);
        assert!(!block_on(ranger.is_within(1000, DistanceUnit::Centimeters)));
    }

    #[test]
    fn test_distance_after_connect() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        assert!(ranger.connect(PINS));
        assert_eq!(block_on(ranger.distance(DistanceUnit::Centimeters)), 300);

        ranger.record_echo(at(100), cm(40));
        ranger.record_echo(at(200), cm(40));
        ranger.record_echo(at(245), cm(42));
        ranger.cycle(at(250));
        assert_eq!(block_on(ranger.distance(DistanceUnit::Centimeters)), 40);
        assert_eq!(block_on(ranger.distance(DistanceUnit::Inches)), (cm(40) / 148) as i32);
        assert!(block_on(ranger.is_within(41, DistanceUnit::Centimeters)));
        assert!(!block_on(ranger.is_within(40, DistanceUnit::Centimeters)));
    }

    #[test]
    fn test_connect_is_idempotent() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        assert!(ranger.connect(PINS));
        assert!(!ranger.connect(SonarPins { trigger: 1, echo: 2 }));
        assert_eq!(ranger.pins(), Some(PINS));
    }

    #[test]
    fn test_out_of_range_echo_saturates() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        ranger.connect(PINS);
        ranger.record_echo(at(0), 0);
        ranger.record_echo(at(10), MAX_ROUND_TRIP_US + 5000);
        ranger.cycle(at(20));
        assert_eq!(ranger.filtered_round_trip(), MAX_ROUND_TRIP_US);
    }

    #[test]
    fn test_timeouts_outvote_short_echo() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        ranger.connect(PINS);
        ranger.record_echo(at(0), 500);
        ranger.record_timeout(at(10));
        ranger.record_timeout(at(20));
        ranger.cycle(at(30));
        assert_eq!(ranger.filtered_round_trip(), MAX_ROUND_TRIP_US);
        assert_eq!(block_on(ranger.distance(DistanceUnit::Centimeters)), 300);
    }

    #[test]
    fn test_silent_sensor_converges_to_max_range() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        ranger.connect(PINS);
        for ms in [0, 145, 290] {
            ranger.record_echo(at(ms), cm(50));
        }
        ranger.cycle(at(290));
        assert_eq!(ranger.filtered_round_trip(), cm(50));

        // Echoes stop. A placeholder is pushed every other cycle since each
        // one is fresh for the cycle right after it.
        let mut now = 290;
        let mut cycles = 0;
        while ranger.filtered_round_trip() != MAX_ROUND_TRIP_US {
            now += 145;
            ranger.cycle(at(now));
            cycles += 1;
            assert!(cycles <= 4, "filter did not converge");
        }
        // Placeholders at 580 and 870 outvote the last real echo
        assert_eq!(now, 870);
    }

    #[test]
    fn test_unconnected_observer_never_fires() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        let id = ranger.watch(20, DistanceUnit::Centimeters).unwrap();
        for cycle in 0..10 {
            assert!(ranger.cycle(at(cycle * 145)).is_empty());
        }
        assert_eq!(ranger.observer_state(id), Some(ObserverState::Armed(cm(20))));
        assert_eq!(ranger.filtered_round_trip(), MAX_ROUND_TRIP_US);
    }

    #[test]
    fn test_lingering_object_fires_once() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        ranger.connect(PINS);
        let id = ranger.watch(20, DistanceUnit::Centimeters).unwrap();

        let mut fired = 0;
        for cycle in 0..7u64 {
            let now = cycle * 145;
            ranger.record_echo(at(now), cm(10));
            let events = ranger.cycle(at(now));
            for event in &events {
                assert_eq!(event.observer, id);
                assert_eq!(event.threshold_us, cm(20));
            }
            fired += events.len();
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_leaving_and_returning_fires_again() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        ranger.connect(PINS);
        ranger.watch(20, DistanceUnit::Centimeters).unwrap();

        let path = [100, 10, 10, 10, 100, 100, 100, 10, 10, 10];
        let mut fired = 0;
        for (cycle, distance) in path.into_iter().enumerate() {
            let now = cycle as u64 * 145;
            ranger.record_echo(at(now), cm(distance));
            fired += ranger.cycle(at(now)).len();
        }
        assert_eq!(fired, 2);
    }

    #[test]
    fn test_zero_threshold_is_ignored() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        assert_eq!(ranger.watch(0, DistanceUnit::Inches), Err(Error::InvalidThreshold));
        let id = ranger.watch(5, DistanceUnit::Inches).unwrap();
        assert_eq!(id, ObserverId(0));
    }

    #[test]
    fn test_run_triggers_and_queues_events() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        ranger.connect(PINS);
        let id = ranger.watch(20, DistanceUnit::Centimeters).unwrap();
        let now = Instant::now();
        for _ in 0..MEDIAN_WINDOW_SIZE {
            ranger.record_echo(now, cm(15));
        }

        let mut trigger = CountingTrigger(0);
        ranger.stop();
        block_on(ranger.run(&mut trigger));

        assert_eq!(trigger.0, 1);
        let event = ranger.try_next_event().unwrap();
        assert_eq!(event.observer, id);
        assert_eq!(event.round_trip_us, cm(15));
        assert!(ranger.try_next_event().is_none());
    }

    #[test]
    fn test_full_event_queue_drops_without_blocking() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        ranger.connect(PINS);
        for _ in 0..MAX_OBSERVERS {
            ranger.watch(20, DistanceUnit::Centimeters).unwrap();
        }
        let mut trigger = CountingTrigger(0);

        let approach = |distance: u32| {
            let now = Instant::now();
            for _ in 0..MEDIAN_WINDOW_SIZE {
                ranger.record_echo(now, cm(distance));
            }
        };

        // First approach fills the queue
        approach(15);
        ranger.stop();
        block_on(ranger.run(&mut trigger));

        // Move away so every observer re-arms, then approach again
        approach(100);
        assert!(ranger.cycle(Instant::now()).is_empty());
        approach(15);
        ranger.stop();
        block_on(ranger.run(&mut trigger));

        // Both loops returned, the second batch was dropped
        assert_eq!(trigger.0, 2);
        let mut queued = 0;
        while let Some(event) = ranger.try_next_event() {
            assert_eq!(event.observer, ObserverId(queued as u8));
            queued += 1;
        }
        assert_eq!(queued, EVENT_QUEUE_SIZE);
        for id in 0..MAX_OBSERVERS {
            assert_eq!(
                ranger.observer_state(ObserverId(id as u8)),
                Some(ObserverState::Fired(cm(20)))
            );
        }
    }

    #[test]
    fn test_run_without_sensor_sends_no_pulse() {
        let ranger = Ranger::new(RangingConfig::DEFAULT);
        let mut trigger = CountingTrigger(0);
        ranger.stop();
        block_on(ranger.run(&mut trigger));
        assert_eq!(trigger.0, 0);
    }
}
