//! HC-SR04 echo timing
//!
//! The sensor answers each trigger pulse by holding its echo pin high for the
//! round-trip time. This task measures that pulse with edge waits and hands
//! the result to the ranger.
//!
//! # Operation
//! - Rising edge starts the measurement
//! - Falling edge ends it, the width is the round trip in µs
//! - No falling edge within the maximum round trip counts as "no object"

use embassy_rp::gpio::{Input, Pull};
use embassy_time::{with_timeout, Duration, Instant};

use crate::system::resources::SonarEchoResources;
use crate::task::ranging::RANGER;

/// Slack on top of the maximum round trip before an echo counts as lost
const ECHO_SLACK: Duration = Duration::from_millis(2);

/// Echo listener task
#[embassy_executor::task]
pub async fn echo_listen(r: SonarEchoResources) {
    let mut echo = Input::new(r.echo_pin, Pull::None);
    let max_echo = Duration::from_micros(RANGER.config().max_round_trip_us as u64) + ECHO_SLACK;

    loop {
        echo.wait_for_rising_edge().await;
        let start = Instant::now();

        match with_timeout(max_echo, echo.wait_for_falling_edge()).await {
            Ok(()) => {
                let end = Instant::now();
                RANGER.record_echo(end, (end - start).as_micros() as u32);
            }
            Err(_) => {
                RANGER.record_timeout(Instant::now());
                // The sensor releases the pin on its own, do not time the tail of this pulse
                echo.wait_for_low().await;
            }
        }
    }
}
