//! Distance units expressed as ultrasonic round-trip time

/// Unit a distance is given or reported in
///
/// The discriminant is the round trip in µs that one unit of distance takes
/// at room temperature, so conversion is a single multiply or divide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum DistanceUnit {
    Centimeters = 58,
    Inches = 148,
}

impl DistanceUnit {
    /// Round trip in µs per unit of distance
    pub const fn round_trip_us(self) -> u32 {
        self as u32
    }

    /// Round trip in µs for `distance` units, saturating on overflow
    pub const fn to_round_trip(self, distance: u32) -> u32 {
        distance.saturating_mul(self.round_trip_us())
    }

    /// Whole units covered by a round trip, rounded down
    pub const fn from_round_trip(self, round_trip_us: u32) -> u32 {
        round_trip_us / self.round_trip_us()
    }
}
