//! Servo-style pulse widths and the ESC operating range
//!
//! ESCs driven "old analog PWM style" read the width of a 50 Hz pulse train:
//! the shortest width in the calibrated window is zero throttle, the longest is
//! full throttle. `pigpiod` accepts widths of 500-2500 µs, or 0 to switch the
//! pulse train off entirely.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Shortest pulse width the daemon will generate, in microseconds
pub const SERVO_MIN_US: u16 = 500;

/// Longest pulse width the daemon will generate, in microseconds
pub const SERVO_MAX_US: u16 = 2500;

/// Default bottom of the ESC window (zero throttle), in microseconds
pub const DEFAULT_MIN_US: u16 = 700;

/// Default top of the ESC window (full throttle), in microseconds
pub const DEFAULT_MAX_US: u16 = 2000;

/// Errors produced when building pulse widths or ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PulseError {
    /// Width is neither 0 nor inside the daemon's servo range
    #[error("Pulse width {0} µs is outside 0 or 500..=2500 µs")]
    OutOfRange(u16),

    /// Range bounds are reversed, equal, or contain OFF
    #[error("Invalid pulse range {min}..{max} µs")]
    InvalidRange {
        /// Requested lower bound
        min: u16,
        /// Requested upper bound
        max: u16,
    },
}

/// A pulse width in microseconds, valid for the daemon's `SERVO` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct PulseWidth(u16);

impl PulseWidth {
    /// Pulses switched off. The ESC sees no signal at all.
    pub const OFF: PulseWidth = PulseWidth(0);

    pub fn new(micros: u16) -> Result<Self, PulseError> {
        if micros == 0 || (SERVO_MIN_US..=SERVO_MAX_US).contains(&micros) {
            Ok(Self(micros))
        } else {
            Err(PulseError::OutOfRange(micros))
        }
    }

    pub fn micros(self) -> u16 {
        self.0
    }

    pub fn is_off(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u16> for PulseWidth {
    type Error = PulseError;

    fn try_from(micros: u16) -> Result<Self, Self::Error> {
        Self::new(micros)
    }
}

impl From<PulseWidth> for u16 {
    fn from(width: PulseWidth) -> Self {
        width.0
    }
}

impl fmt::Display for PulseWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_off() {
            f.write_str("off")
        } else {
            write!(f, "{} µs", self.0)
        }
    }
}

/// Calibrated operating window of the ESC.
///
/// `min` is the zero-throttle width and `max` the full-throttle width taught
/// to the ESC during calibration. Both lie inside the daemon's servo range and
/// `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct PulseRange {
    min: PulseWidth,
    max: PulseWidth,
}

/// Wire form of [`PulseRange`]; decoding goes through [`PulseRange::new`].
#[derive(Serialize, Deserialize)]
struct RawRange {
    min: u16,
    max: u16,
}

impl TryFrom<RawRange> for PulseRange {
    type Error = PulseError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl From<PulseRange> for RawRange {
    fn from(range: PulseRange) -> Self {
        Self {
            min: range.min.0,
            max: range.max.0,
        }
    }
}

impl Default for PulseRange {
    fn default() -> Self {
        Self {
            min: PulseWidth(DEFAULT_MIN_US),
            max: PulseWidth(DEFAULT_MAX_US),
        }
    }
}

impl PulseRange {
    pub fn new(min_us: u16, max_us: u16) -> Result<Self, PulseError> {
        let invalid = PulseError::InvalidRange {
            min: min_us,
            max: max_us,
        };

        let min = PulseWidth::new(min_us).map_err(|_| invalid)?;
        let max = PulseWidth::new(max_us).map_err(|_| invalid)?;
        if min.is_off() || min >= max {
            return Err(invalid);
        }

        Ok(Self { min, max })
    }

    pub fn min(&self) -> PulseWidth {
        self.min
    }

    pub fn max(&self) -> PulseWidth {
        self.max
    }

    /// Width of the window in microseconds
    pub fn span(&self) -> u16 {
        self.max.0 - self.min.0
    }

    pub fn contains(&self, width: PulseWidth) -> bool {
        width >= self.min && width <= self.max
    }

    /// Clamp a raw microsecond value into the window.
    pub fn clamp(&self, micros: u16) -> PulseWidth {
        PulseWidth(micros.clamp(self.min.0, self.max.0))
    }

    /// Map a throttle fraction (0.0 = min, 1.0 = max) onto the window.
    ///
    /// Values outside 0.0..=1.0, and NaN, are clamped.
    pub fn from_fraction(&self, fraction: f32) -> PulseWidth {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let offset = (fraction * self.span() as f32 + 0.5) as u16;
        self.clamp(self.min.0.saturating_add(offset))
    }

    /// Inverse of [`from_fraction`](Self::from_fraction). OFF maps to 0.0.
    pub fn fraction_of(&self, width: PulseWidth) -> f32 {
        let clamped = self.clamp(width.0);
        (clamped.0 - self.min.0) as f32 / self.span() as f32
    }

    /// Move `width` by `delta` µs, staying inside the window.
    pub fn step(&self, width: PulseWidth, delta: i32) -> PulseWidth {
        let base = if width.is_off() { self.min.0 } else { width.0 };
        let target = (base as i32 + delta).clamp(self.min.0 as i32, self.max.0 as i32);
        PulseWidth(target as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_accepts_off_and_servo_range() {
        assert!(PulseWidth::new(0).is_ok());
        assert!(PulseWidth::new(500).is_ok());
        assert!(PulseWidth::new(2500).is_ok());
        assert_eq!(PulseWidth::new(499), Err(PulseError::OutOfRange(499)));
        assert_eq!(PulseWidth::new(2501), Err(PulseError::OutOfRange(2501)));
    }

    #[test]
    fn test_default_range_matches_esc_window() {
        let range = PulseRange::default();
        assert_eq!(range.min().micros(), 700);
        assert_eq!(range.max().micros(), 2000);
        assert_eq!(range.span(), 1300);
    }

    #[test]
    fn test_range_rejects_reversed_or_off_bounds() {
        assert!(PulseRange::new(2000, 700).is_err());
        assert!(PulseRange::new(1000, 1000).is_err());
        assert!(PulseRange::new(0, 1000).is_err());
        assert!(PulseRange::new(700, 3000).is_err());
        assert!(PulseRange::new(1000, 2000).is_ok());
    }

    #[test]
    fn test_fraction_mapping() {
        let range = PulseRange::default();
        assert_eq!(range.from_fraction(0.0).micros(), 700);
        assert_eq!(range.from_fraction(1.0).micros(), 2000);
        assert_eq!(range.from_fraction(0.5).micros(), 1350);
        assert_eq!(range.from_fraction(-3.0).micros(), 700);
        assert_eq!(range.from_fraction(7.0).micros(), 2000);
        assert_eq!(range.from_fraction(f32::NAN).micros(), 700);

        let mid = range.from_fraction(0.5);
        let back = range.fraction_of(mid);
        assert!(back > 0.499 && back < 0.501);
        assert_eq!(range.fraction_of(PulseWidth::OFF), 0.0);
    }

    #[test]
    fn test_step_saturates_inside_range() {
        let range = PulseRange::default();
        let near_top = range.clamp(1995);
        assert_eq!(range.step(near_top, 10).micros(), 2000);
        assert_eq!(range.step(range.min(), -100).micros(), 700);
        // Stepping from OFF starts at the bottom of the window
        assert_eq!(range.step(PulseWidth::OFF, 10).micros(), 710);
    }

    #[test]
    fn test_serde_round_trip() {
        let range = PulseRange::new(1000, 1900).unwrap();
        let bytes = postcard::to_allocvec(&range).unwrap();
        assert_eq!(postcard::from_bytes::<PulseRange>(&bytes).unwrap(), range);

        let bytes = postcard::to_allocvec(&PulseWidth::OFF).unwrap();
        assert_eq!(postcard::from_bytes::<PulseWidth>(&bytes).unwrap(), PulseWidth::OFF);
    }

    #[test]
    fn test_deserialize_rejects_invalid_values() {
        // Same layout as the range, but without the checks
        #[derive(Serialize)]
        struct Unchecked {
            min: u16,
            max: u16,
        }

        let reversed = postcard::to_allocvec(&Unchecked { min: 2000, max: 700 }).unwrap();
        assert!(postcard::from_bytes::<PulseRange>(&reversed).is_err());

        let off_bottom = postcard::to_allocvec(&Unchecked { min: 0, max: 1500 }).unwrap();
        assert!(postcard::from_bytes::<PulseRange>(&off_bottom).is_err());

        let too_long = postcard::to_allocvec(&3000u16).unwrap();
        assert!(postcard::from_bytes::<PulseWidth>(&too_long).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(alloc::format!("{}", PulseWidth::OFF), "off");
        assert_eq!(alloc::format!("{}", PulseRange::default().max()), "2000 µs");
    }
}
