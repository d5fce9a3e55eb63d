// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Effect speed for vendor animation modes.

use std::fmt;

use crate::error::ValueError;

/// Speed byte of a vendor effect (1-255).
///
/// The value is inversely proportional to the effect rate: smaller is
/// faster. Empirically the flash rate is about `10 / speed` Hz, so a speed
/// of 10 flashes roughly once per second.
///
/// # Examples
///
/// ```
/// use lightdesk::types::Speed;
///
/// let speed = Speed::new(20).unwrap();
/// assert_eq!(speed.value(), 20);
///
/// assert!(Speed::new(0).is_err());
/// assert!(Speed::FAST < Speed::SLOW);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Speed(u8);

impl Speed {
    /// Minimum speed value (fastest effect).
    pub const MIN: u8 = 1;

    /// Maximum speed value (slowest effect).
    pub const MAX: u8 = 255;

    /// A fast strobe (about 2 Hz).
    pub const FAST: Self = Self(5);

    /// A medium pulse.
    pub const MEDIUM: Self = Self(20);

    /// A slow breathe.
    pub const SLOW: Self = Self(100);

    /// Creates a new speed value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is 0.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value < Self::MIN {
            return Err(ValueError::OutOfRange {
                name: "speed",
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX),
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Maps a musical tempo to a speed byte.
    ///
    /// One beat at `bpm` corresponds to `600 / bpm` speed units; `intensity`
    /// above 1.0 makes the effect faster than the beat. The result is kept
    /// within 2-100, the band where controllers still render visibly
    /// distinct flashes. A non-positive tempo yields [`Speed::MEDIUM`].
    ///
    /// ```
    /// use lightdesk::types::Speed;
    ///
    /// assert_eq!(Speed::from_bpm(120.0, 1.0).value(), 5);
    /// assert_eq!(Speed::from_bpm(120.0, 0.5).value(), 10);
    /// assert_eq!(Speed::from_bpm(0.0, 1.0), Speed::MEDIUM);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_bpm(bpm: f32, intensity: f32) -> Self {
        if bpm <= 0.0 || intensity <= 0.0 || !bpm.is_finite() || intensity.is_nan() {
            return Self::MEDIUM;
        }
        let raw = (600.0 / bpm / intensity).round().clamp(2.0, 100.0);
        // Clamped to 2..=100 above
        Self(raw as u8)
    }

    /// Returns the speed value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Speed {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_accepts_full_byte_range_above_zero() {
        assert_eq!(Speed::new(1).unwrap().value(), 1);
        assert_eq!(Speed::new(255).unwrap().value(), 255);
    }

    #[test]
    fn speed_rejects_zero() {
        assert!(matches!(
            Speed::new(0),
            Err(ValueError::OutOfRange { actual: 0, .. })
        ));
    }

    #[test]
    fn from_bpm_is_clamped() {
        assert_eq!(Speed::from_bpm(1000.0, 4.0).value(), 2);
        assert_eq!(Speed::from_bpm(3.0, 1.0).value(), 100);
    }

    #[test]
    fn from_bpm_handles_degenerate_input() {
        assert_eq!(Speed::from_bpm(-10.0, 1.0), Speed::MEDIUM);
        assert_eq!(Speed::from_bpm(f32::NAN, 1.0), Speed::MEDIUM);
        assert_eq!(Speed::from_bpm(128.0, 0.0), Speed::MEDIUM);
    }
}
