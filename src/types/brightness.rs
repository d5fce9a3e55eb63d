// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Master brightness applied to static colors before encoding.
//!
//! The controllers have no brightness command of their own, so dimming is
//! done by scaling the channel bytes of a [`Command::StaticColor`].

use std::fmt;

use crate::command::Command;
use crate::error::ValueError;

/// Brightness level as a percentage (1-100).
///
/// # Examples
///
/// ```
/// use lightdesk::Command;
/// use lightdesk::types::Brightness;
///
/// let half = Brightness::new(50).unwrap();
/// let dimmed = half.apply(Command::static_color(200, 100, 0, 0));
/// assert_eq!(dimmed, Command::static_color(100, 50, 0, 0));
///
/// assert!(Brightness::new(0).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Brightness(u8);

impl Brightness {
    /// Lowest brightness (1%).
    pub const MIN: Self = Self(1);

    /// Full brightness (100%).
    pub const MAX: Self = Self(100);

    /// Creates a new brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside [1, 100].
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if !(1..=100).contains(&value) {
            return Err(ValueError::OutOfRange {
                name: "brightness",
                min: 1,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Scales a single channel byte, rounding down.
    #[must_use]
    pub fn scale(&self, channel: u8) -> u8 {
        let scaled = u16::from(channel) * u16::from(self.0) / 100;
        // channel * pct / 100 never exceeds channel
        u8::try_from(scaled).unwrap_or(u8::MAX)
    }

    /// Scales the channels of a static color; other commands pass through.
    #[must_use]
    pub fn apply(&self, command: Command) -> Command {
        match command {
            Command::StaticColor {
                r,
                g,
                b,
                warm_white,
            } => Command::StaticColor {
                r: self.scale(r),
                g: self.scale(g),
                b: self.scale(b),
                warm_white: self.scale(warm_white),
            },
            other => other,
        }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Speed;

    #[test]
    fn brightness_range() {
        assert!(Brightness::new(1).is_ok());
        assert!(Brightness::new(100).is_ok());
        assert!(Brightness::new(0).is_err());
        assert!(Brightness::new(101).is_err());
    }

    #[test]
    fn full_brightness_is_identity() {
        let cmd = Command::static_color(255, 17, 3, 9);
        assert_eq!(Brightness::MAX.apply(cmd), cmd);
    }

    #[test]
    fn scale_rounds_down() {
        let b = Brightness::new(33).unwrap();
        assert_eq!(b.scale(255), 84);
        assert_eq!(b.scale(1), 0);
    }

    #[test]
    fn non_color_commands_pass_through() {
        let b = Brightness::new(10).unwrap();
        let mode = Command::vendor_mode(crate::types::EffectMode::STROBE_WHITE, Speed::FAST);
        assert_eq!(b.apply(mode), mode);
        assert_eq!(b.apply(Command::power(true)), Command::power(true));
    }
}
