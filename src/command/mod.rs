// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Abstract lighting commands.
//!
//! A [`Command`] says *what* a controller should display. It carries raw
//! bytes, and it only becomes a wire frame when it is encoded against a
//! protocol family (see [`protocol::encode`](crate::protocol::encode)).
//!
//! | Command | Purpose | Resulting mode |
//! |---------|---------|----------------|
//! | [`Command::StaticColor`] | Fixed RGB (+ warm white) output | `Static` |
//! | [`Command::VendorMode`] | Start a built-in animation | `Running(mode)` |
//! | [`Command::Power`] | Wake or switch off the controller | `Static` |
//! | [`Command::WarmWhite`] | Drive only the white channel | `Static` |
//!
//! # Examples
//!
//! ```
//! use lightdesk::Command;
//! use lightdesk::types::{EffectMode, RgbColor, Speed};
//!
//! let red = Command::color(RgbColor::RED);
//! assert_eq!(red, Command::static_color(255, 0, 0, 0));
//!
//! let strobe = Command::vendor_mode(EffectMode::STROBE_WHITE, Speed::FAST);
//! assert_eq!(strobe.name(), "VendorMode");
//! ```

use std::fmt;

use crate::error::ValueError;
use crate::types::{EffectMode, RgbColor, Speed};

/// A lighting command. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Static RGB output, with a warm-white channel where the family has one.
    StaticColor {
        /// Red channel.
        r: u8,
        /// Green channel.
        g: u8,
        /// Blue channel.
        b: u8,
        /// Warm-white channel.
        warm_white: u8,
    },

    /// A built-in vendor animation.
    ///
    /// Fields are raw bytes; they are range-checked by [`Command::validate`]
    /// and by the codec.
    VendorMode {
        /// Mode id, 0x24-0x3A.
        mode_id: u8,
        /// Speed, 1-255, smaller is faster.
        speed: u8,
    },

    /// Power the output on or off.
    Power {
        /// `true` wakes the controller.
        on: bool,
    },

    /// White channel only, RGB channels ignored.
    WarmWhite {
        /// White level.
        level: u8,
    },
}

impl Command {
    /// The wake frame sent on every fresh connection.
    pub const WAKE: Self = Self::Power { on: true };

    /// Creates a static color command.
    #[must_use]
    pub const fn static_color(r: u8, g: u8, b: u8, warm_white: u8) -> Self {
        Self::StaticColor {
            r,
            g,
            b,
            warm_white,
        }
    }

    /// Creates a static color command from an [`RgbColor`], white channel off.
    #[must_use]
    pub const fn color(color: RgbColor) -> Self {
        Self::static_color(color.red(), color.green(), color.blue(), 0)
    }

    /// Creates a vendor mode command from validated parts.
    #[must_use]
    pub const fn vendor_mode(mode: EffectMode, speed: Speed) -> Self {
        Self::VendorMode {
            mode_id: mode.id(),
            speed: speed.value(),
        }
    }

    /// Creates a power command.
    #[must_use]
    pub const fn power(on: bool) -> Self {
        Self::Power { on }
    }

    /// Creates a warm-white command.
    #[must_use]
    pub const fn warm_white(level: u8) -> Self {
        Self::WarmWhite { level }
    }

    /// Returns the command name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StaticColor { .. } => "StaticColor",
            Self::VendorMode { .. } => "VendorMode",
            Self::Power { .. } => "Power",
            Self::WarmWhite { .. } => "WarmWhite",
        }
    }

    /// Checks the ranges of all fields.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` for a vendor mode with an unknown
    /// mode id or a zero speed.
    pub fn validate(&self) -> Result<(), ValueError> {
        if let Self::VendorMode { mode_id, speed } = *self {
            EffectMode::new(mode_id)?;
            Speed::new(speed)?;
        }
        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticColor {
                r,
                g,
                b,
                warm_white,
            } => write!(f, "StaticColor(#{r:02X}{g:02X}{b:02X}, ww={warm_white})"),
            Self::VendorMode { mode_id, speed } => {
                write!(f, "VendorMode(0x{mode_id:02X}, speed={speed})")
            }
            Self::Power { on } => write!(f, "Power({})", if *on { "on" } else { "off" }),
            Self::WarmWhite { level } => write!(f, "WarmWhite({level})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wake_is_power_on() {
        assert_eq!(Command::WAKE, Command::power(true));
    }

    #[test]
    fn validate_checks_vendor_mode_ranges() {
        let vendor = |mode_id, speed| Command::VendorMode { mode_id, speed };
        assert!(vendor(0x37, 20).validate().is_ok());
        assert!(vendor(0x37, 0).validate().is_err());
        assert!(vendor(0x99, 5).validate().is_err());
        assert!(Command::static_color(1, 2, 3, 4).validate().is_ok());
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            Command::static_color(255, 0, 16, 0).to_string(),
            "StaticColor(#FF0010, ww=0)"
        );
        assert_eq!(
            Command::VendorMode {
                mode_id: 0x26,
                speed: 5,
            }
            .to_string(),
            "VendorMode(0x26, speed=5)"
        );
        assert_eq!(Command::power(false).to_string(), "Power(off)");
    }

    #[test]
    fn serde_uses_tagged_form() {
        let json = serde_json::to_value(Command::power(true)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "power", "on": true}));
    }
}
