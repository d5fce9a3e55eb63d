// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Built-in vendor animation modes of `FFE9_56AA` controllers.
//!
//! A mode is selected with a `BB <mode> <speed> 44` frame and keeps running
//! on the controller until another mode or a static color overrides it.

use std::fmt;

use crate::error::ValueError;

/// Identifier of a built-in controller animation (0x24-0x3A).
///
/// # Examples
///
/// ```
/// use lightdesk::types::EffectMode;
///
/// let strobe = EffectMode::new(0x37).unwrap();
/// assert_eq!(strobe, EffectMode::STROBE_WHITE);
/// assert_eq!(strobe.name(), "White Strobe");
///
/// assert!(EffectMode::new(0x10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EffectMode(u8);

/// Known modes with their display names, in id order.
const CATALOG: [(EffectMode, &str); 23] = [
    (EffectMode::NORMAL, "Normal (static)"),
    (EffectMode::PULSE_RAINBOW, "Pulsating Rainbow"),
    (EffectMode::PULSE_RED, "Pulsating Red"),
    (EffectMode::PULSE_GREEN, "Pulsating Green"),
    (EffectMode::PULSE_BLUE, "Pulsating Blue"),
    (EffectMode::PULSE_YELLOW, "Pulsating Yellow"),
    (EffectMode::PULSE_CYAN, "Pulsating Cyan"),
    (EffectMode::PULSE_PURPLE, "Pulsating Purple"),
    (EffectMode::PULSE_WHITE, "Pulsating White"),
    (EffectMode(0x2D), "Pulsating Red+Green"),
    (EffectMode(0x2E), "Pulsating Red+Blue"),
    (EffectMode(0x2F), "Pulsating Green+Blue"),
    (EffectMode::STROBE_RAINBOW, "Rainbow Strobe"),
    (EffectMode::STROBE_RED, "Red Strobe"),
    (EffectMode(0x32), "Green Strobe"),
    (EffectMode::STROBE_BLUE, "Blue Strobe"),
    (EffectMode(0x34), "Yellow Strobe"),
    (EffectMode(0x35), "Cyan Strobe"),
    (EffectMode(0x36), "Purple Strobe"),
    (EffectMode::STROBE_WHITE, "White Strobe"),
    (EffectMode(0x38), "Rainbow Jump"),
    (EffectMode(0x39), "RGB Pulsating"),
    (EffectMode(0x3A), "RGB Jump"),
];

impl EffectMode {
    /// Lowest known mode id.
    pub const MIN: u8 = 0x24;
    /// Highest known mode id.
    pub const MAX: u8 = 0x3A;

    /// Normal (static) output.
    ///
    /// Sent through [`Command::VendorMode`](crate::Command::VendorMode) it
    /// still counts as a running mode and is re-asserted on every beat. Use
    /// [`Command::StaticColor`](crate::Command::StaticColor) for steady
    /// output.
    pub const NORMAL: Self = Self(0x24);
    /// Pulsating rainbow.
    pub const PULSE_RAINBOW: Self = Self(0x25);
    /// Pulsating red.
    pub const PULSE_RED: Self = Self(0x26);
    /// Pulsating green.
    pub const PULSE_GREEN: Self = Self(0x27);
    /// Pulsating blue.
    pub const PULSE_BLUE: Self = Self(0x28);
    /// Pulsating yellow.
    pub const PULSE_YELLOW: Self = Self(0x29);
    /// Pulsating cyan.
    pub const PULSE_CYAN: Self = Self(0x2A);
    /// Pulsating purple.
    pub const PULSE_PURPLE: Self = Self(0x2B);
    /// Pulsating white.
    pub const PULSE_WHITE: Self = Self(0x2C);
    /// Rainbow strobe.
    pub const STROBE_RAINBOW: Self = Self(0x30);
    /// Red strobe.
    pub const STROBE_RED: Self = Self(0x31);
    /// Blue strobe.
    pub const STROBE_BLUE: Self = Self(0x33);
    /// White strobe.
    pub const STROBE_WHITE: Self = Self(0x37);

    /// Creates a mode from its id.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` for ids outside 0x24-0x3A.
    pub fn new(id: u8) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&id) {
            return Err(ValueError::OutOfRange {
                name: "mode id",
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX),
                actual: u16::from(id),
            });
        }
        Ok(Self(id))
    }

    /// Returns the mode id byte.
    #[must_use]
    pub const fn id(&self) -> u8 {
        self.0
    }

    /// Returns the display name of the mode.
    #[must_use]
    pub fn name(&self) -> &'static str {
        CATALOG
            .iter()
            .find(|(mode, _)| mode == self)
            .map_or("Unknown", |(_, name)| name)
    }

    /// Returns every known mode with its display name.
    #[must_use]
    pub fn catalog() -> &'static [(Self, &'static str)] {
        &CATALOG
    }
}

impl fmt::Display for EffectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.0)
    }
}

impl TryFrom<u8> for EffectMode {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
