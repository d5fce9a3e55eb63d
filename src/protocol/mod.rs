// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame codec for the two vendor protocol families.
//!
//! [`encode`] maps a [`Command`] to the exact bytes a controller of a given
//! [`ProtocolFamily`] expects. The codec is pure: no state, no I/O, no
//! allocation.
//!
//! # Wire formats
//!
//! | Command | `FFE9_56AA` | `FFF3_7EEF` |
//! |---------|-------------|-------------|
//! | `StaticColor` | `56 R G B W F0 AA` | `7E 00 05 R G B 00 00 EF` |
//! | `VendorMode` | `BB M S 44` | unsupported |
//! | `Power` | `CC 23/24 33` | `CC 23/24 33` |
//! | `WarmWhite` | `56 00 00 00 W 0F AA` | unsupported |
//!
//! `FFF3_7EEF` has no white channel; the warm-white byte of a static color
//! is dropped. Some `FFF3_7EEF` units ignore the power frame, which is
//! harmless.
//!
//! # Examples
//!
//! ```
//! use lightdesk::Command;
//! use lightdesk::protocol::encode;
//! use lightdesk::types::ProtocolFamily;
//!
//! let frame = encode(&Command::static_color(255, 0, 0, 0), ProtocolFamily::Ffe9).unwrap();
//! assert_eq!(frame.as_bytes(), &[0x56, 0xFF, 0x00, 0x00, 0x00, 0xF0, 0xAA]);
//! ```

mod frame;

pub use frame::{Frame, MAX_FRAME_LEN};

use crate::command::Command;
use crate::error::Error;
use crate::types::{EffectMode, ProtocolFamily, Speed};

/// Power frame header.
const POWER_HEADER: u8 = 0xCC;
const POWER_ON: u8 = 0x23;
const POWER_OFF: u8 = 0x24;
const POWER_FOOTER: u8 = 0x33;

/// `FFE9_56AA` static frame header/footer and channel selectors.
const RGB_HEADER: u8 = 0x56;
const RGB_SELECT: u8 = 0xF0;
const WHITE_SELECT: u8 = 0x0F;
const RGB_FOOTER: u8 = 0xAA;

/// `FFE9_56AA` vendor mode frame header/footer.
const MODE_HEADER: u8 = 0xBB;
const MODE_FOOTER: u8 = 0x44;

/// `FFF3_7EEF` color frame header/footer.
const FFF3_HEADER: u8 = 0x7E;
const FFF3_COLOR_LEN: u8 = 0x05;
const FFF3_FOOTER: u8 = 0xEF;

/// Encodes a command for a device of the given family.
///
/// # Errors
///
/// - [`Error::UnknownFamily`] if `family` is [`ProtocolFamily::Unknown`]
/// - [`Error::InvalidArgument`] for an out-of-range mode id or speed
/// - [`Error::UnsupportedOperation`] for a command the family cannot express
pub fn encode(command: &Command, family: ProtocolFamily) -> Result<Frame, Error> {
    match (family, *command) {
        (ProtocolFamily::Unknown, _) => Err(Error::UnknownFamily),

        (_, Command::Power { on }) => Ok(power_frame(on)),

        (
            ProtocolFamily::Ffe9,
            Command::StaticColor {
                r,
                g,
                b,
                warm_white,
            },
        ) => Ok(Frame::new([
            RGB_HEADER, r, g, b, warm_white, RGB_SELECT, RGB_FOOTER,
        ])),
        (ProtocolFamily::Fff3, Command::StaticColor { r, g, b, .. }) => {
            Ok(fff3_color_frame(r, g, b))
        }

        (ProtocolFamily::Ffe9, Command::VendorMode { mode_id, speed }) => {
            let mode = EffectMode::new(mode_id)?;
            let speed = Speed::new(speed)?;
            Ok(Frame::new([MODE_HEADER, mode.id(), speed.value(), MODE_FOOTER]))
        }

        (ProtocolFamily::Ffe9, Command::WarmWhite { level }) => Ok(Frame::new([
            RGB_HEADER,
            0x00,
            0x00,
            0x00,
            level,
            WHITE_SELECT,
            RGB_FOOTER,
        ])),

        (ProtocolFamily::Fff3, cmd @ (Command::VendorMode { .. } | Command::WarmWhite { .. })) => {
            // Range errors still win over the unsupported combination
            cmd.validate()?;
            Err(Error::UnsupportedOperation {
                command: cmd.name(),
                family,
            })
        }
    }
}

/// Builds the power frame, valid for every family.
#[must_use]
pub const fn power_frame(on: bool) -> Frame {
    Frame::new([
        POWER_HEADER,
        if on { POWER_ON } else { POWER_OFF },
        POWER_FOOTER,
    ])
}

/// Builds the `FFF3_7EEF` static color frame.
///
/// Also used as the probe frame during protocol detection.
#[must_use]
pub const fn fff3_color_frame(r: u8, g: u8, b: u8) -> Frame {
    Frame::new([
        FFF3_HEADER,
        0x00,
        FFF3_COLOR_LEN,
        r,
        g,
        b,
        0x00,
        0x00,
        FFF3_FOOTER,
    ])
}
