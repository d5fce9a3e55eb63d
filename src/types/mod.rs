// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for LED controller commands.
//!
//! Each constrained type checks its range at construction time, so a value
//! that made it into one of these types is always encodable.
//!
//! # Types
//!
//! - [`ProtocolFamily`] - Which vendor byte protocol a controller speaks
//! - [`RgbColor`] - 8-bit RGB color with hex parsing
//! - [`Brightness`] - Master brightness (1-100%) applied to static colors
//! - [`Speed`] - Vendor effect speed (1-255, smaller is faster)
//! - [`EffectMode`] - Built-in vendor animation id (0x24-0x3A)

mod brightness;
mod effect_mode;
mod family;
mod rgb_color;
mod speed;

pub use brightness::Brightness;
pub use effect_mode::EffectMode;
pub use family::ProtocolFamily;
pub use rgb_color::RgbColor;
pub use speed::Speed;
