// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor protocol families.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// The byte protocol a controller speaks.
///
/// Families are named after their write characteristic and the
/// header/footer bytes of their color frame.
///
/// # Examples
///
/// ```
/// use lightdesk::types::ProtocolFamily;
///
/// assert_eq!(ProtocolFamily::Ffe9.to_string(), "FFE9_56AA");
/// assert_eq!("FFF3_7EEF".parse::<ProtocolFamily>().unwrap(), ProtocolFamily::Fff3);
/// assert!(!ProtocolFamily::Unknown.is_known());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum ProtocolFamily {
    /// Not detected yet.
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// HappyLighting-style controllers: `56 .. F0 AA` color frames.
    #[serde(rename = "FFE9_56AA")]
    Ffe9,
    /// `7E .. EF` controllers without a separate white channel.
    #[serde(rename = "FFF3_7EEF")]
    Fff3,
}

impl ProtocolFamily {
    /// Returns true for the two concrete families.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns the canonical family name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Ffe9 => "FFE9_56AA",
            Self::Fff3 => "FFF3_7EEF",
        }
    }
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolFamily {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FFE9_56AA" | "FFE9" => Ok(Self::Ffe9),
            "FFF3_7EEF" | "FFF3" => Ok(Self::Fff3),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(ValueError::UnknownFamily(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_short_names() {
        assert_eq!("ffe9".parse::<ProtocolFamily>().unwrap(), ProtocolFamily::Ffe9);
        assert_eq!("FFF3".parse::<ProtocolFamily>().unwrap(), ProtocolFamily::Fff3);
        assert!("56AA".parse::<ProtocolFamily>().is_err());
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&ProtocolFamily::Ffe9).unwrap();
        assert_eq!(json, "\"FFE9_56AA\"");
    }

    #[test]
    fn default_is_unknown() {
        assert_eq!(ProtocolFamily::default(), ProtocolFamily::Unknown);
    }
}
