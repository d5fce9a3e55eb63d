// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BLE controller discovery.
//!
//! Scanning returns every advertiser in range: phones, headphones, TVs. The
//! cheap controllers this crate drives advertise a handful of vendor names,
//! so [`scan_lights`] keeps only advertisers whose name looks like one.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(feature = "btleplug")]
//! # async fn example() -> lightdesk::Result<()> {
//! use lightdesk::discovery::{DEFAULT_SCAN_TIMEOUT, scan_lights};
//! use lightdesk::transport::BtleTransport;
//! use lightdesk::LightHandle;
//!
//! let transport = BtleTransport::new()
//!     .await
//!     .map_err(|e| lightdesk::Error::Discovery(e.to_string()))?;
//! let lights = scan_lights(&transport, DEFAULT_SCAN_TIMEOUT).await?;
//!
//! let handles: Vec<LightHandle> = lights.into_iter().map(LightHandle::from).collect();
//! println!("Found {} controllers", handles.len());
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::light::LightInfo;
use crate::transport::Transport;

/// Default scan duration.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(6);

/// Name reported for advertisers without a local name.
pub const UNKNOWN_NAME: &str = "unknown";

/// Advertised names of known controllers.
pub const KNOWN_NAMES: [&str; 11] = [
    "ELK-BLEDOM",
    "Triones",
    "HappyLighting",
    "LEDnetWF",
    "LEDBlue",
    "QHM-SDA0",
    "QHM-S281",
    "QHM",
    "Light",
    "Dream",
    "Flash",
];

/// Substrings that mark a name as a probable controller.
const NAME_HINTS: [&str; 4] = ["LED", "Light", "BLE", "Trion"];

/// Returns true if an advertised `name` looks like an LED controller.
///
/// Matching is case-sensitive.
///
/// ```
/// use lightdesk::discovery::is_likely_controller;
///
/// assert!(is_likely_controller("ELK-BLEDOM"));
/// assert!(is_likely_controller("QHM-0A3C"));
/// assert!(!is_likely_controller("Pixel 8"));
/// ```
#[must_use]
pub fn is_likely_controller(name: &str) -> bool {
    KNOWN_NAMES.contains(&name)
        || name.starts_with("QHM-")
        || NAME_HINTS.iter().any(|hint| name.contains(hint))
}

/// Scans for `timeout` and returns the advertisers that look like controllers.
///
/// Each address is reported once, in the order the transport listed them.
///
/// # Errors
///
/// Returns [`Error::Discovery`] if the transport cannot scan.
pub async fn scan_lights<T: Transport>(transport: &T, timeout: Duration) -> Result<Vec<LightInfo>> {
    let advertisements = transport
        .scan(timeout)
        .await
        .map_err(|e| Error::Discovery(e.to_string()))?;
    let seen = advertisements.len();

    let mut addresses = HashSet::new();
    let lights: Vec<LightInfo> = advertisements
        .into_iter()
        .map(|ad| LightInfo::new(ad.address, ad.name.unwrap_or_else(|| UNKNOWN_NAME.to_string())))
        .filter(|info| is_likely_controller(&info.name))
        .filter(|info| addresses.insert(info.address.clone()))
        .collect();

    tracing::info!(seen, found = lights.len(), "Scan complete");
    Ok(lights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_match() {
        for name in KNOWN_NAMES {
            assert!(is_likely_controller(name), "{name}");
        }
    }

    #[test]
    fn hints_match_anywhere() {
        assert!(is_likely_controller("MyLEDStrip"));
        assert!(is_likely_controller("Desk Light 2"));
        assert!(is_likely_controller("Triones-A1"));
        assert!(is_likely_controller("BLE_RGB"));
    }

    #[test]
    fn other_names_are_rejected() {
        assert!(!is_likely_controller(UNKNOWN_NAME));
        assert!(!is_likely_controller("led strip"));
        assert!(!is_likely_controller("JBL Flip 5"));
        assert!(!is_likely_controller(""));
    }
}
