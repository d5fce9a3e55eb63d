// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol family detection.
//!
//! Controllers silently ignore frames of the wrong family instead of
//! rejecting them, so the only available signal is whether the transport
//! accepted a write. Detection therefore probes each family with a short
//! red/green/blue sequence and picks the first family whose whole sequence
//! went through without a transport error.
//!
//! `FFF3_7EEF` is probed first. The result is a heuristic: a wrong guess is
//! corrected by the next visible color command the user sends.
//!
//! # Examples
//!
//! ```
//! use lightdesk::detect::{Detection, Detector};
//! use lightdesk::types::ProtocolFamily;
//!
//! # async fn example() {
//! let detector = Detector::new();
//! let detection = detector
//!     .detect(|probe| async move {
//!         // write `probe.frame` to the device
//!         let _ = probe.frame;
//!         Ok::<(), lightdesk::transport::TransportError>(())
//!     })
//!     .await;
//! assert_eq!(detection, Detection::Identified(ProtocolFamily::Fff3));
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::command::Command;
use crate::protocol::{Frame, encode};
use crate::transport::TransportError;
use crate::types::{ProtocolFamily, RgbColor};

/// Default pause after each probe write.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Families in probing order.
const PROBE_ORDER: [ProtocolFamily; 2] = [ProtocolFamily::Fff3, ProtocolFamily::Ffe9];

/// Colors of the probe sequence.
const PROBE_COLORS: [RgbColor; 3] = [RgbColor::RED, RgbColor::GREEN, RgbColor::BLUE];

/// Result of a detection run.
///
/// `Unidentified` is a legitimate outcome, not an error: the caller decides
/// which family to assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Detection {
    /// A family's full probe sequence was accepted.
    Identified(ProtocolFamily),
    /// Every probe sequence hit a transport error.
    Unidentified,
}

impl Detection {
    /// Returns the detected family, or `fallback` when unidentified.
    ///
    /// ```
    /// use lightdesk::detect::Detection;
    /// use lightdesk::types::ProtocolFamily;
    ///
    /// assert_eq!(Detection::Unidentified.family_or(ProtocolFamily::Ffe9), ProtocolFamily::Ffe9);
    /// ```
    #[must_use]
    pub const fn family_or(self, fallback: ProtocolFamily) -> ProtocolFamily {
        match self {
            Self::Identified(family) => family,
            Self::Unidentified => fallback,
        }
    }

    /// Returns true if a family was identified.
    #[must_use]
    pub const fn is_identified(&self) -> bool {
        matches!(self, Self::Identified(_))
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identified(family) => write!(f, "{family}"),
            Self::Unidentified => f.write_str("unidentified"),
        }
    }
}

/// One probe write: a color command encoded for the family under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Family being probed.
    pub family: ProtocolFamily,
    /// The color command behind the frame.
    pub command: Command,
    /// Encoded bytes.
    pub frame: Frame,
}

/// Probes a device to find its protocol family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detector {
    settle_delay: Duration,
}

impl Detector {
    /// Creates a detector with the default settle delay.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Sets the pause after each probe write.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Returns the pause after each probe write.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Returns the probes for `family`, in write order.
    ///
    /// Empty for [`ProtocolFamily::Unknown`].
    #[must_use]
    pub fn probes(family: ProtocolFamily) -> Vec<Probe> {
        PROBE_COLORS
            .iter()
            .filter_map(|color| {
                let command = Command::color(*color);
                let frame = encode(&command, family).ok()?;
                Some(Probe {
                    family,
                    command,
                    frame,
                })
            })
            .collect()
    }

    /// Runs the probe sequences through `write` and reports the family.
    ///
    /// `write` sends one probe frame to the device. A family is identified as soon
    /// as all three of its frames are accepted; the first failing write of a
    /// sequence abandons that family.
    pub async fn detect<F, Fut>(&self, mut write: F) -> Detection
    where
        F: FnMut(Probe) -> Fut,
        Fut: Future<Output = Result<(), TransportError>>,
    {
        'families: for family in PROBE_ORDER {
            for probe in Self::probes(family) {
                if let Err(e) = write(probe).await {
                    tracing::debug!(%family, error = %e, "Probe write failed");
                    continue 'families;
                }
                tokio::time::sleep(self.settle_delay).await;
            }
            tracing::debug!(%family, "Probe sequence accepted");
            return Detection::Identified(family);
        }
        Detection::Unidentified
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}
