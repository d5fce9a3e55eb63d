// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inferred output mode of a controller.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::command::Command;

/// Which logical output a controller is asserting.
///
/// Controllers offer no read-back, so this is inferred from the last
/// accepted write.
///
/// # Examples
///
/// ```
/// use lightdesk::Command;
/// use lightdesk::state::DeviceMode;
///
/// let mode = DeviceMode::Running(0x37).apply(&Command::static_color(0, 0, 0, 0));
/// assert_eq!(mode, DeviceMode::Static);
///
/// let mode = DeviceMode::Static.apply(&Command::VendorMode { mode_id: 0x26, speed: 5 });
/// assert_eq!(mode, DeviceMode::Running(0x26));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum DeviceMode {
    /// Non-animated output.
    #[default]
    Static,
    /// A vendor animation is running.
    Running(u8),
}

impl DeviceMode {
    /// Returns the mode a device is in after accepting `command`.
    ///
    /// The result depends only on the command, never on the current mode.
    #[must_use]
    pub const fn apply(self, command: &Command) -> Self {
        match command {
            Command::VendorMode { mode_id, .. } => Self::Running(*mode_id),
            Command::StaticColor { .. } | Command::Power { .. } | Command::WarmWhite { .. } => {
                Self::Static
            }
        }
    }

    /// Returns true while a vendor animation is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("static"),
            Self::Running(id) => write!(f, "running(0x{id:02X})"),
        }
    }
}

/// Reports whether a running effect is due to be re-sent.
///
/// Sustained vendor effects should be re-asserted at least once per beat
/// to counter controller-side drift. Scheduling the re-send is up to the
/// caller; this only answers the question.
///
/// ```
/// use std::time::Duration;
/// use lightdesk::state::{DeviceMode, needs_reassertion};
///
/// let beat = Duration::from_millis(500);
/// assert!(needs_reassertion(DeviceMode::Running(0x37), Duration::from_millis(600), beat));
/// assert!(!needs_reassertion(DeviceMode::Running(0x37), Duration::from_millis(100), beat));
/// assert!(!needs_reassertion(DeviceMode::Static, Duration::from_secs(10), beat));
/// ```
#[must_use]
pub fn needs_reassertion(
    mode: DeviceMode,
    since_last_write: Duration,
    beat_interval: Duration,
) -> bool {
    mode.is_running() && since_last_write >= beat_interval
}

/// A device mode with a version counter and the time it was last confirmed.
///
/// Only the connection pool records into this, and only after a write was
/// accepted by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedMode {
    mode: DeviceMode,
    version: u64,
    confirmed_at: Option<Instant>,
}

impl TrackedMode {
    /// A fresh tracker: `Static`, version 0, never confirmed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: DeviceMode::Static,
            version: 0,
            confirmed_at: None,
        }
    }

    /// Returns the current mode.
    #[must_use]
    pub const fn mode(&self) -> DeviceMode {
        self.mode
    }

    /// Returns how many times the mode actually changed.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns when the last accepted write was recorded.
    #[must_use]
    pub const fn confirmed_at(&self) -> Option<Instant> {
        self.confirmed_at
    }

    /// Records an accepted write of `command` at `at`.
    ///
    /// Returns true if the mode changed.
    pub fn record(&mut self, command: &Command, at: Instant) -> bool {
        let next = self.mode.apply(command);
        self.confirmed_at = Some(at);
        if next == self.mode {
            return false;
        }
        self.mode = next;
        self.version += 1;
        true
    }

    /// Shorthand for [`needs_reassertion`] using the last confirmation time.
    ///
    /// A mode that was never confirmed is reported as due.
    #[must_use]
    pub fn needs_reassertion(&self, now: Instant, beat_interval: Duration) -> bool {
        let elapsed = self
            .confirmed_at
            .map_or(Duration::MAX, |at| now.saturating_duration_since(at));
        needs_reassertion(self.mode, elapsed, beat_interval)
    }
}

impl Default for TrackedMode {
    fn default() -> Self {
        Self::new()
    }
}
