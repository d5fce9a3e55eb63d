// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection pool configuration.

use std::time::Duration;

use crate::detect::Detector;
use crate::types::ProtocolFamily;

/// Default bound on connect + characteristic discovery.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(8);

/// Default bound on a single frame write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default idle time after which a session is no longer trusted.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(60);

/// Configuration of a [`ConnectionPool`](super::ConnectionPool).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use lightdesk::pool::PoolConfig;
/// use lightdesk::types::ProtocolFamily;
///
/// let config = PoolConfig::default()
///     .with_connect_timeout(Duration::from_secs(5))
///     .with_staleness_window(Duration::from_secs(30))
///     .with_fallback_family(ProtocolFamily::Fff3);
///
/// assert_eq!(config.write_timeout, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Bound on connect plus characteristic discovery.
    pub connect_timeout: Duration,
    /// Bound on one frame write.
    pub write_timeout: Duration,
    /// Sessions idle for longer than this are torn down before the next write.
    pub staleness_window: Duration,
    /// Family assumed when detection is inconclusive.
    pub fallback_family: ProtocolFamily,
    /// Detector used on every new connection of an unpinned handle.
    pub detector: Detector,
}

impl PoolConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-write timeout.
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Sets the staleness window.
    #[must_use]
    pub fn with_staleness_window(mut self, window: Duration) -> Self {
        self.staleness_window = window;
        self
    }

    /// Sets the family assumed when detection is inconclusive.
    ///
    /// An `Unknown` fallback is ignored.
    #[must_use]
    pub fn with_fallback_family(mut self, family: ProtocolFamily) -> Self {
        if family.is_known() {
            self.fallback_family = family;
        }
        self
    }

    /// Sets the detector.
    #[must_use]
    pub fn with_detector(mut self, detector: Detector) -> Self {
        self.detector = detector;
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            staleness_window: DEFAULT_STALENESS_WINDOW,
            fallback_family: ProtocolFamily::Ffe9,
            detector: Detector::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(8));
        assert_eq!(config.staleness_window, Duration::from_secs(60));
        assert_eq!(config.fallback_family, ProtocolFamily::Ffe9);
        assert_eq!(config.detector.settle_delay(), Duration::from_millis(150));
    }

    #[test]
    fn unknown_fallback_is_ignored() {
        let config = PoolConfig::new().with_fallback_family(ProtocolFamily::Unknown);
        assert_eq!(config.fallback_family, ProtocolFamily::Ffe9);
    }
}
