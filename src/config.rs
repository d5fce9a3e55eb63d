// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON-loadable library configuration.
//!
//! Every field is optional; durations are in milliseconds.
//!
//! ```json
//! {
//!   "connect_timeout_ms": 8000,
//!   "write_timeout_ms": 1000,
//!   "staleness_window_ms": 60000,
//!   "probe_settle_ms": 150,
//!   "fallback_family": "FFE9_56AA",
//!   "resync_interval_ms": 10000,
//!   "event_capacity": 256
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detect::Detector;
use crate::dispatch::DispatchConfig;
use crate::error::ConfigError;
use crate::event::EventBus;
use crate::pool::PoolConfig;
use crate::types::ProtocolFamily;

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use lightdesk::config::LightdeskConfig;
///
/// let config = LightdeskConfig::from_json_str(r#"{"write_timeout_ms": 500}"#).unwrap();
/// assert_eq!(config.pool_config().write_timeout, Duration::from_millis(500));
/// assert_eq!(config.pool_config().connect_timeout, Duration::from_secs(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightdeskConfig {
    /// Bound on connect plus characteristic discovery.
    pub connect_timeout_ms: u64,
    /// Bound on one frame write.
    pub write_timeout_ms: u64,
    /// Idle time after which a session is reconnected.
    pub staleness_window_ms: u64,
    /// Pause after each detection probe.
    pub probe_settle_ms: u64,
    /// Family assumed when detection is inconclusive.
    pub fallback_family: ProtocolFamily,
    /// Interval between hard resyncs of a group.
    pub resync_interval_ms: u64,
    /// Capacity of the event bus.
    pub event_capacity: usize,
}

impl LightdeskConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ConfigError::InvalidValue`] for values the library cannot use.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "Loading configuration");
        Self::from_json_str(&json)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("write_timeout_ms", self.write_timeout_ms),
            ("staleness_window_ms", self.staleness_window_ms),
            ("resync_interval_ms", self.resync_interval_ms),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        if !self.fallback_family.is_known() {
            return Err(ConfigError::InvalidValue {
                field: "fallback_family",
                message: "must be FFE9_56AA or FFF3_7EEF".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "event_capacity",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the connection pool configuration.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new()
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_write_timeout(Duration::from_millis(self.write_timeout_ms))
            .with_staleness_window(Duration::from_millis(self.staleness_window_ms))
            .with_fallback_family(self.fallback_family)
            .with_detector(
                Detector::new().with_settle_delay(Duration::from_millis(self.probe_settle_ms)),
            )
    }

    /// Builds the dispatcher configuration.
    #[must_use]
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::new().with_resync_interval(Duration::from_millis(self.resync_interval_ms))
    }

    /// Creates an event bus with the configured capacity.
    #[must_use]
    pub fn event_bus(&self) -> EventBus {
        EventBus::with_capacity(self.event_capacity)
    }
}

impl Default for LightdeskConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 8_000,
            write_timeout_ms: 1_000,
            staleness_window_ms: 60_000,
            probe_settle_ms: 150,
            fallback_family: ProtocolFamily::Ffe9,
            resync_interval_ms: 10_000,
            event_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = LightdeskConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LightdeskConfig::default());
        assert_eq!(config.pool_config(), PoolConfig::default());
        assert_eq!(config.dispatch_config(), DispatchConfig::default());
    }

    #[test]
    fn fields_map_to_component_configs() {
        let config = LightdeskConfig::from_json_str(
            r#"{
                "staleness_window_ms": 30000,
                "probe_settle_ms": 50,
                "fallback_family": "FFF3_7EEF",
                "resync_interval_ms": 4000
            }"#,
        )
        .unwrap();

        let pool = config.pool_config();
        assert_eq!(pool.staleness_window, Duration::from_secs(30));
        assert_eq!(pool.fallback_family, ProtocolFamily::Fff3);
        assert_eq!(pool.detector.settle_delay(), Duration::from_millis(50));
        assert_eq!(
            config.dispatch_config().resync_interval,
            Duration::from_secs(4)
        );
    }

    #[test]
    fn unknown_fallback_is_rejected() {
        let err = LightdeskConfig::from_json_str(r#"{"fallback_family": "UNKNOWN"}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "fallback_family",
                ..
            }
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = LightdeskConfig::from_json_str(r#"{"write_timeout_ms": 0}"#).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                field: "write_timeout_ms",
                message: "must be greater than zero".to_string(),
            }
        );
    }

    #[test]
    fn malformed_documents_are_parse_errors() {
        assert!(matches!(
            LightdeskConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            LightdeskConfig::from_json_str(r#"{"colour": 1}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LightdeskConfig::from_json_file("/nonexistent/lightdesk.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
