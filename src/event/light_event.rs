// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light event types.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::command::Command;
use crate::detect::Detection;
use crate::types::ProtocolFamily;

/// Whether a transport write went through.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// The transport accepted the frame.
    Accepted,
    /// The transport reported a failure or timed out.
    Rejected(String),
}

impl WriteOutcome {
    /// Returns true for [`WriteOutcome::Accepted`].
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// One transport write, for offline analysis.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WriteEvent {
    /// Device address.
    pub address: String,
    /// The command that was encoded.
    pub command: Command,
    /// Family the frame was encoded for.
    pub family: ProtocolFamily,
    /// Transport verdict.
    pub outcome: WriteOutcome,
    /// 1 for the first write, 2 for the retry after reconnect.
    ///
    /// 0 marks the wake and probe writes of a new connection. The wake frame
    /// is family-independent and reported with `Unknown`.
    pub attempt: u8,
    /// Time spent in the transport write.
    pub latency: Duration,
    /// Wall-clock time the write finished.
    pub at: DateTime<Utc>,
}

impl WriteEvent {
    /// Returns the latency in whole milliseconds.
    #[must_use]
    pub fn latency_ms(&self) -> u128 {
        self.latency.as_millis()
    }
}

/// Events emitted by the connection pool.
///
/// # Examples
///
/// ```
/// use lightdesk::event::LightEvent;
///
/// let event = LightEvent::Disconnected {
///     address: "AA:BB".to_string(),
///     reason: "stale".to_string(),
/// };
/// assert_eq!(event.address(), "AA:BB");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LightEvent {
    /// A frame was written (or failed to be).
    WriteAttempted(WriteEvent),

    /// A fresh connection is ready for traffic.
    Connected {
        /// Device address.
        address: String,
        /// Family used for this connection.
        family: ProtocolFamily,
        /// What detection concluded; `None` for pinned handles.
        detection: Option<Detection>,
    },

    /// A connection was torn down.
    Disconnected {
        /// Device address.
        address: String,
        /// Why it was torn down.
        reason: String,
    },
}

impl LightEvent {
    /// Returns the device address this event concerns.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::WriteAttempted(write) => &write.address,
            Self::Connected { address, .. } | Self::Disconnected { address, .. } => address,
        }
    }

    /// Returns true for disconnection events.
    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_event_serializes_for_logging() {
        let event = WriteEvent {
            address: "AA".to_string(),
            command: Command::power(true),
            family: ProtocolFamily::Ffe9,
            outcome: WriteOutcome::Rejected("timeout".to_string()),
            attempt: 2,
            latency: Duration::from_millis(12),
            at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["family"], "FFE9_56AA");
        assert_eq!(json["outcome"]["outcome"], "rejected");
        assert_eq!(json["outcome"]["reason"], "timeout");
        assert_eq!(event.latency_ms(), 12);
    }
}
