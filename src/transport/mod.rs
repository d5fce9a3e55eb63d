// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The platform BLE transport capability.
//!
//! This crate does not implement Bluetooth itself. It drives whatever
//! implements [`Transport`]: scan, connect, find a writable characteristic,
//! write bytes, disconnect. Connect, write and disconnect are the only
//! operations in the crate that suspend.
//!
//! With the `btleplug` feature enabled, [`BtleTransport`] provides a
//! cross-platform implementation on top of the `btleplug` crate.

#[cfg(feature = "btleplug")]
mod btle;

#[cfg(feature = "btleplug")]
pub use btle::BtleTransport;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Identifier of a GATT characteristic.
pub type CharacteristicId = uuid::Uuid;

/// A device seen while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Advertisement {
    /// Advertised local name, if any.
    pub name: Option<String>,
    /// Transport address, stable for the device.
    pub address: String,
}

/// Failures reported by a transport.
///
/// These never leave the crate: the connection pool turns them into
/// [`Error::ConnectionLost`](crate::Error::ConnectionLost).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The operation did not finish in time.
    #[error("{operation} timed out after {} ms", .after.as_millis())]
    Timeout {
        /// What timed out.
        operation: &'static str,
        /// The bound that was exceeded.
        after: Duration,
    },

    /// No device with this address is known to the adapter.
    #[error("device {0} not found")]
    NotFound(String),

    /// The device exposes no characteristic accepting writes.
    #[error("no writable characteristic found")]
    NoWritableCharacteristic,

    /// The session was closed before the operation could run.
    #[error("not connected")]
    NotConnected,

    /// No usable Bluetooth adapter.
    #[error("bluetooth adapter unavailable: {0}")]
    AdapterUnavailable(String),

    /// Any other failure of the underlying stack.
    #[error("bluetooth error: {0}")]
    Ble(String),
}

/// Platform BLE primitives consumed by the connection pool.
///
/// Implementations must be shareable across tasks. All futures are `Send`
/// so pools can be driven from a multi-threaded runtime.
pub trait Transport: Send + Sync {
    /// A live connection to one device.
    type Session: Send + Sync;

    /// Lists advertising devices seen within `timeout`.
    fn scan(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<Advertisement>, TransportError>> + Send;

    /// Opens a connection to the device at `address`.
    fn connect(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Self::Session, TransportError>> + Send;

    /// Finds the first characteristic accepting writes.
    fn discover_writable_characteristic(
        &self,
        session: &Self::Session,
    ) -> impl Future<Output = Result<CharacteristicId, TransportError>> + Send;

    /// Writes `bytes` to `characteristic`.
    ///
    /// With `ack_required == false` this is a write-without-response.
    fn write(
        &self,
        session: &Self::Session,
        characteristic: &CharacteristicId,
        bytes: &[u8],
        ack_required: bool,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Closes the connection. Failures are not reported.
    fn disconnect(&self, session: Self::Session) -> impl Future<Output = ()> + Send;
}
