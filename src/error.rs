// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `lightdesk` library.
//!
//! Every failure that leaves this crate is one of the [`Error`] variants.
//! Transport failures are caught by the connection pool and surface as
//! [`Error::ConnectionLost`]; they never leak as backend error types.
//!
//! Protocol detection that cannot decide on a family is *not* an error:
//! see [`Detection::Unidentified`](crate::detect::Detection::Unidentified).

use thiserror::Error;

use crate::types::ProtocolFamily;

/// The main error type for this library.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A color, speed, mode id or brightness is outside its valid range.
    ///
    /// This is a caller bug and is never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValueError),

    /// The command has no defined encoding for the device's protocol family.
    ///
    /// Surfaced immediately, never retried.
    #[error("{command} is not supported by the {family} protocol")]
    UnsupportedOperation {
        /// Name of the rejected command.
        command: &'static str,
        /// Family the command was encoded against.
        family: ProtocolFamily,
    },

    /// A frame was requested for a device whose family is not known yet.
    #[error("protocol family is unknown; detect it before encoding")]
    UnknownFamily,

    /// The device failed a write, one reconnect and one retried write.
    #[error("connection to {address} lost: {reason}")]
    ConnectionLost {
        /// Transport address of the device.
        address: String,
        /// Description of the last transport failure.
        reason: String,
    },

    /// Scanning for controllers failed.
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("{name} {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// What the value is (speed, mode id, brightness).
        name: &'static str,
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// Invalid hex color format.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),

    /// A protocol family name that is not one of the supported families.
    #[error("unknown protocol family: {0}")]
    UnknownFamily(String),

    /// A stage target name other than `A`, `B` or `A+B`.
    #[error("unknown stage target: {0}")]
    UnknownTarget(String),
}

/// Errors raised while loading a [`LightdeskConfig`](crate::config::LightdeskConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file: {0}")]
    Io(String),

    /// The document is not valid JSON for the config schema.
    #[error("invalid config document: {0}")]
    Parse(String),

    /// A field holds a value the library cannot use.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        message: String,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
