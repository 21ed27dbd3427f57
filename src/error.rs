// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `iotdash` library.
//!
//! Failures fall into four groups: value validation, backend communication,
//! response parsing, and device-level outcomes such as an unconfirmed command.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the backend.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error reported for a device operation.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Reading or writing a session file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The control session has been unmounted.
    #[error("control session is no longer mounted")]
    Unmounted,
}

impl Error {
    /// Returns `true` if the backend rejected the stored credentials.
    ///
    /// Callers are expected to send the user back to the login screen.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::AuthenticationFailed))
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid relay state string was provided.
    #[error("invalid relay state: {0}")]
    InvalidRelayState(String),

    /// An unknown line channel name was provided.
    #[error("invalid channel: {0}")]
    InvalidChannel(String),

    /// An unknown device family name was provided.
    #[error("invalid device family: {0}")]
    InvalidFamily(String),

    /// An unknown timeframe name was provided.
    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// An unknown analytics metric name was provided.
    #[error("invalid metric: {0}")]
    InvalidMetric(String),

    /// A daily window was requested without a date.
    #[error("daily timeframe requires a date")]
    MissingDate,

    /// The device family has no control for the requested intent.
    #[error("{family} devices do not support {intent}")]
    UnsupportedIntent {
        /// The device family.
        family: String,
        /// The intent that was requested.
        intent: String,
    },
}

/// Errors related to backend communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed before a response arrived.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an unexpected status.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The backend answered 401 or 403.
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Errors related to parsing backend responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to device operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device never echoed the commanded state.
    #[error("device not reachable")]
    NotReachable,

    /// The backend refused the command.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// The device family has no control loop.
    #[error("{0} devices cannot be controlled")]
    NotControllable(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
