// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backend protocol for the telemetry and command service.
//!
//! The dashboard never talks to devices directly. A backend relays commands
//! to devices by topic and serves device snapshots, the device list and
//! time-series aggregates over HTTP/JSON.
//!
//! # Backends
//!
//! - [`HttpClient`]: the HTTP/JSON backend (feature `http`, on by default)
//! - Any type implementing [`Backend`], e.g. an in-memory fake in tests
//!
//! Backends return raw JSON. Turning loosely shaped records into typed
//! values is left to [`DeviceSnapshot::from_json`](crate::snapshot::DeviceSnapshot::from_json),
//! the analytics normalizer and the fleet normalizer.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpClient, HttpConfig};

use std::future::Future;

use serde_json::Value;

use crate::analytics::SeriesQuery;
use crate::command::CommandEnvelope;
use crate::error::ProtocolError;
use crate::snapshot::DeviceSnapshot;

/// How a command is posted to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DispatchMode {
    /// `POST /device-command`. The result is learned by polling.
    #[default]
    FireAndPoll,
    /// `POST /device-command-with-response`. The backend waits for the
    /// device acknowledgement and echoes it.
    WithResponse,
}

impl DispatchMode {
    /// Returns the endpoint path for this mode.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::FireAndPoll => "/device-command",
            Self::WithResponse => "/device-command-with-response",
        }
    }
}

/// Response from a command endpoint.
#[derive(Debug, Clone, Default)]
pub struct CommandResponse {
    /// The raw response body.
    body: String,
}

impl CommandResponse {
    /// Creates a new command response with the given body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the response as a specific type.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON cannot be parsed into the target type.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, crate::error::ParseError> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }

    /// Returns the device state echoed in the body, if there is any.
    ///
    /// Bodies that are empty, not JSON, or carry no control field yield
    /// `None`.
    #[must_use]
    pub fn echoed_state(&self) -> Option<DeviceSnapshot> {
        let value: Value = serde_json::from_str(&self.body).ok()?;
        if !value.is_object() {
            return None;
        }
        let snapshot = DeviceSnapshot::from_json(&value);
        (!snapshot.control().is_empty()).then_some(snapshot)
    }
}

/// Trait for backends serving device data and relaying commands.
///
/// Methods return `Send` futures so control sessions can drive them from
/// spawned tasks.
pub trait Backend: Send + Sync + 'static {
    /// Fetches one device record (`GET /device/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn fetch_device(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<Value, ProtocolError>> + Send;

    /// Posts a command envelope to the endpoint of `mode`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or is rejected.
    fn send_command(
        &self,
        envelope: &CommandEnvelope,
        mode: DispatchMode,
    ) -> impl Future<Output = Result<CommandResponse, ProtocolError>> + Send;

    /// Fetches a time-series aggregate.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn fetch_series(
        &self,
        query: &SeriesQuery,
    ) -> impl Future<Output = Result<Value, ProtocolError>> + Send;

    /// Fetches the device list (`GET /devices`).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn list_devices(&self) -> impl Future<Output = Result<Value, ProtocolError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, RelayState};

    #[test]
    fn dispatch_paths() {
        assert_eq!(DispatchMode::FireAndPoll.path(), "/device-command");
        assert_eq!(
            DispatchMode::WithResponse.path(),
            "/device-command-with-response"
        );
        assert_eq!(DispatchMode::default(), DispatchMode::FireAndPoll);
    }

    #[test]
    fn echoed_state_from_ack() {
        let response = CommandResponse::new(r#"{"AC":"ON","AUTO":"OFF"}"#);
        let snapshot = response.echoed_state().unwrap();
        assert_eq!(snapshot.control().relay(Channel::R), Some(RelayState::On));
        assert_eq!(snapshot.control().auto(Channel::R), Some(false));
    }

    #[test]
    fn no_echo_for_plain_ack() {
        assert!(CommandResponse::new("").echoed_state().is_none());
        assert!(CommandResponse::new("OK").echoed_state().is_none());
        assert!(
            CommandResponse::new(r#"{"success":true}"#)
                .echoed_state()
                .is_none()
        );
    }
}
