// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed device snapshots.
//!
//! The backend relays device records as loosely shaped JSON: field names vary
//! by device family and firmware, flags arrive as `"ON"`, `1` or `true`, and
//! any field may be missing. [`DeviceSnapshot::from_json`] is the single
//! place that copes with this. Everything downstream works on typed fields
//! where `None` means "not reported".
//!
//! # Examples
//!
//! ```
//! use iotdash::snapshot::DeviceSnapshot;
//! use iotdash::types::{Channel, RelayState};
//!
//! let json = serde_json::json!({
//!     "topic": "site4/light12",
//!     "response": "site4/light12/ack",
//!     "RELAY": 1,
//!     "AUTO_R": "OFF",
//!     "temperature": "27.5"
//! });
//!
//! let snapshot = DeviceSnapshot::from_json(&json);
//! assert_eq!(snapshot.control().relay(Channel::R), Some(RelayState::On));
//! assert_eq!(snapshot.control().auto(Channel::R), Some(false));
//! assert_eq!(snapshot.readings().temperature, Some(27.5));
//! assert_eq!(snapshot.route().unwrap().topic(), "site4/light12");
//! ```

mod normalize;

pub(crate) use normalize::{
    FAMILY_KEYS, NAME_KEYS, first, first_flag, first_number, first_string, online_flag,
    parse_number, parse_string,
};

use serde::{Deserialize, Serialize};

use crate::state::ControlState;
use crate::types::{Channel, DeviceFamily};

/// Routing identifiers assigned by the backend to one physical device.
///
/// Commands are published on the topic; the device acknowledges on the
/// response channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    topic: String,
    response: String,
}

impl Route {
    /// Creates a route from a topic and response channel.
    #[must_use]
    pub fn new(topic: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            response: response.into(),
        }
    }

    /// Returns the command topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the response channel.
    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }
}

/// Sensor readings carried alongside the control fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    /// Ambient temperature in °C.
    pub temperature: Option<f64>,
    /// Relative humidity in %.
    pub humidity: Option<f64>,
    /// Instantaneous power draw in watts.
    pub power: Option<f64>,
    /// Cumulative energy in kWh.
    pub energy: Option<f64>,
}

impl Readings {
    /// Returns `true` if no reading is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.humidity.is_none()
            && self.power.is_none()
            && self.energy.is_none()
    }
}

/// One entry of a device's on/off schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Switch-on time as reported (usually `HH:MM`).
    pub on: Option<String>,
    /// Switch-off time as reported.
    pub off: Option<String>,
    /// Channel the entry applies to, if the device reports one.
    pub channel: Option<Channel>,
    /// Whether the entry is active.
    pub enabled: Option<bool>,
}

/// A point-in-time read of device-reported fields.
///
/// Snapshots are never merged with each other; the newest one replaces the
/// previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub(crate) name: Option<String>,
    pub(crate) family: Option<DeviceFamily>,
    pub(crate) online: Option<bool>,
    pub(crate) route: Option<Route>,
    pub(crate) control: ControlState,
    pub(crate) readings: Readings,
    pub(crate) schedule: Vec<ScheduleEntry>,
}

impl DeviceSnapshot {
    /// Returns the device name, if reported.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the device family, if it could be recognized.
    #[must_use]
    pub fn family(&self) -> Option<DeviceFamily> {
        self.family
    }

    /// Returns whether the backend considers the device online.
    #[must_use]
    pub fn online(&self) -> Option<bool> {
        self.online
    }

    /// Returns the command route, if both identifiers were present.
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Returns the reported control fields.
    #[must_use]
    pub fn control(&self) -> &ControlState {
        &self.control
    }

    /// Returns the reported sensor readings.
    #[must_use]
    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    /// Returns the reported schedule entries.
    #[must_use]
    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }
}
