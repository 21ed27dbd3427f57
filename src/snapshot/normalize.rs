// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalization of raw device JSON into [`DeviceSnapshot`].

use serde_json::{Map, Value};

use crate::state::ControlState;
use crate::types::{Channel, DeviceFamily, Intensity, RelayState, Setpoint};

use super::{DeviceSnapshot, Readings, Route, ScheduleEntry};

pub(crate) const NAME_KEYS: &[&str] = &["name", "deviceName", "device_name", "label"];
pub(crate) const FAMILY_KEYS: &[&str] = &["family", "deviceType", "device_type", "type", "category"];
const ONLINE_KEYS: &[&str] = &["online", "isOnline", "is_online", "connected"];
const TOPIC_KEYS: &[&str] = &["topic", "TOPIC", "deviceTopic", "device_topic", "publishTopic"];
const RESPONSE_KEYS: &[&str] = &[
    "response",
    "RESPONSE",
    "responseTopic",
    "response_topic",
    "subscribeTopic",
];
const INTENSITY_KEYS: &[&str] = &["INTENSITY", "intensity", "DIM", "dim", "brightness"];
const SETPOINT_KEYS: &[&str] = &["TEMP", "SET_TEMP", "setTemp", "set_temp", "setpoint", "setPoint"];
const TEMPERATURE_KEYS: &[&str] = &[
    "TEMPERATURE",
    "temperature",
    "roomTemp",
    "room_temp",
    "ambientTemp",
];
const HUMIDITY_KEYS: &[&str] = &["HUMIDITY", "humidity", "hum"];
const POWER_KEYS: &[&str] = &["POWER", "power", "watts", "activePower"];
const ENERGY_KEYS: &[&str] = &["ENERGY", "energy", "kwh", "KWH"];
const SCHEDULE_KEYS: &[&str] = &["schedule", "SCHEDULE", "schedules"];

/// Extra keys for channel R, checked after the channel-suffixed ones.
const PRIMARY_AUTO_KEYS: &[&str] = &["AUTO", "auto", "autoMode", "auto_mode"];
const PRIMARY_RELAY_KEYS: &[&str] = &[
    "RELAY",
    "relay",
    "relayState",
    "relay_state",
    "AC",
    "acPower",
    "ac_power",
];

impl DeviceSnapshot {
    /// Builds a snapshot from a raw device record.
    ///
    /// Accepts the record itself or a `{"data": {...}}` / `{"device": {...}}`
    /// envelope. Unrecognized or malformed fields are left unknown; this
    /// never fails.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(record) = unwrap_record(value) else {
            return Self::default();
        };

        let route = match (
            first_string(record, TOPIC_KEYS),
            first_string(record, RESPONSE_KEYS),
        ) {
            (Some(topic), Some(response)) => Some(Route::new(topic, response)),
            _ => None,
        };

        Self {
            name: first_string(record, NAME_KEYS),
            family: first_string(record, FAMILY_KEYS).and_then(|s| s.parse().ok()),
            online: online_flag(record),
            route,
            control: control_fields(record),
            readings: Readings {
                temperature: first_number(record, TEMPERATURE_KEYS),
                humidity: first_number(record, HUMIDITY_KEYS),
                power: first_number(record, POWER_KEYS),
                energy: first_number(record, ENERGY_KEYS),
            },
            schedule: schedule_entries(record),
        }
    }
}

fn control_fields(record: &Map<String, Value>) -> ControlState {
    let mut control = ControlState::new();

    for channel in Channel::ALL {
        let suffix = channel.suffix();
        let auto_key = format!("AUTO_{suffix}");
        let relay_key = format!("RELAY_{suffix}");
        let manual_key = format!("MANRELAY_{suffix}");

        let mut auto_keys = vec![auto_key.as_str()];
        let mut relay_keys = vec![relay_key.as_str()];
        if channel == Channel::R {
            auto_keys.extend_from_slice(PRIMARY_AUTO_KEYS);
            relay_keys.extend_from_slice(PRIMARY_RELAY_KEYS);
        }
        // The manual-relay flag only stands in when no relay state is reported
        relay_keys.push(manual_key.as_str());
        if channel == Channel::R {
            relay_keys.push("MANRELAY");
        }

        if let Some(enabled) = first_flag(record, &auto_keys) {
            control.set_auto(channel, enabled);
        }
        if let Some(on) = first_flag(record, &relay_keys) {
            control.set_relay(channel, RelayState::from(on));
        }
    }

    if let Some(value) = first_number(record, INTENSITY_KEYS).and_then(to_u8) {
        control.set_intensity(Intensity::clamped(value));
    }
    if let Some(value) = first_number(record, SETPOINT_KEYS)
        .and_then(to_u8)
        .and_then(|v| Setpoint::new(v).ok())
    {
        control.set_setpoint(value);
    }

    control
}

pub(crate) fn online_flag(record: &Map<String, Value>) -> Option<bool> {
    first_flag(record, ONLINE_KEYS).or_else(|| {
        record
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| match s.trim().to_lowercase().as_str() {
                "online" | "active" | "connected" => Some(true),
                "offline" | "inactive" | "disconnected" => Some(false),
                _ => None,
            })
    })
}

fn schedule_entries(record: &Map<String, Value>) -> Vec<ScheduleEntry> {
    let Some(entries) = first(record, SCHEDULE_KEYS).and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| ScheduleEntry {
            on: first_string(entry, &["on", "ON", "start", "onTime", "on_time", "from"]),
            off: first_string(entry, &["off", "OFF", "end", "offTime", "off_time", "to"]),
            channel: first_string(entry, &["channel", "phase", "line"])
                .and_then(|s| s.parse::<Channel>().ok()),
            enabled: first_flag(entry, &["enabled", "active", "status"]),
        })
        .collect()
}

// ========== Shared helpers ==========

/// Returns the record object, descending into a single envelope level.
pub(crate) fn unwrap_record(value: &Value) -> Option<&Map<String, Value>> {
    let object = value.as_object()?;
    for key in ["data", "device", "result"] {
        if let Some(inner) = object.get(key).and_then(Value::as_object) {
            return Some(inner);
        }
    }
    Some(object)
}

/// Returns the first non-null value among `keys`.
pub(crate) fn first<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// Returns the first value among `keys` that reads as a flag.
pub(crate) fn first_flag(record: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(parse_flag)
}

/// Returns the first value among `keys` that reads as a number.
pub(crate) fn first_number(record: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(parse_number)
}

/// Returns the first value among `keys` that reads as a non-empty string.
pub(crate) fn first_string(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(parse_string)
}

/// Reads `"ON"`/`"OFF"`, `1`/`0`, `true`/`false` and their string forms.
pub(crate) fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v.abs() > f64::EPSILON),
        Value::String(s) => s.parse::<RelayState>().ok().map(|state| state.is_on()),
        _ => None,
    }
}

/// Reads a JSON number or a numeric string.
pub(crate) fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// Reads a string, or a number rendered as a string.
pub(crate) fn parse_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(value: f64) -> Option<u8> {
    let rounded = value.round();
    // Safe: range checked before the cast
    (0.0..=255.0).contains(&rounded).then(|| rounded as u8)
}
