// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device listing and filtering.
//!
//! The device list screen shows every device the user can see, grouped by
//! client organization and location. [`list_devices`] fetches and
//! normalizes the list; [`DeviceFilter`] narrows it down.
//!
//! # Examples
//!
//! ```
//! use iotdash::fleet::{DeviceFilter, DeviceSummary};
//! use iotdash::types::DeviceFamily;
//!
//! let body = serde_json::json!({"devices": [
//!     {"_id": "a1", "name": "Lobby lights", "deviceType": "lighting", "client": {"name": "Acme"}},
//!     {"_id": "b2", "name": "Server room AC", "deviceType": "IR", "client": "Acme"},
//! ]});
//!
//! let devices = DeviceSummary::list_from_json(&body);
//! let filter = DeviceFilter::new().with_family(DeviceFamily::IrController);
//!
//! let matches: Vec<_> = filter.apply(&devices).collect();
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].id.as_str(), "b2");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::protocol::Backend;
use crate::snapshot::{FAMILY_KEYS, NAME_KEYS, first, first_string, online_flag};
use crate::types::{DeviceFamily, DeviceId};

const LIST_KEYS: &[&str] = &["devices", "data", "items", "results"];
const ID_KEYS: &[&str] = &["_id", "id", "deviceId", "device_id"];
const CLIENT_KEYS: &[&str] = &["client", "clientName", "client_name", "organization", "org"];
const LOCATION_KEYS: &[&str] = &["location", "locationName", "location_name", "site"];
const LABEL_KEYS: &[&str] = &["name", "title", "label"];

/// One row of the device list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Backend id.
    pub id: DeviceId,
    /// Display name. Falls back to the id.
    pub name: String,
    /// Controller family, if recognized.
    pub family: Option<DeviceFamily>,
    /// Client organization name.
    pub client: Option<String>,
    /// Location name.
    pub location: Option<String>,
    /// Online status, if reported.
    pub online: Option<bool>,
}

impl DeviceSummary {
    /// Normalizes one device record. Records without an id are skipped.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        let id = first_string(record, ID_KEYS)?;

        Some(Self {
            name: first_string(record, NAME_KEYS).unwrap_or_else(|| id.clone()),
            id: DeviceId::from(id),
            family: first_string(record, FAMILY_KEYS).and_then(|s| s.parse().ok()),
            client: related_name(record, CLIENT_KEYS),
            location: related_name(record, LOCATION_KEYS),
            online: online_flag(record),
        })
    }

    /// Normalizes a device list response.
    ///
    /// Accepts a bare array or an object wrapping one. Malformed records
    /// are skipped.
    #[must_use]
    pub fn list_from_json(body: &Value) -> Vec<Self> {
        let records = match body {
            Value::Array(items) => Some(items),
            Value::Object(object) => first(object, LIST_KEYS).and_then(Value::as_array),
            _ => None,
        };

        let Some(records) = records else {
            return Vec::new();
        };

        let devices: Vec<Self> = records.iter().filter_map(Self::from_json).collect();
        if devices.len() < records.len() {
            tracing::debug!(
                skipped = records.len() - devices.len(),
                "Skipped device records without an id"
            );
        }
        devices
    }
}

/// Reads a related entity that may be a plain name or a populated object.
fn related_name(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first(record, keys)? {
        Value::Object(inner) => first_string(inner, LABEL_KEYS),
        Value::String(name) if !name.trim().is_empty() => Some(name.trim().to_string()),
        _ => None,
    }
}

/// Criteria for the device list. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    client: Option<String>,
    location: Option<String>,
    family: Option<DeviceFamily>,
    online: Option<bool>,
    text: Option<String>,
}

impl DeviceFilter {
    /// Creates a filter that matches every device.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps devices of the named client (case-insensitive).
    #[must_use]
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Keeps devices at the named location (case-insensitive).
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Keeps devices of one family.
    #[must_use]
    pub fn with_family(mut self, family: DeviceFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Keeps devices with the given online status.
    #[must_use]
    pub fn with_online(mut self, online: bool) -> Self {
        self.online = Some(online);
        self
    }

    /// Keeps devices whose name contains `text` (case-insensitive).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = (!text.trim().is_empty()).then(|| text.trim().to_lowercase());
        self
    }

    /// Returns `true` if `device` meets every set criterion.
    #[must_use]
    pub fn matches(&self, device: &DeviceSummary) -> bool {
        fn same(wanted: Option<&String>, actual: Option<&String>) -> bool {
            wanted.is_none_or(|w| actual.is_some_and(|a| a.eq_ignore_ascii_case(w)))
        }

        same(self.client.as_ref(), device.client.as_ref())
            && same(self.location.as_ref(), device.location.as_ref())
            && self.family.is_none_or(|f| device.family == Some(f))
            && self.online.is_none_or(|o| device.online == Some(o))
            && self
                .text
                .as_ref()
                .is_none_or(|t| device.name.to_lowercase().contains(t))
    }

    /// Returns the matching devices in their original order.
    pub fn apply<'a>(
        &'a self,
        devices: &'a [DeviceSummary],
    ) -> impl Iterator<Item = &'a DeviceSummary> + 'a {
        devices.iter().filter(|d| self.matches(d))
    }
}

/// Fetches and normalizes the device list.
///
/// # Errors
///
/// Returns error if the request fails. Unlike charts, the device list has
/// no empty-state fallback.
pub async fn list_devices<B: Backend>(backend: &B) -> Result<Vec<DeviceSummary>> {
    let body = backend.list_devices().await?;
    Ok(DeviceSummary::list_from_json(&body))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn devices() -> Vec<DeviceSummary> {
        DeviceSummary::list_from_json(&json!([
            {"_id": "1", "name": "Lobby Lights", "type": "lighting",
             "client": {"name": "Acme"}, "location": "HQ", "online": true},
            {"_id": "2", "name": "Yard 3-phase", "type": "3phase",
             "client": "acme", "location": {"name": "Yard"}, "status": "offline"},
            {"id": 3, "deviceName": "Door A", "category": "biometric", "org": "Globex"},
            {"name": "no id"}
        ]))
    }

    #[test]
    fn normalizes_records() {
        let list = devices();
        assert_eq!(list.len(), 3);

        assert_eq!(list[0].client.as_deref(), Some("Acme"));
        assert_eq!(list[0].online, Some(true));
        assert_eq!(list[1].family, Some(DeviceFamily::ThreePhaseLighting));
        assert_eq!(list[1].location.as_deref(), Some("Yard"));
        assert_eq!(list[1].online, Some(false));
        assert_eq!(list[2].id.as_str(), "3");
        assert_eq!(list[2].name, "Door A");
        assert_eq!(list[2].family, Some(DeviceFamily::AccessControl));
        assert_eq!(list[2].online, None);
    }

    #[test]
    fn name_falls_back_to_id() {
        let device = DeviceSummary::from_json(&json!({"deviceId": "x9"})).unwrap();
        assert_eq!(device.name, "x9");
    }

    #[test]
    fn empty_filter_matches_all() {
        let list = devices();
        assert_eq!(DeviceFilter::new().apply(&list).count(), 3);
    }

    #[test]
    fn client_match_ignores_case() {
        let list = devices();
        let filter = DeviceFilter::new().with_client("ACME");
        let ids: Vec<_> = filter
            .apply(&list)
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn criteria_combine() {
        let list = devices();
        let filter = DeviceFilter::new().with_client("acme").with_online(false);
        let ids: Vec<_> = filter.apply(&list).map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["2"]);

        // Unknown online status never matches an online criterion
        let filter = DeviceFilter::new().with_online(true);
        assert!(filter.apply(&list).all(|d| d.online == Some(true)));
    }

    #[test]
    fn text_search() {
        let list = devices();
        let filter = DeviceFilter::new().with_text("  lights ");
        let names: Vec<_> = filter.apply(&list).map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Lobby Lights"]);

        assert_eq!(DeviceFilter::new().with_text("   ").apply(&list).count(), 3);
    }

    #[test]
    fn location_filter() {
        let list = devices();
        let filter = DeviceFilter::new().with_location("yard");
        assert_eq!(filter.apply(&list).count(), 1);
    }
}
