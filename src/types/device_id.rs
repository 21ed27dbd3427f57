// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier the backend assigns to a device.
///
/// The backend uses opaque strings (database keys, serial numbers). The
/// wrapper keeps them from being mixed up with topics and client ids, and
/// is cheap to clone into events.
///
/// # Examples
///
/// ```
/// use iotdash::types::DeviceId;
///
/// let id = DeviceId::new("64f1c0a2");
/// assert_eq!(id.as_str(), "64f1c0a2");
/// assert_eq!(id.to_string(), "64f1c0a2");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Arc<str>);

impl DeviceId {
    /// Creates a device identifier.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_are_equal() {
        let id = DeviceId::new("light-12");
        let clone = id.clone();
        assert_eq!(id, clone);
        assert_ne!(id, DeviceId::from("light-13"));
    }

    #[test]
    fn debug_format() {
        let id = DeviceId::from(String::from("ac-7"));
        assert_eq!(format!("{id:?}"), "DeviceId(ac-7)");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DeviceId::new("x1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"x1\"");
        let back: DeviceId = serde_json::from_str("\"x1\"").unwrap();
        assert_eq!(back, id);
    }
}
