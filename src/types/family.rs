// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device family classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

use super::Channel;

/// The kind of controller behind a device record.
///
/// # Examples
///
/// ```
/// use iotdash::types::DeviceFamily;
///
/// let family: DeviceFamily = "3-phase".parse().unwrap();
/// assert_eq!(family, DeviceFamily::ThreePhaseLighting);
/// assert_eq!(family.channels().len(), 3);
/// assert!(!DeviceFamily::AccessControl.is_controllable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceFamily {
    /// Single-phase lighting controller.
    Lighting,
    /// Three-phase lighting controller with R, Y and B lines.
    ThreePhaseLighting,
    /// IR blaster driving an air conditioner.
    IrController,
    /// Access-control terminal; listed but not controlled.
    AccessControl,
}

impl DeviceFamily {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lighting => "lighting",
            Self::ThreePhaseLighting => "three-phase-lighting",
            Self::IrController => "ir-controller",
            Self::AccessControl => "access-control",
        }
    }

    /// Returns the line channels the family can switch.
    #[must_use]
    pub fn channels(&self) -> &'static [Channel] {
        match self {
            Self::ThreePhaseLighting => &Channel::ALL,
            Self::Lighting | Self::IrController => &[Channel::R],
            Self::AccessControl => &[],
        }
    }

    /// Returns `true` if devices of this family accept control commands.
    #[must_use]
    pub const fn is_controllable(&self) -> bool {
        !matches!(self, Self::AccessControl)
    }

    /// Returns `true` for lighting controllers of either phase count.
    #[must_use]
    pub const fn is_lighting(&self) -> bool {
        matches!(self, Self::Lighting | Self::ThreePhaseLighting)
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceFamily {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "lighting" | "light" | "lightingcontroller" | "singlephase" => Ok(Self::Lighting),
            "threephaselighting" | "threephase" | "3phase" | "3phaselighting" => {
                Ok(Self::ThreePhaseLighting)
            }
            "ircontroller" | "ir" | "ac" | "hvac" | "irac" => Ok(Self::IrController),
            "accesscontrol" | "access" | "biometric" | "terminal" => Ok(Self::AccessControl),
            _ => Err(ValueError::InvalidFamily(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_aliases() {
        assert_eq!("Lighting".parse::<DeviceFamily>().unwrap(), DeviceFamily::Lighting);
        assert_eq!(
            "three_phase".parse::<DeviceFamily>().unwrap(),
            DeviceFamily::ThreePhaseLighting
        );
        assert_eq!("IR/AC".parse::<DeviceFamily>().unwrap(), DeviceFamily::IrController);
        assert_eq!(
            "access-control".parse::<DeviceFamily>().unwrap(),
            DeviceFamily::AccessControl
        );
    }

    #[test]
    fn unknown_family() {
        assert!(matches!(
            "toaster".parse::<DeviceFamily>(),
            Err(ValueError::InvalidFamily(_))
        ));
    }

    #[test]
    fn channels_per_family() {
        assert_eq!(DeviceFamily::Lighting.channels(), &[Channel::R]);
        assert!(DeviceFamily::AccessControl.channels().is_empty());
    }

    #[test]
    fn canonical_name_round_trips() {
        for family in [
            DeviceFamily::Lighting,
            DeviceFamily::ThreePhaseLighting,
            DeviceFamily::IrController,
            DeviceFamily::AccessControl,
        ] {
            assert_eq!(family.as_str().parse::<DeviceFamily>().unwrap(), family);
        }
    }
}
