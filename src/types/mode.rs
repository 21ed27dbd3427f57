// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical control mode.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RelayState;

/// The canonical mode of a controlled channel.
///
/// Devices report separate flags (an auto flag and the relay state). The mode
/// is derived from them with a fixed priority: the auto flag dominates the
/// manual-on state, which dominates manual-off.
///
/// # Examples
///
/// ```
/// use iotdash::types::{ControlMode, RelayState};
///
/// assert_eq!(
///     ControlMode::derive(Some(true), Some(RelayState::On)),
///     Some(ControlMode::Auto)
/// );
/// assert_eq!(
///     ControlMode::derive(Some(false), Some(RelayState::On)),
///     Some(ControlMode::ManualOn)
/// );
/// assert_eq!(
///     ControlMode::derive(Some(false), Some(RelayState::Off)),
///     Some(ControlMode::ManualOff)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlMode {
    /// The device follows its own schedule or sensor logic.
    Auto,
    /// Manually switched on.
    ManualOn,
    /// Manually switched off.
    ManualOff,
}

impl ControlMode {
    /// Derives the mode from the auto flag and the relay state.
    ///
    /// An auto flag of `true` decides the mode on its own. Otherwise both
    /// fields must be known; a missing field yields `None`.
    #[must_use]
    pub fn derive(auto: Option<bool>, relay: Option<RelayState>) -> Option<Self> {
        match (auto, relay) {
            (Some(true), _) => Some(Self::Auto),
            (Some(false), Some(RelayState::On)) => Some(Self::ManualOn),
            (Some(false), Some(RelayState::Off)) => Some(Self::ManualOff),
            _ => None,
        }
    }

    /// Returns the label used by the dashboard.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::ManualOn => "manual-on",
            Self::ManualOff => "manual-off",
        }
    }

    /// Returns `true` for either manual mode.
    #[must_use]
    pub const fn is_manual(&self) -> bool {
        matches!(self, Self::ManualOn | Self::ManualOff)
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
