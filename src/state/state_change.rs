// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! A [`StateChange`] is the intent behind a control action. It is applied
//! optimistically to the [`ControlState`](super::ControlState) and then
//! checked against what the device reports, until a report confirms it.
//!
//! # Examples
//!
//! ```
//! use iotdash::state::{ControlState, StateChange};
//! use iotdash::types::{Channel, ControlMode, RelayState};
//!
//! let change = StateChange::mode(Channel::R, ControlMode::ManualOn);
//!
//! // A report carrying only the relay state confirms a manual-on intent
//! let mut report = ControlState::new();
//! report.set_relay(Channel::R, RelayState::On);
//! assert!(change.is_confirmed_by(&report));
//!
//! // An empty report confirms nothing
//! assert!(!change.is_confirmed_by(&ControlState::new()));
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{Channel, ControlMode, Intensity, RelayState, Setpoint};

use super::ControlState;

/// Represents a change in control state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    /// Canonical mode of one channel.
    ///
    /// Manual modes clear the auto flag and set the relay; auto mode only
    /// sets the auto flag.
    Mode {
        /// The line channel.
        channel: Channel,
        /// The new mode.
        mode: ControlMode,
    },

    /// Lighting intensity.
    Intensity(Intensity),

    /// Air-conditioner setpoint.
    Setpoint(Setpoint),
}

impl StateChange {
    /// Creates a mode change.
    #[must_use]
    pub fn mode(channel: Channel, mode: ControlMode) -> Self {
        Self::Mode { channel, mode }
    }

    /// Returns `true` if a device report shows this change took effect.
    ///
    /// The report must carry the field the change targets. For manual modes
    /// the relay state decides, and a missing auto flag is accepted as long
    /// as the report does not claim auto mode.
    #[must_use]
    pub fn is_confirmed_by(&self, report: &ControlState) -> bool {
        match self {
            Self::Mode { channel, mode } => match mode {
                ControlMode::Auto => report.auto(*channel) == Some(true),
                ControlMode::ManualOn => {
                    report.relay(*channel) == Some(RelayState::On)
                        && report.auto(*channel) != Some(true)
                }
                ControlMode::ManualOff => {
                    report.relay(*channel) == Some(RelayState::Off)
                        && report.auto(*channel) != Some(true)
                }
            },
            Self::Intensity(value) => report.intensity() == Some(*value),
            Self::Setpoint(value) => report.setpoint() == Some(*value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(auto: Option<bool>, relay: Option<RelayState>) -> ControlState {
        let mut report = ControlState::new();
        if let Some(enabled) = auto {
            report.set_auto(Channel::R, enabled);
        }
        if let Some(state) = relay {
            report.set_relay(Channel::R, state);
        }
        report
    }

    #[test]
    fn manual_on_rejected_when_device_reports_auto() {
        let change = StateChange::mode(Channel::R, ControlMode::ManualOn);
        assert!(!change.is_confirmed_by(&report_with(Some(true), Some(RelayState::On))));
        assert!(change.is_confirmed_by(&report_with(Some(false), Some(RelayState::On))));
    }

    #[test]
    fn manual_off_needs_relay_off() {
        let change = StateChange::mode(Channel::R, ControlMode::ManualOff);
        assert!(!change.is_confirmed_by(&report_with(Some(false), Some(RelayState::On))));
        assert!(change.is_confirmed_by(&report_with(None, Some(RelayState::Off))));
    }

    #[test]
    fn auto_mode_needs_auto_flag() {
        let change = StateChange::mode(Channel::R, ControlMode::Auto);
        assert!(!change.is_confirmed_by(&report_with(None, Some(RelayState::On))));
        assert!(change.is_confirmed_by(&report_with(Some(true), None)));
    }

    #[test]
    fn setpoint_confirmation() {
        let change = StateChange::Setpoint(Setpoint::new(22).unwrap());
        let mut report = ControlState::new();
        report.set_setpoint(Setpoint::new(23).unwrap());
        assert!(!change.is_confirmed_by(&report));

        report.set_setpoint(Setpoint::new(22).unwrap());
        assert!(change.is_confirmed_by(&report));
    }

    #[test]
    fn intensity_report_ignores_relay() {
        let change = StateChange::Intensity(Intensity::new(80).unwrap());
        let mut report = report_with(None, Some(RelayState::On));
        assert!(!change.is_confirmed_by(&report));

        report.set_intensity(Intensity::new(80).unwrap());
        assert!(change.is_confirmed_by(&report));
    }
}
