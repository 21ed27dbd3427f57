// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visible control state of a device screen.

use serde::{Deserialize, Serialize};

use crate::types::{Channel, ControlMode, Intensity, RelayState, Setpoint};

use super::StateChange;

/// Control fields shown on a device screen.
///
/// Every field is optional: `None` means the value is unknown, either because
/// the device never reported it or because the device family lacks it.
/// The [`ControlMode`] of a channel is derived from the auto flag and the
/// relay state and is never stored on its own.
///
/// # Examples
///
/// ```
/// use iotdash::state::ControlState;
/// use iotdash::types::{Channel, ControlMode, RelayState};
///
/// let mut state = ControlState::new();
/// state.set_auto(Channel::R, false);
/// state.set_relay(Channel::R, RelayState::On);
/// assert_eq!(state.mode(Channel::R), Some(ControlMode::ManualOn));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    /// Auto flag per line channel (R, Y, B).
    auto: [Option<bool>; 3],
    /// Relay state per line channel (R, Y, B).
    relay: [Option<RelayState>; 3],
    /// Lighting intensity.
    intensity: Option<Intensity>,
    /// Air-conditioner setpoint.
    setpoint: Option<Setpoint>,
}

impl ControlState {
    /// Creates a new state with every field unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Channels ==========

    /// Gets the auto flag of a channel.
    #[must_use]
    pub fn auto(&self, channel: Channel) -> Option<bool> {
        self.auto[channel.index()]
    }

    /// Sets the auto flag of a channel.
    pub fn set_auto(&mut self, channel: Channel, enabled: bool) {
        self.auto[channel.index()] = Some(enabled);
    }

    /// Gets the relay state of a channel.
    #[must_use]
    pub fn relay(&self, channel: Channel) -> Option<RelayState> {
        self.relay[channel.index()]
    }

    /// Sets the relay state of a channel.
    pub fn set_relay(&mut self, channel: Channel, state: RelayState) {
        self.relay[channel.index()] = Some(state);
    }

    /// Derives the mode of a channel from its auto flag and relay state.
    #[must_use]
    pub fn mode(&self, channel: Channel) -> Option<ControlMode> {
        ControlMode::derive(self.auto(channel), self.relay(channel))
    }

    // ========== Intensity ==========

    /// Gets the lighting intensity.
    #[must_use]
    pub fn intensity(&self) -> Option<Intensity> {
        self.intensity
    }

    /// Sets the lighting intensity.
    pub fn set_intensity(&mut self, value: Intensity) {
        self.intensity = Some(value);
    }

    // ========== Setpoint ==========

    /// Gets the temperature setpoint.
    #[must_use]
    pub fn setpoint(&self) -> Option<Setpoint> {
        self.setpoint
    }

    /// Sets the temperature setpoint.
    pub fn set_setpoint(&mut self, value: Setpoint) {
        self.setpoint = Some(value);
    }

    /// Returns `true` if no field is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    // ========== State Changes ==========

    /// Applies a state change and returns whether the state actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        let before = self.clone();
        match change {
            StateChange::Mode { channel, mode } => match mode {
                ControlMode::Auto => self.set_auto(*channel, true),
                ControlMode::ManualOn => {
                    self.set_auto(*channel, false);
                    self.set_relay(*channel, RelayState::On);
                }
                ControlMode::ManualOff => {
                    self.set_auto(*channel, false);
                    self.set_relay(*channel, RelayState::Off);
                }
            },
            StateChange::Intensity(value) => self.intensity = Some(*value),
            StateChange::Setpoint(value) => self.setpoint = Some(*value),
        }
        *self != before
    }

    /// Copies every known field of `report` over this state.
    ///
    /// Fields the report leaves unknown keep their current value.
    /// Returns `true` if anything changed.
    pub fn overlay(&mut self, report: &Self) -> bool {
        let before = self.clone();

        for channel in Channel::ALL {
            if let Some(enabled) = report.auto(channel) {
                self.set_auto(channel, enabled);
            }
            if let Some(state) = report.relay(channel) {
                self.set_relay(channel, state);
            }
        }
        if let Some(value) = report.intensity {
            self.intensity = Some(value);
        }
        if let Some(value) = report.setpoint {
            self.setpoint = Some(value);
        }

        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_empty() {
        let state = ControlState::new();
        assert!(state.is_empty());
        assert!(state.relay(Channel::R).is_none());
        assert!(state.mode(Channel::R).is_none());
    }

    #[test]
    fn channels_are_independent() {
        let mut state = ControlState::new();
        state.set_relay(Channel::Y, RelayState::On);

        assert_eq!(state.relay(Channel::Y), Some(RelayState::On));
        assert!(state.relay(Channel::R).is_none());
        assert!(state.relay(Channel::B).is_none());
    }

    #[test]
    fn apply_mode_change_sets_flags() {
        let mut state = ControlState::new();
        assert!(state.apply(&StateChange::mode(Channel::R, ControlMode::ManualOn)));
        assert_eq!(state.auto(Channel::R), Some(false));
        assert_eq!(state.relay(Channel::R), Some(RelayState::On));

        // Same change again is a no-op
        assert!(!state.apply(&StateChange::mode(Channel::R, ControlMode::ManualOn)));
    }

    #[test]
    fn apply_auto_mode_keeps_relay() {
        let mut state = ControlState::new();
        state.set_relay(Channel::R, RelayState::Off);

        state.apply(&StateChange::mode(Channel::R, ControlMode::Auto));

        assert_eq!(state.mode(Channel::R), Some(ControlMode::Auto));
        assert_eq!(state.relay(Channel::R), Some(RelayState::Off));
    }

    #[test]
    fn apply_intensity_leaves_channels() {
        let mut state = ControlState::new();
        state.set_relay(Channel::B, RelayState::On);

        assert!(state.apply(&StateChange::Intensity(Intensity::new(40).unwrap())));
        assert_eq!(state.intensity(), Some(Intensity::new(40).unwrap()));
        assert_eq!(state.relay(Channel::B), Some(RelayState::On));
    }

    #[test]
    fn overlay_keeps_fields_missing_from_report() {
        let mut state = ControlState::new();
        state.set_auto(Channel::R, false);
        state.set_relay(Channel::R, RelayState::Off);
        state.set_intensity(Intensity::new(60).unwrap());

        let mut report = ControlState::new();
        report.set_relay(Channel::R, RelayState::On);

        assert!(state.overlay(&report));
        assert_eq!(state.relay(Channel::R), Some(RelayState::On));
        assert_eq!(state.auto(Channel::R), Some(false));
        assert_eq!(state.intensity(), Some(Intensity::new(60).unwrap()));
    }

    #[test]
    fn overlay_with_empty_report_changes_nothing() {
        let mut state = ControlState::new();
        state.set_setpoint(Setpoint::new(24).unwrap());

        assert!(!state.overlay(&ControlState::new()));
        assert_eq!(state.setpoint(), Some(Setpoint::new(24).unwrap()));
    }
}
