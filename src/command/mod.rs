// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device command definitions.
//!
//! A control action starts as a family-agnostic [`ControlIntent`]. The
//! device family turns it into a concrete command whose message uses that
//! family's key vocabulary:
//!
//! | Family | Intent | Message |
//! |--------|--------|---------|
//! | Lighting | relay | `{"MANRELAY": "ON", "AUTO_R": "OFF"}` |
//! | Lighting | auto | `{"AUTO_R": "ON"}` |
//! | Lighting (both) | intensity | `{"INTENSITY": 80}` |
//! | Three-phase | relay on Y | `{"MANRELAY_Y": "ON", "AUTO_Y": "OFF"}` |
//! | Three-phase | auto on B | `{"AUTO_B": "ON"}` |
//! | IR | power | `{"AC": "ON", "AUTO": "OFF"}` |
//! | IR | auto | `{"AUTO": "ON"}` |
//! | IR | setpoint | `{"TEMP": 24}` |
//!
//! The message travels inside a [`CommandEnvelope`] that adds the device's
//! topic and response channel.
//!
//! # Examples
//!
//! ```
//! use iotdash::command::{Command, ControlCommand, ControlIntent};
//! use iotdash::types::{Channel, DeviceFamily, RelayState};
//!
//! let intent = ControlIntent::relay(Channel::R, RelayState::On);
//! let cmd = ControlCommand::for_family(DeviceFamily::Lighting, intent).unwrap();
//!
//! let message = cmd.message();
//! assert_eq!(message["MANRELAY"], "ON");
//! assert_eq!(message["AUTO_R"], "OFF");
//! ```

mod ir;
mod lighting;

pub use ir::IrCommand;
pub use lighting::LightingCommand;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValueError;
use crate::snapshot::Route;
use crate::state::StateChange;
use crate::types::{Channel, ControlMode, DeviceFamily, Intensity, RelayState, Setpoint};

/// A command that can be sent to a device through the backend.
pub trait Command {
    /// Returns a short name for logs, e.g. `"relay R ON"`.
    fn name(&self) -> String;

    /// Returns the device-specific message fields.
    fn message(&self) -> Map<String, Value>;

    /// Returns the state change the device should report once the command
    /// took effect.
    fn intent(&self) -> StateChange;

    /// Wraps the message with routing identifiers.
    fn envelope(&self, route: &Route) -> CommandEnvelope {
        CommandEnvelope {
            topic: route.topic().to_string(),
            response: route.response().to_string(),
            message: self.message(),
        }
    }
}

/// A control action, independent of the device family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlIntent {
    /// Switch a channel manually on or off. Leaves auto mode.
    Relay {
        /// The line channel.
        channel: Channel,
        /// The desired relay state.
        state: RelayState,
    },
    /// Hand a channel back to the device's automatic logic.
    Auto {
        /// The line channel.
        channel: Channel,
    },
    /// Set the lighting intensity.
    Intensity(Intensity),
    /// Set the air-conditioner setpoint.
    Setpoint(Setpoint),
}

impl ControlIntent {
    /// Creates a manual relay intent.
    #[must_use]
    pub const fn relay(channel: Channel, state: RelayState) -> Self {
        Self::Relay { channel, state }
    }

    /// Creates an auto-mode intent.
    #[must_use]
    pub const fn auto(channel: Channel) -> Self {
        Self::Auto { channel }
    }

    /// Returns the state change this intent should produce.
    #[must_use]
    pub fn expected_change(&self) -> StateChange {
        match self {
            Self::Relay { channel, state } => {
                let mode = if state.is_on() {
                    ControlMode::ManualOn
                } else {
                    ControlMode::ManualOff
                };
                StateChange::mode(*channel, mode)
            }
            Self::Auto { channel } => StateChange::mode(*channel, ControlMode::Auto),
            Self::Intensity(value) => StateChange::Intensity(*value),
            Self::Setpoint(value) => StateChange::Setpoint(*value),
        }
    }

    /// Returns a short label for error messages.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Relay { channel, state } => format!("relay {channel} {state}"),
            Self::Auto { channel } => format!("auto mode on {channel}"),
            Self::Intensity(value) => format!("intensity {value}"),
            Self::Setpoint(value) => format!("setpoint {value}"),
        }
    }
}

/// Request body of the command endpoints.
///
/// # Examples
///
/// ```
/// use iotdash::command::{Command, ControlIntent, IrCommand};
/// use iotdash::snapshot::Route;
/// use iotdash::types::Setpoint;
///
/// let cmd = IrCommand::new(ControlIntent::Setpoint(Setpoint::new(24).unwrap())).unwrap();
/// let body = serde_json::to_value(cmd.envelope(&Route::new("ac/7", "ac/7/ack"))).unwrap();
///
/// assert_eq!(body["topic"], "ac/7");
/// assert_eq!(body["response"], "ac/7/ack");
/// assert_eq!(body["message"]["TEMP"], 24);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandEnvelope {
    /// The device's command topic.
    pub topic: String,
    /// The channel the device acknowledges on.
    pub response: String,
    /// Device-specific fields.
    pub message: Map<String, Value>,
}

/// A command for any controllable family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Single- or three-phase lighting controller command.
    Lighting(LightingCommand),
    /// IR air-conditioner command.
    Ir(IrCommand),
}

impl ControlCommand {
    /// Builds the command for `intent` in the vocabulary of `family`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnsupportedIntent` if the family has no control
    /// for the intent, or cannot be controlled at all.
    pub fn for_family(family: DeviceFamily, intent: ControlIntent) -> Result<Self, ValueError> {
        match family {
            DeviceFamily::Lighting => LightingCommand::single_phase(intent).map(Self::Lighting),
            DeviceFamily::ThreePhaseLighting => {
                LightingCommand::three_phase(intent).map(Self::Lighting)
            }
            DeviceFamily::IrController => IrCommand::new(intent).map(Self::Ir),
            DeviceFamily::AccessControl => Err(unsupported(family, &intent)),
        }
    }
}

impl Command for ControlCommand {
    fn name(&self) -> String {
        match self {
            Self::Lighting(cmd) => cmd.name(),
            Self::Ir(cmd) => cmd.name(),
        }
    }

    fn message(&self) -> Map<String, Value> {
        match self {
            Self::Lighting(cmd) => cmd.message(),
            Self::Ir(cmd) => cmd.message(),
        }
    }

    fn intent(&self) -> StateChange {
        match self {
            Self::Lighting(cmd) => cmd.intent(),
            Self::Ir(cmd) => cmd.intent(),
        }
    }
}

pub(crate) fn unsupported(family: DeviceFamily, intent: &ControlIntent) -> ValueError {
    ValueError::UnsupportedIntent {
        family: family.to_string(),
        intent: intent.label(),
    }
}

pub(crate) fn flag(on: bool) -> Value {
    Value::from(RelayState::from(on).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_intent_expects_manual_mode() {
        let intent = ControlIntent::relay(Channel::Y, RelayState::Off);
        assert_eq!(
            intent.expected_change(),
            StateChange::mode(Channel::Y, ControlMode::ManualOff)
        );
    }

    #[test]
    fn auto_intent_expects_auto_mode() {
        assert_eq!(
            ControlIntent::auto(Channel::R).expected_change(),
            StateChange::mode(Channel::R, ControlMode::Auto)
        );
    }

    #[test]
    fn access_control_rejects_every_intent() {
        let result = ControlCommand::for_family(
            DeviceFamily::AccessControl,
            ControlIntent::relay(Channel::R, RelayState::On),
        );
        assert!(matches!(result, Err(ValueError::UnsupportedIntent { .. })));
    }

    #[test]
    fn envelope_carries_route() {
        let cmd = ControlCommand::for_family(
            DeviceFamily::Lighting,
            ControlIntent::relay(Channel::R, RelayState::On),
        )
        .unwrap();
        let envelope = cmd.envelope(&Route::new("t", "r"));

        assert_eq!(envelope.topic, "t");
        assert_eq!(envelope.response, "r");
        assert_eq!(envelope.message, cmd.message());
    }
}
