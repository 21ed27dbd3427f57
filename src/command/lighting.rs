// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lighting controller commands.

use serde_json::{Map, Value};

use crate::error::ValueError;
use crate::state::StateChange;
use crate::types::{Channel, DeviceFamily};

use super::{Command, ControlIntent, flag, unsupported};

/// Command for a single- or three-phase lighting controller.
///
/// Single-phase controllers only have channel R and use the bare
/// `MANRELAY` key for the relay. Three-phase controllers suffix every relay
/// and auto key with the channel.
///
/// # Examples
///
/// ```
/// use iotdash::command::{Command, ControlIntent, LightingCommand};
/// use iotdash::types::{Channel, RelayState};
///
/// let cmd = LightingCommand::three_phase(ControlIntent::relay(Channel::B, RelayState::Off)).unwrap();
/// let message = cmd.message();
///
/// assert_eq!(message["MANRELAY_B"], "OFF");
/// assert_eq!(message["AUTO_B"], "OFF");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightingCommand {
    intent: ControlIntent,
    three_phase: bool,
}

impl LightingCommand {
    /// Creates a command for a single-phase controller.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnsupportedIntent` for setpoints and for any
    /// channel other than R.
    pub fn single_phase(intent: ControlIntent) -> Result<Self, ValueError> {
        let family = DeviceFamily::Lighting;
        match intent {
            ControlIntent::Setpoint(_) => Err(unsupported(family, &intent)),
            ControlIntent::Relay { channel, .. } | ControlIntent::Auto { channel }
                if channel != Channel::R =>
            {
                Err(unsupported(family, &intent))
            }
            _ => Ok(Self {
                intent,
                three_phase: false,
            }),
        }
    }

    /// Creates a command for a three-phase controller.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnsupportedIntent` for setpoints.
    pub fn three_phase(intent: ControlIntent) -> Result<Self, ValueError> {
        if matches!(intent, ControlIntent::Setpoint(_)) {
            return Err(unsupported(DeviceFamily::ThreePhaseLighting, &intent));
        }
        Ok(Self {
            intent,
            three_phase: true,
        })
    }

    /// Returns the underlying intent.
    #[must_use]
    pub fn control_intent(&self) -> ControlIntent {
        self.intent
    }

    fn relay_key(&self, channel: Channel) -> String {
        if self.three_phase {
            format!("MANRELAY_{}", channel.suffix())
        } else {
            "MANRELAY".to_string()
        }
    }
}

impl Command for LightingCommand {
    fn name(&self) -> String {
        self.intent.label()
    }

    fn message(&self) -> Map<String, Value> {
        let mut message = Map::new();
        match self.intent {
            ControlIntent::Relay { channel, state } => {
                message.insert(self.relay_key(channel), flag(state.is_on()));
                message.insert(format!("AUTO_{}", channel.suffix()), flag(false));
            }
            ControlIntent::Auto { channel } => {
                message.insert(format!("AUTO_{}", channel.suffix()), flag(true));
            }
            ControlIntent::Intensity(value) => {
                message.insert("INTENSITY".to_string(), Value::from(value.value()));
            }
            // Rejected by the constructors
            ControlIntent::Setpoint(_) => {}
        }
        message
    }

    fn intent(&self) -> StateChange {
        self.intent.expected_change()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ControlMode, Intensity, RelayState, Setpoint};

    #[test]
    fn single_phase_manual_relay() {
        let cmd =
            LightingCommand::single_phase(ControlIntent::relay(Channel::R, RelayState::On)).unwrap();
        let message = cmd.message();

        assert_eq!(message.len(), 2);
        assert_eq!(message["MANRELAY"], "ON");
        assert_eq!(message["AUTO_R"], "OFF");
        assert_eq!(
            cmd.intent(),
            StateChange::mode(Channel::R, ControlMode::ManualOn)
        );
    }

    #[test]
    fn single_phase_auto() {
        let cmd = LightingCommand::single_phase(ControlIntent::auto(Channel::R)).unwrap();
        let message = cmd.message();

        assert_eq!(message.len(), 1);
        assert_eq!(message["AUTO_R"], "ON");
    }

    #[test]
    fn single_phase_rejects_other_channels() {
        let result = LightingCommand::single_phase(ControlIntent::auto(Channel::Y));
        assert!(matches!(result, Err(ValueError::UnsupportedIntent { .. })));
    }

    #[test]
    fn intensity_message() {
        let cmd = LightingCommand::single_phase(ControlIntent::Intensity(
            Intensity::new(75).unwrap(),
        ))
        .unwrap();
        assert_eq!(cmd.message()["INTENSITY"], 75);
    }

    #[test]
    fn three_phase_keys_are_suffixed() {
        let cmd = LightingCommand::three_phase(ControlIntent::relay(Channel::Y, RelayState::On))
            .unwrap();
        let message = cmd.message();

        assert_eq!(message["MANRELAY_Y"], "ON");
        assert_eq!(message["AUTO_Y"], "OFF");
        assert!(!message.contains_key("MANRELAY"));

        let auto = LightingCommand::three_phase(ControlIntent::auto(Channel::B)).unwrap();
        assert_eq!(auto.message()["AUTO_B"], "ON");
    }

    #[test]
    fn lighting_rejects_setpoint() {
        let intent = ControlIntent::Setpoint(Setpoint::new(24).unwrap());
        assert!(LightingCommand::single_phase(intent).is_err());
        assert!(LightingCommand::three_phase(intent).is_err());
    }
}
