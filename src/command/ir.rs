// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IR air-conditioner commands.

use serde_json::{Map, Value};

use crate::error::ValueError;
use crate::state::StateChange;
use crate::types::{Channel, DeviceFamily};

use super::{Command, ControlIntent, flag, unsupported};

/// Command for an IR controller driving an air conditioner.
///
/// The controller has a single channel. Power uses the `AC` key, the auto
/// flag the bare `AUTO` key and the setpoint the `TEMP` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrCommand {
    intent: ControlIntent,
}

impl IrCommand {
    /// Creates an IR command.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnsupportedIntent` for intensity and for any
    /// channel other than R.
    pub fn new(intent: ControlIntent) -> Result<Self, ValueError> {
        match intent {
            ControlIntent::Intensity(_) => Err(unsupported(DeviceFamily::IrController, &intent)),
            ControlIntent::Relay { channel, .. } | ControlIntent::Auto { channel }
                if channel != Channel::R =>
            {
                Err(unsupported(DeviceFamily::IrController, &intent))
            }
            _ => Ok(Self { intent }),
        }
    }

    /// Returns the underlying intent.
    #[must_use]
    pub fn control_intent(&self) -> ControlIntent {
        self.intent
    }
}

impl Command for IrCommand {
    fn name(&self) -> String {
        self.intent.label()
    }

    fn message(&self) -> Map<String, Value> {
        let mut message = Map::new();
        match self.intent {
            ControlIntent::Relay { state, .. } => {
                message.insert("AC".to_string(), flag(state.is_on()));
                message.insert("AUTO".to_string(), flag(false));
            }
            ControlIntent::Auto { .. } => {
                message.insert("AUTO".to_string(), flag(true));
            }
            ControlIntent::Setpoint(value) => {
                message.insert("TEMP".to_string(), Value::from(value.celsius()));
            }
            ControlIntent::Intensity(_) => {}
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
    fn power_off_leaves_auto() {
        let cmd = IrCommand::new(ControlIntent::relay(Channel::R, RelayState::Off)).unwrap();
        let message = cmd.message();

        assert_eq!(message["AC"], "OFF");
        assert_eq!(message["AUTO"], "OFF");
        assert_eq!(
            cmd.intent(),
            StateChange::mode(Channel::R, ControlMode::ManualOff)
        );
    }

    #[test]
    fn auto_message() {
        let cmd = IrCommand::new(ControlIntent::auto(Channel::R)).unwrap();
        let message = cmd.message();
        assert_eq!(message.len(), 1);
        assert_eq!(message["AUTO"], "ON");
    }

    #[test]
    fn setpoint_message() {
        let setpoint = Setpoint::new(19).unwrap();
        let cmd = IrCommand::new(ControlIntent::Setpoint(setpoint)).unwrap();

        assert_eq!(cmd.message()["TEMP"], 19);
        assert_eq!(cmd.intent(), StateChange::Setpoint(setpoint));
    }

    #[test]
    fn rejects_intensity_and_extra_channels() {
        assert!(IrCommand::new(ControlIntent::Intensity(Intensity::MAX)).is_err());
        assert!(IrCommand::new(ControlIntent::auto(Channel::B)).is_err());
    }
}
