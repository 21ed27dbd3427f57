// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay state and line channel types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Represents the state of a relay.
///
/// # Examples
///
/// ```
/// use iotdash::types::RelayState;
///
/// assert_eq!(RelayState::On.as_str(), "ON");
/// assert_eq!("0".parse::<RelayState>().unwrap(), RelayState::Off);
/// assert_eq!(RelayState::from(true), RelayState::On);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayState {
    /// Relay is open.
    Off,
    /// Relay is closed.
    On,
}

impl RelayState {
    /// Returns the wire representation used in command messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns `true` if the relay is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }

    /// Returns the opposite state.
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelayState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OFF" | "0" | "FALSE" => Ok(Self::Off),
            "ON" | "1" | "TRUE" => Ok(Self::On),
            _ => Err(ValueError::InvalidRelayState(s.to_string())),
        }
    }
}

impl From<bool> for RelayState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// A line channel of a lighting controller.
///
/// Three-phase controllers switch each line (R, Y, B) independently.
/// Single-phase controllers and IR controllers only use [`Channel::R`].
///
/// # Examples
///
/// ```
/// use iotdash::types::Channel;
///
/// assert_eq!(Channel::Y.suffix(), "Y");
/// assert_eq!(Channel::B.index(), 2);
/// assert_eq!("r".parse::<Channel>().unwrap(), Channel::R);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Channel {
    /// Red line; the only channel of a single-phase device.
    #[default]
    R,
    /// Yellow line.
    Y,
    /// Blue line.
    B,
}

impl Channel {
    /// All channels in line order.
    pub const ALL: [Self; 3] = [Self::R, Self::Y, Self::B];

    /// Returns the zero-based position of the channel.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::R => 0,
            Self::Y => 1,
            Self::B => 2,
        }
    }

    /// Returns the key suffix used by the backend (`AUTO_R`, `MANRELAY_Y`, ...).
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::R => "R",
            Self::Y => "Y",
            Self::B => "B",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl FromStr for Channel {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "R" | "RED" => Ok(Self::R),
            "Y" | "YELLOW" => Ok(Self::Y),
            "B" | "BLUE" => Ok(Self::B),
            _ => Err(ValueError::InvalidChannel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_state_from_str() {
        assert_eq!("ON".parse::<RelayState>().unwrap(), RelayState::On);
        assert_eq!("off".parse::<RelayState>().unwrap(), RelayState::Off);
        assert_eq!("1".parse::<RelayState>().unwrap(), RelayState::On);
        assert_eq!(" true ".parse::<RelayState>().unwrap(), RelayState::On);
        assert_eq!("false".parse::<RelayState>().unwrap(), RelayState::Off);
    }

    #[test]
    fn relay_state_from_str_invalid() {
        let result = "dim".parse::<RelayState>();
        assert!(matches!(result, Err(ValueError::InvalidRelayState(_))));
    }

    #[test]
    fn relay_state_toggle() {
        assert_eq!(RelayState::On.toggled(), RelayState::Off);
        assert_eq!(RelayState::Off.toggled(), RelayState::On);
        assert!(RelayState::On.is_on());
    }

    #[test]
    fn channel_indices_follow_line_order() {
        let indices: Vec<usize> = Channel::ALL.iter().map(Channel::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn channel_from_str() {
        assert_eq!("yellow".parse::<Channel>().unwrap(), Channel::Y);
        assert_eq!("B".parse::<Channel>().unwrap(), Channel::B);
        assert!("G".parse::<Channel>().is_err());
    }
}
