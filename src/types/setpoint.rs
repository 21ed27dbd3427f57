// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air-conditioner temperature setpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Temperature setpoint in whole degrees Celsius (16-30).
///
/// IR controllers replay the remote's codes, and the remotes only cover
/// this range.
///
/// # Examples
///
/// ```
/// use iotdash::types::Setpoint;
///
/// let sp = Setpoint::new(24).unwrap();
/// assert_eq!(sp.celsius(), 24);
/// assert_eq!(sp.warmer().celsius(), 25);
/// assert_eq!(Setpoint::MAX.warmer(), Setpoint::MAX);
/// assert!(Setpoint::new(12).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Setpoint(u8);

impl Setpoint {
    /// Coldest supported setpoint.
    pub const MIN: Self = Self(16);

    /// Warmest supported setpoint.
    pub const MAX: Self = Self(30);

    /// Creates a new setpoint.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is outside 16-30.
    pub fn new(celsius: u8) -> Result<Self, ValueError> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&celsius) {
            return Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN.0),
                max: u16::from(Self::MAX.0),
                actual: u16::from(celsius),
            });
        }
        Ok(Self(celsius))
    }

    /// Returns the setpoint in degrees Celsius.
    #[must_use]
    pub const fn celsius(&self) -> u8 {
        self.0
    }

    /// Returns the setpoint one degree warmer, saturating at [`Setpoint::MAX`].
    #[must_use]
    pub const fn warmer(&self) -> Self {
        if self.0 >= Self::MAX.0 { *self } else { Self(self.0 + 1) }
    }

    /// Returns the setpoint one degree cooler, saturating at [`Setpoint::MIN`].
    #[must_use]
    pub const fn cooler(&self) -> Self {
        if self.0 <= Self::MIN.0 { *self } else { Self(self.0 - 1) }
    }
}

impl fmt::Display for Setpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C", self.0)
    }
}

impl TryFrom<u8> for Setpoint {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Setpoint> for u8 {
    fn from(value: Setpoint) -> Self {
        value.0
    }
}
