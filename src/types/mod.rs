// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for device control.
//!
//! Each type checks its range at construction time, so a command built from
//! these values never carries an out-of-range field.
//!
//! # Types
//!
//! - [`RelayState`] - On/Off state of a relay
//! - [`Channel`] - Line channel (R, Y, B) of a lighting controller
//! - [`Intensity`] - Lighting intensity (0-100%)
//! - [`Setpoint`] - Air-conditioner temperature setpoint (16-30 °C)
//! - [`ControlMode`] - Auto / manual-on / manual-off, derived from device flags
//! - [`DeviceFamily`] - Kind of controller behind a device record
//! - [`DeviceId`] - Backend-assigned device identifier

mod device_id;
mod family;
mod intensity;
mod mode;
mod relay;
mod setpoint;

pub use device_id::DeviceId;
pub use family::DeviceFamily;
pub use intensity::Intensity;
pub use mode::ControlMode;
pub use relay::{Channel, RelayState};
pub use setpoint::Setpoint;
