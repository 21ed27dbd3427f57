// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control state types.
//!
//! [`ControlState`] holds the control fields a device screen shows, while
//! [`StateChange`] is a discrete change that can be applied to it or
//! confirmed by a device report.
//!
//! # Examples
//!
//! ```
//! use iotdash::state::{ControlState, StateChange};
//! use iotdash::types::{Channel, ControlMode, RelayState};
//!
//! let mut state = ControlState::new();
//! let change = StateChange::mode(Channel::R, ControlMode::ManualOn);
//! assert!(state.apply(&change));
//! assert_eq!(state.relay(Channel::R), Some(RelayState::On));
//! ```

mod control_state;
mod state_change;

pub use control_state::ControlState;
pub use state_change::StateChange;
