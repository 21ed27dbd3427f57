// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control session event types.

use crate::reconcile::CommandId;
use crate::state::ControlState;
use crate::types::DeviceId;

/// Banner text shown when a command could not be delivered.
pub const COMMAND_FAILED_NOTICE: &str = "Command failed. Reverting changes...";

/// Banner text shown when a device never confirmed a command.
pub const NOT_REACHABLE_NOTICE: &str = "Device not reachable. Reverting changes...";

/// Why the visible state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    /// A command was applied before the device confirmed it.
    Optimistic,
    /// A device report overwrote the visible state.
    Device,
    /// A failed or unconfirmed command was reverted.
    Rollback,
}

/// Events emitted by a control session.
///
/// The visible state itself is published through the session's watch
/// channel. These events carry the transitions a screen reacts to once,
/// such as banners and redirects.
///
/// # Examples
///
/// ```
/// use iotdash::event::{ControlEvent, NOT_REACHABLE_NOTICE};
/// use iotdash::reconcile::CommandId;
/// use iotdash::types::DeviceId;
///
/// let event = ControlEvent::DeviceNotReachable {
///     device_id: DeviceId::new("light-12"),
///     command: CommandId::new(),
/// };
///
/// assert_eq!(event.notice(), Some(NOT_REACHABLE_NOTICE));
/// assert!(event.is_rollback());
/// ```
#[derive(Debug, Clone)]
pub enum ControlEvent {
    /// The visible control state changed.
    StateChanged {
        /// The device.
        device_id: DeviceId,
        /// The new visible state.
        state: ControlState,
        /// What caused the change.
        source: UpdateSource,
    },

    /// A device report confirmed the pending command.
    CommandConfirmed {
        /// The device.
        device_id: DeviceId,
        /// The confirmed command.
        command: CommandId,
    },

    /// The backend rejected or never received the command. The state was
    /// rolled back.
    CommandFailed {
        /// The device.
        device_id: DeviceId,
        /// The failed command.
        command: CommandId,
        /// Error description for logs.
        error: String,
    },

    /// The device did not confirm the command in time. The state was rolled
    /// back.
    DeviceNotReachable {
        /// The device.
        device_id: DeviceId,
        /// The unconfirmed command.
        command: CommandId,
    },

    /// The backend rejected the session's credentials.
    AuthenticationRequired {
        /// The device whose request was rejected.
        device_id: DeviceId,
    },
}

impl ControlEvent {
    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::StateChanged { device_id, .. }
            | Self::CommandConfirmed { device_id, .. }
            | Self::CommandFailed { device_id, .. }
            | Self::DeviceNotReachable { device_id, .. }
            | Self::AuthenticationRequired { device_id } => device_id,
        }
    }

    /// Returns the banner text for this event, if it has one.
    #[must_use]
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => Some(COMMAND_FAILED_NOTICE),
            Self::DeviceNotReachable { .. } => Some(NOT_REACHABLE_NOTICE),
            _ => None,
        }
    }

    /// Returns `true` if this event reports a rollback.
    #[must_use]
    pub fn is_rollback(&self) -> bool {
        matches!(
            self,
            Self::CommandFailed { .. } | Self::DeviceNotReachable { .. }
        )
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Creates a state changed event.
    #[must_use]
    pub fn state_changed(device_id: DeviceId, state: ControlState, source: UpdateSource) -> Self {
        Self::StateChanged {
            device_id,
            state,
            source,
        }
    }
}
