// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The outstanding command of a control session.

use std::fmt;

use tokio::time::Instant;
use uuid::Uuid;

use crate::command::CommandEnvelope;
use crate::state::{ControlState, StateChange};

/// Identity of one dispatched command.
///
/// Timers and dispatch continuations carry the id of the command they were
/// armed for and act only if it is still the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(Uuid);

impl CommandId {
    /// Creates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command whose effect has been applied optimistically but not yet
/// confirmed by the device.
#[derive(Debug, Clone)]
pub struct PendingCommand {
    id: CommandId,
    change: StateChange,
    payload: Option<CommandEnvelope>,
    rollback: ControlState,
    issued_at: Instant,
    generation: u64,
}

impl PendingCommand {
    pub(crate) fn new(
        change: StateChange,
        payload: Option<CommandEnvelope>,
        rollback: ControlState,
        generation: u64,
    ) -> Self {
        Self {
            id: CommandId::new(),
            change,
            payload,
            rollback,
            issued_at: Instant::now(),
            generation,
        }
    }

    /// Returns the command id.
    #[must_use]
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Returns the intended state change.
    #[must_use]
    pub fn change(&self) -> &StateChange {
        &self.change
    }

    /// Returns the envelope sent to the device, if the command was built
    /// for one.
    #[must_use]
    pub fn payload(&self) -> Option<&CommandEnvelope> {
        self.payload.as_ref()
    }

    /// Returns the visible state from just before the optimistic update.
    #[must_use]
    pub fn rollback(&self) -> &ControlState {
        &self.rollback
    }

    /// Returns when the command was started.
    #[must_use]
    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// Returns the generation this command opened.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn into_rollback(self) -> ControlState {
        self.rollback
    }
}
