// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Optimistic update and reconciliation state machine.

use crate::command::CommandEnvelope;
use crate::error::Error;
use crate::snapshot::DeviceSnapshot;
use crate::state::{ControlState, StateChange};

use super::{CommandId, PendingCommand};

/// Resting phase of a control session.
#[derive(Debug, Clone, Default)]
pub enum Phase {
    /// No outstanding command. Polls overwrite the visible state.
    #[default]
    Idle,
    /// A command is applied optimistically and awaits confirmation.
    CommandPending(PendingCommand),
}

impl Phase {
    /// Returns `true` if a command is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::CommandPending(_))
    }

    /// Returns the outstanding command, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingCommand> {
        match self {
            Self::Idle => None,
            Self::CommandPending(pending) => Some(pending),
        }
    }
}

/// How an outstanding command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A device report matched the intent.
    Confirmed(CommandId),
    /// No confirmation arrived in time; the state was rolled back.
    TimedOut(CommandId),
    /// The backend rejected or never received the command; the state was
    /// rolled back.
    Failed(CommandId),
    /// A newer command replaced it before it resolved.
    Superseded(CommandId),
}

impl Resolution {
    /// Returns the id of the resolved command.
    #[must_use]
    pub fn id(&self) -> CommandId {
        match self {
            Self::Confirmed(id) | Self::TimedOut(id) | Self::Failed(id) | Self::Superseded(id) => {
                *id
            }
        }
    }

    /// Returns `true` if the visible state was rolled back.
    #[must_use]
    pub fn rolled_back(&self) -> bool {
        matches!(self, Self::TimedOut(_) | Self::Failed(_))
    }
}

/// Result of starting a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Started {
    /// Id of the new command.
    pub id: CommandId,
    /// Command that was still pending and got replaced.
    pub superseded: Option<CommandId>,
}

/// Marks the generation a poll was issued under.
///
/// Obtained from [`Reconciler::poll_started`] before the request goes out and
/// handed back to [`Reconciler::merge`] with the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket {
    generation: u64,
}

impl PollTicket {
    /// Returns the generation the poll was issued under.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of merging a device snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Idle, and the device reported different values; the visible state now
    /// matches the device.
    Updated,
    /// Idle, and the device agreed with the visible state.
    Unchanged,
    /// The snapshot confirmed the pending command.
    Confirmed(CommandId),
    /// A command is pending and the snapshot does not confirm it yet. The
    /// visible state was left alone.
    Deferred,
    /// A command started after the poll was issued. Discarded.
    Stale,
    /// The session is gone. Discarded.
    Unmounted,
}

/// Per-session reconciliation state machine.
///
/// The reconciler is synchronous. The control session calls it from its
/// tasks while holding the session lock, so every transition is atomic with
/// respect to the others.
///
/// Every started command bumps a generation counter. Polls remember the
/// generation they were issued under, and a poll whose generation is behind
/// is discarded when it resolves. This keeps a slow periodic poll from undoing
/// a newer optimistic update.
///
/// # Examples
///
/// ```
/// use iotdash::reconcile::{MergeOutcome, Reconciler};
/// use iotdash::snapshot::DeviceSnapshot;
/// use iotdash::state::{ControlState, StateChange};
/// use iotdash::types::{Channel, ControlMode, RelayState};
///
/// let mut reconciler = Reconciler::new(ControlState::new());
///
/// let stale_poll = reconciler.poll_started();
/// let started = reconciler
///     .begin(StateChange::mode(Channel::R, ControlMode::ManualOn))
///     .unwrap();
/// assert_eq!(reconciler.state().relay(Channel::R), Some(RelayState::On));
///
/// // A poll issued before the command cannot touch its optimistic state
/// let old = DeviceSnapshot::from_json(&serde_json::json!({"RELAY": 0}));
/// assert_eq!(reconciler.merge(stale_poll, old), MergeOutcome::Stale);
///
/// // A fresh poll showing the relay on confirms the command
/// let ticket = reconciler.poll_started();
/// let fresh = DeviceSnapshot::from_json(&serde_json::json!({"RELAY": 1, "AUTO_R": 0}));
/// assert_eq!(reconciler.merge(ticket, fresh), MergeOutcome::Confirmed(started.id));
///
/// // A late timeout for the confirmed command does nothing
/// assert!(reconciler.timeout(started.id).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Reconciler {
    state: ControlState,
    phase: Phase,
    generation: u64,
    latest: Option<DeviceSnapshot>,
    alive: bool,
}

impl Reconciler {
    /// Creates a reconciler showing `initial`.
    #[must_use]
    pub fn new(initial: ControlState) -> Self {
        Self {
            state: initial,
            phase: Phase::Idle,
            generation: 0,
            latest: None,
            alive: true,
        }
    }

    /// Creates a reconciler seeded from the mount-time snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: DeviceSnapshot) -> Self {
        let mut reconciler = Self::new(snapshot.control().clone());
        reconciler.latest = Some(snapshot);
        reconciler
    }

    // ========== Accessors ==========

    /// Returns the visible control state.
    #[must_use]
    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Returns the outstanding command, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingCommand> {
        self.phase.pending()
    }

    /// Returns the current command generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the newest snapshot that was not discarded.
    #[must_use]
    pub fn latest(&self) -> Option<&DeviceSnapshot> {
        self.latest.as_ref()
    }

    /// Returns `false` once the session has been unmounted.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    // ========== Transitions ==========

    /// Starts a command: applies `change` optimistically and makes it the
    /// pending command.
    ///
    /// A command that is still pending is replaced. The rollback snapshot of
    /// the new command is the visible state right before this call.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unmounted` after [`unmount`](Self::unmount).
    pub fn begin(&mut self, change: StateChange) -> Result<Started, Error> {
        self.start(change, None)
    }

    /// Like [`begin`](Self::begin), and records the envelope sent for the
    /// command on the pending entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unmounted` after [`unmount`](Self::unmount).
    pub fn begin_sending(
        &mut self,
        change: StateChange,
        payload: CommandEnvelope,
    ) -> Result<Started, Error> {
        self.start(change, Some(payload))
    }

    fn start(
        &mut self,
        change: StateChange,
        payload: Option<CommandEnvelope>,
    ) -> Result<Started, Error> {
        if !self.alive {
            return Err(Error::Unmounted);
        }

        self.generation += 1;
        let rollback = self.state.clone();
        self.state.apply(&change);

        let pending = PendingCommand::new(change, payload, rollback, self.generation);
        let id = pending.id();
        let superseded = match std::mem::replace(&mut self.phase, Phase::CommandPending(pending)) {
            Phase::CommandPending(previous) => Some(previous.id()),
            Phase::Idle => None,
        };

        Ok(Started { id, superseded })
    }

    /// Rolls back the command `id` because its dispatch failed.
    ///
    /// Returns `None` if `id` is no longer the pending command.
    pub fn dispatch_failed(&mut self, id: CommandId) -> Option<Resolution> {
        self.roll_back(id).then_some(Resolution::Failed(id))
    }

    /// Rolls back the command `id` because it was not confirmed in time.
    ///
    /// Returns `None` if `id` is no longer the pending command, so a timer
    /// firing after confirmation is a no-op.
    pub fn timeout(&mut self, id: CommandId) -> Option<Resolution> {
        self.roll_back(id).then_some(Resolution::TimedOut(id))
    }

    fn roll_back(&mut self, id: CommandId) -> bool {
        if !self.alive || self.pending().map(PendingCommand::id) != Some(id) {
            return false;
        }
        if let Phase::CommandPending(pending) = std::mem::take(&mut self.phase) {
            self.state = pending.into_rollback();
        }
        true
    }

    /// Records that a poll is being issued.
    #[must_use]
    pub fn poll_started(&self) -> PollTicket {
        PollTicket {
            generation: self.generation,
        }
    }

    /// Merges a snapshot returned by the poll identified by `ticket`.
    ///
    /// While idle, every field the snapshot reports overwrites the visible
    /// state. While a command is pending, the snapshot either confirms it or
    /// leaves the visible state alone.
    pub fn merge(&mut self, ticket: PollTicket, snapshot: DeviceSnapshot) -> MergeOutcome {
        if !self.alive {
            return MergeOutcome::Unmounted;
        }
        if ticket.generation != self.generation {
            return MergeOutcome::Stale;
        }

        let outcome = match &self.phase {
            Phase::CommandPending(pending) => {
                if pending.change().is_confirmed_by(snapshot.control()) {
                    let id = pending.id();
                    self.phase = Phase::Idle;
                    self.state.overlay(snapshot.control());
                    MergeOutcome::Confirmed(id)
                } else {
                    MergeOutcome::Deferred
                }
            }
            Phase::Idle => {
                if self.state.overlay(snapshot.control()) {
                    MergeOutcome::Updated
                } else {
                    MergeOutcome::Unchanged
                }
            }
        };

        self.latest = Some(snapshot);
        outcome
    }

    /// Marks the session dead and drops the pending command.
    ///
    /// Every later transition is a no-op.
    pub fn unmount(&mut self) {
        self.alive = false;
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{Channel, ControlMode, Intensity, RelayState};

    fn relay_off() -> ControlState {
        let mut state = ControlState::new();
        state.set_auto(Channel::R, false);
        state.set_relay(Channel::R, RelayState::Off);
        state
    }

    fn manual_on() -> StateChange {
        StateChange::mode(Channel::R, ControlMode::ManualOn)
    }

    fn snapshot(value: &serde_json::Value) -> DeviceSnapshot {
        DeviceSnapshot::from_json(value)
    }

    #[test]
    fn begin_applies_optimistic_state() {
        let mut reconciler = Reconciler::new(relay_off());
        let started = reconciler.begin(manual_on()).unwrap();

        assert!(started.superseded.is_none());
        assert_eq!(reconciler.state().relay(Channel::R), Some(RelayState::On));
        assert_eq!(reconciler.pending().unwrap().id(), started.id);
        assert_eq!(reconciler.pending().unwrap().rollback(), &relay_off());
        assert_eq!(reconciler.generation(), 1);
    }

    #[test]
    fn second_command_supersedes_first() {
        let mut reconciler = Reconciler::new(relay_off());
        let first = reconciler.begin(manual_on()).unwrap();
        let second = reconciler
            .begin(StateChange::Intensity(Intensity::new(50).unwrap()))
            .unwrap();

        assert_eq!(second.superseded, Some(first.id));
        assert_eq!(reconciler.pending().unwrap().id(), second.id);

        // The old command's timer must no longer act
        assert!(reconciler.timeout(first.id).is_none());
        assert_eq!(reconciler.state().relay(Channel::R), Some(RelayState::On));
    }

    #[test]
    fn rollback_restores_state_of_newest_command() {
        let mut reconciler = Reconciler::new(relay_off());
        reconciler.begin(manual_on()).unwrap();
        let second = reconciler
            .begin(StateChange::Intensity(Intensity::new(50).unwrap()))
            .unwrap();

        assert_eq!(
            reconciler.timeout(second.id),
            Some(Resolution::TimedOut(second.id))
        );
        assert!(reconciler.state().intensity().is_none());
        assert_eq!(reconciler.state().relay(Channel::R), Some(RelayState::On));
        assert!(!reconciler.phase().is_pending());
    }

    #[test]
    fn dispatch_failure_rolls_back_once() {
        let mut reconciler = Reconciler::new(relay_off());
        let started = reconciler.begin(manual_on()).unwrap();

        let resolution = reconciler.dispatch_failed(started.id).unwrap();
        assert!(resolution.rolled_back());
        assert_eq!(reconciler.state(), &relay_off());

        assert!(reconciler.dispatch_failed(started.id).is_none());
        assert!(reconciler.timeout(started.id).is_none());
    }

    #[test]
    fn timeout_after_confirmation_is_noop() {
        let mut reconciler = Reconciler::new(relay_off());
        let started = reconciler.begin(manual_on()).unwrap();

        let ticket = reconciler.poll_started();
        assert_eq!(
            reconciler.merge(ticket, snapshot(&json!({"RELAY": 1, "AUTO_R": "OFF"}))),
            MergeOutcome::Confirmed(started.id)
        );

        let before = reconciler.state().clone();
        assert!(reconciler.timeout(started.id).is_none());
        assert_eq!(reconciler.state(), &before);
    }

    #[test]
    fn pending_merge_is_deferred_until_confirmed() {
        let mut reconciler = Reconciler::new(relay_off());
        reconciler.begin(manual_on()).unwrap();

        let ticket = reconciler.poll_started();
        let outcome = reconciler.merge(ticket, snapshot(&json!({"RELAY": 0, "temperature": 21})));

        assert_eq!(outcome, MergeOutcome::Deferred);
        assert_eq!(reconciler.state().relay(Channel::R), Some(RelayState::On));
        // The snapshot is still kept for its readings
        assert_eq!(reconciler.latest().unwrap().readings().temperature, Some(21.0));
    }

    #[test]
    fn stale_poll_is_discarded() {
        let mut reconciler = Reconciler::new(relay_off());
        let ticket = reconciler.poll_started();
        reconciler.begin(manual_on()).unwrap();

        let outcome = reconciler.merge(ticket, snapshot(&json!({"RELAY": 0, "AUTO_R": 0})));

        assert_eq!(outcome, MergeOutcome::Stale);
        assert_eq!(reconciler.state().relay(Channel::R), Some(RelayState::On));
        assert!(reconciler.latest().is_none());
    }

    #[test]
    fn stale_poll_discarded_after_confirmation() {
        let mut reconciler = Reconciler::new(relay_off());
        let early = reconciler.poll_started();
        reconciler.begin(manual_on()).unwrap();

        let ticket = reconciler.poll_started();
        reconciler.merge(ticket, snapshot(&json!({"RELAY": 1})));
        assert!(!reconciler.phase().is_pending());

        assert_eq!(
            reconciler.merge(early, snapshot(&json!({"RELAY": 0}))),
            MergeOutcome::Stale
        );
        assert_eq!(reconciler.state().relay(Channel::R), Some(RelayState::On));
    }

    #[test]
    fn idle_merge_lets_device_win() {
        let mut reconciler = Reconciler::new(relay_off());

        let ticket = reconciler.poll_started();
        assert_eq!(
            reconciler.merge(ticket, snapshot(&json!({"AUTO_R": "ON"}))),
            MergeOutcome::Updated
        );
        assert_eq!(reconciler.state().mode(Channel::R), Some(ControlMode::Auto));
        // Relay was not reported and keeps its value
        assert_eq!(reconciler.state().relay(Channel::R), Some(RelayState::Off));

        let ticket = reconciler.poll_started();
        assert_eq!(
            reconciler.merge(ticket, snapshot(&json!({"AUTO_R": "ON"}))),
            MergeOutcome::Unchanged
        );
    }

    #[test]
    fn unmount_blocks_every_transition() {
        let mut reconciler = Reconciler::new(relay_off());
        let started = reconciler.begin(manual_on()).unwrap();
        let ticket = reconciler.poll_started();

        reconciler.unmount();
        let frozen = reconciler.state().clone();

        assert!(!reconciler.is_alive());
        assert!(reconciler.timeout(started.id).is_none());
        assert!(reconciler.dispatch_failed(started.id).is_none());
        assert_eq!(
            reconciler.merge(ticket, snapshot(&json!({"RELAY": 0}))),
            MergeOutcome::Unmounted
        );
        assert!(matches!(reconciler.begin(manual_on()), Err(Error::Unmounted)));
        assert_eq!(reconciler.state(), &frozen);
    }
}
