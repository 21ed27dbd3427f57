// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device control sessions.
//!
//! A [`ControlSession`] backs one device control screen. It shows commands
//! optimistically, sends them through the backend, and reconciles the
//! visible state with what the device reports:
//!
//! - A command updates the visible state at once and arms a confirmation
//!   timer.
//! - A follow-up poll shortly after a successful dispatch, and a periodic
//!   poll, read the device back. A report matching the command confirms it.
//! - A failed dispatch or an expired timer reverts the command.
//!
//! The visible state is published through a `tokio::sync::watch` channel.
//! One-off notices such as rollbacks are published as [`ControlEvent`]s.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use iotdash::control::ControlSession;
//! use iotdash::event::ControlEvent;
//! use iotdash::protocol::HttpConfig;
//! use iotdash::types::{Channel, RelayState};
//!
//! # async fn example() -> iotdash::Result<()> {
//! let backend = Arc::new(
//!     HttpConfig::new("https://api.example.com")
//!         .with_token("secret")
//!         .into_client()?,
//! );
//! let session = ControlSession::builder(backend, "light-12").mount().await?;
//!
//! let mut events = session.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         if let Some(notice) = event.notice() {
//!             eprintln!("{notice}");
//!         }
//!     }
//! });
//!
//! session.set_relay(Channel::R, RelayState::On).await?;
//! assert_eq!(session.state().relay(Channel::R), Some(RelayState::On));
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::ControlSessionBuilder;

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::command::{Command, ControlCommand, ControlIntent};
use crate::error::{Error, ProtocolError};
use crate::event::{ControlEvent, DeviceEvents, EventBus, UpdateSource};
use crate::protocol::{Backend, DispatchMode};
use crate::reconcile::{
    CommandId, ControlTiming, MergeOutcome, Phase, PollTicket, Reconciler, Resolution,
};
use crate::schedule::ScheduledTask;
use crate::snapshot::{DeviceSnapshot, Route};
use crate::state::ControlState;
use crate::types::{Channel, DeviceFamily, DeviceId, Intensity, RelayState, Setpoint};

/// A mounted device control screen.
///
/// Created with [`ControlSession::builder`]. Dropping the session unmounts
/// it.
#[derive(Debug)]
pub struct ControlSession<B: Backend> {
    inner: Arc<Inner<B>>,
}

/// Shared by the session handle and its timer tasks. Tasks hold a `Weak`.
#[derive(Debug)]
struct Inner<B: Backend> {
    backend: Arc<B>,
    device_id: DeviceId,
    family: DeviceFamily,
    route: Route,
    timing: ControlTiming,
    events: EventBus,
    state_tx: watch::Sender<ControlState>,
    core: Mutex<Core>,
}

/// Everything guarded by the session lock.
#[derive(Debug)]
struct Core {
    reconciler: Reconciler,
    timeout: Option<(CommandId, ScheduledTask)>,
    follow_up: Option<ScheduledTask>,
    poller: Option<ScheduledTask>,
}

impl<B: Backend> ControlSession<B> {
    /// Starts building a session for `device_id`.
    pub fn builder(backend: Arc<B>, device_id: impl Into<DeviceId>) -> ControlSessionBuilder<B> {
        ControlSessionBuilder::new(backend, device_id.into())
    }

    pub(crate) fn start(
        backend: Arc<B>,
        device_id: DeviceId,
        family: DeviceFamily,
        route: Route,
        timing: ControlTiming,
        events: EventBus,
        snapshot: DeviceSnapshot,
    ) -> Self {
        let (state_tx, _) = watch::channel(snapshot.control().clone());
        let inner = Arc::new(Inner {
            backend,
            device_id,
            family,
            route,
            timing,
            events,
            state_tx,
            core: Mutex::new(Core {
                reconciler: Reconciler::from_snapshot(snapshot),
                timeout: None,
                follow_up: None,
                poller: None,
            }),
        });

        let weak = Arc::downgrade(&inner);
        let poller = ScheduledTask::every(timing.poll_interval(), move || {
            let weak = Weak::clone(&weak);
            async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Err(e) = inner.poll().await {
                    tracing::warn!(device_id = %inner.device_id, error = %e, "Periodic poll failed");
                }
            }
        });
        inner.core.lock().poller = Some(poller);

        Self { inner }
    }

    // ========== Accessors ==========

    /// Returns the device ID.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.inner.device_id
    }

    /// Returns the device family.
    #[must_use]
    pub fn family(&self) -> DeviceFamily {
        self.inner.family
    }

    /// Returns the command route resolved at mount time.
    #[must_use]
    pub fn route(&self) -> &Route {
        &self.inner.route
    }

    /// Returns the timers in use.
    #[must_use]
    pub fn timing(&self) -> ControlTiming {
        self.inner.timing
    }

    /// Returns the visible control state.
    #[must_use]
    pub fn state(&self) -> ControlState {
        self.inner.state_tx.borrow().clone()
    }

    /// Returns a receiver of the visible control state.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<ControlState> {
        self.inner.state_tx.subscribe()
    }

    /// Subscribes to this device's control events.
    ///
    /// Events of other sessions sharing the same bus are skipped.
    #[must_use]
    pub fn subscribe(&self) -> DeviceEvents {
        self.inner.events.subscribe_device(self.inner.device_id.clone())
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.core.lock().reconciler.phase().clone()
    }

    /// Returns the id of the outstanding command, if any.
    #[must_use]
    pub fn pending_command(&self) -> Option<CommandId> {
        self.inner
            .core
            .lock()
            .reconciler
            .pending()
            .map(|pending| pending.id())
    }

    /// Returns the newest device snapshot, including sensor readings.
    #[must_use]
    pub fn latest_snapshot(&self) -> Option<DeviceSnapshot> {
        self.inner.core.lock().reconciler.latest().cloned()
    }

    /// Returns `false` once the session has been unmounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.core.lock().reconciler.is_alive()
    }

    // ========== Commands ==========

    /// Sends a control intent.
    ///
    /// The visible state changes before the request goes out. Any command
    /// still awaiting confirmation is replaced. On a failed dispatch the
    /// state is reverted and [`ControlEvent::CommandFailed`] is published.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The family has no control for the intent
    /// - The session is unmounted
    /// - The backend request fails
    pub async fn send(&self, intent: ControlIntent) -> Result<CommandId, Error> {
        let command = ControlCommand::for_family(self.inner.family, intent)?;
        self.inner.dispatch(&command).await
    }

    /// Switches a channel on or off manually.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_relay(&self, channel: Channel, state: RelayState) -> Result<CommandId, Error> {
        self.send(ControlIntent::relay(channel, state)).await
    }

    /// Flips the visible relay state of a channel. An unknown state counts
    /// as off.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn toggle_relay(&self, channel: Channel) -> Result<CommandId, Error> {
        let current = self.state().relay(channel).unwrap_or(RelayState::Off);
        self.set_relay(channel, current.toggled()).await
    }

    /// Hands a channel back to automatic control.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_auto(&self, channel: Channel) -> Result<CommandId, Error> {
        self.send(ControlIntent::auto(channel)).await
    }

    /// Sets the lighting intensity.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_intensity(&self, value: Intensity) -> Result<CommandId, Error> {
        self.send(ControlIntent::Intensity(value)).await
    }

    /// Sets the air-conditioner setpoint.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn set_setpoint(&self, value: Setpoint) -> Result<CommandId, Error> {
        self.send(ControlIntent::Setpoint(value)).await
    }

    // ========== Lifecycle ==========

    /// Reads the device now and merges the result.
    ///
    /// # Errors
    ///
    /// Returns error if the session is unmounted or the request fails.
    pub async fn poll_now(&self) -> Result<(), Error> {
        self.inner.poll().await
    }

    /// Stops every timer and turns later responses into no-ops.
    pub fn unmount(&self) {
        self.inner.unmount();
    }
}

impl<B: Backend> Drop for ControlSession<B> {
    fn drop(&mut self) {
        self.inner.unmount();
    }
}

impl<B: Backend> Inner<B> {
    async fn dispatch(self: &Arc<Self>, command: &ControlCommand) -> Result<CommandId, Error> {
        let envelope = command.envelope(&self.route);
        let mode = self.timing.dispatch();

        let (id, ticket) = {
            let mut core = self.core.lock();
            let started = core
                .reconciler
                .begin_sending(command.intent(), envelope.clone())?;
            if let Some(previous) = started.superseded {
                tracing::debug!(
                    device_id = %self.device_id,
                    resolution = ?Resolution::Superseded(previous),
                    "Replaced pending command"
                );
            }

            core.follow_up = None;
            core.timeout = Some((started.id, self.arm_timeout(started.id)));
            self.publish_state(&core, UpdateSource::Optimistic);
            (started.id, core.reconciler.poll_started())
        };

        tracing::debug!(
            device_id = %self.device_id,
            command = %command.name(),
            %id,
            "Dispatching command"
        );

        match self.backend.send_command(&envelope, mode).await {
            Ok(response) => {
                if mode == DispatchMode::WithResponse
                    && let Some(snapshot) = response.echoed_state()
                {
                    self.merge(ticket, snapshot);
                }
                self.arm_follow_up();
                Ok(id)
            }
            Err(e) => {
                self.dispatch_failed(id, &e);
                Err(e.into())
            }
        }
    }

    fn dispatch_failed(&self, id: CommandId, error: &ProtocolError) {
        let mut core = self.core.lock();
        if core.reconciler.dispatch_failed(id).is_none() {
            return;
        }
        core.timeout = None;

        tracing::warn!(device_id = %self.device_id, %id, %error, "Command failed, rolling back");
        self.publish_state(&core, UpdateSource::Rollback);
        self.events.publish(ControlEvent::CommandFailed {
            device_id: self.device_id.clone(),
            command: id,
            error: error.to_string(),
        });
        if matches!(error, ProtocolError::AuthenticationFailed) {
            self.events.publish(ControlEvent::AuthenticationRequired {
                device_id: self.device_id.clone(),
            });
        }
    }

    fn timed_out(&self, id: CommandId) {
        let mut core = self.core.lock();
        if core.reconciler.timeout(id).is_none() {
            return;
        }

        tracing::warn!(device_id = %self.device_id, %id, "Command not confirmed, rolling back");
        self.publish_state(&core, UpdateSource::Rollback);
        self.events.publish(ControlEvent::DeviceNotReachable {
            device_id: self.device_id.clone(),
            command: id,
        });
    }

    async fn poll(&self) -> Result<(), Error> {
        let ticket = {
            let core = self.core.lock();
            if !core.reconciler.is_alive() {
                return Err(Error::Unmounted);
            }
            core.reconciler.poll_started()
        };

        let body = match self.backend.fetch_device(self.device_id.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                if matches!(e, ProtocolError::AuthenticationFailed) && self.is_alive() {
                    self.events.publish(ControlEvent::AuthenticationRequired {
                        device_id: self.device_id.clone(),
                    });
                }
                return Err(e.into());
            }
        };

        self.merge(ticket, DeviceSnapshot::from_json(&body));
        Ok(())
    }

    fn merge(&self, ticket: PollTicket, snapshot: DeviceSnapshot) {
        let mut core = self.core.lock();
        let outcome = core.reconciler.merge(ticket, snapshot);

        match outcome {
            MergeOutcome::Confirmed(id) => {
                if core.timeout.as_ref().is_some_and(|(armed, _)| *armed == id) {
                    core.timeout = None;
                }
                tracing::debug!(device_id = %self.device_id, %id, "Command confirmed");
                self.publish_state(&core, UpdateSource::Device);
                self.events.publish(ControlEvent::CommandConfirmed {
                    device_id: self.device_id.clone(),
                    command: id,
                });
            }
            MergeOutcome::Updated => {
                tracing::debug!(device_id = %self.device_id, "Device state changed");
                self.publish_state(&core, UpdateSource::Device);
            }
            MergeOutcome::Stale => {
                tracing::debug!(device_id = %self.device_id, "Discarded stale poll");
            }
            MergeOutcome::Unchanged | MergeOutcome::Deferred | MergeOutcome::Unmounted => {}
        }
    }

    /// Publishes the visible state. Called with the lock held so publications
    /// keep the order of transitions.
    fn publish_state(&self, core: &Core, source: UpdateSource) {
        let state = core.reconciler.state().clone();
        self.state_tx.send_replace(state.clone());
        self.events.publish(ControlEvent::state_changed(
            self.device_id.clone(),
            state,
            source,
        ));
    }

    fn arm_timeout(self: &Arc<Self>, id: CommandId) -> ScheduledTask {
        let weak = Arc::downgrade(self);
        ScheduledTask::after(self.timing.confirm_timeout(), move || async move {
            if let Some(inner) = weak.upgrade() {
                inner.timed_out(id);
            }
        })
    }

    fn arm_follow_up(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let mut core = self.core.lock();
        if !core.reconciler.is_alive() {
            return;
        }

        core.follow_up = Some(ScheduledTask::after(
            self.timing.follow_up_delay(),
            move || async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Err(e) = inner.poll().await {
                    tracing::warn!(device_id = %inner.device_id, error = %e, "Follow-up poll failed");
                }
            },
        ));
    }

    fn is_alive(&self) -> bool {
        self.core.lock().reconciler.is_alive()
    }

    fn unmount(&self) {
        let timers = {
            let mut core = self.core.lock();
            if !core.reconciler.is_alive() {
                return;
            }
            core.reconciler.unmount();
            (core.timeout.take(), core.follow_up.take(), core.poller.take())
        };
        drop(timers);

        tracing::info!(device_id = %self.device_id, "Unmounted control session");
    }
}
