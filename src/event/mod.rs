// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for control sessions.
//!
//! A [`ControlSession`](crate::control::ControlSession) publishes its
//! one-shot transitions (confirmations, rollbacks, authentication failures)
//! on an [`EventBus`] backed by tokio's broadcast channel.
//!
//! # Examples
//!
//! ```
//! use iotdash::event::{ControlEvent, EventBus};
//! use iotdash::reconcile::CommandId;
//! use iotdash::types::DeviceId;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(ControlEvent::CommandFailed {
//!     device_id: DeviceId::new("light-12"),
//!     command: CommandId::new(),
//!     error: "HTTP 502".to_string(),
//! });
//!
//! let notice = rx.try_recv().unwrap().notice();
//! assert_eq!(notice, Some("Command failed. Reverting changes..."));
//! ```

mod control_event;
mod event_bus;

pub use control_event::{
    COMMAND_FAILED_NOTICE, ControlEvent, NOT_REACHABLE_NOTICE, UpdateSource,
};
pub use event_bus::{DeviceEvents, EventBus};
