// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Optimistic command reconciliation.
//!
//! A control session runs one [`Reconciler`] per device screen:
//!
//! ```text
//!            begin                merge (confirms)
//!   Idle ───────────► CommandPending ───────────────► Idle
//!    ▲                 │        │ timeout / dispatch_failed
//!    │                 │        └───────────────────► Idle (rolled back)
//!    │                 └─ begin: superseded, stays pending
//! ```
//!
//! [`ControlTiming`] holds the per-family timers that drive it.

mod pending;
mod reconciler;
mod timing;

pub use pending::{CommandId, PendingCommand};
pub use reconciler::{MergeOutcome, Phase, PollTicket, Reconciler, Resolution, Started};
pub use timing::ControlTiming;
