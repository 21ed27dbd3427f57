// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-family reconciliation timing.

use std::time::Duration;

use crate::protocol::DispatchMode;
use crate::types::DeviceFamily;

/// Timers and dispatch mode of a control session.
///
/// Each controllable family has a preset tuned to how fast its hardware
/// acknowledges. Every value can be overridden.
///
/// | Family | Poll | Follow-up | Timeout | Dispatch |
/// |--------|------|-----------|---------|----------|
/// | Lighting | 10 s | 800 ms | 30 s | fire and poll |
/// | Three-phase | 15 s | 1 s | 15 s | fire and poll |
/// | IR controller | 15 s | 2 s | 10 s | with response |
///
/// # Examples
///
/// ```
/// use iotdash::reconcile::ControlTiming;
/// use iotdash::types::DeviceFamily;
/// use std::time::Duration;
///
/// let timing = ControlTiming::for_family(DeviceFamily::Lighting)
///     .with_confirm_timeout(Duration::from_secs(20));
///
/// assert_eq!(timing.follow_up_delay(), Duration::from_millis(800));
/// assert_eq!(timing.confirm_timeout(), Duration::from_secs(20));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlTiming {
    poll_interval: Duration,
    follow_up_delay: Duration,
    confirm_timeout: Duration,
    dispatch: DispatchMode,
}

impl ControlTiming {
    /// Returns the preset for a device family.
    ///
    /// Access-control terminals have no control loop; they get the
    /// lighting preset.
    #[must_use]
    pub const fn for_family(family: DeviceFamily) -> Self {
        match family {
            DeviceFamily::Lighting | DeviceFamily::AccessControl => Self {
                poll_interval: Duration::from_secs(10),
                follow_up_delay: Duration::from_millis(800),
                confirm_timeout: Duration::from_secs(30),
                dispatch: DispatchMode::FireAndPoll,
            },
            DeviceFamily::ThreePhaseLighting => Self {
                poll_interval: Duration::from_secs(15),
                follow_up_delay: Duration::from_secs(1),
                confirm_timeout: Duration::from_secs(15),
                dispatch: DispatchMode::FireAndPoll,
            },
            DeviceFamily::IrController => Self {
                poll_interval: Duration::from_secs(15),
                follow_up_delay: Duration::from_secs(2),
                confirm_timeout: Duration::from_secs(10),
                dispatch: DispatchMode::WithResponse,
            },
        }
    }

    /// Sets the periodic poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the delay of the read issued after a successful dispatch.
    #[must_use]
    pub const fn with_follow_up_delay(mut self, delay: Duration) -> Self {
        self.follow_up_delay = delay;
        self
    }

    /// Sets how long a command may stay unconfirmed.
    #[must_use]
    pub const fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Sets the dispatch mode.
    #[must_use]
    pub const fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Returns the periodic poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the follow-up read delay.
    #[must_use]
    pub const fn follow_up_delay(&self) -> Duration {
        self.follow_up_delay
    }

    /// Returns the confirmation timeout.
    #[must_use]
    pub const fn confirm_timeout(&self) -> Duration {
        self.confirm_timeout
    }

    /// Returns the dispatch mode.
    #[must_use]
    pub const fn dispatch(&self) -> DispatchMode {
        self.dispatch
    }
}

impl Default for ControlTiming {
    fn default() -> Self {
        Self::for_family(DeviceFamily::Lighting)
    }
}
