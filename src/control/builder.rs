// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control session builder.

use std::sync::Arc;

use crate::error::{DeviceError, Error, ParseError};
use crate::event::EventBus;
use crate::protocol::Backend;
use crate::reconcile::ControlTiming;
use crate::snapshot::DeviceSnapshot;
use crate::types::{DeviceFamily, DeviceId};

use super::ControlSession;

/// Builder for mounting a [`ControlSession`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use iotdash::control::ControlSession;
/// use iotdash::protocol::HttpConfig;
/// use iotdash::reconcile::ControlTiming;
/// use iotdash::types::DeviceFamily;
///
/// # async fn example() -> iotdash::Result<()> {
/// let backend = Arc::new(HttpConfig::new("https://api.example.com").into_client()?);
///
/// let session = ControlSession::builder(backend, "light-12")
///     .with_family(DeviceFamily::Lighting)
///     .with_timing(
///         ControlTiming::for_family(DeviceFamily::Lighting)
///             .with_confirm_timeout(Duration::from_secs(20)),
///     )
///     .mount()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ControlSessionBuilder<B: Backend> {
    backend: Arc<B>,
    device_id: DeviceId,
    family: Option<DeviceFamily>,
    timing: Option<ControlTiming>,
    events: Option<EventBus>,
}

impl<B: Backend> ControlSessionBuilder<B> {
    pub(crate) fn new(backend: Arc<B>, device_id: DeviceId) -> Self {
        Self {
            backend,
            device_id,
            family: None,
            timing: None,
            events: None,
        }
    }

    /// Sets the device family instead of reading it from the device record.
    #[must_use]
    pub fn with_family(mut self, family: DeviceFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Overrides the family's timer presets.
    #[must_use]
    pub fn with_timing(mut self, timing: ControlTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Publishes events on a shared bus instead of a private one.
    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Fetches the device and starts the session.
    ///
    /// The initial visible state is the control state of the fetched
    /// record. Periodic polling starts one poll interval later.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The device cannot be fetched
    /// - The record has no topic or response channel
    /// - The family is unknown or cannot be controlled
    pub async fn mount(self) -> Result<ControlSession<B>, Error> {
        let body = self.backend.fetch_device(self.device_id.as_str()).await?;
        let snapshot = DeviceSnapshot::from_json(&body);

        let route = snapshot
            .route()
            .cloned()
            .ok_or_else(|| ParseError::MissingField("topic".to_string()))?;

        let family = self
            .family
            .or(snapshot.family())
            .ok_or_else(|| ParseError::MissingField("type".to_string()))?;
        if !family.is_controllable() {
            return Err(DeviceError::NotControllable(family.to_string()).into());
        }

        let timing = self
            .timing
            .unwrap_or_else(|| ControlTiming::for_family(family));

        tracing::info!(
            device_id = %self.device_id,
            %family,
            topic = route.topic(),
            "Mounted control session"
        );

        Ok(ControlSession::start(
            self.backend,
            self.device_id,
            family,
            route,
            timing,
            self.events.unwrap_or_default(),
            snapshot,
        ))
    }
}
