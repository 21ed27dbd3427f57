// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus shared by control sessions.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::types::DeviceId;

use super::ControlEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcasts control events from one or more sessions.
///
/// A session creates its own bus unless it is given one with
/// [`ControlSessionBuilder::with_event_bus`]. Sharing one bus lets a global
/// handler watch every device (for authentication failures, say) through
/// [`subscribe`](Self::subscribe), while each screen listens to its own
/// device through [`subscribe_device`](Self::subscribe_device).
///
/// A subscriber that falls more than 256 events behind gets
/// `RecvError::Lagged` and misses the oldest ones.
///
/// [`ControlSessionBuilder::with_event_bus`]: crate::control::ControlSessionBuilder::with_event_bus
///
/// # Examples
///
/// ```
/// use iotdash::event::{ControlEvent, EventBus};
/// use iotdash::types::DeviceId;
///
/// let bus = EventBus::new();
/// let mut all = bus.subscribe();
/// let mut ac = bus.subscribe_device("ac-3");
///
/// bus.publish(ControlEvent::AuthenticationRequired {
///     device_id: DeviceId::new("light-12"),
/// });
///
/// assert_eq!(all.try_recv().unwrap().device_id().as_str(), "light-12");
/// assert!(ac.try_recv().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ControlEvent>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribes to the events of every device on this bus.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ControlEvent> {
        self.sender.subscribe()
    }

    /// Subscribes to the events of one device.
    #[must_use]
    pub fn subscribe_device(&self, device_id: impl Into<DeviceId>) -> DeviceEvents {
        DeviceEvents {
            device_id: device_id.into(),
            receiver: self.sender.subscribe(),
        }
    }

    /// Publishes an event. Without subscribers it is dropped.
    pub fn publish(&self, event: ControlEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for the events of a single device.
///
/// Events of other devices on the same bus are skipped.
#[derive(Debug)]
pub struct DeviceEvents {
    device_id: DeviceId,
    receiver: broadcast::Receiver<ControlEvent>,
}

impl DeviceEvents {
    /// Returns the device this receiver listens to.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Waits for the next event of the device.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Closed` once every session on the bus is gone, and
    /// `RecvError::Lagged` if events were missed.
    pub async fn recv(&mut self) -> Result<ControlEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if event.device_id() == &self.device_id {
                return Ok(event);
            }
        }
    }

    /// Returns the next buffered event of the device, without waiting.
    ///
    /// # Errors
    ///
    /// Returns `TryRecvError::Empty` if no event of the device is buffered.
    pub fn try_recv(&mut self) -> Result<ControlEvent, TryRecvError> {
        loop {
            let event = self.receiver.try_recv()?;
            if event.device_id() == &self.device_id {
                return Ok(event);
            }
        }
    }
}
