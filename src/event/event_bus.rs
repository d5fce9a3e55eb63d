// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for light events.

use tokio::sync::broadcast::{self, error::RecvError};

use super::LightEvent;

/// Default number of buffered events per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fans [`LightEvent`]s out to any number of subscribers.
///
/// Publishing never blocks the pool. A subscriber that falls more than the
/// capacity behind loses the oldest events. Clones share the same channel.
///
/// # Examples
///
/// ```
/// use lightdesk::event::{EventBus, LightEvent};
///
/// let bus = EventBus::with_capacity(16);
/// let mut all = bus.subscribe();
///
/// bus.publish(LightEvent::Disconnected {
///     address: "AA:BB".to_string(),
///     reason: "pool closed".to_string(),
/// });
///
/// assert!(all.try_recv().unwrap().is_disconnect());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LightEvent>,
}

impl EventBus {
    /// Creates a bus with [`DEFAULT_EVENT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receives every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LightEvent> {
        self.sender.subscribe()
    }

    /// Receives only the events concerning `address`.
    #[must_use]
    pub fn subscribe_device(&self, address: impl Into<String>) -> DeviceEvents {
        DeviceEvents {
            address: address.into(),
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes `event`. Dropped silently when nobody listens.
    pub fn publish(&self, event: LightEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Events of a single device, as returned by [`EventBus::subscribe_device`].
#[derive(Debug)]
pub struct DeviceEvents {
    address: String,
    receiver: broadcast::Receiver<LightEvent>,
}

impl DeviceEvents {
    /// Returns the watched address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Waits for the next event of the device.
    ///
    /// Lagging skips the lost events. Returns `None` once every bus clone
    /// has been dropped.
    pub async fn recv(&mut self) -> Option<LightEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.address() == self.address => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(address = %self.address, skipped, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disconnected(address: &str) -> LightEvent {
        LightEvent::Disconnected {
            address: address.to_string(),
            reason: "stale session".to_string(),
        }
    }

    #[test]
    fn subscribers_are_counted_across_clones() {
        let bus = EventBus::new();
        let clone = bus.clone();

        let rx = bus.subscribe();
        assert_eq!(clone.subscriber_count(), 1);

        drop(rx);
        assert_eq!(clone.subscriber_count(), 0);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        EventBus::with_capacity(0).publish(disconnected("AA"));
    }

    #[tokio::test]
    async fn device_subscription_filters_by_address() {
        let bus = EventBus::new();
        let mut left = bus.subscribe_device("AA");

        bus.publish(disconnected("BB"));
        bus.publish(disconnected("AA"));

        assert_eq!(left.recv().await, Some(disconnected("AA")));
        assert_eq!(left.address(), "AA");
    }

    #[tokio::test]
    async fn device_subscription_survives_lag() {
        let bus = EventBus::with_capacity(2);
        let mut watcher = bus.subscribe_device("AA");

        for _ in 0..5 {
            bus.publish(disconnected("BB"));
        }
        bus.publish(disconnected("AA"));

        assert_eq!(watcher.recv().await, Some(disconnected("AA")));
    }

    #[tokio::test]
    async fn device_subscription_ends_with_the_bus() {
        let bus = EventBus::new();
        let mut watcher = bus.subscribe_device("AA");
        drop(bus);

        assert_eq!(watcher.recv().await, None);
    }
}
