// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device connection bookkeeping.

use std::time::Duration;

use tokio::time::Instant;

use crate::light::{LightHandle, Link, WeakLight};
use crate::state::TrackedMode;
use crate::transport::CharacteristicId;
use crate::types::ProtocolFamily;

/// Everything the pool knows about one device.
///
/// Only accessed while holding the device's lock. A connection is built up
/// in place: the session is stored as soon as the transport returns it, then
/// the characteristic, then the family. Whatever a cancelled caller leaves
/// behind is picked up by the next one or closed by teardown.
#[derive(Debug)]
pub(crate) struct ConnectionRecord<S> {
    pub(crate) session: Option<S>,
    pub(crate) characteristic: Option<CharacteristicId>,
    /// `Unknown` until the wake and detection of the session are done.
    pub(crate) family: ProtocolFamily,
    pub(crate) mode: TrackedMode,
    pub(crate) connected_at: Option<Instant>,
    pub(crate) last_write: Option<Instant>,
    pub(crate) consecutive_failures: u32,
    handles: Vec<WeakLight>,
}

impl<S> ConnectionRecord<S> {
    pub(crate) fn new() -> Self {
        Self {
            session: None,
            characteristic: None,
            family: ProtocolFamily::Unknown,
            mode: TrackedMode::new(),
            connected_at: None,
            last_write: None,
            consecutive_failures: 0,
            handles: Vec::new(),
        }
    }

    /// Returns true while a session is held.
    #[must_use]
    pub(crate) fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the number of failed attempts since the last success.
    #[must_use]
    pub(crate) fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Returns true if the session has been idle for longer than `window`.
    ///
    /// Idle time counts from the later of connect and last accepted write.
    #[must_use]
    pub(crate) fn is_stale(&self, now: Instant, window: Duration) -> bool {
        if self.session.is_none() {
            return false;
        }
        self.connected_at
            .max(self.last_write)
            .is_some_and(|at| now.saturating_duration_since(at) > window)
    }

    /// Returns the session and characteristic once both are known.
    pub(crate) fn channel(&self) -> Option<(&S, CharacteristicId)> {
        Some((self.session.as_ref()?, self.characteristic?))
    }

    /// Forgets the connection-scoped state. The tracked mode is kept.
    pub(crate) fn take_session(&mut self) -> Option<S> {
        self.characteristic = None;
        self.family = ProtocolFamily::Unknown;
        self.connected_at = None;
        self.session.take()
    }

    /// Starts mirroring this record into `handle`.
    pub(crate) fn attach(&mut self, handle: &LightHandle) {
        self.handles.retain(|weak| !weak.is_dropped());
        if !self.handles.iter().any(|weak| weak.refers_to(handle)) {
            self.handles.push(handle.downgrade());
        }
    }

    /// Copies the connection-scoped state into every attached handle.
    pub(crate) fn publish_link(&self) {
        let link = Link {
            characteristic: self.characteristic,
            family: self.family,
            mode: self.mode,
        };
        for handle in self.handles.iter().filter_map(WeakLight::upgrade) {
            handle.set_link(link);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_record_is_never_stale() {
        let record = ConnectionRecord::<()>::new();
        assert!(!record.is_stale(Instant::now(), Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn staleness_counts_from_last_activity() {
        let window = Duration::from_secs(60);
        let mut record = ConnectionRecord::new();
        record.session = Some(());
        record.connected_at = Some(Instant::now());

        tokio::time::advance(Duration::from_secs(50)).await;
        record.last_write = Some(Instant::now());

        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(!record.is_stale(Instant::now(), window));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(record.is_stale(Instant::now(), window));
    }

    #[test]
    fn taking_the_session_clears_every_attached_handle() {
        let mut record = ConnectionRecord::new();
        let first = LightHandle::new("AA", "ELK-BLEDOM");
        let second = LightHandle::new("AA", "ELK-BLEDOM");
        record.attach(&first);
        record.attach(&second);
        record.attach(&first.clone());

        record.session = Some(());
        record.characteristic = Some(CharacteristicId::nil());
        record.family = ProtocolFamily::Ffe9;
        record.publish_link();
        assert_eq!(second.family(), ProtocolFamily::Ffe9);

        assert_eq!(record.take_session(), Some(()));
        record.publish_link();

        for handle in [&first, &second] {
            assert_eq!(handle.family(), ProtocolFamily::Unknown);
            assert_eq!(handle.characteristic(), None);
        }
    }

    #[test]
    fn dropped_handles_are_forgotten() {
        let mut record = ConnectionRecord::<()>::new();
        record.attach(&LightHandle::new("AA", "x"));
        let kept = LightHandle::new("AA", "x");
        record.attach(&kept);

        assert_eq!(record.handles.len(), 1);
    }
}
