// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The connection pool.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tokio::time::{Instant, timeout, timeout_at};

use crate::command::Command;
use crate::detect::Probe;
use crate::error::{Error, Result};
use crate::event::{EventBus, LightEvent, WriteEvent, WriteOutcome};
use crate::light::LightHandle;
use crate::protocol::{Frame, encode, power_frame};
use crate::transport::{CharacteristicId, Transport, TransportError};
use crate::types::ProtocolFamily;

use super::connection_record::ConnectionRecord;
use super::pool_config::PoolConfig;

type SharedRecord<S> = Arc<AsyncMutex<ConnectionRecord<S>>>;

/// Why a single attempt failed.
enum AttemptError {
    /// The command cannot be encoded; never retried.
    Encode(Error),
    /// The transport failed; worth one reconnect.
    Transport(TransportError),
}

/// Owns one transport session per device and serializes writes to it.
///
/// Each device has its own lock, held for the whole of a write including
/// reconnect and retry. Writes to different devices run in parallel; writes
/// to the same device never overlap.
///
/// On a transport failure the pool disconnects, reconnects once and retries
/// the write once. A second failure is reported as
/// [`Error::ConnectionLost`] and the session is left torn down, so the next
/// write starts from a fresh connection.
///
/// # Examples
///
/// ```no_run
/// # #[cfg(feature = "btleplug")]
/// # async fn example() -> lightdesk::Result<()> {
/// use lightdesk::transport::BtleTransport;
/// use lightdesk::{Command, ConnectionPool, LightHandle};
///
/// let transport = BtleTransport::new()
///     .await
///     .map_err(|e| lightdesk::Error::Discovery(e.to_string()))?;
/// let pool = ConnectionPool::new(transport);
///
/// let light = LightHandle::new("BE:FF:20:00:11:22", "ELK-BLEDOM");
/// pool.write(&light, &Command::static_color(255, 0, 0, 0)).await?;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionPool<T: Transport> {
    transport: Arc<T>,
    records: parking_lot::Mutex<HashMap<String, SharedRecord<T::Session>>>,
    config: PoolConfig,
    events: EventBus,
}

impl<T: Transport> ConnectionPool<T> {
    /// Creates a pool with default configuration.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, PoolConfig::default())
    }

    /// Creates a pool with the given configuration.
    #[must_use]
    pub fn with_config(transport: T, config: PoolConfig) -> Self {
        Self::with_events(transport, config, EventBus::new())
    }

    /// Creates a pool publishing to an existing event bus.
    #[must_use]
    pub fn with_events(transport: T, config: PoolConfig, events: EventBus) -> Self {
        Self {
            transport: Arc::new(transport),
            records: parking_lot::Mutex::new(HashMap::new()),
            config,
            events,
        }
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribes to connection and write events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LightEvent> {
        self.events.subscribe()
    }

    /// Delivers `command` to the device behind `handle`.
    ///
    /// Connects and detects the family on first use, after a failure, or when
    /// the session has been idle for longer than the staleness window.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the command is out of range; nothing is
    ///   written.
    /// - [`Error::UnsupportedOperation`] if the device's family has no
    ///   encoding for the command; the session is kept.
    /// - [`Error::ConnectionLost`] if the write, one reconnect and one retry
    ///   all failed.
    pub async fn write(&self, handle: &LightHandle, command: &Command) -> Result<()> {
        command.validate()?;

        let shared = self.record(handle.address());
        let mut record = shared.lock().await;
        record.attach(handle);
        self.expire_if_stale(handle.address(), &mut record).await;

        let first = match self.attempt(handle, &mut record, command, 1).await {
            Ok(()) => {
                self.confirm(handle, &mut record, command);
                return Ok(());
            }
            Err(AttemptError::Encode(e)) => return Err(e),
            Err(AttemptError::Transport(e)) => e,
        };

        record.consecutive_failures += 1;
        tracing::warn!(
            address = %handle.address(),
            command = command.name(),
            error = %first,
            "Write failed, reconnecting"
        );
        self.teardown(handle.address(), &mut record, &first.to_string())
            .await;

        match self.attempt(handle, &mut record, command, 2).await {
            Ok(()) => {
                self.confirm(handle, &mut record, command);
                Ok(())
            }
            Err(AttemptError::Encode(e)) => Err(e),
            Err(AttemptError::Transport(e)) => {
                record.consecutive_failures += 1;
                let reason = e.to_string();
                tracing::warn!(
                    address = %handle.address(),
                    command = command.name(),
                    error = %reason,
                    "Retry failed, giving up"
                );
                self.teardown(handle.address(), &mut record, &reason).await;
                Err(Error::ConnectionLost {
                    address: handle.address().to_string(),
                    reason,
                })
            }
        }
    }

    /// Connects to the device without sending a command.
    ///
    /// Returns the family used for the connection. Already-connected devices
    /// are left alone unless their session is stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionLost`] if the connection cannot be made.
    pub async fn connect(&self, handle: &LightHandle) -> Result<ProtocolFamily> {
        let shared = self.record(handle.address());
        let mut record = shared.lock().await;
        record.attach(handle);
        self.expire_if_stale(handle.address(), &mut record).await;

        if let Err(e) = self.ensure_ready(handle, &mut record).await {
            record.consecutive_failures += 1;
            return Err(Error::ConnectionLost {
                address: handle.address().to_string(),
                reason: e.to_string(),
            });
        }
        Ok(record.family)
    }

    /// Disconnects the device, waiting for any write in progress.
    ///
    /// Returns true if a session was closed.
    pub async fn disconnect(&self, handle: &LightHandle) -> bool {
        let Some(shared) = self.lookup(handle.address()) else {
            return false;
        };
        let mut record = shared.lock().await;
        record.attach(handle);
        self.teardown(handle.address(), &mut record, "disconnect requested")
            .await
    }

    /// Disconnects every device.
    pub async fn close_all(&self) {
        let records: Vec<(String, SharedRecord<T::Session>)> = self
            .records
            .lock()
            .iter()
            .map(|(address, shared)| (address.clone(), Arc::clone(shared)))
            .collect();

        for (address, shared) in records {
            let mut record = shared.lock().await;
            self.teardown(&address, &mut record, "pool closed").await;
        }
        tracing::info!("Connection pool closed");
    }

    /// Returns true if a session to `address` is open.
    pub async fn is_connected(&self, address: &str) -> bool {
        let Some(shared) = self.lookup(address) else {
            return false;
        };
        shared.lock().await.is_connected()
    }

    /// Returns the number of open sessions.
    pub async fn connection_count(&self) -> usize {
        let records: Vec<SharedRecord<T::Session>> =
            self.records.lock().values().cloned().collect();
        let mut count = 0;
        for shared in records {
            if shared.lock().await.is_connected() {
                count += 1;
            }
        }
        count
    }

    /// Returns the failed attempts on `address` since its last success.
    pub async fn failure_count(&self, address: &str) -> u32 {
        let Some(shared) = self.lookup(address) else {
            return 0;
        };
        shared.lock().await.consecutive_failures()
    }

    fn lookup(&self, address: &str) -> Option<SharedRecord<T::Session>> {
        self.records.lock().get(address).cloned()
    }

    /// Returns the record of `address`, creating it on first use.
    fn record(&self, address: &str) -> SharedRecord<T::Session> {
        let mut records = self.records.lock();
        Arc::clone(
            records
                .entry(address.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(ConnectionRecord::new()))),
        )
    }

    async fn expire_if_stale(
        &self,
        address: &str,
        record: &mut ConnectionRecord<T::Session>,
    ) {
        if record.is_stale(Instant::now(), self.config.staleness_window) {
            tracing::warn!(
                %address,
                window_ms = self.config.staleness_window.as_millis(),
                "Session is stale, reconnecting"
            );
            self.teardown(address, record, "stale session").await;
        }
    }

    /// Writes `command` once, connecting first if needed.
    ///
    /// The session stays in the record while the frame is in flight, so a
    /// caller giving up on the write leaves the connection usable.
    async fn attempt(
        &self,
        handle: &LightHandle,
        record: &mut ConnectionRecord<T::Session>,
        command: &Command,
        attempt: u8,
    ) -> std::result::Result<(), AttemptError> {
        self.ensure_ready(handle, record)
            .await
            .map_err(AttemptError::Transport)?;

        let family = record.family;
        let frame = encode(command, family).map_err(AttemptError::Encode)?;
        let Some((session, characteristic)) = record.channel() else {
            return Err(AttemptError::Transport(TransportError::NotConnected));
        };

        let started = Instant::now();
        let result = self.write_frame(session, &characteristic, &frame).await;

        tracing::debug!(
            address = %handle.address(),
            %family,
            %frame,
            attempt,
            ok = result.is_ok(),
            "Command frame written"
        );
        self.report(handle.address(), command, family, attempt, started, &result);

        result.map_err(AttemptError::Transport)
    }

    /// Brings the record up to a usable connection, resuming wherever an
    /// earlier caller stopped.
    async fn ensure_ready(
        &self,
        handle: &LightHandle,
        record: &mut ConnectionRecord<T::Session>,
    ) -> std::result::Result<(), TransportError> {
        if record.characteristic.is_none() {
            self.open(handle.address(), record).await?;
        }
        if !record.family.is_known() {
            self.identify(handle, record).await;
        }
        Ok(())
    }

    /// Connects and finds the writable characteristic, both within
    /// `connect_timeout`.
    async fn open(
        &self,
        address: &str,
        record: &mut ConnectionRecord<T::Session>,
    ) -> std::result::Result<(), TransportError> {
        let connect_timeout = self.config.connect_timeout;
        let deadline = Instant::now() + connect_timeout;
        let timed_out = || TransportError::Timeout {
            operation: "connect",
            after: connect_timeout,
        };

        if record.session.is_none() {
            let session = timeout_at(deadline, self.transport.connect(address))
                .await
                .map_err(|_| timed_out())??;
            record.session = Some(session);
            record.connected_at = Some(Instant::now());
            record.last_write = None;
        }

        let Some(session) = record.session.as_ref() else {
            return Err(TransportError::NotConnected);
        };
        let discovered = timeout_at(
            deadline,
            self.transport.discover_writable_characteristic(session),
        )
        .await
        .unwrap_or_else(|_| Err(timed_out()));

        match discovered {
            Ok(characteristic) => {
                record.characteristic = Some(characteristic);
                Ok(())
            }
            Err(e) => {
                if let Some(session) = record.take_session() {
                    self.transport.disconnect(session).await;
                }
                Err(e)
            }
        }
    }

    /// Wakes the device and settles its family, then announces the
    /// connection.
    async fn identify(
        &self,
        handle: &LightHandle,
        record: &mut ConnectionRecord<T::Session>,
    ) {
        let address = handle.address();
        let (Some(session), Some(characteristic)) =
            (record.session.as_ref(), record.characteristic)
        else {
            return;
        };

        // Some controllers drop the first frame after connect
        let started = Instant::now();
        let woken = self
            .write_frame(session, &characteristic, &power_frame(true))
            .await;
        self.report(
            address,
            &Command::WAKE,
            ProtocolFamily::Unknown,
            0,
            started,
            &woken,
        );
        match woken {
            Ok(()) => {
                record.mode.record(&Command::WAKE, Instant::now());
            }
            Err(e) => {
                tracing::warn!(%address, error = %e, "Wake frame failed");
            }
        }

        let (family, detection) = match handle.pinned_family() {
            Some(family) => (family, None),
            None => {
                let detection = self
                    .config
                    .detector
                    .detect(move |probe: Probe| async move {
                        let started = Instant::now();
                        let result = self
                            .write_frame(session, &characteristic, &probe.frame)
                            .await;
                        self.report(
                            address,
                            &probe.command,
                            probe.family,
                            0,
                            started,
                            &result,
                        );
                        result
                    })
                    .await;
                (detection.family_or(self.config.fallback_family), Some(detection))
            }
        };
        record.family = family;
        record.publish_link();

        tracing::info!(%address, %family, detected = detection.is_some(), "Connected");
        self.events.publish(LightEvent::Connected {
            address: address.to_string(),
            family,
            detection,
        });
    }

    async fn write_frame(
        &self,
        session: &T::Session,
        characteristic: &CharacteristicId,
        frame: &Frame,
    ) -> std::result::Result<(), TransportError> {
        let write_timeout = self.config.write_timeout;
        timeout(
            write_timeout,
            self.transport
                .write(session, characteristic, frame.as_bytes(), false),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            operation: "write",
            after: write_timeout,
        })?
    }

    /// Publishes the outcome of one transport write.
    fn report(
        &self,
        address: &str,
        command: &Command,
        family: ProtocolFamily,
        attempt: u8,
        started: Instant,
        result: &std::result::Result<(), TransportError>,
    ) {
        self.events.publish(LightEvent::WriteAttempted(WriteEvent {
            address: address.to_string(),
            command: *command,
            family,
            outcome: match result {
                Ok(()) => WriteOutcome::Accepted,
                Err(e) => WriteOutcome::Rejected(e.to_string()),
            },
            attempt,
            latency: started.elapsed(),
            at: Utc::now(),
        }));
    }

    /// Records a successful write and mirrors the new mode into the handles.
    fn confirm(
        &self,
        handle: &LightHandle,
        record: &mut ConnectionRecord<T::Session>,
        command: &Command,
    ) {
        let now = Instant::now();
        if record.mode.record(command, now) {
            tracing::debug!(
                address = %handle.address(),
                mode = ?record.mode.mode(),
                version = record.mode.version(),
                "Device mode changed"
            );
        }
        record.last_write = Some(now);
        record.consecutive_failures = 0;
        record.publish_link();
    }

    /// Closes the session, if any, and clears it from the handles. Returns
    /// true if one was open.
    async fn teardown(
        &self,
        address: &str,
        record: &mut ConnectionRecord<T::Session>,
        reason: &str,
    ) -> bool {
        let Some(session) = record.take_session() else {
            return false;
        };
        record.publish_link();
        self.transport.disconnect(session).await;

        tracing::debug!(%address, %reason, "Disconnected");
        self.events.publish(LightEvent::Disconnected {
            address: address.to_string(),
            reason: reason.to_string(),
        });
        true
    }
}

impl<T: Transport> std::fmt::Debug for ConnectionPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("devices", &self.records.lock().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
