// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group fan-out with periodic hard resynchronization.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::Instant;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::pool::ConnectionPool;
use crate::transport::Transport;

use super::group::LightGroup;

/// Default interval between hard resyncs of a group.
pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Dispatcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// A group whose last hard sync is older than this gets every command
    /// written twice.
    pub resync_interval: Duration,
}

impl DispatchConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resync interval.
    #[must_use]
    pub fn with_resync_interval(mut self, interval: Duration) -> Self {
        self.resync_interval = interval;
        self
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            resync_interval: DEFAULT_RESYNC_INTERVAL,
        }
    }
}

/// Outcome of one member's write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResult {
    /// Device address.
    pub address: String,
    /// Result of the last write issued to the device.
    pub result: Result<()>,
}

/// Per-device outcome of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Name of the dispatched group.
    pub group: String,
    /// One entry per member, in group order.
    pub results: Vec<DeviceResult>,
    /// True if this dispatch included a resync round.
    pub resynced: bool,
}

impl DispatchReport {
    /// Returns true if every member succeeded.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(|r| r.result.is_ok())
    }

    /// Returns the number of members that succeeded.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }

    /// Returns the members that failed with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.results
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|e| (r.address.as_str(), e)))
    }

    /// Returns the result for `address`, if it was a member.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<&Result<()>> {
        self.results
            .iter()
            .find(|r| r.address == address)
            .map(|r| &r.result)
    }
}

/// Reports of the two rounds of a [`Dispatcher::flash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashReport {
    /// The flash command.
    pub flash: DispatchReport,
    /// The command restoring the previous look.
    pub restore: DispatchReport,
}

/// Applies commands to groups of lights.
///
/// Every member gets its own pool write and the writes run concurrently; one
/// member failing never blocks or rolls back another. Groups that have not
/// been hard-synced for longer than the resync interval get the command
/// written a second time right after the first round.
///
/// # Examples
///
/// ```no_run
/// # #[cfg(feature = "btleplug")]
/// # async fn example() -> lightdesk::Result<()> {
/// use std::sync::Arc;
/// use lightdesk::dispatch::{Dispatcher, Stage, Target};
/// use lightdesk::transport::BtleTransport;
/// use lightdesk::{Command, ConnectionPool, LightHandle};
///
/// let transport = BtleTransport::new()
///     .await
///     .map_err(|e| lightdesk::Error::Discovery(e.to_string()))?;
/// let dispatcher = Dispatcher::new(Arc::new(ConnectionPool::new(transport)));
///
/// let stage = Stage::new(
///     Some(LightHandle::new("BE:FF:20:00:11:22", "ELK-BLEDOM")),
///     Some(LightHandle::new("BE:FF:20:00:11:23", "ELK-BLEDOM")),
/// );
/// let report = dispatcher
///     .dispatch(&stage.group(Target::Both), &Command::static_color(0, 0, 255, 0))
///     .await;
/// for (address, error) in report.failures() {
///     eprintln!("{address}: {error}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher<T: Transport> {
    pool: Arc<ConnectionPool<T>>,
    config: DispatchConfig,
    last_sync: parking_lot::Mutex<HashMap<String, Instant>>,
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher with the default resync interval.
    #[must_use]
    pub fn new(pool: Arc<ConnectionPool<T>>) -> Self {
        Self::with_config(pool, DispatchConfig::default())
    }

    /// Creates a dispatcher with the given configuration.
    #[must_use]
    pub fn with_config(pool: Arc<ConnectionPool<T>>, config: DispatchConfig) -> Self {
        Self {
            pool,
            config,
            last_sync: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &Arc<ConnectionPool<T>> {
        &self.pool
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> DispatchConfig {
        self.config
    }

    /// Writes `command` to every member of `group`.
    pub async fn dispatch(&self, group: &LightGroup, command: &Command) -> DispatchReport {
        let resync = self.resync_due(group.name());

        let mut results = self.round(group, command).await;
        if resync {
            tracing::debug!(group = group.name(), members = group.len(), "Resyncing group");
            results = self.round(group, command).await;
        }

        let report = DispatchReport {
            group: group.name().to_string(),
            results: group
                .members()
                .iter()
                .zip(results)
                .map(|(handle, result)| DeviceResult {
                    address: handle.address().to_string(),
                    result,
                })
                .collect(),
            resynced: resync,
        };

        for (address, error) in report.failures() {
            tracing::warn!(group = group.name(), %address, %error, "Dispatch failed for device");
        }
        report
    }

    /// Writes `flash`, waits `hold`, then writes `restore`.
    pub async fn flash(
        &self,
        group: &LightGroup,
        flash: &Command,
        hold: Duration,
        restore: &Command,
    ) -> FlashReport {
        let flash = self.dispatch(group, flash).await;
        tokio::time::sleep(hold).await;
        let restore = self.dispatch(group, restore).await;
        FlashReport { flash, restore }
    }

    /// Forgets the sync clock of `group`; its next dispatch starts it again.
    pub fn reset_sync(&self, group: &str) {
        self.last_sync.lock().remove(group);
    }

    async fn round(&self, group: &LightGroup, command: &Command) -> Vec<Result<()>> {
        join_all(
            group
                .members()
                .iter()
                .map(|handle| self.pool.write(handle, command)),
        )
        .await
    }

    /// Returns true if `group` is due a resync, restarting its clock if so.
    ///
    /// The first call for a group only starts the clock.
    fn resync_due(&self, group: &str) -> bool {
        let now = Instant::now();
        let mut last_sync = self.last_sync.lock();
        match last_sync.get_mut(group) {
            Some(at) if now.saturating_duration_since(*at) > self.config.resync_interval => {
                *at = now;
                true
            }
            Some(_) => false,
            None => {
                last_sync.insert(group.to_string(), now);
                false
            }
        }
    }
}

impl<T: Transport> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("groups", &self.last_sync.lock().len())
            .finish_non_exhaustive()
    }
}
