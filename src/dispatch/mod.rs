// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-device dispatch.
//!
//! A [`Dispatcher`] fans one command out to a [`LightGroup`] through the
//! [`ConnectionPool`](crate::pool::ConnectionPool). There is no
//! cross-device atomicity: each member reports its own result.
//!
//! Lights meant to look identical slowly drift apart when the odd frame is
//! silently dropped. To bound that, each group keeps a last-hard-sync time
//! and, once [`DispatchConfig::resync_interval`] has passed, the next
//! command is written twice.

mod dispatcher;
mod group;

pub use dispatcher::{
    DEFAULT_RESYNC_INTERVAL, DeviceResult, DispatchConfig, DispatchReport, Dispatcher, FlashReport,
};
pub use group::{LightGroup, Stage, Target};
