// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device connections with serialized writes.
//!
//! The [`ConnectionPool`] is the only place in the crate that talks to the
//! transport. It owns at most one session per device address, connects
//! lazily, sends the wake frame, runs protocol detection, and retries a
//! failed write exactly once on a fresh connection.
//!
//! # Write lifecycle
//!
//! 1. The command is validated before anything else.
//! 2. The device lock is taken and held until the write resolves.
//! 3. Sessions idle for longer than the staleness window are torn down.
//! 4. If there is no session: connect, discover the writable
//!    characteristic, write the wake frame, detect the family.
//! 5. The command is encoded for the session's family and written.
//! 6. On a transport failure: disconnect, reconnect once, retry once.
//!
//! A caller may drop a write at any await point. The session is kept in the
//! pool from the moment the transport returns it, so nothing is leaked and
//! the next write carries on from the step that was interrupted. Teardown
//! clears the connection state from every handle that used the device.

mod connection_pool;
mod connection_record;
mod pool_config;

pub use connection_pool::ConnectionPool;
pub use pool_config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_STALENESS_WINDOW, DEFAULT_WRITE_TIMEOUT, PoolConfig,
};
