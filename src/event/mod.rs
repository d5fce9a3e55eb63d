// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostic notifications from the connection pool.
//!
//! Every transport write is reported as a [`LightEvent::WriteAttempted`]
//! carrying the command, the family it was encoded for, the outcome and the
//! latency. Wake and probe writes of a new connection use attempt 0. Connection changes are
//! reported too, so a front end can show per-device status without
//! polling. Nothing is persisted here; subscribers decide what to keep.
//!
//! # Examples
//!
//! ```no_run
//! use lightdesk::event::{EventBus, LightEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = rx.recv().await {
//!         if let LightEvent::WriteAttempted(write) = event {
//!             println!(
//!                 "{} {} {:?} {} ms",
//!                 write.address,
//!                 write.command,
//!                 write.outcome,
//!                 write.latency_ms()
//!             );
//!         }
//!     }
//! });
//! # }
//! ```

mod event_bus;
mod light_event;

pub use event_bus::{DEFAULT_EVENT_CAPACITY, DeviceEvents, EventBus};
pub use light_event::{LightEvent, WriteEvent, WriteOutcome};
