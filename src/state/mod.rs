// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.
//!
//! A controller is either showing a static output or running one of its
//! built-in animations. [`DeviceMode`] models that, [`TrackedMode`] adds a
//! version counter and confirmation time, and [`needs_reassertion`] tells a
//! scheduler when a running effect should be re-sent.
//!
//! # Examples
//!
//! ```
//! use lightdesk::Command;
//! use lightdesk::state::{DeviceMode, TrackedMode};
//!
//! let mut tracked = TrackedMode::new();
//! tracked.record(&Command::VendorMode { mode_id: 0x37, speed: 5 }, tokio::time::Instant::now());
//! assert_eq!(tracked.mode(), DeviceMode::Running(0x37));
//! ```

mod device_mode;

pub use device_mode::{DeviceMode, TrackedMode, needs_reassertion};
