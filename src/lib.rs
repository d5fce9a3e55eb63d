// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `lightdesk` - A Rust library to drive cheap Bluetooth LE RGB controllers.
//!
//! Controllers sold as ELK-BLEDOM, Triones, `HappyLighting` and friends speak
//! one of two undocumented byte protocols, are slow to connect and silently
//! drop idle sessions. This library keeps one connection per device, figures
//! out which protocol it speaks, and delivers commands with a single bounded
//! retry so that lighting cues are either on time or reported as lost.
//!
//! # Supported Features
//!
//! - **Frame codec**: `FFE9_56AA` and `FFF3_7EEF` static color, vendor
//!   effects, power and warm-white frames
//! - **Protocol detection**: red/green/blue probe sequences on connect
//! - **Connection pool**: per-device serialized writes, wake frame, staleness
//!   reconnect, one reconnect + retry on failure
//! - **Dispatch**: parallel fan-out to groups with periodic hard resync
//! - **Diagnostics**: every write attempt published on an [`event::EventBus`]
//!
//! The platform Bluetooth stack is abstracted behind
//! [`transport::Transport`]; enable the `btleplug` feature for a
//! cross-platform implementation.
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "btleplug")]
//! # async fn example() -> lightdesk::Result<()> {
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lightdesk::dispatch::{Dispatcher, LightGroup};
//! use lightdesk::discovery::scan_lights;
//! use lightdesk::transport::BtleTransport;
//! use lightdesk::types::{EffectMode, RgbColor, Speed};
//! use lightdesk::{Command, ConnectionPool, LightHandle};
//!
//! let transport = BtleTransport::new()
//!     .await
//!     .map_err(|e| lightdesk::Error::Discovery(e.to_string()))?;
//! let lights = scan_lights(&transport, Duration::from_secs(6)).await?;
//!
//! let pool = Arc::new(ConnectionPool::new(transport));
//! let dispatcher = Dispatcher::new(Arc::clone(&pool));
//! let all = LightGroup::new("all", lights.into_iter().map(LightHandle::from));
//!
//! dispatcher.dispatch(&all, &Command::color(RgbColor::BLUE)).await;
//! dispatcher
//!     .dispatch(&all, &Command::vendor_mode(EffectMode::STROBE_WHITE, Speed::FAST))
//!     .await;
//!
//! pool.close_all().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Writing to a single light
//!
//! ```no_run
//! # #[cfg(feature = "btleplug")]
//! # async fn example() -> lightdesk::Result<()> {
//! use lightdesk::transport::BtleTransport;
//! use lightdesk::types::{Brightness, RgbColor};
//! use lightdesk::{Command, ConnectionPool, LightHandle};
//!
//! let transport = BtleTransport::new()
//!     .await
//!     .map_err(|e| lightdesk::Error::Discovery(e.to_string()))?;
//! let pool = ConnectionPool::new(transport);
//! let light = LightHandle::new("BE:FF:20:00:11:22", "ELK-BLEDOM");
//!
//! let dimmed = Brightness::new(40)?.apply(Command::color(RgbColor::from_hex("#FF8800")?));
//! pool.write(&light, &dimmed).await?;
//! println!("{light} speaks {}", light.family());
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod detect;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod event;
mod light;
pub mod pool;
pub mod protocol;
pub mod state;
pub mod transport;
pub mod types;

pub use command::Command;
pub use config::LightdeskConfig;
pub use detect::{Detection, Detector};
pub use dispatch::{DispatchConfig, DispatchReport, Dispatcher, LightGroup};
pub use error::{ConfigError, Error, Result, ValueError};
pub use light::{LightHandle, LightInfo};
pub use pool::{ConnectionPool, PoolConfig};
pub use protocol::{Frame, encode};
pub use types::{Brightness, EffectMode, ProtocolFamily, RgbColor, Speed};
