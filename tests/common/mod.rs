// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use lightdesk::transport::{Advertisement, CharacteristicId, Transport, TransportError};
use parking_lot::Mutex;
use tokio::time::Instant;

pub const FFE9_WRITE: CharacteristicId =
    CharacteristicId::from_u128(0x0000_ffe9_0000_1000_8000_0080_5f9b_34fb);

/// Power-on frame sent after every connect.
pub const WAKE: [u8; 3] = [0xCC, 0x23, 0x33];

/// One recorded call to [`Transport::write`].
#[derive(Debug, Clone)]
pub struct Written {
    pub address: String,
    pub bytes: Vec<u8>,
    pub accepted: bool,
    pub ack_required: bool,
    pub at: Instant,
}

/// A session that reports itself when dropped without a disconnect.
#[derive(Debug)]
pub struct MockSession {
    address: String,
    state: Arc<Mutex<State>>,
    closed: bool,
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if !self.closed {
            *self
                .state
                .lock()
                .leaked
                .entry(self.address.clone())
                .or_default() += 1;
        }
    }
}

#[derive(Debug, Default)]
struct State {
    writes: Vec<Written>,
    connects: HashMap<String, u32>,
    disconnects: HashMap<String, u32>,
    leaked: HashMap<String, u32>,
    failing_connects: HashMap<String, u32>,
    rejected_headers: HashMap<String, HashSet<u8>>,
    failing_frames: HashMap<(String, Vec<u8>), u32>,
    in_flight: HashSet<String>,
    overlapped: bool,
    advertisements: Vec<Advertisement>,
    scan_error: Option<TransportError>,
}

/// A [`Transport`] that records every frame and fails on request.
///
/// Clones share state, so a test can keep one while the pool owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
    write_delay: Duration,
    connect_delay: Duration,
    discover_delay: Duration,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write takes `delay` of (virtual) time.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    /// Every connect takes `delay` of (virtual) time.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Every characteristic discovery takes `delay` of (virtual) time.
    pub fn with_discover_delay(mut self, delay: Duration) -> Self {
        self.discover_delay = delay;
        self
    }

    /// The device at `address` rejects every frame starting with `header`.
    pub fn reject_header(&self, address: &str, header: u8) {
        self.state
            .lock()
            .rejected_headers
            .entry(address.to_string())
            .or_default()
            .insert(header);
    }

    /// The next `times` writes of exactly `bytes` to `address` fail.
    pub fn fail_frame(&self, address: &str, bytes: &[u8], times: u32) {
        self.state
            .lock()
            .failing_frames
            .insert((address.to_string(), bytes.to_vec()), times);
    }

    /// The next `times` connects to `address` fail.
    pub fn fail_connects(&self, address: &str, times: u32) {
        self.state
            .lock()
            .failing_connects
            .insert(address.to_string(), times);
    }

    pub fn advertise(&self, name: Option<&str>, address: &str) {
        self.state.lock().advertisements.push(Advertisement {
            name: name.map(str::to_string),
            address: address.to_string(),
        });
    }

    pub fn fail_scan(&self, error: TransportError) {
        self.state.lock().scan_error = Some(error);
    }

    pub fn writes(&self) -> Vec<Written> {
        self.state.lock().writes.clone()
    }

    /// Frames written to `address`, accepted or not, in order.
    pub fn frames(&self, address: &str) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .writes
            .iter()
            .filter(|w| w.address == address)
            .map(|w| w.bytes.clone())
            .collect()
    }

    /// How many times `bytes` was written to `address`.
    pub fn count(&self, address: &str, bytes: &[u8]) -> usize {
        self.state
            .lock()
            .writes
            .iter()
            .filter(|w| w.address == address && w.bytes == bytes)
            .count()
    }

    pub fn connects(&self, address: &str) -> u32 {
        self.state.lock().connects.get(address).copied().unwrap_or(0)
    }

    pub fn disconnects(&self, address: &str) -> u32 {
        self.state
            .lock()
            .disconnects
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    /// Sessions to `address` dropped without being disconnected.
    pub fn leaked(&self, address: &str) -> u32 {
        self.state.lock().leaked.get(address).copied().unwrap_or(0)
    }

    /// True if two writes to the same device were ever in flight at once.
    pub fn overlapped(&self) -> bool {
        self.state.lock().overlapped
    }

    fn should_fail(&self, address: &str, bytes: &[u8]) -> bool {
        let mut state = self.state.lock();
        if state
            .rejected_headers
            .get(address)
            .is_some_and(|headers| bytes.first().is_some_and(|h| headers.contains(h)))
        {
            return true;
        }
        match state
            .failing_frames
            .get_mut(&(address.to_string(), bytes.to_vec()))
        {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Marks a write in flight until dropped, including when the write is
/// abandoned by its caller.
struct InFlight<'a> {
    state: &'a Mutex<State>,
    address: &'a str,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a Mutex<State>, address: &'a str) -> Self {
        let mut guard = state.lock();
        if !guard.in_flight.insert(address.to_string()) {
            guard.overlapped = true;
        }
        Self { state, address }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.lock().in_flight.remove(self.address);
    }
}

impl Transport for MockTransport {
    type Session = MockSession;

    async fn scan(&self, _timeout: Duration) -> Result<Vec<Advertisement>, TransportError> {
        let state = self.state.lock();
        match &state.scan_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.advertisements.clone()),
        }
    }

    async fn connect(&self, address: &str) -> Result<MockSession, TransportError> {
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }
        let fail = {
            let mut state = self.state.lock();
            *state.connects.entry(address.to_string()).or_default() += 1;
            match state.failing_connects.get_mut(address) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if fail {
            return Err(TransportError::Ble(format!("connect to {address} refused")));
        }
        Ok(MockSession {
            address: address.to_string(),
            state: Arc::clone(&self.state),
            closed: false,
        })
    }

    async fn discover_writable_characteristic(
        &self,
        _session: &MockSession,
    ) -> Result<CharacteristicId, TransportError> {
        if !self.discover_delay.is_zero() {
            tokio::time::sleep(self.discover_delay).await;
        }
        Ok(FFE9_WRITE)
    }

    async fn write(
        &self,
        session: &MockSession,
        _characteristic: &CharacteristicId,
        bytes: &[u8],
        ack_required: bool,
    ) -> Result<(), TransportError> {
        let address = session.address.as_str();
        let _in_flight = InFlight::enter(&self.state, address);
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }

        let accepted = !self.should_fail(address, bytes);
        {
            let mut state = self.state.lock();
            state.writes.push(Written {
                address: address.to_string(),
                bytes: bytes.to_vec(),
                accepted,
                ack_required,
                at: Instant::now(),
            });
        }

        if accepted {
            Ok(())
        } else {
            Err(TransportError::Ble("write rejected".to_string()))
        }
    }

    async fn disconnect(&self, mut session: MockSession) {
        session.closed = true;
        *self
            .state
            .lock()
            .disconnects
            .entry(session.address.clone())
            .or_default() += 1;
    }
}

/// `56 R G B 00 F0 AA`
pub fn ffe9_color(r: u8, g: u8, b: u8) -> Vec<u8> {
    vec![0x56, r, g, b, 0x00, 0xF0, 0xAA]
}

/// `7E 00 05 R G B 00 00 EF`
pub fn fff3_color(r: u8, g: u8, b: u8) -> Vec<u8> {
    vec![0x7E, 0x00, 0x05, r, g, b, 0x00, 0x00, 0xEF]
}
