// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for controller discovery.

mod common;

use std::time::Duration;

use common::MockTransport;
use lightdesk::discovery::scan_lights;
use lightdesk::transport::TransportError;
use lightdesk::{Error, LightHandle, LightInfo};

#[tokio::test]
async fn scan_keeps_only_controllers() {
    let transport = MockTransport::new();
    transport.advertise(Some("ELK-BLEDOM"), "BE:FF:20:00:00:01");
    transport.advertise(Some("Pixel 8"), "11:22:33:44:55:66");
    transport.advertise(None, "77:88:99:AA:BB:CC");
    transport.advertise(Some("QHM-0A3C"), "BE:FF:20:00:00:02");
    transport.advertise(Some("ELK-BLEDOM"), "BE:FF:20:00:00:01");

    let lights = scan_lights(&transport, Duration::from_secs(1)).await.unwrap();

    assert_eq!(
        lights,
        vec![
            LightInfo::new("BE:FF:20:00:00:01", "ELK-BLEDOM"),
            LightInfo::new("BE:FF:20:00:00:02", "QHM-0A3C"),
        ]
    );

    let handle = LightHandle::from(lights[1].clone());
    assert_eq!(handle.name(), "QHM-0A3C");
    assert_eq!(handle.pinned_family(), None);
}

#[tokio::test]
async fn scan_failure_is_a_discovery_error() {
    let transport = MockTransport::new();
    transport.fail_scan(TransportError::AdapterUnavailable("powered off".to_string()));

    let err = scan_lights(&transport, Duration::from_secs(1))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        Error::Discovery("bluetooth adapter unavailable: powered off".to_string())
    );
}
