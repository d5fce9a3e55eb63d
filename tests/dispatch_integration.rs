// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for multi-device dispatch using a scripted transport.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockTransport, WAKE, ffe9_color};
use lightdesk::dispatch::{DispatchConfig, Dispatcher, LightGroup, Stage, Target};
use lightdesk::types::{ProtocolFamily, RgbColor};
use lightdesk::{Command, ConnectionPool, Error, LightHandle};
use tokio::time::Instant;

const LEFT: &str = "BE:FF:20:00:00:0A";
const RIGHT: &str = "BE:FF:20:00:00:0B";

fn light(address: &str) -> LightHandle {
    LightHandle::with_family(address, "ELK-BLEDOM", ProtocolFamily::Ffe9)
}

fn dispatcher(transport: &MockTransport) -> Dispatcher<MockTransport> {
    Dispatcher::new(Arc::new(ConnectionPool::new(transport.clone())))
}

fn pair() -> LightGroup {
    LightGroup::new("A+B", [light(LEFT), light(RIGHT)])
}

// ============================================================================
// Fan-out
// ============================================================================

mod fan_out {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn every_member_gets_the_command() {
        let transport = MockTransport::new();
        let dispatcher = dispatcher(&transport);

        let report = dispatcher
            .dispatch(&pair(), &Command::static_color(1, 2, 3, 0))
            .await;

        assert!(report.all_ok());
        assert!(!report.resynced);
        assert_eq!(report.group, "A+B");
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].address, LEFT);
        assert_eq!(report.results[1].address, RIGHT);
        for address in [LEFT, RIGHT] {
            assert_eq!(
                transport.frames(address),
                vec![WAKE.to_vec(), ffe9_color(1, 2, 3)]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_reported_per_device() {
        let transport = MockTransport::new();
        transport.fail_connects(RIGHT, 2);
        let dispatcher = dispatcher(&transport);

        let report = dispatcher
            .dispatch(&pair(), &Command::static_color(1, 2, 3, 0))
            .await;

        assert!(!report.all_ok());
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.get(LEFT), Some(&Ok(())));
        assert!(matches!(
            report.get(RIGHT),
            Some(Err(Error::ConnectionLost { .. }))
        ));
        assert_eq!(report.failures().count(), 1);
        assert_eq!(transport.count(LEFT, &ffe9_color(1, 2, 3)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn members_are_written_in_parallel() {
        let transport = MockTransport::new().with_write_delay(Duration::from_millis(100));
        let dispatcher = dispatcher(&transport);

        let started = Instant::now();
        let report = dispatcher
            .dispatch(&pair(), &Command::power(true))
            .await;

        assert!(report.all_ok());
        assert!(started.elapsed() < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_group_is_a_no_op() {
        let transport = MockTransport::new();
        let dispatcher = dispatcher(&transport);

        let report = dispatcher
            .dispatch(&LightGroup::new("none", []), &Command::power(true))
            .await;

        assert!(report.results.is_empty());
        assert!(report.all_ok());
        assert!(transport.writes().is_empty());
    }
}

// ============================================================================
// Resync
// ============================================================================

mod resync {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stale_group_gets_the_command_twice() {
        let transport = MockTransport::new();
        let dispatcher = dispatcher(&transport);
        let group = pair();

        let first = dispatcher
            .dispatch(&group, &Command::static_color(1, 1, 1, 0))
            .await;
        assert!(!first.resynced);

        tokio::time::advance(Duration::from_secs(5)).await;
        let second = dispatcher
            .dispatch(&group, &Command::static_color(2, 2, 2, 0))
            .await;
        assert!(!second.resynced);
        assert_eq!(transport.count(LEFT, &ffe9_color(2, 2, 2)), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        let third = dispatcher
            .dispatch(&group, &Command::static_color(3, 3, 3, 0))
            .await;
        assert!(third.resynced);
        for address in [LEFT, RIGHT] {
            assert_eq!(transport.count(address, &ffe9_color(3, 3, 3)), 2);
        }

        // The clock restarted with the resync
        let fourth = dispatcher
            .dispatch(&group, &Command::static_color(4, 4, 4, 0))
            .await;
        assert!(!fourth.resynced);
    }

    #[tokio::test(start_paused = true)]
    async fn groups_have_independent_clocks() {
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::with_config(
            Arc::new(ConnectionPool::new(transport.clone())),
            DispatchConfig::new().with_resync_interval(Duration::from_secs(2)),
        );
        let left = LightGroup::single(light(LEFT));
        let right = LightGroup::single(light(RIGHT));

        dispatcher.dispatch(&left, &Command::power(true)).await;
        tokio::time::advance(Duration::from_secs(3)).await;
        dispatcher.dispatch(&right, &Command::power(true)).await;

        let left_report = dispatcher.dispatch(&left, &Command::power(true)).await;
        let right_report = dispatcher.dispatch(&right, &Command::power(true)).await;

        assert!(left_report.resynced);
        assert!(!right_report.resynced);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_sync_restarts_the_clock() {
        let transport = MockTransport::new();
        let dispatcher = dispatcher(&transport);
        let group = pair();

        dispatcher.dispatch(&group, &Command::power(true)).await;
        tokio::time::advance(Duration::from_secs(11)).await;
        dispatcher.reset_sync(group.name());

        let report = dispatcher.dispatch(&group, &Command::power(true)).await;
        assert!(!report.resynced);
    }
}

// ============================================================================
// Stage and flash
// ============================================================================

mod stage {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn single_side_target_writes_one_light() {
        let transport = MockTransport::new();
        let dispatcher = dispatcher(&transport);
        let stage = Stage::new(Some(light(LEFT)), Some(light(RIGHT)));

        let report = dispatcher
            .dispatch(&stage.group(Target::B), &Command::color(RgbColor::GREEN))
            .await;

        assert_eq!(report.results.len(), 1);
        assert!(transport.frames(LEFT).is_empty());
        assert_eq!(transport.count(RIGHT, &ffe9_color(0, 255, 0)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flash_holds_then_restores() {
        let transport = MockTransport::new();
        let dispatcher = dispatcher(&transport);
        let stage = Stage::new(Some(light(LEFT)), None);
        let hold = Duration::from_millis(250);

        let report = dispatcher
            .flash(
                &stage.group(Target::Both),
                &Command::static_color(255, 255, 255, 255),
                hold,
                &Command::color(RgbColor::RED),
            )
            .await;

        assert!(report.flash.all_ok());
        assert!(report.restore.all_ok());

        let writes = transport.writes();
        let flash = writes
            .iter()
            .find(|w| w.bytes == [0x56, 0xFF, 0xFF, 0xFF, 0xFF, 0xF0, 0xAA])
            .unwrap();
        let restore = writes
            .iter()
            .find(|w| w.bytes == ffe9_color(255, 0, 0))
            .unwrap();
        assert!(restore.at - flash.at >= hold);
    }
}
