// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-interactive power control.
//!
//! With `--power_on`, `--power_off` or `--toggle` the panel skips its menu
//! and applies the operation to the `--ip` targets, once or every
//! `--power_interval` seconds until interrupted.

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;

use crate::device::PlugClient;
use crate::engine::{self, Outcome, PowerAction};
use crate::registry::{DeviceRecord, Registry};
use crate::shutdown::Shutdown;

/// Applies `action` to one record, repeating every `interval`.
///
/// A zero interval runs the operation exactly once. The stop signal is
/// checked before each operation and raced against the sleep; a request
/// already on the wire is allowed to finish. The loop also ends once an
/// operation fails, since the record is then unreachable. Returns the
/// number of operations performed.
pub async fn run<C, F>(
    record: &mut DeviceRecord<C>,
    action: PowerAction,
    interval: Duration,
    mut shutdown: Shutdown,
    report: &F,
) -> usize
where
    C: PlugClient,
    F: Fn(&DeviceRecord<C>, &Outcome),
{
    let mut runs = 0;

    while !shutdown.is_triggered() {
        let outcome = engine::perform(record, action).await;
        runs += 1;
        report(record, &outcome);

        if matches!(outcome, Outcome::Failed(_)) {
            tracing::warn!(address = %record.address, "Plug lost, stopping its control loop");
            break;
        }
        if interval.is_zero() {
            break;
        }

        tokio::select! {
            () = shutdown.wait() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    tracing::debug!(address = %record.address, runs, "Direct control finished");
    runs
}

/// Runs [`run`] concurrently for every reachable target.
///
/// Targets that are not registered, or whose probe failed, are passed to
/// `invalid` once each and skipped. Returns the total number of
/// operations.
pub async fn run_targets<C, F>(
    registry: &mut Registry<C>,
    targets: &[String],
    action: PowerAction,
    interval: Duration,
    shutdown: &Shutdown,
    report: &F,
    mut invalid: impl FnMut(&str),
) -> usize
where
    C: PlugClient,
    F: Fn(&DeviceRecord<C>, &Outcome),
{
    let mut seen = HashSet::new();
    for target in targets {
        if !seen.insert(target.as_str()) {
            continue;
        }
        if !registry
            .by_address(target)
            .is_some_and(DeviceRecord::is_reachable)
        {
            tracing::warn!(address = %target, "Skipping unreachable target");
            invalid(target);
        }
    }

    let loops = registry
        .iter_mut()
        .filter(|record| record.is_reachable() && targets.contains(&record.address))
        .map(|record| run(record, action, interval, shutdown.clone(), report));

    join_all(loops).await.into_iter().sum()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::device::fake::{FakeConnector, FakePlug};
    use crate::shutdown;
    use crate::types::PowerState;

    fn record(plug: &FakePlug) -> DeviceRecord<FakePlug> {
        DeviceRecord::reachable("10.0.0.1", "Lamp", plug.power(), plug.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_runs_once_without_sleeping() {
        let plug = FakePlug::new("Lamp", PowerState::Off);
        let mut record = record(&plug);
        let (_trigger, shutdown) = shutdown::channel();
        let started = tokio::time::Instant::now();

        let runs = run(
            &mut record,
            PowerAction::Toggle,
            Duration::ZERO,
            shutdown,
            &|_, _| {},
        )
        .await;

        assert_eq!(runs, 1);
        assert_eq!(plug.power(), PowerState::On);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_repeats_until_interrupted() {
        let plug = FakePlug::new("Lamp", PowerState::Off);
        let mut record = record(&plug);
        let (trigger, shutdown) = shutdown::channel();
        let reports = RefCell::new(Vec::new());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            trigger.trigger();
        });

        let runs = run(
            &mut record,
            PowerAction::Toggle,
            Duration::from_secs(10),
            shutdown,
            &|record, _| reports.borrow_mut().push(record.power()),
        )
        .await;

        assert_eq!(runs, 3);
        assert_eq!(
            reports.into_inner(),
            [
                Some(PowerState::On),
                Some(PowerState::Off),
                Some(PowerState::On)
            ]
        );
    }

    #[tokio::test]
    async fn triggered_signal_prevents_any_operation() {
        let plug = FakePlug::new("Lamp", PowerState::Off);
        let mut record = record(&plug);
        let (trigger, shutdown) = shutdown::channel();
        trigger.trigger();

        let runs = run(&mut record, PowerAction::On, Duration::ZERO, shutdown, &|_, _| {}).await;

        assert_eq!(runs, 0);
        assert!(plug.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_degrades_reports_and_stops() {
        let plug = FakePlug::new("Lamp", PowerState::Off);
        plug.set_failing(true);
        let mut record = record(&plug);
        let (_trigger, shutdown) = shutdown::channel();
        let failed = RefCell::new(false);

        let runs = run(
            &mut record,
            PowerAction::On,
            Duration::from_secs(10),
            shutdown,
            &|_, outcome| {
                *failed.borrow_mut() = matches!(outcome, Outcome::Failed(_));
            },
        )
        .await;

        assert_eq!(runs, 1);
        assert!(failed.into_inner());
        assert!(!record.is_reachable());
    }

    #[tokio::test]
    async fn duplicate_targets_are_reported_and_run_once() {
        let connector = FakeConnector::new().with_plug("10.0.0.1", "Lamp", PowerState::Off);
        let targets: Vec<String> = ["10.0.0.9", "10.0.0.1", "10.0.0.9", "10.0.0.1"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let mut registry = Registry::build(&connector, &targets, &mut |_| {}).await;
        let (_trigger, shutdown) = shutdown::channel();
        let mut skipped = Vec::new();

        let runs = run_targets(
            &mut registry,
            &targets,
            PowerAction::Toggle,
            Duration::ZERO,
            &shutdown,
            &|_, _| {},
            |address| skipped.push(address.to_string()),
        )
        .await;

        assert_eq!(runs, 1);
        assert_eq!(skipped, ["10.0.0.9"]);
        assert_eq!(connector.plug("10.0.0.1").power(), PowerState::On);
    }

    #[tokio::test]
    async fn targets_skip_unreachable_addresses() {
        let connector = FakeConnector::new()
            .with_plug("10.0.0.1", "Lamp", PowerState::Off)
            .with_plug("10.0.0.2", "Fan", PowerState::Off);
        let targets: Vec<String> = ["10.0.0.1", "10.0.0.9", "10.0.0.2"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let mut registry = Registry::build(&connector, &targets, &mut |_| {}).await;
        let (_trigger, shutdown) = shutdown::channel();
        let mut skipped = Vec::new();

        let runs = run_targets(
            &mut registry,
            &targets,
            PowerAction::On,
            Duration::ZERO,
            &shutdown,
            &|_, _| {},
            |address| skipped.push(address.to_string()),
        )
        .await;

        assert_eq!(runs, 2);
        assert_eq!(skipped, ["10.0.0.9"]);
        assert_eq!(connector.plug("10.0.0.1").power(), PowerState::On);
        assert_eq!(connector.plug("10.0.0.2").power(), PowerState::On);
    }
}
