// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power operations against a device record.
//!
//! Every operation queries the plug after switching it, and [`toggle`]
//! also queries before deciding which way to switch. The cached state of a
//! record is never trusted for a decision: the plug may have been switched
//! by another controller since it was last read.
//!
//! The three primitives propagate adapter errors. [`perform`] wraps them
//! for front ends: it catches the error, degrades the record to unreachable
//! and reports what happened as an [`Outcome`].

use crate::device::PlugClient;
use crate::error::Error;
use crate::registry::DeviceRecord;
use crate::types::PowerState;

/// Switches the plug on and stores its post-operation state.
///
/// Returns whether the plug reads on afterwards. An unreachable record is
/// left alone and yields `Ok(false)`.
///
/// # Errors
///
/// Returns error if the switch or the follow-up query fails.
pub async fn power_on<C: PlugClient>(record: &mut DeviceRecord<C>) -> Result<bool, Error> {
    let Some(client) = record.client() else {
        return Ok(false);
    };
    client.switch_on().await?;
    let state = client.power_state().await?;
    record.power = Some(state);
    Ok(state.is_on())
}

/// Switches the plug off and stores its post-operation state.
///
/// Returns whether the plug reads off afterwards. An unreachable record is
/// left alone and yields `Ok(false)`.
///
/// # Errors
///
/// Returns error if the switch or the follow-up query fails.
pub async fn power_off<C: PlugClient>(record: &mut DeviceRecord<C>) -> Result<bool, Error> {
    let Some(client) = record.client() else {
        return Ok(false);
    };
    client.switch_off().await?;
    let state = client.power_state().await?;
    record.power = Some(state);
    Ok(!state.is_on())
}

/// Switches the plug to the opposite of its live state.
///
/// Returns the state read after switching, or `None` for an unreachable
/// record.
///
/// # Errors
///
/// Returns error if any of the three round trips fails.
pub async fn toggle<C: PlugClient>(
    record: &mut DeviceRecord<C>,
) -> Result<Option<PowerState>, Error> {
    let Some(client) = record.client() else {
        return Ok(None);
    };
    let current = client.power_state().await?;
    match current.opposite() {
        PowerState::On => client.switch_on().await?,
        PowerState::Off => client.switch_off().await?,
    }
    let state = client.power_state().await?;
    record.power = Some(state);
    Ok(Some(state))
}

/// Operation requested by a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    /// Switch on.
    On,
    /// Switch off.
    Off,
    /// Switch to the opposite of the live state.
    Toggle,
}

/// Result of [`perform`].
#[derive(Debug)]
pub enum Outcome {
    /// The plug reads the requested state (or toggled to this state).
    Applied(PowerState),
    /// The plug answered but does not read the requested state.
    NotApplied(Option<PowerState>),
    /// The record was already unreachable; nothing was sent.
    Unreachable,
    /// The operation failed and the record is now unreachable.
    Failed(Error),
}

/// Runs `action` against `record`, degrading the record on failure.
pub async fn perform<C: PlugClient>(record: &mut DeviceRecord<C>, action: PowerAction) -> Outcome {
    if !record.is_reachable() {
        return Outcome::Unreachable;
    }

    let result = match action {
        PowerAction::On => power_on(record).await.map(|on| on.then_some(PowerState::On)),
        PowerAction::Off => power_off(record).await.map(|off| off.then_some(PowerState::Off)),
        PowerAction::Toggle => toggle(record).await,
    };

    match result {
        Ok(Some(state)) => {
            tracing::info!(address = %record.address, ?action, %state, "Plug switched");
            Outcome::Applied(state)
        }
        Ok(None) => {
            tracing::warn!(address = %record.address, ?action, power = ?record.power, "Plug did not switch");
            Outcome::NotApplied(record.power)
        }
        Err(error) => {
            tracing::warn!(address = %record.address, %error, "Plug operation failed");
            record.mark_unreachable();
            Outcome::Failed(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::fake::FakePlug;

    fn record(plug: &FakePlug) -> DeviceRecord<FakePlug> {
        DeviceRecord::reachable("10.0.0.1", "Lamp", plug.power(), plug.clone())
    }

    #[tokio::test]
    async fn power_on_requeries_state() {
        let plug = FakePlug::new("Lamp", PowerState::Off);
        let mut record = record(&plug);

        assert!(power_on(&mut record).await.unwrap());
        assert_eq!(record.power(), Some(PowerState::On));
        assert_eq!(plug.calls(), ["on", "query"]);
    }

    #[tokio::test]
    async fn power_off_requeries_state() {
        let plug = FakePlug::new("Lamp", PowerState::On);
        let mut record = record(&plug);

        assert!(power_off(&mut record).await.unwrap());
        assert_eq!(record.power(), Some(PowerState::Off));
        assert_eq!(plug.power(), PowerState::Off);
    }

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let plug = FakePlug::new("Lamp", PowerState::Off);
        let mut record = record(&plug);

        assert_eq!(toggle(&mut record).await.unwrap(), Some(PowerState::On));
        assert_eq!(toggle(&mut record).await.unwrap(), Some(PowerState::Off));
        assert_eq!(plug.power(), PowerState::Off);
    }

    #[tokio::test]
    async fn toggle_uses_live_state_not_cache() {
        let plug = FakePlug::new("Lamp", PowerState::Off);
        let mut record = record(&plug);
        plug.set_externally(PowerState::On);

        assert_eq!(toggle(&mut record).await.unwrap(), Some(PowerState::Off));
        assert_eq!(plug.calls(), ["query", "off", "query"]);
    }

    #[tokio::test]
    async fn unreachable_record_is_noop() {
        let mut record: DeviceRecord<FakePlug> = DeviceRecord::unreachable("10.0.0.1");

        assert!(!power_on(&mut record).await.unwrap());
        assert!(!power_off(&mut record).await.unwrap());
        assert_eq!(toggle(&mut record).await.unwrap(), None);
        assert!(matches!(
            perform(&mut record, PowerAction::Toggle).await,
            Outcome::Unreachable
        ));
    }

    #[tokio::test]
    async fn errors_propagate_from_primitives() {
        let plug = FakePlug::new("Lamp", PowerState::Off);
        let mut record = record(&plug);
        plug.set_failing(true);

        assert!(toggle(&mut record).await.is_err());
        assert!(record.is_reachable());
    }

    #[tokio::test]
    async fn perform_degrades_on_failure() {
        let plug = FakePlug::new("Lamp", PowerState::On);
        let mut record = record(&plug);
        plug.set_failing(true);

        let outcome = perform(&mut record, PowerAction::Off).await;

        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(!record.is_reachable());
        assert_eq!(record.power(), None);
        assert_eq!(record.name(), "Lamp");
    }

    #[tokio::test]
    async fn perform_reports_applied_state() {
        let plug = FakePlug::new("Lamp", PowerState::On);
        let mut record = record(&plug);

        let outcome = perform(&mut record, PowerAction::Toggle).await;
        assert!(matches!(outcome, Outcome::Applied(PowerState::Off)));

        let outcome = perform(&mut record, PowerAction::On).await;
        assert!(matches!(outcome, Outcome::Applied(PowerState::On)));
    }
}
