// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered registry of configured plugs.
//!
//! The registry maps each configured address to a [`DeviceRecord`]. Its
//! insertion order is the 1-based position users type in the console, so
//! records are only ever appended or replaced in place, never re-sorted.
//!
//! Every configured address gets a record, including the ones that could
//! not be probed: those are kept as [`DeviceHandle::Unreachable`] so the
//! user still sees them listed.
//!
//! # Refresh
//!
//! [`Registry::refresh`] probes addresses that are not registered yet and
//! re-probes records that are currently unreachable. Reachable records are
//! left alone, so a refresh does not pick up state changes made by other
//! controllers; the power engine re-queries live state before acting anyway.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::device::{PlugClient, PlugConnector};
use crate::error::Error;
use crate::types::PowerState;

/// Control handle of a record.
#[derive(Debug, Clone)]
pub enum DeviceHandle<C> {
    /// An open session to the plug.
    Reachable(C),
    /// The plug could not be probed, or a later operation failed.
    Unreachable,
}

/// In-memory representation of one plug.
#[derive(Debug, Clone)]
pub struct DeviceRecord<C> {
    pub(crate) address: String,
    pub(crate) name: String,
    pub(crate) power: Option<PowerState>,
    pub(crate) handle: DeviceHandle<C>,
}

impl<C> DeviceRecord<C> {
    /// Creates a record for a plug that answered its probe.
    #[must_use]
    pub fn reachable(
        address: impl Into<String>,
        name: impl Into<String>,
        power: PowerState,
        client: C,
    ) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            power: Some(power),
            handle: DeviceHandle::Reachable(client),
        }
    }

    /// Creates a record for a plug that could not be probed.
    ///
    /// The address doubles as display name.
    #[must_use]
    pub fn unreachable(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            name: address.clone(),
            address,
            power: None,
            handle: DeviceHandle::Unreachable,
        }
    }

    /// Returns the network address (registry key).
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the last known power state, `None` when unknown.
    #[must_use]
    pub fn power(&self) -> Option<PowerState> {
        self.power
    }

    /// Returns the open session, if the plug is reachable.
    #[must_use]
    pub fn client(&self) -> Option<&C> {
        match &self.handle {
            DeviceHandle::Reachable(client) => Some(client),
            DeviceHandle::Unreachable => None,
        }
    }

    /// Returns `true` if the record holds an open session.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        matches!(self.handle, DeviceHandle::Reachable(_))
    }

    /// Drops the session and forgets the power state.
    ///
    /// The display name is kept so the user still recognises the plug.
    pub fn mark_unreachable(&mut self) {
        self.handle = DeviceHandle::Unreachable;
        self.power = None;
    }

    /// Returns a read-only snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> DeviceView {
        DeviceView {
            address: self.address.clone(),
            name: self.name.clone(),
            power: self.power,
            reachable: self.is_reachable(),
        }
    }
}

/// Snapshot of a record, safe to hand to another thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceView {
    /// Network address (registry key).
    pub address: String,
    /// Display name.
    pub name: String,
    /// Last known power state.
    pub power: Option<PowerState>,
    /// Whether the plug holds an open session.
    pub reachable: bool,
}

/// Progress of a probe, reported while the registry is built or refreshed.
#[derive(Debug)]
pub enum ProbeEvent<'a> {
    /// A probe is about to start.
    Connecting(&'a str),
    /// The plug answered.
    Connected {
        /// Probed address.
        address: &'a str,
        /// Name reported by the plug.
        name: &'a str,
    },
    /// The plug could not be reached.
    Failed {
        /// Probed address.
        address: &'a str,
        /// Cause of the failure.
        error: &'a Error,
    },
}

/// Opens a session to `address` and reads its name and power state.
///
/// Never fails: an unreachable plug yields an unreachable record.
pub async fn probe<K: PlugConnector>(
    connector: &K,
    address: &str,
    on_probe: &mut impl FnMut(ProbeEvent<'_>),
) -> DeviceRecord<K::Client> {
    on_probe(ProbeEvent::Connecting(address));

    match try_probe(connector, address).await {
        Ok(record) => {
            tracing::info!(address, name = %record.name, power = ?record.power, "Plug probed");
            on_probe(ProbeEvent::Connected {
                address,
                name: &record.name,
            });
            record
        }
        Err(error) => {
            tracing::warn!(address, %error, "Plug probe failed");
            on_probe(ProbeEvent::Failed {
                address,
                error: &error,
            });
            DeviceRecord::unreachable(address)
        }
    }
}

async fn try_probe<K: PlugConnector>(
    connector: &K,
    address: &str,
) -> Result<DeviceRecord<K::Client>, Error> {
    let client = connector.connect(address).await?;
    let name = client.name().await?;
    let power = client.power_state().await?;
    Ok(DeviceRecord::reachable(address, name, power, client))
}

/// Insertion-ordered mapping from address to [`DeviceRecord`].
#[derive(Debug)]
pub struct Registry<C> {
    records: IndexMap<String, DeviceRecord<C>>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
        }
    }
}

impl<C: PlugClient> Registry<C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Probes every address once and returns the resulting registry.
    ///
    /// Duplicate addresses are registered once, at their first position.
    pub async fn build<K>(
        connector: &K,
        addresses: &[String],
        on_probe: &mut impl FnMut(ProbeEvent<'_>),
    ) -> Self
    where
        K: PlugConnector<Client = C>,
    {
        let mut registry = Self::new();
        registry.refresh(connector, addresses, on_probe).await;
        registry
    }

    /// Registers new addresses and re-probes unreachable records.
    ///
    /// Reachable records are not contacted. A record whose re-probe fails
    /// keeps the name it was last known by. Returns the number of probes
    /// performed.
    pub async fn refresh<K>(
        &mut self,
        connector: &K,
        addresses: &[String],
        on_probe: &mut impl FnMut(ProbeEvent<'_>),
    ) -> usize
    where
        K: PlugConnector<Client = C>,
    {
        let mut seen = HashSet::new();
        let mut probes = 0;

        for address in addresses {
            if !seen.insert(address.as_str()) {
                continue;
            }
            if self
                .records
                .get(address)
                .is_some_and(DeviceRecord::is_reachable)
            {
                continue;
            }

            let mut record = probe(connector, address, on_probe).await;
            if !record.is_reachable()
                && let Some(existing) = self.records.get(address)
            {
                record.name.clone_from(&existing.name);
            }
            // Re-inserting an existing key keeps its position.
            self.records.insert(address.clone(), record);
            probes += 1;
        }

        probes
    }
}

impl<C> Registry<C> {
    /// Inserts a record, replacing any record with the same address in place.
    pub fn insert(&mut self, record: DeviceRecord<C>) {
        self.records.insert(record.address.clone(), record);
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no address is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record at a 1-based position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&DeviceRecord<C>> {
        let index = position.checked_sub(1)?;
        self.records.get_index(index).map(|(_, record)| record)
    }

    /// Returns the record at a 1-based position, mutably.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut DeviceRecord<C>> {
        let index = position.checked_sub(1)?;
        self.records.get_index_mut(index).map(|(_, record)| record)
    }

    /// Returns the record registered for `address`.
    #[must_use]
    pub fn by_address(&self, address: &str) -> Option<&DeviceRecord<C>> {
        self.records.get(address)
    }

    /// Returns the record registered for `address`, mutably.
    pub fn by_address_mut(&mut self, address: &str) -> Option<&mut DeviceRecord<C>> {
        self.records.get_mut(address)
    }

    /// Iterates records in position order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord<C>> {
        self.records.values()
    }

    /// Iterates records mutably in position order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DeviceRecord<C>> {
        self.records.values_mut()
    }

    /// Returns snapshots of every record, in position order.
    #[must_use]
    pub fn views(&self) -> Vec<DeviceView> {
        self.iter().map(DeviceRecord::view).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::fake::{FakeConnector, FakePlug};

    fn addresses(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn ignore(_: ProbeEvent<'_>) {}

    #[tokio::test]
    async fn build_keeps_first_seen_order() {
        let connector = FakeConnector::new()
            .with_plug("10.0.0.3", "Heater", PowerState::On)
            .with_plug("10.0.0.1", "Lamp", PowerState::Off)
            .with_plug("10.0.0.2", "Fan", PowerState::Off);

        let registry = Registry::build(
            &connector,
            &addresses(&["10.0.0.3", "10.0.0.1", "10.0.0.2"]),
            &mut ignore,
        )
        .await;

        let names: Vec<_> = registry.iter().map(DeviceRecord::name).collect();
        assert_eq!(names, ["Heater", "Lamp", "Fan"]);
        assert_eq!(registry.get(1).unwrap().power(), Some(PowerState::On));
        assert_eq!(registry.get(2).unwrap().address(), "10.0.0.1");
    }

    #[tokio::test]
    async fn build_deduplicates_addresses() {
        let connector = FakeConnector::new()
            .with_plug("10.0.0.1", "Lamp", PowerState::Off)
            .with_plug("10.0.0.2", "Fan", PowerState::Off);

        let registry = Registry::build(
            &connector,
            &addresses(&["10.0.0.1", "10.0.0.2", "10.0.0.1"]),
            &mut ignore,
        )
        .await;

        assert_eq!(registry.len(), 2);
        assert_eq!(connector.probes(), ["10.0.0.1", "10.0.0.2"]);
    }

    #[tokio::test]
    async fn failed_probe_is_listed_as_unreachable() {
        let connector = FakeConnector::new().with_plug("10.0.0.1", "Lamp", PowerState::On);
        let mut events = Vec::new();

        let registry = Registry::build(
            &connector,
            &addresses(&["10.0.0.9", "10.0.0.1"]),
            &mut |event| {
                events.push(match event {
                    ProbeEvent::Connecting(address) => format!("connecting {address}"),
                    ProbeEvent::Connected { name, .. } => format!("connected {name}"),
                    ProbeEvent::Failed { address, .. } => format!("failed {address}"),
                });
            },
        )
        .await;

        let missing = registry.get(1).unwrap();
        assert!(!missing.is_reachable());
        assert_eq!(missing.name(), "10.0.0.9");
        assert_eq!(missing.power(), None);
        assert!(registry.get(2).unwrap().is_reachable());
        assert_eq!(
            events,
            [
                "connecting 10.0.0.9",
                "failed 10.0.0.9",
                "connecting 10.0.0.1",
                "connected Lamp"
            ]
        );
    }

    #[tokio::test]
    async fn probe_failing_after_connect_is_unreachable() {
        let connector = FakeConnector::new();
        connector
            .add_plug("10.0.0.1", "Lamp", PowerState::On)
            .set_failing(true);

        let record = probe(&connector, "10.0.0.1", &mut ignore).await;
        assert!(!record.is_reachable());
    }

    #[tokio::test]
    async fn refresh_adds_new_addresses_at_the_end() {
        let connector = FakeConnector::new()
            .with_plug("10.0.0.1", "Lamp", PowerState::Off)
            .with_plug("10.0.0.2", "Fan", PowerState::Off);
        let mut registry =
            Registry::build(&connector, &addresses(&["10.0.0.2"]), &mut ignore).await;

        let probes = registry
            .refresh(&connector, &addresses(&["10.0.0.2", "10.0.0.1"]), &mut ignore)
            .await;

        assert_eq!(probes, 1);
        assert_eq!(registry.get(1).unwrap().name(), "Fan");
        assert_eq!(registry.get(2).unwrap().name(), "Lamp");
    }

    #[tokio::test]
    async fn refresh_leaves_reachable_records_untouched() {
        let connector = FakeConnector::new().with_plug("10.0.0.1", "Lamp", PowerState::Off);
        let list = addresses(&["10.0.0.1"]);
        let mut registry = Registry::build(&connector, &list, &mut ignore).await;
        connector.plug("10.0.0.1").set_externally(PowerState::On);

        let probes = registry.refresh(&connector, &list, &mut ignore).await;

        assert_eq!(probes, 0);
        assert_eq!(connector.probes(), ["10.0.0.1"]);
        assert_eq!(registry.get(1).unwrap().power(), Some(PowerState::Off));
    }

    #[tokio::test]
    async fn refresh_reprobes_unreachable_in_place() {
        let connector = FakeConnector::new().with_plug("10.0.0.1", "Lamp", PowerState::Off);
        let list = addresses(&["10.0.0.2", "10.0.0.1"]);
        let mut registry = Registry::build(&connector, &list, &mut ignore).await;
        assert!(!registry.get(1).unwrap().is_reachable());

        connector.add_plug("10.0.0.2", "Fan", PowerState::On);
        registry.refresh(&connector, &list, &mut ignore).await;

        let fan = registry.get(1).unwrap();
        assert!(fan.is_reachable());
        assert_eq!(fan.name(), "Fan");
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn failed_reprobe_keeps_known_name() {
        let connector = FakeConnector::new().with_plug("10.0.0.1", "Lamp", PowerState::On);
        let list = addresses(&["10.0.0.1"]);
        let mut registry = Registry::build(&connector, &list, &mut ignore).await;
        registry.get_mut(1).unwrap().mark_unreachable();
        connector.plug("10.0.0.1").set_failing(true);

        let probes = registry.refresh(&connector, &list, &mut ignore).await;

        assert_eq!(probes, 1);
        let lamp = registry.get(1).unwrap();
        assert!(!lamp.is_reachable());
        assert_eq!(lamp.name(), "Lamp");
        assert_eq!(lamp.power(), None);
    }

    #[test]
    fn positions_are_one_based() {
        let mut registry: Registry<FakePlug> = Registry::new();
        registry.insert(DeviceRecord::unreachable("10.0.0.1"));

        assert!(registry.get(0).is_none());
        assert!(registry.get(1).is_some());
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn mark_unreachable_keeps_name() {
        let plug = FakePlug::new("Lamp", PowerState::On);
        let mut record = DeviceRecord::reachable("10.0.0.1", "Lamp", PowerState::On, plug);

        record.mark_unreachable();

        let view = record.view();
        assert_eq!(view.name, "Lamp");
        assert_eq!(view.power, None);
        assert!(!view.reachable);
    }
}
