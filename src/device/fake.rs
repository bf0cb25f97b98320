// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory plugs for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::device::{PlugClient, PlugConnector};
use crate::error::{Error, ProtocolError};
use crate::types::PowerState;

#[derive(Debug)]
struct PlugState {
    name: String,
    power: PowerState,
    failing: bool,
    calls: Vec<&'static str>,
}

/// A plug whose relay lives in memory. Clones share the same relay.
#[derive(Debug, Clone)]
pub(crate) struct FakePlug {
    state: Arc<Mutex<PlugState>>,
}

impl FakePlug {
    pub(crate) fn new(name: &str, power: PowerState) -> Self {
        Self {
            state: Arc::new(Mutex::new(PlugState {
                name: name.to_string(),
                power,
                failing: false,
                calls: Vec::new(),
            })),
        }
    }

    /// Flips the relay as another controller (a phone app) would.
    pub(crate) fn set_externally(&self, power: PowerState) {
        self.state.lock().unwrap().power = power;
    }

    pub(crate) fn power(&self) -> PowerState {
        self.state.lock().unwrap().power
    }

    /// Makes every following call fail with a connection error.
    pub(crate) fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: &'static str) -> Result<std::sync::MutexGuard<'_, PlugState>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing {
            return Err(ProtocolError::ConnectionFailed(format!("{call} timed out")).into());
        }
        Ok(state)
    }
}

impl PlugClient for FakePlug {
    async fn name(&self) -> Result<String, Error> {
        Ok(self.record("name")?.name.clone())
    }

    async fn power_state(&self) -> Result<PowerState, Error> {
        Ok(self.record("query")?.power)
    }

    async fn switch_on(&self) -> Result<(), Error> {
        self.record("on")?.power = PowerState::On;
        Ok(())
    }

    async fn switch_off(&self) -> Result<(), Error> {
        self.record("off")?.power = PowerState::Off;
        Ok(())
    }
}

/// Connector over a set of fake plugs; unknown addresses fail to connect.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeConnector {
    plugs: Arc<Mutex<HashMap<String, FakePlug>>>,
    probes: Arc<Mutex<Vec<String>>>,
}

impl FakeConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_plug(self, address: &str, name: &str, power: PowerState) -> Self {
        self.add_plug(address, name, power);
        self
    }

    pub(crate) fn add_plug(&self, address: &str, name: &str, power: PowerState) -> FakePlug {
        let plug = FakePlug::new(name, power);
        self.plugs
            .lock()
            .unwrap()
            .insert(address.to_string(), plug.clone());
        plug
    }

    pub(crate) fn plug(&self, address: &str) -> FakePlug {
        self.plugs.lock().unwrap()[address].clone()
    }

    /// Addresses passed to `connect`, in call order.
    pub(crate) fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }
}

impl PlugConnector for FakeConnector {
    type Client = FakePlug;

    async fn connect(&self, address: &str) -> Result<FakePlug, Error> {
        self.probes.lock().unwrap().push(address.to_string());
        self.plugs
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| ProtocolError::ConnectionFailed(format!("{address} unreachable")).into())
    }
}
