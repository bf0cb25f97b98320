// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tasmota plug client over HTTP.

use std::time::Duration;

use crate::command::{PowerCommand, StatusCommand};
use crate::device::{PlugClient, PlugConnector};
use crate::error::Error;
use crate::protocol::{HttpClient, HttpConfig, Protocol};
use crate::response::{PowerResponse, StatusResponse};
use crate::types::PowerState;

/// Opens HTTP sessions to Tasmota plugs with one set of credentials.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tasmor_panel::device::TasmotaConnector;
///
/// let connector = TasmotaConnector::new("admin", "secret")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(connector.timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct TasmotaConnector {
    username: String,
    password: String,
    timeout: Duration,
}

impl TasmotaConnector {
    /// Creates a connector that authenticates with the given account.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            timeout: HttpConfig::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl PlugConnector for TasmotaConnector {
    type Client = TasmotaPlug;

    async fn connect(&self, address: &str) -> Result<TasmotaPlug, Error> {
        let client = HttpConfig::new(address)
            .with_credentials(self.username.as_str(), self.password.as_str())
            .with_timeout(self.timeout)
            .into_client()?;

        Ok(TasmotaPlug {
            address: address.to_string(),
            client,
        })
    }
}

/// A session to one Tasmota plug.
#[derive(Debug, Clone)]
pub struct TasmotaPlug {
    address: String,
    client: HttpClient,
}

impl TasmotaPlug {
    /// Returns the address this session was opened for.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn set_power(&self, state: PowerState) -> Result<(), Error> {
        self.client
            .send_command(&PowerCommand::set(state))
            .await?;
        Ok(())
    }
}

impl PlugClient for TasmotaPlug {
    async fn name(&self) -> Result<String, Error> {
        let response = self
            .client
            .send_command(&StatusCommand::abbreviated())
            .await?;
        let status: StatusResponse = response.parse()?;

        Ok(status
            .display_name()
            .map_or_else(|| self.address.clone(), str::to_string))
    }

    async fn power_state(&self) -> Result<PowerState, Error> {
        let response = self.client.send_command(&PowerCommand::query()).await?;
        let power: PowerResponse = response.parse()?;
        Ok(power.power_state()?)
    }

    async fn switch_on(&self) -> Result<(), Error> {
        self.set_power(PowerState::On).await
    }

    async fn switch_off(&self) -> Result<(), Error> {
        self.set_power(PowerState::Off).await
    }
}
