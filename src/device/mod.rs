// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plug sessions.
//!
//! The panel never talks to the network directly. It goes through two small
//! traits:
//!
//! - [`PlugConnector`] opens a session to one plug address (the first half of
//!   a probe). It carries the account credentials and request timeout.
//! - [`PlugClient`] is the session: query the name and relay state, switch
//!   the relay on or off.
//!
//! [`TasmotaConnector`] implements both over the Tasmota web command API.
//!
//! ```no_run
//! use tasmor_panel::device::{PlugClient, PlugConnector, TasmotaConnector};
//!
//! # async fn example() -> tasmor_panel::Result<()> {
//! let connector = TasmotaConnector::new("admin", "secret");
//! let plug = connector.connect("192.168.1.100").await?;
//! plug.switch_on().await?;
//! println!("{} is {}", plug.name().await?, plug.power_state().await?);
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
pub(crate) mod fake;
mod tasmota;

pub use tasmota::{TasmotaConnector, TasmotaPlug};

use crate::error::Error;
use crate::types::PowerState;

/// An open session to a single smart plug.
///
/// Every call is a network round trip and may fail.
#[allow(async_fn_in_trait)]
pub trait PlugClient {
    /// Returns the name the plug was given by its owner.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be reached or answers garbage.
    async fn name(&self) -> Result<String, Error>;

    /// Queries the live relay state.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be reached or answers garbage.
    async fn power_state(&self) -> Result<PowerState, Error>;

    /// Switches the relay on.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    async fn switch_on(&self) -> Result<(), Error>;

    /// Switches the relay off.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    async fn switch_off(&self) -> Result<(), Error>;
}

/// Opens sessions to plugs by address.
#[allow(async_fn_in_trait)]
pub trait PlugConnector {
    /// Session type produced by this connector.
    type Client: PlugClient;

    /// Opens a session to the plug at `address`.
    ///
    /// # Errors
    ///
    /// Returns error if the address is unusable or the session cannot be
    /// created.
    async fn connect(&self, address: &str) -> Result<Self::Client, Error>;
}
