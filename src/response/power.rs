// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power response parsing.

use serde::Deserialize;

use crate::error::ParseError;
use crate::types::PowerState;

/// Response from a Power command.
///
/// Single-relay plugs answer `{"POWER": "ON"}`; some firmware builds answer
/// with an indexed key (`{"POWER1": "ON"}`) even for one relay.
///
/// # Examples
///
/// ```
/// use tasmor_panel::response::PowerResponse;
/// use tasmor_panel::types::PowerState;
///
/// let response: PowerResponse = serde_json::from_str(r#"{"POWER": "ON"}"#).unwrap();
/// assert_eq!(response.power_state().unwrap(), PowerState::On);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PowerResponse {
    #[serde(rename = "POWER", default)]
    power: Option<String>,
    #[serde(rename = "POWER1", default)]
    power1: Option<String>,
}

impl PowerResponse {
    /// Returns the relay state carried by the response.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingField` if the response has no power key,
    /// or `ParseError::InvalidValue` if the value is not a known state.
    pub fn power_state(&self) -> Result<PowerState, ParseError> {
        self.power1
            .as_deref()
            .or(self.power.as_deref())
            .ok_or_else(|| ParseError::MissingField("POWER".to_string()))?
            .parse()
    }
}
