// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status response parsing.

use serde::Deserialize;

/// Abbreviated status response from `Status`.
///
/// # Examples
///
/// ```
/// use tasmor_panel::response::StatusResponse;
///
/// let json = r#"{"Status": {"Module": 1, "DeviceName": "Tasmota", "FriendlyName": ["Desk Lamp"]}}"#;
/// let response: StatusResponse = serde_json::from_str(json).unwrap();
/// assert_eq!(response.display_name(), Some("Desk Lamp"));
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusResponse {
    /// Device parameters.
    #[serde(rename = "Status")]
    pub status: Option<StatusDeviceParameters>,
}

impl StatusResponse {
    /// Returns the device name.
    #[must_use]
    pub fn device_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .map(|s| s.device_name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Returns the name to show for this plug.
    ///
    /// The first non-empty friendly name wins over the device name, as it is
    /// the one users set from the Tasmota web UI.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.friendly_name.iter().find(|n| !n.trim().is_empty()))
            .map(String::as_str)
            .or_else(|| self.device_name())
    }
}

/// Device parameters of the `Status` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusDeviceParameters {
    /// Device name.
    #[serde(default)]
    pub device_name: String,

    /// Friendly names for each relay.
    #[serde(default)]
    pub friendly_name: Vec<String>,
}
