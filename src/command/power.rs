// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power control command.

use crate::command::Command;
use crate::types::PowerState;

/// Command to query or set the relay of a single-relay plug.
///
/// Toggling is deliberately absent: the panel always reads the live state
/// first and then sends an explicit `ON` or `OFF`.
///
/// # Examples
///
/// ```
/// use tasmor_panel::command::{Command, PowerCommand};
/// use tasmor_panel::types::PowerState;
///
/// let query = PowerCommand::query();
/// assert_eq!(query.payload(), None);
///
/// let off = PowerCommand::set(PowerState::Off);
/// assert_eq!(off.payload(), Some("OFF".to_string()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCommand {
    /// Query the current power state.
    Get,
    /// Set the power state.
    Set(PowerState),
}

impl PowerCommand {
    /// Creates a command to query the relay state.
    #[must_use]
    pub const fn query() -> Self {
        Self::Get
    }

    /// Creates a command to switch the relay to `state`.
    #[must_use]
    pub const fn set(state: PowerState) -> Self {
        Self::Set(state)
    }
}

impl Command for PowerCommand {
    fn name(&self) -> String {
        "Power".to_string()
    }

    fn payload(&self) -> Option<String> {
        match self {
            Self::Get => None,
            Self::Set(state) => Some(state.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_on_payload() {
        let cmd = PowerCommand::set(PowerState::On);
        assert_eq!(cmd.name(), "Power");
        assert_eq!(cmd.payload(), Some("ON".to_string()));
    }

    #[test]
    fn query_has_no_payload() {
        assert_eq!(PowerCommand::query(), PowerCommand::Get);
        assert_eq!(PowerCommand::Get.payload(), None);
    }
}
