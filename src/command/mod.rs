// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tasmota commands used by the panel.
//!
//! Only the commands a smart plug needs are modelled:
//!
//! | Command Type | Purpose | Example |
//! |-------------|---------|---------|
//! | [`PowerCommand`] | Query or set relay power | `Power`, `Power ON` |
//! | [`StatusCommand`] | Query device parameters | `Status` |
//!
//! # Examples
//!
//! ```
//! use tasmor_panel::command::{Command, PowerCommand};
//! use tasmor_panel::types::PowerState;
//!
//! let cmd = PowerCommand::set(PowerState::On);
//! assert_eq!(cmd.name(), "Power");
//! assert_eq!(cmd.to_http_command(), "Power ON");
//! ```

mod power;
mod status;

pub use power::PowerCommand;
pub use status::StatusCommand;

/// A command that can be sent to a Tasmota device.
pub trait Command {
    /// Returns the command name, for example `"Power"` or `"Status"`.
    fn name(&self) -> String;

    /// Returns the command payload, if any.
    ///
    /// - `Power ON` has payload `Some("ON")`
    /// - `Power` (query) has payload `None`
    fn payload(&self) -> Option<String>;

    /// Returns the full command string for HTTP requests.
    ///
    /// Format: `<name> <payload>` or just `<name>` if no payload.
    fn to_http_command(&self) -> String {
        match self.payload() {
            Some(p) => format!("{} {}", self.name(), p),
            None => self.name(),
        }
    }
}
