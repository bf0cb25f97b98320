// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status query command.

use crate::command::Command;

/// Command to query device status.
///
/// The panel only needs the abbreviated form, which carries the device and
/// friendly names used for display.
///
/// # Examples
///
/// ```
/// use tasmor_panel::command::{Command, StatusCommand};
///
/// let abbrev = StatusCommand::abbreviated();
/// assert_eq!(abbrev.to_http_command(), "Status");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCommand;

impl StatusCommand {
    /// Query abbreviated status.
    #[must_use]
    pub const fn abbreviated() -> Self {
        Self
    }
}

impl Command for StatusCommand {
    fn name(&self) -> String {
        "Status".to_string()
    }

    fn payload(&self) -> Option<String> {
        None
    }
}
