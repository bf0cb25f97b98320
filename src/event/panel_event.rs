// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel event types.

use crate::registry::DeviceView;

/// Events emitted by the operation worker.
///
/// Events carry [`DeviceView`] snapshots, never records: subscribers keep
/// their own copies and cannot mutate the registry.
///
/// # Examples
///
/// ```
/// use tasmor_panel::event::PanelEvent;
/// use tasmor_panel::registry::DeviceView;
/// use tasmor_panel::types::PowerState;
///
/// let view = DeviceView {
///     address: "192.168.1.100".to_string(),
///     name: "Lamp".to_string(),
///     power: Some(PowerState::On),
///     reachable: true,
/// };
/// let event = PanelEvent::DeviceUpdated(view);
/// assert_eq!(event.address(), Some("192.168.1.100"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// A toggle request finished, successfully or not.
    DeviceUpdated(DeviceView),

    /// A refresh finished. Carries every record in position order.
    Refreshed(Vec<DeviceView>),
}

impl PanelEvent {
    /// Returns the address of the updated device, if the event concerns one.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::DeviceUpdated(view) => Some(&view.address),
            Self::Refreshed(_) => None,
        }
    }
}
