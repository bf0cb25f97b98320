// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for worker results.
//!
//! The operation worker publishes a [`PanelEvent`] after each request it
//! completes. The [`EventBus`] uses tokio's broadcast channel, so the window
//! and anything else interested (a repaint waker, tests) can subscribe
//! independently.
//!
//! # Examples
//!
//! ```
//! use tasmor_panel::event::{EventBus, PanelEvent};
//!
//! let bus = EventBus::new();
//!
//! // Subscribe to events
//! let mut rx = bus.subscribe();
//!
//! // Publish an event
//! bus.publish(PanelEvent::Refreshed(Vec::new()));
//! assert!(rx.try_recv().is_ok());
//! ```

mod event_bus;
mod panel_event;

pub use event_bus::EventBus;
pub use panel_event::PanelEvent;
