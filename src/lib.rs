// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `TasmoR` Panel - toggle Tasmota smart plugs from a terminal menu or a
//! desktop window.
//!
//! The panel probes every configured plug once, keeps the result in an
//! ordered [`Registry`], and lets the user switch plugs on or off by their
//! 1-based position. Every power operation re-queries the plug, so a plug
//! switched by another controller is never toggled the wrong way.
//!
//! # Layers
//!
//! - [`device`]: the [`PlugClient`] / [`PlugConnector`] traits and their
//!   Tasmota HTTP implementation.
//! - [`registry`]: ordered address → record map, built by probing.
//! - [`selection`]: the console's `1,3` / `2-4` / `refresh` / `exit` grammar.
//! - [`engine`]: on / off / toggle against one record.
//! - [`control`]: the non-interactive repeat loop.
//! - [`console`] and `gui`: the two front ends. The window talks to a
//!   [`worker::Worker`] over channels and never touches the registry.
//!
//! # Quick Start
//!
//! ```no_run
//! use tasmor_panel::{Registry, TasmotaConnector, engine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let connector = TasmotaConnector::new("admin", "secret");
//!     let addresses = vec!["192.168.1.100".to_string()];
//!     let mut registry = Registry::build(&connector, &addresses, &mut |_| {}).await;
//!
//!     if let Some(record) = registry.get_mut(1) {
//!         match engine::toggle(record).await {
//!             Ok(Some(state)) => println!("{} is {state}", record.name()),
//!             Ok(None) => println!("{} is unreachable", record.name()),
//!             Err(e) => eprintln!("toggle failed: {e}"),
//!         }
//!     }
//! }
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod console;
pub mod control;
pub mod device;
pub mod engine;
pub mod error;
pub mod event;
#[cfg(feature = "gui")]
pub mod gui;
pub mod protocol;
pub mod registry;
pub mod response;
pub mod selection;
pub mod shutdown;
pub mod types;
pub mod worker;

pub use command::{Command, PowerCommand, StatusCommand};
pub use device::{PlugClient, PlugConnector, TasmotaConnector, TasmotaPlug};
pub use engine::{Outcome, PowerAction};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result};
pub use protocol::HttpConfig;
pub use registry::{DeviceHandle, DeviceRecord, DeviceView, Registry};
pub use response::{PowerResponse, StatusResponse};
pub use types::PowerState;
