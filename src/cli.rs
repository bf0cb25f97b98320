// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line arguments.

use std::time::Duration;

use clap::{ArgGroup, Parser};

use crate::engine::PowerAction;

/// Toggle Tasmota smart plugs from a terminal menu or a desktop window.
///
/// Without a power flag the panel lists every configured plug and lets you
/// pick which ones to toggle. With `--power_on`, `--power_off` or `--toggle`
/// it applies that operation to the `--ip` plugs instead, once or every
/// `--power_interval` seconds.
#[derive(Parser, Clone)]
#[command(name = "tasmor-panel", version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["power_on", "power_off", "toggle"])
        .multiple(false)
))]
pub struct Cli {
    /// Account username (overrides the setup file)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Account password (overrides the setup file)
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Plug addresses, appended to the setup file's list
    #[arg(short = 'I', long = "ip", num_args = 1.., value_name = "ADDRESS")]
    pub ip: Vec<String>,

    /// Use the terminal menu instead of the window
    #[arg(short, long)]
    pub interactive: bool,

    /// Turn the --ip plugs on
    #[arg(short = '1', long = "power_on")]
    pub power_on: bool,

    /// Turn the --ip plugs off
    #[arg(short = '0', long = "power_off")]
    pub power_off: bool,

    /// Toggle the --ip plugs
    #[arg(short = 'T', long)]
    pub toggle: bool,

    /// Repeat the power operation every N seconds (0 runs it once)
    #[arg(short = 't', long = "power_interval", default_value_t = 0, value_name = "SECONDS")]
    pub power_interval: u64,

    /// Timeout of each plug request, in seconds
    #[arg(long, default_value_t = 2, value_name = "SECONDS")]
    pub timeout: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Returns the requested power operation, if any.
    #[must_use]
    pub fn power_action(&self) -> Option<PowerAction> {
        if self.power_on {
            Some(PowerAction::On)
        } else if self.power_off {
            Some(PowerAction::Off)
        } else if self.toggle {
            Some(PowerAction::Toggle)
        } else {
            None
        }
    }

    /// Returns the `--ip` addresses, split on whitespace.
    #[must_use]
    pub fn ip_addresses(&self) -> Vec<String> {
        self.ip
            .iter()
            .flat_map(|arg| arg.split_whitespace())
            .map(str::to_string)
            .collect()
    }

    /// Returns the interval of the direct control loop.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.power_interval)
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Returns the default log filter for the `-v` count.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
