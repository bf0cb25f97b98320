// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel settings.
//!
//! Settings come from three places, consulted in this order:
//!
//! 1. The setup file `~/.tasmor_panel`, a flat JSON object:
//!    ```json
//!    { "username": "admin", "password": "secret", "ip": ["192.168.1.100"] }
//!    ```
//!    Every key is optional and the file itself may be absent.
//! 2. Command-line flags. A non-empty username or password flag replaces the
//!    file value; `--ip` addresses are appended to the file's list.
//! 3. Interactive prompts, for a username or password still missing.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the setup file, relative to the home directory.
pub const SETUP_FILE_NAME: &str = ".tasmor_panel";

/// Contents of the setup file.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupFile {
    /// Account username.
    pub username: Option<String>,
    /// Account password.
    pub password: Option<String>,
    /// Plug addresses.
    pub ip: Vec<String>,
}

impl fmt::Debug for SetupFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupFile")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("ip", &self.ip)
            .finish()
    }
}

impl SetupFile {
    /// Returns `~/.tasmor_panel`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDir` if the home directory is unknown.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(SETUP_FILE_NAME))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Reads and parses a setup file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if it is not a JSON object of the expected shape.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            addresses = file.ip.len(),
            "Loaded setup file"
        );
        Ok(file)
    }
}

/// Account used to authenticate with every plug.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Asks the user for credentials missing from file and flags.
pub trait CredentialPrompt {
    /// Asks for the username. `None` if it cannot be asked.
    fn username(&mut self) -> Option<String>;

    /// Asks for the password without echo. `None` if it cannot be asked.
    fn password(&mut self) -> Option<String>;
}

/// Prompt that never asks, for non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl CredentialPrompt for NoPrompt {
    fn username(&mut self) -> Option<String> {
        None
    }

    fn password(&mut self) -> Option<String> {
        None
    }
}

/// Merged settings.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Settings {
    username: Option<String>,
    password: Option<String>,
    addresses: Vec<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("addresses", &self.addresses)
            .finish()
    }
}

impl Settings {
    /// Merges the setup file with command-line values.
    ///
    /// Each `ip_args` entry may hold several whitespace-separated addresses.
    /// Duplicates are kept; the registry registers each address once.
    #[must_use]
    pub fn merge(
        file: SetupFile,
        username: Option<String>,
        password: Option<String>,
        ip_args: &[String],
    ) -> Self {
        let mut addresses = file.ip;
        addresses.extend(
            ip_args
                .iter()
                .flat_map(|arg| arg.split_whitespace())
                .map(str::to_string),
        );

        Self {
            username: non_empty(username).or_else(|| non_empty(file.username)),
            password: non_empty(password).or_else(|| non_empty(file.password)),
            addresses,
        }
    }

    /// Returns the configured addresses, in configuration order.
    #[must_use]
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Checks that at least one address is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoAddress` for an empty address list.
    pub fn ensure_address(&self) -> Result<(), ConfigError> {
        if self.addresses.is_empty() {
            return Err(ConfigError::NoAddress);
        }
        Ok(())
    }

    /// Returns the account, asking `prompt` for whatever is missing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredentials` if the username or password
    /// is still missing or empty after prompting.
    pub fn account(&self, prompt: &mut impl CredentialPrompt) -> Result<Account, ConfigError> {
        let username = self
            .username
            .clone()
            .or_else(|| non_empty(prompt.username()))
            .ok_or(ConfigError::MissingCredentials)?;
        let password = self
            .password
            .clone()
            .or_else(|| non_empty(prompt.password()))
            .ok_or(ConfigError::MissingCredentials)?;

        Ok(Account { username, password })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
