// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `TasmoR` panel.
//!
//! Device-facing failures (HTTP transport, response parsing) share one
//! top-level [`enum@Error`]. Setup failures are reported separately as
//! [`ConfigError`], since they stop the program before any plug is reached.
//! Selection input errors are plain values produced by
//! [`crate::selection`].

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors related to HTTP communication with a plug.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Errors related to parsing Tasmota responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors raised while assembling the panel settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The setup file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// Path of the setup file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The setup file is not valid JSON of the expected shape.
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        /// Path of the setup file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,

    /// No plug address was configured.
    #[error("No plug IP address found")]
    NoAddress,

    /// Username or password is missing after every source was consulted.
    #[error("No account username or password found")]
    MissingCredentials,
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
