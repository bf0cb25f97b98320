// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operation worker for the graphical front end.
//!
//! The window thread never touches the registry. It sends [`Request`]s over
//! an unbounded channel; the worker owns the registry, handles requests one
//! at a time in submission order and publishes the result of each on the
//! [`EventBus`]. Two operations on the same plug therefore never overlap.

use tokio::sync::mpsc;

use crate::device::PlugConnector;
use crate::engine::{self, Outcome, PowerAction};
use crate::event::{EventBus, PanelEvent};
use crate::registry::Registry;
use crate::shutdown::Shutdown;

/// Work submitted by a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Toggle the plug registered under this address.
    Toggle(String),
    /// Re-probe the configured addresses.
    Refresh,
}

/// Sending half handed to the front end.
pub type RequestSender = mpsc::UnboundedSender<Request>;

/// Owns the registry while the window is open.
pub struct Worker<K: PlugConnector> {
    connector: K,
    registry: Registry<K::Client>,
    addresses: Vec<String>,
    requests: mpsc::UnboundedReceiver<Request>,
    events: EventBus,
}

impl<K: PlugConnector> Worker<K> {
    /// Creates a worker and the sender feeding it.
    ///
    /// `addresses` is the configured address list, re-used on refresh.
    #[must_use]
    pub fn new(
        connector: K,
        registry: Registry<K::Client>,
        addresses: Vec<String>,
        events: EventBus,
    ) -> (Self, RequestSender) {
        let (sender, requests) = mpsc::unbounded_channel();
        let worker = Self {
            connector,
            registry,
            addresses,
            requests,
            events,
        };
        (worker, sender)
    }

    /// Handles requests until every sender is dropped or `shutdown` fires.
    ///
    /// A request in progress is finished before the signal is observed.
    /// Returns the registry.
    pub async fn run(mut self, mut shutdown: Shutdown) -> Registry<K::Client> {
        tracing::debug!(devices = self.registry.len(), "Worker started");

        loop {
            let request = tokio::select! {
                () = shutdown.wait() => break,
                request = self.requests.recv() => match request {
                    Some(request) => request,
                    None => break,
                },
            };
            self.handle(request).await;
        }

        tracing::debug!("Worker stopped");
        self.registry
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::Toggle(address) => {
                let Some(record) = self.registry.by_address_mut(&address) else {
                    tracing::warn!(%address, "Toggle requested for unknown address");
                    return;
                };
                if let Outcome::Failed(error) = engine::perform(record, PowerAction::Toggle).await
                {
                    tracing::debug!(%address, %error, "Toggle failed");
                }
                self.events.publish(PanelEvent::DeviceUpdated(record.view()));
            }
            Request::Refresh => {
                let probes = self
                    .registry
                    .refresh(&self.connector, &self.addresses, &mut |_| {})
                    .await;
                tracing::info!(probes, devices = self.registry.len(), "Registry refreshed");
                self.events
                    .publish(PanelEvent::Refreshed(self.registry.views()));
            }
        }
    }
}
