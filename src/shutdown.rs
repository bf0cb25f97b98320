// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process-wide stop signal.
//!
//! Every loop in the panel (console, direct control, worker, window) holds
//! a [`Shutdown`] and stops at its next await point once it fires. The
//! signal is a `watch` channel, so late subscribers still see it.

use tokio::sync::watch;

/// Fires the stop signal.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    sender: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Fires the signal. Idempotent.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

/// Observes the stop signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    /// Returns `true` once the signal has fired.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Waits until the signal fires.
    ///
    /// If every trigger is dropped without firing, this never completes.
    pub async fn wait(&mut self) {
        let closed = self.receiver.wait_for(|stop| *stop).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// Creates a connected trigger and observer.
#[must_use]
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownTrigger { sender }, Shutdown { receiver })
}

/// Fires `trigger` on Ctrl-C.
///
/// Must be called from within a tokio runtime.
pub fn listen_for_interrupt(trigger: ShutdownTrigger) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping");
                trigger.trigger();
            }
            Err(error) => tracing::warn!(%error, "Cannot listen for interrupt"),
        }
    });
}
