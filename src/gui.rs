// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Desktop front end.
//!
//! One label and one button per plug, five plugs per row. The window only
//! holds [`DeviceView`] copies; presses become [`Request`]s for the worker
//! and the views are updated from the worker's [`PanelEvent`]s.

use std::collections::{HashSet, VecDeque};

use egui::{Color32, RichText, Vec2};
use tokio::sync::broadcast;

use crate::console::TITLE;
use crate::event::{EventBus, PanelEvent};
use crate::registry::DeviceView;
use crate::shutdown::{Shutdown, ShutdownTrigger};
use crate::types::PowerState;
use crate::worker::{Request, RequestSender};

/// Plugs per grid row.
const COLUMNS: usize = 5;
const CELL_SIZE: f32 = 200.0;
const MAX_SIZE: f32 = 800.0;

/// How a device button is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSpec {
    /// The plug is off; pressing turns it on.
    TurnOn,
    /// The plug is on; pressing turns it off.
    TurnOff,
    /// The plug is unreachable.
    Invalid,
    /// A toggle is queued or running.
    Processing,
}

impl ButtonSpec {
    /// Picks the button for a view.
    #[must_use]
    pub fn for_view(view: &DeviceView, pending: bool) -> Self {
        if pending {
            return Self::Processing;
        }
        match view.power {
            Some(PowerState::On) if view.reachable => Self::TurnOff,
            Some(PowerState::Off) if view.reachable => Self::TurnOn,
            _ => Self::Invalid,
        }
    }

    /// Returns the button text.
    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::TurnOn => "Turn On",
            Self::TurnOff => "Turn Off",
            Self::Invalid => "Invalid",
            Self::Processing => "Processing",
        }
    }

    /// Returns whether the button can be pressed.
    #[must_use]
    pub fn enabled(self) -> bool {
        matches!(self, Self::TurnOn | Self::TurnOff)
    }
}

/// Returns the window size for `count` plugs.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn window_size(count: usize) -> [f32; 2] {
    let width = CELL_SIZE * count as f32;
    let height = CELL_SIZE * (count / COLUMNS) as f32;
    [
        width.clamp(CELL_SIZE, MAX_SIZE),
        height.clamp(CELL_SIZE, MAX_SIZE),
    ]
}

/// Window-side copy of the registry.
///
/// The worker answers requests in the order they were sent. A `Refreshed`
/// event therefore settles exactly the toggles pressed before its refresh
/// request; toggles pressed later stay pending until their own update.
#[derive(Debug, Default)]
struct PanelState {
    views: Vec<DeviceView>,
    pending: HashSet<String>,
    /// Pending addresses at the time of each refresh still in flight.
    refreshes: VecDeque<HashSet<String>>,
}

impl PanelState {
    fn new(views: Vec<DeviceView>) -> Self {
        Self {
            views,
            ..Self::default()
        }
    }

    fn apply(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::DeviceUpdated(view) => {
                self.pending.remove(&view.address);
                match self.views.iter_mut().find(|v| v.address == view.address) {
                    Some(slot) => *slot = view,
                    None => self.views.push(view),
                }
            }
            PanelEvent::Refreshed(views) => {
                self.views = views;
                if let Some(settled) = self.refreshes.pop_front() {
                    self.pending.retain(|address| !settled.contains(address));
                }
            }
        }
    }

    /// Records a refresh request about to be sent.
    fn begin_refresh(&mut self) {
        self.refreshes.push_back(self.pending.clone());
    }

    fn refreshing(&self) -> bool {
        !self.refreshes.is_empty()
    }

    /// Marks a plug as pending. Returns `false` if it already was.
    fn press(&mut self, address: &str) -> bool {
        self.pending.insert(address.to_string())
    }
}

struct PanelApp {
    state: PanelState,
    requests: RequestSender,
    events: broadcast::Receiver<PanelEvent>,
    trigger: ShutdownTrigger,
}

impl PanelApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        views: Vec<DeviceView>,
        requests: RequestSender,
        bus: &EventBus,
        trigger: ShutdownTrigger,
        shutdown: Shutdown,
    ) -> Self {
        Self::spawn_event_waker(cc.egui_ctx.clone(), bus.subscribe());
        Self::spawn_close_on_shutdown(cc.egui_ctx.clone(), shutdown);

        Self {
            state: PanelState::new(views),
            requests,
            events: bus.subscribe(),
            trigger,
        }
    }

    /// Wakes the UI when the worker publishes.
    fn spawn_event_waker(ctx: egui::Context, mut event_rx: broadcast::Receiver<PanelEvent>) {
        tokio::spawn(async move {
            loop {
                match event_rx.recv().await {
                    Ok(_) => ctx.request_repaint(),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(missed = n, "Event waker lagged behind");
                        ctx.request_repaint();
                    }
                }
            }
        });
    }

    /// Closes the window on interrupt.
    fn spawn_close_on_shutdown(ctx: egui::Context, mut shutdown: Shutdown) {
        tokio::spawn(async move {
            shutdown.wait().await;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        });
    }

    fn process_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.state.apply(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!(missed = n, "Window missed worker events, refreshing");
                    self.state.begin_refresh();
                    self.send(Request::Refresh);
                }
                Err(_) => break,
            }
        }
    }

    fn send(&self, request: Request) {
        if self.requests.send(request).is_err() {
            tracing::warn!("Worker is gone, request dropped");
        }
    }

    fn device_grid(&self, ui: &mut egui::Ui) -> Vec<String> {
        let mut pressed = Vec::new();

        egui::Grid::new("devices")
            .num_columns(COLUMNS)
            .spacing([16.0, 8.0])
            .show(ui, |ui| {
                for row in self.state.views.chunks(COLUMNS) {
                    for view in row {
                        ui.vertical_centered(|ui| {
                            ui.label(RichText::new(&view.name).size(14.0));
                        });
                    }
                    ui.end_row();

                    for view in row {
                        let spec =
                            ButtonSpec::for_view(view, self.state.pending.contains(&view.address));
                        let button = match spec {
                            ButtonSpec::TurnOff => egui::Button::new(
                                RichText::new(spec.text()).color(Color32::BLACK),
                            )
                            .fill(Color32::YELLOW),
                            _ => egui::Button::new(spec.text()),
                        };
                        let button = button.min_size(Vec2::new(100.0, 28.0));
                        if ui.add_enabled(spec.enabled(), button).clicked() {
                            pressed.push(view.address.clone());
                        }
                    }
                    ui.end_row();
                }
            });

        pressed
    }
}

impl eframe::App for PanelApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.trigger.trigger();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(TITLE);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let refreshing = self.state.refreshing();
                    let text = if refreshing { "Refreshing" } else { "Refresh" };
                    if ui.add_enabled(!refreshing, egui::Button::new(text)).clicked() {
                        self.state.begin_refresh();
                        self.send(Request::Refresh);
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.views.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.heading("No available device");
                });
                return;
            }

            let pressed = self.device_grid(ui);
            for address in pressed {
                if self.state.press(&address) {
                    tracing::debug!(%address, "Toggle requested");
                    self.send(Request::Toggle(address));
                }
            }
        });
    }
}

/// Opens the window and blocks until it is closed.
///
/// Must be called from the main thread, inside a tokio runtime context.
/// Closing the window fires `trigger`; firing it elsewhere closes the
/// window.
///
/// # Errors
///
/// Returns error if the window cannot be created.
pub fn run(
    views: Vec<DeviceView>,
    requests: RequestSender,
    bus: &EventBus,
    trigger: ShutdownTrigger,
    shutdown: Shutdown,
) -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(window_size(views.len()))
            .with_resizable(false)
            .with_title(TITLE),
        centered: true,
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(PanelApp::new(
                cc, views, requests, bus, trigger, shutdown,
            )))
        }),
    )
}
