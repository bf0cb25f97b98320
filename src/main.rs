// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `tasmor-panel` binary.
//!
//! Startup order:
//! 1. Parse flags and install logging.
//! 2. Load `~/.tasmor_panel`, merge flags, prompt for missing credentials.
//! 3. Probe every configured plug.
//! 4. Run the direct control loop, the terminal menu or the window.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ::console::style;
use tracing_subscriber::{EnvFilter, fmt};

use tasmor_panel::cli::Cli;
use tasmor_panel::config::{SETUP_FILE_NAME, Settings, SetupFile};
use tasmor_panel::console::{self, TerminalPrompt};
use tasmor_panel::shutdown::{self, Shutdown, ShutdownTrigger};
use tasmor_panel::{Registry, TasmotaConnector, control};

/// Grace period for blocking tasks (stdin reader) at exit.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(200);

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Panel failed: {e:?}");
            eprintln!("{}", style(format!("Error: {e:#}")).red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let settings = Settings::merge(
        load_setup_file(),
        cli.username.clone(),
        cli.password.clone(),
        &cli.ip,
    );

    if let Err(e) = settings.ensure_address() {
        eprintln!("{}", style(e).red());
        return Ok(ExitCode::from(1));
    }
    let account = match settings.account(&mut TerminalPrompt) {
        Ok(account) => account,
        Err(e) => {
            eprintln!("{}", style(e).red());
            return Ok(ExitCode::from(1));
        }
    };
    tracing::debug!(?settings, "Settings resolved");

    let connector = TasmotaConnector::new(account.username, account.password)
        .with_timeout(cli.request_timeout());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let result = {
        let _guard = runtime.enter();
        let (trigger, shutdown) = shutdown::channel();
        shutdown::listen_for_interrupt(trigger.clone());

        serve(cli, &runtime, connector, &settings, trigger, shutdown)
    };

    // tokio's stdin reader may still be parked in a blocking read.
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    result.map(|()| ExitCode::SUCCESS)
}

fn load_setup_file() -> SetupFile {
    let path = match SetupFile::default_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "No setup file location");
            println!(
                "{}",
                style(format!("skip loading setup file ~/{SETUP_FILE_NAME}")).yellow()
            );
            return SetupFile::default();
        }
    };

    SetupFile::load_from(&path).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Setup file not loaded");
        println!(
            "{}",
            style(format!("skip loading setup file {}", path.display())).yellow()
        );
        SetupFile::default()
    })
}

fn serve(
    cli: &Cli,
    runtime: &tokio::runtime::Runtime,
    connector: TasmotaConnector,
    settings: &Settings,
    trigger: ShutdownTrigger,
    mut shutdown: Shutdown,
) -> anyhow::Result<()> {
    let addresses = settings.addresses();

    let registry = runtime.block_on(async {
        let mut probe = console::print_probe;
        tokio::select! {
            registry = Registry::build(&connector, addresses, &mut probe) => Some(registry),
            () = shutdown.wait() => None,
        }
    });
    let Some(mut registry) = registry else {
        return Ok(());
    };

    let targets = cli.ip_addresses();
    match cli.power_action() {
        Some(action) if !targets.is_empty() => {
            let report = |record: &tasmor_panel::DeviceRecord<_>, outcome: &tasmor_panel::Outcome| {
                println!("{}", console::describe_outcome(&record.view(), outcome));
            };
            let runs = runtime.block_on(control::run_targets(
                &mut registry,
                &targets,
                action,
                cli.interval(),
                &shutdown,
                &report,
                |address| println!("{}", style(format!("Invalid IP address {address}")).red()),
            ));
            tracing::info!(runs, "Direct control finished");
            return Ok(());
        }
        Some(action) => {
            tracing::warn!(?action, "Power flag given without --ip, ignoring it");
            println!(
                "{}",
                style("Power flags need --ip; ignoring them").yellow()
            );
        }
        None => {}
    }

    #[cfg(feature = "gui")]
    {
        if !cli.interactive {
            return open_window(runtime, connector, registry, addresses, trigger, shutdown);
        }
    }
    #[cfg(not(feature = "gui"))]
    let _ = trigger;

    runtime
        .block_on(console::run(&mut registry, &connector, addresses, shutdown))
        .context("terminal menu failed")
}

#[cfg(feature = "gui")]
fn open_window(
    runtime: &tokio::runtime::Runtime,
    connector: TasmotaConnector,
    registry: Registry<tasmor_panel::TasmotaPlug>,
    addresses: &[String],
    trigger: ShutdownTrigger,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    use tasmor_panel::event::EventBus;
    use tasmor_panel::gui;
    use tasmor_panel::worker::Worker;

    let bus = EventBus::new();
    let views = registry.views();
    let (worker, requests) = Worker::new(connector, registry, addresses.to_vec(), bus.clone());

    let handle = runtime.handle().clone();
    let worker_shutdown = shutdown.clone();
    let worker_thread = std::thread::Builder::new()
        .name("panel-worker".to_string())
        .spawn(move || handle.block_on(worker.run(worker_shutdown)))
        .context("failed to start the worker thread")?;

    let result = gui::run(views, requests, &bus, trigger.clone(), shutdown);

    trigger.trigger();
    if worker_thread.join().is_err() {
        tracing::error!("Worker thread panicked");
    }

    result.map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
