// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Terminal front end.
//!
//! Each turn clears the screen, prints the device table and a prompt, then
//! reads one line and hands it to [`crate::selection::interpret`]:
//!
//! ```text
//! ==================================================
//!             TasmoR Plug Control Panel
//! ==================================================
//! Index  Device Name          Power Status
//! --------------------------------------------------
//!   1    Desk Lamp            On
//!   2    192.168.1.101        N/A
//! --------------------------------------------------
//! Enter 1 ~ 2 to select device toggle power. ...
//! ```
//!
//! Plugs that are on are highlighted yellow, unreachable plugs red.

use std::io::{self, IsTerminal};

use console::{Term, style};
use dialoguer::{Input, Password};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::CredentialPrompt;
use crate::device::{PlugClient, PlugConnector};
use crate::engine::{self, Outcome, PowerAction};
use crate::registry::{DeviceView, ProbeEvent, Registry};
use crate::selection::{self, Action, Selection};
use crate::shutdown::Shutdown;

/// Title shown by both front ends.
pub const TITLE: &str = "TasmoR Plug Control Panel";

const WIDTH: usize = 50;

/// Renders the device table, one line per record.
#[must_use]
pub fn render_table(views: &[DeviceView]) -> String {
    let rule = "=".repeat(WIDTH);
    let separator = "-".repeat(WIDTH);
    let mut lines = vec![
        rule.clone(),
        style(format!("{TITLE:^WIDTH$}")).cyan().to_string(),
        rule,
        format!("{:<6} {:<20} {}", "Index", "Device Name", "Power Status"),
        separator.clone(),
    ];

    for (position, view) in views.iter().enumerate() {
        let status = match view.power {
            Some(power) if view.reachable => power.label(),
            _ => "N/A",
        };
        let row = format!("{:^6} {:<20} {status:<3}", position + 1, view.name);
        let row = match view.power {
            _ if !view.reachable => style(row).red(),
            Some(power) if power.is_on() => style(row).yellow().bright(),
            _ => style(row),
        };
        lines.push(row.to_string());
    }

    lines.push(separator);
    lines.join("\n")
}

/// Renders the prompt line, with the previous command's notice in red.
#[must_use]
pub fn render_prompt(count: usize, notice: Option<&str>) -> String {
    let prompt = format!(
        "Enter 1 ~ {count} to select device toggle power. \
         Enter 'refresh'/'r' to refresh the device list. Enter 'exit' to exit."
    );
    match notice {
        Some(notice) => format!("{prompt} {}", style(notice).red()),
        None => prompt,
    }
}

/// Describes a device state: `"<name> is On"`.
#[must_use]
pub fn describe(view: &DeviceView) -> String {
    match view.power {
        Some(power) if view.reachable => format!("{} is {power}", view.name),
        _ => format!("{} is unreachable", view.name),
    }
}

/// Describes the result of one power operation.
#[must_use]
pub fn describe_outcome(view: &DeviceView, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Failed(error) => format!("{} is unreachable ({error})", view.name),
        _ => describe(view),
    }
}

/// Prints probe progress: `Connecting to <ip> ... Success => <name>`.
pub fn print_probe(event: ProbeEvent<'_>) {
    let term = Term::stdout();
    let written = match event {
        ProbeEvent::Connecting(address) => term.write_str(&format!("Connecting to {address} ... ")),
        ProbeEvent::Connected { name, .. } => {
            term.write_line(&style(format!("Success => {name}")).green().to_string())
        }
        ProbeEvent::Failed { .. } => term.write_line(&style("Failure").red().to_string()),
    };
    if let Err(error) = written {
        tracing::debug!(%error, "Cannot print probe progress");
    }
}

/// Runs the menu until `exit`, end of input or `shutdown`.
///
/// # Errors
///
/// Returns error if the terminal cannot be written or stdin cannot be read.
pub async fn run<K: PlugConnector>(
    registry: &mut Registry<K::Client>,
    connector: &K,
    addresses: &[String],
    mut shutdown: Shutdown,
) -> io::Result<()> {
    let term = Term::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut notice: Option<String> = None;

    loop {
        term.clear_screen()?;
        term.write_line(&render_table(&registry.views()))?;
        term.write_line(&render_prompt(registry.len(), notice.as_deref()))?;
        notice = None;

        let line = tokio::select! {
            () = shutdown.wait() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::debug!("End of input");
            break;
        };

        match selection::interpret(&line, registry.len()) {
            Ok(Action::Exit) => break,
            Ok(Action::Refresh) => {
                registry.refresh(connector, addresses, &mut print_probe).await;
            }
            Ok(Action::Toggle(selection)) => {
                notice = apply_selection(registry, &selection).await;
            }
            Err(error) => {
                tracing::debug!(%error, "Rejected selection");
                notice = Some(error.to_string());
            }
        }
    }

    Ok(())
}

/// Toggles every selected position, in selection order.
///
/// Returns the notice to show with the next prompt: skipped indices first,
/// then one "Device unreachable (<name>)" per plug that could not be
/// toggled.
pub async fn apply_selection<C: PlugClient>(
    registry: &mut Registry<C>,
    selection: &Selection,
) -> Option<String> {
    let mut notices: Vec<String> = selection.skipped_message().into_iter().collect();

    for &index in &selection.indices {
        let Some(record) = registry.get_mut(index) else {
            continue;
        };
        match engine::perform(record, PowerAction::Toggle).await {
            Outcome::Failed(_) | Outcome::Unreachable => {
                notices.push(format!("Device unreachable ({})", record.name()));
            }
            Outcome::Applied(_) | Outcome::NotApplied(_) => {}
        }
    }

    (!notices.is_empty()).then(|| notices.join(". "))
}

/// Asks for missing credentials on the terminal.
///
/// Only asks when stdin is a terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn attended() -> bool {
        io::stdin().is_terminal()
    }
}

impl CredentialPrompt for TerminalPrompt {
    fn username(&mut self) -> Option<String> {
        if !Self::attended() {
            return None;
        }
        Input::<String>::new()
            .with_prompt("Enter account username")
            .interact_text()
            .inspect_err(|error| tracing::warn!(%error, "Username prompt failed"))
            .ok()
    }

    fn password(&mut self) -> Option<String> {
        if !Self::attended() {
            return None;
        }
        Password::new()
            .with_prompt("Enter account password")
            .interact()
            .inspect_err(|error| tracing::warn!(%error, "Password prompt failed"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerState;

    fn view(name: &str, power: Option<PowerState>) -> DeviceView {
        DeviceView {
            address: format!("{name}.local"),
            name: name.to_string(),
            power,
            reachable: power.is_some(),
        }
    }

    fn plain(text: &str) -> String {
        console::strip_ansi_codes(text).into_owned()
    }

    #[test]
    fn table_lists_every_record() {
        let table = plain(&render_table(&[
            view("Lamp", Some(PowerState::On)),
            view("Fan", Some(PowerState::Off)),
            view("10.0.0.9", None),
        ]));
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "=".repeat(50));
        assert_eq!(lines[1].trim(), TITLE);
        assert_eq!(lines[1].len(), 50);
        assert_eq!(lines[3], "Index  Device Name          Power Status");
        assert_eq!(lines[5], "  1    Lamp                 On ");
        assert_eq!(lines[6], "  2    Fan                  Off");
        assert_eq!(lines[7], "  3    10.0.0.9             N/A");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn empty_table_has_no_rows() {
        let table = plain(&render_table(&[]));
        assert_eq!(table.lines().count(), 6);
    }

    #[test]
    fn prompt_carries_notice() {
        let prompt = plain(&render_prompt(3, Some("Invalid Index (0)")));
        assert!(prompt.starts_with("Enter 1 ~ 3 to select device toggle power."));
        assert!(prompt.ends_with(" Invalid Index (0)"));
        assert!(!plain(&render_prompt(3, None)).contains("Invalid"));
    }

    mod dispatch {
        use super::*;
        use crate::device::fake::{FakeConnector, FakePlug};
        use crate::selection::{SelectionError, interpret};

        const PROBE_CALLS: [&str; 2] = ["name", "query"];

        async fn registry(
            connector: &FakeConnector,
            addresses: &[&str],
        ) -> Registry<FakePlug> {
            let addresses: Vec<String> = addresses.iter().map(ToString::to_string).collect();
            Registry::build(connector, &addresses, &mut |_| {}).await
        }

        fn three_plugs() -> FakeConnector {
            FakeConnector::new()
                .with_plug("10.0.0.1", "Lamp", PowerState::Off)
                .with_plug("10.0.0.2", "Fan", PowerState::On)
                .with_plug("10.0.0.3", "Heater", PowerState::Off)
        }

        fn toggled(line: &str, count: usize) -> Selection {
            match interpret(line, count) {
                Ok(Action::Toggle(selection)) => selection,
                other => panic!("expected a toggle for {line:?}, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn comma_list_toggles_valid_and_skips_the_rest() {
            let connector = three_plugs();
            let mut registry = registry(&connector, &["10.0.0.1", "10.0.0.2", "10.0.0.3"]).await;

            let notice = apply_selection(&mut registry, &toggled("1,5", 3)).await;

            assert_eq!(notice.as_deref(), Some("Skip invalid index 5"));
            assert_eq!(
                connector.plug("10.0.0.1").calls(),
                ["name", "query", "query", "on", "query"]
            );
            assert_eq!(registry.get(1).unwrap().power(), Some(PowerState::On));
            assert_eq!(connector.plug("10.0.0.2").calls(), PROBE_CALLS);
            assert_eq!(connector.plug("10.0.0.3").calls(), PROBE_CALLS);
        }

        #[tokio::test]
        async fn range_toggles_in_position_order() {
            let connector = three_plugs();
            let mut registry = registry(&connector, &["10.0.0.1", "10.0.0.2", "10.0.0.3"]).await;

            let notice = apply_selection(&mut registry, &toggled("2-3", 3)).await;

            assert_eq!(notice, None);
            assert_eq!(connector.plug("10.0.0.1").calls(), PROBE_CALLS);
            assert_eq!(registry.get(2).unwrap().power(), Some(PowerState::Off));
            assert_eq!(registry.get(3).unwrap().power(), Some(PowerState::On));
        }

        #[tokio::test]
        async fn rejected_commands_touch_no_plug() {
            let connector = three_plugs();
            let registry = registry(&connector, &["10.0.0.1", "10.0.0.2", "10.0.0.3"]).await;

            assert_eq!(
                interpret("2-1", registry.len()),
                Err(SelectionError::InvalidRange(2, 1))
            );
            assert_eq!(
                interpret("0", registry.len()),
                Err(SelectionError::InvalidIndex(0))
            );
            for address in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
                assert_eq!(connector.plug(address).calls(), PROBE_CALLS);
            }
        }

        #[tokio::test]
        async fn unreachable_selection_is_reported() {
            let connector = FakeConnector::new().with_plug("10.0.0.2", "Fan", PowerState::Off);
            let mut registry = registry(&connector, &["10.0.0.9", "10.0.0.2"]).await;

            let notice = apply_selection(&mut registry, &toggled("1,2", 2)).await;

            assert_eq!(notice.as_deref(), Some("Device unreachable (10.0.0.9)"));
            assert_eq!(registry.get(2).unwrap().power(), Some(PowerState::On));
        }

        #[tokio::test]
        async fn failing_plug_is_degraded_and_reported() {
            let connector = three_plugs();
            let mut registry = registry(&connector, &["10.0.0.1", "10.0.0.2", "10.0.0.3"]).await;
            connector.plug("10.0.0.1").set_failing(true);

            let notice = apply_selection(&mut registry, &toggled("1,2,7", 3)).await;

            assert_eq!(
                notice.as_deref(),
                Some("Skip invalid index 7. Device unreachable (Lamp)")
            );
            let lamp = registry.get(1).unwrap();
            assert!(!lamp.is_reachable());
            assert_eq!(lamp.name(), "Lamp");
            assert_eq!(registry.get(2).unwrap().power(), Some(PowerState::Off));
        }
    }

    #[test]
    fn print_probe_accepts_every_event() {
        let error: crate::error::Error = crate::error::ProtocolError::AuthenticationFailed.into();
        print_probe(ProbeEvent::Connecting("10.0.0.1"));
        print_probe(ProbeEvent::Connected {
            address: "10.0.0.1",
            name: "Lamp",
        });
        print_probe(ProbeEvent::Failed {
            address: "10.0.0.2",
            error: &error,
        });
    }

    #[test]
    fn describe_states() {
        assert_eq!(describe(&view("Lamp", Some(PowerState::On))), "Lamp is On");
        assert_eq!(describe(&view("Lamp", Some(PowerState::Off))), "Lamp is Off");
        assert_eq!(describe(&view("Lamp", None)), "Lamp is unreachable");
    }
}
