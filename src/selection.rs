// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Console selection grammar.
//!
//! One line of user text is interpreted against the current registry size
//! `N`, in this priority order:
//!
//! | Input                 | Result                                        |
//! |-----------------------|-----------------------------------------------|
//! | `exit`, `quit`, `q`   | [`Action::Exit`]                              |
//! | `refresh`, `r`        | [`Action::Refresh`]                           |
//! | `1,3,7`               | toggle in-range indices, skip the others      |
//! | `2-4`                 | toggle the inclusive range, or reject it all  |
//! | `2`                   | toggle one index, or reject it                |
//!
//! Keywords are case-insensitive. A comma list with any non-numeric token is
//! rejected as a whole, while numeric tokens out of `[1, N]` are only
//! skipped. Ranges and single indices are all-or-nothing.
//!
//! # Examples
//!
//! ```
//! use tasmor_panel::selection::{interpret, Action, SelectionError};
//!
//! let Ok(Action::Toggle(selection)) = interpret("1,5", 3) else {
//!     panic!("expected a toggle");
//! };
//! assert_eq!(selection.indices, [1]);
//! assert_eq!(selection.skipped, [5]);
//!
//! assert_eq!(interpret("2-1", 3), Err(SelectionError::InvalidRange(2, 1)));
//! assert_eq!(interpret("0", 3), Err(SelectionError::InvalidIndex(0)));
//! ```

use std::fmt;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Leave the console.
    Exit,
    /// Re-probe the configured addresses.
    Refresh,
    /// Toggle the selected devices.
    Toggle(Selection),
}

/// Positions picked by one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// 1-based positions to act on, in input order.
    pub indices: Vec<usize>,
    /// Out-of-range positions of a comma list, in input order.
    pub skipped: Vec<usize>,
}

impl Selection {
    /// Returns the message listing skipped positions, if any.
    ///
    /// ```
    /// use tasmor_panel::selection::Selection;
    ///
    /// let selection = Selection { indices: vec![1], skipped: vec![5, 7] };
    /// assert_eq!(selection.skipped_message().unwrap(), "Skip invalid index 5, 7");
    /// ```
    #[must_use]
    pub fn skipped_message(&self) -> Option<String> {
        if self.skipped.is_empty() {
            return None;
        }
        let list = self
            .skipped
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("Skip invalid index {list}"))
    }
}

/// A command that was rejected as a whole.
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The line does not follow the grammar.
    InvalidInput(String),
    /// A single position outside `[1, N]`.
    InvalidIndex(usize),
    /// A range that is reversed or exceeds `N`.
    InvalidRange(usize, usize),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(line) => write!(f, "Invalid input ({line})"),
            Self::InvalidIndex(index) => write!(f, "Invalid Index ({index})"),
            Self::InvalidRange(start, end) => write!(f, "Invalid Range ({start} - {end})"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Interprets one line of console input against a registry of `count`
/// devices.
///
/// # Errors
///
/// Returns [`SelectionError`] when the whole command is rejected. Partially
/// valid comma lists are not errors: their out-of-range positions end up in
/// [`Selection::skipped`].
pub fn interpret(line: &str, count: usize) -> Result<Action, SelectionError> {
    let line = line.trim();
    let keyword = line.to_ascii_lowercase();

    match keyword.as_str() {
        "exit" | "quit" | "q" => return Ok(Action::Exit),
        "refresh" | "r" => return Ok(Action::Refresh),
        _ => {}
    }

    let invalid = || SelectionError::InvalidInput(line.to_string());

    if line.contains(',') {
        let numbers = line
            .split(',')
            .map(parse_index)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        let (indices, skipped): (Vec<usize>, Vec<usize>) = numbers
            .into_iter()
            .partition(|index| (1..=count).contains(index));
        return Ok(Action::Toggle(Selection { indices, skipped }));
    }

    let (start, end) = if line.contains('-') {
        let mut sides = line.split('-');
        match (sides.next(), sides.next(), sides.next()) {
            (Some(start), Some(end), None) => (
                parse_index(start).ok_or_else(invalid)?,
                parse_index(end).ok_or_else(invalid)?,
            ),
            _ => return Err(invalid()),
        }
    } else {
        let index = parse_index(line).ok_or_else(invalid)?;
        (index, index)
    };

    if start == 0 || end == 0 {
        return Err(SelectionError::InvalidIndex(start));
    }
    if start > end || end > count {
        return Err(if start == end {
            SelectionError::InvalidIndex(start)
        } else {
            SelectionError::InvalidRange(start, end)
        });
    }

    Ok(Action::Toggle(Selection {
        indices: (start..=end).collect(),
        skipped: Vec::new(),
    }))
}

/// Parses a non-empty run of ASCII digits.
///
/// Values too large for `usize` saturate, so they fail the range checks
/// instead of reading as malformed input.
fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(token.parse().unwrap_or(usize::MAX))
}
