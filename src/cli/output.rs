//! Output formatting utilities for CLI.

use citadel::action::EntryKind;
use citadel::replay::VerifyReport;
use citadel::{ActionKind, Committed, PieceId, Target};
use serde::Serialize;
use std::fmt::Write;

/// JSON-serializable target listing.
#[derive(Debug, Serialize)]
pub(super) struct JsonTargets {
    /// Piece the targets belong to.
    pub(super) piece: String,
    /// Targets per action.
    pub(super) actions: Vec<JsonActionTargets>,
}

/// JSON-serializable targets of one action.
#[derive(Debug, Serialize)]
pub(super) struct JsonActionTargets {
    /// Action name.
    pub(super) action: ActionKind,
    /// Targets as `x,y` or `x,y>x,y`.
    pub(super) targets: Vec<String>,
}

impl JsonTargets {
    /// Create from per-action target lists.
    pub(super) fn new(piece: &PieceId, actions: &[(ActionKind, Vec<Target>)]) -> Self {
        Self {
            piece: piece.to_string(),
            actions: actions
                .iter()
                .map(|(action, targets)| JsonActionTargets {
                    action: *action,
                    targets: targets.iter().map(ToString::to_string).collect(),
                })
                .collect(),
        }
    }
}

/// Format a target listing as human-readable text.
pub(super) fn format_targets(piece: &PieceId, actions: &[(ActionKind, Vec<Target>)]) -> String {
    let mut output = String::new();
    if actions.is_empty() {
        let _ = writeln!(output, "{piece} has no valid actions");
        return output;
    }
    for (action, targets) in actions {
        let listed: Vec<String> = targets.iter().map(ToString::to_string).collect();
        let _ = writeln!(
            output,
            "{piece} {action} ({}): {}",
            targets.len(),
            listed.join("  ")
        );
    }
    output
}

/// Describe a committed entry.
pub(super) fn format_committed(committed: &Committed) -> String {
    let entry = &committed.entry;
    let mut output = String::new();
    let piece = entry
        .piece_id
        .as_ref()
        .map_or_else(String::new, ToString::to_string);

    match entry.kind {
        EntryKind::EndTurn => {
            let _ = write!(output, "{} ends turn {}", entry.player, entry.turn_number);
        }
        EntryKind::Place => {
            let _ = write!(output, "{} places {piece}", entry.player);
        }
        EntryKind::Move => {
            let _ = write!(output, "{} moves {piece}", entry.player);
        }
        EntryKind::RaiseTerrain | EntryKind::ShiftTerrain | EntryKind::SinkTerrain => {
            let action = entry
                .data
                .action
                .map_or_else(|| format!("{:?}", entry.kind), |action| action.to_string());
            let _ = write!(output, "{} uses {piece} to {action}", entry.player);
        }
    }
    if let Some(from) = entry.data.from {
        let _ = write!(output, " from {from}");
    }
    if let Some(to) = entry.data.to {
        let _ = write!(output, " to {to}");
    }
    if let Some(captured) = &entry.data.captured {
        let _ = write!(output, ", capturing {captured}");
    }
    if let Some(casualty) = &entry.data.casualty {
        let _ = write!(output, ", drowning {casualty}");
    }
    output.push('\n');

    if let Some(end) = &committed.game_end {
        let _ = writeln!(output, "Game over: {end}");
    }
    output
}

/// Format a verification report.
pub(super) fn format_report(report: &VerifyReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Entries replayed: {}", report.entries);
    let _ = writeln!(
        output,
        "Deterministic:    {}",
        if report.deterministic { "yes" } else { "NO" }
    );
    if report.failures.is_empty() {
        output.push_str("Invariants:       ok\n");
    } else {
        let _ = writeln!(output, "Invariants:       {} failure(s)", report.failures.len());
        for failure in &report.failures {
            let _ = writeln!(output, "  - {failure}");
        }
    }
    output
}
