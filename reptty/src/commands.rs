//! One function per subcommand, each working on an already loaded
//! [`Workspace`] and returning the text to print.

use chess::{DisplayBoard, PieceColor, RulesOracle, START_POSITION};
use repertoire::{resolve_line, Deletion, ImportSummary, PlayOutcome, Workspace};

use crate::CliError;

/// Resolve a repertoire name on `side` to its id.
fn entry_id<O: RulesOracle>(ws: &Workspace<O>, side: PieceColor, name: &str) -> Result<String, CliError> {
    ws.collection()
        .side(side)
        .find_by_name(name)
        .map(|e| e.id.clone())
        .ok_or_else(|| CliError::UnknownRepertoire {
            side,
            name: name.to_string(),
        })
}

fn entry_name<O: RulesOracle>(ws: &Workspace<O>, side: PieceColor, id: &str) -> String {
    ws.collection()
        .side(side)
        .entry(id)
        .map(|e| e.name.clone())
        .unwrap_or_default()
}

fn refused<O: RulesOracle>(ws: &Workspace<O>, fallback: &str) -> CliError {
    CliError::Refused(ws.status().unwrap_or(fallback).to_string())
}

/// Number a SAN line from the start position: `1. e4 e5 2. Nf3`.
pub fn format_line(sans: &[String]) -> String {
    let mut out = String::new();
    for (ply, san) in sans.iter().enumerate() {
        if !out.is_empty() {
            out.push(' ');
        }
        if ply % 2 == 0 {
            out.push_str(&format!("{}. ", ply / 2 + 1));
        }
        out.push_str(san);
    }
    out
}

pub fn list<O: RulesOracle>(ws: &Workspace<O>) -> String {
    let mut out = String::new();
    for side in PieceColor::BOTH {
        let collection = ws.collection().side(side);
        if collection.is_browsing() {
            out.push_str(&format!("{side}: (browsing all)\n"));
        } else {
            out.push_str(&format!("{side}:\n"));
        }
        for entry in &collection.entries {
            let marker = if collection.active_id.as_deref() == Some(entry.id.as_str()) {
                '*'
            } else {
                ' '
            };
            let moves = entry.tree.len() - 1;
            let unit = if moves == 1 { "move" } else { "moves" };
            out.push_str(&format!("  {marker} {} ({moves} {unit})\n", entry.name));
        }
    }
    out
}

pub fn new<O: RulesOracle>(ws: &mut Workspace<O>, side: PieceColor, name: Option<&str>) -> String {
    let id = ws.new_repertoire(side, name.unwrap_or_default());
    format!("Created {side} repertoire '{}'", entry_name(ws, side, &id))
}

pub fn rename<O: RulesOracle>(
    ws: &mut Workspace<O>,
    side: PieceColor,
    name: &str,
    new_name: &str,
) -> Result<String, CliError> {
    let id = entry_id(ws, side, name)?;
    if !ws.rename_repertoire(side, &id, new_name) {
        return Err(refused(ws, "Rename failed"));
    }
    Ok(format!("Renamed '{name}' to '{}'", entry_name(ws, side, &id)))
}

pub fn delete<O: RulesOracle>(ws: &mut Workspace<O>, side: PieceColor, name: &str) -> Result<String, CliError> {
    let id = entry_id(ws, side, name)?;
    match ws.delete_repertoire(side, &id) {
        Deletion::Removed { fallback: Some(next) } => Ok(format!(
            "Deleted '{name}', now using '{}'",
            entry_name(ws, side, &next)
        )),
        Deletion::Removed { fallback: None } => Ok(format!("Deleted '{name}'")),
        Deletion::Protected | Deletion::LastEntry | Deletion::Unknown => {
            Err(refused(ws, "Delete failed"))
        }
    }
}

pub fn activate<O: RulesOracle>(
    ws: &mut Workspace<O>,
    side: PieceColor,
    name: Option<&str>,
) -> Result<String, CliError> {
    match name {
        Some(name) => {
            let id = entry_id(ws, side, name)?;
            ws.activate(side, Some(&id));
            Ok(format!("Using {side} repertoire '{}'", entry_name(ws, side, &id)))
        }
        None => {
            ws.activate(side, None);
            let count = ws.collection().side(side).entries.len();
            Ok(format!("Browsing all {count} {side} repertoires"))
        }
    }
}

fn describe_import(target: &str, summary: &ImportSummary) -> String {
    let mut out = format!(
        "Imported {} game(s) into '{target}': {} moves read, {} new",
        summary.games, summary.moves_applied, summary.nodes_added
    );
    for skipped in &summary.skipped {
        out.push_str(&format!("\n  skipped: {skipped}"));
    }
    out
}

/// Merge `text` into the active repertoire, or into a fresh one named
/// `new_name`.
pub fn import<O: RulesOracle>(
    ws: &mut Workspace<O>,
    side: PieceColor,
    text: &str,
    new_name: Option<&str>,
) -> Result<String, CliError> {
    if let Some(name) = new_name {
        let (id, summary) = ws.import_pgn_as_new(side, name, text);
        return Ok(describe_import(&entry_name(ws, side, &id), &summary));
    }
    let summary = ws
        .import_pgn(side, text)
        .ok_or_else(|| refused(ws, "No active repertoire"))?;
    let target = ws.active_entry(side).map(|e| e.name.clone()).unwrap_or_default();
    Ok(describe_import(&target, &summary))
}

pub fn export<O: RulesOracle>(ws: &Workspace<O>, side: PieceColor) -> Result<String, CliError> {
    ws.export_pgn(side)
        .ok_or_else(|| CliError::Refused("Select a repertoire to export".to_string()))
}

/// Add a line of moves from the start position to the active repertoire.
pub fn add<O: RulesOracle>(ws: &mut Workspace<O>, side: PieceColor, moves: &[String]) -> Result<String, CliError> {
    if ws.active_entry(side).is_none() {
        return Err(CliError::Refused("Select a repertoire to add moves to".to_string()));
    }
    let refs: Vec<&str> = moves.iter().map(String::as_str).collect();
    let line = resolve_line(ws.oracle(), START_POSITION, &refs)?;

    ws.to_root(side);
    let mut added = 0;
    for played in &line {
        match ws.play(side, &played.code) {
            PlayOutcome::Added { .. } => added += 1,
            PlayOutcome::Followed { .. } => {}
            _ => return Err(refused(ws, "Move rejected")),
        }
    }
    Ok(format!("Added {added} new move(s): {}", format_line(&ws.current_line(side))))
}

/// Walk `moves` from the start, then print the board and the moves the
/// repertoire (or every repertoire, when browsing) has from there.
pub fn show<O: RulesOracle>(ws: &mut Workspace<O>, side: PieceColor, moves: &[String]) -> Result<String, CliError> {
    let refs: Vec<&str> = moves.iter().map(String::as_str).collect();
    let line = resolve_line(ws.oracle(), START_POSITION, &refs)?;

    ws.to_root(side);
    match ws.active_entry(side).map(|e| e.tree.clone()) {
        Some(tree) => {
            let mut node = tree.root_id().to_string();
            for played in &line {
                node = tree
                    .child_by_code(&node, &played.code)
                    .map(|n| n.id.clone())
                    .ok_or_else(|| CliError::Refused(format!("{} is not in the repertoire", played.san)))?;
            }
            ws.navigate(side, &node);
        }
        None => {
            for played in &line {
                if !matches!(ws.play(side, &played.code), PlayOutcome::Browsed { .. }) {
                    return Err(refused(ws, "Move not in any repertoire"));
                }
            }
        }
    }
    render_position(ws, side)
}

/// The current position of `side`, with the last move marked.
pub fn render_board<O: RulesOracle>(ws: &Workspace<O>, side: PieceColor) -> Result<String, CliError> {
    let board = DisplayBoard::from_fen(&ws.current_position(side))?;
    let last = ws.last_move_code(side);
    Ok(board.render(ws.orientation(side), last.as_deref()))
}

/// Board, line and the continuations available from the current position.
pub fn render_position<O: RulesOracle>(ws: &Workspace<O>, side: PieceColor) -> Result<String, CliError> {
    let mut out = render_board(ws, side)?;

    let line = ws.current_line(side);
    if !line.is_empty() {
        out.push_str(&format!("\n{}\n", format_line(&line)));
    }
    let options = ws.options(side);
    if options.is_empty() {
        out.push_str("\nNo continuations\n");
    } else {
        out.push('\n');
        for option in options {
            out.push_str(&format!("  {:<8}{}\n", option.notation, option.entries.join(", ")));
        }
    }
    Ok(out)
}
