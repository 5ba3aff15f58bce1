//! Versioned JSON codec for the whole collection.
//!
//! Version 2 stores every side as an ordered entry list plus the active id.
//! Version 1 stored a single tree and cursor per side; it is migrated into a
//! "Default" entry per side with browse mode selected. Decoding never fails:
//! malformed input falls back to fresh defaults, per side where possible.

use std::collections::{BTreeMap, HashSet};

use chess::PieceColor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PersistenceError;
use crate::collection::{Collection, RepertoireEntry, SideCollection, DEFAULT_NAME};
use crate::tree::{MoveNode, MoveTree};

pub const SCHEMA_VERSION: u64 = 2;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeRecord {
    root_id: String,
    next_id: u64,
    nodes: BTreeMap<String, MoveNode>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord {
    id: String,
    name: String,
    tree: TreeRecord,
    cursor_node_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SideRecord {
    entries: Vec<EntryRecord>,
    active_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacySideRecord {
    tree: TreeRecord,
    cursor_node_id: String,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    version: u64,
    white: &'a SideRecord,
    black: &'a SideRecord,
}

/// Result of decoding a stored collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub collection: Collection,
    /// The payload used the legacy single-tree schema.
    pub migrated: bool,
    /// Human-readable notes about every repair or fallback applied.
    pub notes: Vec<String>,
}

impl Loaded {
    pub fn repaired(&self) -> bool {
        !self.notes.is_empty()
    }

    fn fresh(note: impl Into<String>) -> Self {
        Self {
            collection: Collection::default(),
            migrated: false,
            notes: vec![note.into()],
        }
    }
}

impl TreeRecord {
    fn from_tree(tree: &MoveTree) -> Self {
        Self {
            root_id: tree.root_id().to_string(),
            next_id: tree.next_id(),
            nodes: tree.nodes().map(|n| (n.id.clone(), n.clone())).collect(),
        }
    }

    fn into_tree(self) -> Result<MoveTree, String> {
        MoveTree::from_parts(self.root_id, self.nodes, self.next_id).map_err(|e| e.to_string())
    }
}

fn side_record(side: &SideCollection) -> SideRecord {
    SideRecord {
        entries: side
            .entries
            .iter()
            .map(|e| EntryRecord {
                id: e.id.clone(),
                name: e.name.clone(),
                tree: TreeRecord::from_tree(&e.tree),
                cursor_node_id: e.cursor.clone(),
            })
            .collect(),
        active_id: side.active_id.clone(),
    }
}

/// Serialize a collection in the current schema.
pub fn encode(collection: &Collection) -> Result<String, PersistenceError> {
    let white = side_record(&collection.white);
    let black = side_record(&collection.black);
    let document = Document {
        version: SCHEMA_VERSION,
        white: &white,
        black: &black,
    };
    Ok(serde_json::to_string(&document)?)
}

/// Deserialize a stored collection, migrating and repairing as needed.
pub fn decode(payload: &str) -> Loaded {
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => return fallback_all(format!("unreadable payload: {e}")),
    };
    let Some(object) = value.as_object() else {
        return fallback_all("payload is not an object");
    };

    let version = match object.get("version") {
        Some(v) => match v.as_u64() {
            Some(v) => v,
            None => return fallback_all("version is not a number"),
        },
        None => detect_version(object),
    };

    let mut notes = Vec::new();
    let (white, black, migrated) = match version {
        1 => (
            decode_legacy_side(object.get("white"), PieceColor::White, &mut notes),
            decode_legacy_side(object.get("black"), PieceColor::Black, &mut notes),
            true,
        ),
        2 => (
            decode_side(object.get("white"), PieceColor::White, &mut notes),
            decode_side(object.get("black"), PieceColor::Black, &mut notes),
            false,
        ),
        other => return fallback_all(format!("unsupported schema version {other}")),
    };

    if migrated {
        tracing::info!("Migrated legacy repertoire payload");
    }
    for note in &notes {
        tracing::warn!(%note, "Repaired stored repertoires");
    }
    Loaded {
        collection: Collection::new(white, black),
        migrated,
        notes,
    }
}

fn fallback_all(reason: impl Into<String>) -> Loaded {
    let reason = reason.into();
    tracing::warn!(%reason, "Discarding stored repertoires");
    Loaded::fresh(reason)
}

/// Payloads written before the version field existed are told apart by
/// the shape of their sides.
fn detect_version(object: &serde_json::Map<String, Value>) -> u64 {
    let has = |key: &str| {
        ["white", "black"]
            .iter()
            .any(|side| object.get(*side).and_then(|s| s.get(key)).is_some())
    };
    if has("entries") {
        2
    } else if has("tree") {
        1
    } else {
        0
    }
}

fn decode_side(value: Option<&Value>, side: PieceColor, notes: &mut Vec<String>) -> SideCollection {
    let record = match value.map(|v| SideRecord::deserialize(v)) {
        Some(Ok(record)) => record,
        Some(Err(e)) => return side_fallback(side, format!("malformed: {e}"), notes),
        None => return side_fallback(side, "missing", notes),
    };
    if record.entries.is_empty() {
        return side_fallback(side, "no repertoires", notes);
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(record.entries.len());
    for entry in record.entries {
        if !seen.insert(entry.id.clone()) {
            return side_fallback(side, format!("duplicate repertoire id {}", entry.id), notes);
        }
        let tree = match entry.tree.into_tree() {
            Ok(tree) => tree,
            Err(e) => {
                return side_fallback(side, format!("invalid tree in '{}': {e}", entry.name), notes)
            }
        };
        let mut restored = RepertoireEntry {
            id: entry.id,
            name: entry.name,
            tree,
            cursor: entry.cursor_node_id,
        };
        if restored.repair_cursor() {
            notes.push(format!("{side}: cursor of '{}' reset to root", restored.name));
        }
        entries.push(restored);
    }

    let mut active_id = record.active_id;
    if let Some(id) = &active_id {
        if !entries.iter().any(|e| &e.id == id) {
            notes.push(format!("{side}: active repertoire {id} not found, browsing"));
            active_id = None;
        }
    }
    SideCollection { entries, active_id }
}

fn decode_legacy_side(
    value: Option<&Value>,
    side: PieceColor,
    notes: &mut Vec<String>,
) -> SideCollection {
    let record = match value.map(|v| LegacySideRecord::deserialize(v)) {
        Some(Ok(record)) => record,
        Some(Err(e)) => return side_fallback(side, format!("malformed legacy side: {e}"), notes),
        None => return side_fallback(side, "missing", notes),
    };
    let tree = match record.tree.into_tree() {
        Ok(tree) => tree,
        Err(e) => return side_fallback(side, format!("invalid legacy tree: {e}"), notes),
    };
    let mut entry = RepertoireEntry::with_tree(DEFAULT_NAME, tree);
    entry.cursor = record.cursor_node_id;
    if entry.repair_cursor() {
        notes.push(format!("{side}: legacy cursor reset to root"));
    }
    SideCollection {
        entries: vec![entry],
        active_id: None,
    }
}

fn side_fallback(side: PieceColor, reason: impl Into<String>, notes: &mut Vec<String>) -> SideCollection {
    notes.push(format!("{side}: {}, replaced with an empty default", reason.into()));
    SideCollection::default()
}
