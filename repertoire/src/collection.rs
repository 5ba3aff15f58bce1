//! Named repertoires per side, the active selector and the browse view.

use std::collections::BTreeMap;

use chess::{position_key, PieceColor};
use smallvec::SmallVec;

use crate::side::BySide;
use crate::tree::MoveTree;

pub const DEFAULT_NAME: &str = "Default";
pub const UNTITLED_NAME: &str = "Untitled repertoire";

/// One named move tree with its own cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct RepertoireEntry {
    pub id: String,
    pub name: String,
    pub tree: MoveTree,
    pub cursor: String,
}

impl RepertoireEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_tree(name, MoveTree::new())
    }

    pub fn with_tree(name: impl Into<String>, tree: MoveTree) -> Self {
        let cursor = tree.root_id().to_string();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            tree,
            cursor,
        }
    }

    /// Point the cursor back at the root if it references a missing node.
    pub fn repair_cursor(&mut self) -> bool {
        if self.tree.contains(&self.cursor) {
            return false;
        }
        self.cursor = self.tree.root_id().to_string();
        true
    }

    pub fn is_protected(&self) -> bool {
        self.name.eq_ignore_ascii_case(DEFAULT_NAME)
    }
}

/// Why a deletion did or did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// Removed. `fallback` is the entry activated in place of the deleted
    /// active one.
    Removed { fallback: Option<String> },
    Protected,
    LastEntry,
    Unknown,
}

/// A move available at a browsed position, with the repertoires that
/// contain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseOption {
    pub move_code: String,
    pub notation: String,
    pub position: String,
    pub entries: SmallVec<[String; 2]>,
}

/// The repertoires of one side. `active_id == None` is browse mode.
#[derive(Debug, Clone, PartialEq)]
pub struct SideCollection {
    pub entries: Vec<RepertoireEntry>,
    pub active_id: Option<String>,
}

impl Default for SideCollection {
    /// A single empty "Default" repertoire, active.
    fn default() -> Self {
        let entry = RepertoireEntry::new(DEFAULT_NAME);
        Self {
            active_id: Some(entry.id.clone()),
            entries: vec![entry],
        }
    }
}

pub type Collection = BySide<SideCollection>;

/// Trim and collapse internal whitespace.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl SideCollection {
    pub fn entry(&self, id: &str) -> Option<&RepertoireEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: &str) -> Option<&mut RepertoireEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Entry whose name matches `name` after normalization, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&RepertoireEntry> {
        let wanted = normalize_name(name);
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(&wanted))
    }

    pub fn active(&self) -> Option<&RepertoireEntry> {
        self.active_id.as_deref().and_then(|id| self.entry(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut RepertoireEntry> {
        let id = self.active_id.clone()?;
        self.entry_mut(&id)
    }

    pub fn is_browsing(&self) -> bool {
        self.active_id.is_none()
    }

    /// Normalize `raw`, substituting the untitled name when empty and
    /// appending a counter while the name is taken by another entry.
    fn unique_name(&self, raw: &str, except: Option<&str>) -> String {
        let base = match normalize_name(raw) {
            name if name.is_empty() => UNTITLED_NAME.to_string(),
            name => name,
        };
        let taken = |candidate: &str| {
            self.entries
                .iter()
                .any(|e| Some(e.id.as_str()) != except && e.name.eq_ignore_ascii_case(candidate))
        };
        if !taken(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{base} {n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or(base)
    }

    /// Add an empty repertoire and return its id. Does not activate it.
    pub fn create(&mut self, name: &str) -> String {
        self.insert(name, MoveTree::new())
    }

    /// Add a repertoire holding `tree` and return its id.
    pub fn insert(&mut self, name: &str, tree: MoveTree) -> String {
        let entry = RepertoireEntry::with_tree(self.unique_name(name, None), tree);
        let id = entry.id.clone();
        tracing::info!(entry_id = %id, name = %entry.name, "Created repertoire");
        self.entries.push(entry);
        id
    }

    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        let name = self.unique_name(name, Some(id));
        match self.entry_mut(id) {
            Some(entry) => {
                tracing::info!(entry_id = %id, from = %entry.name, to = %name, "Renamed repertoire");
                entry.name = name;
                true
            }
            None => false,
        }
    }

    /// Delete an entry unless it is the protected default or the last one.
    /// Deleting the active entry activates the first remaining entry.
    pub fn delete(&mut self, id: &str) -> Deletion {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return Deletion::Unknown;
        };
        if self.entries[index].is_protected() {
            return Deletion::Protected;
        }
        if self.entries.len() == 1 {
            return Deletion::LastEntry;
        }

        let removed = self.entries.remove(index);
        tracing::info!(entry_id = %id, name = %removed.name, "Deleted repertoire");
        let fallback = if self.active_id.as_deref() == Some(id) {
            let next = self.entries.first().map(|e| e.id.clone());
            self.active_id = next.clone();
            next
        } else {
            None
        };
        Deletion::Removed { fallback }
    }

    /// Select an entry, or browse mode with `None`. Unknown ids are refused.
    pub fn activate(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if self.entry(id).is_none() => false,
            id => {
                self.active_id = id.map(str::to_string);
                true
            }
        }
    }

    /// Union of the moves every entry knows at `position`, grouped by move
    /// code. Positions compare by placement, side to move, castling and en
    /// passant, so transpositions match. Moves known to more entries come
    /// first, ties broken by notation.
    pub fn options_at(&self, position: &str) -> Vec<BrowseOption> {
        let key = position_key(position);
        let mut grouped: BTreeMap<String, BrowseOption> = BTreeMap::new();

        for entry in &self.entries {
            let tree = &entry.tree;
            for node in tree.nodes().filter(|n| position_key(&n.position) == key) {
                for child in node.children.iter().filter_map(|c| tree.node(c)) {
                    let (Some(code), Some(san)) = (&child.move_code, &child.move_notation) else {
                        continue;
                    };
                    let option = grouped.entry(code.clone()).or_insert_with(|| BrowseOption {
                        move_code: code.clone(),
                        notation: san.clone(),
                        position: child.position.clone(),
                        entries: SmallVec::new(),
                    });
                    if !option.entries.contains(&entry.name) {
                        option.entries.push(entry.name.clone());
                    }
                }
            }
        }

        let mut options: Vec<BrowseOption> = grouped.into_values().collect();
        options.sort_by(|a, b| {
            b.entries
                .len()
                .cmp(&a.entries.len())
                .then_with(|| a.notation.cmp(&b.notation))
        });
        options
    }
}

impl Collection {
    pub fn side(&self, side: PieceColor) -> &SideCollection {
        self.get(side)
    }

    pub fn side_mut(&mut self, side: PieceColor) -> &mut SideCollection {
        self.get_mut(side)
    }
}
