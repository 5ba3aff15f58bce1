//! The repertoire move tree.
//!
//! Nodes live in a flat id → node arena with explicit parent and children
//! ids. Each node sits behind an `Arc`, and every mutation goes through
//! `Arc::make_mut`: cloning a tree is a shallow copy that shares all nodes,
//! and writing to one clone copies only the touched nodes. Undo snapshots
//! rely on this to stay independent of later edits.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chess::{MoveError, PlayedMove, RulesOracle, START_POSITION};
use serde::{Deserialize, Serialize};

pub const ROOT_ID: &str = "root";

/// One position reached by one move, or the empty root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub position: String,
    pub move_notation: Option<String>,
    pub move_code: Option<String>,
    /// First child is the main line, the rest are variations in priority order.
    pub children: Vec<String>,
    /// Evaluation text attached from engine analysis. Never interpreted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl MoveNode {
    fn root() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            parent_id: None,
            position: START_POSITION.to_string(),
            move_notation: None,
            move_code: None,
            children: Vec::new(),
            annotation: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTree {
    root_id: String,
    nodes: BTreeMap<String, Arc<MoveNode>>,
    next_id: u64,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTree {
    /// An empty tree holding only the root.
    pub fn new() -> Self {
        let root = MoveNode::root();
        let mut nodes = BTreeMap::new();
        nodes.insert(root.id.clone(), Arc::new(root));
        Self {
            root_id: ROOT_ID.to_string(),
            nodes,
            next_id: 1,
        }
    }

    /// Rebuild a tree from stored parts, checking every structural invariant.
    ///
    /// `next_id` is raised past any numeric id already in use so fresh ids
    /// never collide with stored ones.
    pub fn from_parts(
        root_id: String,
        nodes: BTreeMap<String, MoveNode>,
        next_id: u64,
    ) -> Result<Self, TreeError> {
        let highest = nodes
            .keys()
            .filter_map(|id| id.strip_prefix('n').and_then(|n| n.parse::<u64>().ok()))
            .max()
            .unwrap_or(0);
        let after_highest = highest.checked_add(1).ok_or(TreeError::IdsExhausted)?;
        let tree = Self {
            root_id,
            nodes: nodes.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            next_id: next_id.max(after_highest).max(1),
        };
        tree.validate()?;
        Ok(tree)
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn root(&self) -> &MoveNode {
        // The root is present in every tree built by `new` or `from_parts`.
        &self.nodes[&self.root_id]
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn node(&self, id: &str) -> Option<&MoveNode> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MoveNode> {
        self.nodes.values().map(Arc::as_ref)
    }

    /// Children ids of `id`; empty for leaves and unknown ids.
    pub fn children(&self, id: &str) -> &[String] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn child_by_code(&self, parent: &str, code: &str) -> Option<&MoveNode> {
        self.children(parent)
            .iter()
            .filter_map(|c| self.node(c))
            .find(|c| c.move_code.as_deref() == Some(code))
    }

    fn allocate_id(&mut self) -> Result<String, TreeError> {
        let next = self.next_id.checked_add(1).ok_or(TreeError::IdsExhausted)?;
        let id = format!("n{}", self.next_id);
        self.next_id = next;
        Ok(id)
    }

    /// Find-or-create the child of `parent` reached by `played`.
    ///
    /// Returns the child's id and whether it was newly created. New children
    /// are appended after existing siblings.
    pub fn add_child(
        &mut self,
        parent: &str,
        played: &PlayedMove,
    ) -> Result<(String, bool), TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent.to_string()));
        }
        if let Some(existing) = self.child_by_code(parent, &played.code) {
            return Ok((existing.id.clone(), false));
        }

        let id = self.allocate_id()?;
        let node = MoveNode {
            id: id.clone(),
            parent_id: Some(parent.to_string()),
            position: played.position.clone(),
            move_notation: Some(played.san.clone()),
            move_code: Some(played.code.clone()),
            children: Vec::new(),
            annotation: None,
        };
        self.nodes.insert(id.clone(), Arc::new(node));
        if let Some(parent) = self.nodes.get_mut(parent) {
            Arc::make_mut(parent).children.push(id.clone());
        }
        Ok((id, true))
    }

    /// Insert a line of consecutive moves starting at the root. Moves already
    /// present are reused. Returns the id of the node reached by the last move.
    pub fn insert_line(&mut self, moves: &[PlayedMove]) -> Result<String, TreeError> {
        let mut cursor = self.root_id.clone();
        for played in moves {
            cursor = self.add_child(&cursor, played)?.0;
        }
        Ok(cursor)
    }

    /// Nodes from the root to `id`, both included. Empty for unknown ids.
    pub fn build_path(&self, id: &str) -> Vec<&MoveNode> {
        let mut path = Vec::new();
        let mut current = self.node(id);
        while let Some(node) = current {
            path.push(node);
            if path.len() > self.nodes.len() {
                // Unreachable for validated trees; guards against a parent cycle.
                return Vec::new();
            }
            current = node.parent_id.as_deref().and_then(|p| self.node(p));
        }
        path.reverse();
        path
    }

    /// SAN of every move from the root to `id`.
    pub fn path_notation(&self, id: &str) -> Vec<String> {
        self.build_path(id)
            .into_iter()
            .filter_map(|n| n.move_notation.clone())
            .collect()
    }

    /// Remove `id` and its whole subtree. Refuses the root and unknown ids.
    pub fn remove_branch(&mut self, id: &str) -> bool {
        if id == self.root_id {
            return false;
        }
        let Some(parent_id) = self.node(id).and_then(|n| n.parent_id.clone()) else {
            return false;
        };

        let mut stack = vec![id.to_string()];
        let mut removed = 0usize;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children.iter().cloned());
                removed += 1;
            }
        }

        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            Arc::make_mut(parent).children.retain(|c| c != id);
        }
        tracing::debug!(node_id = %id, removed, "Removed branch");
        true
    }

    /// Attach or clear the evaluation text of a node.
    pub fn annotate(&mut self, id: &str, annotation: Option<String>) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                if node.annotation != annotation {
                    Arc::make_mut(node).annotation = annotation;
                }
                true
            }
            None => false,
        }
    }

    pub fn clear_annotation(&mut self, id: &str) -> bool {
        self.annotate(id, None)
    }

    /// Number of moves from the root to `id`.
    pub fn depth(&self, id: &str) -> Option<usize> {
        let path = self.build_path(id);
        (!path.is_empty()).then(|| path.len() - 1)
    }

    /// Reorder the children of `id` so that those whose move code appears in
    /// `preferred` come first, in that order. Children not listed keep their
    /// relative order after the listed ones.
    pub fn reorder_children(&mut self, id: &str, preferred: &[String]) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let rank = |child: &String| {
            self.node(child)
                .and_then(|c| c.move_code.as_ref())
                .and_then(|code| preferred.iter().position(|p| p == code))
                .unwrap_or(usize::MAX)
        };
        let mut ordered = node.children.clone();
        ordered.sort_by_key(rank);
        if ordered == node.children {
            return true;
        }
        if let Some(node) = self.nodes.get_mut(id) {
            Arc::make_mut(node).children = ordered;
        }
        true
    }

    /// Every root-to-leaf line as SAN sequences, main line first.
    pub fn leaf_lines(&self) -> Vec<Vec<String>> {
        let mut lines = Vec::new();
        let mut stack = vec![(self.root_id.as_str(), Vec::<String>::new())];
        while let Some((id, line)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            if node.children.is_empty() {
                if !line.is_empty() {
                    lines.push(line);
                }
                continue;
            }
            for child_id in node.children.iter().rev() {
                if let Some(child) = self.node(child_id) {
                    let mut next = line.clone();
                    next.push(child.move_notation.clone().unwrap_or_default());
                    stack.push((child_id.as_str(), next));
                }
            }
        }
        lines
    }

    /// Check the arena invariants: a rooted arborescence with consistent
    /// parent links, a sentinel root, and distinct move codes among siblings.
    pub fn validate(&self) -> Result<(), TreeError> {
        let root = self
            .nodes
            .get(&self.root_id)
            .ok_or_else(|| TreeError::MissingRoot(self.root_id.clone()))?;
        if root.parent_id.is_some()
            || root.move_code.is_some()
            || root.move_notation.is_some()
            || root.position != START_POSITION
        {
            return Err(TreeError::InvalidRoot);
        }

        for (key, node) in &self.nodes {
            if key != &node.id {
                return Err(TreeError::KeyMismatch(key.clone()));
            }
            if key != &self.root_id {
                let parent_id = node
                    .parent_id
                    .as_ref()
                    .ok_or_else(|| TreeError::Orphan(key.clone()))?;
                let parent = self
                    .nodes
                    .get(parent_id)
                    .ok_or_else(|| TreeError::Orphan(key.clone()))?;
                if !parent.children.contains(key) {
                    return Err(TreeError::Orphan(key.clone()));
                }
                if node.move_code.is_none() || node.move_notation.is_none() {
                    return Err(TreeError::MissingMove(key.clone()));
                }
            }

            let mut codes = HashSet::new();
            for child_id in &node.children {
                let child = self
                    .nodes
                    .get(child_id)
                    .ok_or_else(|| TreeError::DanglingChild(child_id.clone()))?;
                if child.parent_id.as_deref() != Some(key.as_str()) {
                    return Err(TreeError::ParentMismatch(child_id.clone()));
                }
                if let Some(code) = &child.move_code {
                    if !codes.insert(code.as_str()) {
                        return Err(TreeError::DuplicateMove(code.clone()));
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        let mut stack = vec![self.root_id.as_str()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(TreeError::Cycle(id.to_string()));
            }
            stack.extend(self.children(id).iter().map(String::as_str));
        }
        if seen.len() != self.nodes.len() {
            return Err(TreeError::Unreachable(self.nodes.len() - seen.len()));
        }
        Ok(())
    }
}

/// Resolve a sequence of moves, each given as SAN or as a move code, played
/// one after another from `position`.
pub fn resolve_line<O: RulesOracle>(
    oracle: &O,
    position: &str,
    moves: &[&str],
) -> Result<Vec<PlayedMove>, MoveError> {
    let mut current = position.to_string();
    let mut line = Vec::with_capacity(moves.len());
    for mv in moves {
        let played = oracle
            .try_move(&current, mv)
            .or_else(|_| oracle.try_san(&current, mv))?;
        current = played.position.clone();
        line.push(played);
    }
    Ok(line)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("Root node {0} is missing")]
    MissingRoot(String),
    #[error("Root node must have no parent, no move and the start position")]
    InvalidRoot,
    #[error("Node stored under key {0} has a different id")]
    KeyMismatch(String),
    #[error("Node {0} is not referenced by its parent")]
    Orphan(String),
    #[error("Node {0} has no move")]
    MissingMove(String),
    #[error("Child {0} does not exist")]
    DanglingChild(String),
    #[error("Child {0} points at a different parent")]
    ParentMismatch(String),
    #[error("Duplicate sibling move {0}")]
    DuplicateMove(String),
    #[error("Cycle through node {0}")]
    Cycle(String),
    #[error("{0} nodes are unreachable from the root")]
    Unreachable(usize),
    #[error("No node ids left to allocate")]
    IdsExhausted,
}
