//! Bounded undo history of (tree, cursor) snapshots.

use std::collections::VecDeque;

use crate::tree::MoveTree;

pub const UNDO_LIMIT: usize = 200;

/// State of one side captured before a mutation or cursor move. Trees share
/// their nodes copy-on-write, so holding a snapshot costs one map clone and
/// later edits never leak into it.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoSnapshot {
    pub tree: MoveTree,
    pub cursor: String,
}

/// Linear stack with no redo. The oldest snapshot is dropped once the limit
/// is reached.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    snapshots: VecDeque<UndoSnapshot>,
    limit: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::with_limit(UNDO_LIMIT)
    }
}

impl UndoHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, snapshot: UndoSnapshot) {
        if self.snapshots.len() == self.limit {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<UndoSnapshot> {
        self.snapshots.pop_back()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{resolve_line, ROOT_ID};
    use chess::{StandardRules, START_POSITION};

    fn snapshot(cursor: &str) -> UndoSnapshot {
        UndoSnapshot {
            tree: MoveTree::new(),
            cursor: cursor.to_string(),
        }
    }

    #[test]
    fn test_pop_is_lifo() {
        let mut history = UndoHistory::default();
        history.push(snapshot("a"));
        history.push(snapshot("b"));
        assert_eq!(history.pop().unwrap().cursor, "b");
        assert_eq!(history.pop().unwrap().cursor, "a");
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_oldest_dropped_at_limit() {
        let mut history = UndoHistory::default();
        for i in 0..UNDO_LIMIT + 5 {
            history.push(snapshot(&i.to_string()));
        }
        assert_eq!(history.len(), UNDO_LIMIT);
        let mut last = None;
        while let Some(s) = history.pop() {
            last = Some(s.cursor);
        }
        assert_eq!(last.as_deref(), Some("5"));
    }

    #[test]
    fn test_snapshot_unaffected_by_later_edits() {
        let mut tree = MoveTree::new();
        let line = resolve_line(&StandardRules, START_POSITION, &["e4"]).unwrap();
        tree.insert_line(&line).unwrap();

        let mut history = UndoHistory::default();
        let pushed = UndoSnapshot {
            tree: tree.clone(),
            cursor: ROOT_ID.to_string(),
        };
        history.push(pushed.clone());

        let more = resolve_line(&StandardRules, START_POSITION, &["d4", "d5"]).unwrap();
        tree.insert_line(&more).unwrap();
        let e4 = tree.children(ROOT_ID)[0].clone();
        tree.remove_branch(&e4);

        assert_eq!(history.pop(), Some(pushed));
    }
}
