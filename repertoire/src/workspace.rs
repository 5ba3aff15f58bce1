//! The controller owning the collection and everything that edits it.
//!
//! Every operation runs to completion synchronously. Structural edits and
//! cursor moves on the active repertoire push an undo snapshot first; no-op
//! calls leave the history untouched. Outcomes that are not errors but did
//! nothing are reported through the advisory [`Workspace::status`] text.

use chess::{PieceColor, RulesOracle, StandardRules, START_POSITION};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::collection::{BrowseOption, Collection, Deletion, RepertoireEntry};
use crate::history::{UndoHistory, UndoSnapshot};
use crate::pgn::{self, ImportSummary};
use crate::services::{apply_popularity, AnalysisScore, PositionStats};
use crate::side::BySide;
use crate::training::{AttemptOutcome, TrainingSession};
use crate::tree::MoveNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A new node was added under the cursor.
    Added { node_id: String },
    /// The move was already in the tree; the cursor followed it.
    Followed { node_id: String },
    /// Browse mode moved to the position after the move.
    Browsed { position: String },
    Training(AttemptOutcome),
    Rejected(String),
}

/// One step taken in browse mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseStep {
    pub move_code: String,
    pub notation: String,
    pub position: String,
}

pub struct Workspace<O = StandardRules> {
    oracle: O,
    collection: Collection,
    history: BySide<UndoHistory>,
    training: BySide<Option<TrainingSession>>,
    orientation: BySide<PieceColor>,
    browse: BySide<Vec<BrowseStep>>,
    rng: StdRng,
    status: Option<String>,
}

impl<O: RulesOracle> Workspace<O> {
    pub fn new(oracle: O, collection: Collection) -> Self {
        Self {
            oracle,
            collection,
            history: BySide::default(),
            training: BySide::default(),
            orientation: BySide::new(PieceColor::White, PieceColor::Black),
            browse: BySide::default(),
            rng: StdRng::from_os_rng(),
            status: None,
        }
    }

    /// Use a seeded random source for training draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn into_collection(self) -> Collection {
        self.collection
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Advisory text describing the last operation that was refused or
    /// needs the user's attention.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn note(&mut self, side: PieceColor, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(side = %side, %message, "Status");
        self.status = Some(message);
    }

    pub fn active_entry(&self, side: PieceColor) -> Option<&RepertoireEntry> {
        self.collection.get(side).active()
    }

    pub fn undo_depth(&self, side: PieceColor) -> usize {
        self.history.get(side).len()
    }

    /// Node under the cursor of the active repertoire.
    pub fn cursor(&self, side: PieceColor) -> Option<&MoveNode> {
        let entry = self.active_entry(side)?;
        entry.tree.node(&entry.cursor)
    }

    /// Position shown for `side`: the cursor node, or the browse position.
    pub fn current_position(&self, side: PieceColor) -> String {
        match self.active_entry(side) {
            Some(entry) => entry
                .tree
                .node(&entry.cursor)
                .map(|n| n.position.clone())
                .unwrap_or_else(|| START_POSITION.to_string()),
            None => self
                .browse
                .get(side)
                .last()
                .map(|s| s.position.clone())
                .unwrap_or_else(|| START_POSITION.to_string()),
        }
    }

    /// Moves leading to the current position, in SAN.
    pub fn current_line(&self, side: PieceColor) -> Vec<String> {
        match self.active_entry(side) {
            Some(entry) => entry.tree.path_notation(&entry.cursor),
            None => self.browse.get(side).iter().map(|s| s.notation.clone()).collect(),
        }
    }

    /// Code of the move that produced the current position.
    pub fn last_move_code(&self, side: PieceColor) -> Option<String> {
        match self.active_entry(side) {
            Some(_) => self.cursor(side).and_then(|n| n.move_code.clone()),
            None => self.browse.get(side).last().map(|s| s.move_code.clone()),
        }
    }

    pub fn browse_path(&self, side: PieceColor) -> &[BrowseStep] {
        self.browse.get(side)
    }

    pub fn training(&self, side: PieceColor) -> Option<&TrainingSession> {
        self.training.get(side).as_ref()
    }

    pub fn orientation(&self, side: PieceColor) -> PieceColor {
        *self.orientation.get(side)
    }

    /// Run `edit` on the active entry of `side`, pushing the prior state to
    /// the undo history if the edit changed the tree or the cursor.
    fn with_snapshot<T>(
        &mut self,
        side: PieceColor,
        edit: impl FnOnce(&O, &mut RepertoireEntry) -> T,
    ) -> Option<T> {
        let entry = self.collection.get_mut(side).active_mut()?;
        let before = UndoSnapshot {
            tree: entry.tree.clone(),
            cursor: entry.cursor.clone(),
        };
        let out = edit(&self.oracle, entry);
        if entry.tree != before.tree || entry.cursor != before.cursor {
            self.history.get_mut(side).push(before);
        }
        Some(out)
    }

    fn refuse_during_training(&mut self, side: PieceColor) -> bool {
        if self.training.get(side).is_some() {
            self.note(side, "Not available while training");
            return true;
        }
        false
    }

    /// Leave any session on `side`, e.g. after the tree it drills changed
    /// identity.
    fn teardown_training(&mut self, side: PieceColor, reason: &str) {
        if self.training.get_mut(side).take().is_some() {
            tracing::info!(side = %side, reason, "Training stopped");
        }
    }

    /// Follow a tree edit with the training session, dropping it when its
    /// root no longer exists.
    fn reconcile_training(&mut self, side: PieceColor) {
        let Some(entry) = self.collection.get_mut(side).active_mut() else {
            self.teardown_training(side, "no active repertoire");
            return;
        };
        let Some(session) = self.training.get_mut(side).as_mut() else {
            return;
        };
        if !session.is_valid_for(&entry.tree) {
            self.training.get_mut(side).take();
            tracing::info!(side = %side, "Training stopped, its root was removed");
            return;
        }
        session.reconcile(&entry.tree, &self.oracle, &mut self.rng);
        entry.cursor = session.cursor().to_string();
    }

    /// Play a move given as a move code. In training it is checked against
    /// the tree; in browse mode it must be one of the browse options;
    /// otherwise it is added under the cursor.
    pub fn play(&mut self, side: PieceColor, code: &str) -> PlayOutcome {
        if self.training.get(side).is_some() {
            return self.play_training(side, code);
        }
        if self.collection.get(side).is_browsing() {
            return self.play_browse(side, code);
        }

        let position = self.current_position(side);
        let played = match self.oracle.try_move(&position, code) {
            Ok(played) => played,
            Err(e) => {
                let message = format!("Illegal move {code}: {e}");
                self.note(side, message.clone());
                return PlayOutcome::Rejected(message);
            }
        };

        let result = self.with_snapshot(side, |_, entry| {
            let (id, created) = entry.tree.add_child(&entry.cursor, &played)?;
            entry.cursor = id.clone();
            Ok::<_, crate::tree::TreeError>((id, created))
        });
        match result {
            Some(Ok((node_id, true))) => PlayOutcome::Added { node_id },
            Some(Ok((node_id, false))) => PlayOutcome::Followed { node_id },
            Some(Err(e)) => PlayOutcome::Rejected(e.to_string()),
            None => PlayOutcome::Rejected("No active repertoire".to_string()),
        }
    }

    fn play_browse(&mut self, side: PieceColor, code: &str) -> PlayOutcome {
        let position = self.current_position(side);
        let option = self
            .collection
            .get(side)
            .options_at(&position)
            .into_iter()
            .find(|o| o.move_code == code);
        match option {
            Some(option) => {
                self.browse.get_mut(side).push(BrowseStep {
                    move_code: option.move_code,
                    notation: option.notation,
                    position: option.position.clone(),
                });
                PlayOutcome::Browsed {
                    position: option.position,
                }
            }
            None => {
                let message = format!("{code} is not in any {side} repertoire");
                self.note(side, message.clone());
                PlayOutcome::Rejected(message)
            }
        }
    }

    fn play_training(&mut self, side: PieceColor, code: &str) -> PlayOutcome {
        let (Some(entry), Some(session)) = (
            self.collection.get_mut(side).active_mut(),
            self.training.get_mut(side).as_mut(),
        ) else {
            return PlayOutcome::Rejected("No training session".to_string());
        };
        let outcome = session.attempt(&entry.tree, &self.oracle, code, &mut self.rng);
        entry.cursor = session.cursor().to_string();
        match &outcome {
            AttemptOutcome::Rejected => self.note(side, "Nothing to play here"),
            AttemptOutcome::Mistake => self.note(side, "Not in the repertoire, try again or ask for a hint"),
            AttemptOutcome::Correct { line_complete: true } => {
                self.note(side, "Line complete")
            }
            AttemptOutcome::Correct { .. } => self.status = None,
        }
        PlayOutcome::Training(outcome)
    }

    /// Move the cursor to `node_id` in the active repertoire.
    pub fn navigate(&mut self, side: PieceColor, node_id: &str) -> bool {
        if self.refuse_during_training(side) {
            return false;
        }
        let moved = self.with_snapshot(side, |_, entry| {
            if !entry.tree.contains(node_id) {
                return false;
            }
            entry.cursor = node_id.to_string();
            true
        });
        match moved {
            Some(true) => true,
            Some(false) => {
                self.note(side, format!("Unknown node {node_id}"));
                false
            }
            None => false,
        }
    }

    /// Step the cursor back one move.
    pub fn back(&mut self, side: PieceColor) -> bool {
        if self.refuse_during_training(side) {
            return false;
        }
        if self.collection.get(side).is_browsing() {
            return self.browse.get_mut(side).pop().is_some();
        }
        self.with_snapshot(side, |_, entry| {
            let parent = entry
                .tree
                .node(&entry.cursor)
                .and_then(|n| n.parent_id.clone());
            match parent {
                Some(parent) => {
                    entry.cursor = parent;
                    true
                }
                None => false,
            }
        })
        .unwrap_or(false)
    }

    /// Return the cursor to the start position.
    pub fn to_root(&mut self, side: PieceColor) -> bool {
        if self.refuse_during_training(side) {
            return false;
        }
        if self.collection.get(side).is_browsing() {
            let path = self.browse.get_mut(side);
            let moved = !path.is_empty();
            path.clear();
            return moved;
        }
        self.with_snapshot(side, |_, entry| {
            let moved = entry.cursor != entry.tree.root_id();
            entry.cursor = entry.tree.root_id().to_string();
            moved
        })
        .unwrap_or(false)
    }

    /// Remove `node_id` and its subtree from the active repertoire. A cursor
    /// inside the removed subtree moves to the removed node's parent.
    pub fn delete_branch(&mut self, side: PieceColor, node_id: &str) -> bool {
        let removed = self
            .with_snapshot(side, |_, entry| {
                let parent = entry.tree.node(node_id).and_then(|n| n.parent_id.clone());
                if !entry.tree.remove_branch(node_id) {
                    return false;
                }
                if !entry.tree.contains(&entry.cursor) {
                    entry.cursor = parent.unwrap_or_else(|| entry.tree.root_id().to_string());
                }
                true
            })
            .unwrap_or(false);
        if removed {
            self.reconcile_training(side);
        } else {
            self.note(side, "Nothing to delete there");
        }
        removed
    }

    /// Merge PGN text into the active repertoire.
    pub fn import_pgn(&mut self, side: PieceColor, text: &str) -> Option<ImportSummary> {
        let summary = self.with_snapshot(side, |oracle, entry| {
            pgn::parse_into(oracle, text, &mut entry.tree)
        });
        match &summary {
            Some(summary) => {
                tracing::info!(
                    side = %side,
                    games = summary.games,
                    added = summary.nodes_added,
                    "Imported PGN"
                );
                if !summary.is_clean() {
                    self.note(side, format!("Imported with {} skipped branches", summary.skipped.len()));
                }
                self.reconcile_training(side);
            }
            None => self.note(side, "Select a repertoire to import into"),
        }
        summary
    }

    /// Create a repertoire from PGN text and make it active.
    pub fn import_pgn_as_new(&mut self, side: PieceColor, name: &str, text: &str) -> (String, ImportSummary) {
        let (tree, summary) = pgn::parse(&self.oracle, text);
        let id = self.collection.get_mut(side).insert(name, tree);
        self.activate(side, Some(&id));
        (id, summary)
    }

    pub fn export_pgn(&self, side: PieceColor) -> Option<String> {
        self.active_entry(side).map(|e| pgn::export(&e.tree))
    }

    /// Create an empty repertoire and make it active.
    pub fn new_repertoire(&mut self, side: PieceColor, name: &str) -> String {
        let id = self.collection.get_mut(side).create(name);
        self.activate(side, Some(&id));
        id
    }

    pub fn rename_repertoire(&mut self, side: PieceColor, id: &str, name: &str) -> bool {
        let renamed = self.collection.get_mut(side).rename(id, name);
        if !renamed {
            self.note(side, format!("Unknown repertoire {id}"));
        }
        renamed
    }

    pub fn delete_repertoire(&mut self, side: PieceColor, id: &str) -> Deletion {
        let deletion = self.collection.get_mut(side).delete(id);
        match &deletion {
            Deletion::Removed { fallback: Some(_) } => {
                self.history.get_mut(side).clear();
                self.teardown_training(side, "active repertoire deleted");
            }
            Deletion::Removed { fallback: None } => {}
            Deletion::Protected => self.note(side, "The default repertoire cannot be deleted"),
            Deletion::LastEntry => self.note(side, "The last repertoire cannot be deleted"),
            Deletion::Unknown => self.note(side, format!("Unknown repertoire {id}")),
        }
        deletion
    }

    /// Select a repertoire, or browse mode with `None`. Switching clears
    /// the undo history and ends training on that side.
    pub fn activate(&mut self, side: PieceColor, id: Option<&str>) -> bool {
        if !self.collection.get_mut(side).activate(id) {
            self.note(side, "Unknown repertoire");
            return false;
        }
        self.history.get_mut(side).clear();
        self.browse.get_mut(side).clear();
        self.teardown_training(side, "repertoire switched");
        true
    }

    /// Restore the most recent snapshot. No-op on an empty history and
    /// while training.
    pub fn undo(&mut self, side: PieceColor) -> bool {
        if self.refuse_during_training(side) {
            return false;
        }
        let Some(entry) = self.collection.get_mut(side).active_mut() else {
            return false;
        };
        match self.history.get_mut(side).pop() {
            Some(snapshot) => {
                entry.tree = snapshot.tree;
                entry.cursor = snapshot.cursor;
                true
            }
            None => false,
        }
    }

    /// Start drilling the active repertoire from `root` (default: the
    /// cursor).
    pub fn start_training(&mut self, side: PieceColor, root: Option<&str>) -> bool {
        let Some(entry) = self.collection.get_mut(side).active_mut() else {
            self.note(side, "Select a repertoire to train");
            return false;
        };
        let root = root.map(str::to_string).unwrap_or_else(|| entry.cursor.clone());
        let Some(session) = TrainingSession::start(&entry.tree, &self.oracle, side, &root, &mut self.rng)
        else {
            self.note(side, format!("Unknown node {root}"));
            return false;
        };
        entry.cursor = session.cursor().to_string();
        tracing::info!(side = %side, root = %root, "Training started");
        *self.training.get_mut(side) = Some(session);
        self.status = None;
        true
    }

    pub fn stop_training(&mut self, side: PieceColor) -> bool {
        let stopped = self.training.get(side).is_some();
        self.teardown_training(side, "stopped by user");
        stopped
    }

    /// Reveal the expected move. Returns its code.
    pub fn request_hint(&mut self, side: PieceColor) -> Option<String> {
        let entry = self.collection.get(side).active()?;
        let session = self.training.get_mut(side).as_mut()?;
        session.request_hint(&entry.tree, &mut self.rng)
    }

    /// Draw a new line from the training root.
    pub fn continue_training(&mut self, side: PieceColor) -> bool {
        let (Some(entry), Some(session)) = (
            self.collection.get_mut(side).active_mut(),
            self.training.get_mut(side).as_mut(),
        ) else {
            return false;
        };
        session.continue_line(&entry.tree, &self.oracle, &mut self.rng);
        entry.cursor = session.cursor().to_string();
        true
    }

    /// Flip the board for `side`. Ends training on that side.
    pub fn set_orientation(&mut self, side: PieceColor, orientation: PieceColor) {
        let current = self.orientation.get_mut(side);
        if *current == orientation {
            return;
        }
        *current = orientation;
        self.teardown_training(side, "orientation changed");
    }

    /// Moves available at the current position: the browse union in browse
    /// mode, otherwise the cursor's children tagged with the active name.
    pub fn options(&self, side: PieceColor) -> Vec<BrowseOption> {
        let collection = self.collection.get(side);
        let Some(entry) = collection.active() else {
            return collection.options_at(&self.current_position(side));
        };
        entry
            .tree
            .children(&entry.cursor)
            .iter()
            .filter_map(|id| entry.tree.node(id))
            .map(|child| BrowseOption {
                move_code: child.move_code.clone().unwrap_or_default(),
                notation: child.move_notation.clone().unwrap_or_default(),
                position: child.position.clone(),
                entries: smallvec::smallvec![entry.name.clone()],
            })
            .collect()
    }

    /// Attach an engine evaluation to a node of the active repertoire.
    pub fn annotate(&mut self, side: PieceColor, node_id: &str, score: Option<AnalysisScore>) -> bool {
        self.collection
            .get_mut(side)
            .active_mut()
            .is_some_and(|e| e.tree.annotate(node_id, score.map(|s| s.to_string())))
    }

    /// Reorder a node's children by statistics popularity.
    pub fn apply_popularity(&mut self, side: PieceColor, node_id: &str, stats: &PositionStats) -> bool {
        self.with_snapshot(side, |_, entry| apply_popularity(&mut entry.tree, node_id, stats))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::SideCollection;
    use crate::training::TrainingPhase;

    const WHITE: PieceColor = PieceColor::White;
    const BLACK: PieceColor = PieceColor::Black;

    fn workspace() -> Workspace {
        Workspace::new(StandardRules, Collection::default()).with_seed(42)
    }

    fn notation(ws: &Workspace, side: PieceColor) -> Option<String> {
        ws.cursor(side).and_then(|n| n.move_notation.clone())
    }

    #[test]
    fn test_play_adds_then_follows() {
        let mut ws = workspace();
        assert!(matches!(ws.play(WHITE, "e2e4"), PlayOutcome::Added { .. }));
        assert!(matches!(ws.play(WHITE, "e7e5"), PlayOutcome::Added { .. }));
        ws.to_root(WHITE);
        assert!(matches!(ws.play(WHITE, "e2e4"), PlayOutcome::Followed { .. }));
        assert_eq!(ws.current_line(WHITE), vec!["e4"]);
    }

    #[test]
    fn test_illegal_move_is_rejected_without_snapshot() {
        let mut ws = workspace();
        assert!(matches!(ws.play(WHITE, "e2e5"), PlayOutcome::Rejected(_)));
        assert!(ws.status().unwrap().contains("Illegal"));
        assert_eq!(ws.undo_depth(WHITE), 0);
    }

    #[test]
    fn test_undo_restores_tree_and_cursor() {
        let mut ws = workspace();
        ws.play(WHITE, "e2e4");
        ws.play(WHITE, "e7e5");
        let before = ws.active_entry(WHITE).unwrap().clone();
        ws.play(WHITE, "g1f3");
        ws.back(WHITE);
        assert_eq!(ws.undo_depth(WHITE), 4);

        assert!(ws.undo(WHITE));
        assert_eq!(notation(&ws, WHITE).as_deref(), Some("Nf3"));
        assert!(ws.undo(WHITE));
        assert_eq!(ws.active_entry(WHITE).unwrap(), &before);
        assert!(ws.undo(WHITE));
        assert!(ws.undo(WHITE));
        assert!(ws.active_entry(WHITE).unwrap().tree.is_empty());
        assert!(!ws.undo(WHITE));
    }

    #[test]
    fn test_noop_cursor_moves_push_nothing() {
        let mut ws = workspace();
        assert!(!ws.back(WHITE));
        assert!(!ws.to_root(WHITE));
        assert!(!ws.navigate(WHITE, "n77"));
        assert_eq!(ws.undo_depth(WHITE), 0);
    }

    #[test]
    fn test_delete_branch_moves_cursor_out() {
        let mut ws = workspace();
        ws.import_pgn(WHITE, "1. e4 e5 2. Nf3 (2. Bc4 Bc5) Nc6").unwrap();
        let tree = &ws.active_entry(WHITE).unwrap().tree;
        let e5 = tree.children(&tree.children(tree.root_id())[0])[0].clone();
        let nf3 = tree.children(&e5)[0].clone();
        let nc6 = tree.children(&nf3)[0].clone();
        ws.navigate(WHITE, &nc6);

        assert!(ws.delete_branch(WHITE, &nf3));
        assert_eq!(ws.active_entry(WHITE).unwrap().cursor, e5);
        assert!(!ws.delete_branch(WHITE, "root"));
        assert!(ws.undo(WHITE));
        assert_eq!(ws.active_entry(WHITE).unwrap().cursor, nc6);
    }

    #[test]
    fn test_browse_mode_walks_union() {
        let mut ws = workspace();
        ws.import_pgn(WHITE, "1. e4 e5 2. Nf3").unwrap();
        ws.new_repertoire(WHITE, "Italian");
        ws.import_pgn(WHITE, "1. e4 e5 2. Bc4").unwrap();
        assert!(ws.activate(WHITE, None));

        assert!(matches!(ws.play(WHITE, "e2e4"), PlayOutcome::Browsed { .. }));
        ws.play(WHITE, "e7e5");
        let options = ws.options(WHITE);
        assert_eq!(options.len(), 2);
        assert!(matches!(ws.play(WHITE, "d2d4"), PlayOutcome::Rejected(_)));
        assert!(ws.back(WHITE));
        assert_eq!(ws.current_line(WHITE), vec!["e4"]);
        assert!(ws.to_root(WHITE));
        assert_eq!(ws.current_position(WHITE), START_POSITION);
        assert!(ws.import_pgn(WHITE, "1. d4").is_none());
    }

    #[test]
    fn test_delete_active_repertoire_falls_back() {
        let mut ws = workspace();
        let id = ws.new_repertoire(WHITE, "Gambits");
        ws.play(WHITE, "e2e4");
        ws.start_training(WHITE, Some("root"));
        assert!(ws.training(WHITE).is_some());

        let deletion = ws.delete_repertoire(WHITE, &id);
        assert!(matches!(deletion, Deletion::Removed { fallback: Some(_) }));
        assert_eq!(ws.active_entry(WHITE).unwrap().name, "Default");
        assert_eq!(ws.undo_depth(WHITE), 0);
        assert!(ws.training(WHITE).is_none());
    }

    #[test]
    fn test_protected_and_last_deletions_noted() {
        let mut ws = workspace();
        let default_id = ws.active_entry(BLACK).unwrap().id.clone();
        assert_eq!(ws.delete_repertoire(BLACK, &default_id), Deletion::Protected);
        assert!(ws.status().unwrap().contains("default"));
    }

    #[test]
    fn test_training_flow() {
        let mut ws = workspace();
        ws.import_pgn(BLACK, "1. e4 c5 2. Nf3 d6").unwrap();
        assert!(ws.start_training(BLACK, Some("root")));
        assert_eq!(notation(&ws, BLACK).as_deref(), Some("e4"));

        assert!(!ws.back(BLACK));
        assert!(!ws.undo(BLACK));

        let outcome = ws.play(BLACK, "e7e5");
        assert_eq!(outcome, PlayOutcome::Training(AttemptOutcome::Mistake));
        assert_eq!(ws.request_hint(BLACK).as_deref(), Some("c7c5"));

        ws.play(BLACK, "c7c5");
        assert_eq!(notation(&ws, BLACK).as_deref(), Some("Nf3"));
        let outcome = ws.play(BLACK, "d7d6");
        assert_eq!(
            outcome,
            PlayOutcome::Training(AttemptOutcome::Correct { line_complete: true })
        );
        assert_eq!(ws.training(BLACK).unwrap().phase(), TrainingPhase::LineComplete);

        assert!(ws.continue_training(BLACK));
        assert_eq!(notation(&ws, BLACK).as_deref(), Some("e4"));
        // The tree was never touched by training moves.
        assert_eq!(ws.active_entry(BLACK).unwrap().tree.len(), 5);
    }

    #[test]
    fn test_orientation_change_ends_training() {
        let mut ws = workspace();
        ws.import_pgn(WHITE, "1. e4").unwrap();
        ws.start_training(WHITE, None);
        ws.set_orientation(WHITE, WHITE);
        assert!(ws.training(WHITE).is_some());
        ws.set_orientation(WHITE, BLACK);
        assert!(ws.training(WHITE).is_none());
    }

    #[test]
    fn test_deleting_training_root_ends_training() {
        let mut ws = workspace();
        ws.import_pgn(WHITE, "1. e4 e5 2. Nf3 (2. Bc4)").unwrap();
        let tree = &ws.active_entry(WHITE).unwrap().tree;
        let e4 = tree.children(tree.root_id())[0].clone();
        assert!(ws.start_training(WHITE, Some(&e4)));
        assert!(ws.delete_branch(WHITE, &e4));
        assert!(ws.training(WHITE).is_none());
    }

    #[test]
    fn test_training_requires_active_repertoire() {
        let mut ws = workspace();
        ws.activate(WHITE, None);
        assert!(!ws.start_training(WHITE, None));
    }

    #[test]
    fn test_annotate_does_not_touch_history() {
        let mut ws = workspace();
        let PlayOutcome::Added { node_id } = ws.play(WHITE, "d2d4") else {
            panic!("expected a new node");
        };
        let depth = ws.undo_depth(WHITE);
        assert!(ws.annotate(WHITE, &node_id, Some(AnalysisScore::Centipawns(20))));
        assert_eq!(ws.undo_depth(WHITE), depth);
        assert_eq!(
            ws.cursor(WHITE).unwrap().annotation.as_deref(),
            Some("+0.20")
        );
    }

    #[test]
    fn test_switching_clears_history() {
        let mut ws = Workspace::new(
            StandardRules,
            Collection::new(SideCollection::default(), SideCollection::default()),
        );
        ws.play(WHITE, "e2e4");
        assert_eq!(ws.undo_depth(WHITE), 1);
        ws.new_repertoire(WHITE, "Other");
        assert_eq!(ws.undo_depth(WHITE), 0);
    }
}
