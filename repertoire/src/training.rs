//! Training traversal: quiz one side of a repertoire by auto-playing random
//! opponent replies and checking the trainee's moves against the tree.

use chess::{PieceColor, RulesOracle};
use rand::Rng;

use crate::tree::MoveTree;

/// Upper bound on opponent moves played in one advance.
pub const MAX_AUTO_PLIES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    Active,
    /// The cursor reached a leaf. `continue_line` starts a new draw.
    LineComplete,
}

/// Hint lifecycle: armed by a mistake, revealed on request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HintState {
    #[default]
    None,
    Armed { code: String },
    Visible { code: String },
}

impl HintState {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Armed { code } | Self::Visible { code } => Some(code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Not the trainee's turn, or nothing left to play here.
    Rejected,
    /// The move is in the repertoire; opponent replies were auto-played.
    Correct { line_complete: bool },
    /// The move is not in the repertoire. The tree is untouched and a hint
    /// is armed.
    Mistake,
}

/// Whether `id` is a node where the trainee must find a move.
fn trainee_to_move<O: RulesOracle>(
    tree: &MoveTree,
    oracle: &O,
    trainee: PieceColor,
    id: &str,
) -> bool {
    tree.node(id)
        .and_then(|n| oracle.side_to_move(&n.position).ok())
        .is_some_and(|side| side == trainee)
}

/// Descend through random children while it is the opponent's turn.
/// Stops on the trainee's turn, at a leaf, or after [`MAX_AUTO_PLIES`].
pub fn advance<O: RulesOracle, R: Rng + ?Sized>(
    tree: &MoveTree,
    oracle: &O,
    trainee: PieceColor,
    start: &str,
    rng: &mut R,
) -> String {
    let mut cursor = start.to_string();
    for _ in 0..MAX_AUTO_PLIES {
        let children = tree.children(&cursor);
        if children.is_empty() || trainee_to_move(tree, oracle, trainee, &cursor) {
            break;
        }
        cursor = children[rng.random_range(0..children.len())].clone();
    }
    cursor
}

/// An ephemeral drill on one side's active tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSession {
    side: PieceColor,
    root_node_id: String,
    cursor: String,
    phase: TrainingPhase,
    hint: HintState,
}

impl TrainingSession {
    /// Begin at `root_node_id` and advance to the trainee's first move.
    /// Returns `None` if the node is not in the tree.
    pub fn start<O: RulesOracle, R: Rng + ?Sized>(
        tree: &MoveTree,
        oracle: &O,
        side: PieceColor,
        root_node_id: &str,
        rng: &mut R,
    ) -> Option<Self> {
        if !tree.contains(root_node_id) {
            return None;
        }
        let mut session = Self {
            side,
            root_node_id: root_node_id.to_string(),
            cursor: root_node_id.to_string(),
            phase: TrainingPhase::Active,
            hint: HintState::None,
        };
        session.reroll(tree, oracle, rng);
        tracing::debug!(side = %side, root = %root_node_id, cursor = %session.cursor, "Training started");
        Some(session)
    }

    pub fn side(&self) -> PieceColor {
        self.side
    }

    pub fn root_node_id(&self) -> &str {
        &self.root_node_id
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    pub fn hint(&self) -> &HintState {
        &self.hint
    }

    pub fn hint_requested(&self) -> bool {
        self.hint != HintState::None
    }

    pub fn hint_visible(&self) -> bool {
        matches!(self.hint, HintState::Visible { .. })
    }

    pub fn hint_move_code(&self) -> Option<&str> {
        self.hint.code()
    }

    /// A session stays valid while its root exists in the tree.
    pub fn is_valid_for(&self, tree: &MoveTree) -> bool {
        tree.contains(&self.root_node_id)
    }

    fn settle(&mut self, tree: &MoveTree) {
        self.phase = if tree.children(&self.cursor).is_empty() {
            TrainingPhase::LineComplete
        } else {
            TrainingPhase::Active
        };
    }

    fn reroll<O: RulesOracle, R: Rng + ?Sized>(&mut self, tree: &MoveTree, oracle: &O, rng: &mut R) {
        self.cursor = advance(tree, oracle, self.side, &self.root_node_id, rng);
        self.hint = HintState::None;
        self.settle(tree);
    }

    /// Check a trainee move given as a move code.
    pub fn attempt<O: RulesOracle, R: Rng + ?Sized>(
        &mut self,
        tree: &MoveTree,
        oracle: &O,
        code: &str,
        rng: &mut R,
    ) -> AttemptOutcome {
        let children = tree.children(&self.cursor);
        if children.is_empty() || !trainee_to_move(tree, oracle, self.side, &self.cursor) {
            return AttemptOutcome::Rejected;
        }

        if let Some(child) = tree.child_by_code(&self.cursor, code) {
            self.cursor = advance(tree, oracle, self.side, &child.id, rng);
            self.hint = HintState::None;
            self.settle(tree);
            return AttemptOutcome::Correct {
                line_complete: self.phase == TrainingPhase::LineComplete,
            };
        }

        let still_valid = self
            .hint
            .code()
            .is_some_and(|armed| tree.child_by_code(&self.cursor, armed).is_some());
        if !still_valid {
            self.hint = HintState::Armed {
                code: Self::pick_hint(tree, &self.cursor, rng).unwrap_or_default(),
            };
        }
        AttemptOutcome::Mistake
    }

    fn pick_hint<R: Rng + ?Sized>(tree: &MoveTree, cursor: &str, rng: &mut R) -> Option<String> {
        let children = tree.children(cursor);
        if children.is_empty() {
            return None;
        }
        let child = &children[rng.random_range(0..children.len())];
        tree.node(child).and_then(|n| n.move_code.clone())
    }

    /// Reveal the hint, arming one first if no mistake did. Returns the
    /// revealed move code, or `None` when there is nothing to hint.
    pub fn request_hint<R: Rng + ?Sized>(&mut self, tree: &MoveTree, rng: &mut R) -> Option<String> {
        let code = match self.hint.code() {
            Some(code) if tree.child_by_code(&self.cursor, code).is_some() => code.to_string(),
            _ => Self::pick_hint(tree, &self.cursor, rng)?,
        };
        self.hint = HintState::Visible { code: code.clone() };
        Some(code)
    }

    /// Start a fresh random line from the session root.
    pub fn continue_line<O: RulesOracle, R: Rng + ?Sized>(
        &mut self,
        tree: &MoveTree,
        oracle: &O,
        rng: &mut R,
    ) {
        self.reroll(tree, oracle, rng);
    }

    /// Follow a tree edit: keep the cursor if it survived, otherwise fall
    /// back to a fresh draw from the root.
    pub fn reconcile<O: RulesOracle, R: Rng + ?Sized>(
        &mut self,
        tree: &MoveTree,
        oracle: &O,
        rng: &mut R,
    ) {
        if tree.contains(&self.cursor) {
            self.settle(tree);
        } else {
            self.reroll(tree, oracle, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::parse;
    use chess::StandardRules;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tree(text: &str) -> MoveTree {
        parse(&StandardRules, text).0
    }

    fn san_at(tree: &MoveTree, id: &str) -> String {
        tree.node(id).unwrap().move_notation.clone().unwrap_or_default()
    }

    #[test]
    fn test_white_starts_at_root() {
        let tree = tree("1. e4 e5 2. Nf3");
        let mut rng = StdRng::seed_from_u64(1);
        let session =
            TrainingSession::start(&tree, &StandardRules, PieceColor::White, tree.root_id(), &mut rng)
                .unwrap();
        assert_eq!(session.cursor(), tree.root_id());
        assert_eq!(session.phase(), TrainingPhase::Active);
    }

    #[test]
    fn test_black_gets_opponent_move_played() {
        let tree = tree("1. e4 (1. d4 d5) 1... c5");
        let mut rng = StdRng::seed_from_u64(7);
        let session =
            TrainingSession::start(&tree, &StandardRules, PieceColor::Black, tree.root_id(), &mut rng)
                .unwrap();
        let first = san_at(&tree, session.cursor());
        assert!(first == "e4" || first == "d4");
    }

    #[test]
    fn test_correct_move_advances_and_completes() {
        let tree = tree("1. e4 e5 2. Nf3");
        let mut rng = StdRng::seed_from_u64(3);
        let mut session =
            TrainingSession::start(&tree, &StandardRules, PieceColor::White, tree.root_id(), &mut rng)
                .unwrap();

        let outcome = session.attempt(&tree, &StandardRules, "e2e4", &mut rng);
        assert_eq!(outcome, AttemptOutcome::Correct { line_complete: false });
        assert_eq!(san_at(&tree, session.cursor()), "e5");

        let outcome = session.attempt(&tree, &StandardRules, "g1f3", &mut rng);
        assert_eq!(outcome, AttemptOutcome::Correct { line_complete: true });
        assert_eq!(session.phase(), TrainingPhase::LineComplete);
        assert_eq!(
            session.attempt(&tree, &StandardRules, "b1c3", &mut rng),
            AttemptOutcome::Rejected
        );
    }

    #[test]
    fn test_mistake_arms_hint_without_touching_tree() {
        let tree = tree("1. e4 (1. d4)");
        let before = tree.clone();
        let mut rng = StdRng::seed_from_u64(11);
        let mut session =
            TrainingSession::start(&tree, &StandardRules, PieceColor::White, tree.root_id(), &mut rng)
                .unwrap();

        assert_eq!(
            session.attempt(&tree, &StandardRules, "c2c4", &mut rng),
            AttemptOutcome::Mistake
        );
        assert_eq!(tree, before);
        assert!(session.hint_requested());
        assert!(!session.hint_visible());
        let armed = session.hint_move_code().unwrap().to_string();
        assert!(armed == "e2e4" || armed == "d2d4");

        // A second mistake keeps the armed hint.
        session.attempt(&tree, &StandardRules, "g1f3", &mut rng);
        assert_eq!(session.hint_move_code(), Some(armed.as_str()));

        assert_eq!(session.request_hint(&tree, &mut rng), Some(armed.clone()));
        assert!(session.hint_visible());

        session.attempt(&tree, &StandardRules, &armed, &mut rng);
        assert_eq!(session.hint(), &HintState::None);
    }

    #[test]
    fn test_request_hint_without_mistake() {
        let tree = tree("1. e4");
        let mut rng = StdRng::seed_from_u64(0);
        let mut session =
            TrainingSession::start(&tree, &StandardRules, PieceColor::White, tree.root_id(), &mut rng)
                .unwrap();
        assert_eq!(session.request_hint(&tree, &mut rng).as_deref(), Some("e2e4"));
    }

    #[test]
    fn test_start_mid_tree_plays_reply() {
        let tree = tree("1. e4 e5 2. Nf3");
        let e4 = tree.children(tree.root_id())[0].clone();
        let mut rng = StdRng::seed_from_u64(0);
        let session =
            TrainingSession::start(&tree, &StandardRules, PieceColor::White, &e4, &mut rng).unwrap();
        assert_eq!(san_at(&tree, session.cursor()), "e5");
    }

    #[test]
    fn test_continue_redraws_from_root() {
        let tree = tree("1. e4 e5 (1... c5)");
        let mut rng = StdRng::seed_from_u64(5);
        let mut session =
            TrainingSession::start(&tree, &StandardRules, PieceColor::White, tree.root_id(), &mut rng)
                .unwrap();
        session.attempt(&tree, &StandardRules, "e2e4", &mut rng);
        assert_eq!(session.phase(), TrainingPhase::LineComplete);
        session.continue_line(&tree, &StandardRules, &mut rng);
        assert_eq!(session.cursor(), tree.root_id());
        assert_eq!(session.phase(), TrainingPhase::Active);
    }

    #[test]
    fn test_start_on_missing_node() {
        let tree = tree("1. e4");
        let mut rng = StdRng::seed_from_u64(0);
        assert!(
            TrainingSession::start(&tree, &StandardRules, PieceColor::White, "n99", &mut rng)
                .is_none()
        );
    }
}
