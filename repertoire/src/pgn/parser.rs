//! Variation parser.
//!
//! Moves are resolved through the rules oracle from the position of the tree
//! cursor and merged into the tree with find-or-create semantics, so
//! importing the same text twice leaves the tree unchanged and several games
//! merge into one tree.

use chess::RulesOracle;

use super::tokenizer::{tokenize, Token};
use crate::tree::MoveTree;

/// What an import did to the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub games: usize,
    pub moves_applied: usize,
    pub nodes_added: usize,
    /// One entry per branch abandoned at an unplayable move.
    pub skipped: Vec<String>,
}

impl ImportSummary {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

struct VariationParser<'a, O> {
    oracle: &'a O,
    tree: &'a mut MoveTree,
    tokens: Vec<Token>,
    pos: usize,
    summary: &'a mut ImportSummary,
}

/// One open line: where the next move is played from, and the node the
/// last move was played from, where a variation opened now would branch.
struct Frame {
    cursor: String,
    anchor: String,
}

impl<O: RulesOracle> VariationParser<'_, O> {
    fn frame_at(&self, cursor: String) -> Frame {
        let anchor = self
            .tree
            .node(&cursor)
            .and_then(|n| n.parent_id.clone())
            .unwrap_or_else(|| cursor.clone());
        Frame { cursor, anchor }
    }

    /// Parse one line starting at `start` until its unmatched close
    /// parenthesis or the end of the tokens. Open variations are kept on
    /// an explicit stack rather than the call stack.
    fn parse_line(&mut self, start: String) {
        let mut frames = vec![self.frame_at(start)];

        while let Some(token) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            let Some(frame) = frames.last_mut() else {
                return;
            };
            match token {
                Token::Close => {
                    frames.pop();
                }
                Token::Open => {
                    let branch = self.frame_at(frame.anchor.clone());
                    frames.push(branch);
                }
                Token::Move(san) => {
                    let cursor = frame.cursor.clone();
                    match self.apply(&cursor, &san) {
                        Some(child) => {
                            if let Some(frame) = frames.last_mut() {
                                frame.anchor = std::mem::replace(&mut frame.cursor, child);
                            }
                        }
                        None => {
                            self.skip_branch();
                            frames.pop();
                        }
                    }
                }
                Token::MoveNumber(_) | Token::Result(_) | Token::Nag(_) => {}
            }
            if frames.is_empty() {
                return;
            }
        }
    }

    fn apply(&mut self, cursor: &str, san: &str) -> Option<String> {
        let position = self.tree.node(cursor)?.position.clone();
        let played = match self.oracle.try_san(&position, san) {
            Ok(played) => played,
            Err(san_err) => match self.oracle.try_move(&position, san) {
                Ok(played) => played,
                Err(_) => {
                    tracing::debug!(%san, error = %san_err, "Stopping branch at unplayable move");
                    self.summary.skipped.push(format!("{san}: {san_err}"));
                    return None;
                }
            },
        };
        match self.tree.add_child(cursor, &played) {
            Ok((id, created)) => {
                self.summary.moves_applied += 1;
                if created {
                    self.summary.nodes_added += 1;
                }
                Some(id)
            }
            Err(e) => {
                self.summary.skipped.push(format!("{san}: {e}"));
                None
            }
        }
    }

    /// Consume the remainder of the current branch, nested variations
    /// included, up to and including its closing parenthesis.
    fn skip_branch(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.tokens.get(self.pos) {
            self.pos += 1;
            match token {
                Token::Open => depth += 1,
                Token::Close if depth == 0 => return,
                Token::Close => depth -= 1,
                _ => {}
            }
        }
    }
}

/// Parse the movetext of one game into `tree`, starting at its root.
pub(crate) fn parse_movetext<O: RulesOracle>(
    oracle: &O,
    movetext: &str,
    tree: &mut MoveTree,
    summary: &mut ImportSummary,
) {
    let root = tree.root_id().to_string();
    let mut parser = VariationParser {
        oracle,
        tree,
        tokens: tokenize(movetext),
        pos: 0,
        summary,
    };
    // Unbalanced close parentheses at top level end a line early; keep
    // reading so the rest of the game still counts.
    while parser.pos < parser.tokens.len() {
        parser.parse_line(root.clone());
    }
}
