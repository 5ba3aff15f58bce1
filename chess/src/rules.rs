//! The rules oracle: the only place move legality is decided.
//!
//! Repertoire code treats positions as opaque comparable strings and asks a
//! [`RulesOracle`] to turn (position, move) into the resulting position and
//! its notation. [`StandardRules`] answers with cozy-chess.

use std::collections::BTreeMap;

use cozy_chess::{Board, Move};

use crate::converters::format_square;
use crate::fen::{format_fen, parse_fen, FenError};
use crate::san::{format_san, parse_san, SanError};
use crate::types::PieceColor;
use crate::uci::{move_code, resolve_move_code, UciError};

/// A move accepted by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    /// Standard algebraic notation, e.g. "Nf3".
    pub san: String,
    /// Move code, e.g. "g1f3", "e7e8q", "e1g1".
    pub code: String,
    /// FEN of the position after the move.
    pub position: String,
}

pub trait RulesOracle {
    /// Play a move given by its code from `position`.
    fn try_move(&self, position: &str, code: &str) -> Result<PlayedMove, MoveError>;

    /// Play a move given in SAN from `position`.
    fn try_san(&self, position: &str, san: &str) -> Result<PlayedMove, MoveError>;

    /// Legal destination squares keyed by origin square.
    fn legal_destinations(&self, position: &str) -> Result<BTreeMap<String, Vec<String>>, MoveError>;

    fn side_to_move(&self, position: &str) -> Result<PieceColor, MoveError>;
}

/// Standard chess rules backed by cozy-chess.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    fn play(board: &Board, mv: Move) -> Result<PlayedMove, MoveError> {
        if !board.is_legal(mv) {
            return Err(MoveError::Illegal(crate::uci::format_uci_move(mv)));
        }
        let san = format_san(board, mv);
        let code = move_code(board, mv);
        let mut after = board.clone();
        after.play_unchecked(mv);
        Ok(PlayedMove {
            san,
            code,
            position: format_fen(&after),
        })
    }
}

impl RulesOracle for StandardRules {
    fn try_move(&self, position: &str, code: &str) -> Result<PlayedMove, MoveError> {
        let board = parse_fen(position)?;
        let mv = resolve_move_code(&board, code)?;
        Self::play(&board, mv)
    }

    fn try_san(&self, position: &str, san: &str) -> Result<PlayedMove, MoveError> {
        let board = parse_fen(position)?;
        let mv = parse_san(&board, san)?;
        Self::play(&board, mv)
    }

    fn legal_destinations(&self, position: &str) -> Result<BTreeMap<String, Vec<String>>, MoveError> {
        let board = parse_fen(position)?;
        let mut dests: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for mv in legal_moves(&board) {
            let code = move_code(&board, mv);
            let to = code[2..4].to_string();
            let from = dests.entry(format_square(mv.from)).or_default();
            if !from.contains(&to) {
                from.push(to);
            }
        }
        Ok(dests)
    }

    fn side_to_move(&self, position: &str) -> Result<PieceColor, MoveError> {
        Ok(parse_fen(position)?.side_to_move().into())
    }
}

/// All legal moves from `board`, castling in cozy-chess encoding.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("Illegal move: {0}")]
    Illegal(String),
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error(transparent)]
    San(#[from] SanError),
    #[error(transparent)]
    Uci(#[from] UciError),
}
