//! FEN helpers and the position values stored in repertoire trees.
//!
//! A position is a FEN string, except at the root of a tree where the
//! sentinel [`START_POSITION`] stands in for the standard initial setup.
//! [`resolve`] turns a stored position into a real FEN at the point of use.

use cozy_chess::Board;

/// Sentinel stored on tree roots instead of the literal starting FEN.
pub const START_POSITION: &str = "start";

/// FEN of the standard initial position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Resolve a stored position to a FEN string.
pub fn resolve(position: &str) -> &str {
    if position == START_POSITION {
        STARTING_FEN
    } else {
        position
    }
}

/// Parse a stored position (FEN or the start sentinel) into a Board.
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fen = resolve(fen.trim());
    if fen.split_whitespace().count() < 4 {
        return Err(FenError::InvalidFormat);
    }
    fen.parse().map_err(|_| FenError::InvalidBoardLayout)
}

/// Format a Board as a FEN string.
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

/// Comparison key for a position: placement, side to move, castling rights
/// and en-passant square. Move counters are dropped so that transpositions
/// reached at different move numbers compare equal.
///
/// Stored positions are written by [`format_fen`], so the key is taken from
/// the text without re-parsing.
pub fn position_key(position: &str) -> String {
    resolve(position.trim())
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format")]
    InvalidFormat,
    #[error("Invalid board layout")]
    InvalidBoardLayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_start_sentinel() {
        assert_eq!(resolve(START_POSITION), STARTING_FEN);
        assert_eq!(resolve("8/8/8/8/8/8/8/8 w - - 0 1"), "8/8/8/8/8/8/8/8 w - - 0 1");
    }

    #[test]
    fn test_parse_start_sentinel() {
        let board = parse_fen(START_POSITION).unwrap();
        assert_eq!(board, Board::default());
    }

    #[test]
    fn test_parse_rejects_truncated_fen() {
        assert!(matches!(parse_fen("8/8/8 w"), Err(FenError::InvalidFormat)));
        assert!(parse_fen("not a real fen at all").is_err());
    }

    #[test]
    fn test_position_key_ignores_move_counters() {
        let a = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let b = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 4 9";
        assert_eq!(position_key(a), position_key(b));
    }

    #[test]
    fn test_position_key_of_start_matches_default_board() {
        assert_eq!(
            position_key(START_POSITION),
            position_key(&format_fen(&Board::default()))
        );
    }
}
