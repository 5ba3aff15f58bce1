//! Move codes: UCI coordinate notation ("e2e4", "e7e8q").
//!
//! cozy-chess encodes castling as king-takes-own-rook (e1h1). Move codes
//! stored in repertoires and reported by the board view use the standard
//! king-two-squares form (e1g1), so every conversion goes through the board.

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::converters::{format_piece, format_square, parse_piece, parse_square};

/// Convert a UCI castling move (e1g1) to the cozy-chess form (e1h1).
///
/// Only a king standing on its home square is converted, and only when the
/// converted move is legal; anything else is returned unchanged.
pub fn convert_uci_castling_to_cozy(board: &Board, mv: Move) -> Move {
    if board.piece_on(mv.from) != Some(Piece::King) || mv.promotion.is_some() {
        return mv;
    }
    let home_rank = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    if !home_rank || mv.from.file() != File::E || mv.to.rank() != mv.from.rank() {
        return mv;
    }

    let rook_file = match mv.to.file() {
        File::G => File::H,
        File::C => File::A,
        _ => return mv,
    };
    let converted = Move {
        from: mv.from,
        to: Square::new(rook_file, mv.from.rank()),
        promotion: None,
    };

    if board.is_legal(converted) {
        converted
    } else {
        mv
    }
}

/// Whether `mv` is a castling move in cozy-chess encoding.
pub fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to).is_some()
        && board.color_on(mv.to) == board.color_on(mv.from)
}

/// Format a move in raw UCI notation, without castling conversion.
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

/// The move code of a legal move played from `board`.
pub fn move_code(board: &Board, mv: Move) -> String {
    if is_castling(board, mv) {
        let file = if mv.to.file() as u8 > mv.from.file() as u8 {
            File::G
        } else {
            File::C
        };
        return format_uci_move(Move {
            from: mv.from,
            to: Square::new(file, mv.from.rank()),
            promotion: None,
        });
    }
    format_uci_move(mv)
}

/// Parse a UCI move string (e2e4, e7e8q). Legality is not checked.
pub fn parse_uci_move(s: &str) -> Result<Move, UciError> {
    let s = s.trim();
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(UciError::InvalidMove(s.to_string()));
    }

    let from = parse_square(&s[0..2]).ok_or_else(|| UciError::InvalidSquare(s[0..2].to_string()))?;
    let to = parse_square(&s[2..4]).ok_or_else(|| UciError::InvalidSquare(s[2..4].to_string()))?;

    let promotion = match s[4..].chars().next() {
        None => None,
        Some(c) => match parse_piece(c) {
            Some(p @ (Piece::Queen | Piece::Rook | Piece::Bishop | Piece::Knight)) => Some(p),
            _ => return Err(UciError::InvalidPromotion(s.to_string())),
        },
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Resolve a move code against a board into the cozy-chess move it names.
pub fn resolve_move_code(board: &Board, code: &str) -> Result<Move, UciError> {
    let mv = parse_uci_move(code)?;
    Ok(convert_uci_castling_to_cozy(board, mv))
}

#[derive(Debug, thiserror::Error)]
pub enum UciError {
    #[error("Invalid move: {0}")]
    InvalidMove(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;

    const CASTLE_READY: &str = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn test_format_uci_move() {
        let mv = Move {
            from: Square::new(File::E, Rank::Second),
            to: Square::new(File::E, Rank::Fourth),
            promotion: None,
        };
        assert_eq!(format_uci_move(mv), "e2e4");
    }

    #[test]
    fn test_format_uci_move_with_promotion() {
        let mv = Move {
            from: Square::new(File::E, Rank::Seventh),
            to: Square::new(File::E, Rank::Eighth),
            promotion: Some(Piece::Queen),
        };
        assert_eq!(format_uci_move(mv), "e7e8q");
    }

    #[test]
    fn test_parse_uci_move_rejects_bad_input() {
        assert!(parse_uci_move("e2").is_err());
        assert!(parse_uci_move("z2e4").is_err());
        assert!(matches!(
            parse_uci_move("e7e8k"),
            Err(UciError::InvalidPromotion(_))
        ));
    }

    #[test]
    fn test_castling_code_round_trip() {
        let board = parse_fen(CASTLE_READY).unwrap();
        let mv = resolve_move_code(&board, "e1g1").unwrap();
        assert_eq!(mv.to, Square::new(File::H, Rank::First));
        assert!(is_castling(&board, mv));
        assert_eq!(move_code(&board, mv), "e1g1");

        let long = resolve_move_code(&board, "e1c1").unwrap();
        assert_eq!(long.to, Square::new(File::A, Rank::First));
        assert_eq!(move_code(&board, long), "e1c1");
    }

    #[test]
    fn test_rook_move_is_not_converted() {
        // Rook on e1, king elsewhere: e1g1 is a plain rook move.
        let board = parse_fen("k7/8/8/8/8/8/8/K3R3 w - - 0 1").unwrap();
        let mv = resolve_move_code(&board, "e1g1").unwrap();
        assert_eq!(mv.to, Square::new(File::G, Rank::First));
        assert_eq!(move_code(&board, mv), "e1g1");
    }
}
