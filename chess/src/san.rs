//! Standard Algebraic Notation: formatting legal moves and resolving SAN
//! text back to moves.

use cozy_chess::{Board, GameStatus, Move, Piece, Square};

use crate::converters::{
    format_file, format_piece_upper, format_rank, format_square, parse_file, parse_rank,
    parse_square,
};
use crate::rules::legal_moves;
use crate::uci::{format_uci_move, is_castling};

/// Format a legal move as SAN, including the check or mate suffix.
pub fn format_san(board: &Board, mv: Move) -> String {
    let Some(piece) = board.piece_on(mv.from) else {
        return format_uci_move(mv);
    };

    let mut san = String::new();
    if is_castling(board, mv) {
        san.push_str(if mv.to.file() as u8 > mv.from.file() as u8 {
            "O-O"
        } else {
            "O-O-O"
        });
    } else {
        let capture = board.color_on(mv.to).is_some()
            || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

        if piece == Piece::Pawn {
            if capture {
                san.push(format_file(mv.from.file()));
            }
        } else {
            san.push(format_piece_upper(piece));
            san.push_str(&disambiguation(board, mv, piece));
        }

        if capture {
            san.push('x');
        }
        san.push_str(&format_square(mv.to));

        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(format_piece_upper(promo));
        }
    }

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if after.status() == GameStatus::Won {
            '#'
        } else {
            '+'
        });
    }

    san
}

/// Minimal origin hint needed to tell `mv` apart from other moves of the
/// same piece type to the same square: file, else rank, else both.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Square> = legal_moves(board)
        .into_iter()
        .filter(|m| m.to == mv.to && m.from != mv.from && board.piece_on(m.from) == Some(piece))
        .map(|m| m.from)
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
        format_file(mv.from.file()).to_string()
    } else if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
        format_rank(mv.from.rank()).to_string()
    } else {
        format_square(mv.from)
    }
}

/// Resolve a SAN move against `board`.
///
/// Accepts check/mate and annotation suffixes (`+ # ! ?`), "e.p.", castling
/// written with letter O or digit zero, and over-disambiguated origins.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let trimmed = san
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    let trimmed = trimmed.strip_suffix("e.p.").unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let moves = legal_moves(board);

    if let Some(kingside) = castle_side(trimmed) {
        return moves
            .into_iter()
            .find(|&mv| {
                is_castling(board, mv) && (mv.to.file() as u8 > mv.from.file() as u8) == kingside
            })
            .ok_or_else(|| SanError::NoLegalMove(san.to_string()));
    }

    let pattern = SanPattern::parse(trimmed).map_err(|e| match e {
        SanError::InvalidFormat(_) => SanError::InvalidFormat(san.to_string()),
        other => other,
    })?;

    let mut candidates = moves.into_iter().filter(|&mv| pattern.matches(board, mv));
    let first = candidates
        .next()
        .ok_or_else(|| SanError::NoLegalMove(san.to_string()))?;
    if candidates.next().is_some() {
        return Err(SanError::AmbiguousMove(san.to_string()));
    }
    Ok(first)
}

/// `Some(true)` for kingside castling text, `Some(false)` for queenside.
fn castle_side(text: &str) -> Option<bool> {
    match text {
        "O-O" | "0-0" => Some(true),
        "O-O-O" | "0-0-0" => Some(false),
        _ => None,
    }
}

/// The constraints a SAN token places on a move.
#[derive(Debug)]
struct SanPattern {
    piece: Piece,
    from_file: Option<cozy_chess::File>,
    from_rank: Option<cozy_chess::Rank>,
    to: Square,
    promotion: Option<Piece>,
}

impl SanPattern {
    fn parse(text: &str) -> Result<Self, SanError> {
        let mut chars = text.chars();
        let piece = match text.chars().next() {
            Some('N') => Piece::Knight,
            Some('B') => Piece::Bishop,
            Some('R') => Piece::Rook,
            Some('Q') => Piece::Queen,
            Some('K') => Piece::King,
            _ => Piece::Pawn,
        };
        if piece != Piece::Pawn {
            chars.next();
        }
        let rest: String = chars.collect();

        let (body, promotion) = split_promotion(&rest, piece)?;
        let body: Vec<char> = body
            .chars()
            .filter(|c| !matches!(c, 'x' | ':' | '-'))
            .collect();
        if body.len() < 2 {
            return Err(SanError::InvalidFormat(text.to_string()));
        }

        let dest: String = body[body.len() - 2..].iter().collect();
        let to = parse_square(&dest).ok_or(SanError::InvalidSquare(dest))?;

        let mut from_file = None;
        let mut from_rank = None;
        for &c in &body[..body.len() - 2] {
            if let Some(file) = parse_file(c) {
                from_file = Some(file);
            } else if let Some(rank) = parse_rank(c) {
                from_rank = Some(rank);
            } else {
                return Err(SanError::InvalidFormat(text.to_string()));
            }
        }

        Ok(Self {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        })
    }

    fn matches(&self, board: &Board, mv: Move) -> bool {
        board.piece_on(mv.from) == Some(self.piece)
            && !is_castling(board, mv)
            && mv.to == self.to
            && mv.promotion == self.promotion
            && self.from_file.is_none_or(|f| mv.from.file() == f)
            && self.from_rank.is_none_or(|r| mv.from.rank() == r)
    }
}

fn split_promotion(rest: &str, piece: Piece) -> Result<(&str, Option<Piece>), SanError> {
    let promo_piece = |c: char| match c {
        'Q' => Some(Piece::Queen),
        'R' => Some(Piece::Rook),
        'B' => Some(Piece::Bishop),
        'N' => Some(Piece::Knight),
        _ => None,
    };

    if let Some((body, promo)) = rest.split_once('=') {
        let mut promo_chars = promo.chars();
        return match (promo_chars.next().and_then(promo_piece), promo_chars.next()) {
            (Some(p), None) if piece == Piece::Pawn => Ok((body, Some(p))),
            _ => Err(SanError::InvalidPromotion(promo.to_string())),
        };
    }

    if piece == Piece::Pawn {
        if let Some(last) = rest.chars().last() {
            if let Some(p) = promo_piece(last) {
                return Ok((&rest[..rest.len() - 1], Some(p)));
            }
        }
    }

    Ok((rest, None))
}

#[derive(Debug, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}
