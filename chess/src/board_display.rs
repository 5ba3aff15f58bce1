//! Plain-text board rendering for the terminal.

use crate::types::{PieceColor, PieceKind};

/// An 8x8 board for display purposes only.
#[derive(Debug, Clone, Default)]
pub struct DisplayBoard {
    squares: [[Option<(PieceKind, PieceColor)>; 8]; 8],
}

impl DisplayBoard {
    /// Parse the piece placement of a stored position (FEN or start sentinel).
    pub fn from_fen(fen: &str) -> Result<Self, DisplayBoardError> {
        let placement = crate::fen::resolve(fen)
            .split_whitespace()
            .next()
            .ok_or(DisplayBoardError::InvalidFen)?;

        let mut squares = [[None; 8]; 8];
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(DisplayBoardError::InvalidFen);
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if file > 7 {
                    return Err(DisplayBoardError::InvalidFen);
                }
                let color = if c.is_uppercase() {
                    PieceColor::White
                } else {
                    PieceColor::Black
                };
                let kind = PieceKind::from_char(c).ok_or(DisplayBoardError::InvalidPiece(c))?;
                squares[rank][file] = Some((kind, color));
                file += 1;
            }
        }

        Ok(DisplayBoard { squares })
    }

    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PieceColor)> {
        if file > 7 || rank > 7 {
            return None;
        }
        self.squares[rank as usize][file as usize]
    }

    /// Render as text with `orientation` at the bottom, highlighting the
    /// squares of `last_move` (a move code) with brackets.
    pub fn render(&self, orientation: PieceColor, last_move: Option<&str>) -> String {
        let marked: Vec<(u8, u8)> = last_move
            .map(|code| {
                let b = code.as_bytes();
                let mut squares = Vec::new();
                for pair in [b.get(0..2), b.get(2..4)].into_iter().flatten() {
                    if pair[0].is_ascii_lowercase() && pair[1].is_ascii_digit() {
                        squares.push((pair[0].wrapping_sub(b'a'), pair[1].wrapping_sub(b'1')));
                    }
                }
                squares
            })
            .unwrap_or_default();

        let (ranks, files): (Vec<u8>, Vec<u8>) = match orientation {
            PieceColor::White => ((0..8).rev().collect(), (0..8).collect()),
            PieceColor::Black => ((0..8).collect(), (0..8).rev().collect()),
        };

        let mut out = String::new();
        for &rank in &ranks {
            out.push_str(&format!("{} ", rank + 1));
            for &file in &files {
                let glyph = match self.piece_at(file, rank) {
                    Some((kind, color)) => kind.to_char(color),
                    None => '.',
                };
                if marked.contains(&(file, rank)) {
                    out.push_str(&format!("[{glyph}]"));
                } else {
                    out.push_str(&format!(" {glyph} "));
                }
            }
            out.push('\n');
        }
        out.push_str("  ");
        for &file in &files {
            out.push_str(&format!(" {} ", (b'a' + file) as char));
        }
        out.push('\n');
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayBoardError {
    #[error("Invalid FEN string")]
    InvalidFen,
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
}
