//! Conversions between cozy-chess types and their algebraic text forms.

use cozy_chess::{Color, File, Piece, Rank, Square};

/// Parse a square string like "e2".
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = parse_file(chars.next()?)?;
    let rank = parse_rank(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    Some(Square::new(file, rank))
}

/// Parse a file character like 'e'. Only lowercase is accepted, since an
/// uppercase 'B' in SAN names a bishop.
pub fn parse_file(c: char) -> Option<File> {
    match c {
        'a' => Some(File::A),
        'b' => Some(File::B),
        'c' => Some(File::C),
        'd' => Some(File::D),
        'e' => Some(File::E),
        'f' => Some(File::F),
        'g' => Some(File::G),
        'h' => Some(File::H),
        _ => None,
    }
}

/// Parse a rank character like '2'.
pub fn parse_rank(c: char) -> Option<Rank> {
    match c {
        '1' => Some(Rank::First),
        '2' => Some(Rank::Second),
        '3' => Some(Rank::Third),
        '4' => Some(Rank::Fourth),
        '5' => Some(Rank::Fifth),
        '6' => Some(Rank::Sixth),
        '7' => Some(Rank::Seventh),
        '8' => Some(Rank::Eighth),
        _ => None,
    }
}

/// Format a square as "e2".
pub fn format_square(sq: Square) -> String {
    format!("{}{}", format_file(sq.file()), format_rank(sq.rank()))
}

pub fn format_file(f: File) -> char {
    match f {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    }
}

pub fn format_rank(r: Rank) -> char {
    match r {
        Rank::First => '1',
        Rank::Second => '2',
        Rank::Third => '3',
        Rank::Fourth => '4',
        Rank::Fifth => '5',
        Rank::Sixth => '6',
        Rank::Seventh => '7',
        Rank::Eighth => '8',
    }
}

/// Parse a side name ("white" / "black", any case).
pub fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "white" | "w" => Some(Color::White),
        "black" | "b" => Some(Color::Black),
        _ => None,
    }
}

/// Lowercase piece letter, as used in move codes ("e7e8q").
pub fn format_piece(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

/// Uppercase piece letter, as used in SAN ("Nf3", "e8=Q").
pub fn format_piece_upper(piece: Piece) -> char {
    format_piece(piece).to_ascii_uppercase()
}

pub fn parse_piece(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'p' => Some(Piece::Pawn),
        'n' => Some(Piece::Knight),
        'b' => Some(Piece::Bishop),
        'r' => Some(Piece::Rook),
        'q' => Some(Piece::Queen),
        'k' => Some(Piece::King),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_square() {
        let sq = parse_square("e2").unwrap();
        assert_eq!(sq.file(), File::E);
        assert_eq!(sq.rank(), Rank::Second);
    }

    #[test]
    fn test_parse_square_rejects_garbage() {
        assert_eq!(parse_square("e"), None);
        assert_eq!(parse_square("e22"), None);
        assert_eq!(parse_square("i1"), None);
        assert_eq!(parse_square("E2"), None);
    }

    #[test]
    fn test_format_square() {
        assert_eq!(format_square(Square::new(File::E, Rank::Fourth)), "e4");
        assert_eq!(format_square(Square::new(File::H, Rank::Eighth)), "h8");
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("white"), Some(Color::White));
        assert_eq!(parse_color("Black"), Some(Color::Black));
        assert_eq!(parse_color("invalid"), None);
    }

    #[test]
    fn test_piece_letters() {
        assert_eq!(format_piece(Piece::Queen), 'q');
        assert_eq!(format_piece_upper(Piece::Knight), 'N');
        assert_eq!(parse_piece('R'), Some(Piece::Rook));
        assert_eq!(parse_piece('x'), None);
    }
}
