//! PGN movetext tokenizer.
//!
//! Comments, move numbers, results and annotation glyphs are recognized so
//! the parser can skip them; only moves and parentheses carry structure.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Move(String),
    MoveNumber(u32),
    Result(String),
    Nag(String),
    Open,
    Close,
}

const RESULTS: [&str; 4] = ["*", "1-0", "0-1", "1/2-1/2"];

/// Split movetext into tokens. Braced comments run to the matching `}`,
/// `;` comments to the end of the line; neither produces a token.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '{' => {
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                }
            }
            ';' => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            _ => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '{' | '}' | ';') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                if end == start {
                    // A stray closing brace; drop it.
                    chars.next();
                    continue;
                }
                classify(&text[start..end], &mut tokens);
            }
        }
    }
    tokens
}

fn classify(word: &str, tokens: &mut Vec<Token>) {
    if RESULTS.contains(&word) {
        tokens.push(Token::Result(word.to_string()));
        return;
    }
    if word.starts_with('$') || word.chars().all(|c| matches!(c, '!' | '?')) {
        tokens.push(Token::Nag(word.to_string()));
        return;
    }

    // "12." / "12..." / "12" / "12.Nf3". Castling written with zeros
    // ("0-0") is a move, not a number.
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let rest = &word[digits..];
        let number = word[..digits].parse().unwrap_or(0);
        if rest.is_empty() {
            tokens.push(Token::MoveNumber(number));
            return;
        }
        if rest.starts_with('.') {
            tokens.push(Token::MoveNumber(number));
            let san = rest.trim_start_matches('.');
            if !san.is_empty() {
                classify(san, tokens);
            }
            return;
        }
    }

    tokens.push(Token::Move(word.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> Token {
        Token::Move(s.to_string())
    }

    #[test]
    fn test_basic_movetext() {
        let tokens = tokenize("1. e4 e5 2. Nf3 *");
        assert_eq!(
            tokens,
            vec![
                Token::MoveNumber(1),
                mv("e4"),
                mv("e5"),
                Token::MoveNumber(2),
                mv("Nf3"),
                Token::Result("*".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = tokenize("1. e4 {best by test (really)} e5 ; rest of line ( ignored\n2. Nf3");
        assert_eq!(
            tokens,
            vec![
                Token::MoveNumber(1),
                mv("e4"),
                mv("e5"),
                Token::MoveNumber(2),
                mv("Nf3"),
            ]
        );
    }

    #[test]
    fn test_variations_and_continuations() {
        let tokens = tokenize("2. Nf3 (2.Bc4 Bc5) 2... Nc6");
        assert_eq!(
            tokens,
            vec![
                Token::MoveNumber(2),
                mv("Nf3"),
                Token::Open,
                Token::MoveNumber(2),
                mv("Bc4"),
                mv("Bc5"),
                Token::Close,
                Token::MoveNumber(2),
                mv("Nc6"),
            ]
        );
    }

    #[test]
    fn test_castling_with_zeros_is_a_move() {
        assert_eq!(tokenize("0-0 0-0-0"), vec![mv("0-0"), mv("0-0-0")]);
        assert_eq!(
            tokenize("0-1"),
            vec![Token::Result("0-1".to_string())]
        );
    }

    #[test]
    fn test_annotation_glyphs() {
        let tokens = tokenize("e4 $1 !? 1/2-1/2");
        assert_eq!(
            tokens,
            vec![
                mv("e4"),
                Token::Nag("$1".to_string()),
                Token::Nag("!?".to_string()),
                Token::Result("1/2-1/2".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_comment_swallows_rest() {
        assert_eq!(tokenize("e4 { never closed e5"), vec![mv("e4")]);
    }
}
