//! PGN import and export for repertoire trees.

mod export;
mod parser;
mod tokenizer;

pub use export::export;
pub use parser::ImportSummary;
pub use tokenizer::{tokenize, Token};

use chess::RulesOracle;

use crate::tree::MoveTree;

/// Parse PGN text (one or many games) into a fresh tree.
pub fn parse<O: RulesOracle>(oracle: &O, text: &str) -> (MoveTree, ImportSummary) {
    let mut tree = MoveTree::new();
    let summary = parse_into(oracle, text, &mut tree);
    (tree, summary)
}

/// Merge every game in `text` into `tree`. Each game starts from the root.
pub fn parse_into<O: RulesOracle>(oracle: &O, text: &str, tree: &mut MoveTree) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for movetext in split_games(text) {
        summary.games += 1;
        parser::parse_movetext(oracle, &movetext, tree, &mut summary);
    }
    tracing::debug!(
        games = summary.games,
        moves = summary.moves_applied,
        added = summary.nodes_added,
        skipped = summary.skipped.len(),
        "Parsed PGN"
    );
    summary
}

/// Split text into the movetext of each game, header lines removed.
///
/// Games start at `[Event` header lines. Text without any event header is
/// split on blank lines instead.
pub fn split_games(text: &str) -> Vec<String> {
    let has_event = text
        .lines()
        .any(|line| line.trim_start().starts_with("[Event "));

    let mut games = Vec::new();
    let mut current = String::new();
    let mut flush = |current: &mut String| {
        if !current.trim().is_empty() {
            games.push(std::mem::take(current));
        }
        current.clear();
    };

    for line in text.lines() {
        let trimmed = line.trim();
        if has_event {
            if trimmed.starts_with("[Event ") {
                flush(&mut current);
            }
        } else if trimmed.is_empty() {
            flush(&mut current);
            continue;
        }
        if is_header(trimmed) || trimmed.starts_with('%') {
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    flush(&mut current);
    games
}

fn is_header(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ROOT_ID;
    use chess::StandardRules;

    const TWO_GAMES: &str = r#"[Event "Ruy"]
[Site "?"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 *

[Event "Italian"]
[Site "?"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 *
"#;

    #[test]
    fn test_split_on_event_headers() {
        let games = split_games(TWO_GAMES);
        assert_eq!(games.len(), 2);
        assert!(games[0].contains("Bb5"));
        assert!(!games[0].contains("Event"));
        assert!(games[1].contains("Bc4"));
    }

    #[test]
    fn test_split_on_blank_lines_without_headers() {
        let games = split_games("1. d4 d5\n\n\n1. c4 e5\n");
        assert_eq!(games, vec!["1. d4 d5\n", "1. c4 e5\n"]);

        let games = split_games("\n1. e4 e5\n2. Nf3\n\n  \n1. d4\n\n");
        assert_eq!(games, vec!["1. e4 e5\n2. Nf3\n", "1. d4\n"]);
    }

    #[test]
    fn test_games_merge_into_one_tree() {
        let (tree, summary) = parse(&StandardRules, TWO_GAMES);
        assert_eq!(summary.games, 2);
        assert_eq!(tree.children(ROOT_ID).len(), 1);
        assert_eq!(tree.leaf_lines().len(), 2);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_parse_into_existing_tree() {
        let (mut tree, _) = parse(&StandardRules, "1. d4");
        let summary = parse_into(&StandardRules, "1. e4 e5", &mut tree);
        assert_eq!(summary.nodes_added, 2);
        assert_eq!(tree.children(ROOT_ID).len(), 2);
    }

    #[test]
    fn test_empty_text() {
        let (tree, summary) = parse(&StandardRules, "  \n\n");
        assert_eq!(summary.games, 0);
        assert!(tree.is_empty());
    }
}
