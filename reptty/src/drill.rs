//! Interactive training on a line-based input stream.

use std::io::Write;

use chess::{PieceColor, RulesOracle};
use repertoire::{resolve_line, AttemptOutcome, PlayOutcome, TrainingPhase, Workspace};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::commands::{format_line, render_board};
use crate::CliError;

const HELP: &str = "Enter a move (SAN or code), 'hint', 'next', 'help' or 'quit'.";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrillSummary {
    pub correct: u32,
    pub mistakes: u32,
    pub lines: u32,
}

/// Drill the active repertoire of `side` from its start position until the
/// input ends or the trainee quits.
pub async fn run<O, R, W>(ws: &mut Workspace<O>, side: PieceColor, input: R, out: &mut W) -> Result<DrillSummary, CliError>
where
    O: RulesOracle,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let has_moves = ws.active_entry(side).is_some_and(|e| !e.tree.is_empty());
    if !has_moves {
        return Err(CliError::Refused(format!("No {side} moves to drill")));
    }
    ws.to_root(side);
    if !ws.start_training(side, None) {
        return Err(CliError::Refused(
            ws.status().unwrap_or("Training could not start").to_string(),
        ));
    }

    let mut summary = DrillSummary::default();
    let mut lines = input.lines();
    writeln!(out, "{HELP}")?;
    show(ws, side, out)?;

    while let Some(raw) = lines.next_line().await? {
        let command = raw.trim();
        match command {
            "" => continue,
            "q" | "quit" => break,
            "help" | "?" => writeln!(out, "{HELP}")?,
            "h" | "hint" => match ws.request_hint(side) {
                Some(code) => {
                    let san = ws
                        .oracle()
                        .try_move(&ws.current_position(side), &code)
                        .map(|p| p.san)
                        .unwrap_or(code);
                    writeln!(out, "Hint: {san}")?;
                }
                None => writeln!(out, "No hint here")?,
            },
            "n" | "next" => {
                ws.continue_training(side);
                show(ws, side, out)?;
            }
            mv => {
                let position = ws.current_position(side);
                let Ok(played) = resolve_line(ws.oracle(), &position, &[mv]) else {
                    writeln!(out, "{mv} is not a legal move here")?;
                    continue;
                };
                let Some(code) = played.first().map(|p| p.code.clone()) else {
                    continue;
                };
                match ws.play(side, &code) {
                    PlayOutcome::Training(AttemptOutcome::Correct { line_complete }) => {
                        summary.correct += 1;
                        if line_complete {
                            summary.lines += 1;
                            writeln!(out, "Correct. Line complete, 'next' for another.")?;
                        } else {
                            writeln!(out, "Correct.")?;
                        }
                        show(ws, side, out)?;
                    }
                    PlayOutcome::Training(AttemptOutcome::Mistake) => {
                        summary.mistakes += 1;
                        writeln!(out, "{mv} is not in the repertoire. Try again or ask for a hint.")?;
                    }
                    _ => writeln!(out, "{}", ws.status().unwrap_or("Nothing to play here"))?,
                }
            }
        }
    }

    ws.stop_training(side);
    tracing::info!(
        side = %side,
        correct = summary.correct,
        mistakes = summary.mistakes,
        lines = summary.lines,
        "Drill finished"
    );
    writeln!(
        out,
        "{} correct, {} mistakes, {} line(s) completed",
        summary.correct, summary.mistakes, summary.lines
    )?;
    Ok(summary)
}

fn show<O: RulesOracle, W: Write>(ws: &Workspace<O>, side: PieceColor, out: &mut W) -> Result<(), CliError> {
    // The board only: listing continuations would give the answer away.
    write!(out, "{}", render_board(ws, side)?)?;
    let line = ws.current_line(side);
    if !line.is_empty() {
        writeln!(out, "{}", format_line(&line))?;
    }
    if ws.training(side).map(|s| s.phase()) == Some(TrainingPhase::LineComplete) {
        writeln!(out, "End of line.")?;
    } else {
        writeln!(out, "Your move as {side}:")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::StandardRules;
    use repertoire::Collection;

    fn workspace(pgn: &str) -> Workspace {
        let mut ws = Workspace::new(StandardRules, Collection::default()).with_seed(7);
        ws.import_pgn(PieceColor::White, pgn).unwrap();
        ws.import_pgn(PieceColor::Black, pgn).unwrap();
        ws
    }

    async fn drill(ws: &mut Workspace, side: PieceColor, input: &str) -> (DrillSummary, String) {
        let mut out = Vec::new();
        let summary = run(ws, side, input.as_bytes(), &mut out).await.unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_drill_single_line_as_white() {
        let mut ws = workspace("1. e4 e5 2. Nf3 Nc6");
        let (summary, out) = drill(&mut ws, PieceColor::White, "e4\nNf3\nquit\n").await;
        assert_eq!(
            summary,
            DrillSummary {
                correct: 2,
                mistakes: 0,
                lines: 1
            }
        );
        assert!(out.contains("Line complete"));
        assert!(ws.training(PieceColor::White).is_none());
    }

    #[tokio::test]
    async fn test_drill_counts_mistakes_and_hints() {
        let mut ws = workspace("1. e4 e5 2. Nf3 Nc6");
        let (summary, out) = drill(&mut ws, PieceColor::White, "d4\nhint\ne2e4\n").await;
        assert_eq!(summary.mistakes, 1);
        assert_eq!(summary.correct, 1);
        assert!(out.contains("Hint: e4"));
    }

    #[tokio::test]
    async fn test_drill_as_black_waits_for_reply() {
        let mut ws = workspace("1. e4 e5 2. Nf3 Nc6");
        let (summary, out) = drill(&mut ws, PieceColor::Black, "e5\nNc6\n").await;
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.lines, 1);
        assert!(out.contains("1. e4"));
    }

    #[tokio::test]
    async fn test_drill_rejects_illegal_input() {
        let mut ws = workspace("1. e4 e5");
        let (summary, out) = drill(&mut ws, PieceColor::White, "Ke2\n").await;
        assert_eq!(summary, DrillSummary::default());
        assert!(out.contains("Ke2 is not a legal move here"));
    }

    #[tokio::test]
    async fn test_drill_refuses_empty_repertoire() {
        let mut ws = Workspace::new(StandardRules, Collection::default());
        let mut out = Vec::new();
        let err = run(&mut ws, PieceColor::White, "".as_bytes(), &mut out).await.unwrap_err();
        assert!(matches!(err, CliError::Refused(_)));
    }
}
