use chess::{fen, format_san, legal_moves, move_code, parse_san, RulesOracle, StandardRules};
use cozy_chess::Board;
use proptest::prelude::*;

proptest! {
    /// Along random games, every legal move survives SAN and move-code
    /// round trips, and the oracle agrees with both.
    #[test]
    fn san_and_code_round_trip_along_random_games(picks in prop::collection::vec(any::<u16>(), 0..60)) {
        let mut board = Board::default();
        for pick in picks {
            let moves = legal_moves(&board);
            if moves.is_empty() {
                break;
            }
            for &mv in &moves {
                let san = format_san(&board, mv);
                prop_assert_eq!(parse_san(&board, &san).unwrap(), mv);
            }

            let mv = moves[pick as usize % moves.len()];
            let position = fen::format_fen(&board);
            let san = format_san(&board, mv);
            let code = move_code(&board, mv);
            let by_code = StandardRules.try_move(&position, &code).unwrap();
            let by_san = StandardRules.try_san(&position, &san).unwrap();
            prop_assert_eq!(&by_code, &by_san);
            prop_assert_eq!(by_code.san, san);

            board.play_unchecked(mv);
            prop_assert_eq!(fen::format_fen(&board), by_san.position);
        }
    }
}
