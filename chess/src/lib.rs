//! Chess rules for reptty: positions, move codes, SAN and the rules oracle
//! the repertoire engine delegates legality to.

pub mod board_display;
pub mod converters;
pub mod fen;
pub mod rules;
pub mod san;
pub mod types;
pub mod uci;

pub use board_display::{DisplayBoard, DisplayBoardError};
pub use fen::{position_key, resolve, FenError, STARTING_FEN, START_POSITION};
pub use rules::{legal_moves, MoveError, PlayedMove, RulesOracle, StandardRules};
pub use san::{format_san, parse_san, SanError};
pub use types::{PieceColor, PieceKind};
pub use uci::{convert_uci_castling_to_cozy, format_uci_move, move_code, UciError};
