//! Chess rules for the board client.
//!
//! Wraps cozy-chess behind project-owned types so the rest of the
//! workspace only ever sees FEN strings, [`MoveInput`]s and outcomes.

pub mod analysis;
pub mod board_display;
pub mod converters;
pub mod fen;
pub mod game;
pub mod types;
pub mod uci;

pub use analysis::AnalysisScore;
pub use board_display::DisplayBoard;
pub use converters::{format_piece, format_square, parse_square};
pub use fen::{FenError, STARTING_FEN};
pub use game::{GameError, GameOutcome, MoveInput, PlayedMove, Position};
pub use types::{PieceColor, PieceKind};
pub use uci::{convert_cozy_castling_to_uci, convert_uci_castling_to_cozy, format_uci_move};
