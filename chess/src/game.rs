use cozy_chess::{Board, GameStatus, Move, Piece, Square};

use crate::converters::{format_square, parse_square};
use crate::fen::{format_fen, parse_fen, FenError};
use crate::types::{PieceColor, PieceKind};
use crate::uci::{convert_cozy_castling_to_uci, convert_uci_castling_to_cozy, format_uci_move};

/// A legally reachable board state.
///
/// Serialized form is FEN; the parsed board is kept alongside so moves
/// can be validated without re-parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
}

/// A user or engine move before it has been checked against the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveInput {
    pub from: Square,
    pub to: Square,
    /// Only consulted when the move is a pawn promotion.
    pub promotion: PieceKind,
}

/// Result of a successfully played move.
#[derive(Debug, Clone)]
pub struct PlayedMove {
    pub position: Position,
    /// Standard UCI text, castling as a two-square king move.
    pub uci: String,
    pub san: String,
    pub outcome: Option<GameOutcome>,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Checkmate { winner: PieceColor },
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            Self::Stalemate => f.write_str("draw by stalemate"),
            Self::FiftyMoveRule => f.write_str("draw by fifty-move rule"),
            Self::InsufficientMaterial => f.write_str("draw by insufficient material"),
            Self::ThreefoldRepetition => f.write_str("draw by threefold repetition"),
        }
    }
}

impl MoveInput {
    /// A move with the default queen promotion.
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: PieceKind::Queen,
        }
    }

    pub fn with_promotion(mut self, piece: PieceKind) -> Self {
        self.promotion = piece;
        self
    }

    /// Parse UCI text such as `e2e4` or `e7e8n`.
    pub fn parse_uci(s: &str) -> Result<Self, GameError> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(GameError::InvalidNotation(s.to_string()));
        }
        let from = parse_square(&s[0..2]).ok_or_else(|| GameError::InvalidNotation(s.to_string()))?;
        let to = parse_square(&s[2..4]).ok_or_else(|| GameError::InvalidNotation(s.to_string()))?;
        let mut input = Self::new(from, to);
        if let Some(c) = s[4..].chars().next() {
            let piece = PieceKind::from_char(c)
                .filter(|p| p.is_promotion_piece())
                .ok_or_else(|| GameError::InvalidNotation(s.to_string()))?;
            input = input.with_promotion(piece);
        }
        Ok(input)
    }
}

impl std::fmt::Display for MoveInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", format_square(self.from), format_square(self.to))
    }
}

impl Position {
    pub fn starting() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self {
            board: parse_fen(fen)?,
        })
    }

    pub fn fen(&self) -> String {
        format_fen(&self.board)
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.board.side_to_move().into()
    }

    /// Key identifying the position for repetition counting
    /// (placement, side to move, castling and en passant rights).
    pub fn repetition_key(&self) -> u64 {
        self.board.hash()
    }

    pub fn piece_at(&self, square: Square) -> Option<(PieceKind, PieceColor)> {
        let piece = self.board.piece_on(square)?;
        let color = self.board.color_on(square)?;
        Some((piece.into(), color.into()))
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.board.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    fn has_legal_moves(&self) -> bool {
        self.board.generate_moves(|_| true)
    }

    /// Terminal status that can be read off this position alone.
    /// Repetition needs history and is left to the caller.
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.board.status() {
            GameStatus::Won => Some(GameOutcome::Checkmate {
                winner: self.side_to_move().opposite(),
            }),
            GameStatus::Drawn if !self.has_legal_moves() => Some(GameOutcome::Stalemate),
            GameStatus::Drawn => Some(GameOutcome::FiftyMoveRule),
            GameStatus::Ongoing if self.insufficient_material() => {
                Some(GameOutcome::InsufficientMaterial)
            }
            GameStatus::Ongoing => None,
        }
    }

    /// Bare kings, a single minor piece, or bishops all on one square color.
    fn insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }

        let knights = board.pieces(Piece::Knight);
        let bishops = board.pieces(Piece::Bishop);
        let minors = knights.len() + bishops.len();
        if minors <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }
        let light = bishops.into_iter().filter(|sq| is_light(*sq)).count();
        light == 0 || light == bishops.len() as usize
    }

    /// Validate and play a move without touching `self`.
    pub fn play(&self, input: &MoveInput) -> Result<PlayedMove, GameError> {
        let legal = self.legal_moves();
        let mv = self.resolve(input, &legal).ok_or(GameError::IllegalMove)?;

        let piece = self.board.piece_on(mv.from).ok_or(GameError::IllegalMove)?;
        let display_mv = convert_cozy_castling_to_uci(&self.board, mv);
        let mut san = generate_san(&self.board, mv, display_mv, piece);

        let mut board = self.board.clone();
        board.play_unchecked(mv);
        let position = Position { board };
        let outcome = position.outcome();

        if matches!(outcome, Some(GameOutcome::Checkmate { .. })) {
            san.push('#');
        } else if !position.board.checkers().is_empty() {
            san.push('+');
        }

        Ok(PlayedMove {
            position,
            uci: format_uci_move(display_mv),
            san,
            outcome,
        })
    }

    fn resolve(&self, input: &MoveInput, legal: &[Move]) -> Option<Move> {
        let candidate = convert_uci_castling_to_cozy(
            &self.board,
            Move {
                from: input.from,
                to: input.to,
                promotion: None,
            },
            legal,
        );
        let promotion: Piece = input.promotion.into();

        legal.iter().copied().find(|mv| {
            mv.from == candidate.from
                && mv.to == candidate.to
                && mv.promotion.map_or(true, |p| p == promotion)
        })
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fen())
    }
}

fn is_light(sq: Square) -> bool {
    (sq.file() as u8 + sq.rank() as u8) % 2 == 1
}

/// Generate simplified SAN notation for a move (no disambiguation)
fn generate_san(board: &Board, mv: Move, display_mv: Move, piece: Piece) -> String {
    if display_mv != mv {
        return if (display_mv.to.file() as u8) > (display_mv.from.file() as u8) {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let mut san = String::new();
    let is_capture = board.piece_on(mv.to).is_some()
        || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

    if piece == Piece::Pawn {
        if is_capture {
            san.push_str(&format_square(mv.from)[..1]);
        }
    } else {
        san.push(PieceKind::from(piece).to_char_upper());
    }

    if is_capture {
        san.push('x');
    }
    san.push_str(&format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(PieceKind::from(promo).to_char_upper());
    }

    san
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Illegal move")]
    IllegalMove,
    #[error("Invalid move notation: {0}")]
    InvalidNotation(String),
    #[error("FEN parse error: {0}")]
    FenError(#[from] FenError),
}
