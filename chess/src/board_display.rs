//! Text diagram of a position.

use cozy_chess::{File, Rank, Square};

use crate::fen::FenError;
use crate::game::Position;
use crate::types::{PieceColor, PieceKind};

/// Read-only view of a position for drawing.
#[derive(Debug, Clone)]
pub struct DisplayBoard {
    position: Position,
}

impl DisplayBoard {
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Position::from_fen(fen).map(Self::new)
    }

    /// Piece on the square at `file`, `rank` (both 0-based from a1).
    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PieceColor)> {
        if file > 7 || rank > 7 {
            return None;
        }
        let square = Square::new(File::index(file as usize), Rank::index(rank as usize));
        self.position.piece_at(square)
    }

    /// Render as text, rank 8 at the top, with file and rank labels.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(9 * 18);
        for rank in (0..8u8).rev() {
            let row: Vec<String> = (0..8u8)
                .map(|file| match self.piece_at(file, rank) {
                    Some((kind, PieceColor::White)) => kind.to_char_upper(),
                    Some((kind, PieceColor::Black)) => kind.to_char_lower(),
                    None => '.',
                })
                .map(String::from)
                .collect();
            out.push_str(&format!("{} {}\n", rank + 1, row.join(" ")));
        }
        out.push_str("  a b c d e f g h\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::STARTING_FEN;

    #[test]
    fn test_starting_position() {
        let board = DisplayBoard::from_fen(STARTING_FEN).unwrap();
        assert_eq!(board.piece_at(0, 0), Some((PieceKind::Rook, PieceColor::White)));
        assert_eq!(board.piece_at(3, 7), Some((PieceKind::Queen, PieceColor::Black)));
        assert_eq!(board.piece_at(4, 4), None);
        assert_eq!(board.piece_at(8, 0), None);
    }

    #[test]
    fn test_render_ascii() {
        let text = DisplayBoard::new(Position::starting()).render_ascii();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[4], "4 . . . . . . . .");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }

    #[test]
    fn test_invalid_fen_is_rejected() {
        assert!(DisplayBoard::from_fen("xnbqkbnr/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }
}
