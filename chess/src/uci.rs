//! UCI (Universal Chess Interface) move notation helpers

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::converters::{format_piece, format_square};

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// Only applies when a king stands on the source square and the converted
/// move is legal; anything else is returned unchanged.
pub fn convert_uci_castling_to_cozy(board: &Board, mv: Move, legal_moves: &[Move]) -> Move {
    if board.piece_on(mv.from) != Some(Piece::King) || mv.promotion.is_some() {
        return mv;
    }

    let is_e_file = matches!(mv.from.file(), File::E);
    let target_square = match (mv.from.rank(), mv.to.rank(), mv.to.file()) {
        (Rank::First, Rank::First, File::G) => Square::new(File::H, Rank::First),
        (Rank::First, Rank::First, File::C) => Square::new(File::A, Rank::First),
        (Rank::Eighth, Rank::Eighth, File::G) => Square::new(File::H, Rank::Eighth),
        (Rank::Eighth, Rank::Eighth, File::C) => Square::new(File::A, Rank::Eighth),
        _ => return mv,
    };
    if !is_e_file {
        return mv;
    }

    let converted = Move {
        from: mv.from,
        to: target_square,
        promotion: None,
    };

    if legal_moves.contains(&converted) {
        converted
    } else {
        mv
    }
}

/// Inverse of [`convert_uci_castling_to_cozy`]: rewrite a king-takes-own-rook
/// move into the two-square king move UCI consumers expect.
pub fn convert_cozy_castling_to_uci(board: &Board, mv: Move) -> Move {
    let Some(color) = board.color_on(mv.from) else {
        return mv;
    };
    let is_castle = board.piece_on(mv.from) == Some(Piece::King)
        && board.piece_on(mv.to) == Some(Piece::Rook)
        && board.color_on(mv.to) == Some(color);
    if !is_castle {
        return mv;
    }

    let file = if (mv.to.file() as u8) > (mv.from.file() as u8) {
        File::G
    } else {
        File::C
    };
    Move {
        from: mv.from,
        to: Square::new(file, mv.from.rank()),
        promotion: None,
    }
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}
