//! Piece-square tables for the minor pieces (deep mode only).
//!
//! Tables are written from White's point of view with rank 0 (White's back
//! rank) first; Black indexes through a vertical mirror.

use luft_core::{Color, GameState, PieceType, Square};

/// Knights: centralization is everything, rim is grim.
#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

/// Bishops: long diagonals and developed squares.
#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

/// Mirror a square vertically for Black's point of view.
fn relative_index(sq: Square, color: Color) -> usize {
    match color {
        Color::White => sq.index(),
        Color::Black => Square::new(sq.file(), 7 - sq.rank()).index(),
    }
}

/// Minor-piece placement score, White-centric.
pub(crate) fn minors(state: &GameState) -> i32 {
    let mut total = 0;
    for (sq, piece) in state.iter_pieces() {
        let table = match piece.kind {
            PieceType::Knight => &KNIGHT_TABLE,
            PieceType::Bishop => &BISHOP_TABLE,
            _ => continue,
        };
        let value = table[relative_index(sq, piece.color)];
        match piece.color {
            Color::White => total += value,
            Color::Black => total -= value,
        }
    }
    total
}
