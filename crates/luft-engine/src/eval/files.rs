//! Heavy-piece file pressure near the kings.

use luft_core::{Color, GameState, PieceType};

/// Bonus for a rook/queen on an open file within one of the enemy king.
const OPEN_FILE_BONUS: f64 = 12.0;

/// Bonus when the file is only semi-open from the attacker's side.
const SEMI_OPEN_BONUS: f64 = 8.0;

/// Penalty when the own king sits on an open file with enemy heavies nearby.
const EXPOSED_KING_FILE_PENALTY: f64 = 15.0;

/// File pressure, White-centric, scaled by `0.5 + 0.5 * phase`.
pub(crate) fn pressure(state: &GameState, phase: f64) -> i32 {
    let scale = 0.5 + 0.5 * phase;

    let mut total = 0.0;
    for color in Color::ALL {
        let opp = color.flip();
        let enemy_king_file = state.king_square(opp).file();
        let mut term = 0.0;

        for (sq, piece) in state.pieces_of(color) {
            if !matches!(piece.kind, PieceType::Rook | PieceType::Queen) {
                continue;
            }
            if sq.file().abs_diff(enemy_king_file) > 1 {
                continue;
            }
            if file_open(state, sq.file()) {
                term += OPEN_FILE_BONUS;
            } else if file_semi_open_for(state, sq.file(), color) {
                term += SEMI_OPEN_BONUS;
            }
        }

        // Standing on an open file next to enemy heavies is its own problem.
        let own_king_file = state.king_square(color).file();
        if file_open(state, own_king_file) {
            let threatened = state.pieces_of(opp).any(|(sq, p)| {
                matches!(p.kind, PieceType::Rook | PieceType::Queen)
                    && sq.file().abs_diff(own_king_file) <= 1
            });
            if threatened {
                term -= EXPOSED_KING_FILE_PENALTY;
            }
        }

        let signed = term * scale;
        match color {
            Color::White => total += signed,
            Color::Black => total -= signed,
        }
    }
    total as i32
}

/// A file with no pawns of either color.
fn file_open(state: &GameState, file: u8) -> bool {
    !state
        .iter_pieces()
        .any(|(sq, p)| p.kind == PieceType::Pawn && sq.file() == file)
}

/// No pawns of `color` on the file (the mover's half of the file is clear).
fn file_semi_open_for(state: &GameState, file: u8, color: Color) -> bool {
    !state
        .pieces_of(color)
        .any(|(sq, p)| p.kind == PieceType::Pawn && sq.file() == file)
}
