//! Material balance.

use luft_core::{Color, GameState, PieceType};

/// Material difference in centipawns, White minus Black. Kings are skipped;
/// both sides always have exactly one.
pub(crate) fn balance(state: &GameState) -> i32 {
    let mut total = 0;
    for (_, piece) in state.iter_pieces() {
        if piece.kind == PieceType::King {
            continue;
        }
        match piece.color {
            Color::White => total += piece.kind.value(),
            Color::Black => total -= piece.kind.value(),
        }
    }
    total
}

/// Total non-king material for one side, in centipawns.
pub(crate) fn side_total(state: &GameState, color: Color) -> i32 {
    state
        .pieces_of(color)
        .filter(|(_, p)| p.kind != PieceType::King)
        .map(|(_, p)| p.kind.value())
        .sum()
}
