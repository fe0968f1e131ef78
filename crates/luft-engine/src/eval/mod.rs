//! Static evaluation.
//!
//! All terms are computed White-centric (positive favors White) and the sum
//! is flipped for the requested perspective at the end. Evaluation is a pure
//! function of the position and the option set.

mod develop;
mod files;
mod king;
pub(crate) mod material;
mod mobility;
mod pst;

use luft_core::{Color, GameState, PieceType};

/// Evaluation feature set.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalOptions {
    /// Enable the deep-mode extras: opening king safety, the early-queen
    /// penalty, minor-piece square tables, and the king-shield term.
    pub max_thinking: bool,
}

/// Evaluate the position in centipawns; positive favors `perspective`.
pub fn evaluate(state: &GameState, perspective: Color, opts: &EvalOptions) -> i32 {
    let fullmove = state.fullmove_number();
    let phase = middlegame_phase(fullmove);
    let queens_on = state
        .iter_pieces()
        .any(|(_, p)| p.kind == PieceType::Queen);

    let mut total = material::balance(state);
    total += mobility::balance(state);

    // A side in check is momentarily worse off than the bare material says.
    if state.is_in_check(Color::White) {
        total -= 50;
    }
    if state.is_in_check(Color::Black) {
        total += 50;
    }

    total += king::exposure(state, phase, queens_on);
    total += files::pressure(state, phase);
    if queens_on {
        total += king::ring_attacks(state, fullmove);
    }

    if opts.max_thinking {
        total += king::opening_safety(state, phase);
        total += develop::early_queen(state, fullmove);
        total += pst::minors(state);
        total += king::shield(state);
    }

    match perspective {
        Color::White => total,
        Color::Black => -total,
    }
}

/// Phase ramp keyed off the fullmove number: 0.0 through fullmove 10,
/// rising linearly to 1.0 at fullmove 20.
pub(crate) fn middlegame_phase(fullmove: u32) -> f64 {
    ((fullmove as f64 - 10.0) / 10.0).clamp(0.0, 1.0)
}
