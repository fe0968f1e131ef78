//! Zobrist keys for position identity.
//!
//! The position key covers piece placement, the side to move, castling
//! rights, and the en passant file. Move counters are deliberately excluded
//! so that repeated positions hash equal regardless of when they occur.

use crate::color::Color;
use crate::piece::PieceType;
use crate::state::GameState;

/// Key for each (colored piece, square) pair.
/// Indexed by `[color * 6 + kind][square]`.
pub(crate) static PIECE_SQUARE: [[u64; 64]; 12] = {
    let mut table = [[0u64; 64]; 12];
    let mut state = SEED;
    let mut piece = 0;
    while piece < 12 {
        let mut sq = 0;
        while sq < 64 {
            let (val, next) = splitmix64(state);
            table[piece][sq] = val;
            state = next;
            sq += 1;
        }
        piece += 1;
    }
    table
};

/// Key XORed in when Black is the side to move.
pub(crate) static SIDE_TO_MOVE: u64 = {
    let state = advance(SEED, 768);
    let (val, _) = splitmix64(state);
    val
};

/// Keys for each castling-rights configuration, indexed by `bits()`.
pub(crate) static CASTLING: [u64; 16] = {
    let mut table = [0u64; 16];
    let mut state = advance(SEED, 769);
    let mut idx = 0;
    while idx < 16 {
        let (val, next) = splitmix64(state);
        table[idx] = val;
        state = next;
        idx += 1;
    }
    table
};

/// Keys for the en passant file, indexed by file.
pub(crate) static EN_PASSANT_FILE: [u64; 8] = {
    let mut table = [0u64; 8];
    let mut state = advance(SEED, 785);
    let mut idx = 0;
    while idx < 8 {
        let (val, next) = splitmix64(state);
        table[idx] = val;
        state = next;
        idx += 1;
    }
    table
};

const SEED: u64 = 0x4c55_4654_2d4b_4559; // "LUFT-KEY"

/// SplitMix64 step. Returns (value, next state).
const fn splitmix64(state: u64) -> (u64, u64) {
    let next = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = next;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    (z ^ (z >> 31), next)
}

/// Skip `n` values of the stream starting from `state`.
const fn advance(mut state: u64, n: usize) -> u64 {
    let mut i = 0;
    while i < n {
        let (_, next) = splitmix64(state);
        state = next;
        i += 1;
    }
    state
}

/// Index into [`PIECE_SQUARE`] for a colored piece.
#[inline]
pub(crate) const fn piece_index(color: Color, kind: PieceType) -> usize {
    color.index() * PieceType::COUNT + kind.index()
}

/// Compute the position key of a state from scratch.
///
/// `GameState` maintains the key incrementally; this is the reference
/// implementation used to seed it and to cross-check make/unmake.
pub(crate) fn key_from_scratch(state: &GameState) -> u64 {
    let mut key = 0u64;

    for (sq, piece) in state.iter_pieces() {
        key ^= PIECE_SQUARE[piece_index(piece.color, piece.kind)][sq.index()];
    }

    if state.active_color() == Color::Black {
        key ^= SIDE_TO_MOVE;
    }

    key ^= CASTLING[state.castling_rights().bits() as usize];

    if let Some(ep) = state.en_passant_target() {
        key ^= EN_PASSANT_FILE[ep.file() as usize];
    }

    key
}
