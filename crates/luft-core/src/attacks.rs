//! Attack queries over the mailbox board.
//!
//! All queries scan outward from the target square: leaper patterns are
//! intersected with the attacker's pieces, slider rays walk until the first
//! occupied square. The optional `vacated` square is treated as empty, which
//! lets callers ask "is this square attacked once the piece on `vacated` has
//! moved away?" without mutating the state.

use crate::color::Color;
use crate::piece::PieceType;
use crate::square::Square;
use crate::state::GameState;

/// Knight jump offsets as (file, rank) deltas.
pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// King step offsets (also the queen's ray directions).
pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Orthogonal ray directions.
pub(crate) const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal ray directions.
pub(crate) const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Return `true` if `sq` is attacked by any piece of `by`.
pub fn is_square_attacked(state: &GameState, sq: Square, by: Color) -> bool {
    is_square_attacked_vacated(state, sq, by, None)
}

/// Like [`is_square_attacked`], but treating `vacated` as an empty square.
pub fn is_square_attacked_vacated(
    state: &GameState,
    sq: Square,
    by: Color,
    vacated: Option<Square>,
) -> bool {
    let piece_of = |s: Square| {
        if vacated == Some(s) {
            None
        } else {
            state.piece_at(s)
        }
    };

    // Pawns: a pawn of `by` attacks sq from one rank behind (relative to its
    // own advance direction), one file to either side.
    for df in [-1i8, 1] {
        if let Some(from) = sq.offset(df, -by.forward())
            && let Some(p) = piece_of(from)
            && p.color == by
            && p.kind == PieceType::Pawn
        {
            return true;
        }
    }

    // Knights.
    for (df, dr) in KNIGHT_OFFSETS {
        if let Some(from) = sq.offset(df, dr)
            && let Some(p) = piece_of(from)
            && p.color == by
            && p.kind == PieceType::Knight
        {
            return true;
        }
    }

    // King.
    for (df, dr) in KING_OFFSETS {
        if let Some(from) = sq.offset(df, dr)
            && let Some(p) = piece_of(from)
            && p.color == by
            && p.kind == PieceType::King
        {
            return true;
        }
    }

    // Sliders: walk each ray to the first occupied square.
    for (df, dr) in ROOK_DIRS {
        let mut current = sq;
        while let Some(next) = current.offset(df, dr) {
            if let Some(p) = piece_of(next) {
                if p.color == by && matches!(p.kind, PieceType::Rook | PieceType::Queen) {
                    return true;
                }
                break;
            }
            current = next;
        }
    }
    for (df, dr) in BISHOP_DIRS {
        let mut current = sq;
        while let Some(next) = current.offset(df, dr) {
            if let Some(p) = piece_of(next) {
                if p.color == by && matches!(p.kind, PieceType::Bishop | PieceType::Queen) {
                    return true;
                }
                break;
            }
            current = next;
        }
    }

    false
}

/// Enumerate the pieces of `by` that attack `sq`, as `(square, kind)` pairs.
///
/// `vacated` is treated as empty (see module docs). Slider rays stop at the
/// first piece, so batteries (e.g. doubled rooks) contribute a single
/// attacker, which matches the one-exchange approximation this feeds.
pub(crate) fn attackers_of(
    state: &GameState,
    sq: Square,
    by: Color,
    vacated: Option<Square>,
) -> Vec<(Square, PieceType)> {
    let mut result = Vec::new();
    let piece_of = |s: Square| {
        if vacated == Some(s) {
            None
        } else {
            state.piece_at(s)
        }
    };

    for df in [-1i8, 1] {
        if let Some(from) = sq.offset(df, -by.forward())
            && let Some(p) = piece_of(from)
            && p.color == by
            && p.kind == PieceType::Pawn
        {
            result.push((from, PieceType::Pawn));
        }
    }

    for (df, dr) in KNIGHT_OFFSETS {
        if let Some(from) = sq.offset(df, dr)
            && let Some(p) = piece_of(from)
            && p.color == by
            && p.kind == PieceType::Knight
        {
            result.push((from, PieceType::Knight));
        }
    }

    for (df, dr) in KING_OFFSETS {
        if let Some(from) = sq.offset(df, dr)
            && let Some(p) = piece_of(from)
            && p.color == by
            && p.kind == PieceType::King
        {
            result.push((from, PieceType::King));
        }
    }

    for (df, dr) in ROOK_DIRS {
        let mut current = sq;
        while let Some(next) = current.offset(df, dr) {
            if let Some(p) = piece_of(next) {
                if p.color == by && matches!(p.kind, PieceType::Rook | PieceType::Queen) {
                    result.push((next, p.kind));
                }
                break;
            }
            current = next;
        }
    }

    for (df, dr) in BISHOP_DIRS {
        let mut current = sq;
        while let Some(next) = current.offset(df, dr) {
            if let Some(p) = piece_of(next) {
                if p.color == by && matches!(p.kind, PieceType::Bishop | PieceType::Queen) {
                    result.push((next, p.kind));
                }
                break;
            }
            current = next;
        }
    }

    result
}

/// Count the pieces of `by` attacking `sq`, treating `vacated` as empty.
pub fn count_attackers(
    state: &GameState,
    sq: Square,
    by: Color,
    vacated: Option<Square>,
) -> u32 {
    attackers_of(state, sq, by, vacated).len() as u32
}

/// The least valuable piece of `by` attacking `sq`, treating `vacated` as
/// empty. Returns its kind.
pub fn cheapest_attacker(
    state: &GameState,
    sq: Square,
    by: Color,
    vacated: Option<Square>,
) -> Option<PieceType> {
    attackers_of(state, sq, by, vacated)
        .into_iter()
        .map(|(_, kind)| kind)
        .min_by_key(|kind| kind.value())
}
