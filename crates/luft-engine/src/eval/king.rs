//! King safety terms: exposure, ring attacks, and the deep-mode opening
//! safety and pawn-shield extras.

use luft_core::{count_attackers, Color, GameState, PieceType, Square};

/// Penalty for an uncastled king off its home square.
const OFF_HOME_PENALTY: f64 = 30.0;

/// Extra penalty for a king stuck on a central file with no rights left.
const CENTRAL_NO_RIGHTS_PENALTY: f64 = 20.0;

/// Multiplier applied while any queen remains on the board.
const QUEEN_DANGER: f64 = 1.4;

/// Penalty per enemy attack on a square adjacent to the king.
const RING_ATTACK_PENALTY: f64 = 6.0;

/// The eight squares around a king.
const RING: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

fn home_square(color: Color) -> Square {
    Square::new(4, color.back_rank())
}

/// A king on the g- or c-file of its back rank counts as castled.
fn on_castled_square(king: Square, color: Color) -> bool {
    king.rank() == color.back_rank() && (king.file() == 6 || king.file() == 2)
}

/// Phase-gated king exposure, White-centric.
///
/// Zero through fullmove 10, full weight from fullmove 20. Hot while queens
/// remain on the board.
pub(crate) fn exposure(state: &GameState, phase: f64, queens_on: bool) -> i32 {
    if phase == 0.0 {
        return 0;
    }
    let danger = if queens_on { QUEEN_DANGER } else { 1.0 };

    let mut total = 0.0;
    for color in Color::ALL {
        let king = state.king_square(color);
        let mut penalty = 0.0;

        if king != home_square(color) && !on_castled_square(king, color) {
            penalty += OFF_HOME_PENALTY;
        }
        if !state.castling_rights().has_any(color) && (3..=4).contains(&king.file()) {
            penalty += CENTRAL_NO_RIGHTS_PENALTY;
        }

        let signed = penalty * phase * danger;
        match color {
            Color::White => total -= signed,
            Color::Black => total += signed,
        }
    }
    total as i32
}

/// Attacks on the king's ring, White-centric. Only called while at least one
/// queen remains; fades once the game runs long.
pub(crate) fn ring_attacks(state: &GameState, fullmove: u32) -> i32 {
    let fade = 1.0 - 0.5 * ((fullmove as f64 - 30.0) / 30.0).clamp(0.0, 1.0);

    let mut total = 0.0;
    for color in Color::ALL {
        let king = state.king_square(color);
        let opp = color.flip();
        let mut attacks = 0u32;
        for (df, dr) in RING {
            if let Some(sq) = king.offset(df, dr) {
                attacks += count_attackers(state, sq, opp, None);
            }
        }
        let signed = attacks as f64 * RING_ATTACK_PENALTY * fade;
        match color {
            Color::White => total -= signed,
            Color::Black => total += signed,
        }
    }
    total as i32
}

/// Deep-mode opening king safety, White-centric: reward a castled or
/// still-home king, penalize wandering, and charge for missing f/g/h pawns.
/// Fades out as the middlegame phase ramps in.
pub(crate) fn opening_safety(state: &GameState, phase: f64) -> i32 {
    let early = 1.0 - phase;
    if early == 0.0 {
        return 0;
    }

    let mut total = 0.0;
    for color in Color::ALL {
        let king = state.king_square(color);
        let home = home_square(color);
        let mut term = 0.0;

        if on_castled_square(king, color) || king == home {
            term += 20.0;
        } else {
            let dist = king
                .file()
                .abs_diff(home.file())
                .max(king.rank().abs_diff(home.rank()));
            term -= 8.0 * dist as f64;
        }

        // Kingside pawn cover: one pawn somewhere on each of f, g, h.
        for file in [5u8, 6, 7] {
            let has_pawn = state
                .pieces_of(color)
                .any(|(sq, p)| p.kind == PieceType::Pawn && sq.file() == file);
            if !has_pawn {
                term -= 12.0;
            }
        }

        let signed = term * early;
        match color {
            Color::White => total += signed,
            Color::Black => total -= signed,
        }
    }
    total as i32
}

/// Deep-mode pawn shield, White-centric: each missing pawn on the three
/// squares directly ahead of the king costs a little.
pub(crate) fn shield(state: &GameState) -> i32 {
    let mut total = 0;
    for color in Color::ALL {
        let king = state.king_square(color);
        let fwd = color.forward();
        let mut missing = 0;
        for df in [-1i8, 0, 1] {
            let Some(sq) = king.offset(df, fwd) else {
                continue;
            };
            let covered = state
                .piece_at(sq)
                .is_some_and(|p| p.kind == PieceType::Pawn && p.color == color);
            if !covered {
                missing += 1;
            }
        }
        let signed = 8 * missing;
        match color {
            Color::White => total -= signed,
            Color::Black => total += signed,
        }
    }
    total
}
