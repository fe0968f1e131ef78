//! SEE-lite: a one-exchange static exchange approximation, plus the
//! hanging-piece tests built on the same attacker queries.
//!
//! Unlike a full SEE this stops after a single recapture. A capture with no
//! defender nets the victim's value; a defended victim charges the attacker
//! pessimistically with both the attacker's own value and the cheapest
//! defender. That bias is intentional: the score only feeds ordering
//! penalties and quiescence pruning thresholds, where underestimating a
//! defended capture is safer than overestimating it.

use luft_core::{cheapest_attacker, count_attackers, Color, GameState, Move, PieceType, Square};

/// One-exchange net for a capture, from the mover's side.
///
/// Non-captures net 0.
pub(crate) fn see_lite(state: &GameState, mv: Move) -> i32 {
    let Some(victim_id) = mv.captured_id else {
        return 0;
    };
    let victim_value = state
        .piece(victim_id)
        .map_or(PieceType::Pawn.value(), |p| p.kind.value());

    let Some(attacker) = state.piece_at(mv.from) else {
        return 0;
    };
    let attacker_value = attacker.kind.value();
    let opp = attacker.color.flip();

    // Cheapest recapture once the attacker has landed on the target square.
    let defender = cheapest_attacker(state, mv.to, opp, Some(mv.from));
    match defender {
        None => victim_value,
        Some(kind) => victim_value - attacker_value - kind.value(),
    }
}

/// Whether the piece standing on `sq` is attacked with no adequate defender.
///
/// "Adequate" is approximate: undefended counts as hanging, as does being
/// attacked by something cheaper than the piece itself.
pub(crate) fn is_hanging(state: &GameState, sq: Square, owner: Color) -> bool {
    let Some(piece) = state.piece_at(sq) else {
        return false;
    };
    let opp = owner.flip();
    let Some(cheapest) = cheapest_attacker(state, sq, opp, None) else {
        return false;
    };
    if count_attackers(state, sq, owner, None) == 0 {
        return true;
    }
    cheapest.value() < piece.kind.value()
}

/// Whether `mv`'s destination would leave the mover hanging, judged before
/// the move is made (the source square is treated as vacated).
pub(crate) fn lands_hanging(state: &GameState, mv: Move) -> bool {
    let Some(mover) = state.piece_at(mv.from) else {
        return false;
    };
    let opp = mover.color.flip();
    let Some(cheapest) = cheapest_attacker(state, mv.to, opp, Some(mv.from)) else {
        return false;
    };
    if count_attackers(state, mv.to, mover.color, Some(mv.from)) == 0 {
        return true;
    }
    cheapest.value() < mover.kind.value()
}
