//! Quiescence: settle tactics before trusting the static evaluation.
//!
//! Deep mode explores captures and checks a few plies past the horizon.
//! Hard mode gets a cheaper variant that only chases checks.

use luft_core::{legal_moves, GameState};

use crate::search::alphabeta::{mate_score, SearchContext, INF};
use crate::search::ordering::{order_moves, OrderingInputs};
use crate::search::see::see_lite;

/// Captures this far underwater are not worth resolving unless they check.
const QUIESCE_SEE_FLOOR: i32 = -350;

/// Deep-mode quiescence over captures and checks.
///
/// Stand-pat bounds apply except in check, where every legal move must be
/// considered so forced mates are not evaluated away.
pub(crate) fn quiesce(
    state: &mut GameState,
    mut alpha: i32,
    mut beta: i32,
    ply: u32,
    qdepth: u32,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.nodes += 1;
    if ctx.control.should_stop(ctx.nodes) {
        return ctx.evaluate_here(state);
    }

    let side = state.active_color();
    let maximizer = side == ctx.maximizing;
    let stand_pat = ctx.evaluate_here(state);
    if qdepth == 0 {
        return stand_pat;
    }

    let in_check = state.is_in_check(side);
    if !in_check {
        if maximizer {
            if stand_pat >= beta {
                return stand_pat;
            }
            alpha = alpha.max(stand_pat);
        } else {
            if stand_pat <= alpha {
                return stand_pat;
            }
            beta = beta.min(stand_pat);
        }
    }

    let mut moves = legal_moves(state, side);
    if moves.is_empty() {
        return if in_check {
            mate_score(side, ctx.maximizing, ply)
        } else {
            0
        };
    }

    let prev_move = state.last_move();
    order_moves(
        state,
        &mut moves,
        &OrderingInputs {
            tt_move: None,
            killers: &ctx.killers,
            history: &ctx.history,
            counters: &ctx.counters,
            prev_move,
            ply,
            max_thinking: ctx.max_thinking,
        },
    );

    let mut best = if in_check {
        if maximizer { -INF } else { INF }
    } else {
        stand_pat
    };

    for &mv in &moves {
        // Outside check only forcing moves are explored, and badly losing
        // captures are dropped unless they deliver check.
        let net = if mv.is_capture() {
            see_lite(state, mv)
        } else {
            0
        };

        let undo = state.make_move(mv);
        let gives_check = state.is_in_check(side.flip());

        if !in_check {
            let forcing = mv.is_capture() || gives_check;
            if !forcing || (mv.is_capture() && net <= QUIESCE_SEE_FLOOR && !gives_check) {
                state.unmake_move(undo);
                continue;
            }
        }

        let score = quiesce(state, alpha, beta, ply + 1, qdepth - 1, ctx);
        state.unmake_move(undo);

        if maximizer {
            best = best.max(score);
            alpha = alpha.max(best);
        } else {
            best = best.min(score);
            beta = beta.min(best);
        }
        if alpha >= beta {
            ctx.cutoffs += 1;
            break;
        }
    }

    best
}

/// Hard-mode micro-quiescence: at the leaf, follow checking moves only.
/// Positions with no checking move stand pat.
pub(crate) fn micro_quiesce(
    state: &mut GameState,
    mut alpha: i32,
    mut beta: i32,
    ply: u32,
    qdepth: u32,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.nodes += 1;
    if ctx.control.should_stop(ctx.nodes) {
        return ctx.evaluate_here(state);
    }

    let side = state.active_color();
    let maximizer = side == ctx.maximizing;
    let stand_pat = ctx.evaluate_here(state);
    if qdepth == 0 {
        return stand_pat;
    }

    let moves = legal_moves(state, side);
    if moves.is_empty() {
        return if state.is_in_check(side) {
            mate_score(side, ctx.maximizing, ply)
        } else {
            0
        };
    }

    let mut best = stand_pat;
    for &mv in &moves {
        let undo = state.make_move(mv);
        let gives_check = state.is_in_check(side.flip());
        if !gives_check {
            state.unmake_move(undo);
            continue;
        }

        let score = micro_quiesce(state, alpha, beta, ply + 1, qdepth - 1, ctx);
        state.unmake_move(undo);

        if maximizer {
            best = best.max(score);
            alpha = alpha.max(best);
        } else {
            best = best.min(score);
            beta = beta.min(best);
        }
        if alpha >= beta {
            ctx.cutoffs += 1;
            break;
        }
    }

    best
}
