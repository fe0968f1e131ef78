//! Interior alpha-beta search.
//!
//! Written as an explicit maximizer/minimizer relative to the searching
//! side (`maximizing`): evaluation is always from that side's perspective
//! and the two player roles tighten alpha or beta respectively. Mate scores,
//! window conventions, and pruning conditions all key off that orientation.

use luft_core::{legal_moves, Color, GameState, Move, PieceType};

use crate::eval::{evaluate, EvalOptions};
use crate::search::control::SearchControl;
use crate::search::heuristics::{CounterMoveTable, HistoryTable, KillerTable};
use crate::search::ordering::{order_moves, OrderingInputs};
use crate::search::quiesce::{micro_quiesce, quiesce};
use crate::search::see::is_hanging;
use crate::search::tt::{Flag, TransTable, TtEntry};

/// Window sentinel; far outside any reachable score.
pub(crate) const INF: i32 = 1_000_000;

/// Base magnitude for mate scores; ply distance is subtracted so nearer
/// mates score higher.
pub(crate) const MATE: i32 = 20_000;

/// Extension plies allowed on one line.
const MAX_LINE_EXTENSIONS: u32 = 2;

/// No forcing extensions past this ply.
const EXTENSION_PLY_CAP: u32 = 6;

/// Full quiescence depth budget at leaf entry.
const QUIESCE_DEPTH: u32 = 4;

/// Mutable search state threaded through a single search call. All tables
/// are owned here: nothing is shared between searches.
pub(crate) struct SearchContext<'a> {
    pub maximizing: Color,
    pub max_thinking: bool,
    /// Leaf check-extension budget for hard mode; 0 disables.
    pub micro_q_depth: u32,
    pub use_pvs: bool,
    pub use_tt: bool,
    pub eval_opts: EvalOptions,
    pub tt: TransTable,
    pub killers: KillerTable,
    pub history: HistoryTable,
    pub counters: CounterMoveTable,
    pub control: &'a SearchControl,
    pub nodes: u64,
    pub cutoffs: u64,
}

impl SearchContext<'_> {
    pub fn evaluate_here(&self, state: &GameState) -> i32 {
        evaluate(state, self.maximizing, &self.eval_opts)
    }
}

/// Mate score encoding: `sign * (MATE - ply)`.
///
/// The side to move is the one with no moves. When that is the opponent of
/// the maximizing color, the maximizer delivered mate: positive, and larger
/// for shorter mates. When the maximizing side is mated the score is
/// negative, decaying toward zero with ply so later losses compare greater.
pub(crate) fn mate_score(side_to_move: Color, maximizing: Color, ply: u32) -> i32 {
    let magnitude = MATE - ply as i32;
    if side_to_move != maximizing {
        magnitude
    } else {
        -magnitude
    }
}

/// Side has a non-pawn piece and at least 1200 cp of non-king material:
/// enough that handing over the turn is informative rather than zugzwang.
fn null_move_material(state: &GameState, side: Color) -> bool {
    let has_piece = state
        .pieces_of(side)
        .any(|(_, p)| !matches!(p.kind, PieceType::Pawn | PieceType::King));
    has_piece && crate::eval::material::side_total(state, side) >= 1200
}

/// Alpha-beta at an interior node. Returns the best score for the
/// maximizing color within `[alpha, beta]`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn alphabeta(
    state: &mut GameState,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    ply: u32,
    extensions_used: u32,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.nodes += 1;
    if ctx.control.should_stop(ctx.nodes) {
        return ctx.evaluate_here(state);
    }

    let side = state.active_color();
    let maximizer = side == ctx.maximizing;
    let (alpha_in, beta_in) = (alpha, beta);
    let key = state.position_key();

    let mut tt_move = None;
    if ctx.use_tt
        && let Some(entry) = ctx.tt.probe(key)
    {
        tt_move = entry.best_move;
        if entry.depth >= depth {
            let cutoff = match entry.flag {
                Flag::Exact => true,
                Flag::Alpha => entry.score <= alpha,
                Flag::Beta => entry.score >= beta,
            };
            if cutoff {
                return entry.score;
            }
        }
    }

    let mut moves = legal_moves(state, side);
    let in_check = state.is_in_check(side);
    if moves.is_empty() {
        return if in_check {
            mate_score(side, ctx.maximizing, ply)
        } else {
            0
        };
    }

    if depth == 0 {
        return if ctx.max_thinking {
            quiesce(state, alpha, beta, ply, QUIESCE_DEPTH, ctx)
        } else if ctx.micro_q_depth > 0 {
            micro_quiesce(state, alpha, beta, ply, ctx.micro_q_depth.min(2), ctx)
        } else {
            ctx.evaluate_here(state)
        };
    }

    // Null move: hand the opponent a free tempo. If the position still beats
    // the window the real move surely will.
    if ctx.max_thinking && depth >= 3 && !in_check && null_move_material(state, side) {
        let undo = state.make_null_move();
        let null_score = alphabeta(state, depth - 3, alpha, beta, ply + 1, extensions_used, ctx);
        state.unmake_null_move(undo);
        if maximizer && null_score >= beta {
            return null_score;
        }
        if !maximizer && null_score <= alpha {
            return null_score;
        }
    }

    let prev_move = state.last_move();
    order_moves(
        state,
        &mut moves,
        &OrderingInputs {
            tt_move,
            killers: &ctx.killers,
            history: &ctx.history,
            counters: &ctx.counters,
            prev_move,
            ply,
            max_thinking: ctx.max_thinking,
        },
    );

    let mut best = if maximizer { -INF } else { INF };
    let mut best_move: Option<Move> = None;

    for (index, &mv) in moves.iter().enumerate() {
        let undo = state.make_move(mv);
        let gives_check = state.is_in_check(side.flip());

        let quiet = !mv.is_capture() && !mv.is_promotion() && !mv.is_castle && !gives_check;
        let reduction =
            u32::from(ctx.max_thinking && depth >= 3 && index >= 3 && !in_check && quiet);

        let mut extension = 0u32;
        if extensions_used < MAX_LINE_EXTENSIONS && ply <= EXTENSION_PLY_CAP {
            let recapture =
                mv.is_capture() && depth >= 2 && prev_move.is_some_and(|prev| prev.to == mv.to);
            let safe_check = gives_check && !is_hanging(state, mv.to, side);
            if mv.is_promotion() || recapture || safe_check {
                extension = 1;
            }
        }

        let child_depth = (depth as i32 - 1 - reduction as i32 + extension as i32).max(0) as u32;
        let unreduced_depth = (depth as i32 - 1 + extension as i32).max(0) as u32;
        let child_extensions = extensions_used + extension;

        let use_null_window =
            ctx.max_thinking && ctx.use_pvs && index > 0 && alpha > -INF && beta < INF;

        let mut score;
        if use_null_window {
            let (null_alpha, null_beta) = if maximizer {
                (alpha, alpha + 1)
            } else {
                (beta - 1, beta)
            };
            score = alphabeta(state, child_depth, null_alpha, null_beta, ply + 1, child_extensions, ctx);
            if score > alpha && score < beta && !ctx.control.should_stop_before_research() {
                score = alphabeta(state, unreduced_depth, alpha, beta, ply + 1, child_extensions, ctx);
            } else if reduction > 0
                && ((maximizer && score > alpha) || (!maximizer && score < beta))
                && !ctx.control.should_stop_before_research()
            {
                score = alphabeta(state, unreduced_depth, alpha, beta, ply + 1, child_extensions, ctx);
            }
        } else {
            score = alphabeta(state, child_depth, alpha, beta, ply + 1, child_extensions, ctx);
            if reduction > 0
                && ((maximizer && score > alpha) || (!maximizer && score < beta))
                && !ctx.control.should_stop_before_research()
            {
                score = alphabeta(state, unreduced_depth, alpha, beta, ply + 1, child_extensions, ctx);
            }
        }

        state.unmake_move(undo);

        if maximizer {
            if score > best {
                best = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(best);
        } else {
            if score < best {
                best = score;
                best_move = Some(mv);
            }
            beta = beta.min(best);
        }

        if alpha >= beta {
            ctx.cutoffs += 1;
            if quiet {
                if ctx.max_thinking {
                    ctx.killers.store(ply, mv);
                    if let Some(prev) = prev_move {
                        ctx.counters.store(prev, mv);
                    }
                }
                ctx.history.add(mv, depth);
            }
            break;
        }
    }

    if ctx.use_tt {
        let flag = if best <= alpha_in {
            Flag::Alpha
        } else if best >= beta_in {
            Flag::Beta
        } else {
            Flag::Exact
        };
        ctx.tt.store(
            key,
            TtEntry {
                depth,
                score: best,
                flag,
                best_move,
            },
        );
    }

    best
}
