//! Move-search engine: evaluation, alpha-beta search, and the play-for-win
//! root policy.
//!
//! The public surface is three call shapes over a [`GameState`]:
//! [`choose_move`], [`choose_move_with_diagnostics`], and
//! [`choose_move_with_metrics`]. Everything else — iterative deepening,
//! quiescence, transposition tables, move ordering, repetition shaping — sits
//! behind them, configured through [`AiOptions`].

pub mod eval;
mod options;
mod root;
pub mod search;

pub use eval::{evaluate, EvalOptions};
pub use options::{AiOptions, Difficulty, ProgressFn, SearchProgress, StopFn};
pub use root::{ChosenMoveReason, RepeatKind, RootDiagnostics, RootLine};
pub use search::metrics::{SearchMetrics, StopReason};

use luft_core::{legal_moves, GameState, Move};

/// Pick a move for the side to move (or `opts.color`).
///
/// Returns `None` only when the position has no legal moves; callers should
/// then inspect [`luft_core::game_status`].
pub fn choose_move(state: &GameState, opts: &AiOptions) -> Option<Move> {
    choose_move_with_metrics(state, opts).0
}

/// Like [`choose_move`], also returning the root policy's decision record.
pub fn choose_move_with_diagnostics(
    state: &GameState,
    opts: &AiOptions,
) -> (Option<Move>, Option<RootDiagnostics>) {
    let (mv, diag, _) = choose_move_with_metrics(state, opts);
    (mv, diag)
}

/// Like [`choose_move`], also returning diagnostics and search metrics.
pub fn choose_move_with_metrics(
    state: &GameState,
    opts: &AiOptions,
) -> (Option<Move>, Option<RootDiagnostics>, Option<SearchMetrics>) {
    let color = opts.color.unwrap_or_else(|| state.active_color());
    if legal_moves(state, color).is_empty() {
        return (None, None, None);
    }

    let mut outcome = search::run(state, color, opts);
    let (mv, diag) = root::select(state, color, opts, &mut outcome);
    (Some(mv), Some(diag), Some(outcome.metrics))
}
