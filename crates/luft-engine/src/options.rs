//! Engine configuration passed to `choose_move`.

use std::fmt;
use std::sync::Arc;

use luft_core::{Color, Move};

/// Playing strength preset, mapped to a search policy.
///
/// Easy and Medium are fixed shallow searches. Hard searches to depth 3 with
/// check-extending micro-quiescence and a bounded transposition table, and
/// iterates under a clock when `max_time_ms` is set. Max runs the full
/// machinery: iterative deepening to depth 7 under a 10 s default budget,
/// quiescence, PVS, aspiration windows, null-move pruning, late move
/// reductions, and killer/history/countermove ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Max,
}

/// Cooperative cancellation predicate, polled during search.
pub type StopFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Callback invoked after each completed deepening iteration.
pub type ProgressFn = Arc<dyn Fn(SearchProgress) + Send + Sync>;

/// Progress report for one completed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    pub depth: u32,
    pub mv: Move,
    /// Score in centipawns from the searching side's perspective.
    pub score: i32,
}

/// Options for a single `choose_move` request.
#[derive(Clone, Default)]
pub struct AiOptions {
    /// Side to pick a move for; defaults to the state's active color.
    pub color: Option<Color>,
    pub difficulty: Difficulty,
    /// Seed for the root tie-break RNG. With the same seed and options the
    /// chosen move is deterministic; without it the seed is time-based.
    pub seed: Option<u64>,
    /// Enable the repetition/contempt/progress root policy.
    pub play_for_win: bool,
    /// Position keys seen recently (e.g. the last few game positions),
    /// used for repetition shaping at the root.
    pub recent_positions: Vec<u64>,
    /// Multiplier on the root repetition penalty. Default 1.0.
    pub repetition_penalty_scale: Option<f64>,
    /// Multiplier on the hard-mode non-repeat tie-break nudge. Default 1.0.
    pub hard_repetition_nudge_scale: Option<f64>,
    /// Base-score window within which a non-repeat alternative bans a
    /// repeat best move. Default 60 cp (hard) / 100 cp (max).
    pub repeat_ban_window_cp: Option<i32>,
    /// Base score below which repetition penalties are waived so the losing
    /// side may steer toward a draw. Default -80 cp.
    pub draw_hold_threshold: Option<i32>,
    /// Penalty for root moves whose forced reply lands in a seen position.
    /// Default 10 cp.
    pub two_ply_repeat_penalty: Option<i32>,
    /// How many root moves get the two-ply simulation. Default 6.
    pub two_ply_repeat_top_n: Option<usize>,
    /// Contempt subtracted from repeat moves when not losing.
    /// Default 10 cp (hard) / 20 cp (max).
    pub contempt_cp: Option<i32>,
    /// Wall-clock budget. Engages iterative deepening for Hard; defaults to
    /// 10 000 ms for Max.
    pub max_time_ms: Option<u64>,
    /// Iterative deepening ceiling. Default 7 for Max.
    pub max_depth: Option<u32>,
    /// Fixed-depth override, bypassing the difficulty's default depth.
    pub depth_override: Option<u32>,
    /// Principal variation search toggle (Max only). Default on.
    pub use_pvs: Option<bool>,
    /// Weight for mixing an NNUE term into evaluation. Accepted for
    /// interface compatibility; this build always evaluates classically.
    pub nnue_mix: Option<f64>,
    /// External cancellation, polled every 64 nodes and between iterations.
    pub stop_requested: Option<StopFn>,
    /// Iteration progress callback.
    pub on_progress: Option<ProgressFn>,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Hard
    }
}

impl fmt::Debug for AiOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiOptions")
            .field("color", &self.color)
            .field("difficulty", &self.difficulty)
            .field("seed", &self.seed)
            .field("play_for_win", &self.play_for_win)
            .field("recent_positions", &self.recent_positions.len())
            .field("max_time_ms", &self.max_time_ms)
            .field("max_depth", &self.max_depth)
            .field("depth_override", &self.depth_override)
            .field("has_stop", &self.stop_requested.is_some())
            .field("has_progress", &self.on_progress.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{AiOptions, Difficulty};

    #[test]
    fn defaults() {
        let opts = AiOptions::default();
        assert_eq!(opts.difficulty, Difficulty::Hard);
        assert!(!opts.play_for_win);
        assert!(opts.seed.is_none());
        assert!(opts.recent_positions.is_empty());
    }

    #[test]
    fn debug_omits_callbacks() {
        let opts = AiOptions::default();
        let s = format!("{opts:?}");
        assert!(s.contains("difficulty"));
        assert!(s.contains("has_stop"));
    }
}
