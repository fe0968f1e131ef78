//! Search driver: difficulty mapping, iterative deepening, aspiration
//! windows, and the always-answer fallback.

pub(crate) mod alphabeta;
pub mod control;
pub(crate) mod heuristics;
pub mod metrics;
pub(crate) mod ordering;
pub(crate) mod quiesce;
pub(crate) mod see;
pub(crate) mod tt;

use luft_core::{legal_moves, Color, GameState, Move};
use tracing::debug;

use crate::eval::EvalOptions;
use crate::options::{AiOptions, Difficulty, SearchProgress};
use alphabeta::{alphabeta, SearchContext, INF};
use control::SearchControl;
use heuristics::{CounterMoveTable, HistoryTable, KillerTable};
use metrics::{SearchMetrics, StopReason};
use tt::{TransTable, TtEntry};

/// Initial aspiration half-window in centipawns.
const ASPIRATION_WINDOW: i32 = 35;

/// Aspiration retries before falling back to a full window.
const ASPIRATION_RETRIES: u32 = 3;

/// A root move with its search score.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RootScore {
    pub mv: Move,
    pub score: i32,
}

/// Everything the root policy needs from a finished search.
pub(crate) struct SearchOutcome {
    /// Every root move, scored at the deepest completed iteration.
    pub candidates: Vec<RootScore>,
    pub depth_completed: u32,
    pub max_thinking: bool,
    pub metrics: SearchMetrics,
    /// Kept alive so the root policy can store its exact entry.
    pub tt: TransTable,
}

impl SearchOutcome {
    /// Record the root decision in the transposition table.
    pub fn store_root(&mut self, key: u64, score: i32, mv: Move) {
        self.tt.store(
            key,
            TtEntry {
                depth: self.depth_completed,
                score,
                flag: tt::Flag::Exact,
                best_move: Some(mv),
            },
        );
    }
}

/// Resolved search policy for one request.
struct Mode {
    depth: u32,
    time: Option<u64>,
    max_thinking: bool,
    micro_q: u32,
    use_tt: bool,
    bounded_tt: bool,
    use_pvs: bool,
    aspiration: bool,
}

impl Mode {
    fn resolve(opts: &AiOptions) -> Mode {
        let mut mode = match opts.difficulty {
            Difficulty::Easy => Mode {
                depth: 1,
                time: opts.max_time_ms,
                max_thinking: false,
                micro_q: 0,
                use_tt: false,
                bounded_tt: false,
                use_pvs: false,
                aspiration: false,
            },
            Difficulty::Medium => Mode {
                depth: 2,
                time: opts.max_time_ms,
                max_thinking: false,
                micro_q: 0,
                use_tt: false,
                bounded_tt: false,
                use_pvs: false,
                aspiration: false,
            },
            Difficulty::Hard => Mode {
                depth: 3,
                time: opts.max_time_ms,
                max_thinking: false,
                micro_q: 2,
                use_tt: true,
                bounded_tt: true,
                use_pvs: false,
                aspiration: false,
            },
            Difficulty::Max => Mode {
                depth: opts.max_depth.unwrap_or(7),
                time: Some(opts.max_time_ms.unwrap_or(10_000)),
                max_thinking: true,
                micro_q: 0,
                use_tt: true,
                bounded_tt: false,
                use_pvs: opts.use_pvs.unwrap_or(true),
                aspiration: true,
            },
        };
        if let Some(depth) = opts.depth_override {
            mode.depth = depth.max(1);
        }
        mode
    }

    fn fresh_table(&self) -> TransTable {
        if self.bounded_tt {
            TransTable::bounded()
        } else {
            TransTable::unbounded()
        }
    }
}

/// Run the search configured by `opts` and score every root move.
///
/// Always produces at least a depth-1 result: if the clock or the stop
/// predicate preempts everything else, a final unclocked depth-1 pass runs.
pub(crate) fn run(state: &GameState, color: Color, opts: &AiOptions) -> SearchOutcome {
    let mode = Mode::resolve(opts);
    let control = SearchControl::new(mode.time, opts.stop_requested.clone());
    let mut work = state.clone();

    let mut ctx = SearchContext {
        maximizing: color,
        max_thinking: mode.max_thinking,
        micro_q_depth: mode.micro_q,
        use_pvs: mode.use_pvs,
        use_tt: mode.use_tt,
        eval_opts: EvalOptions {
            max_thinking: mode.max_thinking,
        },
        tt: mode.fresh_table(),
        killers: KillerTable::new(),
        history: HistoryTable::new(),
        counters: CounterMoveTable::new(),
        control: &control,
        nodes: 0,
        cutoffs: 0,
    };

    let (completed, depth_completed) = if mode.time.is_some() {
        deepening_loop(&mut work, &mode, opts, &mut ctx)
    } else {
        fixed_depth(&mut work, &mode, &mut ctx)
    };

    let mut nodes = ctx.nodes;
    let mut cutoffs = ctx.cutoffs;
    let mut table = ctx.tt;

    // Nothing completed under the budget: one unclocked depth-1 pass so a
    // move always comes back.
    let mut fallback_used = false;
    let (candidates, depth_completed) = match completed {
        Some(candidates) => (candidates, depth_completed),
        None => {
            fallback_used = true;
            let fallback_control = SearchControl::new(None, None);
            let mut fallback_ctx = SearchContext {
                maximizing: color,
                max_thinking: mode.max_thinking,
                micro_q_depth: mode.micro_q,
                use_pvs: mode.use_pvs,
                use_tt: mode.use_tt,
                eval_opts: EvalOptions {
                    max_thinking: mode.max_thinking,
                },
                tt: table,
                killers: KillerTable::new(),
                history: HistoryTable::new(),
                counters: CounterMoveTable::new(),
                control: &fallback_control,
                nodes: 0,
                cutoffs: 0,
            };
            let candidates = score_root(&mut work, 1, -INF, INF, &mut fallback_ctx);
            nodes += fallback_ctx.nodes;
            cutoffs += fallback_ctx.cutoffs;
            table = fallback_ctx.tt;
            (candidates, 1)
        }
    };

    let duration = control.elapsed();
    let duration_ms = duration.as_millis() as u64;
    let secs = duration.as_secs_f64();
    let nps = if secs > 0.0 {
        (nodes as f64 / secs) as u64
    } else {
        0
    };
    let stop_reason = match control.reason() {
        StopReason::None => StopReason::Completed,
        other => other,
    };

    SearchOutcome {
        candidates,
        depth_completed,
        max_thinking: mode.max_thinking,
        metrics: SearchMetrics {
            nodes,
            cutoffs,
            depth_completed,
            duration_ms,
            nps,
            fallback_used,
            soft_stop_used: control.soft_stop_used(),
            hard_stop_used: control.hard_stop_used(),
            stop_reason,
        },
        tt: table,
    }
}

/// Iterative deepening under a clock. Returns the deepest fully completed
/// iteration's root scores.
fn deepening_loop(
    work: &mut GameState,
    mode: &Mode,
    opts: &AiOptions,
    ctx: &mut SearchContext<'_>,
) -> (Option<Vec<RootScore>>, u32) {
    let mut completed: Option<Vec<RootScore>> = None;
    let mut completed_depth = 0;
    let mut prev_best: Option<i32> = None;

    for depth in 1..=mode.depth {
        if ctx.control.should_stop_now() {
            break;
        }
        if depth > 1 {
            ctx.history.decay();
        }

        let scores = match prev_best {
            Some(prev) if mode.aspiration && depth > 1 => {
                aspiration_scores(work, depth, prev, ctx)
            }
            _ => score_root(work, depth, -INF, INF, ctx),
        };

        // A mid-iteration stop leaves partially scored roots; discard them
        // and keep the previous completed depth.
        if ctx.control.stopped() {
            break;
        }

        let best = scores
            .iter()
            .max_by_key(|r| r.score)
            .copied()
            .expect("a non-terminal position has root moves");
        debug!(depth, score = best.score, mv = %best.mv, nodes = ctx.nodes, "completed iteration");
        if let Some(on_progress) = &opts.on_progress {
            on_progress(SearchProgress {
                depth,
                mv: best.mv,
                score: best.score,
            });
        }

        prev_best = Some(best.score);
        completed = Some(scores);
        completed_depth = depth;
    }

    (completed, completed_depth)
}

/// One fixed-depth pass; `None` when interrupted before finishing.
fn fixed_depth(
    work: &mut GameState,
    mode: &Mode,
    ctx: &mut SearchContext<'_>,
) -> (Option<Vec<RootScore>>, u32) {
    let scores = score_root(work, mode.depth, -INF, INF, ctx);
    if ctx.control.stopped() || scores.is_empty() {
        (None, 0)
    } else {
        let depth = mode.depth;
        (Some(scores), depth)
    }
}

/// Aspiration search around the previous iteration's best score: start with
/// a ±35 cp window, double it on fail-high/fail-low, give up into a full
/// window after three tries.
fn aspiration_scores(
    work: &mut GameState,
    depth: u32,
    prev_best: i32,
    ctx: &mut SearchContext<'_>,
) -> Vec<RootScore> {
    let mut window = ASPIRATION_WINDOW;
    for _ in 0..ASPIRATION_RETRIES {
        let (alpha, beta) = (prev_best - window, prev_best + window);
        let scores = score_root(work, depth, alpha, beta, ctx);
        if ctx.control.stopped() {
            return scores;
        }
        let best = scores.iter().map(|r| r.score).max().unwrap_or(0);
        if best > alpha && best < beta {
            return scores;
        }
        debug!(depth, best, window, "aspiration window failed, widening");
        window *= 2;
    }
    score_root(work, depth, -INF, INF, ctx)
}

/// Score every root move for the maximizing color against `[alpha, beta]`.
///
/// Each move gets the same window, so sibling scores stay comparable for
/// the root policy instead of collapsing into bounds.
fn score_root(
    work: &mut GameState,
    depth: u32,
    alpha: i32,
    beta: i32,
    ctx: &mut SearchContext<'_>,
) -> Vec<RootScore> {
    let moves = legal_moves(work, ctx.maximizing);
    let mut out = Vec::with_capacity(moves.len());
    for mv in moves {
        if ctx.control.stopped() {
            break;
        }
        let undo = work.make_move(mv);
        let score = alphabeta(work, depth - 1, alpha, beta, 1, 0, ctx);
        work.unmake_move(undo);
        out.push(RootScore { mv, score });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{run, Mode};
    use crate::options::{AiOptions, Difficulty};
    use luft_core::{Color, GameState};

    fn opts(difficulty: Difficulty) -> AiOptions {
        AiOptions {
            difficulty,
            seed: Some(7),
            ..AiOptions::default()
        }
    }

    #[test]
    fn difficulty_mapping() {
        let easy = Mode::resolve(&opts(Difficulty::Easy));
        assert_eq!(easy.depth, 1);
        assert!(!easy.use_tt);

        let hard = Mode::resolve(&opts(Difficulty::Hard));
        assert_eq!(hard.depth, 3);
        assert!(hard.use_tt && hard.bounded_tt);
        assert_eq!(hard.micro_q, 2);

        let max = Mode::resolve(&opts(Difficulty::Max));
        assert_eq!(max.depth, 7);
        assert_eq!(max.time, Some(10_000));
        assert!(max.max_thinking && max.aspiration && max.use_pvs);
    }

    #[test]
    fn depth_override_wins() {
        let mut options = opts(Difficulty::Hard);
        options.depth_override = Some(2);
        assert_eq!(Mode::resolve(&options).depth, 2);
    }

    #[test]
    fn scores_every_root_move() {
        let state = GameState::starting_position();
        let outcome = run(&state, Color::White, &opts(Difficulty::Easy));
        assert_eq!(outcome.candidates.len(), 20);
        assert_eq!(outcome.depth_completed, 1);
        assert!(outcome.metrics.nodes > 0);
    }

    #[test]
    fn finds_mate_in_one_at_medium() {
        // Scholar's mate is available: Qxf7#.
        let state: GameState =
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
                .parse()
                .unwrap();
        let outcome = run(&state, Color::White, &opts(Difficulty::Medium));
        let best = outcome
            .candidates
            .iter()
            .max_by_key(|r| r.score)
            .unwrap();
        assert_eq!(best.mv.to_uci(), "h5f7");
        assert!(best.score > 19_000, "mate score expected, got {}", best.score);
    }

    #[test]
    fn zero_time_budget_still_produces_scores() {
        let state = GameState::starting_position();
        let mut options = opts(Difficulty::Hard);
        options.max_time_ms = Some(0);
        let outcome = run(&state, Color::White, &options);
        assert!(!outcome.candidates.is_empty());
        assert!(outcome.metrics.fallback_used);
        assert_eq!(outcome.depth_completed, 1);
    }
}
