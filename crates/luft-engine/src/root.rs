//! Root policy: shape the scored root moves to avoid repetition when ahead,
//! allow it when losing, nudge toward progress, and pick the final move with
//! a seeded RNG.

use std::time::{SystemTime, UNIX_EPOCH};

use luft_core::{legal_moves, Color, GameState, Move, PieceType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::eval::{evaluate, EvalOptions};
use crate::options::AiOptions;
use crate::search::SearchOutcome;

/// Base score floor below which repetition penalties are waived: the losing
/// side may steer for a draw.
const DRAW_HOLD_THRESHOLD: i32 = -80;

/// Base repetition penalty before multipliers.
const REPEAT_PENALTY_BASE: f64 = 15.0;

/// Shaped-score window for the final candidate set.
const TOP_WINDOW: i32 = 10;

/// Kept candidates must also be near the best raw score.
const FAIRNESS_WINDOW: i32 = 25;

/// Defaults for the two-ply anti-loop simulation.
const TWO_PLY_TOP_N: usize = 6;
const TWO_PLY_PENALTY: i32 = 10;

/// The escape rule: with the best alternative this far underwater and
/// repeats this much better, a defensive draw is acceptable.
const ESCAPE_FLOOR: i32 = -200;
const ESCAPE_GAP: i32 = 150;

/// Why the final move was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChosenMoveReason {
    /// A non-repeating move was best outright.
    NonRepeatBest,
    /// The best move repeats and no acceptable alternative was close.
    RepeatBestNoCloseAlt,
    /// A repeat scored best, but a close non-repeat was preferred.
    AvoidRepeatWithinWindow,
    /// Behind the draw-hold threshold; repetition is allowed.
    LosingAllowRepeat,
}

/// Strongest repetition present among the root moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKind {
    None,
    /// Seen recently (or once in the game), not yet near threefold.
    NearRepetition,
    /// Playing it would reach the position's third occurrence.
    Threefold,
}

/// One root move in the diagnostics payload.
#[derive(Debug, Clone, Copy)]
pub struct RootLine {
    pub mv: Move,
    /// Score after policy shaping.
    pub score: i32,
    /// Raw search score.
    pub base_score: i32,
    pub is_repeat: bool,
    pub repeat_count: u32,
}

/// Decision record returned by `choose_move_with_diagnostics`.
#[derive(Debug, Clone)]
pub struct RootDiagnostics {
    /// Top candidates by shaped score, at most five.
    pub top: Vec<RootLine>,
    pub chosen_move_reason: ChosenMoveReason,
    pub best_repeat_kind: RepeatKind,
}

/// A root candidate under policy evaluation.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    mv: Move,
    base_score: i32,
    score: i32,
    /// Occurrences of the post-move position among `recent_positions`.
    repeat_count: u32,
    /// Post-move position seen recently or earlier in this game.
    is_repeat: bool,
    /// Post-move position would be at its third game occurrence.
    threefold: bool,
    gives_check: bool,
}

/// Apply the root policy to a finished search and choose the move.
pub(crate) fn select(
    state: &GameState,
    color: Color,
    opts: &AiOptions,
    outcome: &mut SearchOutcome,
) -> (Move, RootDiagnostics) {
    let max_mode = outcome.max_thinking;
    let hold = opts.draw_hold_threshold.unwrap_or(DRAW_HOLD_THRESHOLD);
    let mode_scale = if max_mode { 2.0 } else { 1.0 };
    let scale = mode_scale * opts.repetition_penalty_scale.unwrap_or(1.0);
    let contempt = opts.contempt_cp.unwrap_or(if max_mode { 20 } else { 10 });
    let ban_window = opts.repeat_ban_window_cp.unwrap_or(if max_mode { 100 } else { 60 });

    let mut candidates = annotate(state, color, opts, outcome);

    if opts.play_for_win {
        progress_bias(&mut candidates, state, hold);
        repetition_penalty(&mut candidates, hold, scale, max_mode);
        two_ply_anti_loop(&mut candidates, state, color, opts, max_mode);
        for candidate in candidates.iter_mut() {
            if candidate.is_repeat && candidate.base_score >= hold {
                candidate.score -= contempt;
            }
        }
    }

    // Windowing: keep near-best shaped scores, then insist the survivors
    // are also close on raw score.
    let best_score = candidates.iter().map(|c| c.score).max().unwrap_or(0);
    let mut kept: Vec<usize> = (0..candidates.len())
        .filter(|&i| {
            if opts.play_for_win {
                candidates[i].score >= best_score - TOP_WINDOW
            } else {
                candidates[i].score == best_score
            }
        })
        .collect();
    let best_kept_base = kept
        .iter()
        .map(|&i| candidates[i].base_score)
        .max()
        .unwrap_or(0);
    kept.retain(|&i| candidates[i].base_score >= best_kept_base - FAIRNESS_WINDOW);

    let mut forced_reason: Option<ChosenMoveReason> = None;

    if opts.play_for_win {
        // Repeat-ban: a repeating best move loses to any decent non-repeat.
        let top = kept
            .iter()
            .copied()
            .max_by_key(|&i| candidates[i].score)
            .expect("kept set is never empty");
        if candidates[top].is_repeat && candidates[top].base_score >= hold {
            let alternative = (0..candidates.len())
                .filter(|&i| !candidates[i].is_repeat)
                .max_by_key(|&i| candidates[i].base_score);
            if let Some(alt) = alternative
                && candidates[alt].base_score >= candidates[top].base_score - ban_window
            {
                debug!(mv = %candidates[alt].mv, "repeat best banned in favor of non-repeat");
                kept = vec![alt];
                forced_reason = Some(ChosenMoveReason::AvoidRepeatWithinWindow);
            }
        }

        // Tie-break: inside the surviving set, prefer non-repeats within a
        // nudge window of a repeating top move.
        if kept.len() > 1 {
            let top = kept
                .iter()
                .copied()
                .max_by_key(|&i| candidates[i].score)
                .expect("kept set is never empty");
            if candidates[top].is_repeat {
                let nudge_scale = opts.hard_repetition_nudge_scale.unwrap_or(1.0);
                let best_repeat = candidates
                    .iter()
                    .filter(|c| c.is_repeat)
                    .max_by_key(|c| c.base_score);
                let nudge = match best_repeat {
                    Some(repeat) if !max_mode && repeat.base_score >= 30 => {
                        10.0 * nudge_scale * if repeat.threefold { 1.5 } else { 1.0 }
                    }
                    _ => 0.0,
                };
                let window = (REPEAT_PENALTY_BASE * mode_scale + nudge).round() as i32;
                let preferred: Vec<usize> = kept
                    .iter()
                    .copied()
                    .filter(|&i| {
                        !candidates[i].is_repeat
                            && candidates[i].base_score >= candidates[top].base_score - window
                    })
                    .collect();
                if !preferred.is_empty() {
                    kept = preferred;
                    forced_reason = Some(ChosenMoveReason::AvoidRepeatWithinWindow);
                }
            }
        }
    }

    let seed = opts.seed.unwrap_or_else(time_seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let chosen_idx = kept[rng.gen_range(0..kept.len())];
    let chosen = candidates[chosen_idx];

    let reason = forced_reason.unwrap_or_else(|| {
        if chosen.is_repeat {
            if chosen.base_score < hold {
                ChosenMoveReason::LosingAllowRepeat
            } else {
                ChosenMoveReason::RepeatBestNoCloseAlt
            }
        } else {
            ChosenMoveReason::NonRepeatBest
        }
    });

    let best_repeat_kind = if candidates.iter().any(|c| c.is_repeat && c.threefold) {
        RepeatKind::Threefold
    } else if candidates.iter().any(|c| c.is_repeat) {
        RepeatKind::NearRepetition
    } else {
        RepeatKind::None
    };

    let mut by_score: Vec<&Candidate> = candidates.iter().collect();
    by_score.sort_by(|a, b| b.score.cmp(&a.score));
    let top = by_score
        .into_iter()
        .take(5)
        .map(|c| RootLine {
            mv: c.mv,
            score: c.score,
            base_score: c.base_score,
            is_repeat: c.is_repeat,
            repeat_count: c.repeat_count,
        })
        .collect();

    outcome.store_root(state.position_key(), chosen.score, chosen.mv);
    debug!(mv = %chosen.mv, score = chosen.score, base = chosen.base_score, ?reason, "root choice");

    (
        chosen.mv,
        RootDiagnostics {
            top,
            chosen_move_reason: reason,
            best_repeat_kind,
        },
    )
}

/// Annotate each scored root move with its repetition facts.
fn annotate(
    state: &GameState,
    color: Color,
    opts: &AiOptions,
    outcome: &SearchOutcome,
) -> Vec<Candidate> {
    let mut work = state.clone();
    outcome
        .candidates
        .iter()
        .map(|root| {
            let undo = work.make_move(root.mv);
            let post_key = work.position_key();
            let gives_check = work.is_in_check(color.flip());
            work.unmake_move(undo);

            let repeat_count = opts
                .recent_positions
                .iter()
                .filter(|&&key| key == post_key)
                .count() as u32;
            let game_count = state.position_count(post_key);

            Candidate {
                mv: root.mv,
                base_score: root.score,
                score: root.score,
                repeat_count,
                is_repeat: repeat_count > 0 || game_count >= 1,
                threefold: game_count >= 2,
                gives_check,
            }
        })
        .collect()
}

/// Small bonuses for moves that make progress, applied only when not worse
/// than the draw-hold threshold and only to non-forcing moves.
fn progress_bias(candidates: &mut [Candidate], state: &GameState, hold: i32) {
    let fullmove = state.fullmove_number();
    for candidate in candidates.iter_mut() {
        if candidate.base_score < hold {
            continue;
        }
        let mv = candidate.mv;
        if mv.is_capture() || mv.is_promotion() || candidate.gives_check {
            continue;
        }
        let Some(mover) = state.piece_at(mv.from) else {
            continue;
        };

        let mut bias = 0;
        if mover.kind.is_minor()
            && !mover.has_moved
            && mv.from.rank() == mover.color.back_rank()
            && fullmove <= 12
        {
            bias += 6;
        }
        if mv.is_castle {
            bias += 8;
        }
        if mover.kind == PieceType::King
            && !mv.is_castle
            && (3..=4).contains(&mv.from.file())
            && !(3..=4).contains(&mv.to.file())
        {
            bias += 4;
        }
        if mover.kind == PieceType::Pawn {
            bias += 3;
            let advanced = match mover.color {
                Color::White => mv.to.rank() >= 4,
                Color::Black => mv.to.rank() <= 3,
            };
            if advanced {
                bias += 3;
            }
        }
        if mover.kind == PieceType::Rook && candidate.repeat_count > 0 {
            bias -= 6;
        }

        candidate.score += bias;
    }
}

/// Penalize repeating moves in proportion to how far ahead we are and how
/// often the position has come around.
fn repetition_penalty(candidates: &mut [Candidate], hold: i32, scale: f64, max_mode: bool) {
    let best_non_repeat = candidates
        .iter()
        .filter(|c| !c.is_repeat)
        .map(|c| c.base_score)
        .max();
    let best_repeat = candidates
        .iter()
        .filter(|c| c.is_repeat)
        .map(|c| c.base_score)
        .max();

    // Escape rule: when every real alternative is lost and repeating is far
    // better, let the defense hold the draw unpunished.
    if let (Some(alternative), Some(repeat)) = (best_non_repeat, best_repeat)
        && alternative <= ESCAPE_FLOOR
        && repeat - alternative >= ESCAPE_GAP
    {
        debug!(alternative, repeat, "repetition penalty waived for defensive draw");
        return;
    }

    for candidate in candidates.iter_mut() {
        if !candidate.is_repeat || candidate.base_score < hold {
            continue;
        }
        let advantage = if candidate.base_score >= 120 {
            3.0
        } else if candidate.base_score >= 20 {
            1.0
        } else if candidate.base_score > -120 {
            0.5
        } else {
            0.0
        };
        let repeat_mult = if candidate.repeat_count >= 2 {
            4.0
        } else if candidate.repeat_count == 1 {
            2.2
        } else {
            1.0
        };
        let mut penalty = REPEAT_PENALTY_BASE * scale * advantage * repeat_mult;
        if max_mode && candidate.repeat_count >= 2 {
            penalty *= 1.5;
        }
        candidate.score -= penalty.round() as i32;
    }
}

/// For the strongest few candidates, look one reply ahead: if the
/// opponent's best answer lands in a position we have already seen, the
/// move is quietly steering into a loop.
fn two_ply_anti_loop(
    candidates: &mut [Candidate],
    state: &GameState,
    color: Color,
    opts: &AiOptions,
    max_mode: bool,
) {
    let top_n = opts.two_ply_repeat_top_n.unwrap_or(TWO_PLY_TOP_N);
    let penalty = opts.two_ply_repeat_penalty.unwrap_or(TWO_PLY_PENALTY);
    let eval_opts = EvalOptions {
        max_thinking: max_mode,
    };

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| candidates[b].score.cmp(&candidates[a].score));

    let mut work = state.clone();
    for &idx in order.iter().take(top_n) {
        let undo = work.make_move(candidates[idx].mv);

        let mut worst: Option<(i32, u64)> = None;
        let replies = legal_moves(&work, work.active_color());
        for reply in replies {
            let reply_undo = work.make_move(reply);
            let value = evaluate(&work, color, &eval_opts);
            let key = work.position_key();
            work.unmake_move(reply_undo);
            if worst.is_none_or(|(w, _)| value < w) {
                worst = Some((value, key));
            }
        }
        work.unmake_move(undo);

        let Some((_, reply_key)) = worst else {
            continue;
        };
        let seen = opts.recent_positions.contains(&reply_key)
            || state.position_count(reply_key) >= 1;
        if seen {
            let mult = if candidates[idx].repeat_count >= 2 { 1.5 } else { 1.0 }
                * if max_mode { 1.2 } else { 1.0 };
            candidates[idx].score -= (penalty as f64 * mult).round() as i32;
        }
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9e37_79b9_7f4a_7c15)
}
