//! Move ordering.
//!
//! Each candidate gets a summed score and the list is sorted descending.
//! The sort is stable, so equal scores keep generation order and the search
//! stays deterministic.

use luft_core::{is_square_attacked, GameState, Move, PieceType};

use crate::search::heuristics::{CounterMoveTable, HistoryTable, KillerTable};
use crate::search::see::{is_hanging, lands_hanging, see_lite};

/// Ordering inputs threaded from the search node.
pub(crate) struct OrderingInputs<'a> {
    pub tt_move: Option<Move>,
    pub killers: &'a KillerTable,
    pub history: &'a HistoryTable,
    pub counters: &'a CounterMoveTable,
    /// The opponent's previous move, for the countermove lookup.
    pub prev_move: Option<Move>,
    pub ply: u32,
    pub max_thinking: bool,
}

/// History contribution caps: quiet-move history may help ordering but must
/// not drown out tactics.
const HISTORY_CAP_MAX: i32 = 1000;
const HISTORY_CAP_HARD: i32 = 250;

/// Sort `moves` best-first for the side to move.
pub(crate) fn order_moves(state: &mut GameState, moves: &mut [Move], inputs: &OrderingInputs<'_>) {
    let side = state.active_color();
    let in_check = state.is_in_check(side);

    let mut scored: Vec<(i32, Move)> = moves
        .iter()
        .map(|&mv| (score_move(state, mv, inputs, in_check), mv))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    for (slot, (_, mv)) in moves.iter_mut().zip(scored) {
        *slot = mv;
    }
}

/// Score one candidate move. Higher is searched earlier.
fn score_move(
    state: &mut GameState,
    mv: Move,
    inputs: &OrderingInputs<'_>,
    in_check: bool,
) -> i32 {
    let mover = match state.piece_at(mv.from) {
        Some(p) => p,
        None => return 0,
    };
    let mut score = 0i32;

    if inputs.tt_move == Some(mv) {
        score += 100_000;
    }

    if let Some(victim_id) = mv.captured_id {
        let victim_value = state
            .piece(victim_id)
            .map_or(PieceType::Pawn.value(), |p| p.kind.value());
        score += if inputs.max_thinking {
            victim_value * 10 - mover.kind.value()
        } else {
            victim_value
        };

        let net = see_lite(state, mv);
        if net <= -200 {
            score -= 400 + net.abs();
        }
    }

    // Checking moves are judged on the post-move position.
    let undo = state.make_move(mv);
    let gives_check = state.is_in_check(mover.color.flip());
    let safe_check = gives_check && !is_hanging(state, mv.to, mover.color);
    state.unmake_move(undo);

    if safe_check {
        score += if inputs.max_thinking { 60 } else { 40 };
    }

    // First developing move of a minor piece in the first few fullmoves.
    if mover.kind.is_minor()
        && !mover.has_moved
        && mv.from.rank() == mover.color.back_rank()
        && (1..=4).contains(&state.fullmove_number())
    {
        score += 15;
    }

    if lands_hanging(state, mv) {
        score -= mover.kind.value() * 3 / 4;
    }

    if let Some(kind) = mv.promotion {
        score += kind.value() - PieceType::Pawn.value();
    }

    let quiet = !mv.is_capture() && !mv.is_promotion();
    if quiet {
        if inputs.max_thinking {
            score += inputs.killers.bonus(inputs.ply, mv);
            if let Some(prev) = inputs.prev_move
                && inputs.counters.get(prev) == Some(mv)
            {
                score += 900;
            }
        }
        let cap = if inputs.max_thinking {
            HISTORY_CAP_MAX
        } else {
            HISTORY_CAP_HARD
        };
        score += inputs.history.score(mv).min(cap);
    }

    // Evasion ordering: legality already filtered suicidal moves, this block
    // only ranks the surviving ways out of check.
    if in_check {
        if mv.is_capture() {
            score += 2000;
        } else if mover.kind == PieceType::King {
            score += if is_square_attacked(state, mv.to, mover.color.flip()) {
                -800
            } else {
                -200
            };
        } else {
            score += 1000;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::{order_moves, OrderingInputs};
    use crate::search::heuristics::{CounterMoveTable, HistoryTable, KillerTable};
    use luft_core::{legal_moves, GameState, Move, PieceType, Square};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn plain_inputs<'a>(
        killers: &'a KillerTable,
        history: &'a HistoryTable,
        counters: &'a CounterMoveTable,
        max_thinking: bool,
    ) -> OrderingInputs<'a> {
        OrderingInputs {
            tt_move: None,
            killers,
            history,
            counters,
            prev_move: None,
            ply: 0,
            max_thinking,
        }
    }

    fn ordered(fen: &str, inputs: &OrderingInputs<'_>) -> Vec<Move> {
        let mut state: GameState = fen.parse().unwrap();
        let mut moves = legal_moves(&state, state.active_color());
        order_moves(&mut state, &mut moves, inputs);
        moves
    }

    #[test]
    fn tt_move_comes_first() {
        let killers = KillerTable::new();
        let history = HistoryTable::new();
        let counters = CounterMoveTable::new();
        let mut inputs = plain_inputs(&killers, &history, &counters, true);
        inputs.tt_move = Some(Move::new(sq("a2"), sq("a3")));

        let moves = ordered(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &inputs,
        );
        assert_eq!(moves[0], Move::new(sq("a2"), sq("a3")));
    }

    #[test]
    fn winning_capture_before_quiet_moves() {
        let killers = KillerTable::new();
        let history = HistoryTable::new();
        let counters = CounterMoveTable::new();
        let inputs = plain_inputs(&killers, &history, &counters, false);

        // White pawn can take an undefended knight.
        let moves = ordered("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1", &inputs);
        assert!(moves[0].is_capture(), "capture should be tried first");
        assert_eq!(moves[0].to, sq("d5"));
    }

    #[test]
    fn losing_capture_ranked_below_quiet() {
        let killers = KillerTable::new();
        let history = HistoryTable::new();
        let counters = CounterMoveTable::new();
        let inputs = plain_inputs(&killers, &history, &counters, false);

        // Queen takes a defended pawn: SEE-lite penalty should sink it.
        let moves = ordered("4k3/8/3p4/2p5/8/4Q3/8/4K3 w - - 0 1", &inputs);
        let qxc5 = moves
            .iter()
            .position(|m| m.to == sq("c5") && m.is_capture())
            .unwrap();
        assert!(qxc5 > moves.len() / 2, "losing capture should order late");
    }

    #[test]
    fn killer_outranks_plain_quiet_in_max_mode() {
        let mut killers = KillerTable::new();
        let history = HistoryTable::new();
        let counters = CounterMoveTable::new();
        let killer = Move::new(sq("h2"), sq("h3"));
        killers.store(0, killer);
        let inputs = plain_inputs(&killers, &history, &counters, true);

        let moves = ordered(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &inputs,
        );
        assert_eq!(moves[0], killer);
    }

    #[test]
    fn capture_evasions_lead_when_in_check() {
        let killers = KillerTable::new();
        let history = HistoryTable::new();
        let counters = CounterMoveTable::new();
        let inputs = plain_inputs(&killers, &history, &counters, false);

        // Rook gives check on e2; it can be captured, blocked, or dodged.
        let moves = ordered("4k3/8/8/8/8/8/3Qr3/4K3 w - - 0 1", &inputs);
        assert!(
            moves[0].is_capture(),
            "capturing the checker should come first, got {:?}",
            moves[0]
        );
    }

    #[test]
    fn promotion_ranked_by_piece_value() {
        let killers = KillerTable::new();
        let history = HistoryTable::new();
        let counters = CounterMoveTable::new();
        let inputs = plain_inputs(&killers, &history, &counters, false);

        let moves = ordered("7k/P7/8/8/8/8/8/4K3 w - - 0 1", &inputs);
        let promos: Vec<_> = moves.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos[0].promotion, Some(PieceType::Queen));
    }
}
