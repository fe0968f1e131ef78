//! Perft — exhaustive move-path counting for movegen validation.

use crate::movegen::legal_moves;
use crate::moves::Move;
use crate::state::GameState;

/// Count all leaf nodes of the legal move tree to the given depth.
pub fn perft(state: &GameState, depth: u32) -> u64 {
    let mut work = state.clone();
    perft_inner(&mut work, depth)
}

fn perft_inner(state: &mut GameState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(state, state.active_color());
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves {
        let undo = state.make_move(mv);
        nodes += perft_inner(state, depth - 1);
        state.unmake_move(undo);
    }
    nodes
}

/// Perft split by root move, for debugging movegen discrepancies.
pub fn divide(state: &GameState, depth: u32) -> Vec<(Move, u64)> {
    let mut work = state.clone();
    let moves = legal_moves(&work, work.active_color());
    let mut result = Vec::with_capacity(moves.len());
    for mv in moves {
        let undo = work.make_move(mv);
        let nodes = if depth <= 1 {
            1
        } else {
            perft_inner(&mut work, depth - 1)
        };
        work.unmake_move(undo);
        result.push((mv, nodes));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{divide, perft};
    use crate::state::GameState;

    #[test]
    fn perft_starting_position() {
        let state = GameState::starting_position();
        assert_eq!(perft(&state, 1), 20);
        assert_eq!(perft(&state, 2), 400);
        assert_eq!(perft(&state, 3), 8_902);
        assert_eq!(perft(&state, 4), 197_281);
    }

    #[test]
    fn perft_kiwipete() {
        // Position 2 from the CPW perft suite: castling, EP, promotions.
        let state: GameState =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
                .parse()
                .unwrap();
        assert_eq!(perft(&state, 1), 48);
        assert_eq!(perft(&state, 2), 2_039);
        assert_eq!(perft(&state, 3), 97_862);
    }

    #[test]
    fn perft_en_passant_pins() {
        // Position 3 from the CPW perft suite.
        let state: GameState = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1".parse().unwrap();
        assert_eq!(perft(&state, 1), 14);
        assert_eq!(perft(&state, 2), 191);
        assert_eq!(perft(&state, 3), 2_812);
        assert_eq!(perft(&state, 4), 43_238);
    }

    #[test]
    fn perft_promotion_heavy() {
        // Position 5 from the CPW perft suite.
        let state: GameState = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8"
            .parse()
            .unwrap();
        assert_eq!(perft(&state, 1), 44);
        assert_eq!(perft(&state, 2), 1_486);
        assert_eq!(perft(&state, 3), 62_379);
    }

    #[test]
    fn divide_sums_to_perft() {
        let state = GameState::starting_position();
        let split = divide(&state, 3);
        let total: u64 = split.iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&state, 3));
    }
}
