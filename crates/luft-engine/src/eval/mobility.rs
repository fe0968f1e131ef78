//! Mobility: legal move counts, not pseudo-legal.
//!
//! Counting legal moves is what makes pins and absolute forks show up in the
//! score; the extra cost is accepted.

use luft_core::{legal_moves, Color, GameState};

/// Mobility difference `(white - black) * 2` in centipawns.
pub(crate) fn balance(state: &GameState) -> i32 {
    let white = legal_moves(state, Color::White).len() as i32;
    let black = legal_moves(state, Color::Black).len() as i32;
    (white - black) * 2
}

#[cfg(test)]
mod tests {
    use super::balance;
    use luft_core::GameState;

    #[test]
    fn starting_position_mobility_even() {
        let state = GameState::starting_position();
        assert_eq!(balance(&state), 0);
    }

    #[test]
    fn developed_side_has_more_mobility() {
        // White has played e4 and Nf3; Black has only shuffled the a-pawn.
        let state: GameState = "rnbqkbnr/1ppppppp/p7/8/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 0 3"
            .parse()
            .unwrap();
        assert!(balance(&state) > 0);
    }

    #[test]
    fn pinned_pieces_reduce_mobility() {
        // The knight on e2 is pinned and contributes no moves.
        let pinned: GameState = "4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1".parse().unwrap();
        let free: GameState = "7k/8/8/8/8/8/4N3/4K3 w - - 0 1".parse().unwrap();
        assert!(balance(&pinned) < balance(&free));
    }
}
