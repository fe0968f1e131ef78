//! Game termination and draw detection.

use std::fmt;

use crate::color::Color;
use crate::movegen::legal_moves;
use crate::piece::PieceType;
use crate::square::Square;
use crate::state::GameState;

/// Why a game is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    ThreefoldRepetition,
    InsufficientMaterial,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawReason::ThreefoldRepetition => write!(f, "threefold repetition"),
            DrawReason::InsufficientMaterial => write!(f, "insufficient material"),
        }
    }
}

/// Status of the game from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Game continues, side to move is not in check.
    Ongoing,
    /// Game continues, side to move is in check.
    Check,
    /// Side to move is mated; the winner is recorded.
    Checkmate { winner: Color },
    /// Side to move has no legal moves and is not in check.
    Stalemate,
    /// Drawn position.
    Draw(DrawReason),
}

/// Determine the status of the current position.
///
/// The halfmove clock is tracked by the state but the fifty-move rule is
/// deliberately not adjudicated here.
pub fn game_status(state: &GameState) -> GameStatus {
    let to_move = state.active_color();
    let in_check = state.is_in_check(to_move);

    if legal_moves(state, to_move).is_empty() {
        return if in_check {
            GameStatus::Checkmate {
                winner: to_move.flip(),
            }
        } else {
            GameStatus::Stalemate
        };
    }

    if state.repetition_count() >= 3 {
        return GameStatus::Draw(DrawReason::ThreefoldRepetition);
    }

    if is_insufficient_material(state) {
        return GameStatus::Draw(DrawReason::InsufficientMaterial);
    }

    if in_check {
        GameStatus::Check
    } else {
        GameStatus::Ongoing
    }
}

/// The narrow insufficient-material list: K vs K, K+N vs K, K+B vs K, and
/// K+B vs K+B with both bishops on same-colored squares. Other dead
/// positions are not adjudicated.
fn is_insufficient_material(state: &GameState) -> bool {
    let mut non_kings: Vec<(Square, PieceType)> = Vec::new();
    let mut bishops: Vec<Square> = Vec::new();
    let mut bishop_owners: Vec<Color> = Vec::new();

    for (sq, piece) in state.iter_pieces() {
        if piece.kind == PieceType::King {
            continue;
        }
        non_kings.push((sq, piece.kind));
        if piece.kind == PieceType::Bishop {
            bishops.push(sq);
            bishop_owners.push(piece.color);
        }
    }

    match non_kings.as_slice() {
        [] => true,
        [(_, PieceType::Knight)] | [(_, PieceType::Bishop)] => true,
        [(_, PieceType::Bishop), (_, PieceType::Bishop)] => {
            bishop_owners[0] != bishop_owners[1]
                && bishops[0].is_light() == bishops[1].is_light()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{game_status, DrawReason, GameStatus};
    use crate::color::Color;
    use crate::moves::Move;
    use crate::state::GameState;

    fn parse(fen: &str) -> GameState {
        fen.parse().unwrap()
    }

    fn apply(state: &mut GameState, uci: &str) {
        state
            .apply_move(Move::from_uci(uci).unwrap())
            .unwrap_or_else(|e| panic!("{uci}: {e}"));
    }

    #[test]
    fn fresh_game_is_ongoing() {
        let state = GameState::starting_position();
        assert_eq!(game_status(&state), GameStatus::Ongoing);
    }

    #[test]
    fn fools_mate_is_checkmate_for_black() {
        let mut state = GameState::starting_position();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            apply(&mut state, uci);
        }
        assert_eq!(
            game_status(&state),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
    }

    #[test]
    fn scholars_mate_is_checkmate_for_white() {
        let mut state = GameState::starting_position();
        for uci in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
            apply(&mut state, uci);
        }
        assert_eq!(
            game_status(&state),
            GameStatus::Checkmate {
                winner: Color::White
            }
        );
    }

    #[test]
    fn stalemate_detected() {
        // Black to move, king cornered without being in check.
        let state = parse("k7/2Q5/1K6/8/8/8/8/8 b - - 0 1");
        assert_eq!(game_status(&state), GameStatus::Stalemate);
    }

    #[test]
    fn check_reported_when_moves_exist() {
        let state = parse("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1");
        assert_eq!(game_status(&state), GameStatus::Check);
    }

    #[test]
    fn threefold_repetition_with_rook_shuffle() {
        // White Kd4 Ra1, Black Kd6 Ra8. The rook shuffle recreates the
        // initial position; its third occurrence is a draw.
        let mut state = parse("r7/8/3k4/8/3K4/8/8/R7 w - - 0 1");
        let shuffle = ["a1b1", "a8b8", "b1a1", "b8a8"];

        for uci in shuffle {
            apply(&mut state, uci);
        }
        assert_eq!(state.repetition_count(), 2);
        assert_eq!(game_status(&state), GameStatus::Ongoing);

        for uci in shuffle {
            apply(&mut state, uci);
        }
        assert_eq!(state.repetition_count(), 3);
        assert_eq!(
            game_status(&state),
            GameStatus::Draw(DrawReason::ThreefoldRepetition)
        );
    }

    #[test]
    fn bare_kings_are_a_draw() {
        let state = parse("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(
            game_status(&state),
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        );
    }

    #[test]
    fn lone_minor_is_a_draw() {
        for fen in ["4k3/8/8/8/8/8/8/2N1K3 w - - 0 1", "4kb2/8/8/8/8/8/8/4K3 w - - 0 1"] {
            let state = parse(fen);
            assert_eq!(
                game_status(&state),
                GameStatus::Draw(DrawReason::InsufficientMaterial),
                "{fen}"
            );
        }
    }

    #[test]
    fn same_shade_opposing_bishops_draw() {
        // Bishops on c1 (dark) and f4 (dark), one per side.
        let state = parse("4k3/8/8/8/5b2/8/8/2B1K3 w - - 0 1");
        assert_eq!(
            game_status(&state),
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        );
    }

    #[test]
    fn opposite_shade_bishops_not_adjudicated() {
        // Bishops on c1 (dark) and e4 (light): play continues.
        let state = parse("4k3/8/8/8/4b3/8/8/2B1K3 w - - 0 1");
        assert_eq!(game_status(&state), GameStatus::Ongoing);
    }

    #[test]
    fn two_same_side_bishops_not_a_draw() {
        let state = parse("4k3/8/8/8/8/8/8/1BB1K3 w - - 0 1");
        assert_eq!(game_status(&state), GameStatus::Ongoing);
    }

    #[test]
    fn fifty_move_rule_not_enforced() {
        let state = parse("4k3/8/8/8/8/8/4R3/4K3 w - - 120 80");
        assert_eq!(game_status(&state), GameStatus::Ongoing);
    }

    #[test]
    fn rook_endgame_not_insufficient() {
        let state = parse("4k3/8/8/8/8/8/8/3RK3 w - - 0 1");
        assert_eq!(game_status(&state), GameStatus::Ongoing);
    }
}
