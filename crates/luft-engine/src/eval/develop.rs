//! Development pacing: the early-queen penalty (deep mode only).

use luft_core::{Color, GameState, PieceType, Square};

/// Full penalty for a queen out before the minor pieces.
const EARLY_QUEEN_PENALTY: f64 = 25.0;

/// Count minors that have left the back rank.
pub(crate) fn developed_minors(state: &GameState, color: Color) -> usize {
    state
        .pieces_of(color)
        .filter(|(sq, p)| p.kind.is_minor() && sq.rank() != color.back_rank())
        .count()
}

/// Early-queen penalty, White-centric: a queen off its start square with
/// fewer than two minors developed is a tempo sink. Fades to zero by
/// fullmove 10.
pub(crate) fn early_queen(state: &GameState, fullmove: u32) -> i32 {
    let fade = (1.0 - (fullmove as f64 - 1.0) / 9.0).clamp(0.0, 1.0);
    if fade == 0.0 {
        return 0;
    }

    let mut total = 0.0;
    for color in Color::ALL {
        let home = Square::new(3, color.back_rank());
        let queen_out = state
            .pieces_of(color)
            .any(|(sq, p)| p.kind == PieceType::Queen && sq != home);
        if queen_out && developed_minors(state, color) < 2 {
            let signed = EARLY_QUEEN_PENALTY * fade;
            match color {
                Color::White => total -= signed,
                Color::Black => total += signed,
            }
        }
    }
    total as i32
}

#[cfg(test)]
mod tests {
    use super::{developed_minors, early_queen};
    use luft_core::{Color, GameState};

    fn parse(fen: &str) -> GameState {
        fen.parse().unwrap()
    }

    #[test]
    fn counts_developed_minors() {
        let state = parse("rnbqkbnr/pppppppp/8/8/8/2N2N2/PPPPPPPP/R1BQKB1R w KQkq - 0 3");
        assert_eq!(developed_minors(&state, Color::White), 2);
        assert_eq!(developed_minors(&state, Color::Black), 0);
    }

    #[test]
    fn premature_queen_is_penalized() {
        // Wayward-queen attack: Qh5 on move 2, no minors out.
        let state = parse("rnbqkbnr/pppp1ppp/8/4p2Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 1 2");
        assert!(early_queen(&state, 2) < 0);
    }

    #[test]
    fn queen_out_with_development_is_fine() {
        let state = parse("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 w kq - 4 4");
        assert_eq!(early_queen(&state, 4), 0);
    }

    #[test]
    fn penalty_fades_by_fullmove_ten() {
        let state = parse("rnbqkbnr/pppp1ppp/8/4p2Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 1 2");
        assert!(early_queen(&state, 2) < early_queen(&state, 6));
        assert_eq!(early_queen(&state, 10), 0);
        assert_eq!(early_queen(&state, 30), 0);
    }
}
