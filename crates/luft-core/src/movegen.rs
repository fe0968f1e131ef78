//! Legal move generation.
//!
//! Generation runs in two layers: pseudo-legal enumeration per piece
//! (movement patterns, blockers, pawn specials, castling geometry), then a
//! legality filter that plays each candidate on a scratch copy and rejects
//! any move leaving the mover's king attacked. Castling paths are checked
//! for attacks during generation, since the filter only sees the king's
//! final square.

use crate::attacks::{
    is_square_attacked, BISHOP_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRS,
};
use crate::castling::CastleSide;
use crate::color::Color;
use crate::moves::Move;
use crate::piece::PieceType;
use crate::square::Square;
use crate::state::GameState;

/// Generate all legal moves for the given color.
///
/// The color does not have to be the side to move: evaluation measures both
/// sides' mobility. For the non-active color the en passant target is not
/// available (it belongs to the side to move), and legality is judged as if
/// it were that color's turn.
pub fn legal_moves(state: &GameState, color: Color) -> Vec<Move> {
    let mut pseudo = Vec::with_capacity(48);
    pseudo_moves(state, color, &mut pseudo);

    let mut work = state.fork();
    pseudo
        .into_iter()
        .filter(|&mv| {
            let undo = work.make_move(mv);
            let safe = !work.is_in_check(color);
            work.unmake_move(undo);
            safe
        })
        .collect()
}

/// Generate the legal moves of the piece standing on `from`, if any.
pub fn legal_moves_from(state: &GameState, from: Square) -> Vec<Move> {
    match state.piece_at(from) {
        Some(piece) => legal_moves(state, piece.color)
            .into_iter()
            .filter(|mv| mv.from == from)
            .collect(),
        None => Vec::new(),
    }
}

/// Enumerate pseudo-legal moves for `color` into `out`.
pub(crate) fn pseudo_moves(state: &GameState, color: Color, out: &mut Vec<Move>) {
    for (sq, piece) in state.pieces_of(color) {
        match piece.kind {
            PieceType::Pawn => gen_pawn(state, color, sq, out),
            PieceType::Knight => gen_leaper(state, color, sq, &KNIGHT_OFFSETS, out),
            PieceType::Bishop => gen_slider(state, color, sq, &BISHOP_DIRS, out),
            PieceType::Rook => gen_slider(state, color, sq, &ROOK_DIRS, out),
            PieceType::Queen => {
                gen_slider(state, color, sq, &ROOK_DIRS, out);
                gen_slider(state, color, sq, &BISHOP_DIRS, out);
            }
            PieceType::King => {
                gen_leaper(state, color, sq, &KING_OFFSETS, out);
                gen_castles(state, color, sq, out);
            }
        }
    }
}

fn gen_leaper(
    state: &GameState,
    color: Color,
    from: Square,
    offsets: &[(i8, i8)],
    out: &mut Vec<Move>,
) {
    for &(df, dr) in offsets {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        match state.piece_at(to) {
            None => out.push(Move::new(from, to)),
            Some(p) if p.color != color => out.push(Move::capture(from, to, p.id)),
            Some(_) => {}
        }
    }
}

fn gen_slider(
    state: &GameState,
    color: Color,
    from: Square,
    dirs: &[(i8, i8)],
    out: &mut Vec<Move>,
) {
    for &(df, dr) in dirs {
        let mut current = from;
        while let Some(to) = current.offset(df, dr) {
            match state.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(p) => {
                    if p.color != color {
                        out.push(Move::capture(from, to, p.id));
                    }
                    break;
                }
            }
            current = to;
        }
    }
}

/// Queen, rook, bishop, knight — the promotion fan, strongest first.
const PROMOTION_KINDS: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

fn gen_pawn(state: &GameState, color: Color, from: Square, out: &mut Vec<Move>) {
    let fwd = color.forward();
    let last_rank = color.flip().back_rank();

    // Single and double advances.
    if let Some(one) = from.offset(0, fwd)
        && state.piece_at(one).is_none()
    {
        push_pawn_move(from, one, None, last_rank, out);
        if from.rank() == color.pawn_rank()
            && let Some(two) = one.offset(0, fwd)
            && state.piece_at(two).is_none()
        {
            out.push(Move::new(from, two));
        }
    }

    // Diagonal captures, including en passant for the side to move.
    for df in [-1i8, 1] {
        let Some(to) = from.offset(df, fwd) else {
            continue;
        };
        match state.piece_at(to) {
            Some(p) if p.color != color => {
                push_pawn_move(from, to, Some(p.id), last_rank, out);
            }
            None => {
                if color == state.active_color()
                    && state.en_passant_target() == Some(to)
                    && let Some(victim) = state.piece_at(Square::new(to.file(), from.rank()))
                {
                    out.push(Move::en_passant(from, to, victim.id));
                }
            }
            Some(_) => {}
        }
    }
}

fn push_pawn_move(
    from: Square,
    to: Square,
    captured: Option<crate::piece::PieceId>,
    last_rank: u8,
    out: &mut Vec<Move>,
) {
    if to.rank() == last_rank {
        for kind in PROMOTION_KINDS {
            out.push(Move::promotion(from, to, kind, captured));
        }
    } else if let Some(id) = captured {
        out.push(Move::capture(from, to, id));
    } else {
        out.push(Move::new(from, to));
    }
}

fn gen_castles(state: &GameState, color: Color, king_sq: Square, out: &mut Vec<Move>) {
    let home = Square::new(4, color.back_rank());
    if king_sq != home {
        return;
    }
    let Some(king) = state.piece_at(king_sq) else {
        return;
    };
    if king.has_moved {
        return;
    }

    let opp = color.flip();
    for side in CastleSide::ALL {
        if !state.castling_rights().has(color, side) {
            continue;
        }

        let rank = color.back_rank();
        let (rook_file, empty_files, path_files): (u8, &[u8], [u8; 3]) = match side {
            // King path: from, transit, to.
            CastleSide::KingSide => (7, &[5, 6], [4, 5, 6]),
            CastleSide::QueenSide => (0, &[1, 2, 3], [4, 3, 2]),
        };

        let rook_sq = Square::new(rook_file, rank);
        let rook_ok = state
            .piece_at(rook_sq)
            .is_some_and(|r| r.kind == PieceType::Rook && r.color == color && !r.has_moved);
        if !rook_ok {
            continue;
        }

        if empty_files
            .iter()
            .any(|&f| state.piece_at(Square::new(f, rank)).is_some())
        {
            continue;
        }

        if path_files
            .iter()
            .any(|&f| is_square_attacked(state, Square::new(f, rank), opp))
        {
            continue;
        }

        let king_to = Square::new(path_files[2], rank);
        out.push(Move::castle(home, king_to));
    }
}

#[cfg(test)]
mod tests {
    use super::{legal_moves, legal_moves_from};
    use crate::color::Color;
    use crate::moves::Move;
    use crate::piece::PieceType;
    use crate::square::Square;
    use crate::state::GameState;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn parse(fen: &str) -> GameState {
        fen.parse().unwrap()
    }

    #[test]
    fn starting_position_has_20_moves() {
        let state = GameState::starting_position();
        assert_eq!(legal_moves(&state, Color::White).len(), 20);
        assert_eq!(legal_moves(&state, Color::Black).len(), 20);
    }

    #[test]
    fn legal_moves_from_knight() {
        let state = GameState::starting_position();
        let moves = legal_moves_from(&state, sq("g1"));
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.from == sq("g1")));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        // Knight e2 is pinned to the e1 king by the e8 rook.
        let state = parse("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1");
        let knight_moves = legal_moves_from(&state, sq("e2"));
        assert!(knight_moves.is_empty(), "pinned knight must not move");
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        let state = parse("4r1k1/8/8/8/8/5n2/8/4K3 w - - 0 1");
        for mv in legal_moves(&state, Color::White) {
            assert_eq!(state.piece_at(mv.from).unwrap().kind, PieceType::King);
        }
    }

    #[test]
    fn check_must_be_answered() {
        // Qh4+ against a bare development position: every reply addresses the check.
        let mut state = GameState::starting_position();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            state.apply_move(Move::from_uci(uci).unwrap()).unwrap();
        }
        assert!(state.is_in_check(Color::White));
        assert!(legal_moves(&state, Color::White).is_empty(), "fool's mate");
    }

    #[test]
    fn promotion_fans_out_to_four_moves() {
        let state = parse("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let promos: Vec<_> = legal_moves(&state, Color::White)
            .into_iter()
            .filter(|m| m.is_promotion())
            .collect();
        assert_eq!(promos.len(), 4);
        let kinds: Vec<_> = promos.iter().map(|m| m.promotion.unwrap()).collect();
        for kind in [
            PieceType::Queen,
            PieceType::Rook,
            PieceType::Bishop,
            PieceType::Knight,
        ] {
            assert!(kinds.contains(&kind));
        }
    }

    #[test]
    fn capture_promotion_fans_out_too() {
        let state = parse("3rk3/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let capture_promos = legal_moves(&state, Color::White)
            .into_iter()
            .filter(|m| m.is_promotion() && m.to == sq("d8"))
            .count();
        assert_eq!(capture_promos, 4);
    }

    #[test]
    fn en_passant_is_generated() {
        let state = parse("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let ep: Vec<_> = legal_moves(&state, Color::White)
            .into_iter()
            .filter(|m| m.is_en_passant)
            .collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].from, sq("e5"));
        assert_eq!(ep[0].to, sq("d6"));
    }

    #[test]
    fn en_passant_not_available_to_waiting_side() {
        // EP target d6 belongs to White (the side to move); Black pawn moves
        // computed for mobility must not use it.
        let state = parse("4k3/8/8/2pPp3/8/8/8/4K3 w - d6 0 1");
        let black_ep = legal_moves(&state, Color::Black)
            .into_iter()
            .filter(|m| m.is_en_passant)
            .count();
        assert_eq!(black_ep, 0);
    }

    #[test]
    fn en_passant_discovered_check_is_illegal() {
        // Capturing en passant would clear the rank and expose the king on
        // a5 to the h5 rook.
        let state = parse("4k3/8/8/KPp4r/8/8/8/8 w - c6 0 1");
        let ep = legal_moves(&state, Color::White)
            .into_iter()
            .filter(|m| m.is_en_passant)
            .count();
        assert_eq!(ep, 0);
    }

    #[test]
    fn castling_both_sides_when_clear() {
        let state = parse("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let castles: Vec<_> = legal_moves(&state, Color::White)
            .into_iter()
            .filter(|m| m.is_castle)
            .collect();
        assert_eq!(castles.len(), 2);
    }

    #[test]
    fn castling_blocked_by_attacked_transit() {
        // The f2 rook covers f1: the king may not pass through it.
        let state = parse("4k3/8/8/8/8/8/5r2/4K2R w K - 0 1");
        let castles = legal_moves(&state, Color::White)
            .into_iter()
            .filter(|m| m.is_castle)
            .count();
        assert_eq!(castles, 0);
    }

    #[test]
    fn castling_blocked_while_in_check() {
        let state = parse("4k3/8/8/8/8/8/4r3/4K2R w K - 0 1");
        let castles = legal_moves(&state, Color::White)
            .into_iter()
            .filter(|m| m.is_castle)
            .count();
        assert_eq!(castles, 0);
    }

    #[test]
    fn castling_blocked_by_intervening_piece() {
        let state = parse("4k3/8/8/8/8/8/8/4KB1R w K - 0 1");
        let castles = legal_moves(&state, Color::White)
            .into_iter()
            .filter(|m| m.is_castle)
            .count();
        assert_eq!(castles, 0);
    }

    #[test]
    fn castling_requires_rights_flag() {
        // Same placement, no K flag.
        let state = parse("4k3/8/8/8/8/8/8/4K2R w - - 0 1");
        let castles = legal_moves(&state, Color::White)
            .into_iter()
            .filter(|m| m.is_castle)
            .count();
        assert_eq!(castles, 0);
    }

    #[test]
    fn every_legal_move_leaves_own_king_safe() {
        let state = parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let mut work = state.clone();
        for mv in legal_moves(&state, Color::White) {
            let undo = work.make_move(mv);
            assert!(!work.is_in_check(Color::White), "{mv} leaves king in check");
            work.unmake_move(undo);
        }
    }
}
