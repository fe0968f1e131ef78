//! Move execution: reversible make/unmake and the validated public
//! `apply_move`.

use tracing::trace;

use crate::attacks::is_square_attacked;
use crate::castling::CastlingRights;
use crate::color::Color;
use crate::error::RulesError;
use crate::movegen::legal_moves;
use crate::moves::Move;
use crate::piece::{Piece, PieceId, PieceType};
use crate::square::Square;
use crate::state::GameState;
use crate::zobrist;

/// Castling rights revoked when a square is the source or destination of a
/// move: king squares clear both rights for that color, corner squares clear
/// the matching rook's side. Capturing a corner rook revokes via `to`.
const RIGHTS_REVOKED: [CastlingRights; 64] = {
    let mut table = [CastlingRights::NONE; 64];
    table[Square::E1.index()] = CastlingRights::WHITE_BOTH;
    table[Square::A1.index()] = CastlingRights::WHITE_QUEEN;
    table[Square::H1.index()] = CastlingRights::WHITE_KING;
    table[Square::E8.index()] = CastlingRights::BLACK_BOTH;
    table[Square::A8.index()] = CastlingRights::BLACK_QUEEN;
    table[Square::H8.index()] = CastlingRights::BLACK_KING;
    table
};

/// Record of everything a [`GameState::make_move`] changed, consumed by
/// [`GameState::unmake_move`].
#[derive(Debug)]
pub struct Undo {
    mv: Move,
    moved_id: PieceId,
    moved_prev_has_moved: bool,
    /// Captured piece and the square it stood on (differs from `mv.to` for
    /// en passant).
    captured: Option<(Square, Piece)>,
    /// Castling rook relocation: (id, from, to, previous `has_moved`).
    rook: Option<(PieceId, Square, Square, bool)>,
    promoted: bool,
    prev_castling: CastlingRights,
    prev_en_passant: Option<Square>,
    prev_halfmove: u32,
    prev_last_move: Option<Move>,
    prev_active: Color,
    prev_key: u64,
}

impl GameState {
    /// Return `true` if the given color's king is attacked.
    pub fn is_in_check(&self, color: Color) -> bool {
        is_square_attacked(self, self.king_square(color), color.flip())
    }

    /// Validate and apply a move for the side to move.
    ///
    /// The move is matched against the generated legal moves (equality
    /// ignores the captured-id annotation, so caller-constructed moves work).
    /// On success the position history in `position_counts` is extended.
    ///
    /// # Errors
    ///
    /// [`RulesError::IllegalMove`] if the move is not legal; the state is
    /// left untouched.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), RulesError> {
        let color = self.active_color;
        let resolved = legal_moves(self, color)
            .into_iter()
            .find(|candidate| *candidate == mv)
            .ok_or_else(|| RulesError::IllegalMove {
                mv: mv.to_uci(),
                color,
            })?;

        let _undo = self.make_move(resolved);
        *self.position_counts.entry(self.key).or_insert(0) += 1;
        trace!(mv = %resolved, key = self.key, "applied move");
        Ok(())
    }

    /// Execute a move without validation and return the undo record.
    ///
    /// Used by legality filtering and search, which guarantee the move came
    /// from move generation. Does not touch `position_counts`; pair every
    /// call with [`unmake_move`](GameState::unmake_move) unless the move is
    /// meant to be permanent (as in `apply_move`).
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let moved_id = self.board[mv.from.index()].expect("make_move: empty source square");
        let mover = self.pieces[moved_id.index()].expect("make_move: dangling piece id");
        let us = mover.color;

        let mut undo = Undo {
            mv,
            moved_id,
            moved_prev_has_moved: mover.has_moved,
            captured: None,
            rook: None,
            promoted: mv.is_promotion(),
            prev_castling: self.castling_rights,
            prev_en_passant: self.en_passant_target,
            prev_halfmove: self.halfmove_clock,
            prev_last_move: self.last_move,
            prev_active: self.active_color,
            prev_key: self.key,
        };

        // Stale en passant file and castling rights leave the key first.
        if let Some(ep) = self.en_passant_target {
            self.key ^= zobrist::EN_PASSANT_FILE[ep.file() as usize];
        }
        self.key ^= zobrist::CASTLING[self.castling_rights.bits() as usize];
        self.en_passant_target = None;

        // Remove the captured piece. For en passant the victim stands one
        // rank behind the destination.
        let capture_sq = if mv.is_en_passant {
            Square::new(mv.to.file(), mv.from.rank())
        } else {
            mv.to
        };
        if let Some(captured_id) = self.board[capture_sq.index()] {
            let victim = self.pieces[captured_id.index()].expect("captured piece missing");
            self.board[capture_sq.index()] = None;
            self.pieces[captured_id.index()] = None;
            self.key ^=
                zobrist::PIECE_SQUARE[zobrist::piece_index(victim.color, victim.kind)]
                    [capture_sq.index()];
            undo.captured = Some((capture_sq, victim));
        }

        // Relocate the mover, promoting in place if requested.
        self.board[mv.from.index()] = None;
        self.board[mv.to.index()] = Some(moved_id);
        self.key ^=
            zobrist::PIECE_SQUARE[zobrist::piece_index(us, mover.kind)][mv.from.index()];
        let final_kind = mv.promotion.unwrap_or(mover.kind);
        self.key ^= zobrist::PIECE_SQUARE[zobrist::piece_index(us, final_kind)][mv.to.index()];
        {
            let piece = self.pieces[moved_id.index()]
                .as_mut()
                .expect("mover vanished mid-move");
            piece.kind = final_kind;
            piece.has_moved = true;
        }
        if mover.kind == PieceType::King {
            self.kings[us.index()] = mv.to;
        }

        // Castling: hop the rook to the square between king-from and king-to.
        if mv.is_castle {
            let (rook_from, rook_to) = rook_hop(mv.to);
            let rook_id = self.board[rook_from.index()].expect("castling without rook");
            let rook = self.pieces[rook_id.index()].expect("castling rook missing");
            self.board[rook_from.index()] = None;
            self.board[rook_to.index()] = Some(rook_id);
            let idx = zobrist::piece_index(us, PieceType::Rook);
            self.key ^= zobrist::PIECE_SQUARE[idx][rook_from.index()];
            self.key ^= zobrist::PIECE_SQUARE[idx][rook_to.index()];
            if let Some(r) = self.pieces[rook_id.index()].as_mut() {
                r.has_moved = true;
            }
            undo.rook = Some((rook_id, rook_from, rook_to, rook.has_moved));
        }

        // Double pawn step records the skipped square for one ply.
        if mover.kind == PieceType::Pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2 {
            let skipped = Square::new(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2);
            self.en_passant_target = Some(skipped);
            self.key ^= zobrist::EN_PASSANT_FILE[skipped.file() as usize];
        }

        // Rights only ever shrink: king or rook movement, or a capture on a
        // corner square, clears the affected flags.
        self.castling_rights = self
            .castling_rights
            .remove(RIGHTS_REVOKED[mv.from.index()])
            .remove(RIGHTS_REVOKED[mv.to.index()]);
        self.key ^= zobrist::CASTLING[self.castling_rights.bits() as usize];

        if mover.kind == PieceType::Pawn || undo.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.last_move = Some(mv);

        let new_active = us.flip();
        if new_active != self.active_color {
            self.key ^= zobrist::SIDE_TO_MOVE;
        }
        self.active_color = new_active;

        undo
    }

    /// Revert a move made with [`make_move`](GameState::make_move).
    pub fn unmake_move(&mut self, undo: Undo) {
        let Undo {
            mv,
            moved_id,
            moved_prev_has_moved,
            captured,
            rook,
            promoted,
            prev_castling,
            prev_en_passant,
            prev_halfmove,
            prev_last_move,
            prev_active,
            prev_key,
        } = undo;

        let us = self.pieces[moved_id.index()]
            .expect("unmake: mover missing")
            .color;

        self.board[mv.to.index()] = None;
        self.board[mv.from.index()] = Some(moved_id);
        {
            let piece = self.pieces[moved_id.index()]
                .as_mut()
                .expect("unmake: mover missing");
            if promoted {
                piece.kind = PieceType::Pawn;
            }
            piece.has_moved = moved_prev_has_moved;
            if piece.kind == PieceType::King {
                self.kings[us.index()] = mv.from;
            }
        }

        if let Some((rook_id, rook_from, rook_to, rook_had_moved)) = rook {
            self.board[rook_to.index()] = None;
            self.board[rook_from.index()] = Some(rook_id);
            if let Some(r) = self.pieces[rook_id.index()].as_mut() {
                r.has_moved = rook_had_moved;
            }
        }

        if let Some((capture_sq, victim)) = captured {
            self.pieces[victim.id.index()] = Some(victim);
            self.board[capture_sq.index()] = Some(victim.id);
        }

        self.castling_rights = prev_castling;
        self.en_passant_target = prev_en_passant;
        self.halfmove_clock = prev_halfmove;
        self.last_move = prev_last_move;
        self.active_color = prev_active;
        self.key = prev_key;
        if us == Color::Black {
            self.fullmove_number -= 1;
        }
    }
}

/// Undo record for a null move.
#[derive(Debug)]
pub struct NullUndo {
    prev_en_passant: Option<Square>,
    prev_last_move: Option<Move>,
    prev_active: Color,
    prev_key: u64,
}

impl GameState {
    /// Pass the turn: flip the side to move and clear the en passant target.
    ///
    /// Never legal chess; used by search pruning only.
    pub fn make_null_move(&mut self) -> NullUndo {
        let undo = NullUndo {
            prev_en_passant: self.en_passant_target,
            prev_last_move: self.last_move,
            prev_active: self.active_color,
            prev_key: self.key,
        };

        if let Some(ep) = self.en_passant_target {
            self.key ^= zobrist::EN_PASSANT_FILE[ep.file() as usize];
        }
        self.en_passant_target = None;
        self.last_move = None;
        self.active_color = self.active_color.flip();
        self.key ^= zobrist::SIDE_TO_MOVE;

        undo
    }

    /// Revert a [`make_null_move`](GameState::make_null_move).
    pub fn unmake_null_move(&mut self, undo: NullUndo) {
        self.en_passant_target = undo.prev_en_passant;
        self.last_move = undo.prev_last_move;
        self.active_color = undo.prev_active;
        self.key = undo.prev_key;
    }
}

/// Rook source and destination for a castling move, keyed by the king's
/// destination square.
fn rook_hop(king_to: Square) -> (Square, Square) {
    match king_to {
        Square::G1 => (Square::H1, Square::F1),
        Square::C1 => (Square::A1, Square::D1),
        Square::G8 => (Square::H8, Square::F8),
        Square::C8 => (Square::A8, Square::D8),
        _ => unreachable!("castling destination must be c1/g1/c8/g8"),
    }
}

#[cfg(test)]
mod tests {
    use crate::castling::CastlingRights;
    use crate::color::Color;
    use crate::moves::Move;
    use crate::piece::PieceType;
    use crate::square::Square;
    use crate::state::GameState;
    use crate::zobrist;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn apply(state: &mut GameState, uci: &str) {
        let mv = Move::from_uci(uci).unwrap();
        state.apply_move(mv).unwrap_or_else(|e| panic!("{uci}: {e}"));
    }

    #[test]
    fn pawn_push_sets_en_passant_target() {
        let mut state = GameState::starting_position();
        apply(&mut state, "e2e4");
        assert_eq!(state.piece_at(sq("e4")).unwrap().kind, PieceType::Pawn);
        assert!(state.piece_at(sq("e2")).is_none());
        assert_eq!(state.en_passant_target(), Some(sq("e3")));
        assert_eq!(state.active_color(), Color::Black);
    }

    #[test]
    fn en_passant_target_lives_one_ply() {
        let mut state = GameState::starting_position();
        apply(&mut state, "e2e4");
        apply(&mut state, "g8f6");
        assert_eq!(state.en_passant_target(), None);
    }

    #[test]
    fn capture_removes_piece_identity() {
        let mut state = GameState::starting_position();
        apply(&mut state, "e2e4");
        apply(&mut state, "d7d5");
        let victim_id = state.piece_id_at(sq("d5")).unwrap();
        apply(&mut state, "e4d5");
        assert!(state.piece(victim_id).is_none(), "captured piece destroyed");
        assert_eq!(state.piece_at(sq("d5")).unwrap().color, Color::White);
        assert_eq!(state.halfmove_clock(), 0);
    }

    #[test]
    fn en_passant_removes_pawn_behind_destination() {
        let mut state = GameState::starting_position();
        for uci in ["e2e4", "a7a6", "e4e5", "d7d5"] {
            apply(&mut state, uci);
        }
        assert_eq!(state.en_passant_target(), Some(sq("d6")));
        apply(&mut state, "e5d6");
        assert_eq!(state.piece_at(sq("d6")).unwrap().kind, PieceType::Pawn);
        assert!(state.piece_at(sq("d5")).is_none(), "victim removed");
        assert!(state.piece_at(sq("e5")).is_none());
    }

    #[test]
    fn promotion_preserves_identity() {
        let mut state: GameState = "4k3/4P3/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let pawn_id = state.piece_id_at(sq("e7")).unwrap();
        apply(&mut state, "e7e8q");
        let promoted = state.piece_at(sq("e8")).unwrap();
        assert_eq!(promoted.kind, PieceType::Queen);
        assert_eq!(promoted.id, pawn_id, "promotion keeps the pawn's id");
    }

    #[test]
    fn kingside_castling_hops_rook() {
        let mut state: GameState = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        apply(&mut state, "e1g1");
        assert_eq!(state.piece_at(sq("g1")).unwrap().kind, PieceType::King);
        assert_eq!(state.piece_at(sq("f1")).unwrap().kind, PieceType::Rook);
        assert!(state.piece_at(sq("e1")).is_none());
        assert!(state.piece_at(sq("h1")).is_none());
        assert!(!state.castling_rights().has_any(Color::White));
        assert!(state.castling_rights().has_any(Color::Black));
    }

    #[test]
    fn queenside_castling_hops_rook() {
        let mut state: GameState = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1"
            .parse()
            .unwrap();
        apply(&mut state, "e8c8");
        assert_eq!(state.piece_at(sq("c8")).unwrap().kind, PieceType::King);
        assert_eq!(state.piece_at(sq("d8")).unwrap().kind, PieceType::Rook);
    }

    #[test]
    fn rook_move_revokes_one_side() {
        let mut state: GameState = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        apply(&mut state, "h1g1");
        assert!(!state.castling_rights().contains(CastlingRights::WHITE_KING));
        assert!(state.castling_rights().contains(CastlingRights::WHITE_QUEEN));
    }

    #[test]
    fn corner_capture_revokes_victims_right() {
        // White rook takes the h8 rook.
        let mut state: GameState = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        apply(&mut state, "h1h8");
        assert!(!state.castling_rights().contains(CastlingRights::BLACK_KING));
        assert!(state.castling_rights().contains(CastlingRights::BLACK_QUEEN));
    }

    #[test]
    fn halfmove_and_fullmove_counters() {
        let mut state = GameState::starting_position();
        assert_eq!(state.fullmove_number(), 1);
        apply(&mut state, "g1f3");
        assert_eq!(state.halfmove_clock(), 1);
        assert_eq!(state.fullmove_number(), 1);
        apply(&mut state, "g8f6");
        assert_eq!(state.halfmove_clock(), 2);
        assert_eq!(state.fullmove_number(), 2);
    }

    #[test]
    fn illegal_move_rejected_without_mutation() {
        let mut state = GameState::starting_position();
        let before = format!("{state}");
        let err = state.apply_move(Move::from_uci("e2e5").unwrap());
        assert!(err.is_err());
        assert_eq!(format!("{state}"), before, "state untouched after rejection");
    }

    #[test]
    fn side_that_moved_is_never_left_in_check() {
        let mut state = GameState::starting_position();
        for uci in ["e2e4", "e7e5", "d1h5", "b8c6", "h5e5"] {
            apply(&mut state, uci);
        }
        // Whoever just moved must not be in check from their own move.
        assert!(!state.is_in_check(state.active_color().flip()));
    }

    #[test]
    fn incremental_key_matches_scratch_over_sequence() {
        let mut state = GameState::starting_position();
        for uci in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5c6", "d7c6", "e1g1"] {
            apply(&mut state, uci);
            assert_eq!(
                state.position_key(),
                zobrist::key_from_scratch(&state),
                "key drift after {uci}"
            );
        }
    }

    #[test]
    fn make_unmake_roundtrip_restores_everything() {
        let mut state: GameState = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let before_fen = format!("{state}");
        let before_key = state.position_key();

        for mv in crate::movegen::legal_moves(&state, Color::White) {
            let undo = state.make_move(mv);
            state.unmake_move(undo);
            assert_eq!(format!("{state}"), before_fen, "fen drift after {mv}");
            assert_eq!(state.position_key(), before_key, "key drift after {mv}");
        }
    }

    #[test]
    fn transpositions_share_a_key() {
        let mut a = GameState::starting_position();
        for uci in ["g1f3", "g8f6", "b1c3", "b8c6"] {
            apply(&mut a, uci);
        }
        let mut b = GameState::starting_position();
        for uci in ["b1c3", "b8c6", "g1f3", "g8f6"] {
            apply(&mut b, uci);
        }
        assert_eq!(a.position_key(), b.position_key());
    }

    #[test]
    fn null_move_roundtrip() {
        let mut state = GameState::starting_position();
        apply(&mut state, "e2e4");
        let before_fen = format!("{state}");
        let before_key = state.position_key();
        assert!(state.en_passant_target().is_some());

        let undo = state.make_null_move();
        assert_eq!(state.active_color(), Color::White);
        assert_eq!(state.en_passant_target(), None);
        assert_ne!(state.position_key(), before_key);

        state.unmake_null_move(undo);
        assert_eq!(format!("{state}"), before_fen);
        assert_eq!(state.position_key(), before_key);
    }

    #[test]
    fn position_counts_track_recurrences() {
        let mut state: GameState = "4k3/8/8/8/8/8/8/4KR2 w - - 0 1".parse().unwrap();
        let initial_key = state.position_key();
        assert_eq!(state.repetition_count(), 1);
        for uci in ["f1f2", "e8d8", "f2f1", "d8e8"] {
            apply(&mut state, uci);
        }
        assert_eq!(state.position_key(), initial_key);
        assert_eq!(state.repetition_count(), 2);
    }
}
