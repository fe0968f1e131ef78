//! The game position: piece placement, identity arena, counters, and
//! repetition history.

use std::collections::HashMap;
use std::fmt;

use crate::castling::CastlingRights;
use crate::color::Color;
use crate::error::StateError;
use crate::moves::Move;
use crate::piece::{Piece, PieceId, PieceType};
use crate::square::Square;
use crate::zobrist;

/// Number of arena slots. Promotion rewrites a piece in place, so a game
/// never holds more pieces than it started with.
pub(crate) const ARENA_SLOTS: usize = 32;

/// Complete game state.
///
/// The board array is the source of truth for placement: `board[sq]` holds
/// the id of the piece standing on `sq`, and the arena maps ids to identity
/// (kind, color, castling eligibility). Captured pieces are removed from
/// both; their ids are never reused.
///
/// Publicly the state is mutated only through
/// [`apply_move`](GameState::apply_move), which validates the move and keeps
/// `position_counts` current.
#[derive(Clone)]
pub struct GameState {
    pub(crate) board: [Option<PieceId>; 64],
    pub(crate) pieces: [Option<Piece>; ARENA_SLOTS],
    pub(crate) active_color: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant_target: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) last_move: Option<Move>,
    /// Occurrence count per position key over this game's history.
    pub(crate) position_counts: HashMap<u64, u32>,
    /// Incrementally maintained Zobrist key of the current position.
    pub(crate) key: u64,
    /// Cached king squares, indexed by [`Color::index`].
    pub(crate) kings: [Square; 2],
}

impl GameState {
    /// Return the standard starting position with all 32 pieces.
    pub fn starting_position() -> GameState {
        let back = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        let mut placement = Vec::with_capacity(32);
        for color in Color::ALL {
            for (file, &kind) in back.iter().enumerate() {
                placement.push((Square::new(file as u8, color.back_rank()), kind, color));
            }
            for file in 0..8 {
                placement.push((Square::new(file, color.pawn_rank()), PieceType::Pawn, color));
            }
        }

        GameState::from_placement(
            placement,
            Color::White,
            CastlingRights::ALL,
            None,
            0,
            1,
        )
        .expect("starting position is structurally valid")
    }

    /// Build a state from a piece placement. Ids are assigned in placement
    /// order. Used by [`starting_position`](GameState::starting_position)
    /// and FEN parsing.
    pub(crate) fn from_placement(
        placement: impl IntoIterator<Item = (Square, PieceType, Color)>,
        active_color: Color,
        castling_rights: CastlingRights,
        en_passant_target: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Result<GameState, StateError> {
        let mut board = [None; 64];
        let mut pieces = [None; ARENA_SLOTS];
        let mut kings = [None; 2];

        for (next_id, (sq, kind, color)) in placement.into_iter().enumerate() {
            debug_assert!(next_id < ARENA_SLOTS, "placement exceeds 32 pieces");
            let id = PieceId::new(next_id as u32);
            let mut piece = Piece::new(id, kind, color);
            piece.has_moved = !on_home_square(sq, kind, color);
            if kind == PieceType::King {
                kings[color.index()] = Some(sq);
            }
            board[sq.index()] = Some(id);
            pieces[next_id] = Some(piece);
        }

        let (white_king, black_king) = match (kings[0], kings[1]) {
            (Some(w), Some(b)) => (w, b),
            (w, _) => {
                let color = if w.is_none() { Color::White } else { Color::Black };
                return Err(StateError::InvalidKingCount { color, count: 0 });
            }
        };

        let mut state = GameState {
            board,
            pieces,
            active_color,
            castling_rights,
            en_passant_target,
            halfmove_clock,
            fullmove_number,
            last_move: None,
            position_counts: HashMap::new(),
            key: 0,
            kings: [white_king, black_king],
        };
        state.validate()?;
        state.key = zobrist::key_from_scratch(&state);
        state.position_counts.insert(state.key, 1);
        Ok(state)
    }

    /// Return the id of the piece on the given square, if any.
    #[inline]
    pub fn piece_id_at(&self, sq: Square) -> Option<PieceId> {
        self.board[sq.index()]
    }

    /// Look up a piece by id. `None` once the piece has been captured.
    #[inline]
    pub fn piece(&self, id: PieceId) -> Option<Piece> {
        self.pieces[id.index()]
    }

    /// Return the piece on the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()].and_then(|id| self.pieces[id.index()])
    }

    /// Return the side to move.
    #[inline]
    pub fn active_color(&self) -> Color {
        self.active_color
    }

    /// Return the current castling rights.
    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    /// Return the en passant target square, if any.
    ///
    /// Set only on the ply immediately after a pawn double step.
    #[inline]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    /// Plies since the last pawn move or capture. Tracked but not used for
    /// draw adjudication.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Return the fullmove number (starts at 1, increments after Black).
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// The move that produced this position, if any.
    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Position key covering placement, side to move, castling rights, and
    /// en passant file. Excludes the move counters so repetitions collide.
    #[inline]
    pub fn position_key(&self) -> u64 {
        self.key
    }

    /// How many times the given position key has occurred in this game.
    #[inline]
    pub fn position_count(&self, key: u64) -> u32 {
        self.position_counts.get(&key).copied().unwrap_or(0)
    }

    /// How many times the current position has occurred.
    #[inline]
    pub fn repetition_count(&self) -> u32 {
        self.position_count(self.key)
    }

    /// Return the square of the king for the given side.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Iterate over all pieces on the board as `(square, piece)` pairs.
    pub fn iter_pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Iterate over the pieces of one side.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.iter_pieces().filter(move |(_, p)| p.color == color)
    }

    /// A copy for analysis: identical position, empty repetition history.
    ///
    /// Cheap relative to `clone()` and sufficient for legality probing and
    /// search, neither of which reads `position_counts`.
    pub(crate) fn fork(&self) -> GameState {
        GameState {
            board: self.board,
            pieces: self.pieces,
            active_color: self.active_color,
            castling_rights: self.castling_rights,
            en_passant_target: self.en_passant_target,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            last_move: self.last_move,
            position_counts: HashMap::new(),
            key: self.key,
            kings: self.kings,
        }
    }

    /// Validate the structural integrity of the state.
    pub fn validate(&self) -> Result<(), StateError> {
        for color in Color::ALL {
            let count = self
                .pieces
                .iter()
                .flatten()
                .filter(|p| p.kind == PieceType::King && p.color == color)
                .count();
            if count != 1 {
                return Err(StateError::InvalidKingCount { color, count });
            }
        }

        for sq in Square::all() {
            if let Some(id) = self.board[sq.index()] {
                let Some(piece) = self.pieces[id.index()] else {
                    return Err(StateError::DanglingPieceId {
                        square: sq.to_string(),
                    });
                };
                if piece.kind == PieceType::Pawn && (sq.rank() == 0 || sq.rank() == 7) {
                    return Err(StateError::PawnOnBackRank);
                }
            }
        }

        Ok(())
    }

    /// Return a pretty-printable wrapper for this position.
    pub fn pretty(&self) -> PrettyState<'_> {
        PrettyState(self)
    }
}

/// Whether a piece of this kind/color conventionally starts on `sq`.
/// Seeds `has_moved`, which only castling eligibility reads.
fn on_home_square(sq: Square, kind: PieceType, color: Color) -> bool {
    match kind {
        PieceType::Pawn => sq.rank() == color.pawn_rank(),
        PieceType::King => sq == Square::new(4, color.back_rank()),
        PieceType::Rook => {
            sq == Square::new(0, color.back_rank()) || sq == Square::new(7, color.back_rank())
        }
        PieceType::Knight => {
            sq.rank() == color.back_rank() && (sq.file() == 1 || sq.file() == 6)
        }
        PieceType::Bishop => {
            sq.rank() == color.back_rank() && (sq.file() == 2 || sq.file() == 5)
        }
        PieceType::Queen => sq == Square::new(3, color.back_rank()),
    }
}

/// Wrapper for pretty-printing a position as an 8x8 grid.
pub struct PrettyState<'a>(&'a GameState);

impl fmt::Display for PrettyState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0u8..8).rev() {
            write!(f, "{}  ", rank + 1)?;
            for file in 0u8..8 {
                let c = self
                    .0
                    .piece_at(Square::new(file, rank))
                    .map_or('.', |p| p.fen_char());
                if file < 7 {
                    write!(f, "{c} ")?;
                } else {
                    write!(f, "{c}")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameState(\"{}\")", self)
    }
}

#[cfg(test)]
mod tests {
    use super::GameState;
    use crate::color::Color;
    use crate::piece::PieceType;
    use crate::square::Square;

    #[test]
    fn starting_position_validates() {
        let state = GameState::starting_position();
        state.validate().unwrap();
    }

    #[test]
    fn starting_position_piece_placement() {
        let state = GameState::starting_position();
        assert_eq!(state.piece_at(Square::E1).unwrap().kind, PieceType::King);
        assert_eq!(state.piece_at(Square::E8).unwrap().kind, PieceType::King);
        assert_eq!(
            state.piece_at(Square::new(3, 0)).unwrap().kind,
            PieceType::Queen
        );
        assert_eq!(
            state.piece_at(Square::new(4, 1)).unwrap().kind,
            PieceType::Pawn
        );
        assert!(state.piece_at(Square::new(4, 3)).is_none());
    }

    #[test]
    fn starting_position_has_32_pieces() {
        let state = GameState::starting_position();
        assert_eq!(state.iter_pieces().count(), 32);
        assert_eq!(state.pieces_of(Color::White).count(), 16);
        assert_eq!(state.pieces_of(Color::Black).count(), 16);
    }

    #[test]
    fn piece_ids_are_distinct() {
        let state = GameState::starting_position();
        let mut seen = std::collections::HashSet::new();
        for (_, piece) in state.iter_pieces() {
            assert!(seen.insert(piece.id), "duplicate piece id");
        }
    }

    #[test]
    fn king_squares_cached() {
        let state = GameState::starting_position();
        assert_eq!(state.king_square(Color::White), Square::E1);
        assert_eq!(state.king_square(Color::Black), Square::E8);
    }

    #[test]
    fn initial_position_counted_once() {
        let state = GameState::starting_position();
        assert_eq!(state.repetition_count(), 1);
    }

    #[test]
    fn no_piece_has_moved_initially() {
        let state = GameState::starting_position();
        for (_, piece) in state.iter_pieces() {
            assert!(!piece.has_moved);
        }
    }

    #[test]
    fn pretty_print() {
        let state = GameState::starting_position();
        let output = format!("{}", state.pretty());
        assert!(output.contains("r n b q k b n r"));
        assert!(output.contains("R N B Q K B N R"));
        assert!(output.contains("a b c d e f g h"));
    }
}
