//! Chess move representation.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::piece::{PieceId, PieceType};
use crate::square::Square;

/// A chess move.
///
/// Two moves compare equal when every field except `captured_id` matches:
/// the captured id is an annotation filled in by move generation, and a
/// caller-constructed move without it must still match the generated one.
#[derive(Clone, Copy)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// Promotion target; one of queen, rook, bishop, knight when set.
    pub promotion: Option<PieceType>,
    pub is_castle: bool,
    pub is_en_passant: bool,
    /// Id of the captured piece, if any. Not part of move equality.
    pub captured_id: Option<PieceId>,
}

impl Move {
    /// Create a quiet move or plain capture.
    pub const fn new(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            promotion: None,
            is_castle: false,
            is_en_passant: false,
            captured_id: None,
        }
    }

    /// Create a capture of the piece with the given id.
    pub const fn capture(from: Square, to: Square, captured_id: PieceId) -> Move {
        Move {
            from,
            to,
            promotion: None,
            is_castle: false,
            is_en_passant: false,
            captured_id: Some(captured_id),
        }
    }

    /// Create a promotion, optionally capturing.
    pub const fn promotion(
        from: Square,
        to: Square,
        kind: PieceType,
        captured_id: Option<PieceId>,
    ) -> Move {
        Move {
            from,
            to,
            promotion: Some(kind),
            is_castle: false,
            is_en_passant: false,
            captured_id,
        }
    }

    /// Create a castling move from the king's source and destination.
    pub const fn castle(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            promotion: None,
            is_castle: true,
            is_en_passant: false,
            captured_id: None,
        }
    }

    /// Create an en passant capture of the pawn with the given id.
    pub const fn en_passant(from: Square, to: Square, captured_id: PieceId) -> Move {
        Move {
            from,
            to,
            promotion: None,
            is_castle: false,
            is_en_passant: true,
            captured_id: Some(captured_id),
        }
    }

    /// Return `true` if this move captures a piece.
    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured_id.is_some()
    }

    /// Return `true` if this is a promotion.
    #[inline]
    pub const fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// Long algebraic notation (e.g. "e2e4", "e7e8q").
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.fen_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parse long algebraic notation. The move kind flags are not recoverable
    /// from the string alone; callers should match the result against
    /// generated legal moves (equality ignores `captured_id`, and castling /
    /// en passant are resolved by the lookup).
    pub fn from_uci(s: &str) -> Option<Move> {
        if s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s.as_bytes().get(4).copied() {
            None => None,
            Some(b'q') => Some(PieceType::Queen),
            Some(b'r') => Some(PieceType::Rook),
            Some(b'b') => Some(PieceType::Bishop),
            Some(b'n') => Some(PieceType::Knight),
            Some(_) => return None,
        };
        Some(Move {
            from,
            to,
            promotion,
            is_castle: false,
            is_en_passant: false,
            captured_id: None,
        })
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Move) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.promotion == other.promotion
            && self.is_castle == other.is_castle
            && self.is_en_passant == other.is_en_passant
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
        self.promotion.hash(state);
        self.is_castle.hash(state);
        self.is_en_passant.hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}", self.to_uci())?;
        if self.is_castle {
            write!(f, " castle")?;
        }
        if self.is_en_passant {
            write!(f, " ep")?;
        }
        if let Some(id) = self.captured_id {
            write!(f, " x#{}", id.index())?;
        }
        write!(f, ")")
    }
}
