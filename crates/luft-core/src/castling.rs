//! Castling rights stored as a 4-bit field within a `u8`.

use std::fmt;

use crate::color::Color;
use crate::error::FenError;

/// Which side of the board to castle toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    /// Both sides, king-side first.
    pub const ALL: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];
}

/// Castling rights encoded as a 4-bit field: bit 0 = WK, 1 = WQ, 2 = BK, 3 = BQ.
///
/// Rights are monotone: `apply_move` only ever clears bits, never sets them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    /// No castling rights.
    pub const NONE: CastlingRights = CastlingRights(0);
    /// All castling rights.
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// White king-side castling.
    pub const WHITE_KING: CastlingRights = CastlingRights(0b0001);
    /// White queen-side castling.
    pub const WHITE_QUEEN: CastlingRights = CastlingRights(0b0010);
    /// Black king-side castling.
    pub const BLACK_KING: CastlingRights = CastlingRights(0b0100);
    /// Black queen-side castling.
    pub const BLACK_QUEEN: CastlingRights = CastlingRights(0b1000);

    /// Both white castling rights.
    pub const WHITE_BOTH: CastlingRights = CastlingRights(0b0011);
    /// Both black castling rights.
    pub const BLACK_BOTH: CastlingRights = CastlingRights(0b1100);

    /// Return the raw bits (0..16). Used to index Zobrist keys.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Return `true` if no castling rights remain.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Return `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: CastlingRights) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Return new rights with all bits from `other` added.
    #[inline]
    pub const fn insert(self, other: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 | other.0)
    }

    /// Return new rights with all bits from `other` removed.
    #[inline]
    pub const fn remove(self, other: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 & !other.0)
    }

    /// Check whether a specific color and side can still castle.
    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        (self.0 & Self::flag(color, side).0) != 0
    }

    /// Return `true` if the given color retains either castling right.
    #[inline]
    pub const fn has_any(self, color: Color) -> bool {
        match color {
            Color::White => (self.0 & Self::WHITE_BOTH.0) != 0,
            Color::Black => (self.0 & Self::BLACK_BOTH.0) != 0,
        }
    }

    /// Return the single-bit flag for a color and side.
    #[inline]
    pub const fn flag(color: Color, side: CastleSide) -> CastlingRights {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => Self::WHITE_KING,
            (Color::White, CastleSide::QueenSide) => Self::WHITE_QUEEN,
            (Color::Black, CastleSide::KingSide) => Self::BLACK_KING,
            (Color::Black, CastleSide::QueenSide) => Self::BLACK_QUEEN,
        }
    }

    /// Parse the FEN castling field (e.g. "KQkq", "Kq", "-").
    pub fn from_fen(s: &str) -> Result<CastlingRights, FenError> {
        if s == "-" {
            return Ok(CastlingRights::NONE);
        }
        let mut rights = CastlingRights::NONE;
        for c in s.chars() {
            let flag = match c {
                'K' => Self::WHITE_KING,
                'Q' => Self::WHITE_QUEEN,
                'k' => Self::BLACK_KING,
                'q' => Self::BLACK_QUEEN,
                _ => return Err(FenError::InvalidCastlingChar { character: c }),
            };
            rights = rights.insert(flag);
        }
        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        if self.contains(Self::WHITE_KING) {
            write!(f, "K")?;
        }
        if self.contains(Self::WHITE_QUEEN) {
            write!(f, "Q")?;
        }
        if self.contains(Self::BLACK_KING) {
            write!(f, "k")?;
        }
        if self.contains(Self::BLACK_QUEEN) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastlingRights({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::{CastleSide, CastlingRights};
    use crate::color::Color;

    #[test]
    fn contains_and_remove() {
        let rights = CastlingRights::ALL;
        assert!(rights.contains(CastlingRights::WHITE_KING));
        let rights = rights.remove(CastlingRights::WHITE_BOTH);
        assert!(!rights.has(Color::White, CastleSide::KingSide));
        assert!(!rights.has(Color::White, CastleSide::QueenSide));
        assert!(rights.has(Color::Black, CastleSide::KingSide));
    }

    #[test]
    fn has_any() {
        assert!(CastlingRights::ALL.has_any(Color::White));
        assert!(!CastlingRights::BLACK_BOTH.has_any(Color::White));
        assert!(CastlingRights::BLACK_QUEEN.has_any(Color::Black));
        assert!(!CastlingRights::NONE.has_any(Color::Black));
    }

    #[test]
    fn fen_roundtrip() {
        for s in ["KQkq", "Kq", "k", "-"] {
            let rights = CastlingRights::from_fen(s).unwrap();
            assert_eq!(format!("{rights}"), s);
        }
    }

    #[test]
    fn fen_invalid() {
        assert!(CastlingRights::from_fen("X").is_err());
        assert!(CastlingRights::from_fen("KQx").is_err());
    }
}
