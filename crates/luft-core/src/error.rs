//! Error types for move application, FEN parsing, and state validation.

use crate::color::Color;

/// Errors surfaced by the public mutation API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// A caller-supplied move is not among the legal moves for the side to
    /// move. The state is left untouched.
    #[error("move {mv} is not legal for {color} in this position")]
    IllegalMove {
        /// The rejected move in long algebraic notation.
        mv: String,
        /// The side that attempted it.
        color: Color,
    },
}

/// Errors from structural validation of a [`GameState`](crate::GameState).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A side does not have exactly one king.
    #[error("expected 1 king for {color}, found {count}")]
    InvalidKingCount { color: Color, count: usize },
    /// Pawns occupy the first or eighth rank.
    #[error("pawn found on back rank")]
    PawnOnBackRank,
    /// A board square points at an empty or mismatched arena slot.
    #[error("board square {square} references a missing piece")]
    DanglingPieceId { square: String },
}

/// Errors that occur when parsing a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    /// The FEN string does not have exactly 6 space-separated fields.
    #[error("expected 6 FEN fields, found {found}")]
    WrongFieldCount { found: usize },
    /// The piece placement section does not have exactly 8 ranks.
    #[error("expected 8 ranks in piece placement, found {found}")]
    WrongRankCount { found: usize },
    /// A rank in the piece placement describes more or fewer than 8 squares.
    #[error("rank {rank_index} describes {length} squares, expected 8")]
    BadRankLength { rank_index: usize, length: usize },
    /// An unrecognized character appeared in the piece placement.
    #[error("invalid piece character: '{character}'")]
    InvalidPieceChar { character: char },
    /// More than 32 pieces in the placement.
    #[error("too many pieces: {found}, maximum is 32")]
    TooManyPieces { found: usize },
    /// The active color field is not "w" or "b".
    #[error("invalid active color: \"{found}\"")]
    InvalidColor { found: String },
    /// An unrecognized character appeared in the castling rights field.
    #[error("invalid castling character: '{character}'")]
    InvalidCastlingChar { character: char },
    /// The en passant field is not "-" or a valid algebraic square.
    #[error("invalid en passant square: \"{found}\"")]
    InvalidEnPassant { found: String },
    /// A move counter is not a valid number.
    #[error("invalid {field}: \"{found}\"")]
    InvalidMoveCounter { field: &'static str, found: String },
    /// The parsed position fails structural validation.
    #[error("invalid position: {0}")]
    InvalidState(#[from] StateError),
}
