//! Core chess types: position representation, move generation, and game rules.

mod apply;
mod attacks;
mod castling;
mod color;
mod error;
mod fen;
mod movegen;
mod moves;
mod perft;
mod piece;
mod square;
mod state;
mod status;
mod zobrist;

pub use apply::{NullUndo, Undo};
pub use attacks::{cheapest_attacker, count_attackers, is_square_attacked, is_square_attacked_vacated};
pub use castling::{CastleSide, CastlingRights};
pub use color::Color;
pub use error::{FenError, RulesError, StateError};
pub use fen::STARTING_FEN;
pub use movegen::{legal_moves, legal_moves_from};
pub use moves::Move;
pub use perft::{divide, perft};
pub use piece::{Piece, PieceId, PieceType};
pub use square::Square;
pub use state::{GameState, PrettyState};
pub use status::{game_status, DrawReason, GameStatus};
