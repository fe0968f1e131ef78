//! FEN parsing and serialization for [`GameState`].

use std::fmt;
use std::str::FromStr;

use crate::castling::CastlingRights;
use crate::color::Color;
use crate::error::FenError;
use crate::piece::PieceType;
use crate::square::Square;
use crate::state::GameState;

/// The FEN string for the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for GameState {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<GameState, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::WrongFieldCount {
                found: fields.len(),
            });
        }

        // Piece placement: ranks listed from 8 down to 1.
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount { found: ranks.len() });
        }

        let mut placement: Vec<(Square, PieceType, Color)> = Vec::with_capacity(32);
        for (rank_index, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_index as u8;
            let mut file: u8 = 0;

            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(FenError::InvalidPieceChar { character: c });
                    }
                    file += digit as u8;
                } else {
                    let kind = PieceType::from_fen_char(c)
                        .ok_or(FenError::InvalidPieceChar { character: c })?;
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    if file >= 8 {
                        return Err(FenError::BadRankLength {
                            rank_index,
                            length: file as usize + 1,
                        });
                    }
                    placement.push((Square::new(file, rank), kind, color));
                    file += 1;
                }
            }

            if file != 8 {
                return Err(FenError::BadRankLength {
                    rank_index,
                    length: file as usize,
                });
            }
        }

        if placement.len() > 32 {
            return Err(FenError::TooManyPieces {
                found: placement.len(),
            });
        }

        let active_color = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidColor {
                    found: other.to_string(),
                });
            }
        };

        let castling_rights = CastlingRights::from_fen(fields[2])?;

        let en_passant_target = if fields[3] == "-" {
            None
        } else {
            Some(
                Square::from_algebraic(fields[3]).ok_or_else(|| FenError::InvalidEnPassant {
                    found: fields[3].to_string(),
                })?,
            )
        };

        let halfmove_clock =
            fields[4]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidMoveCounter {
                    field: "halfmove clock",
                    found: fields[4].to_string(),
                })?;

        let fullmove_number =
            fields[5]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidMoveCounter {
                    field: "fullmove number",
                    found: fields[5].to_string(),
                })?;

        let state = GameState::from_placement(
            placement,
            active_color,
            castling_rights,
            en_passant_target,
            halfmove_clock,
            fullmove_number,
        )?;
        Ok(state)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0u8..8).rev() {
            let mut empty = 0u8;
            for file in 0u8..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.fen_char())?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
            if rank > 0 {
                write!(f, "/")?;
            }
        }

        write!(f, " {}", self.active_color())?;
        write!(f, " {}", self.castling_rights())?;
        match self.en_passant_target() {
            Some(sq) => write!(f, " {sq}")?,
            None => write!(f, " -")?,
        }
        write!(f, " {} {}", self.halfmove_clock(), self.fullmove_number())
    }
}
