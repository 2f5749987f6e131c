use super::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Position};
use crate::bitboard::BitboardExt;
use crate::square::Square;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("missing fields, expected 6 got {0}")]
    MissingFields(usize),
    #[error("piece placement has bad geometry")]
    BadPlacement,
    #[error("unknown piece letter '{0}'")]
    UnknownPiece(char),
    #[error("active color must be 'w' or 'b'")]
    BadActiveColor,
    #[error("unknown castling character '{0}'")]
    BadCastling(char),
    #[error("bad en-passant square")]
    BadEpSquare,
    #[error("half-move clock is not an integer")]
    BadHalfmoveClock,
}

const PIECE_CHARS: [char; 6] = ['P', 'N', 'B', 'R', 'Q', 'K'];

fn piece_slot(c: char) -> Option<(usize, usize)> {
    let upper = c.to_ascii_uppercase();
    let piece = PIECE_CHARS.iter().position(|&p| p == upper)?;
    let color = if c.is_ascii_uppercase() { 0 } else { 1 };
    Some((color, piece))
}

impl Position {
    /// Parses a standard six-field FEN. The full-move number is required to
    /// be present but is otherwise ignored.
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 6 {
            return Err(FenError::MissingFields(fields.len()));
        }

        let mut pos = Position::empty();

        // piece placement, rank 8 down to rank 1
        let mut rank: i32 = 7;
        let mut file: i32 = 0;
        for c in fields[0].chars() {
            if let Some(d) = c.to_digit(10) {
                file += d as i32;
                continue;
            }
            if c == '/' {
                if file != 8 {
                    return Err(FenError::BadPlacement);
                }
                rank -= 1;
                file = 0;
                continue;
            }
            if !(0..8).contains(&rank) || !(0..8).contains(&file) {
                return Err(FenError::BadPlacement);
            }
            let (color, piece) = piece_slot(c).ok_or(FenError::UnknownPiece(c))?;
            pos.pieces[color][piece] |= 1u64 << (rank * 8 + file);
            file += 1;
        }
        if rank != 0 || file != 8 {
            return Err(FenError::BadPlacement);
        }
        pos.refresh_occupancy();

        // active color
        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::BadActiveColor),
        };

        // castling rights
        if fields[2] != "-" {
            for c in fields[2].chars() {
                pos.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(FenError::BadCastling(c)),
                };
            }
        }

        // en-passant square
        if fields[3] != "-" {
            let sq: Square = fields[3].parse().map_err(|_| FenError::BadEpSquare)?;
            pos.ep_square = sq.bb();
        }

        // half-move clock; full-move counter is field 5, parsed by presence only
        pos.rule50 = fields[4]
            .parse()
            .map_err(|_| FenError::BadHalfmoveClock)?;

        pos.hash = pos.compute_hash_full();
        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                let sq_bb = 1u64 << (rank * 8 + file);
                let mut found = None;
                for color in 0..2 {
                    for piece in 0..6 {
                        if self.pieces[color][piece] & sq_bb != 0 {
                            found = Some((color, piece));
                        }
                    }
                }
                match found {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            out.push((b'0' + empty_run) as char);
                            empty_run = 0;
                        }
                        let c = PIECE_CHARS[piece];
                        out.push(if color == 1 { c.to_ascii_lowercase() } else { c });
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                out.push((b'0' + empty_run) as char);
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        if self.castling_rights == 0 {
            out.push('-');
        } else {
            if self.castling_rights & CASTLE_WK != 0 {
                out.push('K');
            }
            if self.castling_rights & CASTLE_WQ != 0 {
                out.push('Q');
            }
            if self.castling_rights & CASTLE_BK != 0 {
                out.push('k');
            }
            if self.castling_rights & CASTLE_BQ != 0 {
                out.push('q');
            }
        }

        out.push(' ');
        if self.ep_square == 0 {
            out.push('-');
        } else {
            out.push_str(&Square::from_index(self.ep_square.lsb()).to_string());
        }

        // full-move counter is not tracked
        out.push_str(&format!(" {} 1", self.rule50));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn startpos_matches_default() {
        let parsed = Position::from_fen(START_FEN).unwrap();
        assert_eq!(parsed, Position::new());
    }

    #[test]
    fn error_kinds() {
        assert!(matches!(
            Position::from_fen("8/8/8/8 w - - 0"),
            Err(FenError::MissingFields(5))
        ));
        assert!(matches!(
            Position::from_fen("9/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::BadPlacement)
        ));
        assert!(matches!(
            Position::from_fen("xnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::UnknownPiece('x'))
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 z - - 0 1"),
            Err(FenError::BadActiveColor)
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 w Kz - 0 1"),
            Err(FenError::BadCastling('z'))
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 w - e9 0 1"),
            Err(FenError::BadEpSquare)
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 w - - x 1"),
            Err(FenError::BadHalfmoveClock)
        ));
    }
}
