use super::castle_bits::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, Color, Piece};
use crate::square::Square;

impl Board {
    /// Loads a FEN string into `self`, replacing all existing state.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!("FEN needs at least 4 fields, got {}", fields.len()));
        }

        let mut board = Board::new_empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(format!("FEN board must have 8 ranks, got {}", ranks.len()));
        }

        let mut piece_squares: [[u64; 6]; 2] = [[0; 6]; 2];

        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top as u8;
            let mut file: u8 = 0;

            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                } else {
                    if file > 7 {
                        return Err(format!("Rank '{}' overflows the board", rank_str));
                    }
                    let (piece, color) = CHAR_TO_PC[c as usize]
                        .ok_or_else(|| format!("Unknown piece glyph '{}'", c))?;
                    let sq = rank * 8 + file;
                    piece_squares[color as usize][piece as usize] |= 1u64 << sq;
                    file += 1;
                }
            }

            if file != 8 {
                return Err(format!("Rank '{}' does not span 8 files", rank_str));
            }
        }

        for (ci, color) in [Color::White, Color::Black].into_iter().enumerate() {
            for (pi, piece) in [
                Piece::Pawn,
                Piece::Knight,
                Piece::Bishop,
                Piece::Rook,
                Piece::Queen,
                Piece::King,
            ]
            .into_iter()
            .enumerate()
            {
                board.set_bb(color, piece, piece_squares[ci][pi]);
            }
        }

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(format!("Invalid side to move '{}'", other)),
        };

        board.castling_rights = 0;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                board.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => return Err(format!("Invalid castling glyph '{}'", other)),
                };
            }
        }

        board.en_passant = if fields[3] == "-" {
            None
        } else {
            Some(parse_square(fields[3])?)
        };

        board.halfmove_clock = fields
            .get(4)
            .map(|s| s.parse().map_err(|_| format!("Invalid halfmove clock '{}'", s)))
            .transpose()?
            .unwrap_or(0);

        board.fullmove_number = fields
            .get(5)
            .map(|s| s.parse().map_err(|_| format!("Invalid fullmove number '{}'", s)))
            .transpose()?
            .unwrap_or(1);

        board.history.clear();
        board.refresh_zobrist();

        *self = board;
        Ok(())
    }

    /// Serializes the current position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut out = String::new();

        for rank_from_top in 0..8u8 {
            let rank = 7 - rank_from_top;
            let mut empty_run = 0u8;

            for file in 0..8u8 {
                let sq = Square::from_index(rank * 8 + file);
                match self.piece_at(sq) {
                    None => empty_run += 1,
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            out.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        let idx = (color as usize) * 6 + (piece as usize);
                        out.push(PC_TO_CHAR[idx]);
                    }
                }
            }

            if empty_run > 0 {
                out.push_str(&empty_run.to_string());
            }
            if rank_from_top != 7 {
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
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }

        out.push(' ');
        out.push_str(&self.halfmove_clock.to_string());
        out.push(' ');
        out.push_str(&self.fullmove_number.to_string());

        out
    }
}

fn parse_square(s: &str) -> Result<Square, String> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return Err(format!("Invalid square '{}'", s));
    }
    let file = bytes[0].wrapping_sub(b'a');
    let rank = bytes[1].wrapping_sub(b'1');
    if file > 7 || rank > 7 {
        return Err(format!("Invalid square '{}'", s));
    }
    Ok(Square::from_index(rank * 8 + file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn startpos_round_trips() {
        let board = Board::new();
        assert_eq!(board.to_fen(), STARTPOS);

        let mut parsed = Board::new_empty();
        parsed.set_fen(STARTPOS).unwrap();
        assert_eq!(parsed, board);
    }

    #[test]
    fn kiwipete_round_trips() {
        let kiwipete =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut board = Board::new_empty();
        board.set_fen(kiwipete).unwrap();
        assert_eq!(board.to_fen(), kiwipete);
    }

    #[test]
    fn en_passant_square_parses() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";
        let mut board = Board::new_empty();
        board.set_fen(fen).unwrap();
        assert_eq!(board.en_passant, Some(Square::from_index(44))); // e6
    }

    #[test]
    fn rejects_malformed_board_field() {
        let mut board = Board::new_empty();
        assert!(board.set_fen("not a fen").is_err());
    }

    #[test]
    fn rejects_short_rank() {
        let mut board = Board::new_empty();
        assert!(
            board
                .set_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPP/RNBQKBNR w KQkq - 0 1")
                .is_err()
        );
    }
}
