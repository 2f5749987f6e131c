use crate::bitboard::pop_lsb;
use crate::board::{Color, Piece, Position};
use crate::search::Score;

const PAWN_VAL: Score = 100;
const KNIGHT_VAL: Score = 320;
const BISHOP_VAL: Score = 330;
const ROOK_VAL: Score = 500;
const QUEEN_VAL: Score = 900;

const MATERIAL: [Score; 6] = [PAWN_VAL, KNIGHT_VAL, BISHOP_VAL, ROOK_VAL, QUEEN_VAL, 0];

/// Small constant for having the move.
const TEMPO_BONUS: Score = 10;

// Piece-square tables, white-indexed; black mirrors via sq ^ 56.
#[rustfmt::skip]
const PST: [[i16; 64]; 6] = [
    // pawn
    [
          0,   0,   0,   0,   0,   0,   0,   0,
          5,  10,  10, -20, -20,  10,  10,   5,
          5,  -5, -10,   0,   0, -10,  -5,   5,
          0,   0,   0,  20,  20,   0,   0,   0,
          5,   5,  10,  25,  25,  10,   5,   5,
         10,  10,  20,  30,  30,  20,  10,  10,
         50,  50,  50,  50,  50,  50,  50,  50,
          0,   0,   0,   0,   0,   0,   0,   0,
    ],
    // knight
    [
        -50, -40, -30, -30, -30, -30, -40, -50,
        -40, -20,   0,   5,   5,   0, -20, -40,
        -30,   5,  10,  15,  15,  10,   5, -30,
        -30,   0,  15,  20,  20,  15,   0, -30,
        -30,   5,  15,  20,  20,  15,   5, -30,
        -30,   0,  10,  15,  15,  10,   0, -30,
        -40, -20,   0,   0,   0,   0, -20, -40,
        -50, -40, -30, -30, -30, -30, -40, -50,
    ],
    // bishop
    [
        -20, -10, -10, -10, -10, -10, -10, -20,
        -10,   5,   0,   0,   0,   0,   5, -10,
        -10,  10,  10,  10,  10,  10,  10, -10,
        -10,   0,  10,  10,  10,  10,   0, -10,
        -10,   5,   5,  10,  10,   5,   5, -10,
        -10,   0,   5,  10,  10,   5,   0, -10,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -20, -10, -10, -10, -10, -10, -10, -20,
    ],
    // rook
    [
          0,   0,   0,   5,   5,   0,   0,   0,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
          5,  10,  10,  10,  10,  10,  10,   5,
          0,   0,   0,   0,   0,   0,   0,   0,
    ],
    // queen
    [
        -20, -10, -10,  -5,  -5, -10, -10, -20,
        -10,   0,   5,   0,   0,   0,   0, -10,
        -10,   5,   5,   5,   5,   5,   0, -10,
          0,   0,   5,   5,   5,   5,   0,  -5,
         -5,   0,   5,   5,   5,   5,   0,  -5,
        -10,   0,   5,   5,   5,   5,   0, -10,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -20, -10, -10,  -5,  -5, -10, -10, -20,
    ],
    // king (middlegame)
    [
         20,  30,  10,   0,   0,  10,  30,  20,
         20,  20,   0,   0,   0,   0,  20,  20,
        -10, -20, -20, -20, -20, -20, -20, -10,
        -20, -30, -30, -40, -40, -30, -30, -20,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
    ],
];

fn material_score(pos: &Position) -> Score {
    let mut white = 0;
    let mut black = 0;
    for piece in 0..6 {
        white += pos.pieces[0][piece].count_ones() as Score * MATERIAL[piece];
        black += pos.pieces[1][piece].count_ones() as Score * MATERIAL[piece];
    }
    white - black
}

fn pst_score(pos: &Position) -> Score {
    let mut score = 0;
    for piece in 0..6 {
        let pst = &PST[piece];

        let mut white = pos.pieces[0][piece];
        while white != 0 {
            let sq = pop_lsb(&mut white) as usize;
            score += pst[sq] as Score;
        }

        let mut black = pos.pieces[1][piece];
        while black != 0 {
            let sq = pop_lsb(&mut black) as usize;
            score -= pst[sq ^ 56] as Score;
        }
    }
    score
}

/// Static positional score from the side-to-move's view.
pub fn eval(pos: &Position) -> Score {
    let mut score = material_score(pos) + pst_score(pos);

    if pos.side_to_move == Color::Black {
        score = -score;
    }

    score + TEMPO_BONUS
}

/// Material value of one piece type, exposed for tests.
pub fn piece_value(piece: Piece) -> Score {
    MATERIAL[piece.index()]
}
