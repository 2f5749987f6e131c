use crate::bitboard::{
    Bitboard, FILE_A, FILE_B, FILE_G, FILE_H, RANK_1, RANK_2, RANK_7, RANK_8,
};
use crate::board::Color;
use crate::moves::magic::{MagicEntry, bishop_attacks_scan, build_entry, rook_attacks_scan};
use once_cell::sync::OnceCell;
use rand::{SeedableRng, rngs::StdRng};

/// Fixed seed for the magic-number search; the found constants are
/// deterministic per process and verified by construction.
const MAGIC_SEED: u64 = 0x45;

/// Precomputed attack, xray, between and line masks plus the magic sliding
/// lookup. Built once at startup, read-only thereafter.
pub struct Tables {
    pub king_moves: [Bitboard; 64],
    pub knight_moves: [Bitboard; 64],
    /// [color][square] single-step push targets
    pub pawn_push: [[Bitboard; 64]; 2],
    /// [color][square] capture toward the a-file
    pub pawn_capture_left: [[Bitboard; 64]; 2],
    /// [color][square] capture toward the h-file
    pub pawn_capture_right: [[Bitboard; 64]; 2],
    /// full orthogonal rays from each square, ignoring blockers
    pub rook_xray: [Bitboard; 64],
    /// full diagonal rays from each square, ignoring blockers
    pub bishop_xray: [Bitboard; 64],
    /// squares strictly between two squares sharing a queen-style ray
    pub between: Box<[[Bitboard; 64]; 64]>,
    /// the full ray through two squares, extended to the board edges
    pub line: Box<[[Bitboard; 64]; 64]>,
    rook_magic: Vec<MagicEntry>,
    bishop_magic: Vec<MagicEntry>,
}

/// Global tables, initialized on first use.
pub fn tables() -> &'static Tables {
    static TABLES: OnceCell<Tables> = OnceCell::new();
    TABLES.get_or_init(Tables::new)
}

impl Tables {
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(MAGIC_SEED);

        let rook_magic = (0..64)
            .map(|sq| build_entry(sq, rook_blocker_mask(sq), rook_attacks_scan, &mut rng))
            .collect();
        let bishop_magic = (0..64)
            .map(|sq| build_entry(sq, bishop_blocker_mask(sq), bishop_attacks_scan, &mut rng))
            .collect();

        let rook_xray = std::array::from_fn(|sq| rook_attacks_scan(sq, 0));
        let bishop_xray = std::array::from_fn(|sq| bishop_attacks_scan(sq, 0));

        let mut tables = Tables {
            king_moves: init_king_moves(),
            knight_moves: init_knight_moves(),
            pawn_push: init_pawn_push(),
            pawn_capture_left: init_pawn_capture_left(),
            pawn_capture_right: init_pawn_capture_right(),
            rook_xray,
            bishop_xray,
            between: Box::new([[0; 64]; 64]),
            line: Box::new([[0; 64]; 64]),
            rook_magic,
            bishop_magic,
        };
        tables.init_between_and_line();
        tables
    }

    #[inline(always)]
    pub fn rook_attacks(&self, sq: usize, occ: Bitboard) -> Bitboard {
        self.rook_magic[sq].attacks(occ)
    }

    #[inline(always)]
    pub fn bishop_attacks(&self, sq: usize, occ: Bitboard) -> Bitboard {
        self.bishop_magic[sq].attacks(occ)
    }

    #[inline(always)]
    pub fn queen_attacks(&self, sq: usize, occ: Bitboard) -> Bitboard {
        self.rook_attacks(sq, occ) | self.bishop_attacks(sq, occ)
    }

    /// Both capture directions for one pawn.
    #[inline(always)]
    pub fn pawn_attacks(&self, color: Color, sq: usize) -> Bitboard {
        let c = color.index();
        self.pawn_capture_left[c][sq] | self.pawn_capture_right[c][sq]
    }

    fn init_between_and_line(&mut self) {
        for from in 0..64usize {
            let from_rank = (from / 8) as i32;
            let from_file = (from % 8) as i32;

            for to in 0..64usize {
                let to_bb = 1u64 << to;
                if self.rook_xray[from] & to_bb == 0 && self.bishop_xray[from] & to_bb == 0 {
                    continue; // not on a shared ray
                }
                let to_rank = (to / 8) as i32;
                let to_file = (to % 8) as i32;
                let d_rank = (to_rank - from_rank).signum();
                let d_file = (to_file - from_file).signum();

                let mut between = 0u64;
                let (mut r, mut f) = (from_rank + d_rank, from_file + d_file);
                while (r, f) != (to_rank, to_file) {
                    between |= 1u64 << (r * 8 + f);
                    r += d_rank;
                    f += d_file;
                }
                self.between[from][to] = between;

                let mut line = 0u64;
                for dir in [1, -1] {
                    let (mut r, mut f) = (from_rank, from_file);
                    while (0..8).contains(&r) && (0..8).contains(&f) {
                        line |= 1u64 << (r * 8 + f);
                        r += d_rank * dir;
                        f += d_file * dir;
                    }
                }
                self.line[from][to] = line;
            }
        }
    }
}

impl Default for Tables {
    fn default() -> Self {
        Tables::new()
    }
}

fn init_king_moves() -> [Bitboard; 64] {
    std::array::from_fn(|sq| {
        let bb = 1u64 << sq;
        let mut moves = 0;
        moves |= (bb & !FILE_H) << 1;
        moves |= (bb & !FILE_A) >> 1;
        moves |= (bb & !RANK_8) << 8;
        moves |= (bb & !RANK_1) >> 8;
        moves |= (bb & !FILE_H & !RANK_8) << 9;
        moves |= (bb & !FILE_A & !RANK_8) << 7;
        moves |= (bb & !FILE_H & !RANK_1) >> 7;
        moves |= (bb & !FILE_A & !RANK_1) >> 9;
        moves
    })
}

fn init_knight_moves() -> [Bitboard; 64] {
    std::array::from_fn(|sq| {
        let bb = 1u64 << sq;
        let mut moves = 0;
        moves |= (bb & !FILE_H & !RANK_8 & !RANK_7) << 17;
        moves |= (bb & !FILE_A & !RANK_8 & !RANK_7) << 15;
        moves |= (bb & !FILE_H & !RANK_2 & !RANK_1) >> 15;
        moves |= (bb & !FILE_A & !RANK_2 & !RANK_1) >> 17;
        moves |= (bb & !FILE_G & !FILE_H & !RANK_8) << 10;
        moves |= (bb & !FILE_A & !FILE_B & !RANK_8) << 6;
        moves |= (bb & !FILE_G & !FILE_H & !RANK_1) >> 6;
        moves |= (bb & !FILE_A & !FILE_B & !RANK_1) >> 10;
        moves
    })
}

fn init_pawn_push() -> [[Bitboard; 64]; 2] {
    [
        std::array::from_fn(|sq| (1u64 << sq) << 8),
        std::array::from_fn(|sq| (1u64 << sq) >> 8),
    ]
}

fn init_pawn_capture_left() -> [[Bitboard; 64]; 2] {
    [
        std::array::from_fn(|sq| ((1u64 << sq) & !FILE_A) << 7),
        std::array::from_fn(|sq| ((1u64 << sq) & !FILE_A) >> 9),
    ]
}

fn init_pawn_capture_right() -> [[Bitboard; 64]; 2] {
    [
        std::array::from_fn(|sq| ((1u64 << sq) & !FILE_H) << 9),
        std::array::from_fn(|sq| ((1u64 << sq) & !FILE_H) >> 7),
    ]
}

/// Relevant rook blockers: the rays without the square itself and without
/// the edge square of each ray.
fn rook_blocker_mask(sq: usize) -> Bitboard {
    let rank = sq / 8;
    let file = sq % 8;
    let mut mask = 0u64;

    for r in (rank + 1)..7 {
        mask |= 1u64 << (r * 8 + file);
    }
    for r in 1..rank {
        mask |= 1u64 << (r * 8 + file);
    }
    for f in (file + 1)..7 {
        mask |= 1u64 << (rank * 8 + f);
    }
    for f in 1..file {
        mask |= 1u64 << (rank * 8 + f);
    }
    mask
}

fn bishop_blocker_mask(sq: usize) -> Bitboard {
    let rank = (sq / 8) as i32;
    let file = (sq % 8) as i32;
    let mut mask = 0u64;

    for (dr, df) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let (mut r, mut f) = (rank + dr, file + df);
        while (1..7).contains(&r) && (1..7).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit(sq: usize) -> u64 {
        1u64 << sq
    }

    #[test]
    fn rook_blocker_masks_exclude_edges() {
        // a1 rook: a2..a7 and b1..g1
        let mask = rook_blocker_mask(0);
        assert_eq!(mask.count_ones(), 12);
        assert_eq!(mask & (bit(7) | bit(56)), 0);

        // d4 rook has 10 relevant squares
        assert_eq!(rook_blocker_mask(27).count_ones(), 10);
    }

    #[test]
    fn bishop_blocker_masks_exclude_edges() {
        assert_eq!(bishop_blocker_mask(27).count_ones(), 9); // d4
        assert_eq!(bishop_blocker_mask(0).count_ones(), 6); // a1
    }

    #[test]
    fn magic_lookup_matches_scan_for_samples() {
        let t = tables();
        let occupancies = [
            0u64,
            bit(19) | bit(35) | bit(41) | bit(21),
            bit(28) | bit(36) | bit(26),
        ];
        for sq in [0usize, 27, 36, 63] {
            for &occ in &occupancies {
                assert_eq!(
                    t.rook_attacks(sq, occ),
                    rook_attacks_scan(sq, occ & rook_blocker_mask(sq)),
                    "rook mismatch on square {}",
                    sq
                );
                assert_eq!(
                    t.bishop_attacks(sq, occ),
                    bishop_attacks_scan(sq, occ & bishop_blocker_mask(sq)),
                    "bishop mismatch on square {}",
                    sq
                );
            }
        }
    }

    #[test]
    fn between_masks() {
        let t = tables();
        // a1..a8: six squares strictly between
        assert_eq!(t.between[0][56].count_ones(), 6);
        // adjacent squares have nothing between them
        assert_eq!(t.between[0][1], 0);
        // d4 and e6 share no ray
        assert_eq!(t.between[27][44], 0);
        // a1..h8 diagonal
        assert_eq!(t.between[0][63].count_ones(), 6);
        assert_ne!(t.between[0][63] & bit(27), 0);
    }

    #[test]
    fn line_masks_extend_to_edges() {
        let t = tables();
        // b2 and c3 lie on the full a1-h8 diagonal
        let diag = t.line[9][18];
        assert_ne!(diag & bit(0), 0);
        assert_ne!(diag & bit(63), 0);
        assert_eq!(diag.count_ones(), 8);
        // not collinear: empty
        assert_eq!(t.line[0][12], 0);
    }

    #[test]
    fn knight_and_king_tables() {
        let t = tables();
        assert_eq!(t.knight_moves[0].count_ones(), 2); // a1
        assert_eq!(t.knight_moves[27].count_ones(), 8); // d4
        assert_eq!(t.king_moves[0].count_ones(), 3); // a1
        assert_eq!(t.king_moves[27].count_ones(), 8); // d4
    }

    #[test]
    fn pawn_masks_respect_files_and_direction() {
        let t = tables();
        let e2 = 12usize;
        assert_eq!(t.pawn_push[0][e2], bit(20));
        assert_eq!(t.pawn_attacks(Color::White, e2), bit(19) | bit(21));
        // a-file pawn only captures toward b
        let a2 = 8usize;
        assert_eq!(t.pawn_attacks(Color::White, a2), bit(17));
        // black pawn moves down the board
        let e7 = 52usize;
        assert_eq!(t.pawn_push[1][e7], bit(44));
        assert_eq!(t.pawn_attacks(Color::Black, e7), bit(43) | bit(45));
    }
}
