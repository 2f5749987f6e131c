use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Fixed seed so hashes are stable across runs; the transposition table and
/// all make/undo invariants depend only on the keys being consistent
/// process-wide.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct ZobristKeys {
    /// [color][piece][square] with {White=0, Black=1} and {P,N,B,R,Q,K}={0..5}
    pub piece: [[[u64; 64]; 6]; 2],
    /// Indexed by the full 4-bit castling-rights mask. Updates XOR the old
    /// mask's key out and the new mask's key in, so a rights "change" that
    /// changes nothing cancels exactly.
    pub castling: [u64; 16],
    /// a..h => 0..7
    pub ep_file: [u64; 8],
    pub black_to_move: u64,
}

/// Global keys, initialized on first use.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED)))
}

fn generate_keys(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        // avoid zero keys to reduce degenerate collisions
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        castling: [0u64; 16],
        ep_file: [0u64; 8],
        black_to_move: 0,
    };

    for color in 0..2 {
        for piece in 0..6 {
            for sq in 0..64 {
                keys.piece[color][piece][sq] = non_zero(&mut rng);
            }
        }
    }

    for key in keys.castling.iter_mut() {
        *key = non_zero(&mut rng);
    }

    for key in keys.ep_file.iter_mut() {
        *key = non_zero(&mut rng);
    }

    keys.black_to_move = non_zero(&mut rng);

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic() {
        let a = generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED));
        let b = generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED));
        assert_eq!(a.piece[0][0][0], b.piece[0][0][0]);
        assert_eq!(a.black_to_move, b.black_to_move);
        assert_eq!(a.castling, b.castling);
    }

    #[test]
    fn keys_are_distinct_in_sample() {
        let keys = zobrist_keys();
        let sample = [
            keys.piece[0][0][0],
            keys.piece[1][5][63],
            keys.castling[0b1111],
            keys.ep_file[4],
            keys.black_to_move,
        ];
        for i in 0..sample.len() {
            for j in (i + 1)..sample.len() {
                assert_ne!(sample[i], sample[j]);
            }
        }
    }
}
