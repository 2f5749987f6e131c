use crate::moves::types::Move;
use crate::search::Score;
use tracing::warn;

pub const CLUSTER_SIZE: usize = 4;

/// How a stored score bounds the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TtFlag {
    Exact,
    /// from a beta cutoff
    Lower,
    /// no move raised alpha
    Upper,
}

impl TtFlag {
    /// Exact beats Lower beats Upper when deciding whether to overwrite a
    /// same-position entry.
    #[inline(always)]
    fn priority(self) -> u8 {
        match self {
            TtFlag::Exact => 2,
            TtFlag::Lower => 1,
            TtFlag::Upper => 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    pub best_move: Move,
    /// score, already translated to root-relative mate distance
    pub value: Score,
    pub age: u16,
    /// top 16 bits of the zobrist key
    pub key_tag: u16,
    /// negative marks an empty slot
    pub depth: i8,
    pub flag: TtFlag,
}

impl TtEntry {
    fn empty() -> Self {
        TtEntry {
            best_move: Move::NULL,
            value: 0,
            age: u16::MAX,
            key_tag: u16::MAX,
            depth: -1,
            flag: TtFlag::Upper,
        }
    }
}

/// Bucketed transposition table. Keys are not stored; probes match on the
/// 16-bit tag and callers verify by playing the stored move.
pub struct TranspositionTable {
    table: Vec<TtEntry>,
    age: u16,
}

impl TranspositionTable {
    pub fn new(mb: usize) -> Self {
        let mut tt = TranspositionTable {
            table: Vec::new(),
            age: 0,
        };
        tt.resize(mb);
        tt
    }

    /// Reallocates for `mb` mebibytes, rounded down to whole clusters with a
    /// floor of CLUSTER_SIZE * 1024 entries. On allocation failure the prior
    /// table is kept.
    pub fn resize(&mut self, mb: usize) {
        let bytes = mb * 1024 * 1024;
        let mut capacity = bytes / std::mem::size_of::<TtEntry>();
        capacity = (capacity / CLUSTER_SIZE * CLUSTER_SIZE).max(CLUSTER_SIZE * 1024);

        let mut fresh: Vec<TtEntry> = Vec::new();
        if fresh.try_reserve_exact(capacity).is_err() {
            warn!(mb, capacity, "transposition table resize failed, keeping prior table");
            return;
        }
        fresh.resize(capacity, TtEntry::empty());

        self.table = fresh;
        self.age = 0;
    }

    pub fn clear(&mut self) {
        self.table.fill(TtEntry::empty());
        self.age = 0;
    }

    /// Called once at the start of each root search.
    pub fn new_search(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    #[inline(always)]
    fn cluster_base(&self, key: u64) -> usize {
        let num_clusters = self.table.len() / CLUSTER_SIZE;
        (key % num_clusters as u64) as usize * CLUSTER_SIZE
    }

    #[inline(always)]
    fn key_tag(key: u64) -> u16 {
        (key >> 48) as u16
    }

    pub fn probe(&self, key: u64) -> Option<TtEntry> {
        let base = self.cluster_base(key);
        let tag = Self::key_tag(key);

        for entry in &self.table[base..base + CLUSTER_SIZE] {
            if entry.depth >= 0 && entry.key_tag == tag {
                return Some(*entry);
            }
        }
        None
    }

    pub fn store(&mut self, key: u64, depth: i32, value: Score, flag: TtFlag, best_move: Move) {
        let tag = Self::key_tag(key);
        let base = self.cluster_base(key);
        let depth = depth.min(i8::MAX as i32) as i8;

        let mut empty_idx = None;
        let mut same_idx = None;
        for i in 0..CLUSTER_SIZE {
            let entry = &self.table[base + i];
            if entry.depth < 0 && empty_idx.is_none() {
                empty_idx = Some(i);
            }
            if entry.key_tag == tag {
                same_idx = Some(i);
                break;
            }
        }

        let victim_idx = if let Some(same) = same_idx {
            let existing = &self.table[base + same];
            let better_flag = flag.priority() > existing.flag.priority();
            if !better_flag && depth < existing.depth {
                return; // keep the deeper, at-least-as-informative entry
            }
            same
        } else if let Some(empty) = empty_idx {
            empty
        } else {
            // evict the shallowest, oldest entry
            let mut best_idx = 0;
            let mut best_score = -1i32;
            for i in 0..CLUSTER_SIZE {
                let entry = &self.table[base + i];
                let depth_term = (127 - entry.depth as i32) * 256;
                let age_term = self.age.wrapping_sub(entry.age) as i32;
                let replace_score = depth_term + age_term;
                if replace_score > best_score {
                    best_score = replace_score;
                    best_idx = i;
                }
            }
            best_idx
        };

        self.table[base + victim_idx] = TtEntry {
            best_move,
            value,
            age: self.age,
            key_tag: tag,
            depth,
            flag,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;

    fn mv(from: u8, to: u8) -> Move {
        Move::new(from, to, Piece::Knight, None, false, false)
    }

    #[test]
    fn resize_has_cluster_aligned_floor() {
        let tt = TranspositionTable::new(0);
        assert_eq!(tt.table.len(), CLUSTER_SIZE * 1024);
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.table.len() % CLUSTER_SIZE, 0);
        assert!(tt.table.len() >= CLUSTER_SIZE * 1024);
    }

    #[test]
    fn store_then_probe_round_trips() {
        let mut tt = TranspositionTable::new(1);
        let key = 0xDEAD_BEEF_1234_5678;
        tt.store(key, 7, 42, TtFlag::Exact, mv(1, 18));

        let entry = tt.probe(key).expect("stored entry must be found");
        assert_eq!(entry.depth, 7);
        assert_eq!(entry.value, 42);
        assert_eq!(entry.flag, TtFlag::Exact);
        assert_eq!(entry.best_move, mv(1, 18));
    }

    #[test]
    fn probe_never_matches_a_different_tag() {
        let mut tt = TranspositionTable::new(1);
        let key = 0x0001_0000_0000_0100;
        tt.store(key, 3, 10, TtFlag::Exact, mv(1, 18));

        // same cluster, different top bits
        let other = 0x0002_0000_0000_0100;
        assert!(tt.probe(other).is_none());
    }

    #[test]
    fn same_tag_keeps_deeper_more_informative_entry() {
        let mut tt = TranspositionTable::new(1);
        let key = 0xABCD_0000_0000_0042;
        tt.store(key, 9, 100, TtFlag::Exact, mv(1, 18));

        // shallower upper bound must not displace a deep exact entry
        tt.store(key, 2, -5, TtFlag::Upper, mv(2, 19));
        let entry = tt.probe(key).unwrap();
        assert_eq!(entry.depth, 9);
        assert_eq!(entry.value, 100);

        // deeper store for the same position wins
        tt.store(key, 12, 77, TtFlag::Upper, mv(3, 20));
        let entry = tt.probe(key).unwrap();
        assert_eq!(entry.depth, 12);
        assert_eq!(entry.value, 77);
    }

    #[test]
    fn full_cluster_evicts_shallow_and_old_first() {
        let mut tt = TranspositionTable::new(0);

        // four distinct tags hashing into cluster 5
        let keys: Vec<u64> = (1..=4u64).map(|tag| (tag << 48) | 5).collect();
        for (i, &key) in keys.iter().enumerate() {
            tt.store(key, 10 + i as i32, i as Score, TtFlag::Exact, mv(1, 18));
        }
        // a fifth tag in the same cluster evicts the shallowest (depth 10)
        let newcomer = (9u64 << 48) | 5;
        tt.store(newcomer, 1, 99, TtFlag::Exact, mv(4, 21));

        assert!(tt.probe(newcomer).is_some());
        assert!(tt.probe(keys[0]).is_none(), "shallowest entry evicted");
        for &key in &keys[1..] {
            assert!(tt.probe(key).is_some());
        }
    }

    #[test]
    fn age_bump_prefers_evicting_stale_entries() {
        let mut tt = TranspositionTable::new(0);

        let old_key = (1u64 << 48) | 7;
        tt.store(old_key, 5, 1, TtFlag::Exact, mv(1, 18));

        // several searches later, fill the cluster at the same depth
        for _ in 0..3 {
            tt.new_search();
        }
        for tag in 2..=4u64 {
            tt.store((tag << 48) | 7, 5, 2, TtFlag::Exact, mv(2, 19));
        }
        let newcomer = (9u64 << 48) | 7;
        tt.store(newcomer, 5, 3, TtFlag::Exact, mv(3, 20));

        assert!(tt.probe(newcomer).is_some());
        assert!(tt.probe(old_key).is_none(), "oldest same-depth entry evicted");
    }

    #[test]
    fn clear_empties_every_slot() {
        let mut tt = TranspositionTable::new(1);
        let key = 0x1111_0000_0000_0001;
        tt.store(key, 4, 9, TtFlag::Lower, mv(1, 18));
        tt.clear();
        assert!(tt.probe(key).is_none());
    }
}
