pub mod eval;
pub mod limits;
pub mod manager;
pub mod search;
pub mod tt;

/// Centipawn-scale evaluation score.
pub type Score = i32;

pub const INF: Score = i32::MAX;

/// Score of the side to move when checkmated at ply 0; mate scores are
/// encoded as `MATED_SCORE + ply`.
pub const MATED_SCORE: Score = -100_000_000;
