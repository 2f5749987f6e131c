use crate::board::Position;
use crate::moves::movegen::generate_legal;
use crate::moves::tables::Tables;
use tracing::debug;

/// Counts leaf positions of the legal-move tree after exactly `depth` plies.
/// The ground-truth oracle for the move generator.
pub fn perft(pos: &mut Position, tables: &Tables, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal(pos, tables, false);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &mv in moves.iter() {
        pos.make_move(mv);
        nodes += perft(pos, tables, depth - 1);
        pos.undo_move();
    }
    nodes
}

/// Perft with a per-root-move breakdown printed as `<lan>: <count>`,
/// matching the `go perft` output convention.
pub fn perft_divide(pos: &mut Position, tables: &Tables, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal(pos, tables, false);
    let mut nodes = 0;

    for &mv in moves.iter() {
        pos.make_move(mv);
        let count = perft(pos, tables, depth - 1);
        pos.undo_move();
        println!("{}: {}", mv.to_lan(), count);
        nodes += count;
    }

    debug!(depth, nodes, "perft divide finished");
    nodes
}
