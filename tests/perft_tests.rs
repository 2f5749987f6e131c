use std::time::Instant;
use stonewall::board::Position;
use stonewall::moves::perft::perft;
use stonewall::moves::tables::tables;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3_FEN: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

fn run_perft(fen: &str, depth: u32, expected_nodes: u64) {
    let t = tables();
    let mut pos = Position::from_fen(fen).expect("valid test FEN");

    let start = Instant::now();
    let nodes = perft(&mut pos, t, depth);
    let secs = start.elapsed().as_secs_f64().max(1e-9);
    println!("d{depth}: nodes={nodes} time={secs:.3}s nps={}", (nodes as f64 / secs) as u64);

    assert_eq!(
        nodes, expected_nodes,
        "perft mismatch at depth {depth}: got {nodes}, expected {expected_nodes}"
    );
}

#[test]
fn perft_startpos_d1() {
    run_perft(START_FEN, 1, 20);
}

#[test]
fn perft_startpos_d2() {
    run_perft(START_FEN, 2, 400);
}

#[test]
fn perft_startpos_d3() {
    run_perft(START_FEN, 3, 8_902);
}

#[test]
fn perft_startpos_d4() {
    run_perft(START_FEN, 4, 197_281);
}

#[test]
fn perft_startpos_d5() {
    run_perft(START_FEN, 5, 4_865_609);
}

// deep nodes, opt-in
#[test]
#[ignore]
fn perft_startpos_d6() {
    run_perft(START_FEN, 6, 119_060_324);
}

#[test]
fn perft_kiwipete_d1() {
    run_perft(KIWIPETE_FEN, 1, 48);
}

#[test]
fn perft_kiwipete_d2() {
    run_perft(KIWIPETE_FEN, 2, 2_039);
}

#[test]
fn perft_kiwipete_d3() {
    run_perft(KIWIPETE_FEN, 3, 97_862);
}

#[test]
fn perft_kiwipete_d4() {
    run_perft(KIWIPETE_FEN, 4, 4_085_603);
}

#[test]
#[ignore]
fn perft_kiwipete_d5() {
    run_perft(KIWIPETE_FEN, 5, 193_690_690);
}

#[test]
fn perft_position3_d1() {
    run_perft(POSITION_3_FEN, 1, 14);
}

#[test]
fn perft_position3_d2() {
    run_perft(POSITION_3_FEN, 2, 191);
}

#[test]
fn perft_position3_d3() {
    run_perft(POSITION_3_FEN, 3, 2_812);
}

#[test]
fn perft_position3_d4() {
    run_perft(POSITION_3_FEN, 4, 43_238);
}

#[test]
fn perft_position3_d5() {
    run_perft(POSITION_3_FEN, 5, 674_624);
}

#[test]
#[ignore]
fn perft_position3_d6() {
    run_perft(POSITION_3_FEN, 6, 11_030_083);
}

// en-passant and promotion heavy lines
#[test]
fn perft_position4_d3() {
    run_perft(
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        3,
        9_467,
    );
}

#[test]
fn perft_position5_d3() {
    run_perft(
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        3,
        62_379,
    );
}

#[test]
fn perft_position6_d3() {
    run_perft(
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        3,
        89_890,
    );
}
