use crate::board::Position;
use crate::moves::movegen::generate_legal;
use crate::moves::perft::perft_divide;
use crate::moves::tables::{Tables, tables};
use crate::moves::types::Move;
use crate::search::limits::GoLimits;
use crate::search::manager::SearchManager;
use crate::search::tt::TranspositionTable;
use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::time::Instant;

const DEFAULT_HASH_MB: usize = 10;
const MIN_HASH_MB: i64 = 1;
const MAX_HASH_MB: i64 = 131072;

/// Text-protocol adapter between a UCI GUI and the engine core. Owns the
/// idle Position; searches run on a clone handed to the manager.
pub struct UciEngine {
    position: Position,
    tables: &'static Tables,
    tt: Arc<Mutex<TranspositionTable>>,
    manager: SearchManager,
    debug_mode: bool,
}

impl UciEngine {
    pub fn new() -> Self {
        UciEngine {
            position: Position::new(),
            tables: tables(),
            tt: Arc::new(Mutex::new(TranspositionTable::new(DEFAULT_HASH_MB))),
            manager: SearchManager::new(),
            debug_mode: false,
        }
    }

    /// Current idle position, as set by `position`/`ucinewgame`.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Reads commands from stdin until `quit` or EOF.
    pub fn run(&mut self) {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if !self.handle_line(&line) {
                break;
            }
        }
        self.manager.stop_search();
    }

    /// Dispatches one command line; returns false on `quit`. Keywords are
    /// matched case-insensitively, FEN and move text keep their case.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return true;
        }
        let lower: Vec<String> = tokens.iter().map(|t| t.to_ascii_lowercase()).collect();

        match lower[0].as_str() {
            "uci" => self.handle_uci(),
            "debug" => self.handle_debug(&lower),
            "isready" => println!("readyok"),
            "setoption" => self.handle_setoption(&tokens, &lower),
            "ucinewgame" => {
                self.position = Position::new();
                self.debug_info("new UCI game initialized");
            }
            "position" => self.handle_position(&tokens, &lower),
            "go" => self.handle_go(&tokens, &lower),
            "ponderhit" => self.debug_info("'ponderhit' not implemented yet"),
            "stop" => self.manager.stop_search(),
            "quit" => {
                self.manager.stop_search();
                return false;
            }
            _ => {}
        }
        true
    }

    fn debug_info(&self, message: &str) {
        if self.debug_mode {
            println!("info string {}", message);
        }
    }

    fn handle_uci(&self) {
        println!("id name Stonewall {}", env!("CARGO_PKG_VERSION"));
        println!("id author the Stonewall developers");
        println!(
            "option name Hash type spin default {} min {} max {}",
            DEFAULT_HASH_MB, MIN_HASH_MB, MAX_HASH_MB
        );
        println!("option name Clear Hash type button");
        println!("uciok");
    }

    fn handle_debug(&mut self, lower: &[String]) {
        match lower.get(1).map(String::as_str) {
            Some("on") => self.debug_mode = true,
            Some("off") => self.debug_mode = false,
            Some(_) => self.debug_info("expected 'on' or 'off'"),
            None => self.debug_info("missing argument"),
        }
    }

    fn handle_setoption(&mut self, tokens: &[&str], lower: &[String]) {
        // setoption name <id> [value <x>]
        if lower.get(1).map(String::as_str) != Some("name") {
            self.debug_info("setoption: expected 'name'");
            return;
        }

        let mut pos = 2;
        let mut lname = String::new();
        while pos < tokens.len() && lower[pos] != "value" {
            if !lname.is_empty() {
                lname.push(' ');
            }
            lname.push_str(&lower[pos]);
            pos += 1;
        }

        let mut value = String::new();
        if pos < tokens.len() && lower[pos] == "value" {
            pos += 1;
            while pos < tokens.len() {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(tokens[pos]);
                pos += 1;
            }
        }

        match lname.as_str() {
            "hash" => match value.parse::<i64>() {
                Ok(mb) => {
                    let mb = mb.clamp(MIN_HASH_MB, MAX_HASH_MB);
                    self.tt.lock().unwrap().resize(mb as usize);
                    self.debug_info(&format!("TT resized to {} MiB", mb));
                }
                Err(_) => self.debug_info(&format!("setoption Hash: invalid value '{}'", value)),
            },
            "clear hash" => {
                self.tt.lock().unwrap().clear();
                self.debug_info("TT cleared");
            }
            _ => self.debug_info(&format!("setoption: unknown option '{}'", lname)),
        }
    }

    fn handle_position(&mut self, tokens: &[&str], lower: &[String]) {
        // position [startpos | fen <FEN...>] [moves <m1> <m2> ...]
        let Some(kind) = lower.get(1) else {
            self.debug_info("missing argument");
            return;
        };

        let mut pos_idx;
        match kind.as_str() {
            "startpos" => {
                self.position = Position::new();
                pos_idx = 2;
            }
            "fen" => {
                let fen_start = 2;
                let mut fen_end = fen_start;
                while fen_end < lower.len() && lower[fen_end] != "moves" {
                    fen_end += 1;
                }
                if fen_start == fen_end {
                    self.debug_info("missing FEN");
                    return;
                }
                let fen = tokens[fen_start..fen_end].join(" ");
                match Position::from_fen(&fen) {
                    Ok(parsed) => self.position = parsed,
                    Err(err) => {
                        self.debug_info(&format!("invalid FEN string: {}", err));
                        return;
                    }
                }
                pos_idx = fen_end;
            }
            _ => {
                self.debug_info("expected 'startpos' or 'fen'");
                return;
            }
        }

        if lower.get(pos_idx).map(String::as_str) == Some("moves") {
            pos_idx += 1;
            while pos_idx < tokens.len() {
                let lan = tokens[pos_idx];
                match self.find_legal_move(lan) {
                    Some(mv) => self.position.make_move(mv),
                    None => self.debug_info(&format!("illegal or unknown move: {}", lan)),
                }
                pos_idx += 1;
            }
        }

        self.debug_info("position set");
    }

    fn find_legal_move(&self, lan: &str) -> Option<Move> {
        let legal = generate_legal(&self.position, self.tables, false);
        legal.iter().copied().find(|m| m.to_lan() == lan)
    }

    fn handle_go(&mut self, tokens: &[&str], lower: &[String]) {
        let command_received = Instant::now();

        let mut limits = GoLimits::default();
        let mut is_perft = false;
        let mut perft_depth = 0u32;

        let is_keyword = |s: &str| {
            matches!(
                s,
                "searchmoves"
                    | "ponder"
                    | "wtime"
                    | "btime"
                    | "winc"
                    | "binc"
                    | "movestogo"
                    | "depth"
                    | "nodes"
                    | "mate"
                    | "movetime"
                    | "infinite"
            )
        };

        let mut pos = 1;
        while pos < lower.len() {
            let keyword = lower[pos].as_str();
            pos += 1;
            match keyword {
                "searchmoves" => {
                    while pos < lower.len() && !is_keyword(&lower[pos]) {
                        let text = tokens[pos];
                        match self.find_legal_move(text) {
                            Some(mv) => limits.search_moves.push(mv),
                            None => {
                                self.debug_info(&format!("ignoring unknown searchmove '{}'", text))
                            }
                        }
                        pos += 1;
                    }
                }
                "ponder" => limits.ponder = true,
                "infinite" => limits.infinite = true,
                "wtime" | "btime" | "winc" | "binc" | "movestogo" | "depth" | "nodes"
                | "mate" | "movetime" | "perft" => {
                    let parsed = match keyword {
                        "wtime" => parse_num(tokens, &mut pos, &mut limits.time_left_ms[0]),
                        "btime" => parse_num(tokens, &mut pos, &mut limits.time_left_ms[1]),
                        "winc" => parse_num(tokens, &mut pos, &mut limits.inc_ms[0]),
                        "binc" => parse_num(tokens, &mut pos, &mut limits.inc_ms[1]),
                        "movestogo" => parse_num(tokens, &mut pos, &mut limits.moves_to_go),
                        "depth" => parse_num(tokens, &mut pos, &mut limits.depth_limit),
                        "nodes" => parse_num(tokens, &mut pos, &mut limits.node_limit),
                        "mate" => parse_num(tokens, &mut pos, &mut limits.prove_mate_in_n),
                        "movetime" => parse_num(tokens, &mut pos, &mut limits.move_time_ms),
                        _ => {
                            is_perft = true;
                            parse_num(tokens, &mut pos, &mut perft_depth)
                        }
                    };
                    if !parsed {
                        self.debug_info(&format!("missing/invalid {} value", keyword));
                    }
                }
                _ => {
                    self.debug_info(&format!("unknown go-token '{}'", keyword));
                    return;
                }
            }
        }

        if is_perft {
            let start = Instant::now();
            let mut scratch = self.position.clone();
            let nodes = perft_divide(&mut scratch, self.tables, perft_depth);
            println!(
                "\nNodes searched: {} in {:.3}s\n",
                nodes,
                start.elapsed().as_secs_f64()
            );
            return;
        }

        self.manager.run_search(
            &self.position,
            limits,
            command_received,
            Arc::clone(&self.tt),
            |best_move| println!("bestmove {}", best_move.to_lan()),
        );
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        UciEngine::new()
    }
}

fn parse_num<T: std::str::FromStr>(tokens: &[&str], pos: &mut usize, out: &mut T) -> bool {
    let parsed = match tokens.get(*pos) {
        Some(token) => match token.parse() {
            Ok(value) => {
                *out = value;
                true
            }
            Err(_) => false,
        },
        None => false,
    };
    *pos += 1;
    parsed
}
