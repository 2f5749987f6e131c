use crate::board::{MAX_PLY, Position};
use crate::moves::movegen::generate_legal;
use crate::moves::tables::{Tables, tables};
use crate::moves::types::Move;
use crate::search::eval::eval;
use crate::search::limits::GoLimits;
use crate::search::tt::{TranspositionTable, TtFlag};
use crate::search::{INF, MATED_SCORE, Score};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

const NEG_MATE_THRESHOLD: Score = MATED_SCORE + MAX_PLY as Score;
const POS_MATE_THRESHOLD: Score = -MATED_SCORE - MAX_PLY as Score;

#[inline(always)]
pub fn is_mate_score(score: Score) -> bool {
    score <= NEG_MATE_THRESHOLD || score >= POS_MATE_THRESHOLD
}

/// Shifts a ply-relative mate score to a root-relative distance before it
/// enters the table. Off-by-ones here corrupt mate-in-N reporting.
#[inline(always)]
pub fn score_to_tt(score: Score, ply: i32) -> Score {
    if score <= NEG_MATE_THRESHOLD {
        score - ply
    } else if score >= POS_MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Reverses `score_to_tt` using the probing node's ply.
#[inline(always)]
pub fn score_from_tt(score: Score, ply: i32) -> Score {
    if score <= NEG_MATE_THRESHOLD {
        score + ply
    } else if score >= POS_MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Single-threaded iterative-deepening negamax searcher. Owns its Position
/// for the duration of a search.
pub struct SearchEngine {
    position: Position,
    tables: &'static Tables,
    best_move: Move,
    nodes_remaining: i64,
    requested_stop: Arc<AtomicBool>,
}

impl SearchEngine {
    pub fn new(requested_stop: Arc<AtomicBool>) -> Self {
        SearchEngine {
            position: Position::new(),
            tables: tables(),
            best_move: Move::NULL,
            nodes_remaining: 0,
            requested_stop,
        }
    }

    pub fn fetch_best_move(&self) -> Move {
        self.best_move
    }

    pub fn search(
        &mut self,
        search_position: &Position,
        limits: &GoLimits,
        tt: &mut TranspositionTable,
    ) {
        self.position = search_position.clone();
        self.position.reset_ply();
        self.nodes_remaining = limits.node_limit;
        self.best_move = Move::NULL;
        tt.new_search();

        let mut root_moves = if limits.search_moves.is_empty() {
            generate_legal(&self.position, self.tables, false)
        } else {
            limits.search_moves.clone()
        };

        if root_moves.is_empty() {
            return;
        }

        if let Some(entry) = tt.probe(self.position.hash)
            && !entry.best_move.is_null()
        {
            root_moves.move_to_front(entry.best_move);
        }

        let mut depth_limit = if limits.depth_limit > 0 {
            limits.depth_limit.min(MAX_PLY as i32)
        } else {
            MAX_PLY as i32
        };
        if limits.prove_mate_in_n > 0 {
            depth_limit = depth_limit.min(limits.prove_mate_in_n * 2);
        }

        for depth in 1..=depth_limit {
            let mut iter_best_score = -INF;
            let mut iter_best_move = Move::NULL;
            let mut root_scores: Vec<(Move, Score)> = Vec::with_capacity(root_moves.len());
            let mut aborted = false;

            for &mv in root_moves.iter() {
                if self.requested_stop.load(Ordering::Relaxed) {
                    break;
                }

                self.position.make_move(mv);
                let (child, cancelled) = if limits.node_limit > 0 {
                    self.core_search::<true>(depth - 1, -INF, INF, tt)
                } else {
                    self.core_search::<false>(depth - 1, -INF, INF, tt)
                };
                self.position.undo_move();

                if cancelled {
                    aborted = true;
                    break;
                }

                let child_score = -child;
                if child_score > iter_best_score {
                    iter_best_score = child_score;
                    iter_best_move = mv;
                }
                root_scores.push((mv, child_score));
            }

            // safe to publish mid-iteration results: the previous iteration's
            // best move is always explored first
            if !iter_best_move.is_null() {
                self.best_move = iter_best_move;
            }

            if aborted {
                break;
            }

            debug!(depth, score = iter_best_score, best = %self.best_move, "depth completed");

            if is_mate_score(iter_best_score) {
                break;
            }

            // principal-variation priority for the next iteration; stable so
            // equal scores keep their current order
            root_scores.sort_by(|a, b| b.1.cmp(&a.1));
            for (i, &(mv, _)) in root_scores.iter().enumerate() {
                root_moves[i] = mv;
            }

            if !iter_best_move.is_null() {
                let stored = score_to_tt(iter_best_score, self.position.ply as i32);
                tt.store(self.position.hash, depth, stored, TtFlag::Exact, iter_best_move);
            }
        }
    }

    /// Negamax alpha-beta. The boolean half of the result reports
    /// cancellation, which is distinct from any score.
    fn core_search<const HAS_NODE_LIMIT: bool>(
        &mut self,
        depth: i32,
        mut alpha: Score,
        mut beta: Score,
        tt: &mut TranspositionTable,
    ) -> (Score, bool) {
        if HAS_NODE_LIMIT {
            self.nodes_remaining -= 1;
            if self.nodes_remaining < 0 {
                return (alpha, true);
            }
        }
        if self.requested_stop.load(Ordering::Relaxed) {
            return (alpha, true);
        }

        let key = self.position.hash;
        let ply = self.position.ply as i32;
        let original_alpha = alpha;
        let original_beta = beta;

        let mut tt_move = Move::NULL;
        if let Some(entry) = tt.probe(key) {
            if !entry.best_move.is_null() {
                tt_move = entry.best_move;
            }
            if entry.depth as i32 >= depth {
                let tt_score = score_from_tt(entry.value, ply);
                match entry.flag {
                    TtFlag::Exact => return (tt_score, false),
                    TtFlag::Lower => alpha = alpha.max(tt_score),
                    TtFlag::Upper => beta = beta.min(tt_score),
                }
                if alpha >= beta {
                    return (tt_score, false);
                }
            }
        }

        let mut legal_moves = generate_legal(&self.position, self.tables, false);

        // terminal: mate or stalemate
        if legal_moves.is_empty() {
            let terminal_score = if legal_moves.in_check() {
                MATED_SCORE + ply
            } else {
                0
            };
            tt.store(key, depth, score_to_tt(terminal_score, ply), TtFlag::Exact, Move::NULL);
            return (terminal_score, false);
        }

        if depth == 0 {
            let eval_score = eval(&self.position);
            tt.store(key, 0, score_to_tt(eval_score, ply), TtFlag::Exact, Move::NULL);
            return (eval_score, false);
        }

        if !tt_move.is_null() {
            legal_moves.move_to_front(tt_move);
        }

        let mut best_score = -INF;
        let mut best_move_local = Move::NULL;

        for &mv in legal_moves.iter() {
            self.position.make_move(mv);
            let (child, cancelled) =
                self.core_search::<HAS_NODE_LIMIT>(depth - 1, -beta, -alpha, tt);
            self.position.undo_move();

            if cancelled {
                return (alpha, true);
            }

            let child_score = -child;
            if child_score > best_score || best_move_local.is_null() {
                best_score = child_score;
                best_move_local = mv;
            }
            alpha = alpha.max(child_score);
            if alpha >= beta {
                break;
            }
        }

        let flag = if best_score <= original_alpha {
            TtFlag::Upper
        } else if best_score >= original_beta {
            TtFlag::Lower
        } else {
            TtFlag::Exact
        };
        tt.store(key, depth, score_to_tt(best_score, ply), flag, best_move_local);

        (best_score, false)
    }
}
