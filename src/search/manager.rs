use crate::board::{Color, Position};
use crate::moves::types::Move;
use crate::search::limits::GoLimits;
use crate::search::search::SearchEngine;
use crate::search::tt::TranspositionTable;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::debug;

// time budget tuning
const INC_USE: f64 = 0.65; // fraction of increment to spend per move
const MAX_BUDGET_FRAC: f64 = 0.25; // cap per-move spend as fraction of remaining time
const MIN_BUDGET_MS: i64 = 200;
const SAFETY_RESERVE: Duration = Duration::from_millis(80);
const STOP_SLACK: Duration = Duration::from_millis(10);

/// Owns the search worker and the deadline timer for one search at a time.
/// Cancellation is cooperative through a shared relaxed atomic flag.
pub struct SearchManager {
    search_thread: Option<JoinHandle<()>>,
    timer_thread: Option<JoinHandle<()>>,
    requested_stop: Arc<AtomicBool>,
    /// wake flag + condvar the timer sleeps on
    timer_wake: Arc<(Mutex<bool>, Condvar)>,
}

impl SearchManager {
    pub fn new() -> Self {
        SearchManager {
            search_thread: None,
            timer_thread: None,
            requested_stop: Arc::new(AtomicBool::new(false)),
            timer_wake: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    /// Spawns the worker and the timer; returns immediately. `on_finish`
    /// runs on the worker thread with the best move once the search ends.
    pub fn run_search<F>(
        &mut self,
        position: &Position,
        limits: GoLimits,
        command_received: Instant,
        tt: Arc<Mutex<TranspositionTable>>,
        on_finish: F,
    ) where
        F: FnOnce(Move) + Send + 'static,
    {
        self.stop_search();

        {
            let (wake, _) = &*self.timer_wake;
            *wake.lock().unwrap() = false;
        }
        self.requested_stop.store(false, Ordering::Relaxed);

        let engine_color = position.side_to_move;
        let timer_limits = limits.clone();
        let timer_wake = Arc::clone(&self.timer_wake);
        let timer_stop = Arc::clone(&self.requested_stop);
        self.timer_thread = Some(std::thread::spawn(move || {
            run_timer(&timer_limits, command_received, engine_color, &timer_wake, &timer_stop);
        }));

        let search_position = position.clone();
        let worker_stop = Arc::clone(&self.requested_stop);
        self.search_thread = Some(std::thread::spawn(move || {
            let mut engine = SearchEngine::new(worker_stop);
            {
                let mut table = tt.lock().unwrap();
                engine.search(&search_position, &limits, &mut table);
            }
            on_finish(engine.fetch_best_move());
        }));
    }

    /// Terminates any running search and joins both threads. Idempotent and
    /// safe to call on an already-stopped manager.
    pub fn stop_search(&mut self) {
        if let Some(timer) = self.timer_thread.take() {
            {
                let (wake, cv) = &*self.timer_wake;
                *wake.lock().unwrap() = true;
                cv.notify_all();
            }
            let _ = timer.join();
        }
        if let Some(worker) = self.search_thread.take() {
            self.requested_stop.store(true, Ordering::Relaxed);
            let _ = worker.join();
        }
    }

    /// Waits for the worker to finish on its own, then cleans up the timer.
    pub fn block_until_done(&mut self) {
        if let Some(worker) = self.search_thread.take() {
            let _ = worker.join();
        }
        self.stop_search();
    }
}

impl Default for SearchManager {
    fn default() -> Self {
        SearchManager::new()
    }
}

impl Drop for SearchManager {
    fn drop(&mut self) {
        self.stop_search();
    }
}

/// Computes the per-move deadline and sleeps until it passes or the manager
/// wakes the timer, then raises the stop flag. Searches without time
/// controls (or with `infinite`, `ponder` or `mate`) run untimed.
fn run_timer(
    limits: &GoLimits,
    command_received: Instant,
    engine_color: Color,
    timer_wake: &(Mutex<bool>, Condvar),
    requested_stop: &AtomicBool,
) {
    let has_time_controls = limits.move_time_ms > 0
        || limits.time_left_ms[0] > 0
        || limits.time_left_ms[1] > 0
        || limits.inc_ms[0] > 0
        || limits.inc_ms[1] > 0;

    if !has_time_controls || limits.infinite || limits.ponder || limits.prove_mate_in_n > 0 {
        return;
    }

    let budget_ms = compute_time_budget_ms(limits, engine_color);

    let mut effective = Duration::from_millis(budget_ms.max(10) as u64);
    effective = effective.saturating_sub(SAFETY_RESERVE).max(Duration::from_millis(10));

    let deadline = command_received + effective - STOP_SLACK;
    debug!(budget_ms, ?effective, "search deadline armed");

    let (wake, cv) = timer_wake;
    let mut woken = wake.lock().unwrap();
    while !*woken {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let (guard, _) = cv.wait_timeout(woken, deadline - now).unwrap();
        woken = guard;
    }
    drop(woken);

    requested_stop.store(true, Ordering::Relaxed);
}

fn compute_time_budget_ms(limits: &GoLimits, engine_color: Color) -> i64 {
    if limits.move_time_ms > 0 {
        return limits.move_time_ms as i64; // fixed movetime from UCI
    }

    let my_time = limits.time_left_ms[engine_color.index()].max(0);
    let my_inc = limits.inc_ms[engine_color.index()].max(0) as f64;

    let mut budget = if limits.moves_to_go > 0 {
        // spread remaining time across remaining moves + part of increment
        my_time / limits.moves_to_go as i64 + (INC_USE * my_inc) as i64
    } else {
        (0.03 * my_time as f64 + INC_USE * my_inc) as i64
    };

    budget = budget.min((MAX_BUDGET_FRAC * my_time as f64) as i64);
    budget.max(MIN_BUDGET_MS)
}
