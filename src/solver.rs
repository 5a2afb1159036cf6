//! Greedy auto-play toward the foundations.
//!
//! `AutoSolver` is a small state machine that the driver advances one
//! move per `step` call, at whatever pace its animations allow. It never
//! owns the table; every move goes through the same `MoveEngine::apply`
//! path as manual play, tagged as automated.
//!
//! Priority per step:
//!   1. any column top that fits a foundation (lowest column first)
//!   2. the waste top, if it fits a foundation
//!   3. (only with `allow_tableau_moves`) a column-to-column move that
//!      turns over a face-down card
//!   4. draw one card, or recycle the waste when the stock is empty

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::MoveEngine;
use crate::moves::{MoveKind, MoveOrigin, MoveReport, check_move};
use crate::pile::{NUM_COLS, PileRole};
use crate::table::TableState;

/// Safety bounds and policy switches for `AutoSolver`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSolverConfig {
    /// Hard cap on steps per run.
    pub max_iterations: u32,
    /// Cap on consecutive steps, draws and recycles included, that
    /// neither grow the foundations nor turn over a hidden card.
    pub max_stagnant_steps: u32,
    /// Allow column-to-column moves that reveal a hidden card.
    pub allow_tableau_moves: bool,
}

impl Default for AutoSolverConfig {
    fn default() -> Self {
        AutoSolverConfig {
            max_iterations: 800,
            max_stagnant_steps: 120,
            allow_tableau_moves: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    IterationLimit,
    Stagnation,
    /// The engine refused a move the solver selected.
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverState {
    Idle,
    Running,
    Finished,
    Stalled,
    Aborted(AbortReason),
}

impl SolverState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SolverState::Finished | SolverState::Stalled | SolverState::Aborted(_)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepResult {
    pub moved: bool,
    pub report: Option<MoveReport>,
    pub state: SolverState,
}

/// Terminal outcome of `run_to_completion`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalResult {
    Finished,
    Stalled,
    Aborted(AbortReason),
}

#[derive(Debug)]
pub struct AutoSolver {
    config: AutoSolverConfig,
    state: SolverState,
    iterations: u32,
    stagnant: u32,
    last_foundation_count: usize,
    last_hidden_count: usize,
    recycled: bool,
    progress_since_recycle: bool,
}

impl AutoSolver {
    pub fn new(config: AutoSolverConfig) -> Self {
        AutoSolver {
            config,
            state: SolverState::Idle,
            iterations: 0,
            stagnant: 0,
            last_foundation_count: 0,
            last_hidden_count: 0,
            recycled: false,
            progress_since_recycle: false,
        }
    }

    pub fn config(&self) -> &AutoSolverConfig {
        &self.config
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Back to `Idle`, ready for a new run.
    pub fn reset(&mut self) {
        *self = AutoSolver::new(self.config);
    }

    /// True when no face-down card is left in the tableau, the point at
    /// which auto-complete takes over from manual play.
    pub fn is_ready(table: &TableState) -> bool {
        table.hidden_count() == 0
    }

    /// Advance by at most one move.
    pub fn step(&mut self, engine: &mut MoveEngine) -> StepResult {
        if self.state.is_terminal() {
            return self.idle_result();
        }
        if self.state == SolverState::Idle {
            self.begin(engine.table());
        }

        if engine.table().is_won() {
            return self.finish(SolverState::Finished);
        }
        if self.iterations >= self.config.max_iterations {
            return self.finish(SolverState::Aborted(AbortReason::IterationLimit));
        }
        if self.stagnant >= self.config.max_stagnant_steps {
            return self.finish(SolverState::Aborted(AbortReason::Stagnation));
        }

        let Some(kind) = self.choose(engine.table()) else {
            return self.finish(SolverState::Stalled);
        };

        self.iterations += 1;
        let report = match engine.apply(kind, MoveOrigin::Automated) {
            Ok(report) => report,
            Err(err) => {
                warn!("auto-solver move {kind:?} refused: {err}");
                return self.finish(SolverState::Aborted(AbortReason::Rejected));
            }
        };
        self.track_progress(engine.table(), &kind);

        if engine.table().is_won() {
            self.state = SolverState::Finished;
            info!("auto-solver finished after {} moves", self.iterations);
        }
        StepResult {
            moved: true,
            report: Some(report),
            state: self.state,
        }
    }

    /// Step until a terminal state or `max_iterations` steps, whichever
    /// comes first. `max_iterations` further caps the configured bound.
    pub fn run_to_completion(
        &mut self,
        engine: &mut MoveEngine,
        max_iterations: u32,
    ) -> FinalResult {
        let limit = max_iterations.min(self.config.max_iterations);
        let saved = self.config.max_iterations;
        self.config.max_iterations = limit;
        loop {
            let result = self.step(engine);
            if result.state.is_terminal() {
                self.config.max_iterations = saved;
                return match result.state {
                    SolverState::Finished => FinalResult::Finished,
                    SolverState::Aborted(reason) => FinalResult::Aborted(reason),
                    _ => FinalResult::Stalled,
                };
            }
        }
    }

    fn begin(&mut self, table: &TableState) {
        self.state = SolverState::Running;
        self.last_foundation_count = table.foundation_count();
        self.last_hidden_count = table.hidden_count();
        debug!(
            "auto-solver started with {} cards on foundations",
            self.last_foundation_count
        );
    }

    fn finish(&mut self, state: SolverState) -> StepResult {
        self.state = state;
        match state {
            SolverState::Aborted(reason) => {
                warn!("auto-solver aborted ({reason:?}) after {} moves", self.iterations)
            }
            _ => info!("auto-solver {state:?} after {} moves", self.iterations),
        }
        self.idle_result()
    }

    fn idle_result(&self) -> StepResult {
        StepResult {
            moved: false,
            report: None,
            state: self.state,
        }
    }

    fn choose(&self, table: &TableState) -> Option<MoveKind> {
        let legal = |kind: MoveKind| check_move(table, &kind).is_ok().then_some(kind);

        let to_foundation = (0..NUM_COLS)
            .map(|col| MoveKind::ToFoundation {
                from: PileRole::Tableau(col),
            })
            .chain([MoveKind::ToFoundation {
                from: PileRole::Waste,
            }])
            .find_map(legal);
        if to_foundation.is_some() {
            return to_foundation;
        }

        if self.config.allow_tableau_moves {
            if let Some(kind) = revealing_tableau_move(table) {
                return Some(kind);
            }
        }

        if !table.stock().is_empty() {
            return Some(MoveKind::Draw);
        }
        if table.waste().is_empty() {
            return None;
        }
        // A whole pass since the last recycle changed nothing that matters:
        // another pass would replay it exactly.
        if self.recycled && !self.progress_since_recycle {
            return None;
        }
        Some(MoveKind::Recycle)
    }

    fn track_progress(&mut self, table: &TableState, kind: &MoveKind) {
        let foundations = table.foundation_count();
        let hidden = table.hidden_count();
        let progressed =
            foundations > self.last_foundation_count || hidden < self.last_hidden_count;
        self.last_foundation_count = foundations;
        self.last_hidden_count = hidden;

        match kind {
            MoveKind::Recycle => {
                self.recycled = true;
                self.progress_since_recycle = false;
            }
            _ if progressed => self.progress_since_recycle = true,
            _ => {}
        }
        // Draws keep the run going but do not count as progress here.
        if progressed {
            self.stagnant = 0;
        } else {
            self.stagnant += 1;
        }
    }
}

impl Default for AutoSolver {
    fn default() -> Self {
        AutoSolver::new(AutoSolverConfig::default())
    }
}

/// First column-to-column move (lowest source, then lowest target) that
/// moves a whole face-up run off a face-down card.
fn revealing_tableau_move(table: &TableState) -> Option<MoveKind> {
    for (src, pile) in table.tableau().iter().enumerate() {
        let start = pile.face_up_start();
        if start == 0 || start >= pile.len() {
            continue;
        }
        for to in (0..NUM_COLS).filter(|&c| c != src) {
            let kind = MoveKind::ToTableau {
                from: PileRole::Tableau(src),
                start,
                to,
            };
            if check_move(table, &kind).is_ok() {
                return Some(kind);
            }
        }
    }
    None
}
