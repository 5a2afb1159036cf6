//! `GameSession`: the per-session context.
//!
//! One value owns everything a game needs between deals: the seeded RNG,
//! the deal generator with its diversity history, the engine, the hint
//! ranker, the auto-solver and the running stats. Nothing here is global;
//! a host keeps one session per player and passes it around.

use log::{info, warn};
use num_bigint::BigUint;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{CARDS_PER_DECK, Card};
use crate::deal::{DealConstraints, DealGenerator};
use crate::deal_code::{
    DealCodeError, deal_count, deal_from_number, deal_number, parse_deal_number,
};
use crate::engine::MoveEngine;
use crate::hint::{HintRanker, MoveCandidate};
use crate::moves::{MoveError, MoveReport, MoveSource};
use crate::pile::PileRole;
use crate::scoring::{ScoreBoard, ScoreTable};
use crate::solver::{AutoSolver, AutoSolverConfig, FinalResult, StepResult};
use crate::stats::Stats;
use crate::table::{InvariantViolation, TableState};

/// Everything a session can be tuned with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub constraints: DealConstraints,
    pub solver: AutoSolverConfig,
    pub scoring: ScoreTable,
}

/// Minimal state needed to resume a game. The undo log is not saved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub table: TableState,
    pub board: ScoreBoard,
    /// Deal number of the initial deal, in decimal.
    pub deal_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("snapshot table rejected: {0}")]
    InvalidTable(#[from] InvariantViolation),
    #[error("bad deal code: {0}")]
    DealCode(#[from] DealCodeError),
}

pub struct GameSession {
    rng: StdRng,
    generator: DealGenerator,
    engine: MoveEngine,
    hints: HintRanker,
    solver: AutoSolver,
    stats: Stats,
    deal_number: BigUint,
    /// A move has been committed on the current deal.
    touched: bool,
    won_recorded: bool,
}

impl GameSession {
    /// Start a session and deal its first game.
    pub fn new(config: SessionConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut generator = DealGenerator::new(config.constraints);
        let deal = generator.generate(&mut rng);
        let number = deal_number(&deal.cards);
        info!("session started on deal #{number} ({:?})", deal.quality);

        GameSession {
            rng,
            generator,
            engine: MoveEngine::new(deal.table(), config.scoring),
            hints: HintRanker::new(),
            solver: AutoSolver::new(config.solver),
            stats: Stats::default(),
            deal_number: number,
            touched: false,
            won_recorded: false,
        }
    }

    /// Deal the next game from the session RNG.
    pub fn new_deal(&mut self) {
        let deal = self.generator.generate(&mut self.rng);
        info!("new deal ({:?})", deal.quality);
        self.start(&deal.cards);
    }

    /// Replay a shared deal number, e.g. `"#1_000_000"`.
    pub fn deal_from_code(&mut self, code: &str) -> Result<(), SessionError> {
        let number = parse_deal_number(code)?;
        let deck = deal_from_number(&number)?;
        info!("replaying deal #{number}");
        self.start(&deck);
        Ok(())
    }

    fn start(&mut self, deck: &[Card; CARDS_PER_DECK as usize]) {
        self.close_current_game();
        self.deal_number = deal_number(deck);
        self.engine.reset(TableState::deal(deck), ScoreBoard::default());
        self.reset_helpers();
        self.touched = false;
        self.won_recorded = false;
    }

    /// An abandoned game counts as a loss once it has been played at all.
    fn close_current_game(&mut self) {
        if self.touched && !self.won_recorded {
            self.stats.record_loss();
        }
    }

    fn reset_helpers(&mut self) {
        self.hints.clear_history();
        self.solver.reset();
    }

    /// A manual change of the board invalidates whatever the solver
    /// remembered about its last run.
    fn after_manual_move(&mut self) {
        self.solver.reset();
        self.after_move();
    }

    fn after_move(&mut self) {
        self.touched = true;
        if !self.won_recorded && self.engine.table().is_won() {
            self.won_recorded = true;
            self.stats.record_win(self.engine.score().score);
        }
    }

    // ----- Manual play -----

    pub fn try_move(
        &mut self,
        source: MoveSource,
        dest: PileRole,
    ) -> Result<MoveReport, MoveError> {
        let report = self.engine.try_move(source, dest)?;
        self.after_manual_move();
        Ok(report)
    }

    pub fn draw(&mut self) -> Result<MoveReport, MoveError> {
        let report = self.engine.draw()?;
        self.after_manual_move();
        Ok(report)
    }

    /// Undo the last committed move. Returns false when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        let undone = self.engine.undo();
        if undone {
            self.hints.clear_history();
            self.solver.reset();
        }
        undone
    }

    // ----- Hints and auto-play -----

    pub fn hint(&mut self) -> Option<MoveCandidate> {
        self.hints.find_best_move(self.engine.table())
    }

    pub fn has_any_move(&self) -> bool {
        self.hints.has_any_move(self.engine.table())
    }

    /// True once no face-down card remains in the tableau.
    pub fn should_auto_complete(&self) -> bool {
        AutoSolver::is_ready(self.engine.table())
    }

    /// Advance the auto-solver by one move. A manual move or undo since
    /// the last step starts a fresh run, so a stalled solver resumes once
    /// the player unblocks the board.
    pub fn auto_step(&mut self) -> StepResult {
        let result = self.solver.step(&mut self.engine);
        if result.moved {
            self.after_move();
        }
        result
    }

    /// Run the auto-solver from a fresh start until it terminates.
    pub fn run_auto_complete(&mut self) -> FinalResult {
        self.solver.reset();
        let limit = self.solver.config().max_iterations;
        let result = self.solver.run_to_completion(&mut self.engine, limit);
        if self.solver.iterations() > 0 {
            self.after_move();
        }
        result
    }

    // ----- Resume -----

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            table: self.engine.table().clone(),
            board: self.engine.score(),
            deal_number: self.deal_number.to_string(),
        }
    }

    /// Resume from a snapshot. A snapshot that fails validation leaves the
    /// session untouched.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> Result<(), SessionError> {
        if let Err(violation) = snapshot.table.validate() {
            warn!("snapshot rejected: {violation}");
            return Err(violation.into());
        }
        let number = match parse_deal_number(&snapshot.deal_number) {
            Ok(number) if number < deal_count() => number,
            Ok(_) => {
                warn!("snapshot rejected: deal number out of range");
                return Err(DealCodeError::NumberTooLarge.into());
            }
            Err(err) => {
                warn!("snapshot rejected: {err}");
                return Err(err.into());
            }
        };

        self.close_current_game();
        self.won_recorded = snapshot.table.is_won();
        self.touched = snapshot.board.moves > 0;
        self.deal_number = number;
        self.engine.reset(snapshot.table, snapshot.board);
        self.reset_helpers();
        Ok(())
    }

    // ----- Accessors -----

    pub fn table(&self) -> &TableState {
        self.engine.table()
    }

    pub fn engine(&self) -> &MoveEngine {
        &self.engine
    }

    /// Mutable engine access, for attaching sinks and draining events.
    pub fn engine_mut(&mut self) -> &mut MoveEngine {
        &mut self.engine
    }

    pub fn solver(&self) -> &AutoSolver {
        &self.solver
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn deal_number(&self) -> &BigUint {
        &self.deal_number
    }

    pub fn generator(&self) -> &DealGenerator {
        &self.generator
    }
}
