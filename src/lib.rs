//! Klondike solitaire rules core: dealing, legal moves, undo, scoring,
//! hints and auto-complete, with no rendering or input handling.
//!
//! The usual entry point is [`GameSession`]. Hosts that want finer
//! control can drive a [`MoveEngine`] directly.

pub mod card;
pub mod pile;
pub mod table;
pub mod rules;
pub mod display;
pub mod deal;
pub mod deal_code;
pub mod moves;
pub mod undo;
pub mod scoring;
pub mod events;
pub mod engine;
pub mod solver;
pub mod hint;
pub mod stats;
pub mod session;
pub mod canonical_decks;

pub use card::{Card, Color, Rank, Suit, standard_deck};
pub use deal::{Deal, DealConstraints, DealGenerator, DealQuality};
pub use engine::MoveEngine;
pub use events::{MoveEvent, PresentationSink, ScoreSink};
pub use hint::{HintRanker, MoveCandidate};
pub use moves::{Move, MoveError, MoveKind, MoveOrigin, MoveReport, MoveSource};
pub use pile::{NUM_COLS, Pile, PileRole};
pub use scoring::{ScoreBoard, ScoreEvent, ScoreTable};
pub use session::{GameSession, SessionConfig, SessionError, SessionSnapshot};
pub use solver::{AutoSolver, AutoSolverConfig, FinalResult, SolverState};
pub use stats::Stats;
pub use table::{InvariantViolation, TableLayout, TableState};
