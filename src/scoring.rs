//! Score tables and the running score board.
//!
//! The engine owns one `ScoreBoard` per deal and feeds it every committed
//! move. Undo never recomputes scores backwards: the board is restored
//! from the snapshot stored with the undo entry.

use serde::{Deserialize, Serialize};

use crate::moves::{MoveKind, MoveOrigin};
use crate::pile::PileRole;

/// Category of a scored event, as reported to a `ScoreSink`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoredKind {
    Draw,
    Recycle,
    ToFoundation,
    WasteToTableau,
    TableauToTableau,
    FoundationToTableau,
    /// A previously committed move was taken back.
    Undo,
}

impl ScoredKind {
    pub fn of(kind: &MoveKind) -> Self {
        match *kind {
            MoveKind::Draw => ScoredKind::Draw,
            MoveKind::Recycle => ScoredKind::Recycle,
            MoveKind::ToFoundation { .. } => ScoredKind::ToFoundation,
            MoveKind::ToTableau { from, .. } => match from {
                PileRole::Waste => ScoredKind::WasteToTableau,
                PileRole::Foundation(_) => ScoredKind::FoundationToTableau,
                _ => ScoredKind::TableauToTableau,
            },
        }
    }
}

/// One committed score change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub kind: ScoredKind,
    pub delta: i32,
    pub automated: bool,
}

/// Points awarded per move category.
///
/// A streak step of 0 disables the combo bonus for that category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub to_foundation: i32,
    pub waste_to_tableau: i32,
    pub tableau_to_tableau: i32,
    pub foundation_to_tableau: i32,
    pub reveal: i32,
    pub suit_complete: i32,
    pub draw: i32,
    pub recycle: i32,
    pub combo_step_foundation: i32,
    pub combo_step_tableau: i32,
}

impl ScoreTable {
    /// Combo scoring: streaks of manual scoring moves earn growing bonuses.
    pub fn combo() -> Self {
        ScoreTable {
            to_foundation: 20,
            waste_to_tableau: 5,
            tableau_to_tableau: 5,
            foundation_to_tableau: 0,
            reveal: 15,
            suit_complete: 50,
            draw: 0,
            recycle: -50,
            combo_step_foundation: 5,
            combo_step_tableau: 2,
        }
    }

    /// Classic Windows-style scoring without combos.
    pub fn standard() -> Self {
        ScoreTable {
            to_foundation: 10,
            waste_to_tableau: 5,
            tableau_to_tableau: 0,
            foundation_to_tableau: -15,
            reveal: 5,
            suit_complete: 0,
            draw: 0,
            recycle: 0,
            combo_step_foundation: 0,
            combo_step_tableau: 0,
        }
    }

    fn base(&self, kind: ScoredKind) -> i32 {
        match kind {
            ScoredKind::Draw => self.draw,
            ScoredKind::Recycle => self.recycle,
            ScoredKind::ToFoundation => self.to_foundation,
            ScoredKind::WasteToTableau => self.waste_to_tableau,
            ScoredKind::TableauToTableau => self.tableau_to_tableau,
            ScoredKind::FoundationToTableau => self.foundation_to_tableau,
            ScoredKind::Undo => 0,
        }
    }

    fn combo_step(&self, kind: ScoredKind) -> i32 {
        match kind {
            ScoredKind::ToFoundation => self.combo_step_foundation,
            ScoredKind::WasteToTableau | ScoredKind::TableauToTableau => self.combo_step_tableau,
            _ => 0,
        }
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        ScoreTable::combo()
    }
}

/// What a committed move did beyond its kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveEffects {
    pub revealed: bool,
    pub completed_suit: bool,
}

/// Running totals for the current deal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub score: i32,
    /// Manual moves committed, including draws and recycles.
    pub moves: u32,
    /// Length of the current manual scoring streak.
    pub streak: u32,
}

impl ScoreBoard {
    /// Score one committed move and return the delta that was applied.
    pub fn record(
        &mut self,
        table: &ScoreTable,
        kind: &MoveKind,
        effects: MoveEffects,
        origin: MoveOrigin,
    ) -> i32 {
        let scored = ScoredKind::of(kind);
        let base = table.base(scored);

        let mut delta = base;
        if effects.revealed {
            delta += table.reveal;
        }
        if effects.completed_suit {
            delta += table.suit_complete;
        }

        if origin == MoveOrigin::Manual {
            self.moves += 1;
            let scoring = base > 0 || effects.revealed;
            if scoring {
                self.streak += 1;
                let mut step = table.combo_step(scored);
                if effects.revealed && step == 0 {
                    step = table.combo_step_tableau;
                }
                delta += (self.streak as i32 - 1) * step;
            } else {
                self.streak = 0;
            }
        }

        self.score += delta;
        delta
    }
}
