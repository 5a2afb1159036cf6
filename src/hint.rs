//! Hint ranking: pick the single best move to suggest to the player.
//!
//! Candidates come in two tiers:
//!   - a column top or the waste top onto its foundation (priority 100)
//!   - a column run or the waste top onto another column (priority 50,
//!     +20 when the move turns over a face-down card)
//!
//! Ties are broken by hysteresis first (re-suggest the previous hint if it
//! is still legal, so the hint does not flicker between equals), then by
//! source column, card rank, colour (red first), and target index.

use core::cmp::Ordering;

use log::debug;

use crate::card::Card;
use crate::moves::{Move, MoveKind, check_move};
use crate::pile::{NUM_COLS, PileRole};
use crate::table::TableState;

pub const FOUNDATION_PRIORITY: u32 = 100;
pub const TABLEAU_PRIORITY: u32 = 50;
pub const REVEAL_BONUS: u32 = 20;

/// A ranked move suggestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveCandidate {
    pub mv: Move,
    /// The card that would be picked up (deepest card of a run).
    pub card: Card,
    pub target: PileRole,
    pub priority: u32,
}

impl MoveCandidate {
    /// Source column index; the waste sorts after every column.
    fn source_key(&self) -> usize {
        match self.mv.kind {
            MoveKind::ToFoundation {
                from: PileRole::Tableau(c),
            }
            | MoveKind::ToTableau {
                from: PileRole::Tableau(c),
                ..
            } => c,
            _ => usize::MAX,
        }
    }

    fn target_key(&self) -> usize {
        match self.target {
            PileRole::Tableau(c) => c,
            PileRole::Foundation(suit) => suit.index(),
            _ => usize::MAX,
        }
    }

    fn same_suggestion(&self, other: &MoveCandidate) -> bool {
        self.card.same_card(other.card) && self.target == other.target
    }
}

#[derive(Debug, Default)]
pub struct HintRanker {
    last: Option<MoveCandidate>,
    cache: Option<(u64, Option<MoveCandidate>)>,
}

impl HintRanker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The best move to suggest, or `None` when no move is legal.
    ///
    /// Remembers the answer for hysteresis on the next call.
    pub fn find_best_move(&mut self, table: &TableState) -> Option<MoveCandidate> {
        let fingerprint = table.fingerprint();
        if let Some((cached_fp, cached)) = self.cache {
            if cached_fp == fingerprint {
                debug!("hint cache hit");
                return cached;
            }
        }

        let mut candidates = collect_candidates(table);
        let last = self.last;
        candidates.sort_by(|a, b| compare(a, b, last.as_ref()));
        let best = candidates.first().copied();

        if best.is_some() {
            self.last = best;
        }
        self.cache = Some((fingerprint, best));
        best
    }

    /// Dead-game detection: true if any hint candidate exists.
    pub fn has_any_move(&self, table: &TableState) -> bool {
        !collect_candidates(table).is_empty()
    }

    /// Forget the previous suggestion and the cached answer.
    pub fn clear_history(&mut self) {
        self.last = None;
        self.cache = None;
    }

    pub fn last_suggestion(&self) -> Option<&MoveCandidate> {
        self.last.as_ref()
    }
}

fn compare(a: &MoveCandidate, b: &MoveCandidate, last: Option<&MoveCandidate>) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| match last {
            Some(prev) => prev.same_suggestion(b).cmp(&prev.same_suggestion(a)),
            None => Ordering::Equal,
        })
        .then_with(|| a.source_key().cmp(&b.source_key()))
        .then_with(|| a.card.rank.cmp(&b.card.rank))
        .then_with(|| b.card.is_red().cmp(&a.card.is_red()))
        .then_with(|| a.target_key().cmp(&b.target_key()))
}

/// Every hint candidate of the table, unsorted.
pub fn collect_candidates(table: &TableState) -> Vec<MoveCandidate> {
    let mut out = Vec::new();

    let mut sources: Vec<PileRole> = (0..NUM_COLS).map(PileRole::Tableau).collect();
    sources.push(PileRole::Waste);

    for &from in &sources {
        let kind = MoveKind::ToFoundation { from };
        if let Ok(plan) = check_move(table, &kind) {
            if let Some(card) = plan.card {
                out.push(MoveCandidate {
                    mv: Move { kind },
                    card,
                    target: PileRole::Foundation(card.suit),
                    priority: FOUNDATION_PRIORITY,
                });
            }
        }
    }

    for &from in &sources {
        let Some(pile) = table.pile(from) else {
            continue;
        };
        let starts = match from {
            PileRole::Tableau(_) => pile.face_up_start()..pile.len(),
            _ => pile.len().saturating_sub(1)..pile.len(),
        };
        for start in starts {
            for to in 0..NUM_COLS {
                let kind = MoveKind::ToTableau { from, start, to };
                let Ok(plan) = check_move(table, &kind) else {
                    continue;
                };
                let Some(card) = plan.card else {
                    continue;
                };
                let target = PileRole::Tableau(to);
                let dest_empty = table.column(to).is_some_and(|p| p.is_empty());
                // A whole column moving to an empty column changes nothing.
                if from.is_tableau() && start == 0 && dest_empty {
                    continue;
                }
                let reveals = from.is_tableau()
                    && start > 0
                    && pile.get(start - 1).is_some_and(|c| !c.face_up);
                let priority = if reveals {
                    TABLEAU_PRIORITY + REVEAL_BONUS
                } else {
                    TABLEAU_PRIORITY
                };
                out.push(MoveCandidate {
                    mv: Move { kind },
                    card,
                    target,
                    priority,
                });
            }
        }
    }

    out
}
