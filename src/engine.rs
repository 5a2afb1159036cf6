//! `MoveEngine`: the only code path that mutates a `TableState`.
//!
//! Each transition is atomic. A move is checked in full before any card
//! changes pile, so a refused move leaves the table, score, and undo log
//! exactly as they were.

use std::collections::VecDeque;

use log::{debug, info};

use crate::card::{Card, Rank};
use crate::events::{MoveEvent, PresentationSink, ScoreSink};
use crate::moves::{
    Move, MoveError, MoveKind, MoveOrigin, MoveReport, MoveSource, check_move, legal_moves,
    resolve_move,
};
use crate::pile::PileRole;
use crate::scoring::{MoveEffects, ScoreBoard, ScoreEvent, ScoreTable, ScoredKind};
use crate::table::TableState;
use crate::undo::{CardMotion, InverseCommand, UndoEntry, UndoLog};

pub struct MoveEngine {
    table: TableState,
    undo: UndoLog,
    board: ScoreBoard,
    scoring: ScoreTable,
    score_sink: Option<Box<dyn ScoreSink>>,
    presentation: Option<Box<dyn PresentationSink>>,
    events: VecDeque<MoveEvent>,
}

impl MoveEngine {
    pub fn new(table: TableState, scoring: ScoreTable) -> Self {
        Self::with_board(table, scoring, ScoreBoard::default())
    }

    /// Resume from a saved table and score board. The undo log starts empty.
    pub fn with_board(table: TableState, scoring: ScoreTable, board: ScoreBoard) -> Self {
        table.assert_invariants();
        MoveEngine {
            table,
            undo: UndoLog::new(),
            board,
            scoring,
            score_sink: None,
            presentation: None,
            events: VecDeque::new(),
        }
    }

    #[inline]
    pub fn table(&self) -> &TableState {
        &self.table
    }

    #[inline]
    pub fn score(&self) -> ScoreBoard {
        self.board
    }

    #[inline]
    pub fn scoring(&self) -> &ScoreTable {
        &self.scoring
    }

    pub fn set_score_sink(&mut self, sink: Option<Box<dyn ScoreSink>>) {
        self.score_sink = sink;
    }

    pub fn set_presentation_sink(&mut self, sink: Option<Box<dyn PresentationSink>>) {
        self.presentation = sink;
    }

    /// Swap in a fresh table, clearing score, undo history, and queued events.
    /// Sinks stay attached.
    pub fn reset(&mut self, table: TableState, board: ScoreBoard) {
        table.assert_invariants();
        self.table = table;
        self.board = board;
        self.undo.clear();
        self.events.clear();
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.table)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = MoveEvent> + '_ {
        self.events.drain(..)
    }

    /// Manual move from a pick-up/drop pair.
    pub fn try_move(
        &mut self,
        source: MoveSource,
        dest: PileRole,
    ) -> Result<MoveReport, MoveError> {
        let kind = resolve_move(&self.table, source, dest)?;
        self.apply(kind, MoveOrigin::Manual)
    }

    /// Manual tap on the stock: draw one card, or recycle the waste when
    /// the stock is empty.
    pub fn draw(&mut self) -> Result<MoveReport, MoveError> {
        let kind = if self.table.stock().is_empty() {
            MoveKind::Recycle
        } else {
            MoveKind::Draw
        };
        self.apply(kind, MoveOrigin::Manual)
    }

    /// Check and commit one move.
    pub fn apply(&mut self, kind: MoveKind, origin: MoveOrigin) -> Result<MoveReport, MoveError> {
        let plan = check_move(&self.table, &kind)?;
        let inverse = InverseCommand::for_move(&kind, &plan)?;

        let mut motions = Vec::with_capacity(plan.count);
        let mut revealed = None;
        self.commit(&kind, &mut motions, &mut revealed)?;

        let completed_suit = matches!(kind, MoveKind::ToFoundation { .. })
            && plan.card.is_some_and(|c| c.rank == Rank::King);
        let effects = MoveEffects {
            revealed: revealed.is_some(),
            completed_suit,
        };

        let score_before = self.board;
        let delta = self.board.record(&self.scoring, &kind, effects, origin);

        let revealed_in = revealed.map(|(_, col)| col);
        self.undo.push(UndoEntry {
            command: inverse.with_reveal(revealed_in),
            kind,
            score_before,
            delta,
            origin,
        });

        self.table.assert_invariants();

        let automated = origin == MoveOrigin::Automated;
        for m in &motions {
            self.emit_motion(*m);
        }
        if let Some((card, column)) = revealed {
            self.emit_reveal(card, column);
        }
        self.emit_score(ScoreEvent {
            kind: ScoredKind::of(&kind),
            delta,
            automated,
        });
        if self.table.is_won() {
            info!("deal won with score {}", self.board.score);
        }

        Ok(MoveReport {
            mv: Move { kind },
            card: plan.card.map(|c| c.turned_up()),
            count: plan.count,
            revealed: revealed.map(|(card, _)| card),
            score_delta: delta,
            automated,
        })
    }

    /// Reverse the most recent committed move. Returns `false` when the log
    /// is empty.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.undo.pop() else {
            return false;
        };

        let mut moved = Vec::new();
        let mut hidden = Vec::new();
        let restored = entry
            .command
            .revert(&mut self.table, &mut moved, &mut hidden)
            .is_some();
        debug_assert!(restored, "undo log does not match the table");
        self.table.assert_invariants();

        self.board = entry.score_before;
        debug!("undo {:?} (score back to {})", entry.kind, self.board.score);

        for h in hidden {
            self.events.push_back(MoveEvent::CardHidden {
                card: h.card,
                column: h.column,
            });
            if let Some(sink) = self.presentation.as_mut() {
                sink.on_card_hidden(h.card, h.column);
            }
        }
        for m in moved {
            self.emit_motion(m);
        }
        self.emit_score(ScoreEvent {
            kind: ScoredKind::Undo,
            delta: -entry.delta,
            automated: entry.origin == MoveOrigin::Automated,
        });
        restored
    }

    /// Move the cards. `check_move` has already accepted `kind`, so the
    /// error paths here are unreachable in practice but keep the method
    /// total.
    fn commit(
        &mut self,
        kind: &MoveKind,
        motions: &mut Vec<CardMotion>,
        revealed: &mut Option<(Card, usize)>,
    ) -> Result<(), MoveError> {
        match *kind {
            MoveKind::Draw => {
                let (stock, waste) = self
                    .table
                    .pile_pair_mut(PileRole::Stock, PileRole::Waste)
                    .ok_or(MoveError::SamePile(PileRole::Stock))?;
                let card = stock.pop().ok_or(MoveError::EmptyPile(PileRole::Stock))?;
                let card = card.turned_up();
                waste.push(card);
                motions.push(CardMotion {
                    card,
                    from: PileRole::Stock,
                    to: PileRole::Waste,
                });
            }

            MoveKind::Recycle => {
                let (waste, stock) = self
                    .table
                    .pile_pair_mut(PileRole::Waste, PileRole::Stock)
                    .ok_or(MoveError::SamePile(PileRole::Waste))?;
                while let Some(card) = waste.pop() {
                    let card = card.turned_down();
                    stock.push(card);
                    motions.push(CardMotion {
                        card,
                        from: PileRole::Waste,
                        to: PileRole::Stock,
                    });
                }
            }

            MoveKind::ToFoundation { from } => {
                let suit = self
                    .table
                    .pile(from)
                    .and_then(|p| p.top())
                    .ok_or(MoveError::EmptyPile(from))?
                    .suit;
                let to = PileRole::Foundation(suit);
                let (src, dst) = self
                    .table
                    .pile_pair_mut(from, to)
                    .ok_or(MoveError::SamePile(from))?;
                let card = src.pop().ok_or(MoveError::EmptyPile(from))?;
                dst.push(card);
                motions.push(CardMotion { card, from, to });
                *revealed = self.reveal_after_removal(from);
            }

            MoveKind::ToTableau { from, start, to } => {
                let to = PileRole::Tableau(to);
                let (src, dst) = self
                    .table
                    .pile_pair_mut(from, to)
                    .ok_or(MoveError::SamePile(from))?;
                let cards = src.split_off(start);
                motions.extend(cards.iter().map(|&card| CardMotion { card, from, to }));
                dst.extend(cards);
                *revealed = self.reveal_after_removal(from);
            }
        }
        Ok(())
    }

    /// Flip the new top of a tableau source if the move exposed a
    /// face-down card.
    fn reveal_after_removal(&mut self, from: PileRole) -> Option<(Card, usize)> {
        let PileRole::Tableau(col) = from else {
            return None;
        };
        let top = self.table.pile_mut(from)?.top_mut()?;
        if top.face_up {
            return None;
        }
        top.face_up = true;
        Some((*top, col))
    }

    fn emit_motion(&mut self, m: CardMotion) {
        self.events.push_back(MoveEvent::CardMoved {
            card: m.card,
            from: m.from,
            to: m.to,
        });
        if let Some(sink) = self.presentation.as_mut() {
            sink.on_card_moved(m.card, m.from, m.to);
        }
    }

    fn emit_reveal(&mut self, card: Card, column: usize) {
        self.events.push_back(MoveEvent::CardRevealed { card, column });
        if let Some(sink) = self.presentation.as_mut() {
            sink.on_card_revealed(card, column);
        }
    }

    fn emit_score(&mut self, event: ScoreEvent) {
        self.events.push_back(MoveEvent::Scored(event));
        if let Some(sink) = self.score_sink.as_mut() {
            sink.on_score(event);
        }
    }
}

impl core::fmt::Debug for MoveEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MoveEngine")
            .field("board", &self.board)
            .field("undo_len", &self.undo.len())
            .field("queued_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::card::{Suit, standard_deck};
    use crate::table::TableLayout;

    fn up(code: &str) -> Card {
        code.parse::<Card>().unwrap().turned_up()
    }

    fn down(code: &str) -> Card {
        code.parse::<Card>().unwrap()
    }

    fn engine_for(layout: TableLayout) -> MoveEngine {
        MoveEngine::new(layout.build().unwrap(), ScoreTable::combo())
    }

    #[test]
    fn foundation_move_reveals_and_undoes_exactly() {
        let mut layout = TableLayout::default();
        layout.tableau[2] = vec![down("9D"), up("AS")];
        let mut engine = engine_for(layout);
        let before = engine.table().clone();

        let report = engine
            .try_move(
                MoveSource::top(engine.table(), PileRole::Tableau(2)),
                PileRole::Foundation(Suit::Spades),
            )
            .unwrap();
        assert_eq!(report.card, Some(up("AS")));
        assert_eq!(report.revealed, Some(up("9D")));
        assert_eq!(report.score_delta, 20 + 15);
        assert_eq!(engine.score().moves, 1);
        assert_eq!(engine.table().foundation(Suit::Spades).len(), 1);

        assert!(engine.undo());
        assert_eq!(engine.table(), &before);
        assert_eq!(engine.score(), ScoreBoard::default());
        assert!(!engine.undo(), "log is empty again");
    }

    #[test]
    fn illegal_move_changes_nothing() {
        let mut engine = MoveEngine::new(TableState::deal(&standard_deck()), ScoreTable::combo());
        let before = engine.table().clone();

        // 3C (column 2) cannot go onto 6C (column 3).
        let err = engine
            .try_move(MoveSource::run(1, 1), PileRole::Tableau(2))
            .unwrap_err();
        assert!(err.is_invalid_move());
        assert_eq!(engine.table(), &before);
        assert_eq!(engine.score(), ScoreBoard::default());
        assert!(!engine.can_undo());
        assert_eq!(engine.drain_events().count(), 0);
    }

    #[test]
    fn draw_then_recycle_round_trip() {
        let mut layout = TableLayout::default();
        // Leave exactly two cards in the stock.
        layout.foundations = [13, 13, 13, 11];
        let mut engine = engine_for(layout);
        let start = engine.table().clone();

        engine.draw().unwrap();
        engine.draw().unwrap();
        assert!(engine.table().stock().is_empty());
        let recycle = engine.draw().unwrap();
        assert_eq!(recycle.mv.kind, MoveKind::Recycle);
        assert_eq!(recycle.count, 2);
        assert_eq!(recycle.score_delta, -50);
        assert_eq!(engine.table(), &start, "recycle restores stock order");
        assert_eq!(engine.score().moves, 3);

        while engine.undo() {}
        assert_eq!(engine.table(), &start);
        assert_eq!(engine.score(), ScoreBoard::default());
    }

    #[test]
    fn run_moves_together_and_emits_events_in_order() {
        let mut layout = TableLayout::default();
        layout.tableau[0] = vec![down("2C"), up("9S"), up("8H")];
        layout.tableau[4] = vec![up("TD")];
        let mut engine = engine_for(layout);

        let log = Rc::new(RefCell::new(Vec::<MoveEvent>::new()));
        let scores = Rc::new(RefCell::new(Vec::<ScoreEvent>::new()));
        engine.set_presentation_sink(Some(Box::new(log.clone())));
        engine.set_score_sink(Some(Box::new(scores.clone())));

        let report = engine
            .try_move(MoveSource::run(0, 1), PileRole::Tableau(4))
            .unwrap();
        assert_eq!(report.count, 2);
        assert_eq!(report.revealed, Some(up("2C")));
        assert_eq!(engine.table().tableau()[4].len(), 3);

        let seen = log.borrow().clone();
        assert_eq!(
            seen,
            vec![
                MoveEvent::CardMoved {
                    card: up("9S"),
                    from: PileRole::Tableau(0),
                    to: PileRole::Tableau(4),
                },
                MoveEvent::CardMoved {
                    card: up("8H"),
                    from: PileRole::Tableau(0),
                    to: PileRole::Tableau(4),
                },
                MoveEvent::CardRevealed {
                    card: up("2C"),
                    column: 0,
                },
            ]
        );
        let queued: Vec<MoveEvent> = engine.drain_events().collect();
        assert_eq!(&queued[..3], &seen[..]);
        assert!(matches!(queued[3], MoveEvent::Scored(_)));

        assert!(engine.undo());
        let scores = scores.borrow();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[1].kind, ScoredKind::Undo);
        assert_eq!(scores[1].delta, -scores[0].delta);
    }

    #[test]
    fn automated_moves_are_logged_but_not_counted() {
        let mut layout = TableLayout::default();
        layout.waste = vec![up("AH")];
        let mut engine = engine_for(layout);
        let report = engine
            .apply(
                MoveKind::ToFoundation {
                    from: PileRole::Waste,
                },
                MoveOrigin::Automated,
            )
            .unwrap();
        assert!(report.automated);
        assert_eq!(report.score_delta, 20);
        assert_eq!(engine.score().moves, 0);
        assert!(engine.can_undo());
    }

    #[test]
    fn foundation_card_can_come_back_to_tableau() {
        let mut layout = TableLayout::default();
        layout.foundations[Suit::Hearts.index()] = 6;
        layout.tableau[1] = vec![up("7S")];
        let mut engine = engine_for(layout);

        let src = MoveSource::top(engine.table(), PileRole::Foundation(Suit::Hearts));
        let report = engine.try_move(src, PileRole::Tableau(1)).unwrap();
        assert_eq!(report.card, Some(up("6H")));
        assert_eq!(engine.table().foundation(Suit::Hearts).len(), 5);
        assert!(engine.undo());
        assert_eq!(engine.table().foundation(Suit::Hearts).len(), 6);
    }
}
