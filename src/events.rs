//! Notifications from the engine to the outside world.
//!
//! Sinks are fire-and-forget: nothing they do can change engine state.
//! A presentation layer that prefers pulling over callbacks can ignore the
//! sinks and drain `MoveEvent`s from the engine queue instead.

use std::cell::RefCell;
use std::rc::Rc;

use crate::card::Card;
use crate::pile::PileRole;
use crate::scoring::ScoreEvent;

/// Receives one event per committed score change.
pub trait ScoreSink {
    fn on_score(&mut self, event: ScoreEvent);
}

/// Receives card motion for animation purposes.
pub trait PresentationSink {
    /// Fires once per moved card, in the order the cards moved.
    fn on_card_moved(&mut self, card: Card, from: PileRole, to: PileRole);

    /// Fires when a tableau card is flipped face-up after the cards above
    /// it moved away.
    fn on_card_revealed(&mut self, _card: Card, _column: usize) {}

    /// Fires when an undo turns a revealed card face-down again.
    fn on_card_hidden(&mut self, _card: Card, _column: usize) {}
}

/// Queued engine event, in commit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveEvent {
    CardMoved {
        card: Card,
        from: PileRole,
        to: PileRole,
    },
    CardRevealed {
        card: Card,
        column: usize,
    },
    CardHidden {
        card: Card,
        column: usize,
    },
    Scored(ScoreEvent),
}

impl ScoreSink for Vec<ScoreEvent> {
    fn on_score(&mut self, event: ScoreEvent) {
        self.push(event);
    }
}

impl PresentationSink for Vec<MoveEvent> {
    fn on_card_moved(&mut self, card: Card, from: PileRole, to: PileRole) {
        self.push(MoveEvent::CardMoved { card, from, to });
    }

    fn on_card_revealed(&mut self, card: Card, column: usize) {
        self.push(MoveEvent::CardRevealed { card, column });
    }

    fn on_card_hidden(&mut self, card: Card, column: usize) {
        self.push(MoveEvent::CardHidden { card, column });
    }
}

// Shared handles, so a caller can keep reading a sink it gave away.

impl<T: ScoreSink> ScoreSink for Rc<RefCell<T>> {
    fn on_score(&mut self, event: ScoreEvent) {
        self.borrow_mut().on_score(event);
    }
}

impl<T: PresentationSink> PresentationSink for Rc<RefCell<T>> {
    fn on_card_moved(&mut self, card: Card, from: PileRole, to: PileRole) {
        self.borrow_mut().on_card_moved(card, from, to);
    }

    fn on_card_revealed(&mut self, card: Card, column: usize) {
        self.borrow_mut().on_card_revealed(card, column);
    }

    fn on_card_hidden(&mut self, card: Card, column: usize) {
        self.borrow_mut().on_card_hidden(card, column);
    }
}
