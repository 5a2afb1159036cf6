//! Piles and pile roles.
//
//! Every pile carries its role explicitly, so code that needs to route
//! behaviour by pile kind matches on `PileRole` instead of comparing names.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::card::{Card, Suit};

/// Number of tableau columns.
pub const NUM_COLS: usize = 7;

/// Which pile a card sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PileRole {
    Stock,
    Waste,
    /// A foundation pile; the suit is fixed for the lifetime of the pile.
    Foundation(Suit),
    /// A tableau column, 0-based.
    Tableau(usize),
}

impl PileRole {
    pub fn is_tableau(self) -> bool {
        matches!(self, PileRole::Tableau(_))
    }

    pub fn is_foundation(self) -> bool {
        matches!(self, PileRole::Foundation(_))
    }
}

impl fmt::Display for PileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PileRole::Stock => f.write_str("Stock"),
            PileRole::Waste => f.write_str("Waste"),
            PileRole::Foundation(suit) => write!(f, "Foundation({:?})", suit),
            // 1-based when shown to a human.
            PileRole::Tableau(i) => write!(f, "Column {}", i + 1),
        }
    }
}

/// An ordered pile of cards. Index 0 is the bottom; the last card is the top.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pile {
    role: PileRole,
    cards: Vec<Card>,
}

impl Pile {
    pub fn new(role: PileRole) -> Self {
        Pile {
            role,
            cards: Vec::new(),
        }
    }

    pub fn with_cards(role: PileRole, cards: Vec<Card>) -> Self {
        Pile { role, cards }
    }

    #[inline]
    pub fn role(&self) -> PileRole {
        self.role
    }

    #[inline]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[inline]
    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    /// Rank number of the top card, or 0 for an empty pile.
    pub fn top_rank(&self) -> u8 {
        self.top().map(|c| c.rank.number()).unwrap_or(0)
    }

    /// Index of the first card of the maximal face-up tail.
    ///
    /// Equals `len()` when the pile is empty or its top card is face-down.
    pub fn face_up_start(&self) -> usize {
        self.cards
            .iter()
            .rposition(|c| !c.face_up)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    pub fn num_face_down(&self) -> usize {
        self.cards.iter().filter(|c| !c.face_up).count()
    }

    pub fn num_face_up(&self) -> usize {
        self.len() - self.num_face_down()
    }

    /// True when the pile holds no face-down cards.
    pub fn is_face_up_complete(&self) -> bool {
        self.cards.iter().all(|c| c.face_up)
    }

    pub(crate) fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub(crate) fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub(crate) fn split_off(&mut self, at: usize) -> Vec<Card> {
        self.cards.split_off(at)
    }

    pub(crate) fn extend(&mut self, cards: Vec<Card>) {
        self.cards.extend(cards);
    }

    pub(crate) fn top_mut(&mut self) -> Option<&mut Card> {
        self.cards.last_mut()
    }
}
