//! Full Klondike table state: stock, waste, four foundations, seven columns.
//
//! `TableState` is created once per deal and then mutated in place by
//! `MoveEngine` for the rest of the session. Outside this crate it is
//! read-only; every mutation goes through the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{CARDS_PER_DECK, Card, Suit, standard_deck};
use crate::pile::{NUM_COLS, Pile, PileRole};
use crate::rules::is_valid_run;

/// Number of cards dealt into the tableau.
pub const TABLEAU_DEAL_LEN: usize = NUM_COLS * (NUM_COLS + 1) / 2;

/// Deck index of the face-up starter card of column `col` (column-major deal).
///
/// Column `c` receives `c + 1` consecutive cards and only the last one is
/// face-up, so the starters sit at 0, 2, 5, 9, 14, 20, 27.
#[inline]
pub const fn starter_index(col: usize) -> usize {
    col * (col + 3) / 2
}

/// Deck index of the deepest card of column `col` (face-down for col >= 1).
#[inline]
pub const fn column_bottom_index(col: usize) -> usize {
    col * (col + 1) / 2
}

/// A broken data-model invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("expected 52 cards on the table, found {0}")]
    CardCount(usize),
    #[error("card {0} appears more than once")]
    Duplicate(Card),
    #[error("pile stored in the {expected} slot reports role {found}")]
    Role { expected: PileRole, found: PileRole },
    #[error("{0} is not a same-suit ascending run from the Ace")]
    Foundation(PileRole),
    #[error("{0} has a face-down card above a face-up card")]
    FaceDownAboveFaceUp(PileRole),
    #[error("{0} has a face-down top card")]
    HiddenTop(PileRole),
    #[error("face-up cards in {0} are not a descending alternating run")]
    BrokenRun(PileRole),
    #[error("stock contains a face-up card")]
    StockFaceUp,
    #[error("waste contains a face-down card")]
    WasteFaceDown,
}

/// Complete description of the cards on the table at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableState {
    stock: Pile,
    waste: Pile,
    foundations: [Pile; 4],
    tableau: [Pile; NUM_COLS],
}

/// Hand-built table position, mainly for puzzles and tests.
///
/// Cards not named anywhere in the layout go to the stock face-down, in
/// standard deck order, so that the lowest-indexed remaining card is the
/// first one drawn.
#[derive(Clone, Debug, Default)]
pub struct TableLayout {
    /// Columns bottom to top, with face flags exactly as given.
    pub tableau: [Vec<Card>; NUM_COLS],
    /// Number of cards on each foundation, indexed by `Suit::index()`.
    pub foundations: [u8; 4],
    /// Waste bottom to top; always placed face-up.
    pub waste: Vec<Card>,
}

impl TableLayout {
    pub fn build(self) -> Result<TableState, InvariantViolation> {
        let mut used = [false; CARDS_PER_DECK as usize];
        let mut mark = |card: Card| -> Result<(), InvariantViolation> {
            let slot = &mut used[card.index() as usize];
            if *slot {
                return Err(InvariantViolation::Duplicate(card));
            }
            *slot = true;
            Ok(())
        };

        let mut table = TableState::empty();

        for (i, &count) in self.foundations.iter().enumerate() {
            let suit = Suit::ALL[i];
            for card in standard_deck()
                .into_iter()
                .filter(|c| c.suit == suit)
                .take(count as usize)
            {
                mark(card)?;
                table.foundations[i].push(card.turned_up());
            }
        }
        for (col, cards) in self.tableau.into_iter().enumerate() {
            for card in cards {
                mark(card)?;
                table.tableau[col].push(card);
            }
        }
        for card in self.waste {
            mark(card)?;
            table.waste.push(card.turned_up());
        }
        for card in standard_deck().into_iter().rev() {
            if !used[card.index() as usize] {
                table.stock.push(card);
            }
        }

        table.validate()?;
        Ok(table)
    }
}

impl TableState {
    fn empty() -> Self {
        TableState {
            stock: Pile::new(PileRole::Stock),
            waste: Pile::new(PileRole::Waste),
            foundations: Suit::ALL.map(|s| Pile::new(PileRole::Foundation(s))),
            tableau: core::array::from_fn(|i| Pile::new(PileRole::Tableau(i))),
        }
    }

    /// Deal a 52-card sequence into the classic Klondike layout.
    ///
    /// The first 28 cards fill the columns column by column (column `c`
    /// gets `c + 1` cards, the last of which is turned face-up). The other
    /// 24 form the stock, with deck index 28 on top so it is drawn first.
    pub fn deal(deck: &[Card; CARDS_PER_DECK as usize]) -> Self {
        let mut table = TableState::empty();
        let mut next = 0usize;
        for col in 0..NUM_COLS {
            for row in 0..=col {
                let card = deck[next];
                next += 1;
                table.tableau[col].push(if row == col {
                    card.turned_up()
                } else {
                    card.turned_down()
                });
            }
        }
        debug_assert_eq!(next, TABLEAU_DEAL_LEN);
        for card in deck[TABLEAU_DEAL_LEN..].iter().rev() {
            table.stock.push(card.turned_down());
        }
        table.assert_invariants();
        table
    }

    #[inline]
    pub fn stock(&self) -> &Pile {
        &self.stock
    }

    #[inline]
    pub fn waste(&self) -> &Pile {
        &self.waste
    }

    #[inline]
    pub fn foundation(&self, suit: Suit) -> &Pile {
        &self.foundations[suit.index()]
    }

    #[inline]
    pub fn foundations(&self) -> &[Pile; 4] {
        &self.foundations
    }

    #[inline]
    pub fn tableau(&self) -> &[Pile; NUM_COLS] {
        &self.tableau
    }

    /// Column `col`, if it exists.
    #[inline]
    pub fn column(&self, col: usize) -> Option<&Pile> {
        self.tableau.get(col)
    }

    /// Any pile by role. `None` only for an out-of-range column index.
    pub fn pile(&self, role: PileRole) -> Option<&Pile> {
        match role {
            PileRole::Stock => Some(&self.stock),
            PileRole::Waste => Some(&self.waste),
            PileRole::Foundation(suit) => Some(&self.foundations[suit.index()]),
            PileRole::Tableau(i) => self.tableau.get(i),
        }
    }

    pub(crate) fn pile_mut(&mut self, role: PileRole) -> Option<&mut Pile> {
        match role {
            PileRole::Stock => Some(&mut self.stock),
            PileRole::Waste => Some(&mut self.waste),
            PileRole::Foundation(suit) => Some(&mut self.foundations[suit.index()]),
            PileRole::Tableau(i) => self.tableau.get_mut(i),
        }
    }

    /// Two distinct piles mutably at once.
    pub(crate) fn pile_pair_mut(
        &mut self,
        a: PileRole,
        b: PileRole,
    ) -> Option<(&mut Pile, &mut Pile)> {
        if a == b {
            return None;
        }
        // Each role owns a distinct slot; taking a slot twice yields None.
        let TableState {
            stock,
            waste,
            foundations,
            tableau,
        } = self;
        let mut stock = Some(stock);
        let mut waste = Some(waste);
        let mut foundations: [Option<&mut Pile>; 4] = {
            let mut it = foundations.iter_mut();
            core::array::from_fn(|_| it.next())
        };
        let mut tableau: [Option<&mut Pile>; NUM_COLS] = {
            let mut it = tableau.iter_mut();
            core::array::from_fn(|_| it.next())
        };
        let mut take = |role: PileRole| {
            match role {
                PileRole::Stock => stock.take(),
                PileRole::Waste => waste.take(),
                PileRole::Foundation(suit) => foundations[suit.index()].take(),
                PileRole::Tableau(i) => tableau.get_mut(i)?.take(),
            }
        };
        let first = take(a)?;
        let second = take(b)?;
        Some((first, second))
    }

    /// Number of cards on all foundations combined.
    pub fn foundation_count(&self) -> usize {
        self.foundations.iter().map(Pile::len).sum()
    }

    /// Number of face-down cards left in the tableau.
    pub fn hidden_count(&self) -> usize {
        self.tableau.iter().map(Pile::num_face_down).sum()
    }

    /// Whether column `col` holds no face-down cards (empty counts as complete).
    pub fn is_column_face_up_complete(&self, col: usize) -> bool {
        self.column(col).is_some_and(Pile::is_face_up_complete)
    }

    pub fn is_won(&self) -> bool {
        self.foundations.iter().all(|f| f.len() == 13)
    }

    /// Every card in the table, in a fixed pile order.
    pub fn all_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.stock
            .cards()
            .iter()
            .chain(self.waste.cards())
            .chain(self.foundations.iter().flat_map(|p| p.cards()))
            .chain(self.tableau.iter().flat_map(|p| p.cards()))
            .copied()
    }

    /// 64-bit FNV-1a hash of the full table.
    ///
    /// Covers pile contents, order, and face flags, so two tables with the
    /// same fingerprint are equal for every practical purpose.
    pub fn fingerprint(&self) -> u64 {
        let mut h = FNV_OFFSET_BASIS;
        let mix_pile = |h: &mut u64, tag: u8, pile: &Pile| {
            *h = fnv1a_mix_byte(*h, tag);
            *h = fnv1a_mix_byte(*h, pile.len() as u8);
            for card in pile.cards() {
                *h = fnv1a_mix_byte(*h, card.index() | ((card.face_up as u8) << 7));
            }
        };
        mix_pile(&mut h, b'S', &self.stock);
        mix_pile(&mut h, b'W', &self.waste);
        for f in &self.foundations {
            mix_pile(&mut h, 0xF0, f);
        }
        for col in &self.tableau {
            mix_pile(&mut h, 0xC0, col);
        }
        h
    }

    /// Check every data-model invariant.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut seen = [false; CARDS_PER_DECK as usize];
        let mut total = 0usize;
        for card in self.all_cards() {
            total += 1;
            let slot = &mut seen[card.index() as usize];
            if *slot {
                return Err(InvariantViolation::Duplicate(card));
            }
            *slot = true;
        }
        if total != CARDS_PER_DECK as usize {
            return Err(InvariantViolation::CardCount(total));
        }

        check_role(&self.stock, PileRole::Stock)?;
        check_role(&self.waste, PileRole::Waste)?;
        if self.stock.cards().iter().any(|c| c.face_up) {
            return Err(InvariantViolation::StockFaceUp);
        }
        if self.waste.cards().iter().any(|c| !c.face_up) {
            return Err(InvariantViolation::WasteFaceDown);
        }

        for (i, pile) in self.foundations.iter().enumerate() {
            let role = PileRole::Foundation(Suit::ALL[i]);
            check_role(pile, role)?;
            let ordered = pile.cards().iter().enumerate().all(|(n, c)| {
                c.suit == Suit::ALL[i] && c.rank.number() as usize == n + 1 && c.face_up
            });
            if !ordered {
                return Err(InvariantViolation::Foundation(role));
            }
        }

        for (i, pile) in self.tableau.iter().enumerate() {
            let role = PileRole::Tableau(i);
            check_role(pile, role)?;
            let start = pile.face_up_start();
            if pile.cards()[..start].iter().any(|c| c.face_up) {
                return Err(InvariantViolation::FaceDownAboveFaceUp(role));
            }
            if !pile.is_empty() && start == pile.len() {
                return Err(InvariantViolation::HiddenTop(role));
            }
            if start < pile.len() && !is_valid_run(&pile.cards()[start..]) {
                return Err(InvariantViolation::BrokenRun(role));
            }
        }
        Ok(())
    }

    /// Panic on a broken invariant in debug builds. A violation here is a
    /// bug in the engine, never a recoverable condition.
    #[inline]
    pub(crate) fn assert_invariants(&self) {
        #[cfg(debug_assertions)]
        {
            if let Err(violation) = self.validate() {
                panic!("table invariant violated: {violation}\n{self}");
            }
        }
    }
}

fn check_role(pile: &Pile, expected: PileRole) -> Result<(), InvariantViolation> {
    if pile.role() != expected {
        return Err(InvariantViolation::Role {
            expected,
            found: pile.role(),
        });
    }
    Ok(())
}

/// 64-bit FNV-1a parameters.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

#[inline]
fn fnv1a_mix_byte(mut h: u64, byte: u8) -> u64 {
    h ^= byte as u64;
    h = h.wrapping_mul(FNV_PRIME);
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rank;

    fn up(code: &str) -> Card {
        code.parse::<Card>().unwrap().turned_up()
    }

    #[test]
    fn starter_and_bottom_indices() {
        let starters: Vec<usize> = (0..NUM_COLS).map(starter_index).collect();
        assert_eq!(starters, [0, 2, 5, 9, 14, 20, 27]);
        let bottoms: Vec<usize> = (1..NUM_COLS).map(column_bottom_index).collect();
        assert_eq!(bottoms, [1, 3, 6, 10, 15, 21]);
    }

    #[test]
    fn deal_lays_out_columns_and_stock() {
        let deck = standard_deck();
        let table = TableState::deal(&deck);

        for col in 0..NUM_COLS {
            let pile = &table.tableau()[col];
            assert_eq!(pile.len(), col + 1);
            assert_eq!(pile.num_face_down(), col);
            assert!(pile.top().unwrap().same_card(deck[starter_index(col)]));
            assert!(pile.cards()[0].same_card(deck[column_bottom_index(col)]));
        }
        assert_eq!(table.stock().len(), 24);
        assert!(table.stock().top().unwrap().same_card(deck[28]));
        assert!(table.waste().is_empty());
        assert_eq!(table.foundation_count(), 0);
        assert_eq!(table.hidden_count(), 21);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn default_layout_puts_everything_in_stock() {
        let table = TableLayout::default().build().unwrap();
        assert_eq!(table.stock().len(), 52);
        assert_eq!(
            table.stock().top(),
            Some(Card::new(Suit::Clubs, Rank::Ace)),
            "lowest remaining card is drawn first"
        );
    }

    #[test]
    fn layout_rejects_duplicates_and_broken_runs() {
        let mut layout = TableLayout::default();
        layout.tableau[0] = vec![up("7H")];
        layout.waste = vec![up("7H")];
        assert_eq!(layout.build(), Err(InvariantViolation::Duplicate(up("7H"))));

        let mut layout = TableLayout::default();
        layout.tableau[3] = vec![up("7H"), up("6H")];
        assert_eq!(
            layout.build(),
            Err(InvariantViolation::BrokenRun(PileRole::Tableau(3)))
        );

        let mut layout = TableLayout::default();
        layout.tableau[1] = vec!["7H".parse().unwrap()];
        assert_eq!(
            layout.build(),
            Err(InvariantViolation::HiddenTop(PileRole::Tableau(1)))
        );
    }

    #[test]
    fn layout_foundations_are_filled_in_order() {
        let mut layout = TableLayout::default();
        layout.foundations[Suit::Hearts.index()] = 3;
        let table = layout.build().unwrap();
        let hearts = table.foundation(Suit::Hearts);
        assert_eq!(hearts.len(), 3);
        assert_eq!(hearts.top(), Some(up("3H")));
        assert_eq!(table.stock().len(), 49);
    }

    #[test]
    fn pile_pair_mut_rejects_same_pile() {
        let mut table = TableState::deal(&standard_deck());
        assert!(table.pile_pair_mut(PileRole::Waste, PileRole::Waste).is_none());
        assert!(table
            .pile_pair_mut(PileRole::Tableau(0), PileRole::Tableau(9))
            .is_none());
        let (a, b) = table
            .pile_pair_mut(PileRole::Tableau(6), PileRole::Stock)
            .unwrap();
        assert_eq!(a.role(), PileRole::Tableau(6));
        assert_eq!(b.role(), PileRole::Stock);
    }

    #[test]
    fn fingerprint_sees_face_flags() {
        let table = TableState::deal(&standard_deck());
        let mut flipped = table.clone();
        flipped.tableau[1].top_mut().unwrap().face_up = false;
        assert_ne!(table.fingerprint(), flipped.fingerprint());
        assert_eq!(table.fingerprint(), table.clone().fingerprint());
    }
}
