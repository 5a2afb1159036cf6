//! Canonical fixed deals and positions used in tests.
//!
//! Goals:
//!   * Provide a mathematically-defined "no-moves" deal that does **not**
//!     rely on any solver.
//!   * Provide a position the auto-solver must finish.
//!   * Provide a tiny text format for hand-built columns.
//!
//! This module does not depend on the solver or the hint ranker. It only
//! works with cards and the deal layout.

use crate::card::{CARDS_PER_DECK, Card, ParseCardError, Rank, Suit, standard_deck};
use crate::pile::NUM_COLS;
use crate::rules::can_stack;
use crate::table::{InvariantViolation, TABLEAU_DEAL_LEN, TableLayout, TableState, starter_index};

const DECK_LEN: usize = CARDS_PER_DECK as usize;

/// Build a deck which is "unplayable" for draw-1 with unlimited recycles:
///
/// 1. No Ace among the starters or anywhere in the stock.
/// 2. No starter stacks on another starter.
/// 3. No stock card stacks on a starter.
///
/// There are no empty columns at the start, so Kings never move either.
/// Under these conditions drawing through the stock forever never creates
/// a tableau or foundation move.
fn unplayable_deck_by_local_conditions() -> [Card; DECK_LEN] {
    use Rank::*;
    use Suit::*;

    // All-black starters cannot stack on each other.
    const STARTERS: [(Suit, Rank); NUM_COLS] = [
        (Clubs, Two),
        (Spades, Two),
        (Clubs, Three),
        (Spades, Three),
        (Clubs, Four),
        (Spades, Four),
        (Clubs, Five),
    ];
    // Every Ace, and every red card one rank below a starter, stays
    // face-down in the tableau.
    const BURIED: [(Suit, Rank); 10] = [
        (Clubs, Ace),
        (Diamonds, Ace),
        (Hearts, Ace),
        (Spades, Ace),
        (Diamonds, Two),
        (Hearts, Two),
        (Diamonds, Three),
        (Hearts, Three),
        (Diamonds, Four),
        (Hearts, Four),
    ];

    let placed = |card: Card| {
        STARTERS
            .iter()
            .chain(BURIED.iter())
            .any(|&(s, r)| card.suit == s && card.rank == r)
    };
    let mut free = standard_deck().into_iter().filter(|&c| !placed(c));
    let mut buried = BURIED.iter().map(|&(s, r)| Card::new(s, r));

    let mut deck = [Card::new(Clubs, Ace); DECK_LEN];
    let mut col = 0usize;
    for (i, slot) in deck.iter_mut().enumerate() {
        let card = if col < NUM_COLS && i == starter_index(col) {
            let (s, r) = STARTERS[col];
            col += 1;
            Some(Card::new(s, r))
        } else if i < TABLEAU_DEAL_LEN {
            buried.next().or_else(|| free.next())
        } else {
            free.next()
        };
        if let Some(card) = card {
            *slot = card;
        }
    }
    deck
}

/// Purely local check of the conditions used to build
/// `unplayable_deck_by_local_conditions`.
pub fn is_unplayable_by_local_conditions(deck: &[Card; DECK_LEN]) -> bool {
    let starters: Vec<Card> = (0..NUM_COLS).map(|c| deck[starter_index(c)]).collect();
    let stock = &deck[TABLEAU_DEAL_LEN..];

    if starters.iter().chain(stock).any(|c| c.rank == Rank::Ace) {
        return false;
    }
    for (i, &a) in starters.iter().enumerate() {
        for (j, &b) in starters.iter().enumerate() {
            if i != j && can_stack(a, b) {
                return false;
            }
        }
    }
    !stock
        .iter()
        .any(|&s| starters.iter().any(|&t| can_stack(s, t)))
}

/// Canonical "no-moves" deal.
pub fn canonical_unplayable_deck() -> [Card; DECK_LEN] {
    unplayable_deck_by_local_conditions()
}

/// Empty tableau, all 52 cards in the stock with the Ace of Clubs on top
/// and the suits following in foundation order. Drawing and playing to
/// the foundations clears it without a single recycle.
pub fn foundation_order_table() -> Result<TableState, InvariantViolation> {
    TableLayout::default().build()
}

/// Parse one column written bottom to top, e.g. `"-9D -2C 8H 7S"`.
/// A leading `-` marks a face-down card.
pub fn parse_column(text: &str) -> Result<Vec<Card>, ParseCardError> {
    text.split_whitespace()
        .map(|token| match token.strip_prefix('-') {
            Some(code) => code.parse::<Card>(),
            None => token.parse::<Card>().map(Card::turned_up),
        })
        .collect()
}

/// Layout with the given columns; everything else goes to the stock.
pub fn layout_from_columns(columns: [&str; NUM_COLS]) -> Result<TableLayout, ParseCardError> {
    let mut layout = TableLayout::default();
    for (slot, text) in layout.tableau.iter_mut().zip(columns) {
        *slot = parse_column(text)?;
    }
    Ok(layout)
}
