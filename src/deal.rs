//! Eased deal generation by rejection sampling.
//!
//! A candidate is a uniform shuffle of the 52 cards in deal order: the
//! first 28 fill the tableau column by column, the remaining 24 form the
//! stock (deck index 28 drawn first). Each candidate is tested against the
//! enabled constraints in `DealConstraints`; the first one that passes is
//! accepted. If `max_tries` candidates all fail, a plain shuffle is
//! returned and the deal is marked `Degraded`.
//!
//! Every constraint is a pure function over the card order. The
//! probabilistic ones take their verdict from the caller's RNG, so a
//! seeded RNG reproduces the same deal.

use std::collections::VecDeque;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::card::{CARDS_PER_DECK, Card, Color, Rank, Suit, standard_deck};
use crate::pile::NUM_COLS;
use crate::rules::can_stack;
use crate::table::{TABLEAU_DEAL_LEN, TableState, column_bottom_index, starter_index};

const DECK_LEN: usize = CARDS_PER_DECK as usize;

/// Rank 3 and below: cards that should stay reachable early.
#[inline]
pub fn is_critical(card: Card) -> bool {
    card.rank.number() <= 3
}

/// Rank 2 and below.
#[inline]
pub fn is_very_low(card: Card) -> bool {
    card.rank.number() <= 2
}

/// Similarity thresholds against recently accepted deals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiversityGuard {
    /// Number of accepted deals remembered.
    pub history: usize,
    /// Starters (rank and colour, per column) that must match to count as
    /// similar.
    pub min_starter_matches: usize,
    /// Length of the compared deal-order suit prefix.
    pub suit_prefix_len: usize,
    /// Matching suits within the prefix that count as similar.
    pub min_suit_matches: usize,
}

impl Default for DiversityGuard {
    fn default() -> Self {
        DiversityGuard {
            history: 10,
            min_starter_matches: 5,
            suit_prefix_len: 20,
            min_suit_matches: 16,
        }
    }
}

/// Tunable acceptance rules. `None` (or `false`) disables a rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DealConstraints {
    pub max_tries: u32,
    /// Cap on adjacent same-suit pairs within the 28 tableau cards.
    pub max_same_suit_pairs_first28: Option<usize>,
    /// Cap on adjacent same-suit pairs over the whole deck.
    pub max_same_suit_pairs_all: Option<usize>,
    /// Chance to reject a deal with three same-suit cards stacked in one
    /// column.
    pub triple_run_reject_chance: Option<f64>,
    /// Cap on critical cards dealt face-down.
    pub max_buried_critical: Option<usize>,
    /// Require a critical card among the seven face-up starters.
    pub require_face_up_critical: bool,
    /// Chance to reject a deal with a very-low card at the deepest
    /// position of a column.
    pub column_bottom_reject_chance: Option<f64>,
    /// Minimum critical cards among the starters and the first
    /// `exposure_stock_window` stock cards.
    pub min_critical_exposed: Option<usize>,
    pub exposure_stock_window: usize,
    /// Cap on Kings among the starters.
    pub max_starting_kings: Option<usize>,
    /// Minimum number of columns whose starter can move at once.
    pub min_starter_moves: Option<usize>,
    pub diversity: Option<DiversityGuard>,
}

impl Default for DealConstraints {
    fn default() -> Self {
        DealConstraints {
            max_tries: 20_000,
            max_same_suit_pairs_first28: Some(6),
            max_same_suit_pairs_all: Some(8),
            triple_run_reject_chance: Some(0.8),
            max_buried_critical: Some(2),
            require_face_up_critical: false,
            column_bottom_reject_chance: Some(0.7),
            min_critical_exposed: Some(2),
            exposure_stock_window: 12,
            max_starting_kings: Some(2),
            min_starter_moves: Some(2),
            diversity: Some(DiversityGuard::default()),
        }
    }
}

impl DealConstraints {
    /// Every rule switched off: the first shuffle is always accepted.
    pub fn unconstrained() -> Self {
        DealConstraints {
            max_tries: 1,
            max_same_suit_pairs_first28: None,
            max_same_suit_pairs_all: None,
            triple_run_reject_chance: None,
            max_buried_critical: None,
            require_face_up_critical: false,
            column_bottom_reject_chance: None,
            min_critical_exposed: None,
            exposure_stock_window: 12,
            max_starting_kings: None,
            min_starter_moves: None,
            diversity: None,
        }
    }
}

/// Which rule turned a candidate down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    SameSuitPairsFirst28,
    SameSuitPairsAll,
    TripleRun,
    BuriedCritical,
    NoFaceUpCritical,
    ColumnBottom,
    CriticalExposure,
    StartingKings,
    StarterMoves,
    TooSimilar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealQuality {
    /// Passed every enabled rule on attempt `tries`.
    Eased { tries: u32 },
    /// No candidate passed within `tries` attempts; plain shuffle.
    Degraded { tries: u32 },
}

/// A generated deal in deal order, all cards face-down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deal {
    pub cards: [Card; DECK_LEN],
    pub quality: DealQuality,
}

impl Deal {
    pub fn is_degraded(&self) -> bool {
        matches!(self.quality, DealQuality::Degraded { .. })
    }

    pub fn table(&self) -> TableState {
        TableState::deal(&self.cards)
    }
}

// ----- Pure predicates over a deal order -----

/// The seven face-up starters, one per column.
pub fn starters(deck: &[Card; DECK_LEN]) -> [Card; NUM_COLS] {
    core::array::from_fn(|col| deck[starter_index(col)])
}

/// Adjacent pairs `(i, i + 1)` sharing a suit within the first `prefix`
/// cards.
pub fn same_suit_pairs(deck: &[Card], prefix: usize) -> usize {
    let n = prefix.min(deck.len());
    deck[..n]
        .windows(2)
        .filter(|w| w[0].suit == w[1].suit)
        .count()
}

/// True if some column's dealt cards contain three consecutive cards of
/// one suit.
pub fn has_triple_run(deck: &[Card; DECK_LEN]) -> bool {
    (0..NUM_COLS).any(|col| {
        let span = &deck[column_bottom_index(col)..=starter_index(col)];
        span.windows(3)
            .any(|w| w[0].suit == w[1].suit && w[1].suit == w[2].suit)
    })
}

/// Critical cards dealt into face-down tableau positions.
pub fn buried_critical(deck: &[Card; DECK_LEN]) -> usize {
    (0..TABLEAU_DEAL_LEN)
        .filter(|&i| !is_starter_index(i) && is_critical(deck[i]))
        .count()
}

fn is_starter_index(i: usize) -> bool {
    (0..NUM_COLS).any(|col| starter_index(col) == i)
}

pub fn has_face_up_critical(deck: &[Card; DECK_LEN]) -> bool {
    starters(deck).into_iter().any(is_critical)
}

/// Very-low cards at the deepest position of columns 2..=7.
pub fn very_low_at_column_bottoms(deck: &[Card; DECK_LEN]) -> usize {
    (1..NUM_COLS)
        .filter(|&col| is_very_low(deck[column_bottom_index(col)]))
        .count()
}

/// Critical cards among the starters plus the first `stock_window` stock
/// cards.
pub fn critical_exposed(deck: &[Card; DECK_LEN], stock_window: usize) -> usize {
    let end = (TABLEAU_DEAL_LEN + stock_window).min(DECK_LEN);
    let in_stock = deck[TABLEAU_DEAL_LEN..end]
        .iter()
        .filter(|c| is_critical(**c))
        .count();
    let in_starters = starters(deck).into_iter().filter(|c| is_critical(*c)).count();
    in_starters + in_stock
}

pub fn starting_kings(deck: &[Card; DECK_LEN]) -> usize {
    starters(deck)
        .into_iter()
        .filter(|c| c.rank == Rank::King)
        .count()
}

/// Columns whose starter can move right away: a King, or a card that
/// stacks on another column's starter.
pub fn starter_moves(deck: &[Card; DECK_LEN]) -> usize {
    let tops = starters(deck);
    (0..NUM_COLS)
        .filter(|&from| {
            tops[from].rank == Rank::King
                || (0..NUM_COLS).any(|to| to != from && can_stack(tops[from], tops[to]))
        })
        .count()
}

/// Compact fingerprint of a deal used by the diversity guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealSignature {
    starters: [(Rank, Color); NUM_COLS],
    suits: [Suit; TABLEAU_DEAL_LEN],
}

impl DealSignature {
    pub fn of(deck: &[Card; DECK_LEN]) -> Self {
        DealSignature {
            starters: starters(deck).map(|c| (c.rank, c.color())),
            suits: core::array::from_fn(|i| deck[i].suit),
        }
    }

    pub fn is_too_similar(&self, other: &DealSignature, guard: &DiversityGuard) -> bool {
        let starter_matches = self
            .starters
            .iter()
            .zip(&other.starters)
            .filter(|(a, b)| a == b)
            .count();
        let prefix = guard.suit_prefix_len.min(TABLEAU_DEAL_LEN);
        let suit_matches = self.suits[..prefix]
            .iter()
            .zip(&other.suits[..prefix])
            .filter(|(a, b)| a == b)
            .count();
        starter_matches >= guard.min_starter_matches && suit_matches >= guard.min_suit_matches
    }
}

/// Signatures of recently accepted deals, oldest first.
#[derive(Clone, Debug, Default)]
pub struct DealHistory {
    recent: VecDeque<DealSignature>,
}

impl DealHistory {
    pub fn violates(&self, sig: &DealSignature, guard: &DiversityGuard) -> bool {
        self.recent.iter().any(|old| sig.is_too_similar(old, guard))
    }

    pub fn push(&mut self, sig: DealSignature, capacity: usize) {
        self.recent.push_back(sig);
        while self.recent.len() > capacity {
            self.recent.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn clear(&mut self) {
        self.recent.clear();
    }
}

/// Draw a verdict for a soft rule. Out-of-range chances saturate.
fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    if p.is_nan() || p <= 0.0 {
        false
    } else if p >= 1.0 {
        true
    } else {
        rng.gen_bool(p)
    }
}

/// Deal generator carrying its diversity history across deals.
#[derive(Clone, Debug, Default)]
pub struct DealGenerator {
    constraints: DealConstraints,
    history: DealHistory,
}

impl DealGenerator {
    pub fn new(constraints: DealConstraints) -> Self {
        DealGenerator {
            constraints,
            history: DealHistory::default(),
        }
    }

    pub fn constraints(&self) -> &DealConstraints {
        &self.constraints
    }

    pub fn history(&self) -> &DealHistory {
        &self.history
    }

    /// Test a candidate against every enabled rule, cheapest first.
    pub fn check<R: Rng + ?Sized>(
        &self,
        deck: &[Card; DECK_LEN],
        rng: &mut R,
    ) -> Result<(), Rejection> {
        let c = &self.constraints;

        if c
            .max_same_suit_pairs_first28
            .is_some_and(|max| same_suit_pairs(deck, TABLEAU_DEAL_LEN) > max)
        {
            return Err(Rejection::SameSuitPairsFirst28);
        }
        if let Some(p) = c.triple_run_reject_chance {
            if has_triple_run(deck) && chance(rng, p) {
                return Err(Rejection::TripleRun);
            }
        }
        if c.max_same_suit_pairs_all.is_some_and(|max| same_suit_pairs(deck, DECK_LEN) > max) {
            return Err(Rejection::SameSuitPairsAll);
        }
        if c.max_buried_critical.is_some_and(|max| buried_critical(deck) > max) {
            return Err(Rejection::BuriedCritical);
        }
        if c.require_face_up_critical && !has_face_up_critical(deck) {
            return Err(Rejection::NoFaceUpCritical);
        }
        if let Some(p) = c.column_bottom_reject_chance {
            if very_low_at_column_bottoms(deck) > 0 && chance(rng, p) {
                return Err(Rejection::ColumnBottom);
            }
        }
        if c
            .min_critical_exposed
            .is_some_and(|min| critical_exposed(deck, c.exposure_stock_window) < min)
        {
            return Err(Rejection::CriticalExposure);
        }
        if c.max_starting_kings.is_some_and(|max| starting_kings(deck) > max) {
            return Err(Rejection::StartingKings);
        }
        if c.min_starter_moves.is_some_and(|min| starter_moves(deck) < min) {
            return Err(Rejection::StarterMoves);
        }
        if let Some(guard) = &c.diversity {
            if self.history.violates(&DealSignature::of(deck), guard) {
                return Err(Rejection::TooSimilar);
            }
        }
        Ok(())
    }

    /// Generate one deal. Accepted deals enter the diversity history.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Deal {
        let mut deck = standard_deck();
        let max_tries = self.constraints.max_tries.max(1);

        for attempt in 1..=max_tries {
            deck.shuffle(rng);
            if self.check(&deck, rng).is_ok() {
                if let Some(guard) = &self.constraints.diversity {
                    self.history.push(DealSignature::of(&deck), guard.history);
                }
                debug!("eased deal accepted after {attempt} tries");
                return Deal {
                    cards: deck,
                    quality: DealQuality::Eased { tries: attempt },
                };
            }
        }

        warn!(
            "no deal met the constraints in {max_tries} tries; falling back to a plain shuffle"
        );
        let mut fallback = standard_deck();
        fallback.shuffle(rng);
        Deal {
            cards: fallback,
            quality: DealQuality::Degraded { tries: max_tries },
        }
    }

    /// Generate with a fresh RNG seeded from `seed`.
    pub fn generate_seeded(&mut self, seed: u64) -> Deal {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(&mut rng)
    }
}

/// One-shot generation without shared history.
pub fn generate_deal(seed: u64, constraints: DealConstraints) -> Deal {
    DealGenerator::new(constraints).generate_seeded(seed)
}
