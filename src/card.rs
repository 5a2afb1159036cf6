//! Card, Suit, and Rank types for a standard 52-card deck.
//!
//! - `Card` is a small value type: suit, rank, and a face-up flag.
//! - `Card::index()` gives a compact 0..=51 identity that ignores the
//!   face-up flag, which is what deal codes and hint hysteresis compare.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of suits in a standard deck.
pub const NUM_SUITS: u8 = 4;
/// Number of ranks in a standard deck.
pub const NUM_RANKS: u8 = 13;
/// Number of cards in a standard deck.
pub const CARDS_PER_DECK: u8 = NUM_SUITS * NUM_RANKS;

/// The four suits, in foundation order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
}

/// Card colour, derived from the suit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Red,
    Black,
}

/// The thirteen ranks. Discriminants are the rank numbers (Ace=1, King=13).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Ace = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King, // 13
}

/// A playing card.
///
/// Identity is `(suit, rank)`; `face_up` is the only field that changes
/// during play, and only when a tableau card is revealed or a card moves
/// between the stock and the waste.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub face_up: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCardError {
    #[error("card code must be two characters, got {0:?}")]
    Length(String),
    #[error("unknown rank character {0:?}")]
    Rank(char),
    #[error("unknown suit character {0:?}")]
    Suit(char),
}

impl Card {
    /// Create a face-down card.
    #[inline]
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card {
            suit,
            rank,
            face_up: false,
        }
    }

    /// Create a card from a compact index in 0..=51 (face-down).
    ///
    /// The mapping is `index = suit as u8 * 13 + (rank number - 1)`.
    pub fn from_index(index: u8) -> Option<Self> {
        if index >= CARDS_PER_DECK {
            return None;
        }
        let suit = Suit::from_u8(index / NUM_RANKS)?;
        let rank = Rank::from_number(index % NUM_RANKS + 1)?;
        Some(Card::new(suit, rank))
    }

    /// Compact 0..=51 identity of this card; independent of `face_up`.
    #[inline]
    pub fn index(self) -> u8 {
        self.suit as u8 * NUM_RANKS + (self.rank.number() - 1)
    }

    /// Same card with the face-up flag set.
    #[inline]
    pub fn turned_up(self) -> Self {
        Card {
            face_up: true,
            ..self
        }
    }

    /// Same card with the face-up flag cleared.
    #[inline]
    pub fn turned_down(self) -> Self {
        Card {
            face_up: false,
            ..self
        }
    }

    #[inline]
    pub fn color(self) -> Color {
        self.suit.color()
    }

    #[inline]
    pub fn is_red(self) -> bool {
        self.color() == Color::Red
    }

    /// Whether two cards refer to the same `(suit, rank)`.
    #[inline]
    pub fn same_card(self, other: Card) -> bool {
        self.suit == other.suit && self.rank == other.rank
    }

    /// Short string like "AH", "7C", "TD", "KS".
    pub fn short_str(self) -> String {
        format!("{}{}", self.rank.short_char(), self.suit.short_char())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_str())
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parse a short code such as `"7H"` or `"td"` into a face-down card.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (Some(r), Some(su), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseCardError::Length(s.to_string()));
        };
        let rank = Rank::from_short_char(r).ok_or(ParseCardError::Rank(r))?;
        let suit = Suit::from_short_char(su).ok_or(ParseCardError::Suit(su))?;
        Ok(Card::new(suit, rank))
    }
}

impl Suit {
    /// All suits in foundation order.
    pub const ALL: [Suit; NUM_SUITS as usize] =
        [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    #[inline]
    pub fn from_u8(v: u8) -> Option<Self> {
        Suit::ALL.get(v as usize).copied()
    }

    /// Index of this suit's foundation pile.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Clubs | Suit::Spades => Color::Black,
        }
    }

    /// Single-character representation: 'C', 'D', 'H', or 'S'.
    #[inline]
    pub fn short_char(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }

    pub fn from_short_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Suit::Clubs),
            'D' => Some(Suit::Diamonds),
            'H' => Some(Suit::Hearts),
            'S' => Some(Suit::Spades),
            _ => None,
        }
    }
}

impl Rank {
    /// All ranks in a fixed, reproducible order (Ace..King).
    pub const ALL: [Rank; NUM_RANKS as usize] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Construct a rank from its number 1..=13.
    #[inline]
    pub fn from_number(n: u8) -> Option<Self> {
        if n == 0 {
            return None;
        }
        Rank::ALL.get(n as usize - 1).copied()
    }

    /// Rank number in 1..=13 (Ace=1, King=13).
    #[inline]
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn short_char(self) -> char {
        match self {
            Rank::Ace => 'A',
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
        }
    }

    pub fn from_short_char(c: char) -> Option<Self> {
        Rank::ALL
            .iter()
            .copied()
            .find(|r| r.short_char() == c.to_ascii_uppercase())
    }
}

/// True if the two cards have opposite colours.
#[inline]
pub fn is_opposite_color(a: Card, b: Card) -> bool {
    a.color() != b.color()
}

/// True if `a` is exactly one rank below `b`.
#[inline]
pub fn is_one_rank_below(a: Card, b: Card) -> bool {
    a.rank.number() + 1 == b.rank.number()
}

/// Generate a standard 52-card deck in a fixed order (all face-down).
///
/// Suits follow `Suit::ALL` order, and ranks follow `Rank::ALL` order, so
/// `standard_deck()[i].index() == i`.
pub fn standard_deck() -> [Card; CARDS_PER_DECK as usize] {
    let mut cards = [Card::new(Suit::Clubs, Rank::Ace); CARDS_PER_DECK as usize];
    let mut i = 0usize;
    for &suit in Suit::ALL.iter() {
        for &rank in Rank::ALL.iter() {
            cards[i] = Card::new(suit, rank);
            i += 1;
        }
    }
    cards
}
