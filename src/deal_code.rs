//! Shareable deal codes.
//!
//! Two interchangeable forms:
//!   - a bracketed list of 52 card indices in deal order, e.g.
//!     `[51, 32, 3, ...]`, using `Card::index()`
//!   - a single deal number: the lexicographic rank of the permutation,
//!     `0 ..= 52! - 1`, so the sorted deck is deal 0
//!
//! The deal number is what a session snapshot stores to remember which
//! deal it started from.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use thiserror::Error;

use crate::card::{CARDS_PER_DECK, Card, Rank, Suit};

const DECK_LEN: usize = CARDS_PER_DECK as usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealCodeError {
    #[error("malformed [...] list")]
    Malformed,
    #[error("could not parse {0:?} as a card index")]
    BadIndex(String),
    #[error("deck list must have 52 numbers, got {0}")]
    WrongLength(usize),
    #[error("card index {0} out of range 0..=51")]
    OutOfRange(u32),
    #[error("duplicate card index {0}")]
    Duplicate(u8),
    #[error("deal number {0:?} is not a decimal integer")]
    BadNumber(String),
    #[error("deal number is not below 52!")]
    NumberTooLarge,
}

/// Parse a bracketed integer list into a deck (all cards face-down).
///
/// Exactly 52 integers, each in 0..=51, with no duplicates.
pub fn parse_deal_list(s: &str) -> Result<[Card; DECK_LEN], DealCodeError> {
    let open = s.find('[').ok_or(DealCodeError::Malformed)?;
    let close = s.rfind(']').ok_or(DealCodeError::Malformed)?;
    if close <= open {
        return Err(DealCodeError::Malformed);
    }

    let mut nums: Vec<u32> = Vec::with_capacity(DECK_LEN);
    for part in s[open + 1..close].split(',') {
        let t = part.trim();
        if t.is_empty() {
            continue;
        }
        let v = t
            .parse::<u32>()
            .map_err(|_| DealCodeError::BadIndex(t.to_string()))?;
        nums.push(v);
    }
    if nums.len() != DECK_LEN {
        return Err(DealCodeError::WrongLength(nums.len()));
    }

    let mut seen = [false; DECK_LEN];
    let mut deck = [Card::new(Suit::Clubs, Rank::Ace); DECK_LEN];
    for (slot, &v) in deck.iter_mut().zip(&nums) {
        let card = u8::try_from(v)
            .ok()
            .and_then(Card::from_index)
            .ok_or(DealCodeError::OutOfRange(v))?;
        let idx = card.index();
        if seen[idx as usize] {
            return Err(DealCodeError::Duplicate(idx));
        }
        seen[idx as usize] = true;
        *slot = card;
    }
    Ok(deck)
}

/// Format a deck as a bracketed index list; inverse of `parse_deal_list`.
pub fn format_deal_list(deck: &[Card; DECK_LEN]) -> String {
    let parts: Vec<String> = deck.iter().map(|c| c.index().to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// 52!, the number of distinct deals.
pub fn deal_count() -> BigUint {
    (1..=DECK_LEN as u32).fold(BigUint::one(), |acc, k| acc * k)
}

/// Lexicographic rank of the deck order. Face flags are ignored.
pub fn deal_number(deck: &[Card; DECK_LEN]) -> BigUint {
    let mut used = [false; DECK_LEN];
    let mut rank = BigUint::zero();
    for (i, card) in deck.iter().enumerate() {
        let idx = card.index() as usize;
        let smaller_unused = used[..idx].iter().filter(|&&u| !u).count();
        used[idx] = true;
        rank *= (DECK_LEN - i) as u32;
        rank += smaller_unused as u32;
    }
    rank
}

/// Deck order for a deal number; inverse of `deal_number`.
pub fn deal_from_number(number: &BigUint) -> Result<[Card; DECK_LEN], DealCodeError> {
    if *number >= deal_count() {
        return Err(DealCodeError::NumberTooLarge);
    }

    // Factorial-base digits, most significant first.
    let mut digits = [0usize; DECK_LEN];
    let mut rest = number.clone();
    for k in 1..=DECK_LEN {
        let base = k as u32;
        digits[DECK_LEN - k] = (&rest % base).to_usize().unwrap_or(0);
        rest /= base;
    }

    let mut available: Vec<u8> = (0..CARDS_PER_DECK).collect();
    let mut deck = [Card::new(Suit::Clubs, Rank::Ace); DECK_LEN];
    for (slot, &d) in deck.iter_mut().zip(&digits) {
        if d >= available.len() {
            return Err(DealCodeError::NumberTooLarge);
        }
        let idx = available.remove(d);
        *slot = Card::from_index(idx).ok_or(DealCodeError::NumberTooLarge)?;
    }
    Ok(deck)
}

/// Parse a deal number typed by a human: whitespace, `#`, `_`, `,`, and
/// `.` separators are ignored.
pub fn parse_deal_number(s: &str) -> Result<BigUint, DealCodeError> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|&ch| !(ch.is_whitespace() || matches!(ch, '#' | '_' | ',' | '.')))
        .collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(DealCodeError::BadNumber(s.to_string()));
    }
    BigUint::parse_bytes(cleaned.as_bytes(), 10)
        .ok_or_else(|| DealCodeError::BadNumber(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::standard_deck;

    #[test]
    fn sorted_deck_is_deal_zero() {
        let deck = standard_deck();
        assert!(deal_number(&deck).is_zero());
        assert_eq!(deal_from_number(&BigUint::zero()), Ok(deck));
    }

    #[test]
    fn reversed_deck_is_last_deal() {
        let mut deck = standard_deck();
        deck.reverse();
        let last = deal_count() - 1u32;
        assert_eq!(deal_number(&deck), last);
        assert_eq!(deal_from_number(&last), Ok(deck));
        assert_eq!(
            deal_from_number(&deal_count()),
            Err(DealCodeError::NumberTooLarge)
        );
    }

    #[test]
    fn small_numbers_swap_the_tail() {
        // Rank 1 swaps the last two cards.
        let deck = deal_from_number(&BigUint::one()).unwrap();
        assert_eq!(deck[50].index(), 51);
        assert_eq!(deck[51].index(), 50);
        assert_eq!(deal_number(&deck), BigUint::one());
    }

    #[test]
    fn deal_number_ignores_face_flags() {
        let deck = standard_deck();
        let mut flipped = deck;
        for c in flipped.iter_mut().take(10) {
            *c = c.turned_up();
        }
        assert_eq!(deal_number(&deck), deal_number(&flipped));
    }

    #[test]
    fn list_parse_and_format() {
        let mut deck = standard_deck();
        deck.swap(0, 51);
        let text = format_deal_list(&deck);
        assert!(text.starts_with("[51, 1, 2,"));
        assert_eq!(parse_deal_list(&text), Ok(deck));
        assert_eq!(parse_deal_list(&format!("deal {text} end")), Ok(deck));
    }

    #[test]
    fn list_errors() {
        assert_eq!(parse_deal_list("1, 2, 3"), Err(DealCodeError::Malformed));
        assert_eq!(parse_deal_list("[1, 2, 3]"), Err(DealCodeError::WrongLength(3)));
        assert!(matches!(parse_deal_list("[x]"), Err(DealCodeError::BadIndex(_))));

        let mut nums: Vec<String> = (0..52).map(|i| i.to_string()).collect();
        nums[7] = "52".to_string();
        assert_eq!(
            parse_deal_list(&format!("[{}]", nums.join(","))),
            Err(DealCodeError::OutOfRange(52))
        );
        nums[7] = "6".to_string();
        assert_eq!(
            parse_deal_list(&format!("[{}]", nums.join(","))),
            Err(DealCodeError::Duplicate(6))
        );
    }

    #[test]
    fn human_deal_numbers() {
        assert_eq!(parse_deal_number("#1_000"), Ok(BigUint::from(1000u32)));
        assert_eq!(parse_deal_number(" 42 "), Ok(BigUint::from(42u32)));
        assert!(parse_deal_number("12ab").is_err());
        assert!(parse_deal_number("").is_err());
    }
}
