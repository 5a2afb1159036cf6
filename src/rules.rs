//! Pure placement predicates for Klondike.
//!
//! Nothing here mutates state. `MoveEngine` and the search components
//! (`AutoSolver`, `HintRanker`) all route their legality checks through
//! these functions.

use crate::card::{Card, Rank, is_one_rank_below, is_opposite_color};
use crate::pile::{Pile, PileRole};

/// True if `card` may be placed on the given foundation pile.
///
/// The pile's suit is fixed by its role. An empty foundation has a top
/// rank of 0, so only an Ace is accepted first.
pub fn can_place_on_foundation(card: Card, foundation: &Pile) -> bool {
    let PileRole::Foundation(suit) = foundation.role() else {
        return false;
    };
    card.suit == suit && card.rank.number() == foundation.top_rank() + 1
}

/// True if `card` may be placed on the given tableau pile.
///
/// - Empty column: only a King.
/// - Otherwise: opposite colour and exactly one rank below the top card,
///   which must itself be face-up.
pub fn can_place_on_tableau(card: Card, tableau: &Pile) -> bool {
    if !tableau.role().is_tableau() {
        return false;
    }
    match tableau.top() {
        None => card.rank == Rank::King,
        Some(top) => top.face_up && can_stack(card, top),
    }
}

/// True if `upper` may sit directly on `lower` in a tableau run.
#[inline]
pub fn can_stack(upper: Card, lower: Card) -> bool {
    is_opposite_color(upper, lower) && is_one_rank_below(upper, lower)
}

/// The maximal face-up tail of a tableau pile: the unit that may move.
///
/// The descending, alternating-colour shape of this tail is maintained
/// by the engine and is not re-validated here.
pub fn movable_suffix(tableau: &Pile) -> &[Card] {
    &tableau.cards()[tableau.face_up_start()..]
}

/// True if the slice (bottom to top) is a valid descending,
/// alternating-colour run of face-up cards.
pub fn is_valid_run(cards: &[Card]) -> bool {
    if cards.is_empty() {
        return false;
    }
    cards.iter().all(|c| c.face_up) && cards.windows(2).all(|pair| can_stack(pair[1], pair[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    fn up(code: &str) -> Card {
        code.parse::<Card>().unwrap().turned_up()
    }

    fn foundation(suit: Suit, cards: &[&str]) -> Pile {
        Pile::with_cards(
            PileRole::Foundation(suit),
            cards.iter().map(|c| up(c)).collect(),
        )
    }

    fn column(cards: Vec<Card>) -> Pile {
        Pile::with_cards(PileRole::Tableau(0), cards)
    }

    #[test]
    fn empty_foundation_accepts_only_matching_ace() {
        let clubs = foundation(Suit::Clubs, &[]);
        for card in crate::card::standard_deck() {
            let expected = card.rank == Rank::Ace && card.suit == Suit::Clubs;
            assert_eq!(can_place_on_foundation(card, &clubs), expected, "{card}");
        }
    }

    #[test]
    fn foundation_requires_same_suit_next_rank() {
        let clubs = foundation(Suit::Clubs, &["AC"]);
        assert!(!can_place_on_foundation(up("AC"), &clubs));
        assert!(can_place_on_foundation(up("2C"), &clubs));
        assert!(!can_place_on_foundation(up("3C"), &clubs), "correct suit, wrong rank");
        assert!(!can_place_on_foundation(up("2S"), &clubs), "wrong suit");
        assert!(!can_place_on_foundation(up("2H"), &clubs), "wrong suit");
    }

    #[test]
    fn clubs_foundation_scenario() {
        let empty = foundation(Suit::Clubs, &[]);
        assert!(can_place_on_foundation(up("AC"), &empty));
        assert!(!can_place_on_foundation(up("2C"), &empty));
        let with_ace = foundation(Suit::Clubs, &["AC"]);
        assert!(can_place_on_foundation(up("2C"), &with_ace));
    }

    #[test]
    fn empty_column_accepts_only_kings() {
        let empty = column(Vec::new());
        for card in crate::card::standard_deck() {
            assert_eq!(can_place_on_tableau(card, &empty), card.rank == Rank::King);
        }
    }

    #[test]
    fn tableau_requires_opposite_color_one_lower() {
        let col = column(vec![up("7H")]);
        assert!(can_place_on_tableau(up("6S"), &col));
        assert!(can_place_on_tableau(up("6C"), &col));
        assert!(!can_place_on_tableau(up("6H"), &col), "same colour");
        assert!(!can_place_on_tableau(up("6D"), &col), "same colour");
        assert!(!can_place_on_tableau(up("5S"), &col), "two below");
        assert!(!can_place_on_tableau(up("8S"), &col), "above");
    }

    #[test]
    fn face_down_top_accepts_nothing() {
        let col = column(vec!["7H".parse().unwrap()]);
        assert!(!can_place_on_tableau(up("6S"), &col));
    }

    #[test]
    fn movable_suffix_is_face_up_tail() {
        let col = column(vec![
            "AH".parse().unwrap(),
            "2C".parse().unwrap(),
            up("8S"),
            up("7H"),
            up("6C"),
        ]);
        let suffix = movable_suffix(&col);
        assert_eq!(suffix.len(), 3);
        assert_eq!(suffix[0].short_str(), "8S");
        assert!(is_valid_run(suffix));
    }

    #[test]
    fn valid_and_invalid_runs() {
        // 8S, 7H, 6C is valid; adding 5C breaks colour alternation.
        let cards = [up("8S"), up("7H"), up("6C"), up("5C")];
        assert!(is_valid_run(&cards[0..3]));
        assert!(!is_valid_run(&cards[0..4]));
        assert!(!is_valid_run(&[]));
    }
}
