//! Move representation, legality checks, and move generation (draw-1,
//! unlimited recycles).
//
//! This module defines a compact `Move` type plus helpers to list every
//! legal move of a `TableState` and to check a single move before the
//! engine commits it. Nothing here mutates state; `MoveEngine` applies
//! moves and `AutoSolver` / `HintRanker` rank them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{Card, Suit};
use crate::pile::{NUM_COLS, Pile, PileRole};
use crate::rules::{can_place_on_foundation, can_place_on_tableau};
use crate::table::TableState;

/// The different move types in Klondike.
///
/// Column indices are 0-based internally but printed 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// Turn the stock top onto the waste, face-up.
    Draw,

    /// Stock is empty: turn the whole waste back over into the stock.
    Recycle,

    /// Move the top card of the waste or of a column to its foundation.
    ToFoundation { from: PileRole },

    /// Move cards onto a tableau column.
    ///
    /// - `from`: the waste, a foundation, or another column
    /// - `start`: index *within the source pile* of the first moved card;
    ///   everything above it moves along. For the waste and foundations
    ///   this is always the top index.
    /// - `to`: destination column
    ToTableau {
        from: PileRole,
        start: usize,
        to: usize,
    },
}

/// A single move, wrapping a `MoveKind` for future extensibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub kind: MoveKind,
}

impl From<MoveKind> for Move {
    fn from(kind: MoveKind) -> Self {
        Move { kind }
    }
}

/// Whether a move came from the player or from the auto-solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOrigin {
    Manual,
    Automated,
}

/// The card(s) a caller picked up: a pile and the index of the deepest
/// picked card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveSource {
    pub pile: PileRole,
    pub index: usize,
}

impl MoveSource {
    /// Pick up the top card of `pile`.
    pub fn top(table: &TableState, pile: PileRole) -> Self {
        let len = table.pile(pile).map(Pile::len).unwrap_or(0);
        MoveSource {
            pile,
            index: len.saturating_sub(1),
        }
    }

    /// Pick up column `col` from `index` upwards.
    pub fn run(col: usize, index: usize) -> Self {
        MoveSource {
            pile: PileRole::Tableau(col),
            index,
        }
    }
}

/// Why a move was refused. Every variant leaves the table unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("{0} does not exist")]
    NoSuchPile(PileRole),
    #[error("{0} is empty")]
    EmptyPile(PileRole),
    #[error("card {index} of {pile} is face-down")]
    FaceDown { pile: PileRole, index: usize },
    #[error("only the top card of {0} can move")]
    NotMovable(PileRole),
    #[error("source and destination are both {0}")]
    SamePile(PileRole),
    #[error("cards cannot move from {from} to {to}")]
    UnsupportedTarget { from: PileRole, to: PileRole },
    #[error("{card} does not go on the {suit:?} foundation")]
    IllegalFoundation { card: Card, suit: Suit },
    #[error("{card} does not go on column {}", .column + 1)]
    IllegalTableau { card: Card, column: usize },
    #[error("the stock still has cards; draw instead of recycling")]
    StockNotEmpty,
}

impl MoveError {
    /// Every engine refusal is an InvalidMove outcome; empty-pile access is
    /// reported the same way.
    pub fn is_invalid_move(&self) -> bool {
        true
    }

    pub fn is_empty_pile(&self) -> bool {
        matches!(self, MoveError::EmptyPile(_))
    }
}

/// Outcome of a committed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub mv: Move,
    /// First (deepest) moved card; `None` for a recycle.
    pub card: Option<Card>,
    /// Number of cards that changed pile.
    pub count: usize,
    /// Card turned face-up in the source column, if any.
    pub revealed: Option<Card>,
    pub score_delta: i32,
    pub automated: bool,
}

/// Result of a successful legality check: what would move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub card: Option<Card>,
    pub count: usize,
}

/// Check a move against the current table without applying it.
pub fn check_move(table: &TableState, kind: &MoveKind) -> Result<MovePlan, MoveError> {
    match *kind {
        MoveKind::Draw => {
            let card = table
                .stock()
                .top()
                .ok_or(MoveError::EmptyPile(PileRole::Stock))?;
            Ok(MovePlan {
                card: Some(card),
                count: 1,
            })
        }

        MoveKind::Recycle => {
            if !table.stock().is_empty() {
                return Err(MoveError::StockNotEmpty);
            }
            if table.waste().is_empty() {
                return Err(MoveError::EmptyPile(PileRole::Waste));
            }
            Ok(MovePlan {
                card: None,
                count: table.waste().len(),
            })
        }

        MoveKind::ToFoundation { from } => {
            let src = table.pile(from).ok_or(MoveError::NoSuchPile(from))?;
            let card = src.top().ok_or(MoveError::EmptyPile(from))?;
            if !matches!(from, PileRole::Waste | PileRole::Tableau(_)) {
                return Err(MoveError::UnsupportedTarget {
                    from,
                    to: PileRole::Foundation(card.suit),
                });
            }
            if !card.face_up {
                return Err(MoveError::FaceDown {
                    pile: from,
                    index: src.len() - 1,
                });
            }
            if !can_place_on_foundation(card, table.foundation(card.suit)) {
                return Err(MoveError::IllegalFoundation {
                    card,
                    suit: card.suit,
                });
            }
            Ok(MovePlan {
                card: Some(card),
                count: 1,
            })
        }

        MoveKind::ToTableau { from, start, to } => {
            let dest_role = PileRole::Tableau(to);
            let dest = table.column(to).ok_or(MoveError::NoSuchPile(dest_role))?;
            if from == dest_role {
                return Err(MoveError::SamePile(from));
            }
            if from == PileRole::Stock {
                return Err(MoveError::UnsupportedTarget {
                    from,
                    to: dest_role,
                });
            }
            let src = table.pile(from).ok_or(MoveError::NoSuchPile(from))?;
            if src.is_empty() {
                return Err(MoveError::EmptyPile(from));
            }
            if !from.is_tableau() && start + 1 != src.len() {
                return Err(MoveError::NotMovable(from));
            }
            let card = src.get(start).ok_or(MoveError::NotMovable(from))?;
            if start < src.face_up_start() || !card.face_up {
                return Err(MoveError::FaceDown {
                    pile: from,
                    index: start,
                });
            }
            if !can_place_on_tableau(card, dest) {
                return Err(MoveError::IllegalTableau { card, column: to });
            }
            Ok(MovePlan {
                card: Some(card),
                count: src.len() - start,
            })
        }
    }
}

/// Translate a pick-up/drop pair into a `MoveKind`.
///
/// Dropping anything from the stock onto the waste is a draw (or a recycle
/// when the stock is empty).
pub fn resolve_move(
    table: &TableState,
    source: MoveSource,
    dest: PileRole,
) -> Result<MoveKind, MoveError> {
    let src = table
        .pile(source.pile)
        .ok_or(MoveError::NoSuchPile(source.pile))?;

    match (source.pile, dest) {
        (PileRole::Stock, PileRole::Waste) => {
            if table.stock().is_empty() {
                Ok(MoveKind::Recycle)
            } else {
                Ok(MoveKind::Draw)
            }
        }
        (from, PileRole::Foundation(suit)) => {
            let card = src.top().ok_or(MoveError::EmptyPile(from))?;
            if source.index + 1 != src.len() {
                return Err(MoveError::NotMovable(from));
            }
            if card.suit != suit {
                return Err(MoveError::IllegalFoundation { card, suit });
            }
            Ok(MoveKind::ToFoundation { from })
        }
        (from, PileRole::Tableau(to)) => Ok(MoveKind::ToTableau {
            from,
            start: source.index,
            to,
        }),
        (from, to) => Err(MoveError::UnsupportedTarget { from, to }),
    }
}

/// Generate all legal moves from the given table.
///
/// This does **not** prioritize moves; it lists everything that is legal.
///   - Column -> Foundation (top face-up card only)
///   - Waste  -> Foundation
///   - Column -> Column (every start index inside the movable suffix)
///   - Waste  -> Column
///   - Foundation -> Column
///   - Draw when the stock is non-empty, Recycle when only the waste is
pub fn legal_moves(table: &TableState) -> Vec<Move> {
    let mut moves = Vec::new();
    let mut push = |kind: MoveKind| {
        if check_move(table, &kind).is_ok() {
            moves.push(Move { kind });
        }
    };

    for col in 0..NUM_COLS {
        push(MoveKind::ToFoundation {
            from: PileRole::Tableau(col),
        });
    }
    push(MoveKind::ToFoundation {
        from: PileRole::Waste,
    });

    for (src_col, pile) in table.tableau().iter().enumerate() {
        for start in pile.face_up_start()..pile.len() {
            for to in (0..NUM_COLS).filter(|&c| c != src_col) {
                push(MoveKind::ToTableau {
                    from: PileRole::Tableau(src_col),
                    start,
                    to,
                });
            }
        }
    }

    let tops = [PileRole::Waste]
        .into_iter()
        .chain(Suit::ALL.map(PileRole::Foundation));
    for from in tops {
        let Some(len) = table.pile(from).map(Pile::len).filter(|&l| l > 0) else {
            continue;
        };
        for to in 0..NUM_COLS {
            push(MoveKind::ToTableau {
                from,
                start: len - 1,
                to,
            });
        }
    }

    push(MoveKind::Draw);
    push(MoveKind::Recycle);

    moves
}

impl Move {
    /// Render a move as a human-readable string, using the table to name
    /// the moved cards.
    pub fn describe(&self, table: &TableState) -> String {
        match self.kind {
            MoveKind::Draw => match table.stock().top() {
                Some(card) => format!("Draw {} from Stock", card.short_str()),
                None => "Draw from Stock (empty)".to_string(),
            },

            MoveKind::Recycle => format!("Recycle {} Waste cards into Stock", table.waste().len()),

            MoveKind::ToFoundation { from } => {
                match table.pile(from).and_then(Pile::top) {
                    Some(card) => format!(
                        "{}: {} -> Foundation({:?})",
                        from,
                        card.short_str(),
                        card.suit
                    ),
                    None => format!("{} (empty) -> Foundation", from),
                }
            }

            MoveKind::ToTableau { from, start, to } => {
                let Some(src) = table.pile(from) else {
                    return format!("{} -> Column {}", from, to + 1);
                };
                match (src.get(start), src.top()) {
                    (Some(first), Some(last)) if start + 1 < src.len() => format!(
                        "{}: {}..{} -> Column {}",
                        from,
                        first.short_str(),
                        last.short_str(),
                        to + 1
                    ),
                    (Some(first), _) => {
                        format!("{}: {} -> Column {}", from, first.short_str(), to + 1)
                    }
                    _ => format!("{} (empty) -> Column {}", from, to + 1),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::standard_deck;
    use crate::table::TableLayout;

    fn up(code: &str) -> Card {
        code.parse::<Card>().unwrap().turned_up()
    }

    fn down(code: &str) -> Card {
        code.parse::<Card>().unwrap()
    }

    #[test]
    fn opening_moves_of_standard_deck() {
        // Starters: AC, 3C, 6C, TC, 2D, 8D, 2H.
        let table = TableState::deal(&standard_deck());
        let moves = legal_moves(&table);

        assert!(moves.contains(&Move::from(MoveKind::ToFoundation {
            from: PileRole::Tableau(0)
        })));
        assert!(moves.contains(&Move::from(MoveKind::Draw)));
        assert!(!moves.contains(&Move::from(MoveKind::Recycle)));
        for mv in &moves {
            assert!(check_move(&table, &mv.kind).is_ok(), "{}", mv.describe(&table));
        }
    }

    #[test]
    fn every_start_in_suffix_is_considered() {
        let mut layout = TableLayout::default();
        layout.tableau[0] = vec![down("AS"), up("9S"), up("8H"), up("7C")];
        layout.tableau[1] = vec![up("9D")];
        layout.tableau[2] = vec![up("TH")];
        let table = layout.build().unwrap();
        let moves = legal_moves(&table);

        // 8H..7C onto... nothing (9D is red); 9S..7C onto TH.
        assert!(moves.contains(&Move::from(MoveKind::ToTableau {
            from: PileRole::Tableau(0),
            start: 1,
            to: 2
        })));
        // 8H cannot go on 9D.
        assert!(!moves.contains(&Move::from(MoveKind::ToTableau {
            from: PileRole::Tableau(0),
            start: 2,
            to: 1
        })));
    }

    #[test]
    fn check_move_rejects_with_reasons() {
        let mut layout = TableLayout::default();
        layout.tableau[0] = vec![up("7H")];
        layout.tableau[1] = vec![down("KC"), up("6H")];
        layout.tableau[2] = vec![up("6S")];
        layout.waste = vec![up("9C")];
        let table = layout.build().unwrap();

        assert_eq!(
            check_move(
                &table,
                &MoveKind::ToTableau {
                    from: PileRole::Tableau(1),
                    start: 1,
                    to: 0
                }
            ),
            Err(MoveError::IllegalTableau {
                card: up("6H"),
                column: 0
            })
        );
        assert_eq!(
            check_move(
                &table,
                &MoveKind::ToTableau {
                    from: PileRole::Tableau(1),
                    start: 0,
                    to: 4
                }
            ),
            Err(MoveError::FaceDown {
                pile: PileRole::Tableau(1),
                index: 0
            })
        );
        assert_eq!(
            check_move(
                &table,
                &MoveKind::ToTableau {
                    from: PileRole::Tableau(2),
                    start: 0,
                    to: 0
                }
            ),
            Ok(MovePlan {
                card: Some(up("6S")),
                count: 1
            })
        );
        assert_eq!(
            check_move(&table, &MoveKind::Recycle),
            Err(MoveError::StockNotEmpty)
        );
        assert_eq!(
            check_move(
                &table,
                &MoveKind::ToFoundation {
                    from: PileRole::Waste
                }
            ),
            Err(MoveError::IllegalFoundation {
                card: up("9C"),
                suit: Suit::Clubs
            })
        );
        assert_eq!(
            check_move(
                &table,
                &MoveKind::ToTableau {
                    from: PileRole::Tableau(3),
                    start: 0,
                    to: 0
                }
            ),
            Err(MoveError::EmptyPile(PileRole::Tableau(3)))
        );
    }

    #[test]
    fn resolve_stock_drop_and_foundation_suit() {
        let table = TableState::deal(&standard_deck());
        let src = MoveSource::top(&table, PileRole::Stock);
        assert_eq!(resolve_move(&table, src, PileRole::Waste), Ok(MoveKind::Draw));

        let ace = MoveSource::top(&table, PileRole::Tableau(0));
        assert_eq!(
            resolve_move(&table, ace, PileRole::Foundation(Suit::Clubs)),
            Ok(MoveKind::ToFoundation {
                from: PileRole::Tableau(0)
            })
        );
        assert!(matches!(
            resolve_move(&table, ace, PileRole::Foundation(Suit::Hearts)),
            Err(MoveError::IllegalFoundation { .. })
        ));
        assert!(matches!(
            resolve_move(&table, ace, PileRole::Stock),
            Err(MoveError::UnsupportedTarget { .. })
        ));
    }

    #[test]
    fn describe_runs_and_single_cards() {
        let mut layout = TableLayout::default();
        layout.tableau[0] = vec![up("9S"), up("8H")];
        let table = layout.build().unwrap();
        let mv = Move::from(MoveKind::ToTableau {
            from: PileRole::Tableau(0),
            start: 0,
            to: 3,
        });
        assert_eq!(mv.describe(&table), "Column 1: 9S..8H -> Column 4");
        assert_eq!(
            Move::from(MoveKind::Draw).describe(&table),
            "Draw AC from Stock"
        );
    }

    #[test]
    fn every_error_is_invalid_move() {
        assert!(MoveError::StockNotEmpty.is_invalid_move());
        assert!(MoveError::EmptyPile(PileRole::Waste).is_empty_pile());
    }
}
