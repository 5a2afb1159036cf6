//! Inverse commands and the per-deal undo log.
//!
//! Every committed move pushes one `UndoEntry`. The entry stores how to
//! put the cards back plus the full score board from before the move, so
//! an undo restores the table and the score exactly.

use crate::card::{Card, Suit};
use crate::moves::{MoveError, MoveKind, MoveOrigin, MovePlan};
use crate::pile::PileRole;
use crate::scoring::ScoreBoard;
use crate::table::TableState;

/// How to reverse one committed move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InverseCommand {
    /// Waste top goes back onto the stock, face-down.
    Draw,
    /// The stock (all `count` cards) goes back onto the waste, face-up.
    Recycle { count: usize },
    /// Foundation top goes back to `from`.
    ToFoundation { from: PileRole, suit: Suit },
    /// The top `count` cards of column `to` go back to `from`.
    ToTableau {
        from: PileRole,
        to: usize,
        count: usize,
    },
    /// The move also revealed the top of `column`; hide it first, then
    /// reverse `inner`.
    WithReveal {
        column: usize,
        inner: Box<InverseCommand>,
    },
}

/// One card changing pile during an undo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardMotion {
    pub card: Card,
    pub from: PileRole,
    pub to: PileRole,
}

/// A hidden-again card during an undo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unreveal {
    pub card: Card,
    pub column: usize,
}

impl InverseCommand {
    /// Build the inverse of a move from its checked plan, before any card
    /// moves. A reveal is attached afterwards with `with_reveal`.
    pub fn for_move(kind: &MoveKind, plan: &MovePlan) -> Result<Self, MoveError> {
        Ok(match *kind {
            MoveKind::Draw => InverseCommand::Draw,
            MoveKind::Recycle => InverseCommand::Recycle { count: plan.count },
            MoveKind::ToFoundation { from } => {
                let card = plan.card.ok_or(MoveError::EmptyPile(from))?;
                InverseCommand::ToFoundation {
                    from,
                    suit: card.suit,
                }
            }
            MoveKind::ToTableau { from, to, .. } => InverseCommand::ToTableau {
                from,
                to,
                count: plan.count,
            },
        })
    }

    /// Wrap the command so that undoing it first hides the card turned
    /// face-up in `column`.
    pub fn with_reveal(self, column: Option<usize>) -> Self {
        match column {
            Some(column) => InverseCommand::WithReveal {
                column,
                inner: Box::new(self),
            },
            None => self,
        }
    }

    /// Apply this inverse to the table.
    ///
    /// Returns `None` if the table does not match the state the command was
    /// built for; the table may then be partially modified, which the
    /// engine treats as a broken invariant.
    pub(crate) fn revert(
        &self,
        table: &mut TableState,
        moved: &mut Vec<CardMotion>,
        hidden: &mut Vec<Unreveal>,
    ) -> Option<()> {
        match self {
            InverseCommand::Draw => {
                let (waste, stock) = table.pile_pair_mut(PileRole::Waste, PileRole::Stock)?;
                let card = waste.pop()?;
                stock.push(card.turned_down());
                moved.push(CardMotion {
                    card,
                    from: PileRole::Waste,
                    to: PileRole::Stock,
                });
            }

            InverseCommand::Recycle { count } => {
                let (stock, waste) = table.pile_pair_mut(PileRole::Stock, PileRole::Waste)?;
                if stock.len() != *count {
                    return None;
                }
                while let Some(card) = stock.pop() {
                    let card = card.turned_up();
                    waste.push(card);
                    moved.push(CardMotion {
                        card,
                        from: PileRole::Stock,
                        to: PileRole::Waste,
                    });
                }
            }

            InverseCommand::ToFoundation { from, suit } => {
                let foundation = PileRole::Foundation(*suit);
                let (src, dst) = table.pile_pair_mut(foundation, *from)?;
                let card = src.pop()?;
                dst.push(card);
                moved.push(CardMotion {
                    card,
                    from: foundation,
                    to: *from,
                });
            }

            InverseCommand::ToTableau { from, to, count } => {
                let column = PileRole::Tableau(*to);
                let (src, dst) = table.pile_pair_mut(column, *from)?;
                let at = src.len().checked_sub(*count)?;
                let cards = src.split_off(at);
                moved.extend(cards.iter().map(|&card| CardMotion {
                    card,
                    from: column,
                    to: *from,
                }));
                dst.extend(cards);
            }

            InverseCommand::WithReveal { column, inner } => {
                let pile = table.pile_mut(PileRole::Tableau(*column))?;
                let top = pile.top_mut()?;
                top.face_up = false;
                hidden.push(Unreveal {
                    card: *top,
                    column: *column,
                });
                inner.revert(table, moved, hidden)?;
            }
        }
        Some(())
    }
}

/// One committed move in the undo log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoEntry {
    pub command: InverseCommand,
    pub kind: MoveKind,
    pub score_before: ScoreBoard,
    pub delta: i32,
    pub origin: MoveOrigin,
}

/// Undo history for the current deal, oldest first.
#[derive(Clone, Debug, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::standard_deck;

    #[test]
    fn reveal_wraps_inner_command() {
        let plan = MovePlan {
            card: "6C".parse().ok(),
            count: 1,
        };
        let kind = MoveKind::ToFoundation {
            from: PileRole::Tableau(2),
        };
        let cmd = InverseCommand::for_move(&kind, &plan).unwrap().with_reveal(Some(2));
        assert_eq!(
            cmd,
            InverseCommand::WithReveal {
                column: 2,
                inner: Box::new(InverseCommand::ToFoundation {
                    from: PileRole::Tableau(2),
                    suit: Suit::Clubs,
                }),
            }
        );
    }

    #[test]
    fn foundation_inverse_takes_suit_from_the_moved_card() {
        let kind = MoveKind::ToFoundation {
            from: PileRole::Waste,
        };
        let plan = MovePlan {
            card: "QH".parse().ok(),
            count: 1,
        };
        assert_eq!(
            InverseCommand::for_move(&kind, &plan),
            Ok(InverseCommand::ToFoundation {
                from: PileRole::Waste,
                suit: Suit::Hearts,
            })
        );

        let nothing = MovePlan {
            card: None,
            count: 0,
        };
        assert_eq!(
            InverseCommand::for_move(&kind, &nothing),
            Err(MoveError::EmptyPile(PileRole::Waste))
        );
    }

    #[test]
    fn revert_draw_on_hand_built_table() {
        let mut table = TableState::deal(&standard_deck());
        let before = table.clone();

        // Draw by hand, then revert it.
        let card = table.pile_mut(PileRole::Stock).unwrap().pop().unwrap();
        table.pile_mut(PileRole::Waste).unwrap().push(card.turned_up());

        let mut moved = Vec::new();
        let mut hidden = Vec::new();
        assert!(InverseCommand::Draw.revert(&mut table, &mut moved, &mut hidden).is_some());
        assert_eq!(table, before);
        assert_eq!(moved.len(), 1);
        assert!(hidden.is_empty());
    }

    #[test]
    fn revert_refuses_mismatched_table() {
        let mut table = TableState::deal(&standard_deck());
        let mut moved = Vec::new();
        let mut hidden = Vec::new();
        assert!(InverseCommand::Draw.revert(&mut table, &mut moved, &mut hidden).is_none());
        assert!(InverseCommand::Recycle { count: 3 }
            .revert(&mut table, &mut moved, &mut hidden)
            .is_none());
    }

    #[test]
    fn log_is_lifo() {
        let mut log = UndoLog::new();
        for kind in [MoveKind::Draw, MoveKind::Recycle] {
            log.push(UndoEntry {
                command: InverseCommand::Draw,
                kind,
                score_before: ScoreBoard::default(),
                delta: 0,
                origin: MoveOrigin::Manual,
            });
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.pop().map(|e| e.kind), Some(MoveKind::Recycle));
        assert_eq!(log.last().map(|e| e.kind), Some(MoveKind::Draw));
    }
}
