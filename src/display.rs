//! Human-readable rendering of a `TableState`.
//!
//! Face-down cards are shown as "XX" and face-up cards with their
//! `short_str()` rank/suit code. The output is meant for logs, panics on
//! broken invariants, and test failure messages; it is not a UI.

use core::fmt;

use crate::card::Card;
use crate::pile::NUM_COLS;
use crate::table::TableState;

/// Format a single card, honouring its face-up flag.
pub fn format_card_visible(card: Card) -> String {
    if card.face_up {
        card.short_str()
    } else {
        "XX".to_string()
    }
}

/// Render only the foundation row, showing the top card of each pile.
///
///   - Empty foundation: `[  ]`
///   - Non-empty: e.g. `[AH]`, `[7C]`, `[KD]`
pub fn render_foundations(table: &TableState) -> String {
    let mut s = String::from("Foundations: ");
    for pile in table.foundations() {
        match pile.top() {
            None => s.push_str("[  ] "),
            Some(card) => s.push_str(&format!("[{}] ", card.short_str())),
        }
    }
    s.trim_end().to_string()
}

/// Render the stock (count only) and waste (top card and count) on one line.
pub fn render_stock_and_waste(table: &TableState) -> String {
    let stock_len = table.stock().len();
    let stock = if stock_len == 0 {
        "Stock: [empty]".to_string()
    } else {
        format!("Stock: [{} cards]", stock_len)
    };

    let waste = match table.waste().top() {
        None => "Waste: [empty]".to_string(),
        Some(top) => format!("Waste: [{}] ({} cards)", top.short_str(), table.waste().len()),
    };

    format!("{stock}    {waste}")
}

/// Render all tableau columns as a multi-line string.
///
/// Columns are top-justified: the deepest card of every column shares the
/// first row, and the last non-empty row of a column is its playable top.
pub fn render_columns(table: &TableState) -> String {
    let mut s = String::new();

    s.push_str("Columns:\n");
    s.push_str("      ");
    for col_idx in 0..NUM_COLS {
        s.push_str(&format!(" C{} ", col_idx + 1));
    }
    s.push('\n');

    let max_height = table.tableau().iter().map(|c| c.len()).max().unwrap_or(0);

    for row in 0..max_height {
        s.push_str("      ");
        for col in table.tableau() {
            match col.get(row) {
                None => s.push_str("    "),
                Some(card) => s.push_str(&format!("{:>3} ", format_card_visible(card))),
            }
        }
        s.push('\n');
    }

    s
}

/// Render a full table (foundations, stock/waste, and columns).
pub fn render_table(table: &TableState) -> String {
    format!(
        "{}\n{}\n\n{}",
        render_foundations(table),
        render_stock_and_waste(table),
        render_columns(table)
    )
}

/// One-line summary of each column's top card, e.g.
/// `C1: 4S  C2: XX  C3: --`.
pub fn render_playing_edge(table: &TableState) -> String {
    let mut s = String::new();
    for (col_idx, col) in table.tableau().iter().enumerate() {
        let cell = match col.top() {
            None => "--".to_string(),
            Some(card) => format_card_visible(card),
        };
        s.push_str(&format!("C{}: {:>2}  ", col_idx + 1, cell));
    }
    s.trim_end().to_string()
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_table(self))
    }
}
