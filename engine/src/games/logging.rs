//! Helpers for the JSON-ish log lines engines hand to the presentation
//! layer.

use std::fmt::Write;

pub(crate) fn format_card_list(cards: &[u8]) -> String {
    let mut out = String::with_capacity(cards.len().saturating_mul(4));
    for (idx, card) in cards.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}", card);
    }
    out
}

pub(crate) fn format_index_list(indexes: &[usize]) -> String {
    let mut out = String::with_capacity(indexes.len().saturating_mul(3));
    for (idx, value) in indexes.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}", value);
    }
    out
}
