/// Sparse order keys for cards within a list.
///
/// Cards are sorted by `(list_order, id)`, with the file path as a last
/// tiebreak so two id-less cards still have a total order. Placing a card
/// only ever changes that card's key: a new key is picked below the first,
/// above the last, or halfway between two neighbours.
use std::cmp::Ordering;

use crate::types::KanbanCard;

/// Adjacent keys closer than this are considered exhausted; the list is
/// renumbered before another midpoint is taken between them.
pub const MIN_ORDER_GAP: f64 = 1e-6;

/// Where a new or moved card should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Top,
    Bottom,
    /// Slot index in the current list; clamped to top/bottom at the edges.
    Index(i64),
}

impl InsertPosition {
    /// `"bottom"`, `"top"`, or a decimal slot index. Anything else means top.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == "bottom" {
            return InsertPosition::Bottom;
        }
        match raw.parse::<i64>() {
            Ok(idx) => InsertPosition::Index(idx),
            Err(_) => InsertPosition::Top,
        }
    }
}

impl From<&str> for InsertPosition {
    fn from(raw: &str) -> Self {
        InsertPosition::parse(raw)
    }
}

/// Total order of cards within a list.
pub fn compare_cards(a: &KanbanCard, b: &KanbanCard) -> Ordering {
    a.list_order()
        .total_cmp(&b.list_order())
        .then_with(|| a.id().cmp(&b.id()))
        .then_with(|| a.file_path.cmp(&b.file_path))
}

pub fn sort_cards(cards: &mut [KanbanCard]) {
    cards.sort_by(compare_cards);
}

pub fn is_sorted(cards: &[KanbanCard]) -> bool {
    cards
        .windows(2)
        .all(|w| compare_cards(&w[0], &w[1]) != Ordering::Greater)
}

/// Order key and slice index for a card placed at `position` in `cards`
/// (which must be sorted). An empty list yields `(0.0, 0)`.
pub fn compute_insert_position(cards: &[KanbanCard], position: &str) -> (f64, usize) {
    compute_insert_key(cards, InsertPosition::parse(position))
}

pub fn compute_insert_key(cards: &[KanbanCard], position: InsertPosition) -> (f64, usize) {
    let (first, last) = match (cards.first(), cards.last()) {
        (Some(first), Some(last)) => (first.list_order(), last.list_order()),
        _ => return (0.0, 0),
    };
    let len = cards.len();

    match position {
        InsertPosition::Bottom => (last + 1.0, len),
        InsertPosition::Top => (first - 1.0, 0),
        InsertPosition::Index(idx) if idx <= 0 => (first - 1.0, 0),
        InsertPosition::Index(idx) if idx as u64 >= len as u64 => (last + 1.0, len),
        InsertPosition::Index(idx) => {
            let idx = idx as usize;
            let key = (cards[idx - 1].list_order() + cards[idx].list_order()) / 2.0;
            (key, idx)
        }
    }
}

/// Insert `card` keeping `cards` sorted; returns the index it landed at.
/// Equal cards keep insertion order (the new one goes after them).
pub fn insert_sorted(cards: &mut Vec<KanbanCard>, card: KanbanCard) -> usize {
    let idx = cards.partition_point(|c| compare_cards(c, &card) != Ordering::Greater);
    cards.insert(idx, card);
    idx
}

/// Whether a card placed at `idx` would have to squeeze between two keys
/// that are already too close together.
pub fn is_crowded(cards: &[KanbanCard], idx: usize) -> bool {
    if idx == 0 || idx >= cards.len() {
        return false;
    }
    let gap = cards[idx].list_order() - cards[idx - 1].list_order();
    gap < MIN_ORDER_GAP
}

/// Evenly spaced replacement keys for a list of `len` cards: 1, 2, ..., len.
pub fn renormalized_keys(len: usize) -> Vec<f64> {
    (1..=len).map(|k| k as f64).collect()
}
