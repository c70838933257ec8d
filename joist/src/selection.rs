//! Open-set toggling shared by accordion-like roots.
//!
//! The open set is an ordered sequence: order is the order in which items
//! were opened, not document order. Membership uses `PartialEq`, so two
//! equal strings are the same item.

use serde::{Deserialize, Serialize};

/// How many items may be open at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// At most one item is open.
    #[default]
    Single,
    /// Any number of items may be open.
    Multiple,
}

/// Compute the next open set after toggling `item`.
///
/// Single mode: toggling the open item closes it, toggling any other item
/// replaces the set with just that item. Multiple mode: toggling an open
/// item removes it (remaining order preserved), toggling a closed item
/// appends it.
pub fn toggle<T: Clone + PartialEq>(current: &[T], item: &T, mode: SelectionMode) -> Vec<T> {
    let is_open = current.contains(item);
    match (mode, is_open) {
        (SelectionMode::Single, true) => Vec::new(),
        (SelectionMode::Single, false) => vec![item.clone()],
        (SelectionMode::Multiple, true) => current.iter().filter(|v| *v != item).cloned().collect(),
        (SelectionMode::Multiple, false) => {
            let mut next = current.to_vec();
            next.push(item.clone());
            next
        }
    }
}

/// Drop duplicates, keeping the first occurrence of each value.
///
/// Single mode additionally keeps only the first value.
pub fn normalize<T: Clone + PartialEq>(values: &[T], mode: SelectionMode) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    if mode == SelectionMode::Single {
        out.truncate(1);
    }
    out
}
