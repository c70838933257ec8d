use joist::selection::{self, SelectionMode};

// =============================================================================
// Single Mode Tests
// =============================================================================

#[test]
fn test_single_open_close_switch() {
    let open = selection::toggle(&[], &"first", SelectionMode::Single);
    assert_eq!(open, vec!["first"]);

    let closed = selection::toggle(&open, &"first", SelectionMode::Single);
    assert!(closed.is_empty());

    let switched = selection::toggle(&closed, &"second", SelectionMode::Single);
    assert_eq!(switched, vec!["second"]);
}

#[test]
fn test_single_replaces_open_item() {
    let next = selection::toggle(&["first"], &"second", SelectionMode::Single);
    assert_eq!(next, vec!["second"]);
}

// =============================================================================
// Multiple Mode Tests
// =============================================================================

#[test]
fn test_multiple_appends_in_open_order() {
    let open = selection::toggle(&["second"], &"first", SelectionMode::Multiple);
    assert_eq!(open, vec!["second", "first"]);
}

#[test]
fn test_multiple_removes_and_keeps_order() {
    let next = selection::toggle(&["first", "second", "third"], &"first", SelectionMode::Multiple);
    assert_eq!(next, vec!["second", "third"]);
}

#[test]
fn test_equal_strings_are_the_same_item() {
    let current = vec![String::from("first")];
    let next = selection::toggle(&current, &"first".to_string(), SelectionMode::Multiple);
    assert!(next.is_empty());
}

// =============================================================================
// Normalization Tests
// =============================================================================

#[test]
fn test_normalize_drops_duplicates() {
    let values = selection::normalize(&[1, 2, 1, 3, 2], SelectionMode::Multiple);
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_normalize_single_keeps_first() {
    let values = selection::normalize(&["b", "a"], SelectionMode::Single);
    assert_eq!(values, vec!["b"]);
    assert!(selection::normalize::<&str>(&[], SelectionMode::Single).is_empty());
}

// =============================================================================
// Property Tests
// =============================================================================

mod properties {
    use std::collections::HashMap;

    use joist::selection::{self, SelectionMode};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn single_mode_holds_at_most_last_toggled(toggles in prop::collection::vec(0u8..6, 0..64)) {
            let mut open: Vec<u8> = Vec::new();
            for item in toggles {
                let was_open = open.contains(&item);
                open = selection::toggle(&open, &item, SelectionMode::Single);

                prop_assert!(open.len() <= 1);
                if was_open {
                    prop_assert!(open.is_empty());
                } else {
                    prop_assert_eq!(&open, &vec![item]);
                }
            }
        }

        #[test]
        fn multiple_mode_keeps_opening_order(toggles in prop::collection::vec(0u8..6, 0..64)) {
            let mut open: Vec<u8> = Vec::new();
            // Step at which each currently open item was last opened.
            let mut opened_at: HashMap<u8, usize> = HashMap::new();

            for (step, item) in toggles.into_iter().enumerate() {
                open = selection::toggle(&open, &item, SelectionMode::Multiple);
                if opened_at.remove(&item).is_none() {
                    opened_at.insert(item, step);
                }

                let mut expected: Vec<(usize, u8)> =
                    opened_at.iter().map(|(value, at)| (*at, *value)).collect();
                expected.sort();
                let expected: Vec<u8> = expected.into_iter().map(|(_, value)| value).collect();
                prop_assert_eq!(&open, &expected);
            }
        }

        #[test]
        fn normalize_is_idempotent(values in prop::collection::vec(0u8..6, 0..32), multiple in any::<bool>()) {
            let mode = if multiple { SelectionMode::Multiple } else { SelectionMode::Single };
            let once = selection::normalize(&values, mode);
            prop_assert_eq!(selection::normalize(&once, mode), once.clone());
            for (i, value) in once.iter().enumerate() {
                prop_assert!(!once[i + 1..].contains(value));
            }
        }
    }
}
