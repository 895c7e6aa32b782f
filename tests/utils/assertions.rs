//! Assertion helpers shared by integration tests.

use std::collections::BTreeSet;

/// Panics unless `values` is strictly ascending (sorted, no repeats).
pub fn assert_strictly_ascending(values: &[i32]) {
    for pair in values.windows(2) {
        assert!(
            pair[0] < pair[1],
            "sequence not strictly ascending at {} >= {}: {:?}",
            pair[0],
            pair[1],
            values
        );
    }
}

/// Distinct values of `inserted` that fall outside `[start, end]`, ascending.
pub fn expected_after_range(inserted: &[i32], start: i32, end: i32) -> Vec<i32> {
    inserted
        .iter()
        .copied()
        .filter(|v| *v < start || *v > end)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Every value lies in `[0, span)`.
pub fn assert_within_span(values: &[i32], span: i32) {
    for &v in values {
        assert!((0..span).contains(&v), "{} outside [0, {})", v, span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_after_range() {
        assert_eq!(expected_after_range(&[9, 1, 4, 6, 9, 0], 1, 6), vec![0, 9]);
    }

    #[test]
    #[should_panic(expected = "not strictly ascending")]
    fn test_ascending_rejects_repeats() {
        assert_strictly_ascending(&[1, 2, 2]);
    }
}
