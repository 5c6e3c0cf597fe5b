//! Assertions shared by the test suites of the workspace crates.

use assert_float_eq::*;

pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}

/// Asserts that `actual` lies within `tolerance` of `expected`, in absolute terms. Used for
/// statistical checks on Monte Carlo output, where relative error is meaningless near zero.
pub fn assert_within(expected: f64, actual: f64, tolerance: f64) {
    assert!(
        (expected - actual).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

/// Asserts that every value in `actual` lies in the closed range `[min, max]`.
pub fn assert_all_in_range(actual: &[f64], min: f64, max: f64) {
    for (index, &value) in actual.iter().enumerate() {
        assert!(
            (min..=max).contains(&value),
            "value {value} at index {index} outside [{min}, {max}]"
        );
    }
}
