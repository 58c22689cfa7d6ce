//! Assertion macros for floating-point and ordering checks.

/// Assert that two floating-point values are within `tolerance`.
///
/// ```rust
/// use balance_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(1.0, 1.0001, 0.001);
/// assert_approx_eq!(0.5, 0.5, 1e-12, "ramp at tick {}", 10);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let tolerance: f64 = $tolerance;
        let diff = (left - right).abs();
        if diff.is_nan() || diff > tolerance {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`",
                left, right, diff, tolerance
            );
        }
    };
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let tolerance: f64 = $tolerance;
        let diff = (left - right).abs();
        if diff.is_nan() || diff > tolerance {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`: {}",
                left, right, diff, tolerance, format_args!($($arg)+)
            );
        }
    };
}

/// Assert that a collection is sorted in ascending order.
///
/// ```rust
/// use balance_test_helpers::assert_sorted;
///
/// assert_sorted!(&[0.0, 0.25, 0.5, 1.0]);
/// ```
#[macro_export]
macro_rules! assert_sorted {
    ($collection:expr $(,)?) => {
        let collection = $collection;
        let mut iter = collection.iter();
        if let Some(mut prev) = iter.next() {
            for (i, curr) in iter.enumerate() {
                if prev > curr {
                    panic!(
                        "assertion failed: collection is not sorted\n  first unsorted pair at index {}: {:?} > {:?}",
                        i, prev, curr
                    );
                }
                prev = curr;
            }
        }
    };
}

/// Assert that every element lies in `[min, max]`.
///
/// ```rust
/// use balance_test_helpers::assert_all_within;
///
/// assert_all_within!(&[0.0, 12.5, 40.0], 0.0, 40.0);
/// ```
#[macro_export]
macro_rules! assert_all_within {
    ($collection:expr, $min:expr, $max:expr $(,)?) => {
        for (i, value) in $collection.iter().enumerate() {
            if !(*value >= $min) || *value > $max {
                panic!(
                    "assertion failed: element {} = {:?} outside [{:?}, {:?}]",
                    i, value, $min, $max
                );
            }
        }
    };
}
