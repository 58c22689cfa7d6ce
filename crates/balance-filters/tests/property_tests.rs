//! Property-based tests for the CoP filters.

use balance_filters::prelude::*;
use proptest::prelude::*;

fn lowpass(cutoff_hz: f64, order: usize) -> CascadeFilter {
    match CascadeFilter::butterworth(cutoff_hz, 20.0, order, PassType::LowPass) {
        Ok(f) => f,
        Err(e) => panic!("butterworth({cutoff_hz}, {order}): {e}"),
    }
}

fn median(window: usize) -> MedianFilter {
    match MedianFilter::new(window) {
        Ok(m) => m,
        Err(e) => panic!("median({window}): {e}"),
    }
}

proptest! {
    #[test]
    fn lowpass_converges_to_constant(
        cutoff_hz in 0.2f64..9.0,
        order in 1usize..=6,
        value in -50.0f64..50.0,
    ) {
        let mut filter = lowpass(cutoff_hz, order);
        let mut y = 0.0;
        for _ in 0..3000 {
            y = filter.process(value);
        }
        prop_assert!((y - value).abs() < 1e-6 * value.abs().max(1.0), "{y} vs {value}");
    }

    #[test]
    fn moving_average_converges_to_constant(window in 1usize..32, value in -50.0f64..50.0) {
        let mut filter = match CascadeFilter::moving_average(window) {
            Ok(f) => f,
            Err(e) => panic!("moving_average: {e}"),
        };
        let mut y = 0.0;
        for _ in 0..=window {
            y = filter.process(value);
        }
        prop_assert!((y - value).abs() < 1e-9 * value.abs().max(1.0));
    }

    #[test]
    fn cold_start_outputs_equal_inputs(
        order in 1usize..=8,
        inputs in prop::collection::vec(-10.0f64..10.0, 2),
    ) {
        let mut filter = lowpass(1.0, order);
        let warm_up = filter.warm_up_len();
        for x in inputs.iter().take(warm_up) {
            prop_assert_eq!(filter.process(*x), *x);
        }
    }

    #[test]
    fn lowpass_output_is_finite(
        order in 1usize..=8,
        inputs in prop::collection::vec(-100.0f64..100.0, 1..200),
    ) {
        let mut filter = lowpass(0.4615, order);
        for x in inputs {
            prop_assert!(filter.process(x).is_finite());
        }
    }

    #[test]
    fn median_is_order_invariant(
        window in 1usize..9,
        values in prop::collection::vec(-100.0f64..100.0, 9),
        rotation in 0usize..9,
    ) {
        let recent = &values[..window];
        let mut rotated = recent.to_vec();
        rotated.rotate_left(rotation % window);

        let mut a = median(window);
        let mut b = median(window);
        let mut ya = 0.0;
        let mut yb = 0.0;
        for (&x, &y) in recent.iter().zip(rotated.iter()) {
            ya = a.process(x);
            yb = b.process(y);
        }
        prop_assert_eq!(ya, yb);
    }

    #[test]
    fn median_matches_sorted_window(
        window in 1usize..9,
        values in prop::collection::vec(-100.0f64..100.0, 9..40),
    ) {
        let mut m = median(window);
        let mut y = 0.0;
        for &x in &values {
            y = m.process(x);
        }
        let mut last: Vec<f64> = values[values.len() - window..].to_vec();
        last.sort_by(f64::total_cmp);
        let expected = if window % 2 == 1 {
            last[window / 2]
        } else {
            (last[window / 2 - 1] + last[window / 2]) / 2.0
        };
        prop_assert_eq!(y, expected);
    }

    #[test]
    fn median_stays_within_window_bounds(values in prop::collection::vec(-100.0f64..100.0, 5..40)) {
        let mut m = median(5);
        for (i, &x) in values.iter().enumerate() {
            let y = m.process(x);
            if i >= 4 {
                let window = &values[i - 4..=i];
                let lo = window.iter().copied().fold(f64::MAX, f64::min);
                let hi = window.iter().copied().fold(f64::MIN, f64::max);
                prop_assert!(y >= lo && y <= hi);
            }
        }
    }
}
