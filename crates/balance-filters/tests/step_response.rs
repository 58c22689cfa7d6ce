//! End-to-end step response of the CoP low-pass filter.
//!
//! 2nd-order Butterworth at 0.4615 Hz sampled at 20 Hz, fed 0 for ten ticks
//! then 1 forever.
//!
//! Documented behavior for this design:
//! - ticks 0 and 1 are passed through unchanged
//! - overshoot peaks near 4.4% and stays below 5%
//! - output is within 2e-2 of the step from tick 60 and within 1e-3 from tick 90

use balance_filters::prelude::*;

const CUTOFF_HZ: f64 = 0.4615;
const SAMPLE_HZ: f64 = 20.0;

fn step_output(ticks: usize) -> Vec<f64> {
    let mut filter = match CascadeFilter::butterworth(CUTOFF_HZ, SAMPLE_HZ, 2, PassType::LowPass)
    {
        Ok(f) => f,
        Err(e) => panic!("filter construction failed: {e}"),
    };
    (0..ticks)
        .map(|t| filter.process(if t < 10 { 0.0 } else { 1.0 }))
        .collect()
}

#[test]
fn step_cold_start_is_identity() {
    let mut filter = match CascadeFilter::butterworth(CUTOFF_HZ, SAMPLE_HZ, 2, PassType::LowPass)
    {
        Ok(f) => f,
        Err(e) => panic!("filter construction failed: {e}"),
    };
    assert_eq!(filter.warm_up_len(), 2);
    assert_eq!(filter.process(0.25), 0.25);
    assert_eq!(filter.process(0.75), 0.75);
    let third = filter.process(0.75);
    assert!(third != 0.75);
}

#[test]
fn step_first_filtered_sample_is_a0() {
    let out = step_output(11);
    assert!(out[..10].iter().all(|&y| y == 0.0));
    // a[0] of the section
    assert!((out[10] - 0.004_759_675).abs() < 1e-8);
}

#[test]
fn step_overshoot_is_bounded() {
    let out = step_output(200);
    let peak = out.iter().copied().fold(f64::MIN, f64::max);
    assert!(peak > 1.04, "peak {peak}");
    assert!(peak < 1.05, "peak {peak}");
}

#[test]
fn step_settles() {
    let out = step_output(200);
    for (t, y) in out.iter().enumerate().skip(60) {
        assert!((y - 1.0).abs() < 2e-2, "tick {t}: {y}");
    }
    for (t, y) in out.iter().enumerate().skip(90) {
        assert!((y - 1.0).abs() < 1e-3, "tick {t}: {y}");
    }
}

#[test]
fn step_rises_monotonically_until_peak() {
    let out = step_output(60);
    for t in 11..38 {
        assert!(out[t] > out[t - 1], "tick {t}");
    }
}

#[test]
fn highpass_rejects_constant() {
    let mut filter = match CascadeFilter::butterworth(CUTOFF_HZ, SAMPLE_HZ, 2, PassType::HighPass)
    {
        Ok(f) => f,
        Err(e) => panic!("filter construction failed: {e}"),
    };
    let mut y = 0.0;
    for _ in 0..200 {
        y = filter.process(1.0);
    }
    assert!(y.abs() < 1e-6, "{y}");
}
