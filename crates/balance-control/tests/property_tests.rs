//! Property tests for controller output bounds and ramp behavior.

use balance_control::prelude::*;
use balance_test_helpers::must;
use proptest::prelude::*;

proptest! {
    #[test]
    fn output_is_clamped_to_channel_max(
        cop in prop::array::uniform2(-200.0f64..200.0),
        target in prop::array::uniform2(-200.0f64..200.0),
        maxima in prop::array::uniform4(0.0f64..99.0),
        ticks in 1usize..20,
    ) {
        let config = ControllerConfig {
            max_amplitude: maxima,
            ramp_duration_s: 0.0,
            ..ControllerConfig::default()
        };
        let mut controller = must(StimulationController::new(&config));
        let session = SessionState::new(CopPoint::new(target[0], target[1]));
        for i in 0..ticks {
            let wobble = if i % 2 == 0 { 1.0 } else { -1.0 };
            let frame = controller.step(CopPoint::new(cop[0], cop[1] + wobble), &session);
            for (out, max) in frame.output.iter().zip(maxima) {
                prop_assert!(*out >= 0.0);
                prop_assert!(*out <= max);
            }
        }
    }

    #[test]
    fn ramp_is_monotonic_between_target_changes(
        duration_s in 0.0f64..2.0,
        events in prop::collection::vec(any::<bool>(), 1..300),
    ) {
        let config = ControllerConfig {
            ramp_duration_s: duration_s,
            tick_hz: 100.0,
            ..ControllerConfig::default()
        };
        let mut controller = must(StimulationController::new(&config));
        let mut session = SessionState::default();
        let mut previous = 0.0;
        for change in events {
            if change {
                session.set_target(CopPoint::new(0.0, 3.0));
                previous = 0.0;
            }
            let frame = controller.step(CopPoint::new(0.0, 1.0), &session);
            prop_assert!(frame.ramp_fraction >= previous);
            prop_assert!(frame.ramp_fraction <= 1.0);
            previous = frame.ramp_fraction;
        }
    }

    #[test]
    fn ramp_generator_reaches_exactly_one(duration_s in 0.0f64..5.0, tick_hz in 1.0f64..500.0) {
        let mut ramp = RampGenerator::new(duration_s, tick_hz);
        let total = ramp.total_ticks();
        let mut last = ramp.fraction();
        for _ in 0..total {
            let next = ramp.advance();
            prop_assert!(next >= last);
            last = next;
        }
        prop_assert_eq!(last, 1.0);
        prop_assert_eq!(ramp.advance(), 1.0);
    }
}
