use drill_core::{ButtonCfg, CalibrationBounds, Debouncer, PressClass, ServoCfg};
use drill_traits::ButtonLevel;
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalized_round_trips_through_bounds(
        min in 0.0f32..1.0,
        max in 0.0f32..1.0,
        pu in 0.0f32..=1.0,
    ) {
        prop_assume!((max - min).abs() > 1e-3);
        let b = CalibrationBounds::new(min, max);
        let back = b.normalized_from_position(b.position_from_normalized(pu)).unwrap();
        prop_assert!((back - pu).abs() < 1e-3, "pu {pu} came back as {back}");
    }

    #[test]
    fn ordered_bounds_keep_position_inside(
        a in 0.0f32..=1.0,
        b in 0.0f32..=1.0,
        pu in 0.0f32..=1.0,
    ) {
        let bounds = CalibrationBounds::new(a.min(b), a.max(b));
        let pos = bounds.position_from_normalized(pu);
        prop_assert!(pos >= bounds.minimum - 1e-6 && pos <= bounds.maximum + 1e-6);
    }

    #[test]
    fn duty_stays_in_servo_window(pu in 0.0f32..=1.0, reverse in any::<bool>()) {
        let servo = ServoCfg { reverse_motion: reverse, ..ServoCfg::default() };
        let duty = servo.pu_to_duty(pu);
        prop_assert!(duty >= servo.duty_min - 1e-6 && duty <= servo.duty_max + 1e-6);
        prop_assert!((servo.duty_to_pu(duty) - pu).abs() < 1e-4);
    }

    #[test]
    fn press_class_follows_threshold(start in 0u64..100_000, held in 10u64..5_000) {
        let cfg = ButtonCfg::default();
        let mut d = Debouncer::new(cfg);
        prop_assert_eq!(d.on_level_sample(ButtonLevel::Pressed, start), None);
        let class = d.on_level_sample(ButtonLevel::Released, start + held);
        let expected = if held > cfg.long_press_ms { PressClass::Long } else { PressClass::Short };
        prop_assert_eq!(class, Some(expected));
    }

    #[test]
    fn edges_inside_debounce_window_are_dropped(gap in 0u64..10) {
        let mut d = Debouncer::new(ButtonCfg::default());
        d.on_level_sample(ButtonLevel::Pressed, 0);
        prop_assert_eq!(d.on_level_sample(ButtonLevel::Released, gap), None);
        prop_assert_eq!(d.down_at_ms(), Some(0));
    }
}
