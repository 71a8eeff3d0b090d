use drill_config::load_toml;
use rstest::rstest;

const PINS: &str = r#"
[pins]
button = 4
led_red = 17
led_green = 27
led_blue = 22
"#;

#[test]
fn minimal_config_uses_defaults() {
    let cfg = load_toml(PINS).expect("parse TOML");
    cfg.validate().expect("defaults should validate");
    assert_eq!(cfg.button.debounce_ms, 10);
    assert_eq!(cfg.button.long_press_ms, 1000);
    assert_eq!(cfg.control.poll_period_ms, 100);
    assert_eq!(cfg.control.error_flash_ms, 400);
    assert!((cfg.control.gate_threshold - 0.1).abs() < 1e-6);
    assert!((cfg.servo.duty_min - 0.025).abs() < 1e-6);
    assert!((cfg.servo.duty_max - 0.085).abs() < 1e-6);
    assert!(!cfg.servo.reverse_motion);
    assert!(cfg.pins.led_active_low);
}

#[test]
fn missing_pins_is_a_parse_error() {
    let toml = r#"
[control]
poll_period_ms = 50
"#;
    assert!(load_toml(toml).is_err());
}

#[rstest]
#[case("[servo]\nduty_min = 0.0", "servo.duty_min must be in")]
#[case("[servo]\nduty_max = 1.5", "servo.duty_max must be in")]
#[case("[servo]\nduty_min = 0.05\nduty_max = 0.05", "must differ")]
#[case("[servo]\npwm_period_ms = 0.0", "pwm_period_ms must be > 0")]
#[case("[button]\ndebounce_ms = 0", "debounce_ms must be >= 1")]
#[case("[button]\ndebounce_ms = 10\nlong_press_ms = 10", "long_press_ms must be greater")]
#[case("[control]\npoll_period_ms = 0", "poll_period_ms must be >= 1")]
#[case("[control]\ngate_threshold = 0.0", "gate_threshold must be in")]
#[case("[control]\nloop_interval_ms = 10", "loop_interval_ms must be below")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation")]
fn rejects_invalid_values(#[case] section: &str, #[case] needle: &str) {
    let toml = format!("{PINS}\n{section}\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn rejects_out_of_range_adc_channel() {
    let toml = r#"
[pins]
button = 4
led_red = 17
led_green = 27
led_blue = 22
adc_channel = 8
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("adc channel 8");
    assert!(format!("{err}").contains("adc_channel"));
}

#[test]
fn accepts_reverse_motion_and_hourly_rotation() {
    let toml = format!(
        "{PINS}\n[servo]\nreverse_motion = true\n\n[logging]\nrotation = \"hourly\"\nfile = \"drill.log\"\n"
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    cfg.validate().expect("valid");
    assert!(cfg.servo.reverse_motion);
    assert_eq!(cfg.logging.file.as_deref(), Some("drill.log"));
}
