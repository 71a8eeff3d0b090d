use drill_hardware::error::HwError;
use drill_hardware::{SimulatedButton, SimulatedIndicator};
use drill_traits::{Button, ButtonLevel, Indicator, IndicatorColor};
use rstest::rstest;

#[rstest]
#[case(ButtonLevel::Pressed)]
#[case(ButtonLevel::Released)]
fn button_reports_the_level_it_was_set_to(#[case] level: ButtonLevel) {
    let handle = SimulatedButton::new();
    let mut line = handle.clone();
    handle.set_level(level);
    assert_eq!(line.level().unwrap(), level);
}

#[rstest]
#[case(&[IndicatorColor::Blue], IndicatorColor::Blue)]
#[case(&[IndicatorColor::Blue, IndicatorColor::Red, IndicatorColor::Blue], IndicatorColor::Blue)]
#[case(&IndicatorColor::PRIMARIES, IndicatorColor::Blue)]
fn indicator_current_is_last_shown(#[case] shown: &[IndicatorColor], #[case] last: IndicatorColor) {
    let handle = SimulatedIndicator::new();
    let mut led = handle.clone();
    for &c in shown {
        led.show(c).unwrap();
    }
    assert_eq!(handle.current(), last);
    assert_eq!(handle.history(), shown.to_vec());
}

#[rstest]
#[case(HwError::Gpio("pin 17 busy".into()), "gpio error: pin 17 busy")]
#[case(HwError::Spi("transfer".into()), "spi error: transfer")]
#[case(HwError::InvalidChannel("pwm channel 3".into()), "invalid channel: pwm channel 3")]
fn hw_error_messages(#[case] err: HwError, #[case] expected: &str) {
    assert_eq!(err.to_string(), expected);
}
