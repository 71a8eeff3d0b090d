use std::error::Error;

use drill_core::{
    ButtonCfg, ControlCfg, DrillError, Event, Peripherals, Scheduler, ServoCfg, build_controller,
};
use drill_hardware::error::HwError;
use drill_hardware::{SimulatedActuator, SimulatedButton, SimulatedIndicator};
use drill_traits::{Actuator, ButtonLevel, Knob, clock::manual::ManualClock};

struct FailingKnob;

impl Knob for FailingKnob {
    fn read(&mut self) -> Result<f32, Box<dyn Error + Send + Sync>> {
        Err("adc offline".into())
    }
}

struct FaultyKnob;

impl Knob for FaultyKnob {
    fn read(&mut self) -> Result<f32, Box<dyn Error + Send + Sync>> {
        Err(Box::new(HwError::Spi("transfer failed".into())))
    }
}

struct StuckServo;

impl Actuator for StuckServo {
    fn set_duty(&mut self, _duty: f32) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err(Box::new(HwError::Pwm("enable failed".into())))
    }
}

fn with_knob<K: Knob>(
    knob: K,
) -> drill_core::Controller<K, SimulatedButton, SimulatedIndicator, SimulatedActuator> {
    build_controller(
        Peripherals {
            knob,
            button: SimulatedButton::new(),
            indicator: SimulatedIndicator::new(),
            actuator: SimulatedActuator::new(),
        },
        ServoCfg::default(),
        ButtonCfg::default(),
        ControlCfg::default(),
        ManualClock::new(),
    )
    .unwrap()
}

#[test]
fn knob_failure_surfaces_as_hardware_error_with_context() {
    let mut ctl = with_knob(FailingKnob);
    ctl.initialize().unwrap();
    let err = ctl.dispatch(Event::ShortPress).unwrap_err();
    assert_eq!(err.to_string(), "reading knob");
    match err.downcast_ref::<DrillError>() {
        Some(DrillError::Hardware(msg)) => assert_eq!(msg, "adc offline"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn hw_errors_are_reported_as_faults() {
    let mut ctl = with_knob(FaultyKnob);
    ctl.initialize().unwrap();
    let err = ctl.dispatch(Event::ShortPress).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DrillError>(),
        Some(DrillError::HardwareFault(_))
    ));
}

#[test]
fn actuator_failure_stops_initialization() {
    let mut ctl = build_controller(
        Peripherals {
            knob: drill_hardware::SimulatedKnob::new(),
            button: SimulatedButton::new(),
            indicator: SimulatedIndicator::new(),
            actuator: StuckServo,
        },
        ServoCfg::default(),
        ButtonCfg::default(),
        ControlCfg::default(),
        ManualClock::new(),
    )
    .unwrap();
    let err = ctl.initialize().unwrap_err();
    assert!(format!("{err:#}").contains("driving actuator"));
    assert!(format!("{err:#}").contains("enable failed"));
}

#[test]
fn scheduler_propagates_first_error() {
    let mut sched = Scheduler::new(with_knob(FailingKnob));
    // Polls in Opening never read the knob, so the loop runs fine
    sched.step().unwrap();
    sched.controller_mut().peripherals_mut().button.set_level(ButtonLevel::Pressed);
    sched.run_for(20, |_| {}).unwrap();
    sched.controller_mut().peripherals_mut().button.release();
    let err = sched.run_for(50, |_| {}).unwrap_err();
    assert!(err.downcast_ref::<DrillError>().is_some());
}
