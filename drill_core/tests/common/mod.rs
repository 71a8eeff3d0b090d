#![allow(dead_code)]

use drill_core::{
    ButtonCfg, ControlCfg, Controller, ControllerState, Event, Peripherals, ServoCfg,
    build_controller,
};
use drill_hardware::{SimulatedActuator, SimulatedButton, SimulatedIndicator, SimulatedKnob};
use drill_traits::clock::manual::ManualClock;

pub type SimController =
    Controller<SimulatedKnob, SimulatedButton, SimulatedIndicator, SimulatedActuator>;

/// Handles onto the simulated peripherals a controller owns.
#[derive(Clone)]
pub struct Rig {
    pub knob: SimulatedKnob,
    pub button: SimulatedButton,
    pub led: SimulatedIndicator,
    pub servo: SimulatedActuator,
    pub clock: ManualClock,
}

impl Rig {
    pub fn new() -> (Rig, SimController) {
        let rig = Rig {
            knob: SimulatedKnob::new(),
            button: SimulatedButton::new(),
            led: SimulatedIndicator::new(),
            servo: SimulatedActuator::new(),
            clock: ManualClock::new(),
        };
        let ctl = build_controller(
            Peripherals {
                knob: rig.knob.clone(),
                button: rig.button.clone(),
                indicator: rig.led.clone(),
                actuator: rig.servo.clone(),
            },
            ServoCfg::default(),
            ButtonCfg::default(),
            ControlCfg::default(),
            rig.clock.clone(),
        )
        .expect("build controller");
        (rig, ctl)
    }

    /// Controller with the opening entry action already run.
    pub fn initialized() -> (Rig, SimController) {
        let (rig, mut ctl) = Rig::new();
        ctl.initialize().expect("initialize");
        (rig, ctl)
    }

    /// Servo position recovered from the last duty written.
    pub fn servo_position(&self) -> f32 {
        let duty = self.servo.duty().expect("servo written");
        ServoCfg::default().duty_to_pu(duty)
    }
}

pub fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

/// Walk a fresh controller through calibration with the given endpoints
/// and stop in `target`.
pub fn drive_to(rig: &Rig, ctl: &mut SimController, target: ControllerState, min: f32, max: f32) {
    use ControllerState::*;
    let step = |ctl: &mut SimController, ev: Event| ctl.dispatch(ev).expect("dispatch");

    if target == Opening {
        return;
    }
    rig.knob.set(0.05);
    step(ctl, Event::ShortPress);
    if target == SettingMinimum {
        return;
    }
    rig.knob.set(min);
    step(ctl, Event::Poll);
    step(ctl, Event::ShortPress);
    if target == SettingMaximum {
        return;
    }
    rig.knob.set(max);
    step(ctl, Event::Poll);
    step(ctl, Event::ShortPress);
    if target == DrivingToMinimum {
        return;
    }
    rig.knob.set(0.05);
    step(ctl, Event::ShortPress);
    if target == Operational {
        return;
    }
    step(ctl, Event::ShortPress);
    assert_eq!(ctl.state(), Paused);
}
