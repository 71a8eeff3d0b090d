//! Builder for the boxed `DrillController` and generic `build_controller`.

use std::sync::Arc;

use drill_traits::clock::{Clock, MonotonicClock};
use drill_traits::{Actuator, Button, Indicator, Knob};

use crate::config::{ButtonCfg, ControlCfg, ServoCfg};
use crate::controller::{Controller, Peripherals};
use crate::debounce::Debouncer;
use crate::error::{BuildError, Result};
use crate::mapper::PositionMapper;

/// Controller over boxed peripherals, for backends chosen at runtime.
pub type DrillController =
    Controller<Box<dyn Knob>, Box<dyn Button>, Box<dyn Indicator>, Box<dyn Actuator>>;

impl DrillController {
    /// Start building a controller.
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::default()
    }
}

/// Builder for `DrillController`. All fields are validated on `build()`.
#[derive(Default)]
pub struct ControllerBuilder {
    knob: Option<Box<dyn Knob>>,
    button: Option<Box<dyn Button>>,
    indicator: Option<Box<dyn Indicator>>,
    actuator: Option<Box<dyn Actuator>>,
    servo: Option<ServoCfg>,
    button_cfg: Option<ButtonCfg>,
    control: Option<ControlCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl ControllerBuilder {
    pub fn with_knob(mut self, knob: impl Knob + 'static) -> Self {
        self.knob = Some(Box::new(knob));
        self
    }

    pub fn with_button(mut self, button: impl Button + 'static) -> Self {
        self.button = Some(Box::new(button));
        self
    }

    pub fn with_indicator(mut self, indicator: impl Indicator + 'static) -> Self {
        self.indicator = Some(Box::new(indicator));
        self
    }

    pub fn with_actuator(mut self, actuator: impl Actuator + 'static) -> Self {
        self.actuator = Some(Box::new(actuator));
        self
    }

    pub fn with_servo(mut self, servo: ServoCfg) -> Self {
        self.servo = Some(servo);
        self
    }

    pub fn with_button_cfg(mut self, cfg: ButtonCfg) -> Self {
        self.button_cfg = Some(cfg);
        self
    }

    pub fn with_control(mut self, control: ControlCfg) -> Self {
        self.control = Some(control);
        self
    }

    /// Inject a custom clock (tests, simulator). Defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Apply the servo, button and control sections of a parsed config.
    pub fn apply_config(self, cfg: &drill_config::Config) -> Self {
        self.with_servo((&cfg.servo).into())
            .with_button_cfg((&cfg.button).into())
            .with_control((&cfg.control).into())
    }

    pub fn build(self) -> Result<DrillController> {
        let knob = self
            .knob
            .ok_or_else(|| eyre::Report::new(BuildError::MissingKnob))?;
        let button = self
            .button
            .ok_or_else(|| eyre::Report::new(BuildError::MissingButton))?;
        let indicator = self
            .indicator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingIndicator))?;
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        build_with_clock(
            Peripherals {
                knob,
                button,
                indicator,
                actuator,
            },
            self.servo.unwrap_or_default(),
            self.button_cfg.unwrap_or_default(),
            self.control.unwrap_or_default(),
            clock,
        )
    }
}

fn validate(servo: &ServoCfg, button: &ButtonCfg, control: &ControlCfg) -> Result<()> {
    let invalid = |msg: &'static str| Err(eyre::Report::new(BuildError::InvalidConfig(msg)));
    if !(servo.duty_min.is_finite() && servo.duty_max.is_finite()) {
        return invalid("servo duty must be finite");
    }
    if servo.duty_min == servo.duty_max {
        return invalid("servo duty_min and duty_max must differ");
    }
    if button.debounce_ms == 0 {
        return invalid("debounce_ms must be >= 1");
    }
    if button.long_press_ms <= button.debounce_ms {
        return invalid("long_press_ms must exceed debounce_ms");
    }
    if control.poll_period_ms == 0 {
        return invalid("poll_period_ms must be >= 1");
    }
    if !(control.gate_threshold > 0.0 && control.gate_threshold <= 1.0) {
        return invalid("gate_threshold must be in (0.0, 1.0]");
    }
    Ok(())
}

fn build_with_clock<K, B, I, A>(
    io: Peripherals<K, B, I, A>,
    servo: ServoCfg,
    button: ButtonCfg,
    control: ControlCfg,
    clock: Arc<dyn Clock + Send + Sync>,
) -> Result<Controller<K, B, I, A>>
where
    K: Knob,
    B: Button,
    I: Indicator,
    A: Actuator,
{
    validate(&servo, &button, &control)?;
    Ok(Controller::from_parts(
        io,
        PositionMapper::new(servo),
        Debouncer::new(button),
        control,
        clock,
    ))
}

/// Build a statically dispatched controller.
pub fn build_controller<K, B, I, A>(
    io: Peripherals<K, B, I, A>,
    servo: ServoCfg,
    button: ButtonCfg,
    control: ControlCfg,
    clock: impl Clock + Send + Sync + 'static,
) -> Result<Controller<K, B, I, A>>
where
    K: Knob,
    B: Button,
    I: Indicator,
    A: Actuator,
{
    build_with_clock(io, servo, button, control, Arc::new(clock))
}
