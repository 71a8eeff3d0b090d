//! Calibration & operation state machine.
//!
//! One handler per `ControllerState`, each matching on the dispatched
//! `Event`. State changes run the old state's exit action, clear the
//! per-state timer, then run the new state's entry action. The error flash
//! is a timed overlay on the indicator, reverted by `check_timer`, so the
//! loop keeps servicing the button and polls while it is lit.

use std::sync::Arc;
use std::time::Instant;

use drill_traits::clock::Clock;
use drill_traits::{Actuator, Button, Indicator, IndicatorColor, Knob};
use tracing::{debug, info, trace};

use crate::config::ControlCfg;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::hw_error::hw_report;
use crate::mapper::{CalibrationBounds, PositionMapper};
use crate::status::{ControllerSnapshot, ControllerState, Event};

/// The hardware the controller drives, owned as one bundle.
pub struct Peripherals<K, B, I, A> {
    pub knob: K,
    pub button: B,
    pub indicator: I,
    pub actuator: A,
}

pub struct Controller<K, B, I, A> {
    pub(crate) io: Peripherals<K, B, I, A>,
    pub(crate) mapper: PositionMapper,
    pub(crate) debouncer: Debouncer,
    pub(crate) control: ControlCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,

    pub(crate) state: ControllerState,
    pub(crate) initialized: bool,
    /// Color of the active state; what the flash reverts to.
    pub(crate) color: IndicatorColor,
    pub(crate) timer_deadline_ms: Option<u64>,
    pub(crate) flash_until_ms: Option<u64>,
    pub(crate) minimum_capture: f32,
    pub(crate) maximum_capture: f32,
}

impl<K, B, I, A> core::fmt::Debug for Controller<K, B, I, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.state)
            .field("color", &self.color)
            .field("bounds", &self.mapper.bounds())
            .field("flashing", &self.flash_until_ms.is_some())
            .finish()
    }
}

impl<K, B, I, A> Controller<K, B, I, A>
where
    K: Knob,
    B: Button,
    I: Indicator,
    A: Actuator,
{
    pub(crate) fn from_parts(
        io: Peripherals<K, B, I, A>,
        mapper: PositionMapper,
        debouncer: Debouncer,
        control: ControlCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let epoch = clock.now();
        Self {
            io,
            mapper,
            debouncer,
            control,
            clock,
            epoch,
            state: ControllerState::Opening,
            initialized: false,
            color: IndicatorColor::Black,
            timer_deadline_ms: None,
            flash_until_ms: None,
            minimum_capture: 0.0,
            maximum_capture: 1.0,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Color of the active state (ignores a running error flash).
    pub fn state_color(&self) -> IndicatorColor {
        self.color
    }

    /// Color currently lit.
    pub fn indicator(&self) -> IndicatorColor {
        if self.flash_until_ms.is_some() {
            IndicatorColor::Red
        } else {
            self.color
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_until_ms.is_some()
    }

    pub fn bounds(&self) -> CalibrationBounds {
        self.mapper.bounds()
    }

    /// Absolute servo position last commanded.
    pub fn actuator_position(&self) -> f32 {
        self.mapper.actuator_position()
    }

    pub fn control_cfg(&self) -> &ControlCfg {
        &self.control
    }

    pub fn peripherals(&self) -> &Peripherals<K, B, I, A> {
        &self.io
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<K, B, I, A> {
        &mut self.io
    }

    /// Milliseconds since the controller was built.
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.state,
            indicator: self.indicator(),
            flashing: self.is_flashing(),
            bounds: self.mapper.bounds(),
            position: self.mapper.actuator_position(),
            duty: self.mapper.duty(),
            minimum_capture: self.minimum_capture,
            maximum_capture: self.maximum_capture,
            uptime_ms: self.now_ms(),
        }
    }

    // ── Entry points for the scheduler loop ──────────────────────────────────

    /// Run the initial state's entry action. Later calls do nothing.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;
        info!(state = %self.state, "initialized");
        self.enter(self.state)
    }

    /// Revert an expired error flash and fire an expired state timer.
    pub fn check_timer(&mut self) -> Result<()> {
        let now = self.now_ms();
        if let Some(until) = self.flash_until_ms
            && now >= until
        {
            self.flash_until_ms = None;
            trace!(color = %self.color, "error flash over");
            self.write_indicator(self.color)?;
        }
        if let Some(deadline) = self.timer_deadline_ms
            && now >= deadline
        {
            // Cleared first so the handler may re-arm it
            self.timer_deadline_ms = None;
            self.dispatch(Event::Timer)?;
        }
        Ok(())
    }

    /// Sample the button line and dispatch any classified press.
    pub fn poll_button(&mut self) -> Result<()> {
        let level = self
            .io
            .button
            .level()
            .map_err(|e| hw_report(e, "reading button"))?;
        let now = self.now_ms();
        if let Some(class) = self.debouncer.on_level_sample(level, now) {
            self.dispatch(class.into())?;
        }
        Ok(())
    }

    pub fn dispatch_poll(&mut self) -> Result<()> {
        self.dispatch(Event::Poll)
    }

    /// Park the servo at absolute position 0.0 and turn the indicator off.
    /// Calibration is left as is.
    pub fn shutdown(&mut self) -> Result<()> {
        info!(state = %self.state, "shutdown");
        self.flash_until_ms = None;
        self.stop_timer();
        self.mapper.command_actuator(&mut self.io.actuator, 0.0)?;
        self.write_indicator(IndicatorColor::Black)
    }

    // ── State machine core ───────────────────────────────────────────────────

    pub fn dispatch(&mut self, ev: Event) -> Result<()> {
        if ev != Event::Poll {
            debug!(state = %self.state, event = ?ev, "dispatch");
        }
        match self.state {
            ControllerState::Opening => self.on_opening(ev),
            ControllerState::SettingMinimum => self.on_setting_minimum(ev),
            ControllerState::SettingMaximum => self.on_setting_maximum(ev),
            ControllerState::DrivingToMinimum => self.on_driving_to_minimum(ev),
            ControllerState::Operational => self.on_operational(ev),
            ControllerState::Paused => self.on_paused(ev),
        }
    }

    /// Switch states; a change to the current state is ignored.
    pub fn change_state_to(&mut self, next: ControllerState) -> Result<()> {
        if next == self.state {
            return Ok(());
        }
        self.exit(self.state);
        self.stop_timer();
        info!(from = %self.state, to = %next, "state change");
        self.state = next;
        self.enter(next)
    }

    /// Arm the per-state timer `ms` from now. Cleared on state change.
    pub fn set_timer(&mut self, ms: u64) {
        self.timer_deadline_ms = Some(self.now_ms().saturating_add(ms));
    }

    pub fn stop_timer(&mut self) {
        self.timer_deadline_ms = None;
    }

    pub fn timer_pending(&self) -> bool {
        self.timer_deadline_ms.is_some()
    }

    fn enter(&mut self, state: ControllerState) -> Result<()> {
        self.show(state.color())?;
        match state {
            ControllerState::Opening => {
                self.minimum_capture = 0.0;
                self.maximum_capture = 1.0;
                self.mapper.reset();
                self.mapper.position_servo(&mut self.io.actuator, 0.0)
            }
            ControllerState::SettingMinimum => self.mapper.position_servo(&mut self.io.actuator, 0.0),
            ControllerState::SettingMaximum => Ok(()),
            ControllerState::DrivingToMinimum => {
                let min = self.minimum_capture;
                self.mapper.position_servo(&mut self.io.actuator, min)
            }
            ControllerState::Operational => {
                self.mapper.set_bounds(CalibrationBounds::new(
                    self.minimum_capture,
                    self.maximum_capture,
                ));
                Ok(())
            }
            // 0.0 through the bounds is the calibrated minimum
            ControllerState::Paused => self.mapper.position_servo(&mut self.io.actuator, 0.0),
        }
    }

    fn exit(&mut self, state: ControllerState) {
        trace!(%state, "exit");
    }

    // ── Per-state handlers ───────────────────────────────────────────────────

    fn on_opening(&mut self, ev: Event) -> Result<()> {
        match ev {
            Event::ShortPress => {
                if self.knob_in_gate()? {
                    self.change_state_to(ControllerState::SettingMinimum)
                } else {
                    self.error_flash()
                }
            }
            Event::LongPress | Event::Poll | Event::Timer => Ok(()),
        }
    }

    fn on_setting_minimum(&mut self, ev: Event) -> Result<()> {
        match ev {
            Event::Poll => self.track_knob(),
            Event::ShortPress => {
                self.minimum_capture = self.mapper.actuator_position();
                info!(minimum = self.minimum_capture, "minimum captured");
                self.change_state_to(ControllerState::SettingMaximum)
            }
            Event::LongPress => self.change_state_to(ControllerState::Opening),
            Event::Timer => Ok(()),
        }
    }

    fn on_setting_maximum(&mut self, ev: Event) -> Result<()> {
        match ev {
            Event::Poll => self.track_knob(),
            Event::ShortPress => {
                self.maximum_capture = self.mapper.actuator_position();
                info!(maximum = self.maximum_capture, "maximum captured");
                self.change_state_to(ControllerState::DrivingToMinimum)
            }
            Event::LongPress => self.change_state_to(ControllerState::Opening),
            Event::Timer => Ok(()),
        }
    }

    fn on_driving_to_minimum(&mut self, ev: Event) -> Result<()> {
        match ev {
            Event::ShortPress => {
                if self.knob_in_gate()? {
                    self.change_state_to(ControllerState::Operational)
                } else {
                    self.error_flash()
                }
            }
            Event::LongPress => self.change_state_to(ControllerState::Opening),
            Event::Poll | Event::Timer => Ok(()),
        }
    }

    fn on_operational(&mut self, ev: Event) -> Result<()> {
        match ev {
            Event::Poll => self.track_knob(),
            Event::ShortPress => self.change_state_to(ControllerState::Paused),
            Event::LongPress => self.change_state_to(ControllerState::Opening),
            Event::Timer => Ok(()),
        }
    }

    fn on_paused(&mut self, ev: Event) -> Result<()> {
        match ev {
            Event::ShortPress => {
                // Resume where the knob is now, even if it never moved
                self.mapper
                    .drive_from_knob(&mut self.io.knob, &mut self.io.actuator)?;
                self.change_state_to(ControllerState::Operational)
            }
            Event::LongPress => self.change_state_to(ControllerState::Opening),
            Event::Poll | Event::Timer => Ok(()),
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn track_knob(&mut self) -> Result<()> {
        self.mapper
            .drive_from_knob_if_changed(&mut self.io.knob, &mut self.io.actuator)
            .map(|_| ())
    }

    fn knob_in_gate(&mut self) -> Result<bool> {
        let pu = self.mapper.read_knob(&mut self.io.knob)?;
        let ok = pu < self.control.gate_threshold;
        if !ok {
            debug!(knob = pu, gate = self.control.gate_threshold, "knob not turned down");
        }
        Ok(ok)
    }

    /// Set the state color, cancelling any error flash.
    fn show(&mut self, color: IndicatorColor) -> Result<()> {
        self.color = color;
        self.flash_until_ms = None;
        self.write_indicator(color)
    }

    /// Light red for `error_flash_ms`; `check_timer` restores the state color.
    fn error_flash(&mut self) -> Result<()> {
        let until = self.now_ms().saturating_add(self.control.error_flash_ms);
        debug!(until_ms = until, restore = %self.color, "error flash");
        self.flash_until_ms = Some(until);
        self.write_indicator(IndicatorColor::Red)
    }

    fn write_indicator(&mut self, color: IndicatorColor) -> Result<()> {
        self.io
            .indicator
            .show(color)
            .map_err(|e| hw_report(e, "setting indicator"))
    }
}
