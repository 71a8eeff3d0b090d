//! Position Mapper: knob reading → calibrated position → servo duty.
//!
//! Three spaces share the unit interval:
//! - knob: the raw ratiometric sample,
//! - position: absolute servo travel, 0.0 fully clockwise, 1.0 fully CCW,
//! - duty: the PWM fraction the servo actually receives (`ServoCfg`).
//!
//! Calibration bounds are an affine map from knob space into position space.

use drill_traits::{Actuator, Knob};
use tracing::{debug, info};

use crate::config::ServoCfg;
use crate::error::Result;
use crate::hw_error::hw_report;

/// Calibrated travel endpoints in position space.
///
/// `maximum >= minimum` is expected but not enforced; inverted bounds
/// simply reverse the knob direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationBounds {
    pub minimum: f32,
    pub maximum: f32,
}

impl Default for CalibrationBounds {
    fn default() -> Self {
        Self::FULL_RANGE
    }
}

impl CalibrationBounds {
    pub const FULL_RANGE: Self = Self {
        minimum: 0.0,
        maximum: 1.0,
    };

    pub const fn new(minimum: f32, maximum: f32) -> Self {
        Self { minimum, maximum }
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.maximum - self.minimum
    }

    /// `pu * (maximum - minimum) + minimum`, unclamped.
    #[inline]
    pub fn position_from_normalized(&self, pu: f32) -> f32 {
        position_from_normalized(pu, *self)
    }

    /// Inverse of `position_from_normalized`; `None` for a zero span.
    #[inline]
    pub fn normalized_from_position(&self, position: f32) -> Option<f32> {
        let span = self.span();
        if span == 0.0 {
            return None;
        }
        Some((position - self.minimum) / span)
    }
}

/// Map a normalized knob value into the calibrated sub-range.
///
/// No clamping: inverted bounds may produce results outside [0, 1].
#[inline]
pub fn position_from_normalized(pu: f32, bounds: CalibrationBounds) -> f32 {
    pu * (bounds.maximum - bounds.minimum) + bounds.minimum
}

/// Tracks calibration, the last commanded position and the last knob
/// sample. Devices are passed in per call so the controller keeps sole
/// ownership of its peripherals.
#[derive(Debug, Clone)]
pub struct PositionMapper {
    servo: ServoCfg,
    bounds: CalibrationBounds,
    position: f32,
    duty: f32,
    last_knob: Option<f32>,
}

impl PositionMapper {
    pub fn new(servo: ServoCfg) -> Self {
        Self {
            servo,
            bounds: CalibrationBounds::FULL_RANGE,
            position: 0.0,
            duty: servo.pu_to_duty(0.0),
            last_knob: None,
        }
    }

    pub fn servo(&self) -> &ServoCfg {
        &self.servo
    }

    pub fn bounds(&self) -> CalibrationBounds {
        self.bounds
    }

    /// Last duty written to the actuator.
    pub fn duty(&self) -> f32 {
        self.duty
    }

    /// Absolute position the servo was last driven to, recovered from the
    /// written duty.
    pub fn actuator_position(&self) -> f32 {
        self.servo.duty_to_pu(self.duty)
    }

    /// Last knob value seen by `drive_from_knob_if_changed`.
    pub fn last_knob(&self) -> Option<f32> {
        self.last_knob
    }

    /// Back to the full travel range.
    pub fn reset(&mut self) {
        self.bounds = CalibrationBounds::FULL_RANGE;
        self.log_state();
    }

    pub fn set_bounds(&mut self, bounds: CalibrationBounds) {
        self.bounds = bounds;
        self.log_state();
    }

    fn log_state(&self) {
        info!(
            position = self.position,
            minimum = self.bounds.minimum,
            maximum = self.bounds.maximum,
            "calibration bounds"
        );
    }

    /// Write an absolute position to the actuator through the fixed servo
    /// window. Logs only when the position differs from the last one.
    pub fn command_actuator<A: Actuator + ?Sized>(
        &mut self,
        actuator: &mut A,
        position: f32,
    ) -> Result<()> {
        let duty = self.servo.pu_to_duty(position);
        actuator
            .set_duty(duty)
            .map_err(|e| hw_report(e, "driving actuator"))?;
        self.duty = duty;
        if position != self.position {
            info!(previous = self.position, position, duty, "actuator");
            self.position = position;
        }
        Ok(())
    }

    /// Drive to a normalized value mapped through the current bounds.
    pub fn position_servo<A: Actuator + ?Sized>(&mut self, actuator: &mut A, pu: f32) -> Result<()> {
        let position = self.bounds.position_from_normalized(pu);
        self.command_actuator(actuator, position)
    }

    pub fn read_knob<K: Knob + ?Sized>(&mut self, knob: &mut K) -> Result<f32> {
        knob.read().map_err(|e| hw_report(e, "reading knob"))
    }

    /// Read the knob and drive through the bounds unconditionally, recording
    /// the sample as the last one seen.
    pub fn drive_from_knob<K, A>(&mut self, knob: &mut K, actuator: &mut A) -> Result<()>
    where
        K: Knob + ?Sized,
        A: Actuator + ?Sized,
    {
        let pu = self.read_knob(knob)?;
        self.last_knob = Some(pu);
        self.position_servo(actuator, pu)
    }

    /// Read the knob and drive only when the sample differs exactly from the
    /// previous one. Returns whether the actuator was written.
    ///
    /// Exact comparison: ADC jitter of a single count re-commands the servo.
    pub fn drive_from_knob_if_changed<K, A>(&mut self, knob: &mut K, actuator: &mut A) -> Result<bool>
    where
        K: Knob + ?Sized,
        A: Actuator + ?Sized,
    {
        let pu = self.read_knob(knob)?;
        if self.last_knob == Some(pu) {
            return Ok(false);
        }
        debug!(knob = pu, previous = ?self.last_knob, "knob moved");
        self.last_knob = Some(pu);
        self.position_servo(actuator, pu)?;
        Ok(true)
    }
}
