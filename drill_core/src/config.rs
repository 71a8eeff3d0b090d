//! Runtime configuration for the controller.
//!
//! These are the structs the core works with. They are separate from the
//! TOML-deserialized config in `drill_config`; see `conversions`.

/// Fixed linear map between a normalized position and the servo PWM duty.
///
/// Configured once at startup; independent of calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoCfg {
    /// Duty at position 0.0 (fully clockwise unless reversed).
    pub duty_min: f32,
    /// Duty at position 1.0.
    pub duty_max: f32,
    /// Mirror the travel direction.
    pub reverse_motion: bool,
}

impl Default for ServoCfg {
    fn default() -> Self {
        Self {
            duty_min: 0.5 / 20.0,
            duty_max: 1.7 / 20.0,
            reverse_motion: false,
        }
    }
}

impl ServoCfg {
    #[inline]
    pub fn duty_span(&self) -> f32 {
        self.duty_max - self.duty_min
    }

    /// Duty fraction for a normalized position.
    #[inline]
    pub fn pu_to_duty(&self, pu: f32) -> f32 {
        let pu = if self.reverse_motion { 1.0 - pu } else { pu };
        pu * self.duty_span() + self.duty_min
    }

    /// Normalized position for a duty fraction; inverse of `pu_to_duty`.
    #[inline]
    pub fn duty_to_pu(&self, duty: f32) -> f32 {
        let pu = (duty - self.duty_min) / self.duty_span();
        if self.reverse_motion { 1.0 - pu } else { pu }
    }
}

/// Button debounce and press classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonCfg {
    /// Edges within this many ms of the last accepted edge are dropped.
    pub debounce_ms: u64,
    /// Held strictly longer than this is a long press.
    pub long_press_ms: u64,
}

impl Default for ButtonCfg {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            long_press_ms: 1000,
        }
    }
}

/// State machine and scheduler timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlCfg {
    /// Period of the POLL event.
    pub poll_period_ms: u64,
    /// Knob must read below this to confirm the opening and minimum points.
    pub gate_threshold: f32,
    /// How long the indicator shows red after a rejected confirmation.
    pub error_flash_ms: u64,
    /// Host sleep between scheduler iterations.
    pub loop_interval_ms: u64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            poll_period_ms: 100,
            gate_threshold: 0.1,
            error_flash_ms: 400,
            loop_interval_ms: 1,
        }
    }
}
