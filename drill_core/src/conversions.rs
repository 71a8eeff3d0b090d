//! `From` implementations bridging `drill_config` types to `drill_core` types.

use crate::config::{ButtonCfg, ControlCfg, ServoCfg};

// ── ServoCfg ─────────────────────────────────────────────────────────────────

impl From<&drill_config::Servo> for ServoCfg {
    fn from(c: &drill_config::Servo) -> Self {
        Self {
            duty_min: c.duty_min,
            duty_max: c.duty_max,
            reverse_motion: c.reverse_motion,
        }
    }
}

// ── ButtonCfg ────────────────────────────────────────────────────────────────

impl From<&drill_config::ButtonCfg> for ButtonCfg {
    fn from(c: &drill_config::ButtonCfg) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
            long_press_ms: c.long_press_ms,
        }
    }
}

// ── ControlCfg ───────────────────────────────────────────────────────────────

impl From<&drill_config::ControlCfg> for ControlCfg {
    fn from(c: &drill_config::ControlCfg) -> Self {
        Self {
            poll_period_ms: c.poll_period_ms,
            gate_threshold: c.gate_threshold,
            error_flash_ms: c.error_flash_ms,
            loop_interval_ms: c.loop_interval_ms,
        }
    }
}
