//! Controller state, events and the diagnostic snapshot.

use std::fmt;

use drill_traits::IndicatorColor;

use crate::debounce::PressClass;
use crate::mapper::CalibrationBounds;

/// The six controller states. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerState {
    /// Initial: waiting for the knob to be turned down to start calibration.
    Opening,
    /// Knob drives the servo directly; short press captures the minimum.
    SettingMinimum,
    /// Knob drives the servo directly; short press captures the maximum.
    SettingMaximum,
    /// Servo parked at the captured minimum until the knob is turned down.
    DrivingToMinimum,
    /// Knob drives the servo within the calibrated range.
    Operational,
    /// Servo held at the calibrated minimum.
    Paused,
}

impl ControllerState {
    pub const ALL: [ControllerState; 6] = [
        Self::Opening,
        Self::SettingMinimum,
        Self::SettingMaximum,
        Self::DrivingToMinimum,
        Self::Operational,
        Self::Paused,
    ];

    /// Indicator color shown while this state is active.
    pub const fn color(self) -> IndicatorColor {
        match self {
            Self::Opening => IndicatorColor::Blue,
            Self::SettingMinimum => IndicatorColor::Red,
            Self::SettingMaximum => IndicatorColor::Yellow,
            Self::DrivingToMinimum => IndicatorColor::Green,
            Self::Operational => IndicatorColor::Magenta,
            Self::Paused => IndicatorColor::White,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::SettingMinimum => "setting_minimum",
            Self::SettingMaximum => "setting_maximum",
            Self::DrivingToMinimum => "driving_to_minimum",
            Self::Operational => "operational",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Events dispatched into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Fixed-period re-sample of continuous inputs.
    Poll,
    ShortPress,
    LongPress,
    /// The per-state timer elapsed.
    Timer,
}

impl From<PressClass> for Event {
    fn from(class: PressClass) -> Self {
        match class {
            PressClass::Short => Self::ShortPress,
            PressClass::Long => Self::LongPress,
        }
    }
}

/// Point-in-time view of the controller for logs and the CLI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSnapshot {
    pub state: ControllerState,
    /// Color currently lit, including an active error flash.
    pub indicator: IndicatorColor,
    pub flashing: bool,
    pub bounds: CalibrationBounds,
    /// Absolute servo position last commanded.
    pub position: f32,
    pub duty: f32,
    pub minimum_capture: f32,
    pub maximum_capture: f32,
    pub uptime_ms: u64,
}
