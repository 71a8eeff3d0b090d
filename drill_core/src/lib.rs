#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Servo drill controller core (hardware-agnostic).
//!
//! A single knob, one pushbutton and a tri-color LED drive a servo that
//! pulls a drill trigger. All hardware goes through the `drill_traits`
//! capability traits.
//!
//! ## Architecture
//!
//! - **Position Mapper**: knob → calibrated position → servo duty (`mapper`)
//! - **Debouncer**: raw button level → short/long press (`debounce`)
//! - **State machine**: two-point calibration, operation and pause (`controller`)
//! - **Scheduler**: timer check, button sample, fixed-period poll (`runner`)
//! - **Configuration**: runtime config structs (`config`)

pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod debounce;
pub mod error;
pub mod hw_error;
pub mod mapper;
pub mod runner;
pub mod status;

pub use builder::{ControllerBuilder, DrillController, build_controller};
pub use config::{ButtonCfg, ControlCfg, ServoCfg};
pub use controller::{Controller, Peripherals};
pub use debounce::{ButtonEvent, Debouncer, PressClass};
pub use error::{BuildError, DrillError};
pub use mapper::{CalibrationBounds, PositionMapper, position_from_normalized};
pub use runner::Scheduler;
pub use status::{ControllerSnapshot, ControllerState, Event};
