pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod pi;

use drill_traits::{Actuator, Button, ButtonLevel, Indicator, IndicatorColor, Knob};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Simulated potentiometer. Clones share the same wiper position, so a
/// test or scenario player can keep a handle and turn the knob.
#[derive(Clone, Default)]
pub struct SimulatedKnob {
    value: Rc<Cell<f32>>,
}

impl SimulatedKnob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f32) {
        self.value.set(value);
    }

    pub fn get(&self) -> f32 {
        self.value.get()
    }
}

impl Knob for SimulatedKnob {
    fn read(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.value.get())
    }
}

/// Simulated pushbutton; released until told otherwise.
#[derive(Clone, Default)]
pub struct SimulatedButton {
    pressed: Rc<Cell<bool>>,
}

impl SimulatedButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
    }

    pub fn set_level(&self, level: ButtonLevel) {
        self.pressed.set(level == ButtonLevel::Pressed);
    }
}

impl Button for SimulatedButton {
    fn level(&mut self) -> Result<ButtonLevel, Box<dyn std::error::Error + Send + Sync>> {
        Ok(if self.pressed.get() {
            ButtonLevel::Pressed
        } else {
            ButtonLevel::Released
        })
    }
}

/// Simulated RGB LED that remembers every color it was asked to show.
#[derive(Clone, Default)]
pub struct SimulatedIndicator {
    history: Rc<RefCell<Vec<IndicatorColor>>>,
}

impl SimulatedIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color currently lit (black before the first write).
    pub fn current(&self) -> IndicatorColor {
        self.history.borrow().last().copied().unwrap_or_default()
    }

    pub fn history(&self) -> Vec<IndicatorColor> {
        self.history.borrow().clone()
    }

    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }
}

impl Indicator for SimulatedIndicator {
    fn show(
        &mut self,
        color: IndicatorColor,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::trace!(%color, "indicator (simulated)");
        self.history.borrow_mut().push(color);
        Ok(())
    }
}

/// Simulated servo PWM output that records each duty write.
#[derive(Clone, Default)]
pub struct SimulatedActuator {
    writes: Rc<RefCell<Vec<f32>>>,
}

impl SimulatedActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last duty written, if any.
    pub fn duty(&self) -> Option<f32> {
        self.writes.borrow().last().copied()
    }

    pub fn writes(&self) -> Vec<f32> {
        self.writes.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }
}

impl Actuator for SimulatedActuator {
    fn set_duty(&mut self, duty: f32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::trace!(duty, "servo duty (simulated)");
        self.writes.borrow_mut().push(duty);
        Ok(())
    }
}
