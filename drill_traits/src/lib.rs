pub mod clock;
pub mod color;

pub use clock::{Clock, MonotonicClock};
pub use color::IndicatorColor;

/// Raw electrical level of the pushbutton line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLevel {
    Pressed,
    Released,
}

/// Ratiometric potentiometer sampled as a fraction of full scale.
pub trait Knob {
    fn read(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;
}

pub trait Button {
    fn level(&mut self) -> Result<ButtonLevel, Box<dyn std::error::Error + Send + Sync>>;
}

/// Tri-color status light.
pub trait Indicator {
    fn show(&mut self, color: IndicatorColor)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Servo drive signal, written as a PWM duty fraction of the period.
pub trait Actuator {
    fn set_duty(&mut self, duty: f32) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Knob + ?Sized> Knob for Box<T> {
    fn read(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read()
    }
}

impl<T: Button + ?Sized> Button for Box<T> {
    fn level(&mut self) -> Result<ButtonLevel, Box<dyn std::error::Error + Send + Sync>> {
        (**self).level()
    }
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn show(
        &mut self,
        color: IndicatorColor,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).show(color)
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn set_duty(&mut self, duty: f32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_duty(duty)
    }
}
