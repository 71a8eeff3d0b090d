//! Raspberry Pi peripherals via `rppal`.
//!
//! - Button: GPIO input with internal pull-up, pressed pulls the line low.
//! - Indicator: three GPIO outputs for a common-anode (active low) or
//!   common-cathode RGB LED.
//! - Actuator: hardware PWM channel at the servo frame period.
//! - Knob: MCP3008 10-bit ADC over SPI, wiper ratiometric to VREF.

use std::time::Duration;

use drill_traits::{Actuator, Button, ButtonLevel, Indicator, IndicatorColor, Knob};
use rppal::gpio::{Gpio, InputPin, Level, OutputPin};
use rppal::pwm::{Channel, Polarity, Pwm};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::trace;

use crate::error::{HwError, Result};

const MCP3008_CLOCK_HZ: u32 = 1_000_000;
const MCP3008_FULL_SCALE: f32 = 1023.0;

/// Handle to the GPIO peripheral, shared by the button and LED pins.
pub fn open_gpio() -> Result<Gpio> {
    Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))
}

pub struct GpioButton {
    pin: InputPin,
}

impl GpioButton {
    pub fn new(gpio: &Gpio, pin: u8) -> Result<Self> {
        let pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open button pin {pin}: {e}")))?
            .into_input_pullup();
        Ok(Self { pin })
    }
}

impl Button for GpioButton {
    fn level(&mut self) -> std::result::Result<ButtonLevel, Box<dyn std::error::Error + Send + Sync>> {
        Ok(if self.pin.is_low() {
            ButtonLevel::Pressed
        } else {
            ButtonLevel::Released
        })
    }
}

pub struct RgbLed {
    red: OutputPin,
    green: OutputPin,
    blue: OutputPin,
    active_low: bool,
}

impl RgbLed {
    pub fn new(gpio: &Gpio, red: u8, green: u8, blue: u8, active_low: bool) -> Result<Self> {
        let open = |pin: u8| -> Result<OutputPin> {
            Ok(gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(format!("open led pin {pin}: {e}")))?
                .into_output())
        };
        let mut led = Self {
            red: open(red)?,
            green: open(green)?,
            blue: open(blue)?,
            active_low,
        };
        led.write(IndicatorColor::Black);
        Ok(led)
    }

    fn level(&self, lit: bool) -> Level {
        if lit == self.active_low {
            Level::Low
        } else {
            Level::High
        }
    }

    fn write(&mut self, color: IndicatorColor) {
        let (r, g, b) = (
            self.level(color.red()),
            self.level(color.green()),
            self.level(color.blue()),
        );
        self.red.write(r);
        self.green.write(g);
        self.blue.write(b);
    }
}

impl Indicator for RgbLed {
    fn show(
        &mut self,
        color: IndicatorColor,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(color);
        Ok(())
    }
}

pub struct PwmServo {
    pwm: Pwm,
}

impl PwmServo {
    pub fn new(channel: u8, period_ms: f32) -> Result<Self> {
        let channel = match channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            other => return Err(HwError::InvalidChannel(format!("pwm channel {other}"))),
        };
        let period = Duration::from_secs_f32(period_ms / 1000.0);
        let pwm = Pwm::with_period(channel, period, Duration::ZERO, Polarity::Normal, true)
            .map_err(|e| HwError::Pwm(format!("open pwm: {e}")))?;
        Ok(Self { pwm })
    }
}

impl Actuator for PwmServo {
    fn set_duty(
        &mut self,
        duty: f32,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pwm
            .set_duty_cycle(f64::from(duty.clamp(0.0, 1.0)))
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        Ok(())
    }
}

pub struct Mcp3008Knob {
    spi: Spi,
    channel: u8,
}

impl Mcp3008Knob {
    pub fn new(bus: u8, slave_select: u8, channel: u8) -> Result<Self> {
        if channel > 7 {
            return Err(HwError::InvalidChannel(format!("mcp3008 channel {channel}")));
        }
        let bus = match bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            other => return Err(HwError::InvalidChannel(format!("spi bus {other}"))),
        };
        let ss = match slave_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => return Err(HwError::InvalidChannel(format!("spi slave select {other}"))),
        };
        let spi = Spi::new(bus, ss, MCP3008_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(format!("open spi: {e}")))?;
        Ok(Self { spi, channel })
    }
}

impl Knob for Mcp3008Knob {
    fn read(&mut self) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        // Start bit, single-ended mode + channel, then clock out 10 bits
        let tx = [0x01, (0x08 | self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        trace!(raw, channel = self.channel, "mcp3008 sample");
        Ok(f32::from(raw) / MCP3008_FULL_SCALE)
    }
}
