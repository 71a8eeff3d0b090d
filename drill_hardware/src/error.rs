use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("pwm error: {0}")]
    Pwm(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("invalid channel: {0}")]
    InvalidChannel(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
