use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DrillError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing knob")]
    MissingKnob,
    #[error("missing button")]
    MissingButton,
    #[error("missing indicator")]
    MissingIndicator,
    #[error("missing actuator")]
    MissingActuator,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
