//! Maps `Box<dyn Error>` from trait boundaries to typed `DrillError`.
//!
//! The traits in `drill_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `drill_hardware::HwError`.

use crate::error::DrillError;

/// Map a trait-boundary error to a typed `DrillError`.
///
/// Known hardware error types become `HardwareFault`; anything else is
/// reported as a generic `Hardware` error with its message.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> DrillError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<drill_hardware::error::HwError>() {
            return DrillError::HardwareFault(hw.to_string());
        }
    }

    DrillError::Hardware(e.to_string())
}

/// Shorthand for the `map_err` + context chain used at every trait call.
pub(crate) fn hw_report(
    e: Box<dyn std::error::Error + Send + Sync>,
    what: &'static str,
) -> eyre::Report {
    eyre::Report::new(map_hw_error(&*e)).wrap_err(what)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_errors_map_to_hardware() {
        let e: Box<dyn std::error::Error + Send + Sync> = "spi wedged".into();
        match map_hw_error(&*e) {
            DrillError::Hardware(msg) => assert_eq!(msg, "spi wedged"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hw_errors_map_to_fault() {
        let e = drill_hardware::error::HwError::Pwm("export failed".into());
        match map_hw_error(&e) {
            DrillError::HardwareFault(msg) => assert!(msg.contains("export failed")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn report_carries_context() {
        let e: Box<dyn std::error::Error + Send + Sync> = "boom".into();
        let report = hw_report(e, "reading knob");
        assert_eq!(report.to_string(), "reading knob");
        assert!(report.downcast_ref::<DrillError>().is_some());
    }
}
