//! Human-readable error descriptions and structured JSON error formatting.

use drill_core::error::{BuildError, DrillError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingKnob => {
                "What happened: No knob was provided to the controller.\nLikely causes: The ADC failed to initialize or was not wired into the builder.\nHow to fix: Ensure the MCP3008 knob is created successfully and passed via with_knob(...).".to_string()
            }
            BuildError::MissingButton => {
                "What happened: No button was provided to the controller.\nLikely causes: The button GPIO failed to initialize or was not wired into the builder.\nHow to fix: Check [pins].button and pass the button via with_button(...).".to_string()
            }
            BuildError::MissingIndicator => {
                "What happened: No indicator LED was provided to the controller.\nLikely causes: The LED GPIOs failed to initialize or were not wired into the builder.\nHow to fix: Check [pins].led_red/led_green/led_blue and pass the LED via with_indicator(...).".to_string()
            }
            BuildError::MissingActuator => {
                "What happened: No servo was provided to the controller.\nLikely causes: The PWM channel failed to initialize or was not wired into the builder.\nHow to fix: Ensure PWM is enabled (dtoverlay=pwm) and pass the servo via with_actuator(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/drill_config.toml for a sample."
            ),
        };
    }

    if let Some(de) = err.downcast_ref::<DrillError>() {
        return match de {
            DrillError::HardwareFault(msg) => format!(
                "What happened: A peripheral reported a fault ({msg}).\nLikely causes: Wrong pin or channel numbers, SPI/PWM not enabled, or missing GPIO permissions.\nHow to fix: Check [pins] in the config, enable SPI and PWM in /boot/config.txt, and run as a user in the gpio group."
            ),
            DrillError::Hardware(msg) => format!(
                "What happened: Hardware access failed ({msg}).\nLikely causes: Loose wiring or a backend error.\nHow to fix: Verify wiring and power, then re-run with --log-level=debug."
            ),
            DrillError::Config(msg) => format!(
                "What happened: Configuration is invalid or incomplete ({msg}).\nLikely causes: Missing [pins] section, a typo, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
            ),
        };
    }

    // String-based heuristics for errors coming from scenario loading
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("scenario csv must have headers") {
        return "Invalid headers in scenario CSV. Expected 'at_ms,knob,button'.".to_string();
    }

    if lower.contains("open scenario csv") {
        return format!(
            "What happened: The scenario file could not be opened.\nLikely causes: Wrong path or missing read permission.\nHow to fix: Check the --scenario argument. Original: {msg}"
        );
    }

    if lower.contains("invalid csv row") || lower.contains("scenario rows must be ordered") {
        return format!(
            "What happened: The scenario file has a bad row.\nLikely causes: Non-numeric at_ms/knob, a button value other than pressed/released, or rows out of time order.\nHow to fix: Fix the row and rerun. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error class.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<DrillError>() {
        Some(DrillError::Hardware(_) | DrillError::HardwareFault(_)) => 3,
        Some(DrillError::Config(_)) => 4,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    match err.downcast_ref::<DrillError>() {
        Some(DrillError::Hardware(_)) => "Hardware",
        Some(DrillError::HardwareFault(_)) => "HardwareFault",
        Some(DrillError::Config(_)) => "Config",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_class() {
        assert_eq!(
            exit_code_for_error(&eyre::Report::new(BuildError::MissingKnob)),
            2
        );
        let hw = eyre::Report::new(DrillError::HardwareFault("pwm".into())).wrap_err("driving actuator");
        assert_eq!(exit_code_for_error(&hw), 3);
        assert_eq!(
            exit_code_for_error(&eyre::Report::new(DrillError::Config("x".into()))),
            4
        );
        assert_eq!(exit_code_for_error(&eyre::eyre!("other")), 1);
    }

    #[test]
    fn json_carries_reason_and_message() {
        let err = eyre::Report::new(DrillError::Config("control.poll_period_ms must be >= 1".into()));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
        assert!(v["message"].as_str().unwrap().contains("poll_period_ms"));
    }

    #[test]
    fn reason_names_follow_error_class() {
        let cases = [
            (eyre::Report::new(BuildError::MissingButton), "Build"),
            (eyre::Report::new(DrillError::Hardware("spi".into())), "Hardware"),
            (
                eyre::Report::new(DrillError::HardwareFault("pwm".into())).wrap_err("driving actuator"),
                "HardwareFault",
            ),
            (eyre::Report::new(DrillError::Config("x".into())), "Config"),
            (eyre::eyre!("scenario rows must be ordered"), "Error"),
        ];
        for (err, reason) in cases {
            assert_eq!(reason_name(&err), reason, "{err:#}");
        }
    }

    #[test]
    fn scenario_header_is_special_cased() {
        let err = eyre::eyre!("scenario CSV must have headers 'at_ms,knob,button', got: t,k,b");
        assert!(humanize(&err).starts_with("Invalid headers in scenario CSV"));
    }
}
