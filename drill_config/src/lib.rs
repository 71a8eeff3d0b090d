#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and scenario parsing for the servo drill controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Scenario CSV loader enforces headers and ordering; scenarios script the
//!   knob and button for the simulator.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Pins {
    /// Pushbutton input (BCM numbering, pulled up, pressed = low)
    pub button: u8,
    pub led_red: u8,
    pub led_green: u8,
    pub led_blue: u8,
    /// LED cathodes driven by the GPIO (on = low)
    #[serde(default = "default_true")]
    pub led_active_low: bool,
    /// Hardware PWM channel for the servo (0 or 1)
    #[serde(default)]
    pub pwm_channel: u8,
    /// MCP3008 input the knob wiper is on (0..=7)
    #[serde(default)]
    pub adc_channel: u8,
    #[serde(default)]
    pub spi_bus: u8,
    #[serde(default)]
    pub spi_slave_select: u8,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Servo {
    pub pwm_period_ms: f32,
    /// Duty fraction at the fully clockwise end
    pub duty_min: f32,
    /// Duty fraction at the fully counter-clockwise end
    pub duty_max: f32,
    /// Mirror the travel direction (servo mounted the other way round)
    pub reverse_motion: bool,
}

impl Default for Servo {
    fn default() -> Self {
        Self {
            pwm_period_ms: 20.0,
            duty_min: 0.5 / 20.0,
            duty_max: 1.7 / 20.0,
            reverse_motion: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ButtonCfg {
    /// Edges closer than this to the last accepted edge are dropped
    pub debounce_ms: u64,
    /// Presses held longer than this are long presses
    pub long_press_ms: u64,
}

impl Default for ButtonCfg {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            long_press_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    pub poll_period_ms: u64,
    /// Knob must read below this to confirm a calibration point
    pub gate_threshold: f32,
    pub error_flash_ms: u64,
    /// Sleep between scheduler iterations; keep below `button.debounce_ms`
    pub loop_interval_ms: u64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            poll_period_ms: 100,
            gate_threshold: 0.1,
            error_flash_ms: 400,
            loop_interval_ms: 1,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub servo: Servo,
    #[serde(default)]
    pub button: ButtonCfg,
    #[serde(default)]
    pub control: ControlCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Servo
        if !(self.servo.pwm_period_ms.is_finite() && self.servo.pwm_period_ms > 0.0) {
            eyre::bail!("servo.pwm_period_ms must be > 0");
        }
        for (name, duty) in [
            ("servo.duty_min", self.servo.duty_min),
            ("servo.duty_max", self.servo.duty_max),
        ] {
            if !(duty > 0.0 && duty < 1.0) {
                eyre::bail!("{name} must be in (0.0, 1.0)");
            }
        }
        if self.servo.duty_min == self.servo.duty_max {
            eyre::bail!("servo.duty_min and servo.duty_max must differ");
        }

        // Button
        if self.button.debounce_ms == 0 {
            eyre::bail!("button.debounce_ms must be >= 1");
        }
        if self.button.long_press_ms <= self.button.debounce_ms {
            eyre::bail!("button.long_press_ms must be greater than button.debounce_ms");
        }

        // Control
        if self.control.poll_period_ms == 0 {
            eyre::bail!("control.poll_period_ms must be >= 1");
        }
        if !(self.control.gate_threshold > 0.0 && self.control.gate_threshold <= 1.0) {
            eyre::bail!("control.gate_threshold must be in (0.0, 1.0]");
        }
        if self.control.loop_interval_ms == 0 {
            eyre::bail!("control.loop_interval_ms must be >= 1");
        }
        if self.control.loop_interval_ms >= self.button.debounce_ms {
            eyre::bail!("control.loop_interval_ms must be below button.debounce_ms");
        }

        // Pins
        if self.pins.adc_channel > 7 {
            eyre::bail!("pins.adc_channel must be in 0..=7");
        }
        if self.pins.pwm_channel > 1 {
            eyre::bail!("pins.pwm_channel must be 0 or 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly (got {rot})");
        }

        Ok(())
    }
}

/// Button line state in a scenario row.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioButton {
    Pressed,
    Released,
}

/// Scenario CSV schema.
///
/// Expected headers:
/// at_ms,knob,button
///
/// Example:
/// at_ms,knob,button
/// 0,0.05,released
/// 200,0.05,pressed
/// 400,0.05,released
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ScenarioRow {
    pub at_ms: u64,
    pub knob: f32,
    pub button: ScenarioButton,
}

/// Time-ordered inputs for the simulator. Each row holds from its `at_ms`
/// until the next row.
#[derive(Debug, Clone)]
pub struct Scenario {
    rows: Vec<ScenarioRow>,
}

impl Scenario {
    pub fn from_rows(rows: Vec<ScenarioRow>) -> eyre::Result<Self> {
        if rows.is_empty() {
            eyre::bail!("scenario requires at least one row");
        }
        for (i, pair) in rows.windows(2).enumerate() {
            if pair[1].at_ms < pair[0].at_ms {
                eyre::bail!(
                    "scenario rows must be ordered by at_ms (row {} at {} ms follows {} ms)",
                    i + 2,
                    pair[1].at_ms,
                    pair[0].at_ms
                );
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ScenarioRow] {
        &self.rows
    }

    /// Timestamp of the last row.
    pub fn end_ms(&self) -> u64 {
        self.rows.last().map(|r| r.at_ms).unwrap_or(0)
    }

    /// Inputs in effect at `t_ms`: the last row whose `at_ms <= t_ms`, or the
    /// first row before the scenario starts.
    pub fn at(&self, t_ms: u64) -> ScenarioRow {
        let idx = self.rows.partition_point(|r| r.at_ms <= t_ms);
        self.rows[idx.saturating_sub(1)]
    }
}

impl TryFrom<Vec<ScenarioRow>> for Scenario {
    type Error = eyre::Report;
    fn try_from(rows: Vec<ScenarioRow>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

pub fn load_scenario_csv(path: &std::path::Path) -> eyre::Result<Scenario> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open scenario CSV {:?}: {}", path, e))?;
    scenario_from_reader(file).map_err(|e| e.wrap_err(format!("scenario {}", path.display())))
}

/// Parse scenario CSV text from any reader. Headers must be exactly
/// `at_ms,knob,button`.
pub fn scenario_from_reader<R: std::io::Read>(reader: R) -> eyre::Result<Scenario> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers: {}", e))?
        .clone();
    let expected = ["at_ms", "knob", "button"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "scenario CSV must have headers 'at_ms,knob,button', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ScenarioRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    Scenario::try_from(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(at_ms: u64, knob: f32, button: ScenarioButton) -> ScenarioRow {
        ScenarioRow { at_ms, knob, button }
    }

    #[test]
    fn scenario_lookup_holds_until_next_row() {
        let sc = Scenario::from_rows(vec![
            row(0, 0.0, ScenarioButton::Released),
            row(100, 0.5, ScenarioButton::Pressed),
            row(300, 0.7, ScenarioButton::Released),
        ])
        .unwrap();
        assert_eq!(sc.at(0).knob, 0.0);
        assert_eq!(sc.at(99).knob, 0.0);
        assert_eq!(sc.at(100).button, ScenarioButton::Pressed);
        assert_eq!(sc.at(299).knob, 0.5);
        assert_eq!(sc.at(10_000).knob, 0.7);
        assert_eq!(sc.end_ms(), 300);
    }

    #[test]
    fn scenario_before_first_row_uses_first_row() {
        let sc = Scenario::from_rows(vec![row(50, 0.2, ScenarioButton::Released)]).unwrap();
        assert_eq!(sc.at(0).knob, 0.2);
    }

    #[test]
    fn scenario_rejects_out_of_order_rows() {
        let err = Scenario::from_rows(vec![
            row(100, 0.0, ScenarioButton::Released),
            row(50, 0.0, ScenarioButton::Pressed),
        ])
        .expect_err("out of order");
        assert!(err.to_string().contains("ordered by at_ms"));
    }

    #[test]
    fn scenario_rejects_empty() {
        assert!(Scenario::from_rows(Vec::new()).is_err());
    }
}
