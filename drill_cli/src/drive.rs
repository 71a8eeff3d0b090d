//! Peripheral assembly and the run / simulate / self-check commands.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use drill_config::{Config, Scenario, ScenarioButton};
use drill_core::{ControllerSnapshot, DrillController, Scheduler};
use drill_hardware::{SimulatedActuator, SimulatedButton, SimulatedIndicator, SimulatedKnob};
use drill_traits::clock::manual::ManualClock;
use drill_traits::{Button, ButtonLevel, Indicator, IndicatorColor, Knob};
use eyre::WrapErr;

/// Result of a scenario replay.
#[derive(Debug, Clone)]
pub struct SimReport {
    pub snapshot: ControllerSnapshot,
    pub iterations: u64,
    pub polls: u64,
    /// Every color the indicator was asked to show, in order.
    pub indicator_history: Vec<IndicatorColor>,
    pub actuator_writes: usize,
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn hw_report(e: drill_hardware::error::HwError, what: &'static str) -> eyre::Report {
    eyre::Report::new(drill_core::hw_error::map_hw_error(&e)).wrap_err(what)
}

/// Builder with the Pi peripherals named in `[pins]`.
#[cfg(all(feature = "hardware", target_os = "linux"))]
fn hardware_builder(cfg: &Config) -> eyre::Result<drill_core::ControllerBuilder> {
    use drill_hardware::pi::{GpioButton, Mcp3008Knob, PwmServo, RgbLed, open_gpio};

    let pins = &cfg.pins;
    let gpio = open_gpio().map_err(|e| hw_report(e, "open gpio"))?;
    let button = GpioButton::new(&gpio, pins.button).map_err(|e| hw_report(e, "open button pin"))?;
    let led = RgbLed::new(
        &gpio,
        pins.led_red,
        pins.led_green,
        pins.led_blue,
        pins.led_active_low,
    )
    .map_err(|e| hw_report(e, "open led pins"))?;
    let servo = PwmServo::new(pins.pwm_channel, cfg.servo.pwm_period_ms)
        .map_err(|e| hw_report(e, "open servo pwm"))?;
    let knob = Mcp3008Knob::new(pins.spi_bus, pins.spi_slave_select, pins.adc_channel)
        .map_err(|e| hw_report(e, "open mcp3008 knob"))?;
    tracing::info!(
        button = pins.button,
        pwm_channel = pins.pwm_channel,
        adc_channel = pins.adc_channel,
        "pi peripherals opened"
    );
    Ok(DrillController::builder()
        .with_knob(knob)
        .with_button(button)
        .with_indicator(led)
        .with_actuator(servo))
}

/// Builder with simulated peripherals (knob parked at 0, button released).
#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn hardware_builder(_cfg: &Config) -> eyre::Result<drill_core::ControllerBuilder> {
    tracing::info!("hardware feature off; using simulated peripherals");
    Ok(DrillController::builder()
        .with_knob(SimulatedKnob::new())
        .with_button(SimulatedButton::new())
        .with_indicator(SimulatedIndicator::new())
        .with_actuator(SimulatedActuator::new()))
}

/// Run the controller until `shutdown` is set, then park the servo and turn
/// the indicator off.
pub fn run(cfg: &Config, shutdown: Arc<AtomicBool>) -> eyre::Result<ControllerSnapshot> {
    let controller = hardware_builder(cfg)?
        .apply_config(cfg)
        .build()
        .wrap_err("build controller")?;
    let mut sched = Scheduler::new(controller);

    let result = sched.run_until(&shutdown);
    // Park even when the loop failed; report the loop error first
    let parked = sched.controller_mut().shutdown();
    result?;
    parked.wrap_err("park on shutdown")?;

    let snapshot = sched.controller().snapshot();
    tracing::info!(
        state = %snapshot.state,
        iterations = sched.iterations(),
        uptime_ms = snapshot.uptime_ms,
        "stopped"
    );
    Ok(snapshot)
}

/// Replay `scenario` on simulated peripherals under a virtual clock.
///
/// Inputs are applied before each iteration from the row in effect at that
/// time. Runs until `until_ms` (default one second past the last row).
pub fn simulate(cfg: &Config, scenario: &Scenario, until_ms: Option<u64>) -> eyre::Result<SimReport> {
    let knob = SimulatedKnob::new();
    let button = SimulatedButton::new();
    let led = SimulatedIndicator::new();
    let servo = SimulatedActuator::new();
    let clock = ManualClock::new();

    let controller = DrillController::builder()
        .with_knob(knob.clone())
        .with_button(button.clone())
        .with_indicator(led.clone())
        .with_actuator(servo.clone())
        .with_clock(clock)
        .apply_config(cfg)
        .build()
        .wrap_err("build simulated controller")?;
    let mut sched = Scheduler::new(controller);

    let until = until_ms.unwrap_or_else(|| scenario.end_ms().saturating_add(1000));
    tracing::info!(rows = scenario.rows().len(), until_ms = until, "simulation start");
    sched.run_for(until, |now| {
        let row = scenario.at(now);
        knob.set(row.knob);
        button.set_level(match row.button {
            ScenarioButton::Pressed => ButtonLevel::Pressed,
            ScenarioButton::Released => ButtonLevel::Released,
        });
    })?;

    Ok(SimReport {
        snapshot: sched.controller().snapshot(),
        iterations: sched.iterations(),
        polls: sched.polls(),
        indicator_history: led.history(),
        actuator_writes: servo.write_count(),
    })
}

/// Build the controller from the config, light each primary in turn, then
/// go dark.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let mut controller = hardware_builder(cfg)?
        .apply_config(cfg)
        .build()
        .wrap_err("build controller")?;
    let io = controller.peripherals_mut();
    for color in IndicatorColor::PRIMARIES {
        io.indicator
            .show(color)
            .map_err(|e| eyre::Report::new(drill_core::hw_error::map_hw_error(&*e)))
            .wrap_err("cycle indicator")?;
        tracing::debug!(%color, "indicator");
        std::thread::sleep(std::time::Duration::from_millis(150));
    }
    let level = io
        .button
        .level()
        .map_err(|e| eyre::Report::new(drill_core::hw_error::map_hw_error(&*e)))
        .wrap_err("read button")?;
    let knob = io
        .knob
        .read()
        .map_err(|e| eyre::Report::new(drill_core::hw_error::map_hw_error(&*e)))
        .wrap_err("read knob")?;
    tracing::info!(?level, knob, "inputs");
    controller.shutdown()?;
    Ok(())
}

pub fn snapshot_json(s: &ControllerSnapshot) -> serde_json::Value {
    serde_json::json!({
        "state": s.state.name(),
        "indicator": s.indicator.name(),
        "flashing": s.flashing,
        "bounds": { "minimum": s.bounds.minimum, "maximum": s.bounds.maximum },
        "position": s.position,
        "duty": s.duty,
        "minimum_capture": s.minimum_capture,
        "maximum_capture": s.maximum_capture,
        "uptime_ms": s.uptime_ms,
    })
}

pub fn report_json(r: &SimReport) -> serde_json::Value {
    let mut v = snapshot_json(&r.snapshot);
    v["iterations"] = r.iterations.into();
    v["polls"] = r.polls.into();
    v["actuator_writes"] = r.actuator_writes.into();
    v["indicator_history"] = r
        .indicator_history
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .into();
    v
}

pub fn render_snapshot(s: &ControllerSnapshot) -> String {
    format!(
        "state: {}\nindicator: {}{}\nbounds: {:.3} .. {:.3}\nposition: {:.3} (duty {:.4})\ncaptures: min {:.3} max {:.3}\nuptime: {} ms\n",
        s.state,
        s.indicator,
        if s.flashing { " (error flash)" } else { "" },
        s.bounds.minimum,
        s.bounds.maximum,
        s.position,
        s.duty,
        s.minimum_capture,
        s.maximum_capture,
        s.uptime_ms,
    )
}

pub fn render_report(r: &SimReport) -> String {
    let history: Vec<&str> = r.indicator_history.iter().map(|c| c.name()).collect();
    format!(
        "{}iterations: {} (polls {}, actuator writes {})\nindicator history: {}\n",
        render_snapshot(&r.snapshot),
        r.iterations,
        r.polls,
        r.actuator_writes,
        history.join(" -> "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_config::ScenarioRow;
    use drill_core::ControllerState;

    fn cfg() -> Config {
        drill_config::load_toml(
            r#"
            [pins]
            button = 17
            led_red = 5
            led_green = 6
            led_blue = 13
            "#,
        )
        .unwrap()
    }

    fn row(at_ms: u64, knob: f32, pressed: bool) -> ScenarioRow {
        ScenarioRow {
            at_ms,
            knob,
            button: if pressed {
                ScenarioButton::Pressed
            } else {
                ScenarioButton::Released
            },
        }
    }

    #[test]
    fn scenario_press_enters_setting_minimum() {
        let scenario = Scenario::from_rows(vec![
            row(0, 0.05, false),
            row(200, 0.05, true),
            row(300, 0.05, false),
        ])
        .unwrap();
        let report = simulate(&cfg(), &scenario, Some(600)).unwrap();
        assert_eq!(report.snapshot.state, ControllerState::SettingMinimum);
        assert_eq!(report.iterations, 600);
        assert_eq!(report.polls, 6);
        assert_eq!(
            report.indicator_history,
            vec![IndicatorColor::Blue, IndicatorColor::Red]
        );
    }

    #[test]
    fn report_json_lists_history() {
        let scenario = Scenario::from_rows(vec![row(0, 0.5, false)]).unwrap();
        let report = simulate(&cfg(), &scenario, Some(10)).unwrap();
        let v = report_json(&report);
        assert_eq!(v["state"], "opening");
        assert_eq!(v["indicator_history"][0], "blue");
        assert_eq!(v["iterations"], 10);
    }
}
