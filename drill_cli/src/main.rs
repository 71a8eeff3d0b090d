#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `drill`: servo drill controller CLI.

mod cli;
mod drive;
mod error_fmt;
mod logging;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use drill_core::DrillError;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::error!(error = %format!("{e:#}"), "exiting with error");
        std::process::exit(exit_code_for_error(&e));
    }
}

/// Read, parse and validate the TOML config. All failures are `DrillError::Config`.
fn load_config(path: &Path) -> eyre::Result<drill_config::Config> {
    let config_err = |msg: String| eyre::Report::new(DrillError::Config(msg));
    let text = std::fs::read_to_string(path)
        .map_err(|e| config_err(format!("read {}: {e}", path.display())))?;
    let cfg = drill_config::load_toml(&text)
        .map_err(|e| config_err(format!("parse {}: {e}", path.display())))?;
    cfg.validate().map_err(|e| config_err(format!("{e:#}")))?;
    Ok(cfg)
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    // Config errors still get console logging
    let cfg = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            logging::init(cli.json, &cli.log_level, None);
            return Err(e);
        }
    };
    logging::init(cli.json, &cli.log_level, Some(&cfg.logging));
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = shutdown.clone();
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("install Ctrl-C handler")?;
            }
            tracing::info!("running; press Ctrl-C to stop");
            let snapshot = drive::run(&cfg, shutdown)?;
            if cli.json {
                println!("{}", drive::snapshot_json(&snapshot));
            } else {
                print!("{}", drive::render_snapshot(&snapshot));
            }
        }
        Commands::Simulate { scenario, until_ms } => {
            let scenario = drill_config::load_scenario_csv(&scenario)?;
            let report = drive::simulate(&cfg, &scenario, until_ms)?;
            if cli.json {
                println!("{}", drive::report_json(&report));
            } else {
                print!("{}", drive::render_report(&report));
            }
        }
        Commands::SelfCheck => {
            drive::self_check(&cfg)?;
            if cli.json {
                println!("{}", serde_json::json!({ "self_check": "ok" }));
            } else {
                println!("OK");
            }
        }
    }
    Ok(())
}
