mod calibrate;
mod cli;
mod device;
mod error_fmt;
mod logging;
mod rt;
mod run;

use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use follower_config::{Config, Logging, load_toml};
use follower_core::{CalibrationCfg, ControlParams, FollowerError, ParamSnapshot, ReadPolicy, Side};
use serde_json::json;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::device::{build_proxy, install_ctrlc, open_link};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::{RunOpts, run_follower};

/// Sensor-read limit for `self-check` when the config waits indefinitely.
const SELF_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let code = match real_main(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref());
    let logging = cfg.as_ref().map_or_else(|_| Logging::default(), |c| c.logging.clone());
    logging::init_tracing(cli.json, cli.log_level.as_deref(), &logging)?;
    let cfg = cfg?;

    match cli.cmd {
        Commands::Run {
            calibrate,
            bounds,
            telemetry,
            sim,
            rt,
            rt_prio,
        } => {
            let report = run_follower(
                &cfg,
                RunOpts {
                    calibrate,
                    bounds,
                    telemetry,
                    sim,
                    rt,
                    rt_prio,
                },
            )?;
            let path = report.telemetry.display().to_string();
            match (report.summary, cli.json) {
                (Some(s), true) => println!(
                    "{}",
                    json!({
                        "status": "ok",
                        "telemetry": path,
                        "records": s.records,
                        "iterations": s.iterations(),
                        "tracking": s.tracking,
                        "line_lost": s.line_lost,
                        "picked_up": s.picked_up,
                        "idle": s.idle,
                    })
                ),
                (Some(s), false) => println!(
                    "stopped after {} iterations; {} telemetry rows written to {path}",
                    s.iterations(),
                    s.records
                ),
                (None, true) => println!("{}", json!({ "status": "timeout", "telemetry": path })),
                (None, false) => println!("control loop did not stop in time; telemetry may be missing"),
            }
        }
        Commands::Calibrate { out, sim } => {
            let params = ControlParams::shared(ParamSnapshot::default());
            install_ctrlc(&params)?;
            let link = open_link(&cfg.link, sim)?;
            let mut proxy = build_proxy(link, &cfg, &params);
            let bounds =
                calibrate::calibrate_interactive(&mut proxy, &CalibrationCfg::from(&cfg.calibration))?;
            calibrate::save_bounds(&out, &bounds)?;
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "status": "ok",
                        "out": out.display().to_string(),
                        "left": { "min": bounds.left.min, "max": bounds.left.max },
                        "right": { "min": bounds.right.min, "max": bounds.right.max },
                    })
                );
            } else {
                println!(
                    "bounds saved to {}: left {}..{}, right {}..{}",
                    out.display(),
                    bounds.left.min,
                    bounds.left.max,
                    bounds.right.min,
                    bounds.right.max
                );
            }
        }
        Commands::SelfCheck { sim } => {
            let params = ControlParams::shared(ParamSnapshot::default());
            let link = open_link(&cfg.link, sim)?;
            let mut policy = ReadPolicy::from(&cfg.link);
            policy.deadline = policy.deadline.or(Some(SELF_CHECK_TIMEOUT));
            let mut proxy = build_proxy(link, &cfg, &params).with_policy(policy);
            proxy.release()?;
            let left = proxy.read_sensor(Side::Left)?;
            let right = proxy.read_sensor(Side::Right)?;
            tracing::info!(left, right, "self-check ok");
            if cli.json {
                println!("{}", json!({ "status": "ok", "left": left, "right": right }));
            } else {
                println!("OK: left sensor {left}, right sensor {right}");
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let cfg = match path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .map_err(|e| FollowerError::Config(format!("read {}: {e}", p.display())))?;
            load_toml(&text)
                .map_err(|e| FollowerError::Config(format!("parse {}: {e}", p.display())))?
        }
        None => Config::default(),
    };
    cfg.validate()
        .map_err(|e| FollowerError::Config(format!("{e:#}")))?;
    Ok(cfg)
}
