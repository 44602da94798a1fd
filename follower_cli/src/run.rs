//! `run` subcommand: control thread, console thread, supervised shutdown.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use eyre::WrapErr;
use follower_config::Config;
use follower_console::run_console;
use follower_core::{
    CalibrationBounds, CalibrationCfg, ControlLoop, ControlParams, CsvTelemetrySink, LoopCfg,
    ParamSnapshot, RunSummary, run,
};

use crate::calibrate::{calibrate_interactive, load_bounds};
use crate::device::{build_proxy, install_ctrlc, open_link};
use crate::rt::promote_current_thread;

/// How often the supervisor looks at the shutdown flag.
const SUPERVISE_TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
pub struct RunOpts {
    pub calibrate: bool,
    pub bounds: Option<PathBuf>,
    pub telemetry: Option<PathBuf>,
    pub sim: bool,
    pub rt: bool,
    pub rt_prio: Option<i32>,
}

#[derive(Debug)]
pub struct RunReport {
    pub telemetry: PathBuf,
    /// `None` when the control thread outlived the grace period.
    pub summary: Option<RunSummary>,
}

pub fn run_follower(cfg: &Config, opts: RunOpts) -> eyre::Result<RunReport> {
    let params = ControlParams::shared(ParamSnapshot::from(&cfg.control));
    install_ctrlc(&params)?;

    let link = open_link(&cfg.link, opts.sim)?;
    let mut proxy = build_proxy(link, cfg, &params);

    let bounds = if opts.calibrate {
        calibrate_interactive(&mut proxy, &CalibrationCfg::from(&cfg.calibration))?
    } else if let Some(path) = opts.bounds.as_deref() {
        load_bounds(path)?
    } else {
        CalibrationBounds::from(&cfg.bounds)
    };
    tracing::info!(
        left_min = bounds.left.min,
        left_max = bounds.left.max,
        right_min = bounds.right.min,
        right_max = bounds.right.max,
        "starting control loop"
    );

    let telemetry = opts
        .telemetry
        .unwrap_or_else(|| PathBuf::from(&cfg.telemetry.path));
    let mut sink = CsvTelemetrySink::new(telemetry.clone());
    let mut control = ControlLoop::new(proxy, Arc::clone(&params), bounds, LoopCfg::from(cfg));

    let (tx, rx) = crossbeam_channel::bounded(1);
    let (rt, rt_prio) = (opts.rt, opts.rt_prio);
    thread::Builder::new()
        .name("control".into())
        .spawn(move || {
            if rt {
                promote_current_thread(rt_prio);
            }
            let res = run(&mut control, &mut sink);
            let _ = tx.send(res);
        })
        .wrap_err("spawn control thread")?;

    {
        let params = Arc::clone(&params);
        thread::Builder::new()
            .name("console".into())
            .spawn(move || {
                let stdin = io::stdin();
                let mut input = stdin.lock();
                if let Err(e) = run_console(&mut input, &mut io::stdout(), &params) {
                    tracing::error!(error = %e, "console failed");
                    params.request_shutdown();
                }
            })
            .wrap_err("spawn console thread")?;
    }

    let grace = Duration::from_millis(cfg.runner.shutdown_grace_ms);
    let summary = supervise(&params, &rx, grace)?;
    Ok(RunReport { telemetry, summary })
}

/// Wait for shutdown, then give the control thread `grace` to finish.
///
/// A control loop that ends by itself (link failure) raises shutdown so the
/// console stops too, and its result is returned directly.
fn supervise(
    params: &ControlParams,
    rx: &Receiver<eyre::Result<RunSummary>>,
    grace: Duration,
) -> eyre::Result<Option<RunSummary>> {
    loop {
        match rx.recv_timeout(SUPERVISE_TICK) {
            Ok(res) => {
                params.request_shutdown();
                return res.map(Some);
            }
            Err(RecvTimeoutError::Timeout) if params.is_shutdown() => break,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                params.request_shutdown();
                eyre::bail!("control thread exited without reporting a result");
            }
        }
    }

    let grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
    tracing::info!(grace_ms, "shutdown requested, waiting for control loop");
    match rx.recv_timeout(grace) {
        Ok(res) => res.map(Some),
        Err(_) => {
            tracing::warn!(grace_ms, "control loop did not stop within the grace period");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supervisor_returns_result_after_shutdown() {
        let params = ControlParams::default();
        let (tx, rx) = crossbeam_channel::bounded(1);
        params.request_shutdown();
        tx.send(Ok(RunSummary::default())).unwrap();
        let got = supervise(&params, &rx, Duration::from_millis(100)).unwrap();
        assert_eq!(got, Some(RunSummary::default()));
    }

    #[test]
    fn supervisor_gives_up_after_grace() {
        let params = ControlParams::default();
        let (_tx, rx) = crossbeam_channel::bounded::<eyre::Result<RunSummary>>(1);
        params.request_shutdown();
        let got = supervise(&params, &rx, Duration::from_millis(20)).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn early_failure_raises_shutdown() {
        let params = ControlParams::default();
        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(Err(eyre::eyre!("link down"))).unwrap();
        assert!(supervise(&params, &rx, Duration::from_millis(20)).is_err());
        assert!(params.is_shutdown());
    }
}
