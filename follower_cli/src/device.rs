//! Link selection and proxy wiring shared by every subcommand.

use std::sync::Arc;

use follower_config::{Config, LinkCfg};
use follower_core::{ControlParams, FollowerError, HardwareProxy, ReadPolicy};
use follower_hardware::SimulatedLink;
use follower_traits::DeviceLink;

pub type BoxLink = Box<dyn DeviceLink + Send>;

/// Gentle constant bend so a simulated run has something to correct.
const SIM_CURVATURE: f32 = 0.002;

pub fn open_link(cfg: &LinkCfg, sim: bool) -> eyre::Result<BoxLink> {
    if sim {
        tracing::info!(curvature = SIM_CURVATURE, "using simulated track");
        return Ok(Box::new(SimulatedLink::default().with_curvature(SIM_CURVATURE)));
    }
    open_serial(cfg)
}

#[cfg(feature = "hardware")]
fn open_serial(cfg: &LinkCfg) -> eyre::Result<BoxLink> {
    let link = follower_hardware::SerialLink::open(&cfg.port, cfg.baud)
        .map_err(|e| FollowerError::Link(format!("open {}: {e}", cfg.port)))?;
    Ok(Box::new(link))
}

#[cfg(not(feature = "hardware"))]
fn open_serial(cfg: &LinkCfg) -> eyre::Result<BoxLink> {
    Err(FollowerError::Link(format!(
        "cannot open {}: built without serial support (rebuild with --features hardware, or pass --sim)",
        cfg.port
    ))
    .into())
}

/// Proxy whose sensor reads honour the configured timing and the shutdown flag.
pub fn build_proxy(link: BoxLink, cfg: &Config, params: &Arc<ControlParams>) -> HardwareProxy<BoxLink> {
    HardwareProxy::new(link)
        .with_policy(ReadPolicy::from(&cfg.link))
        .with_cancel(params.shutdown_flag())
}

/// Ctrl-C raises the shared shutdown flag; the loop then stops on its own.
pub fn install_ctrlc(params: &Arc<ControlParams>) -> eyre::Result<()> {
    let params = Arc::clone(params);
    ctrlc::set_handler(move || {
        params.request_shutdown();
    })
    .map_err(|e| eyre::eyre!("install Ctrl-C handler: {e}"))
}
