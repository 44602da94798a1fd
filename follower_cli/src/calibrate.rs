//! Operator-driven calibration: spin, report, ask, persist.

use std::io::{self, BufRead, Write};
use std::path::Path;

use follower_config::{BoundsCfg, load_bounds_csv, save_bounds_csv};
use follower_console::confirm_yes_no;
use follower_core::{
    CalibrationBounds, CalibrationCfg, Checkpoint, FollowerError, HardwareProxy, calibrate,
};
use follower_traits::DeviceLink;

/// Run the calibration routine, prompting on stdin at every checkpoint.
pub fn calibrate_interactive<L: DeviceLink>(
    proxy: &mut HardwareProxy<L>,
    cfg: &CalibrationCfg,
) -> eyre::Result<CalibrationBounds> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let bounds = calibrate(proxy, cfg, |cp| ask_to_continue(&mut input, &mut out, cp))?;
    Ok(bounds)
}

/// Report a checkpoint and ask whether to keep spinning. Any I/O failure
/// stops calibration.
fn ask_to_continue<R, W>(input: &mut R, out: &mut W, cp: &Checkpoint) -> bool
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    let b = cp.bounds;
    let asked = writeln!(
        out,
        "after {} readings: left {}..{}, right {}..{}",
        cp.readings, b.left.min, b.left.max, b.right.min, b.right.max
    )
    .and_then(|()| confirm_yes_no(input, out, "Keep calibrating?"));
    match asked {
        Ok(yes) => yes,
        Err(e) => {
            tracing::warn!(error = %e, "prompt failed; stopping calibration");
            false
        }
    }
}

pub fn load_bounds(path: &Path) -> eyre::Result<CalibrationBounds> {
    let cfg = load_bounds_csv(path).map_err(|e| FollowerError::Config(format!("{e:#}")))?;
    tracing::info!(path = %path.display(), "bounds loaded");
    Ok(CalibrationBounds::from(&cfg))
}

pub fn save_bounds(path: &Path, bounds: &CalibrationBounds) -> eyre::Result<()> {
    save_bounds_csv(path, &BoundsCfg::from(bounds))?;
    tracing::info!(path = %path.display(), "bounds saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use follower_core::SensorBounds;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn checkpoint() -> Checkpoint {
        Checkpoint {
            readings: 50,
            bounds: CalibrationBounds::new(SensorBounds::new(80, 400), SensorBounds::new(60, 410)),
        }
    }

    #[test]
    fn checkpoint_report_and_answer() {
        let mut out = Vec::new();
        let keep = ask_to_continue(&mut "y\n".as_bytes(), &mut out, &checkpoint());
        assert!(keep);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("after 50 readings: left 80..400, right 60..410\n"));
        assert!(text.contains("Keep calibrating? [y/n]"));
    }

    #[test]
    fn unwritable_output_stops_calibration() {
        // The operator would answer yes, but the report cannot be shown.
        let keep = ask_to_continue(&mut "y\n".as_bytes(), &mut BrokenPipe, &checkpoint());
        assert!(!keep);
    }
}
