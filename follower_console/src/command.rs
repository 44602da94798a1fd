use follower_core::ControlParams;
use thiserror::Error;

/// One line of operator input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TuningCommand {
    /// `0`
    ToggleEngage,
    /// `k=<float>`
    SetGain(f64),
    /// `s=<int>`
    SetBaseSpeed(i32),
    /// `min=<int>`
    SetMinSpeed(i32),
    /// `max=<int>`
    SetMaxSpeed(i32),
    Status,
    /// `q`, `quit`
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TuningError {
    /// Recognized command with a value that does not parse or is out of range.
    #[error("invalid value!")]
    InvalidValue { command: &'static str, raw: String },
    #[error("unknown command: {0:?}")]
    Unknown(String),
}

fn invalid(command: &'static str, raw: &str) -> TuningError {
    TuningError::InvalidValue {
        command,
        raw: raw.to_string(),
    }
}

/// Parse one console line. Surrounding whitespace is ignored, and the value
/// of a `name=value` command is the text between the first and second `=`.
///
/// Speed values are only checked for being integers here; the range check
/// happens in [`apply`].
pub fn parse(line: &str) -> Result<TuningCommand, TuningError> {
    let line = line.trim();
    if line == "0" {
        return Ok(TuningCommand::ToggleEngage);
    }
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Ok(TuningCommand::Quit);
    }
    if line.eq_ignore_ascii_case("status") {
        return Ok(TuningCommand::Status);
    }

    let Some((name, rest)) = line.split_once('=') else {
        return Err(TuningError::Unknown(line.to_string()));
    };
    let raw = rest.split('=').next().unwrap_or_default().trim();
    let int = |command| raw.parse::<i32>().map_err(|_| invalid(command, raw));
    match name {
        "k" => raw
            .parse::<f64>()
            .map(TuningCommand::SetGain)
            .map_err(|_| invalid("k", raw)),
        "s" => int("s").map(TuningCommand::SetBaseSpeed),
        "min" => int("min").map(TuningCommand::SetMinSpeed),
        "max" => int("max").map(TuningCommand::SetMaxSpeed),
        _ => Err(TuningError::Unknown(line.to_string())),
    }
}

/// Apply a parsed command to the shared parameters.
///
/// Returns `Ok(true)` when the console should stop reading (`Quit`). A speed
/// outside `[0, 255)` is reported as `InvalidValue` and changes nothing.
pub fn apply(cmd: TuningCommand, params: &ControlParams) -> Result<bool, TuningError> {
    match cmd {
        TuningCommand::ToggleEngage => {
            let on = params.toggle_engaged();
            tracing::info!(engaged = on, "engage toggled");
        }
        TuningCommand::SetGain(gain) => {
            params.set_gain(gain);
            tracing::info!(gain, "gain updated");
        }
        TuningCommand::SetBaseSpeed(v) => {
            params.set_base_speed(v).map_err(|_| invalid("s", &v.to_string()))?;
            tracing::info!(base_speed = v, "base speed updated");
        }
        TuningCommand::SetMinSpeed(v) => {
            params.set_min_speed(v).map_err(|_| invalid("min", &v.to_string()))?;
            tracing::info!(min_speed = v, "min speed updated");
        }
        TuningCommand::SetMaxSpeed(v) => {
            params.set_max_speed(v).map_err(|_| invalid("max", &v.to_string()))?;
            tracing::info!(max_speed = v, "max speed updated");
        }
        TuningCommand::Status => {}
        TuningCommand::Quit => {
            params.request_shutdown();
            tracing::info!("shutdown requested from console");
            return Ok(true);
        }
    }
    Ok(false)
}
