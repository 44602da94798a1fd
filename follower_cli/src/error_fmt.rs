//! Human-readable error descriptions, exit codes and structured JSON errors.

use follower_core::FollowerError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(fe) = err.downcast_ref::<FollowerError>() {
        return match fe {
            FollowerError::Config(msg) if msg.contains("bounds CSV must have headers") => {
                "Invalid headers in bounds CSV. Expected 'side,min,max'.".to_string()
            }
            FollowerError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML or bounds CSV.\nHow to fix: Edit the file, then rerun."
            ),
            FollowerError::Link(msg) => format!(
                "What happened: The motor/sensor controller could not be reached ({msg}).\nLikely causes: Wrong link.port, cable unplugged, or the port is held by another program.\nHow to fix: Check the [link] section and the USB connection, or pass --sim to use the simulated track."
            ),
            FollowerError::Io(msg) => format!(
                "What happened: I/O on the controller link failed ({msg}).\nLikely causes: The controller was reset or disconnected mid-run.\nHow to fix: Reconnect the controller and start a new run."
            ),
            FollowerError::Timeout(side) => format!(
                "What happened: The {side} sensor did not answer in time.\nLikely causes: Controller firmware stalled, or link.read_timeout_ms is too low.\nHow to fix: Reset the controller, or raise link.read_timeout_ms (0 waits indefinitely)."
            ),
            FollowerError::Cancelled => {
                "What happened: Stopped by a shutdown request before finishing.\nHow to fix: Nothing to fix; rerun when ready.".to_string()
            }
            FollowerError::InvalidArgument(msg) => format!(
                "What happened: A command was rejected ({msg}).\nHow to fix: Speeds must be integers in [0, 255); sides are LEFT or RIGHT."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: config 2, link 3, timeout 4, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<FollowerError>() {
        Some(FollowerError::Config(_)) => 2,
        Some(FollowerError::Link(_) | FollowerError::Io(_)) => 3,
        Some(FollowerError::Timeout(_)) => 4,
        _ => 1,
    }
}

pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<FollowerError>() {
        Some(FollowerError::Config(_)) => "Config",
        Some(FollowerError::Link(_)) => "Link",
        Some(FollowerError::Io(_)) => "Io",
        Some(FollowerError::Timeout(_)) => "Timeout",
        Some(FollowerError::Cancelled) => "Cancelled",
        Some(FollowerError::InvalidArgument(_)) => "InvalidArgument",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
