//! Text commands understood by the motor-shield firmware and the one response
//! shape the host ever waits for.
//!
//! Token spelling is fixed by the firmware: `setSpeed`, `setState`,
//! `readSensor`, and replies of the form `<SIDE>SENSOR=<value>`.

use std::fmt;

use crate::types::{MotorState, SENSOR_GARBLED, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetSpeed { side: Side, speed: u8 },
    SetState { side: Side, state: MotorState },
    ReadSensor(Side),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetSpeed { side, speed } => write!(f, "setSpeed {side} {speed}"),
            Command::SetState { side, state } => write!(f, "setState {side} {state}"),
            Command::ReadSensor(side) => write!(f, "readSensor {side}"),
        }
    }
}

/// Prefix that marks a sensor reply for `side`.
pub const fn sensor_tag(side: Side) -> &'static str {
    match side {
        Side::Left => "LEFTSENSOR=",
        Side::Right => "RIGHTSENSOR=",
    }
}

/// Match a device line against the reply expected for `side`.
///
/// `None` means the line is not that reply and should be skipped. A matching
/// reply whose payload is not plain decimal digits yields [`SENSOR_GARBLED`].
pub fn parse_sensor_response(line: &str, side: Side) -> Option<i32> {
    let rest = line.strip_prefix(sensor_tag(side))?;
    // Only the segment up to any further '=' is the value.
    let payload = rest.split('=').next().unwrap_or_default().trim();
    Some(parse_reading(payload))
}

fn parse_reading(payload: &str) -> i32 {
    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return SENSOR_GARBLED;
    }
    payload.parse::<i32>().unwrap_or(SENSOR_GARBLED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_encode_with_firmware_tokens() {
        let speed = Command::SetSpeed {
            side: Side::Left,
            speed: 45,
        };
        let state = Command::SetState {
            side: Side::Right,
            state: MotorState::Backward,
        };
        assert_eq!(speed.to_string(), "setSpeed LEFT 45");
        assert_eq!(state.to_string(), "setState RIGHT BACKWARD");
        assert_eq!(Command::ReadSensor(Side::Right).to_string(), "readSensor RIGHT");
    }

    #[test]
    fn reply_for_other_side_is_not_a_match() {
        assert_eq!(parse_sensor_response("RIGHTSENSOR=12", Side::Left), None);
        assert_eq!(parse_sensor_response("ok", Side::Left), None);
        assert_eq!(parse_sensor_response("LEFTSENSOR=12", Side::Left), Some(12));
    }

    #[test]
    fn non_numeric_payload_is_garbled() {
        assert_eq!(parse_sensor_response("LEFTSENSOR=abc", Side::Left), Some(-1));
        assert_eq!(parse_sensor_response("LEFTSENSOR=", Side::Left), Some(-1));
        assert_eq!(parse_sensor_response("LEFTSENSOR=-4", Side::Left), Some(-1));
        assert_eq!(parse_sensor_response("LEFTSENSOR=1.5", Side::Left), Some(-1));
        assert_eq!(
            parse_sensor_response("LEFTSENSOR=99999999999", Side::Left),
            Some(-1)
        );
    }

    #[test]
    fn payload_whitespace_and_trailing_fields_are_ignored() {
        assert_eq!(parse_sensor_response("RIGHTSENSOR= 230 ", Side::Right), Some(230));
        assert_eq!(parse_sensor_response("RIGHTSENSOR=230=x", Side::Right), Some(230));
    }
}
