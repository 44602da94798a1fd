//! Motor/sensor identifiers shared by the proxy, the wire protocol and the loop.

use std::fmt;
use std::str::FromStr;

use crate::error::{FollowerError, Result};

/// Value returned by a sensor read whose payload was not a plain number.
pub const SENSOR_GARBLED: i32 = -1;

/// Speeds are accepted in `[0, MAX_SPEED_EXCLUSIVE)`; 255 itself is rejected.
pub const MAX_SPEED_EXCLUSIVE: i32 = 255;

/// One of the two independently driven motor/sensor channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub const fn as_wire(self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Side {
    type Err = FollowerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Ok(Side::Left),
            "RIGHT" => Ok(Side::Right),
            _ => Err(FollowerError::invalid(format!("\"{s}\" is not a valid side"))),
        }
    }
}

/// Direction mode of a motor. `Release` de-energizes without braking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MotorState {
    Forward,
    Backward,
    #[default]
    Release,
}

impl MotorState {
    pub const fn as_wire(self) -> &'static str {
        match self {
            MotorState::Forward => "FORWARD",
            MotorState::Backward => "BACKWARD",
            MotorState::Release => "RELEASE",
        }
    }
}

impl fmt::Display for MotorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for MotorState {
    type Err = FollowerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FORWARD" => Ok(MotorState::Forward),
            "BACKWARD" => Ok(MotorState::Backward),
            "RELEASE" => Ok(MotorState::Release),
            _ => Err(FollowerError::invalid(format!(
                "\"{s}\" is not a valid motor state"
            ))),
        }
    }
}

/// Check a requested speed against `[0, 255)` and narrow it to a byte.
pub fn validate_speed(speed: i32) -> Result<u8> {
    match u8::try_from(speed) {
        Ok(v) if speed < MAX_SPEED_EXCLUSIVE => Ok(v),
        _ => Err(FollowerError::invalid(format!(
            "\"{speed}\" is not a valid speed"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parse_is_trimmed_and_case_insensitive() {
        assert_eq!(" left ".parse::<Side>().unwrap(), Side::Left);
        assert_eq!("Right".parse::<Side>().unwrap(), Side::Right);
        assert!(matches!(
            "middle".parse::<Side>(),
            Err(FollowerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn state_parse_rejects_brake() {
        assert_eq!("release".parse::<MotorState>().unwrap(), MotorState::Release);
        assert!("brake".parse::<MotorState>().is_err());
    }

    #[test]
    fn speed_upper_bound_is_exclusive() {
        assert_eq!(validate_speed(0).unwrap(), 0);
        assert_eq!(validate_speed(254).unwrap(), 254);
        assert!(validate_speed(255).is_err());
        assert!(validate_speed(-1).is_err());
    }
}
