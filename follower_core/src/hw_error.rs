//! Maps `Box<dyn Error>` from the `DeviceLink` boundary to typed `FollowerError`.
//!
//! The link trait uses `Box<dyn Error + Send + Sync>` so any transport fits;
//! this module recovers a typed error, with an optional feature-gated path for
//! `follower_hardware::HwError` downcasting.

use crate::error::FollowerError;

/// Map a link-boundary error to a typed `FollowerError`.
pub fn map_link_error(e: &(dyn std::error::Error + 'static)) -> FollowerError {
    #[cfg(feature = "hardware-errors")]
    {
        use follower_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Io(io) => FollowerError::Io(io.to_string()),
                other => FollowerError::Link(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        return FollowerError::Io(io.to_string());
    }
    FollowerError::Link(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Opaque;
    impl std::fmt::Display for Opaque {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("port vanished")
        }
    }
    impl std::error::Error for Opaque {}

    #[test]
    fn io_errors_keep_their_category() {
        let e = std::io::Error::other("broken pipe");
        assert!(matches!(map_link_error(&e), FollowerError::Io(_)));
    }

    #[test]
    fn unknown_errors_become_link_errors() {
        assert_eq!(
            map_link_error(&Opaque),
            FollowerError::Link("port vanished".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hardware_disconnect_is_a_link_error() {
        let e = follower_hardware::error::HwError::Disconnected;
        assert!(matches!(map_link_error(&e), FollowerError::Link(_)));
    }
}
