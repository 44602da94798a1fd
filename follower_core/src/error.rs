use thiserror::Error;

use crate::types::Side;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FollowerError {
    /// Bad side, state, speed or parameter value. Raised before any link write.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("device link error: {0}")]
    Link(String),
    #[error("timeout waiting for {0} sensor response")]
    Timeout(Side),
    /// The shutdown flag was raised while waiting on the link.
    #[error("cancelled by shutdown request")]
    Cancelled,
    #[error("io error: {0}")]
    Io(String),
    /// Configuration or persisted calibration rejected at startup.
    #[error("config error: {0}")]
    Config(String),
}

impl FollowerError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, FollowerError>;
pub use eyre::Report;
