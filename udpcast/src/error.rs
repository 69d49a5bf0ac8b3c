//! Error types for udpcast.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CastError>;

#[derive(Error, Debug)]
pub enum CastError {
    #[error("{0}")]
    Usage(String),

    #[error("invalid address '{addr}': {source}")]
    Addr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("invalid port '{0}'")]
    Port(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("short send: {sent} of {expected} bytes")]
    ShortSend { sent: usize, expected: usize },
}

impl CastError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
