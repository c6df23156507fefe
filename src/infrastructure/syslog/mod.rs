//! RFC-5424 syslog messages with RFC-5425 octet-counting framing.
//!
//! Used by the syslog sink app to decode what a platform log drain sends.

pub mod framing;
pub mod message;
pub mod parser;

use std::string::FromUtf8Error;

use thiserror::Error;

pub use framing::{encode_frame, read_frame, MAX_FRAME_LEN};
pub use message::{Message, SdParam, StructuredData};
pub use parser::parse;

/// Errors raised while encoding, decoding or framing syslog messages.
#[derive(Debug, Error)]
pub enum SyslogError {
    #[error("priority {0} is out of range (max 191)")]
    InvalidPriority(u16),

    #[error("{field} is longer than {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("{field} must be printable US-ASCII")]
    NonPrintable { field: &'static str },

    #[error("invalid structured data name {0:?}")]
    InvalidSdName(String),

    #[error("unsupported syslog version {0:?}")]
    UnsupportedVersion(String),

    #[error("malformed message at byte {position}: {reason}")]
    Malformed { position: usize, reason: &'static str },

    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("invalid frame length {0:?}")]
    InvalidFrameLength(String),

    #[error("frame of {0} bytes exceeds limit of {MAX_FRAME_LEN} bytes")]
    FrameTooLarge(usize),

    #[error("frame is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type SyslogResult<T> = Result<T, SyslogError>;
