use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a tracked object within one live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonically increasing sequence number attached to one live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionTag(pub u64);

impl fmt::Display for SessionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Failure of the live transport. Fatal to the session it occurs in.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("handshake rejected with status {status}")]
    Handshake { status: u16 },
    #[error("stream body missing from response")]
    MissingBody,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("read failed: {0}")]
    Read(String),
}

/// Reasons a decoded line is skipped instead of being classified.
#[derive(thiserror::Error, Debug)]
pub enum MessageError {
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("unrecognized message shape (keys: {0})")]
    UnrecognizedShape(String),
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("session length must be at least 1 second")]
    LengthTooShort,
    #[error("step size must be at least 1 second")]
    StepTooShort,
    #[error("step size {step}s exceeds session length {length}s")]
    StepExceedsLength { step: u32, length: u32 },
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("catalog read failure for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog parse failure: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate catalog index {0}")]
    DuplicateIndex(usize),
}

/// Errors raised by the session controller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("invalid session parameters: {0}")]
    InvalidParameters(#[from] ParameterError),
}

pub type SessionResult<T> = Result<T, SessionError>;
