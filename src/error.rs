use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use crate::descriptor::DescriptorError;
use crate::target::TargetError;

/// Unified error type for the compiler core.
///
/// Per-class failures (`Descriptor`, `Codegen`) are recoverable by the
/// embedding driver; `Target` is fatal for the whole compilation;
/// `Internal` marks invariant violations that point at a compiler bug.
#[derive(Debug)]
pub enum Error {
    Descriptor(DescriptorError),
    Target(TargetError),
    Codegen {
        message: String,
        backtrace: Option<Backtrace>,
    },
    Internal {
        message: String,
        backtrace: Option<Backtrace>,
    },
}

/// Convenience result alias used across the compiler core.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Construct a new lowering/layout error.
    pub fn codegen(message: impl Into<String>) -> Self {
        Self::Codegen {
            message: message.into(),
            backtrace: capture_backtrace(),
        }
    }

    /// Construct a new internal invariant-violation error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            backtrace: capture_backtrace(),
        }
    }

    /// Return the captured backtrace, if any.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            Error::Codegen { backtrace, .. } | Error::Internal { backtrace, .. } => {
                backtrace.as_ref()
            }
            _ => None,
        }
    }
}

fn capture_backtrace() -> Option<Backtrace> {
    if cfg!(debug_assertions) {
        Some(Backtrace::force_capture())
    } else {
        None
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Descriptor(err) => write!(f, "{err}"),
            Error::Target(err) => write!(f, "target error: {err}"),
            Error::Codegen { message, .. } => write!(f, "codegen error: {message}"),
            Error::Internal { message, .. } => write!(f, "internal error: {message}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Descriptor(err) => Some(err),
            Error::Target(err) => Some(err),
            Error::Codegen { .. } | Error::Internal { .. } => None,
        }
    }
}

impl From<DescriptorError> for Error {
    fn from(error: DescriptorError) -> Self {
        Error::Descriptor(error)
    }
}

impl From<TargetError> for Error {
    fn from(error: TargetError) -> Self {
        Error::Target(error)
    }
}
