//! Error taxonomy for the patch-priority analyzer and replay driver.
//!
//! The categories mirror how failures are meant to propagate: configuration
//! and filesystem errors are fatal before analysis starts, IR-shape
//! surprises abort the analyzer outright (a bogus match must never silently
//! produce a priority map), and replay failures are isolated per test so one
//! crashing child does not stop the campaign.

use thiserror::Error;

/// The main error type for the patch-priority workspace.
#[derive(Error, Debug, Clone)]
pub enum PatchError {
    /// Missing environment variable, missing input bitcode, bad CLI arguments.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Cannot create the output directory tree or move a dump file before analysis.
    #[error("filesystem error: {message}")]
    Filesystem { message: String },

    /// A textual match implied equivalence but the operand shapes disagreed,
    /// or an indirect call alias did not resolve to a function. Any priority
    /// computed past this point is untrustworthy.
    #[error("IR shape surprise: {message}")]
    IrShape { message: String },

    /// A replay child crashed or exited non-zero. Recoverable: the dump is
    /// compared as-is and the campaign continues.
    #[error("replay failure: {message}")]
    Replay { message: String },

    /// Failure to launch or reap a child process.
    #[error("process error: {message}")]
    Process { message: String },
}

/// Result type alias for patch-priority operations.
pub type PatchResult<T> = Result<T, PatchError>;

impl PatchError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn filesystem(message: impl Into<String>) -> Self {
        Self::Filesystem { message: message.into() }
    }

    pub fn ir_shape(message: impl Into<String>) -> Self {
        Self::IrShape { message: message.into() }
    }

    pub fn replay(message: impl Into<String>) -> Self {
        Self::Replay { message: message.into() }
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::Process { message: message.into() }
    }

    /// True for category-3 errors: these must always surface to the operator,
    /// never be swallowed by a `continue`.
    pub fn is_fatal_bug(&self) -> bool {
        matches!(self, Self::IrShape { .. })
    }
}
