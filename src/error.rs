//! Error types for the matchmaking queue
//!
//! Admission failures carry a stable numeric code through [`ErrorKind`] so hosts
//! can forward them over any transport. Everything else uses anyhow for
//! consistent error handling throughout the crate.

use crate::types::{Category, GroupSize};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Stable error codes reported to callers of `admit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    NoError = 0,
    DuplicateParticipant = 1,
    InvalidCategory = 2,
    InvalidGroupSize = 3,
    UnknownError = 4,
}

impl ErrorKind {
    /// Numeric code for this error kind
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a numeric code back to its kind; unrecognised codes become `UnknownError`
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ErrorKind::NoError,
            1 => ErrorKind::DuplicateParticipant,
            2 => ErrorKind::InvalidCategory,
            3 => ErrorKind::InvalidGroupSize,
            _ => ErrorKind::UnknownError,
        }
    }

    /// Stable snake_case name, used as a metrics label
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NoError => "no_error",
            ErrorKind::DuplicateParticipant => "duplicate_participant",
            ErrorKind::InvalidCategory => "invalid_category",
            ErrorKind::InvalidGroupSize => "invalid_group_size",
            ErrorKind::UnknownError => "unknown_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons an admission request is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("Participant is already queued")]
    DuplicateParticipant,

    #[error("Invalid category {category}: must be within 1..={max}")]
    InvalidCategory { category: Category, max: Category },

    #[error("Invalid group size {group_size}: must be a power of two within 1..={max}")]
    InvalidGroupSize { group_size: GroupSize, max: GroupSize },
}

impl AdmissionError {
    /// The stable error code for this rejection
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdmissionError::DuplicateParticipant => ErrorKind::DuplicateParticipant,
            AdmissionError::InvalidCategory { .. } => ErrorKind::InvalidCategory,
            AdmissionError::InvalidGroupSize { .. } => ErrorKind::InvalidGroupSize,
        }
    }

    pub fn code(&self) -> u8 {
        self.kind().code()
    }
}

/// Custom error types for configuration and consistency failures
#[derive(Debug, thiserror::Error)]
pub enum MatchmakingError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal consistency error: {message}")]
    InternalError { message: String },
}
