//! Error types for collaborative filtering operations.
//!
//! Data and shape errors are fatal and surface to the caller. Sparse-data
//! gaps (a neighbor that never rated the target item) are not errors and
//! never appear here.

use std::path::PathBuf;
use thiserror::Error;

use crate::data::{ItemId, UserId};

/// Main error type for `usercf` operations.
///
/// # Examples
///
/// ```
/// use usercf::error::CfError;
///
/// let err = CfError::LengthMismatch {
///     predictions: 3,
///     targets: 2,
/// };
/// assert!(err.to_string().contains("length mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum CfError {
    /// Rating inputs are absent or empty; nothing can be computed.
    #[error("missing rating data: {0}")]
    MissingData(String),

    /// A user inside the scanned ID range has no ratings, so no mean exists.
    #[error("user {user} has no ratings; average is undefined")]
    EmptyUser {
        /// Offending user
        user: UserId,
    },

    /// Correlation denominator is zero (one of the users rated everything
    /// identically).
    #[error("degenerate similarity between user {user} and user {neighbor}: zero rating variance")]
    DegenerateSimilarity {
        /// User whose neighborhood was being computed
        user: UserId,
        /// Candidate neighbor
        neighbor: UserId,
    },

    /// Prediction and target sequences differ in length.
    #[error("length mismatch: {predictions} predictions vs {targets} targets")]
    LengthMismatch {
        /// Number of predictions
        predictions: usize,
        /// Number of targets
        targets: usize,
    },

    /// An aggregate was requested over zero elements.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Prediction requested for a user that has no profile.
    #[error("unknown user {user}")]
    UnknownUser {
        /// Requested user
        user: UserId,
    },

    /// A user ID too large to give every ID up to it a slot.
    #[error("user id {user} is out of range for the neighborhood pass")]
    UserIdOutOfRange {
        /// Offending user
        user: UserId,
    },

    /// The rating index violates its own cross-reference invariant.
    #[error("inconsistent rating index at (user {user}, item {item}): {reason}")]
    InconsistentIndex {
        /// User of the offending pair
        user: UserId,
        /// Item of the offending pair
        item: ItemId,
        /// What is missing
        reason: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Malformed rating file.
    #[error("parse error in {}{}: {cause}", .file.display(), line_suffix(.line))]
    ParseError {
        /// Source file
        file: PathBuf,
        /// 1-based line number, if known
        line: Option<usize>,
        /// Description
        cause: String,
    },

    /// Malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The neighborhood pass was cancelled before completion.
    #[error("neighborhood computation cancelled")]
    Cancelled,
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(":{l}")).unwrap_or_default()
}

impl CfError {
    /// Create an invalid hyperparameter error.
    #[must_use]
    pub fn invalid_hyperparameter(
        param: &str,
        value: impl ToString,
        constraint: &str,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput(context.to_string())
    }
}

impl From<toml::de::Error> for CfError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, CfError>;
