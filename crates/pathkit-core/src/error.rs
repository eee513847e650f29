//! Error handling for PathKit
//!
//! Provides error types for the layers of the planner:
//! - Planning errors (per command line, recoverable)
//! - Configuration errors
//! - I/O and serialization errors
//!
//! All error types use `thiserror` for ergonomic error handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Planning error type
///
/// Represents a problem with a single command line. Planning errors never
/// abort interpretation: they are collected into
/// [`Diagnostics`](crate::Diagnostics) and the rest of the program is
/// still evaluated.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanningError {
    /// Arc command without a radius and without any centre offset
    #[error("Ambiguous arc at line {line_number}: no R word and no centre offset")]
    AmbiguousArc {
        /// The line number of the arc command.
        line_number: u32,
    },

    /// Arc whose centre offset has (near) zero length
    #[error("Degenerate arc at line {line_number}: centre offset has zero radius")]
    DegenerateArc {
        /// The line number of the arc command.
        line_number: u32,
    },

    /// R-form arc whose radius cannot span the chord
    #[error("Invalid arc radius {radius} at line {line_number}: {reason}")]
    InvalidArcRadius {
        /// The line number of the arc command.
        line_number: u32,
        /// The programmed radius.
        radius: f32,
        /// Why the radius was rejected.
        reason: String,
    },

    /// Feed rate word that is zero or negative
    #[error("Non-positive feed rate {feed_rate} at line {line_number}")]
    NonPositiveFeedRate {
        /// The line number of the F word.
        line_number: u32,
        /// The rejected feed rate.
        feed_rate: f32,
    },

    /// Recognised G-code that has no implemented effect
    #[error("Unsupported G-Code at line {line_number}: G{code}")]
    UnsupportedCode {
        /// The line number where the code was found.
        line_number: u32,
        /// The canonical G-code number.
        code: String,
    },

    /// G-code absent from the modal table
    #[error("Unknown G-Code at line {line_number}: G{code}")]
    UnknownCode {
        /// The line number where the code was found.
        line_number: u32,
        /// The canonical G-code number.
        code: String,
    },
}

impl PlanningError {
    /// Source line number the error refers to
    pub fn line_number(&self) -> u32 {
        match self {
            Self::AmbiguousArc { line_number }
            | Self::DegenerateArc { line_number }
            | Self::InvalidArcRadius { line_number, .. }
            | Self::NonPositiveFeedRate { line_number, .. }
            | Self::UnsupportedCode { line_number, .. }
            | Self::UnknownCode { line_number, .. } => *line_number,
        }
    }

    /// True when the error means a motion command produced no fragment
    pub fn drops_motion(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousArc { .. } | Self::DegenerateArc { .. } | Self::InvalidArcRadius { .. }
        )
    }
}

/// Main error type for PathKit
///
/// A unified error type for the public APIs that can fail as a whole
/// (loading input, loading configuration).
#[derive(Error, Debug)]
pub enum Error {
    /// Planning error
    #[error(transparent)]
    Planning(#[from] PlanningError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a planning error
    pub fn is_planning_error(&self) -> bool {
        matches!(self, Error::Planning(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
