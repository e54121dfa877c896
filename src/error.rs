//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can report. Record-level variants are turned
//! into diagnostics by the pipeline and never abort a run; request- and
//! context-level variants abort the run and reach the caller.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::InvalidRecord {
///     field: "workerId".to_string(),
///     message: "missing".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid work record field 'workerId': missing");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A raw work record or roster entry lacks a required field.
    #[error("Invalid work record field '{field}': {message}")]
    InvalidRecord {
        /// The canonical name of the offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// An assignment time range could not be turned into a shift.
    #[error("Ambiguous assignment time range: '{range}'")]
    AmbiguousTime {
        /// The range string as entered on the roster.
        range: String,
    },

    /// No rate strategy produced a usable value for a role.
    #[error("Rate resolution failed for role '{role}': {message}")]
    RateResolution {
        /// The role being resolved.
        role: String,
        /// A description of the failure.
        message: String,
    },

    /// The requested period bounds are missing, malformed or reversed.
    #[error("Invalid payroll period: {message}")]
    InvalidPeriod {
        /// A description of the problem.
        message: String,
    },

    /// A protocol message could not be decoded.
    #[error("Malformed worker message: {message}")]
    MalformedMessage {
        /// The decoder's description of the problem.
        message: String,
    },

    /// A calculation is already running on the execution context.
    #[error("A payroll calculation is already running; cancel it first")]
    CalculationInProgress,

    /// The in-flight calculation was cancelled before it produced a result.
    #[error("Payroll calculation was cancelled")]
    Cancelled,

    /// The execution context failed to start or crashed.
    #[error("Execution context failure: {message}")]
    Execution {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
