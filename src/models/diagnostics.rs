//! Diagnostics collected during a payroll run.
//!
//! Every record or roster entry the engine drops, excludes or resolves through
//! a fallback leaves a [`Diagnostic`] behind, so nothing disappears silently.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected behaviour worth recording.
    Info,
    /// Input was dropped or resolved through a fallback.
    Warning,
    /// Something that should not happen with well-formed data.
    Error,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// A raw work record lacked a required field.
    InvalidRecord,
    /// A roster entry lacked a required field.
    InvalidRosterEntry,
    /// An assignment time range could not be parsed.
    AmbiguousAssignmentTime,
    /// A record had no usable start/end pair.
    InsufficientTimeData,
    /// A source id reached the same bucket more than once.
    DuplicateSource,
    /// The role came from a roster assignment on another date.
    RoleFromOtherDate,
    /// No role could be resolved.
    UnresolvedRole,
    /// A cancelled record was excluded.
    CancelledRecord,
    /// A rate strategy produced an unusable value.
    RateResolution,
    /// A record was matched to a worker by display name.
    WorkerMatchedByName,
    /// A line's amounts did not fit in a `Decimal` and the line was dropped.
    AmountOverflow,
}

/// One observation about the input.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Diagnostic, DiagnosticCode, Severity};
///
/// let diagnostic = Diagnostic::warning(DiagnosticCode::UnresolvedRole, "no role")
///     .with_worker("worker_a")
///     .with_record("log_001");
/// assert_eq!(diagnostic.severity, Severity::Warning);
/// assert_eq!(diagnostic.worker_id.as_deref(), Some("worker_a"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// What happened.
    pub code: DiagnosticCode,
    /// How serious it is.
    pub severity: Severity,
    /// Human-readable detail.
    pub message: String,
    /// Worker concerned, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    /// Date concerned, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Source record concerned, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with no subject attached.
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            worker_id: None,
            date: None,
            record_id: None,
        }
    }

    /// Shorthand for an info diagnostic.
    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    /// Shorthand for a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    /// Shorthand for an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    /// Attaches the worker.
    pub fn with_worker(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }

    /// Attaches the date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Attaches the source record.
    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }
}

/// Ordered collection of the diagnostics raised by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Number of diagnostics with the given code.
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.entries.iter().filter(|d| d.code == code).count()
    }

    /// Total number of diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in the order the diagnostics were raised.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Consumes the collection.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
