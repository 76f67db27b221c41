//! Diagnostic kinds and predefined tracer diagnostics.
//!
//! Mirrors rustc's diagnostic levels for familiar UX.

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A hard error - the caller broke the tracer's contract.
    Error,
    /// A warning - the input was suspicious and has been clamped.
    Warning,
    /// Additional context about another diagnostic.
    Note,
}

impl DiagnosticKind {
    /// Get the display prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Note => "note",
        }
    }
}

/// A diagnostic message with code, message, and optional context.
///
/// Diagnostic codes follow the pattern:
/// - `GT0xx` - Cycle bracketing and scope sampling issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub kind: DiagnosticKind,
    /// Diagnostic code (e.g., "GT001").
    pub code: &'static str,
    /// Primary message.
    pub message: &'static str,
    /// Optional additional context.
    pub note: Option<&'static str>,
    /// Optional fix suggestion.
    pub help: Option<&'static str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub const fn error(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic.
    pub const fn warning(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Add a note to this diagnostic.
    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Add a help message to this diagnostic.
    pub const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[gctracer][{}] {}: {}", self.code, self.kind.prefix(), self.message)
    }
}

// =============================================================================
// Predefined diagnostics (GT0xx - Cycle bracketing)
// =============================================================================

/// GT001: `stop` without a running cycle.
pub const GT001: Diagnostic = Diagnostic::error(
    "GT001",
    "stop() called while no collection cycle is running"
).with_note("the call was ignored and no speed sample was recorded")
 .with_help("pair every stop() with a preceding start()");

/// GT002: `start` while a cycle is running.
pub const GT002: Diagnostic = Diagnostic::error(
    "GT002",
    "start() called while a collection cycle is already running"
).with_note("the running cycle was kept and the new start was ignored")
 .with_help("stop() the running cycle before starting another");

/// GT003: `stop` with a collector that doesn't match the running event.
pub const GT003: Diagnostic = Diagnostic::warning(
    "GT003",
    "stop() collector does not match the running event"
).with_note("the running event was finalized under its own type");

/// GT004: Negative or NaN scope duration.
pub const GT004: Diagnostic = Diagnostic::warning(
    "GT004",
    "negative or NaN scope duration reported"
).with_note("the duration was clamped to zero")
 .with_help("check that scope timestamps come from a monotonic clock");
