//! Strict mode handling for diagnostics.
//!
//! Allows configuration of how diagnostics are treated:
//! - Warn: Just emit the diagnostic
//! - Panic: Emit and then panic (useful for CI)
//!
//! Strict mode is carried per tracer in
//! [`TracerConfig`](crate::api::config::TracerConfig), so tests can run
//! tracers with different modes side by side.

use super::kind::DiagnosticKind;

/// Strict mode behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrictMode {
    /// Just warn, don't panic.
    #[default]
    Warn,
    /// Panic on errors.
    PanicOnError,
    /// Panic on errors and warnings.
    PanicOnWarning,
}

impl StrictMode {
    /// Parse a mode name.
    ///
    /// - "0" or "warn" -> Warn
    /// - "1" or "error" -> PanicOnError
    /// - "2" or "warning" -> PanicOnWarning
    pub fn parse(val: &str) -> Self {
        match val.to_lowercase().as_str() {
            "0" | "warn" | "false" => StrictMode::Warn,
            "1" | "error" | "true" => StrictMode::PanicOnError,
            "2" | "warning" | "all" => StrictMode::PanicOnWarning,
            _ => StrictMode::Warn,
        }
    }

    /// Read the `GCTRACER_STRICT` environment variable.
    pub fn from_env() -> Self {
        std::env::var("GCTRACER_STRICT")
            .map(|val| Self::parse(&val))
            .unwrap_or_default()
    }

    /// Check if a diagnostic of `kind` should panic under this mode.
    pub fn should_panic(&self, kind: DiagnosticKind) -> bool {
        match kind {
            DiagnosticKind::Error => {
                matches!(self, StrictMode::PanicOnError | StrictMode::PanicOnWarning)
            }
            DiagnosticKind::Warning => matches!(self, StrictMode::PanicOnWarning),
            DiagnosticKind::Note => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_mode_default() {
        let mode = StrictMode::default();
        assert_eq!(mode, StrictMode::Warn);
        assert!(!mode.should_panic(DiagnosticKind::Error));
    }

    #[test]
    fn test_strict_mode_panic_on_error() {
        let mode = StrictMode::PanicOnError;
        assert!(mode.should_panic(DiagnosticKind::Error));
        assert!(!mode.should_panic(DiagnosticKind::Warning));
    }

    #[test]
    fn test_strict_mode_panic_on_warning() {
        let mode = StrictMode::PanicOnWarning;
        assert!(mode.should_panic(DiagnosticKind::Error));
        assert!(mode.should_panic(DiagnosticKind::Warning));
        assert!(!mode.should_panic(DiagnosticKind::Note));
    }

    #[test]
    fn test_parse() {
        assert_eq!(StrictMode::parse("ERROR"), StrictMode::PanicOnError);
        assert_eq!(StrictMode::parse("2"), StrictMode::PanicOnWarning);
        assert_eq!(StrictMode::parse("bogus"), StrictMode::Warn);
        assert_eq!(StrictMode::parse("0"), StrictMode::Warn);
    }
}
