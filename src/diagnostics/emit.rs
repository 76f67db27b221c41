//! Diagnostic and cycle-log emission backend.
//!
//! Handles outputting diagnostics to stderr or the log crate, and logging
//! finalized cycles when the `log` feature is enabled.

#[cfg(all(not(feature = "log"), any(debug_assertions, feature = "diagnostics")))]
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use super::kind::Diagnostic;
use super::strict::StrictMode;
use crate::api::event::Event;

/// Global flag to suppress diagnostic output (for testing).
static DIAGNOSTICS_SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Suppress all diagnostic output. Strict-mode panics still happen.
pub fn suppress_diagnostics(suppress: bool) {
    DIAGNOSTICS_SUPPRESSED.store(suppress, Ordering::Relaxed);
}

/// Check if diagnostics are suppressed.
pub fn is_suppressed() -> bool {
    DIAGNOSTICS_SUPPRESSED.load(Ordering::Relaxed)
}

/// Emit a diagnostic.
///
/// With the `log` feature the diagnostic goes to the log crate. Otherwise
/// it goes to stderr in debug builds, or in release builds with the
/// `diagnostics` feature.
pub fn emit(diag: &Diagnostic, strict: StrictMode) {
    if !is_suppressed() {
        #[cfg(feature = "log")]
        emit_to_log(diag);

        #[cfg(all(not(feature = "log"), any(debug_assertions, feature = "diagnostics")))]
        emit_to_stderr(diag);
    }

    if strict.should_panic(diag.kind) {
        panic!(
            "[gctracer][{}] {}\nStrict mode enabled - contract violations are fatal.",
            diag.code, diag.message
        );
    }
}

/// Internal: emit to stderr.
#[cfg(all(not(feature = "log"), any(debug_assertions, feature = "diagnostics")))]
fn emit_to_stderr(diag: &Diagnostic) {
    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "{}", diag);

    if let Some(note) = diag.note {
        let _ = writeln!(stderr, "  note: {}", note);
    }

    if let Some(help) = diag.help {
        let _ = writeln!(stderr, "  help: {}", help);
    }

    let _ = writeln!(stderr);
}

/// Emit a diagnostic using the log crate.
#[cfg(feature = "log")]
fn emit_to_log(diag: &Diagnostic) {
    use super::kind::DiagnosticKind;

    match diag.kind {
        DiagnosticKind::Error => {
            log::error!("[{}] {}", diag.code, diag.message);
        }
        DiagnosticKind::Warning => {
            log::warn!("[{}] {}", diag.code, diag.message);
        }
        DiagnosticKind::Note => {
            log::info!("[{}] {}", diag.code, diag.message);
        }
    }

    if let Some(note) = diag.note {
        log::debug!("  note: {}", note);
    }
    if let Some(help) = diag.help {
        log::debug!("  help: {}", help);
    }
}

/// Log a finalized cycle.
///
/// Cycles are logged at `debug`; `trace_gc` promotes them to `info` and
/// `verbose` adds one line per recorded scope.
#[cfg(feature = "log")]
pub fn log_cycle(event: &Event, trace_gc: bool, verbose: bool) {
    let level = if trace_gc {
        log::Level::Info
    } else {
        log::Level::Debug
    };
    log::log!(level, "[gctracer] {}", event);

    if verbose {
        for (scope, duration) in event.recorded_scopes() {
            log::log!(level, "[gctracer]   {:<36} {:>8.2} ms", scope.name(), duration);
        }
    }
}

/// Log a finalized cycle (no-op without the `log` feature).
#[cfg(not(feature = "log"))]
pub fn log_cycle(_event: &Event, _trace_gc: bool, _verbose: bool) {}
