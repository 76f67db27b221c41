//! Diagnostics, cycle logging and listener hooks.
//!
//! The tracer never fails. When a caller breaks its contract the tracer
//! reports a coded diagnostic, clamps or ignores the input, and carries on.
//!
//! ## Diagnostic Codes
//!
//! | Code  | Meaning                                   |
//! |-------|-------------------------------------------|
//! | GT001 | `stop()` with no running cycle            |
//! | GT002 | `start()` while a cycle is running        |
//! | GT003 | `stop()` collector mismatch               |
//! | GT004 | negative or NaN scope duration            |
//!
//! Set `GCTRACER_STRICT=error` (or use [`StrictMode`] in the tracer config)
//! to turn these into panics in CI.

pub mod emit;
pub mod hooks;
pub mod kind;
pub mod strict;

pub use emit::{emit, is_suppressed, suppress_diagnostics};
pub use hooks::{TracerCallback, TracerEvent, TracerHooks};
pub use kind::{Diagnostic, DiagnosticKind, GT001, GT002, GT003, GT004};
pub use strict::StrictMode;
