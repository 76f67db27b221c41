//! Tracer configuration.
//!
//! Only reporting behavior is configurable. History depth and the speed
//! clamp are fixed constants so estimates stay deterministic.

use crate::diagnostics::strict::StrictMode;

/// Configuration for a [`GcTracer`](crate::api::tracer::GcTracer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TracerConfig {
    /// Log every finalized cycle at `info` level (requires the `log` feature).
    pub trace_gc: bool,

    /// Also log the per-scope breakdown of each cycle.
    pub trace_gc_verbose: bool,

    /// How contract-violation diagnostics are treated.
    pub strict: StrictMode,
}

impl TracerConfig {
    /// No cycle logging, diagnostics only warn.
    pub fn quiet() -> Self {
        Self::default()
    }

    /// Log every cycle with its scope breakdown.
    pub fn verbose() -> Self {
        Self {
            trace_gc: true,
            trace_gc_verbose: true,
            strict: StrictMode::Warn,
        }
    }

    /// Build a config from the environment.
    ///
    /// - `GCTRACER_TRACE`: "1"/"true" enables `trace_gc`, "verbose" enables both
    /// - `GCTRACER_STRICT`: see [`StrictMode::parse`]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(val) = std::env::var("GCTRACER_TRACE") {
            config = config.with_trace_level(&val);
        }
        config.strict = StrictMode::from_env();
        config
    }

    /// Builder pattern: set trace flags from a level name.
    pub fn with_trace_level(mut self, level: &str) -> Self {
        match level.to_lowercase().as_str() {
            "1" | "true" | "on" => {
                self.trace_gc = true;
                self.trace_gc_verbose = false;
            }
            "2" | "verbose" => {
                self.trace_gc = true;
                self.trace_gc_verbose = true;
            }
            _ => {
                self.trace_gc = false;
                self.trace_gc_verbose = false;
            }
        }
        self
    }

    /// Builder pattern: enable cycle logging.
    pub fn with_trace_gc(mut self, enable: bool) -> Self {
        self.trace_gc = enable;
        self
    }

    /// Builder pattern: enable per-scope logging.
    pub fn with_trace_gc_verbose(mut self, enable: bool) -> Self {
        self.trace_gc_verbose = enable;
        self
    }

    /// Builder pattern: set strict mode.
    pub fn with_strict(mut self, strict: StrictMode) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(!TracerConfig::quiet().trace_gc);
        let verbose = TracerConfig::verbose();
        assert!(verbose.trace_gc && verbose.trace_gc_verbose);
    }

    #[test]
    fn test_trace_level() {
        let config = TracerConfig::default().with_trace_level("verbose");
        assert!(config.trace_gc && config.trace_gc_verbose);

        let config = config.with_trace_level("1");
        assert!(config.trace_gc && !config.trace_gc_verbose);

        let config = config.with_trace_level("off");
        assert_eq!(config, TracerConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = TracerConfig::default()
            .with_trace_gc(true)
            .with_trace_gc_verbose(true)
            .with_strict(StrictMode::PanicOnError);
        assert!(config.trace_gc);
        assert!(config.trace_gc_verbose);
        assert_eq!(config.strict, StrictMode::PanicOnError);
    }
}
