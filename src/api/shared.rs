//! A tracer shared between threads.
//!
//! [`GcTracer`] keeps its combined-speed cache in a `Cell`, so it is `Send`
//! but not `Sync`. `SharedTracer` puts it behind the crate mutex so worker
//! threads can report scope samples while the main thread brackets cycles.

use std::sync::Arc;

use crate::api::config::TracerConfig;
use crate::api::event::{Collector, HeapSample};
use crate::api::scope::ScopeId;
use crate::api::stats::TracerStats;
use crate::api::tracer::GcTracer;
use crate::sync::mutex::Mutex;

/// Cloneable handle to a mutex-protected [`GcTracer`].
#[derive(Clone)]
pub struct SharedTracer {
    inner: Arc<Mutex<GcTracer>>,
}

impl SharedTracer {
    /// Create a shared tracer with `config`.
    pub fn new(config: TracerConfig) -> Self {
        Self::from_tracer(GcTracer::with_config(config))
    }

    /// Share an existing tracer.
    pub fn from_tracer(tracer: GcTracer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracer)),
        }
    }

    /// Run `f` with exclusive access to the tracer.
    pub fn with<R>(&self, f: impl FnOnce(&mut GcTracer) -> R) -> R {
        let mut tracer = self.inner.lock();
        f(&mut tracer)
    }

    /// See [`GcTracer::start`].
    pub fn start(
        &self,
        collector: Collector,
        gc_reason: &'static str,
        collector_reason: Option<&'static str>,
        heap: HeapSample,
    ) {
        self.with(|t| t.start(collector, gc_reason, collector_reason, heap));
    }

    /// See [`GcTracer::stop`].
    pub fn stop(&self, collector: Collector, heap: HeapSample) {
        self.with(|t| t.stop(collector, heap));
    }

    /// See [`GcTracer::add_scope_sample`].
    pub fn add_scope_sample(&self, scope: ScopeId, duration_ms: f64) {
        self.with(|t| t.add_scope_sample(scope, duration_ms));
    }

    /// Snapshot the tracer's estimates.
    pub fn stats(&self) -> TracerStats {
        self.with(|t| t.stats())
    }
}

impl Default for SharedTracer {
    fn default() -> Self {
        Self::from_tracer(GcTracer::default())
    }
}

impl std::fmt::Debug for SharedTracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTracer")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
