//! # gctracer
//!
//! Garbage-collection cycle tracing and speed estimation.
//!
//! ## Features
//!
//! - Cycle bracketing for scavenges, minor and full mark-compacts
//! - Per-phase scope timing with RAII guards
//! - Incremental marking step accounting across cycles
//! - Bounded speed histories (scavenge, mark-compact, compaction)
//! - Allocation throughput over a sliding time window
//! - Survival ratio, context disposal rate and mutator utilization
//! - Coded diagnostics with strict mode and listener hooks
//! - Optional `log` integration for per-cycle trace lines
//!
//! ## Quick Start
//!
//! ```rust
//! use gctracer::{Collector, GcTracer, HeapSample, ScopeId, TracerConfig};
//!
//! let mut tracer = GcTracer::with_config(TracerConfig::from_env());
//!
//! tracer.start(
//!     Collector::Scavenger,
//!     "allocation failure",
//!     None,
//!     HeapSample::at(0.0).with_young_object_size(1 << 20),
//! );
//! tracer.add_scope_sample(ScopeId::ScavengerRoots, 0.25);
//! tracer.stop(
//!     Collector::Scavenger,
//!     HeapSample::at(2.0).with_young_object_size(1 << 18),
//! );
//!
//! println!("{}", tracer.stats());
//! ```

pub mod api;
pub mod diagnostics;

mod core;
mod sync;
mod util;

// Re-export public API at crate root for convenience
pub use api::allocation::{AllocationObservation, AllocationTracker, THROUGHPUT_TIME_FRAME_MS};
pub use api::clock::{Clock, ManualClock, MonotonicClock};
pub use api::config::TracerConfig;
pub use api::event::{Collector, Event, EventType, HeapSample};
pub use api::scope::{IncrementalMarkingInfos, ScopeGuard, ScopeId, ScopeKind};
pub use api::shared::SharedTracer;
pub use api::stats::TracerStats;
pub use api::tracer::{GcTracer, ScavengeSpeedMode, CONSERVATIVE_SPEED};

// History and speed primitives
pub use crate::core::ring_buffer::{RingBuffer, RING_BUFFER_SIZE};
pub use crate::core::speed::{average_speed, BytesAndDuration, MAX_SPEED, MIN_SPEED};

// Size helpers
pub use util::size::{format_bytes, format_speed, kb, mb, GB, KB, MB};

// Diagnostics
pub use diagnostics::{suppress_diagnostics, TracerEvent, TracerHooks};
pub use diagnostics::{Diagnostic, DiagnosticKind, StrictMode};
pub use diagnostics::{GT001, GT002, GT003, GT004};
