//! Collector scopes and RAII scope timing.
//!
//! A scope names one sub-phase of a collection. Regular scopes only mean
//! something inside a single `start`/`stop` bracket. Incremental scopes are
//! fed by many short marking steps, possibly between brackets, and are
//! accumulated until the incremental mark-compact that consumes them.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::api::clock::Clock;
use crate::api::tracer::GcTracer;

/// Whether a scope is attributed per bracket or accumulated across steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Recorded only while a cycle is running.
    Regular,
    /// Accumulated across incremental steps, running or not.
    Incremental,
}

/// A collector sub-phase.
///
/// Incremental scopes are declared first: their discriminant is also their
/// slot in the incremental accounting table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ScopeId {
    /// Incremental marking steps.
    McIncremental,
    /// Finalization of incremental marking.
    McIncrementalFinalize,
    /// Body of the finalization step.
    McIncrementalFinalizeBody,
    /// Embedder prologue callbacks during incremental marking.
    McIncrementalExternalPrologue,
    /// Embedder epilogue callbacks during incremental marking.
    McIncrementalExternalEpilogue,
    /// Wrapper tracing setup.
    McIncrementalWrapperPrologue,
    /// Incremental tracing of embedder wrappers.
    McIncrementalWrapperTracing,
    /// Concurrent sweeping finished from a marking step.
    McIncrementalSweeping,

    /// Embedder prologue callbacks.
    ExternalPrologue,
    /// Embedder epilogue callbacks.
    ExternalEpilogue,
    /// Weak global handle callbacks.
    ExternalWeakGlobalHandles,
    /// Clearing of dead references.
    McClear,
    /// Clearing of weak references.
    McClearWeakReferences,
    /// Mark-compact epilogue.
    McEpilogue,
    /// Evacuation of live objects.
    McEvacuate,
    /// Selection of evacuation candidates.
    McEvacuateCandidates,
    /// Copying of evacuated objects.
    McEvacuateCopy,
    /// Pointer updates after evacuation.
    McEvacuateUpdatePointers,
    /// Mark-compact finish.
    McFinish,
    /// Atomic marking pause.
    McMark,
    /// Completion of incremental marking in the pause.
    McMarkFinishIncremental,
    /// Root marking.
    McMarkRoots,
    /// Weak closure marking.
    McMarkWeakClosure,
    /// Mark-compact prologue.
    McPrologue,
    /// Sweeping.
    McSweep,
    /// Code space sweeping.
    McSweepCode,
    /// Map space sweeping.
    McSweepMap,
    /// Old space sweeping.
    McSweepOld,
    /// Minor mark-compact marking.
    MinorMcMark,
    /// Minor mark-compact evacuation.
    MinorMcEvacuate,
    /// Old-to-new remembered set processing.
    ScavengerOldToNewPointers,
    /// Scavenger root visiting.
    ScavengerRoots,
    /// Scavenging of reachable young objects.
    ScavengerScavenge,
    /// Semispace copying.
    ScavengerSemispace,
    /// Weak reference processing in the scavenger.
    ScavengerWeak,
}

impl ScopeId {
    /// Every scope, in discriminant order.
    pub const ALL: [ScopeId; 35] = [
        ScopeId::McIncremental,
        ScopeId::McIncrementalFinalize,
        ScopeId::McIncrementalFinalizeBody,
        ScopeId::McIncrementalExternalPrologue,
        ScopeId::McIncrementalExternalEpilogue,
        ScopeId::McIncrementalWrapperPrologue,
        ScopeId::McIncrementalWrapperTracing,
        ScopeId::McIncrementalSweeping,
        ScopeId::ExternalPrologue,
        ScopeId::ExternalEpilogue,
        ScopeId::ExternalWeakGlobalHandles,
        ScopeId::McClear,
        ScopeId::McClearWeakReferences,
        ScopeId::McEpilogue,
        ScopeId::McEvacuate,
        ScopeId::McEvacuateCandidates,
        ScopeId::McEvacuateCopy,
        ScopeId::McEvacuateUpdatePointers,
        ScopeId::McFinish,
        ScopeId::McMark,
        ScopeId::McMarkFinishIncremental,
        ScopeId::McMarkRoots,
        ScopeId::McMarkWeakClosure,
        ScopeId::McPrologue,
        ScopeId::McSweep,
        ScopeId::McSweepCode,
        ScopeId::McSweepMap,
        ScopeId::McSweepOld,
        ScopeId::MinorMcMark,
        ScopeId::MinorMcEvacuate,
        ScopeId::ScavengerOldToNewPointers,
        ScopeId::ScavengerRoots,
        ScopeId::ScavengerScavenge,
        ScopeId::ScavengerSemispace,
        ScopeId::ScavengerWeak,
    ];

    /// Number of scopes.
    pub const COUNT: usize = Self::ALL.len();

    /// Number of incremental scopes (the leading discriminants).
    pub const INCREMENTAL_COUNT: usize = 8;

    /// Static classification of this scope.
    pub const fn kind(self) -> ScopeKind {
        match self {
            ScopeId::McIncremental
            | ScopeId::McIncrementalFinalize
            | ScopeId::McIncrementalFinalizeBody
            | ScopeId::McIncrementalExternalPrologue
            | ScopeId::McIncrementalExternalEpilogue
            | ScopeId::McIncrementalWrapperPrologue
            | ScopeId::McIncrementalWrapperTracing
            | ScopeId::McIncrementalSweeping => ScopeKind::Incremental,

            ScopeId::ExternalPrologue
            | ScopeId::ExternalEpilogue
            | ScopeId::ExternalWeakGlobalHandles
            | ScopeId::McClear
            | ScopeId::McClearWeakReferences
            | ScopeId::McEpilogue
            | ScopeId::McEvacuate
            | ScopeId::McEvacuateCandidates
            | ScopeId::McEvacuateCopy
            | ScopeId::McEvacuateUpdatePointers
            | ScopeId::McFinish
            | ScopeId::McMark
            | ScopeId::McMarkFinishIncremental
            | ScopeId::McMarkRoots
            | ScopeId::McMarkWeakClosure
            | ScopeId::McPrologue
            | ScopeId::McSweep
            | ScopeId::McSweepCode
            | ScopeId::McSweepMap
            | ScopeId::McSweepOld
            | ScopeId::MinorMcMark
            | ScopeId::MinorMcEvacuate
            | ScopeId::ScavengerOldToNewPointers
            | ScopeId::ScavengerRoots
            | ScopeId::ScavengerScavenge
            | ScopeId::ScavengerSemispace
            | ScopeId::ScavengerWeak => ScopeKind::Regular,
        }
    }

    /// Returns true for scopes accumulated across incremental steps.
    pub const fn is_incremental(self) -> bool {
        matches!(self.kind(), ScopeKind::Incremental)
    }

    /// Slot of this scope in per-event duration tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Slot in the incremental accounting table, for incremental scopes.
    #[inline]
    pub const fn incremental_index(self) -> Option<usize> {
        if self.is_incremental() {
            Some(self as usize)
        } else {
            None
        }
    }

    /// Stable dotted name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            ScopeId::McIncremental => "mc.incremental",
            ScopeId::McIncrementalFinalize => "mc.incremental.finalize",
            ScopeId::McIncrementalFinalizeBody => "mc.incremental.finalize.body",
            ScopeId::McIncrementalExternalPrologue => "mc.incremental.external.prologue",
            ScopeId::McIncrementalExternalEpilogue => "mc.incremental.external.epilogue",
            ScopeId::McIncrementalWrapperPrologue => "mc.incremental.wrapper.prologue",
            ScopeId::McIncrementalWrapperTracing => "mc.incremental.wrapper.tracing",
            ScopeId::McIncrementalSweeping => "mc.incremental.sweeping",
            ScopeId::ExternalPrologue => "external.prologue",
            ScopeId::ExternalEpilogue => "external.epilogue",
            ScopeId::ExternalWeakGlobalHandles => "external.weak_global_handles",
            ScopeId::McClear => "mc.clear",
            ScopeId::McClearWeakReferences => "mc.clear.weak_references",
            ScopeId::McEpilogue => "mc.epilogue",
            ScopeId::McEvacuate => "mc.evacuate",
            ScopeId::McEvacuateCandidates => "mc.evacuate.candidates",
            ScopeId::McEvacuateCopy => "mc.evacuate.copy",
            ScopeId::McEvacuateUpdatePointers => "mc.evacuate.update_pointers",
            ScopeId::McFinish => "mc.finish",
            ScopeId::McMark => "mc.mark",
            ScopeId::McMarkFinishIncremental => "mc.mark.finish_incremental",
            ScopeId::McMarkRoots => "mc.mark.roots",
            ScopeId::McMarkWeakClosure => "mc.mark.weak_closure",
            ScopeId::McPrologue => "mc.prologue",
            ScopeId::McSweep => "mc.sweep",
            ScopeId::McSweepCode => "mc.sweep.code",
            ScopeId::McSweepMap => "mc.sweep.map",
            ScopeId::McSweepOld => "mc.sweep.old",
            ScopeId::MinorMcMark => "minor_mc.mark",
            ScopeId::MinorMcEvacuate => "minor_mc.evacuate",
            ScopeId::ScavengerOldToNewPointers => "scavenger.old_to_new_pointers",
            ScopeId::ScavengerRoots => "scavenger.roots",
            ScopeId::ScavengerScavenge => "scavenger.scavenge",
            ScopeId::ScavengerSemispace => "scavenger.semispace",
            ScopeId::ScavengerWeak => "scavenger.weak",
        }
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Step statistics for one incremental scope.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IncrementalMarkingInfos {
    /// Total time spent in the scope, in milliseconds.
    pub duration: f64,
    /// Longest single step, in milliseconds.
    pub longest_step: f64,
    /// Number of steps.
    pub steps: u32,
}

impl IncrementalMarkingInfos {
    /// Fold one step into the totals.
    pub fn update(&mut self, duration: f64) {
        self.steps = self.steps.saturating_add(1);
        self.duration += duration;
        if duration > self.longest_step {
            self.longest_step = duration;
        }
    }

    /// Clear the totals for the next cycle.
    pub fn reset_current_cycle(&mut self) {
        *self = Self::default();
    }
}

/// Times a scope and records it into the tracer when dropped.
///
/// The guard dereferences to the tracer, so nested scopes are opened from
/// the enclosing guard:
///
/// ```rust
/// use gctracer::{GcTracer, ManualClock, ScopeId};
///
/// let clock = ManualClock::new(0.0);
/// let mut tracer = GcTracer::default();
/// {
///     let mut mark = tracer.scope(ScopeId::McIncremental, &clock);
///     clock.advance(2.0);
///     {
///         let _finalize = mark.scope(ScopeId::McIncrementalFinalize, &clock);
///         clock.advance(1.0);
///     }
/// }
/// assert_eq!(tracer.incremental_scope(ScopeId::McIncremental).duration, 3.0);
/// ```
pub struct ScopeGuard<'a, C: Clock + ?Sized> {
    tracer: &'a mut GcTracer,
    clock: &'a C,
    scope: ScopeId,
    start_ms: f64,
}

impl<'a, C: Clock + ?Sized> ScopeGuard<'a, C> {
    pub(crate) fn new(tracer: &'a mut GcTracer, scope: ScopeId, clock: &'a C) -> Self {
        let start_ms = clock.now_ms();
        Self {
            tracer,
            clock,
            scope,
            start_ms,
        }
    }

    /// The scope being timed.
    pub fn scope_id(&self) -> ScopeId {
        self.scope
    }
}

impl<C: Clock + ?Sized> Deref for ScopeGuard<'_, C> {
    type Target = GcTracer;

    fn deref(&self) -> &GcTracer {
        self.tracer
    }
}

impl<C: Clock + ?Sized> DerefMut for ScopeGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut GcTracer {
        self.tracer
    }
}

impl<C: Clock + ?Sized> Drop for ScopeGuard<'_, C> {
    fn drop(&mut self) {
        let elapsed = self.clock.now_ms() - self.start_ms;
        self.tracer.add_scope_sample(self.scope, elapsed);
    }
}
