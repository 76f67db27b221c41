//! The collection tracer.
//!
//! [`GcTracer`] brackets collection cycles, accumulates scope samples and
//! folds every finished cycle into per-collector speed histories. It never
//! fails: contract violations are reported as diagnostics and the input
//! is clamped or ignored.

use std::cell::Cell;

use crate::api::allocation::AllocationTracker;
use crate::api::clock::Clock;
use crate::api::config::TracerConfig;
use crate::api::event::{Collector, Event, EventType, HeapSample};
use crate::api::scope::{IncrementalMarkingInfos, ScopeGuard, ScopeId};
use crate::api::stats::TracerStats;
use crate::core::ring_buffer::RingBuffer;
use crate::core::speed::{average_speed, BytesAndDuration};
use crate::diagnostics::emit::{emit, log_cycle};
use crate::diagnostics::hooks::{TracerEvent, TracerHooks};
use crate::diagnostics::kind::{Diagnostic, GT001, GT002, GT003, GT004};
use crate::util::size::KB;

/// Speed assumed for incremental marking before anything was measured.
pub const CONSERVATIVE_SPEED: f64 = (128 * KB) as f64;

/// Below this, a marking speed is treated as "no data".
const MINIMUM_MARKING_SPEED: f64 = 0.5;

/// Which bytes a scavenge speed is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScavengeSpeedMode {
    /// Everything in the young generation when the scavenge started.
    ForAllObjects,
    /// Only the objects that survived.
    ForSurvivedObjects,
}

/// Running averages of mark-compact pauses against mutator time.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MutatorUtilization {
    previous_mark_compact_end_time: Option<f64>,
    average_mark_compact_duration: f64,
    average_mutator_duration: f64,
    current: f64,
}

impl MutatorUtilization {
    fn record(&mut self, mark_compact_end_time: f64, mark_compact_duration: f64) {
        let Some(previous_end) = self.previous_mark_compact_end_time.replace(mark_compact_end_time)
        else {
            // The first mark-compact only anchors the mutator interval.
            return;
        };

        let total_duration = mark_compact_end_time - previous_end;
        let mutator_duration = total_duration - mark_compact_duration;
        if self.average_mark_compact_duration == 0.0 && self.average_mutator_duration == 0.0 {
            self.average_mark_compact_duration = mark_compact_duration;
            self.average_mutator_duration = mutator_duration;
        } else {
            self.average_mark_compact_duration =
                (self.average_mark_compact_duration + mark_compact_duration) / 2.0;
            self.average_mutator_duration = (self.average_mutator_duration + mutator_duration) / 2.0;
        }
        self.current = if total_duration == 0.0 {
            0.0
        } else {
            mutator_duration / total_duration
        };
    }

    fn average(&self) -> f64 {
        let total = self.average_mark_compact_duration + self.average_mutator_duration;
        if total == 0.0 {
            1.0
        } else {
            self.average_mutator_duration / total
        }
    }
}

impl Default for MutatorUtilization {
    fn default() -> Self {
        Self {
            previous_mark_compact_end_time: None,
            average_mark_compact_duration: 0.0,
            average_mutator_duration: 0.0,
            current: 1.0,
        }
    }
}

/// Records collection cycles and estimates collector and allocation speeds.
///
/// # Example
///
/// ```rust
/// use gctracer::{Collector, GcTracer, HeapSample, ScopeId};
///
/// let mut tracer = GcTracer::default();
///
/// tracer.start(
///     Collector::MarkCompactor,
///     "allocation failure",
///     None,
///     HeapSample::at(10.0).with_object_size(4096),
/// );
/// tracer.add_scope_sample(ScopeId::McMark, 1.5);
/// tracer.add_scope_sample(ScopeId::McSweep, 0.5);
/// tracer.stop(Collector::MarkCompactor, HeapSample::at(12.0));
///
/// assert_eq!(tracer.current_event().scope(ScopeId::McMark), 1.5);
/// assert_eq!(tracer.mark_compact_speed(), 2048.0);
/// ```
#[derive(Debug)]
pub struct GcTracer {
    config: TracerConfig,
    hooks: TracerHooks,

    /// Cycle in progress, if any.
    running: Option<Event>,
    /// Last finalized cycle, or the sentinel before the first one.
    last: Event,

    allocation: AllocationTracker,

    incremental_marking_start_time: Option<f64>,
    incremental_marking_bytes: u64,
    incremental_marking_duration: f64,
    incremental_scopes: [IncrementalMarkingInfos; ScopeId::INCREMENTAL_COUNT],
    recorded_incremental_marking_speed: f64,
    combined_mark_compact_speed_cache: Cell<f64>,

    recorded_minor_gcs_total: RingBuffer<BytesAndDuration>,
    recorded_minor_gcs_survived: RingBuffer<BytesAndDuration>,
    recorded_compactions: RingBuffer<BytesAndDuration>,
    recorded_mark_compacts: RingBuffer<BytesAndDuration>,
    recorded_incremental_mark_compacts: RingBuffer<BytesAndDuration>,
    recorded_context_disposal_times: RingBuffer<f64>,
    recorded_survival_ratios: RingBuffer<f64>,

    mutator_utilization: MutatorUtilization,
}

impl GcTracer {
    /// Create a tracer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TracerConfig::default())
    }

    /// Create a tracer with `config`.
    pub fn with_config(config: TracerConfig) -> Self {
        Self {
            config,
            hooks: TracerHooks::new(),
            running: None,
            last: Event::default(),
            allocation: AllocationTracker::new(),
            incremental_marking_start_time: None,
            incremental_marking_bytes: 0,
            incremental_marking_duration: 0.0,
            incremental_scopes: [IncrementalMarkingInfos::default(); ScopeId::INCREMENTAL_COUNT],
            recorded_incremental_marking_speed: 0.0,
            combined_mark_compact_speed_cache: Cell::new(0.0),
            recorded_minor_gcs_total: RingBuffer::new(),
            recorded_minor_gcs_survived: RingBuffer::new(),
            recorded_compactions: RingBuffer::new(),
            recorded_mark_compacts: RingBuffer::new(),
            recorded_incremental_mark_compacts: RingBuffer::new(),
            recorded_context_disposal_times: RingBuffer::new(),
            recorded_survival_ratios: RingBuffer::new(),
            mutator_utilization: MutatorUtilization::default(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Listener hooks.
    pub fn hooks_mut(&mut self) -> &mut TracerHooks {
        &mut self.hooks
    }

    /// Register a listener for tracer events.
    pub fn on_event<F>(&mut self, listener: F)
    where
        F: Fn(&TracerEvent) + Send + Sync + 'static,
    {
        self.hooks.on_event(listener);
    }

    // =========================================================================
    // Cycle bracketing
    // =========================================================================

    /// Begin a collection cycle.
    ///
    /// A mark-compact started after [`notify_incremental_marking_start`]
    /// is classified as incremental.
    ///
    /// [`notify_incremental_marking_start`]: Self::notify_incremental_marking_start
    pub fn start(
        &mut self,
        collector: Collector,
        gc_reason: &'static str,
        collector_reason: Option<&'static str>,
        heap: HeapSample,
    ) {
        if self.running.is_some() {
            self.report(&GT002);
            return;
        }

        let event_type = match collector {
            Collector::Scavenger => EventType::Scavenger,
            Collector::MinorMarkCompactor => EventType::MinorMarkCompactor,
            Collector::MarkCompactor if self.incremental_marking_start_time.is_some() => {
                EventType::IncrementalMarkCompactor
            }
            Collector::MarkCompactor => EventType::MarkCompactor,
        };

        let mut event = Event::new(event_type, gc_reason, collector_reason);
        event.start_time = heap.time_ms;
        event.start_object_size = heap.object_size;
        event.start_memory_size = heap.memory_size;
        event.young_object_size = heap.young_object_size;

        self.allocation.sample_allocation(
            heap.time_ms,
            heap.new_space_allocation_counter,
            heap.old_generation_allocation_counter,
        );

        self.hooks.emit(TracerEvent::CycleStart {
            event_type,
            time_ms: heap.time_ms,
        });
        self.running = Some(event);
    }

    /// Finish the running cycle and fold it into the speed histories.
    pub fn stop(&mut self, collector: Collector, heap: HeapSample) {
        let Some(event_type) = self.running.as_ref().map(|event| event.event_type) else {
            self.report(&GT001);
            return;
        };
        // Report before taking the event so a strict-mode panic leaves it running.
        if !event_type.matches(collector) {
            self.report(&GT003);
        }
        let Some(mut event) = self.running.take() else {
            return;
        };

        event.end_time = heap.time_ms;
        event.end_object_size = heap.object_size;
        event.end_memory_size = heap.memory_size;
        event.survived_young_object_size = heap.young_object_size;

        self.allocation.add_allocation(heap.time_ms);

        let duration = event.duration();
        match event.event_type {
            EventType::Scavenger | EventType::MinorMarkCompactor => {
                self.recorded_minor_gcs_total
                    .push(BytesAndDuration::new(event.young_object_size, duration));
                self.recorded_minor_gcs_survived
                    .push(BytesAndDuration::new(event.survived_young_object_size, duration));
            }
            EventType::IncrementalMarkCompactor => {
                event.incremental_marking_bytes = self.incremental_marking_bytes;
                event.incremental_marking_duration = self.incremental_marking_duration;
                event.set_incremental_scopes(&self.incremental_scopes);
                self.record_incremental_marking_speed(
                    event.incremental_marking_bytes,
                    event.incremental_marking_duration,
                );
                self.recorded_incremental_mark_compacts
                    .push(BytesAndDuration::new(event.start_object_size, duration));
                self.finish_mark_compact(
                    event.end_time,
                    duration + event.incremental_marking_duration,
                );
            }
            EventType::MarkCompactor => {
                self.recorded_mark_compacts
                    .push(BytesAndDuration::new(event.start_object_size, duration));
                self.finish_mark_compact(event.end_time, duration);
            }
            EventType::Start => {}
        }

        log_cycle(&event, self.config.trace_gc, self.config.trace_gc_verbose);
        self.hooks.emit(TracerEvent::CycleEnd {
            event_type: event.event_type,
            duration_ms: duration,
        });
        self.last = event;
    }

    fn finish_mark_compact(&mut self, end_time: f64, mark_compact_duration: f64) {
        self.reset_incremental_marking_counters();
        self.combined_mark_compact_speed_cache.set(0.0);
        self.mutator_utilization
            .record(end_time, mark_compact_duration);
    }

    /// Returns true between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The running cycle, or the last finalized one when idle.
    pub fn current_event(&self) -> &Event {
        self.running.as_ref().unwrap_or(&self.last)
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Report `duration_ms` spent in `scope`.
    ///
    /// Incremental scopes always accumulate, even between cycles. Regular
    /// scopes are added to the running cycle and dropped when idle.
    pub fn add_scope_sample(&mut self, scope: ScopeId, duration_ms: f64) {
        let duration_ms = if duration_ms.is_nan() || duration_ms < 0.0 {
            self.report(&GT004);
            0.0
        } else {
            duration_ms
        };

        let recorded = match scope.incremental_index() {
            Some(slot) => {
                self.incremental_scopes[slot].update(duration_ms);
                true
            }
            None => match self.running.as_mut() {
                Some(event) => {
                    event.add_scope_time(scope, duration_ms);
                    true
                }
                None => false,
            },
        };

        self.hooks.emit(TracerEvent::ScopeSample {
            scope,
            duration_ms,
            recorded,
        });
    }

    /// Time `scope` with `clock` until the returned guard is dropped.
    pub fn scope<'a, C: Clock + ?Sized>(
        &'a mut self,
        scope: ScopeId,
        clock: &'a C,
    ) -> ScopeGuard<'a, C> {
        ScopeGuard::new(self, scope, clock)
    }

    /// Pending step statistics of an incremental scope.
    ///
    /// Regular scopes have no pending statistics and report zeros.
    pub fn incremental_scope(&self, scope: ScopeId) -> IncrementalMarkingInfos {
        scope
            .incremental_index()
            .map(|slot| self.incremental_scopes[slot])
            .unwrap_or_default()
    }

    // =========================================================================
    // Allocation throughput
    // =========================================================================

    /// Observe the heap's allocation counters.
    pub fn sample_allocation(
        &mut self,
        time_ms: f64,
        new_space_counter_bytes: u64,
        old_generation_counter_bytes: u64,
    ) {
        self.allocation
            .sample_allocation(time_ms, new_space_counter_bytes, old_generation_counter_bytes);
    }

    /// Close the current allocation period.
    pub fn add_allocation(&mut self, time_ms: f64) {
        self.allocation.add_allocation(time_ms);
    }

    /// The allocation tracker.
    pub fn allocation(&self) -> &AllocationTracker {
        &self.allocation
    }

    /// Combined allocation rate over the last `time_ms` (all history if `None`).
    pub fn allocation_throughput(&self, time_ms: Option<f64>) -> f64 {
        self.allocation.allocation_throughput(time_ms)
    }

    /// New-space allocation rate over the last `time_ms`.
    pub fn new_space_allocation_throughput(&self, time_ms: Option<f64>) -> f64 {
        self.allocation.new_space_allocation_throughput(time_ms)
    }

    /// Old-generation allocation rate over the last `time_ms`.
    pub fn old_generation_allocation_throughput(&self, time_ms: Option<f64>) -> f64 {
        self.allocation.old_generation_allocation_throughput(time_ms)
    }

    /// Combined allocation rate over the standard window.
    pub fn current_allocation_throughput(&self) -> f64 {
        self.allocation.current_allocation_throughput()
    }

    /// Old-generation allocation rate over the standard window.
    pub fn current_old_generation_allocation_throughput(&self) -> f64 {
        self.allocation.current_old_generation_allocation_throughput()
    }

    // =========================================================================
    // Incremental marking
    // =========================================================================

    /// Incremental marking has begun; the next mark-compact is incremental.
    pub fn notify_incremental_marking_start(&mut self, time_ms: f64) {
        self.incremental_marking_start_time = Some(time_ms);
    }

    /// When incremental marking began, if it is in progress.
    pub fn incremental_marking_start_time(&self) -> Option<f64> {
        self.incremental_marking_start_time
    }

    /// Account one incremental marking step. Steps that marked nothing are ignored.
    pub fn add_incremental_marking_step(&mut self, duration_ms: f64, bytes: u64) {
        if bytes > 0 {
            self.incremental_marking_bytes = self.incremental_marking_bytes.saturating_add(bytes);
            self.incremental_marking_duration += duration_ms;
        }
    }

    fn record_incremental_marking_speed(&mut self, bytes: u64, duration_ms: f64) {
        if duration_ms == 0.0 || bytes == 0 {
            return;
        }
        let current_speed = bytes as f64 / duration_ms;
        if self.recorded_incremental_marking_speed == 0.0 {
            self.recorded_incremental_marking_speed = current_speed;
        } else {
            self.recorded_incremental_marking_speed =
                (self.recorded_incremental_marking_speed + current_speed) / 2.0;
        }
    }

    fn reset_incremental_marking_counters(&mut self) {
        self.incremental_marking_start_time = None;
        self.incremental_marking_bytes = 0;
        self.incremental_marking_duration = 0.0;
        for infos in &mut self.incremental_scopes {
            infos.reset_current_cycle();
        }
    }

    /// Incremental marking speed in bytes/ms.
    ///
    /// Prefers the speed recorded over past cycles, then the speed of the
    /// cycle in progress, then [`CONSERVATIVE_SPEED`].
    pub fn incremental_marking_speed(&self) -> f64 {
        if self.recorded_incremental_marking_speed != 0.0 {
            return self.recorded_incremental_marking_speed;
        }
        if self.incremental_marking_duration != 0.0 {
            return self.incremental_marking_bytes as f64 / self.incremental_marking_duration;
        }
        CONSERVATIVE_SPEED
    }

    // =========================================================================
    // Collector speeds
    // =========================================================================

    /// Scavenge speed in bytes/ms, or 0 without history.
    pub fn scavenge_speed(&self, mode: ScavengeSpeedMode) -> f64 {
        let history = match mode {
            ScavengeSpeedMode::ForAllObjects => &self.recorded_minor_gcs_total,
            ScavengeSpeedMode::ForSurvivedObjects => &self.recorded_minor_gcs_survived,
        };
        average_speed(history, BytesAndDuration::zero(), None)
    }

    /// Speed of non-incremental mark-compacts.
    pub fn mark_compact_speed(&self) -> f64 {
        average_speed(&self.recorded_mark_compacts, BytesAndDuration::zero(), None)
    }

    /// Speed of the final pause of incremental mark-compacts.
    pub fn final_incremental_mark_compact_speed(&self) -> f64 {
        average_speed(
            &self.recorded_incremental_mark_compacts,
            BytesAndDuration::zero(),
            None,
        )
    }

    /// Speed of compaction.
    pub fn compaction_speed(&self) -> f64 {
        average_speed(&self.recorded_compactions, BytesAndDuration::zero(), None)
    }

    /// Record a compaction of `live_bytes_compacted` taking `duration_ms`.
    pub fn add_compaction_event(&mut self, duration_ms: f64, live_bytes_compacted: u64) {
        self.recorded_compactions
            .push(BytesAndDuration::new(live_bytes_compacted, duration_ms));
    }

    /// Effective speed of a full mark-compact.
    ///
    /// With incremental data this combines the marking speed `s1` and the
    /// final pause speed `s2` as `s1 * s2 / (s1 + s2)`; otherwise it falls
    /// back to the non-incremental mark-compact speed. Cached until the
    /// next mark-compact finishes.
    pub fn combined_mark_compact_speed(&self) -> f64 {
        let cached = self.combined_mark_compact_speed_cache.get();
        if cached > 0.0 {
            return cached;
        }

        let marking = self.incremental_marking_speed();
        let final_pause = self.final_incremental_mark_compact_speed();
        let combined = if marking < MINIMUM_MARKING_SPEED || final_pause < MINIMUM_MARKING_SPEED {
            self.mark_compact_speed()
        } else {
            marking * final_pause / (marking + final_pause)
        };
        self.combined_mark_compact_speed_cache.set(combined);
        combined
    }

    // =========================================================================
    // Survival, context disposal, mutator utilization
    // =========================================================================

    /// Record the fraction of young objects that survived a scavenge.
    pub fn add_survival_ratio(&mut self, ratio: f64) {
        self.recorded_survival_ratios.push(ratio);
    }

    /// Mean of the recorded survival ratios, or 0 if none.
    pub fn average_survival_ratio(&self) -> f64 {
        let count = self.recorded_survival_ratios.len();
        if count == 0 {
            return 0.0;
        }
        self.recorded_survival_ratios.iter().sum::<f64>() / count as f64
    }

    /// Returns true if any survival ratio is recorded.
    pub fn survival_events_recorded(&self) -> bool {
        !self.recorded_survival_ratios.is_empty()
    }

    /// Forget recorded survival ratios.
    pub fn reset_survival_events(&mut self) {
        self.recorded_survival_ratios.reset();
    }

    /// Record that a context was disposed at `time_ms`.
    pub fn add_context_disposal_time(&mut self, time_ms: f64) {
        self.recorded_context_disposal_times.push(time_ms);
    }

    /// Mean interval between context disposals as of `now_ms`.
    ///
    /// Returns 0 until the history is full.
    pub fn context_disposal_rate(&self, now_ms: f64) -> f64 {
        let history = &self.recorded_context_disposal_times;
        if !history.is_full() {
            return 0.0;
        }
        match history.oldest() {
            Some(oldest) => (now_ms - oldest) / history.len() as f64,
            None => 0.0,
        }
    }

    /// Averaged share of time the mutator ran between mark-compacts.
    pub fn average_mark_compact_mutator_utilization(&self) -> f64 {
        self.mutator_utilization.average()
    }

    /// Mutator share of the last mark-compact interval.
    pub fn current_mark_compact_mutator_utilization(&self) -> f64 {
        self.mutator_utilization.current
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    /// Snapshot every estimate.
    pub fn stats(&self) -> TracerStats {
        TracerStats {
            scavenge_speed: self.scavenge_speed(ScavengeSpeedMode::ForAllObjects),
            survived_scavenge_speed: self.scavenge_speed(ScavengeSpeedMode::ForSurvivedObjects),
            mark_compact_speed: self.mark_compact_speed(),
            final_incremental_mark_compact_speed: self.final_incremental_mark_compact_speed(),
            combined_mark_compact_speed: self.combined_mark_compact_speed(),
            incremental_marking_speed: self.incremental_marking_speed(),
            compaction_speed: self.compaction_speed(),
            allocation_throughput: self.allocation_throughput(None),
            new_space_allocation_throughput: self.new_space_allocation_throughput(None),
            old_generation_allocation_throughput: self.old_generation_allocation_throughput(None),
            average_survival_ratio: self.average_survival_ratio(),
            average_mutator_utilization: self.average_mark_compact_mutator_utilization(),
            current_mutator_utilization: self.current_mark_compact_mutator_utilization(),
        }
    }

    /// Discard all history and return to the state of a fresh tracer.
    ///
    /// Configuration and registered listeners are kept.
    pub fn reset_for_testing(&mut self) {
        let hooks = std::mem::take(&mut self.hooks);
        *self = Self::with_config(self.config);
        self.hooks = hooks;
    }

    fn report(&self, diag: &Diagnostic) {
        self.hooks.emit(TracerEvent::Diagnostic(diag.clone()));
        emit(diag, self.config.strict);
    }
}

impl Default for GcTracer {
    fn default() -> Self {
        Self::new()
    }
}
