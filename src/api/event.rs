//! Collection cycle events.

use std::fmt;

use crate::api::scope::{IncrementalMarkingInfos, ScopeId};
use crate::util::size::format_bytes;

/// The collector a caller asks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collector {
    /// Young-generation copying collection.
    Scavenger,
    /// Full mark-compact collection.
    MarkCompactor,
    /// Young-generation mark-compact collection.
    MinorMarkCompactor,
}

/// How a finished or running event was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Young-generation scavenge.
    Scavenger,
    /// Full mark-compact without prior incremental marking.
    MarkCompactor,
    /// Final pause of an incrementally marked mark-compact.
    IncrementalMarkCompactor,
    /// Young-generation mark-compact.
    MinorMarkCompactor,
    /// Sentinel before the first cycle.
    Start,
}

impl EventType {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            EventType::Scavenger => "Scavenge",
            EventType::MarkCompactor => "Mark-Compact",
            EventType::IncrementalMarkCompactor => "Mark-Compact (incremental)",
            EventType::MinorMarkCompactor => "Minor Mark-Compact",
            EventType::Start => "Start",
        }
    }

    /// Returns true for the full-heap event types.
    pub fn is_mark_compact(&self) -> bool {
        matches!(
            self,
            EventType::MarkCompactor | EventType::IncrementalMarkCompactor
        )
    }

    /// Returns true for the young-generation event types.
    pub fn is_minor(&self) -> bool {
        matches!(self, EventType::Scavenger | EventType::MinorMarkCompactor)
    }

    /// Whether a `stop(collector)` call closes an event of this type.
    pub fn matches(&self, collector: Collector) -> bool {
        match collector {
            Collector::Scavenger => *self == EventType::Scavenger,
            Collector::MinorMarkCompactor => *self == EventType::MinorMarkCompactor,
            Collector::MarkCompactor => self.is_mark_compact(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Heap counters read by the caller at a cycle boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeapSample {
    /// Monotonic timestamp in milliseconds.
    pub time_ms: f64,
    /// Size of live objects.
    pub object_size: u64,
    /// Committed heap memory.
    pub memory_size: u64,
    /// Size of young-generation objects (survivors when read at stop).
    pub young_object_size: u64,
    /// Free-running new-space allocation counter.
    pub new_space_allocation_counter: u64,
    /// Free-running old-generation allocation counter.
    pub old_generation_allocation_counter: u64,
}

impl HeapSample {
    /// A sample at `time_ms` with all counters zero.
    pub fn at(time_ms: f64) -> Self {
        Self {
            time_ms,
            ..Self::default()
        }
    }

    /// Builder pattern: set the live object size.
    pub fn with_object_size(mut self, bytes: u64) -> Self {
        self.object_size = bytes;
        self
    }

    /// Builder pattern: set the committed memory size.
    pub fn with_memory_size(mut self, bytes: u64) -> Self {
        self.memory_size = bytes;
        self
    }

    /// Builder pattern: set the young-generation object size.
    pub fn with_young_object_size(mut self, bytes: u64) -> Self {
        self.young_object_size = bytes;
        self
    }

    /// Builder pattern: set both allocation counters.
    pub fn with_allocation_counters(mut self, new_space: u64, old_generation: u64) -> Self {
        self.new_space_allocation_counter = new_space;
        self.old_generation_allocation_counter = old_generation;
        self
    }
}

/// One collection cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// How the cycle was classified.
    pub event_type: EventType,
    /// Why the collection was requested.
    pub gc_reason: &'static str,
    /// Why this collector was chosen, if given.
    pub collector_reason: Option<&'static str>,
    /// Bracket start, in milliseconds.
    pub start_time: f64,
    /// Bracket end, in milliseconds.
    pub end_time: f64,
    /// Live object bytes when the cycle started.
    pub start_object_size: u64,
    /// Live object bytes when the cycle ended.
    pub end_object_size: u64,
    /// Committed heap bytes when the cycle started.
    pub start_memory_size: u64,
    /// Committed heap bytes when the cycle ended.
    pub end_memory_size: u64,
    /// Young-generation object size when the cycle started.
    pub young_object_size: u64,
    /// Young-generation object size when the cycle ended.
    pub survived_young_object_size: u64,
    /// Bytes marked by incremental steps before the final pause.
    pub incremental_marking_bytes: u64,
    /// Time spent in incremental steps before the final pause.
    pub incremental_marking_duration: f64,
    scopes: [f64; ScopeId::COUNT],
    incremental_marking_scopes: [IncrementalMarkingInfos; ScopeId::INCREMENTAL_COUNT],
}

impl Event {
    /// Create an event with empty scopes.
    pub fn new(
        event_type: EventType,
        gc_reason: &'static str,
        collector_reason: Option<&'static str>,
    ) -> Self {
        Self {
            event_type,
            gc_reason,
            collector_reason,
            start_time: 0.0,
            end_time: 0.0,
            start_object_size: 0,
            end_object_size: 0,
            start_memory_size: 0,
            end_memory_size: 0,
            young_object_size: 0,
            survived_young_object_size: 0,
            incremental_marking_bytes: 0,
            incremental_marking_duration: 0.0,
            scopes: [0.0; ScopeId::COUNT],
            incremental_marking_scopes: [IncrementalMarkingInfos::default();
                ScopeId::INCREMENTAL_COUNT],
        }
    }

    /// Wall time of the bracket, in milliseconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Accumulated time of `scope`, in milliseconds.
    pub fn scope(&self, scope: ScopeId) -> f64 {
        self.scopes[scope.index()]
    }

    /// Step statistics of an incremental scope as of this event.
    pub fn incremental_marking_scope(&self, scope: ScopeId) -> Option<&IncrementalMarkingInfos> {
        scope
            .incremental_index()
            .map(|i| &self.incremental_marking_scopes[i])
    }

    /// Scopes with recorded time.
    pub fn recorded_scopes(&self) -> impl Iterator<Item = (ScopeId, f64)> + '_ {
        ScopeId::ALL
            .iter()
            .map(move |&scope| (scope, self.scopes[scope.index()]))
            .filter(|(_, duration)| *duration != 0.0)
    }

    /// Sum of all recorded scope time.
    pub fn total_scope_time(&self) -> f64 {
        self.scopes.iter().sum()
    }

    pub(crate) fn add_scope_time(&mut self, scope: ScopeId, duration: f64) {
        self.scopes[scope.index()] += duration;
    }

    pub(crate) fn set_incremental_scopes(
        &mut self,
        infos: &[IncrementalMarkingInfos; ScopeId::INCREMENTAL_COUNT],
    ) {
        self.incremental_marking_scopes = *infos;
        for (slot, info) in infos.iter().enumerate() {
            self.scopes[slot] = info.duration;
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new(EventType::Start, "", None)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) -> {} ({}), {:.1} ms: {}",
            self.event_type,
            format_bytes(self.start_object_size),
            format_bytes(self.start_memory_size),
            format_bytes(self.end_object_size),
            format_bytes(self.end_memory_size),
            self.duration(),
            self.gc_reason,
        )?;
        if let Some(reason) = self.collector_reason {
            write!(f, " [{}]", reason)?;
        }
        if self.incremental_marking_duration > 0.0 {
            write!(
                f,
                " (incremental: {} in {:.1} ms)",
                format_bytes(self.incremental_marking_bytes),
                self.incremental_marking_duration,
            )?;
        }
        Ok(())
    }
}
