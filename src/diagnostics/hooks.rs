//! Tracer hooks for profilers and debug UIs.
//!
//! Listeners are boxed once at registration; emitting an event never
//! allocates.

use crate::api::event::EventType;
use crate::api::scope::ScopeId;
use crate::diagnostics::kind::Diagnostic;

/// Events the tracer reports to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum TracerEvent {
    /// A cycle was started.
    CycleStart {
        event_type: EventType,
        time_ms: f64,
    },
    /// A cycle was finalized.
    CycleEnd {
        event_type: EventType,
        duration_ms: f64,
    },
    /// A scope sample was reported.
    ScopeSample {
        scope: ScopeId,
        duration_ms: f64,
        /// False when a regular scope arrived outside a cycle.
        recorded: bool,
    },
    /// A caller contract violation was detected.
    Diagnostic(Diagnostic),
}

/// Callback type for tracer events.
pub type TracerCallback = Box<dyn Fn(&TracerEvent) + Send + Sync>;

/// Hooks for external tools.
pub struct TracerHooks {
    listeners: Vec<TracerCallback>,
    enabled: bool,
}

impl TracerHooks {
    /// Create hooks with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            enabled: true,
        }
    }

    /// Register an event listener.
    pub fn on_event<F>(&mut self, listener: F)
    where
        F: Fn(&TracerEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Remove all listeners.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Enable or disable event delivery.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if any listener would receive events.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.listeners.is_empty()
    }

    /// Deliver an event to every listener.
    pub fn emit(&self, event: TracerEvent) {
        if !self.is_active() {
            return;
        }
        for listener in &self.listeners {
            listener(&event);
        }
    }
}

impl Default for TracerHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TracerHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracerHooks")
            .field("listeners", &self.listeners.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}
