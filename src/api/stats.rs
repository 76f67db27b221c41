//! Tracer statistics.

use crate::util::size::format_speed;

/// Snapshot of every speed and ratio estimate a tracer maintains.
///
/// Speeds are in bytes/ms. Values are 0 where no history exists, except
/// the incremental marking speed, which falls back to a conservative
/// constant, and mutator utilization, which defaults to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TracerStats {
    /// Scavenge speed over all young objects.
    pub scavenge_speed: f64,

    /// Scavenge speed over surviving young objects.
    pub survived_scavenge_speed: f64,

    /// Non-incremental mark-compact speed.
    pub mark_compact_speed: f64,

    /// Speed of the final pause of incremental mark-compacts.
    pub final_incremental_mark_compact_speed: f64,

    /// Effective full mark-compact speed.
    pub combined_mark_compact_speed: f64,

    /// Incremental marking speed.
    pub incremental_marking_speed: f64,

    /// Compaction speed.
    pub compaction_speed: f64,

    /// Combined allocation throughput over all history.
    pub allocation_throughput: f64,

    /// New-space allocation throughput over all history.
    pub new_space_allocation_throughput: f64,

    /// Old-generation allocation throughput over all history.
    pub old_generation_allocation_throughput: f64,

    /// Mean scavenge survival ratio.
    pub average_survival_ratio: f64,

    /// Averaged mutator utilization between mark-compacts.
    pub average_mutator_utilization: f64,

    /// Mutator utilization of the last mark-compact interval.
    pub current_mutator_utilization: f64,
}

impl TracerStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for TracerStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "GC Tracer Statistics:")?;
        writeln!(f, "  Scavenge:              {}", format_speed(self.scavenge_speed))?;
        writeln!(f, "  Scavenge (survived):   {}", format_speed(self.survived_scavenge_speed))?;
        writeln!(f, "  Mark-compact:          {}", format_speed(self.mark_compact_speed))?;
        writeln!(
            f,
            "  Incremental final:     {}",
            format_speed(self.final_incremental_mark_compact_speed)
        )?;
        writeln!(
            f,
            "  Combined mark-compact: {}",
            format_speed(self.combined_mark_compact_speed)
        )?;
        writeln!(
            f,
            "  Incremental marking:   {}",
            format_speed(self.incremental_marking_speed)
        )?;
        writeln!(f, "  Compaction:            {}", format_speed(self.compaction_speed))?;
        writeln!(f, "  Allocation:            {}", format_speed(self.allocation_throughput))?;
        writeln!(
            f,
            "  New space:             {}",
            format_speed(self.new_space_allocation_throughput)
        )?;
        writeln!(
            f,
            "  Old generation:        {}",
            format_speed(self.old_generation_allocation_throughput)
        )?;
        writeln!(f, "  Survival ratio:        {:.2}", self.average_survival_ratio)?;
        writeln!(
            f,
            "  Mutator utilization:   {:.2} (current {:.2})",
            self.average_mutator_utilization, self.current_mutator_utilization
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_speeds() {
        let stats = TracerStats {
            mark_compact_speed: 2048.0,
            average_mutator_utilization: 0.75,
            ..TracerStats::new()
        };
        let text = stats.to_string();
        assert!(text.starts_with("GC Tracer Statistics:"));
        assert!(text.contains(&format_speed(2048.0)));
        assert!(text.contains("0.75"));
    }
}
