use std::fmt;

use crate::stream::TimeAccumulator;
use crate::types::{AccessDirection, EventKind, TraceEvent};

/// Aggregate counters over a trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub instructions: u64,
    pub reads: u64,
    pub read_bytes: u64,
    pub writes: u64,
    pub write_bytes: u64,
    /// Set by [`TraceStats::finish`].
    pub duration: u64,
}

impl TraceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &TraceEvent) {
        match &event.kind {
            EventKind::Instruction => self.instructions += 1,
            EventKind::Memory(access) => match access.direction {
                AccessDirection::Read => {
                    self.reads += 1;
                    self.read_bytes += u64::from(access.width);
                }
                AccessDirection::Write => {
                    self.writes += 1;
                    self.write_bytes += u64::from(access.width);
                }
            },
        }
    }

    /// Capture the trace duration from the final clock state.
    ///
    /// The duration counts both end points, `acctime - start + 1`. A trace
    /// without any events has a duration of 0.
    pub fn finish(&mut self, clock: &TimeAccumulator) {
        self.duration = if self.events() == 0 {
            0
        } else {
            let start = clock.start_time().unwrap_or(0);
            clock.acctime() - start + 1
        };
    }

    pub fn events(&self) -> u64 {
        self.instructions + self.reads + self.writes
    }
}

impl fmt::Display for TraceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#instructions: {}", self.instructions)?;
        writeln!(f, "#memR:         {}", self.reads)?;
        writeln!(f, "#memR_bytes    {}", self.read_bytes)?;
        writeln!(f, "#memW:         {}", self.writes)?;
        writeln!(f, "#memW_bytes    {}", self.write_bytes)?;
        write!(f, "duration:      {}", self.duration)
    }
}
