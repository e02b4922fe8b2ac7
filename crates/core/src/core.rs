//! Processor core execution model.
//!
//! A core is a trace cursor plus a stall clock. Each simulated cycle the
//! owner polls it once: the core either waits out a stall, consumes one
//! trace line (dispatching the access to its cache through the bus), or
//! reports that its trace is drained.

use log::warn;

use crate::bus::Bus;
use crate::cache::Cache;
use crate::trace::{Op, ParsedLine, TraceSource};

/// Monotonic per-core counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoreStats {
    /// Cycles in which an instruction was issued.
    pub total_cycles: u64,
    /// Cycles spent stalled waiting for a miss to resolve.
    pub idle_cycles: u64,
    /// Trace instructions executed.
    pub instruction_count: u64,
}

impl CoreStats {
    /// Issue plus stall cycles; the per-core execution time.
    pub fn execution_time(&self) -> u64 {
        self.total_cycles + self.idle_cycles
    }
}

/// One processor core.
pub struct Core {
    id: usize,
    trace: Box<dyn TraceSource>,
    stalled: bool,
    stall_until_cycle: u64,
    /// Execution counters, exposed for the report.
    pub stats: CoreStats,
}

impl Core {
    /// Creates core `id` reading from `trace`.
    pub fn new(id: usize, trace: Box<dyn TraceSource>) -> Self {
        Self {
            id,
            trace,
            stalled: false,
            stall_until_cycle: 0,
            stats: CoreStats::default(),
        }
    }

    /// Core id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Advances the core by one cycle. Returns `false` once the trace is
    /// exhausted; any other outcome keeps the core active.
    ///
    /// A stalled core only accumulates idle time. Otherwise one trace line
    /// is consumed: blank and unusable lines burn the cycle without side
    /// effects, and a memory reference is issued to the cache. A miss
    /// stalls the core until `current_cycle + cycles_taken`.
    pub fn step(&mut self, current_cycle: u64, caches: &mut [Cache], bus: &mut Bus) -> bool {
        if self.stalled && current_cycle < self.stall_until_cycle {
            self.stats.idle_cycles += 1;
            return true;
        }
        self.stalled = false;

        let Some(line) = self.trace.next_line() else {
            return false;
        };
        let (op, addr) = match line {
            ParsedLine::Blank => return true,
            ParsedLine::Malformed(raw) => {
                warn!("core {}: skipping malformed trace line {raw:?}", self.id);
                return true;
            }
            ParsedLine::Unknown(op) => {
                warn!("core {}: unknown operation type '{op}'", self.id);
                return true;
            }
            ParsedLine::Access { op, addr } => (op, addr),
        };

        self.stats.instruction_count += 1;
        let access = match op {
            Op::Read => bus.read(caches, self.id, addr, current_cycle),
            Op::Write => bus.write(caches, self.id, addr, current_cycle),
        };
        self.stats.total_cycles += 1;

        if !access.hit {
            self.stalled = true;
            self.stall_until_cycle = current_cycle + access.cycles;
        }
        true
    }
}
