//! Per-core L1 cache model with MESI coherence state.
//!
//! This module implements the private write-back L1 cache attached to each
//! core. It provides:
//! 1. **Line and set structures:** tag/state/dirty metadata with LRU
//!    replacement (lowest way index breaks cold-start ties).
//! 2. **Local operations:** the read/write probes, the fill path with
//!    eviction and writeback bookkeeping, and upgrade completion.
//! 3. **Snoop handlers:** the cache's reactions to peer bus transactions,
//!    reported as outcomes the bus turns into latency and traffic.
//!
//! Blocks carry no data bytes; only tags and coherence state are modeled.

use std::fmt;

use log::trace;

use crate::common::addr::AddrParts;
use crate::config::{CacheParams, TimingConfig};

/// MESI coherence state of one cache line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MesiState {
    /// Sole valid copy, newer than memory.
    Modified,
    /// Sole valid copy, clean.
    Exclusive,
    /// One of possibly several clean copies.
    Shared,
    /// No coherence obligation; the line contributes no hit.
    Invalid,
}

impl fmt::Display for MesiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MesiState::Modified => "M",
            MesiState::Exclusive => "E",
            MesiState::Shared => "S",
            MesiState::Invalid => "I",
        };
        f.write_str(s)
    }
}

/// What replacing a line cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvictionKind {
    /// An unused way was free; nothing was evicted.
    None,
    /// A valid clean line was dropped.
    Clean,
    /// A valid dirty line was dropped and must be written back.
    Dirty,
}

/// Metadata for one cache block.
///
/// Lines are constructed invalid once per set and reused in place across
/// evictions; only the metadata mutates.
#[derive(Clone, Debug)]
pub struct CacheLine {
    /// Whether the line holds a block at all.
    pub valid: bool,
    /// Address tag of the held block.
    pub tag: u32,
    /// MESI coherence state. `valid == false` implies `Invalid`; a snooped
    /// invalidation leaves `valid` set with state `Invalid`.
    pub state: MesiState,
    /// Set only while the line is `Modified`.
    pub dirty: bool,
    /// Cycle stamp of the last access, for LRU selection.
    pub last_access: u64,
}

impl CacheLine {
    fn new() -> Self {
        Self {
            valid: false,
            tag: 0,
            state: MesiState::Invalid,
            dirty: false,
            last_access: 0,
        }
    }
}

/// One set of `E` lines.
pub struct CacheSet {
    lines: Vec<CacheLine>,
}

impl CacheSet {
    /// Creates a set of `ways` invalid lines.
    pub fn new(ways: usize) -> Self {
        Self {
            lines: (0..ways).map(|_| CacheLine::new()).collect(),
        }
    }

    fn find_way(&self, tag: u32) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Returns the unique valid line carrying `tag`, if any.
    pub fn find_line(&self, tag: u32) -> Option<&CacheLine> {
        self.find_way(tag).map(|way| &self.lines[way])
    }

    /// Mutable variant of [`find_line`](Self::find_line).
    pub fn find_line_mut(&mut self, tag: u32) -> Option<&mut CacheLine> {
        self.find_way(tag).map(|way| &mut self.lines[way])
    }

    /// Selects the way a new block should land in.
    ///
    /// An unused way wins outright. Otherwise the valid line with the
    /// smallest `last_access` is the victim; ties (possible only at cold
    /// start) go to the lowest way index, keeping runs reproducible.
    pub fn find_replacement(&self) -> (usize, EvictionKind) {
        if let Some(way) = self.lines.iter().position(|line| !line.valid) {
            return (way, EvictionKind::None);
        }
        let mut victim = 0;
        for (way, line) in self.lines.iter().enumerate() {
            if line.last_access < self.lines[victim].last_access {
                victim = way;
            }
        }
        let kind = if self.lines[victim].dirty {
            EvictionKind::Dirty
        } else {
            EvictionKind::Clean
        };
        (victim, kind)
    }

    /// Stamps `way` as accessed on `cycle`.
    pub fn update_lru(&mut self, way: usize, cycle: u64) {
        self.lines[way].last_access = cycle;
    }
}

/// Outcome of the local phase of a read or write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalAccess {
    /// The access completed against a valid local line.
    Hit {
        /// A write hit a `Shared` line and must broadcast an upgrade
        /// before the local transition to `Modified` completes.
        needs_upgrade: bool,
    },
    /// No usable local line; a bus transaction and a fill are required.
    Miss,
}

/// Monotonic per-cache access counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct CacheStats {
    /// Read accesses issued to this cache.
    pub read_count: u64,
    /// Write accesses issued to this cache.
    pub write_count: u64,
    /// Reads that required a bus transaction.
    pub read_misses: u64,
    /// Writes that required a bus transaction.
    pub write_misses: u64,
    /// Valid lines displaced by fills.
    pub evictions: u64,
    /// Dirty evictions flushed to memory.
    pub writebacks: u64,
}

impl CacheStats {
    /// Combined miss rate over all accesses; `0.0` before any access.
    pub fn miss_rate(&self) -> f64 {
        let accesses = self.read_count + self.write_count;
        if accesses == 0 {
            return 0.0;
        }
        (self.read_misses + self.write_misses) as f64 / accesses as f64
    }
}

/// Private write-back L1 cache for one core.
pub struct Cache {
    id: usize,
    params: CacheParams,
    /// Cycles a peer pays to ship one whole block over the bus.
    block_transfer_cycles: u64,
    sets: Vec<CacheSet>,
    /// Access counters, exposed for the report.
    pub stats: CacheStats,
}

impl Cache {
    /// Creates the cache for core `id` with the given geometry and timing.
    pub fn new(id: usize, params: CacheParams, timing: &TimingConfig) -> Self {
        Self {
            id,
            params,
            block_transfer_cycles: timing.block_transfer_cycles(params.block_bytes()),
            sets: (0..params.num_sets())
                .map(|_| CacheSet::new(params.ways))
                .collect(),
            stats: CacheStats::default(),
        }
    }

    /// Core id this cache belongs to.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Cache geometry.
    pub fn params(&self) -> &CacheParams {
        &self.params
    }

    /// Block size in bytes.
    pub fn block_bytes(&self) -> u32 {
        self.params.block_bytes()
    }

    fn decompose(&self, addr: u32) -> AddrParts {
        AddrParts::decompose(addr, self.params.set_bits, self.params.block_bits)
    }

    /// Local phase of a read: counts the access and answers from a valid
    /// line when possible, stamping the LRU clock on a hit.
    pub fn begin_read(&mut self, addr: u32, cycle: u64) -> LocalAccess {
        self.stats.read_count += 1;
        let AddrParts { tag, set, .. } = self.decompose(addr);
        let set = &mut self.sets[set];
        if let Some(way) = set.find_way(tag) {
            if set.lines[way].state != MesiState::Invalid {
                set.update_lru(way, cycle);
                return LocalAccess::Hit {
                    needs_upgrade: false,
                };
            }
        }
        self.stats.read_misses += 1;
        LocalAccess::Miss
    }

    /// Local phase of a write.
    ///
    /// A `Modified` hit completes in place; an `Exclusive` hit transitions
    /// silently to `Modified`; a `Shared` hit reports that a bus upgrade is
    /// still required before [`finish_upgrade`](Self::finish_upgrade).
    pub fn begin_write(&mut self, addr: u32, cycle: u64) -> LocalAccess {
        self.stats.write_count += 1;
        let AddrParts { tag, set, .. } = self.decompose(addr);
        let set = &mut self.sets[set];
        if let Some(way) = set.find_way(tag) {
            if set.lines[way].state != MesiState::Invalid {
                set.update_lru(way, cycle);
                let line = &mut set.lines[way];
                let needs_upgrade = match line.state {
                    MesiState::Exclusive => {
                        line.state = MesiState::Modified;
                        line.dirty = true;
                        false
                    }
                    MesiState::Shared => true,
                    // Modified: write absorbed in place.
                    _ => false,
                };
                return LocalAccess::Hit { needs_upgrade };
            }
        }
        self.stats.write_misses += 1;
        LocalAccess::Miss
    }

    /// Completes a `Shared` write hit after the bus upgrade transaction:
    /// the line becomes `Modified` and dirty.
    pub fn finish_upgrade(&mut self, addr: u32) {
        let AddrParts { tag, set, .. } = self.decompose(addr);
        if let Some(line) = self.sets[set].find_line_mut(tag) {
            line.state = MesiState::Modified;
            line.dirty = true;
        }
    }

    /// Installs a block after a miss, evicting per LRU when the set is full.
    ///
    /// Bumps `evictions` when a valid line is displaced and `writebacks`
    /// when that line was dirty; the caller converts the returned
    /// [`EvictionKind`] into writeback latency.
    pub fn fill(&mut self, addr: u32, cycle: u64, state: MesiState, dirty: bool) -> EvictionKind {
        let AddrParts { tag, set, .. } = self.decompose(addr);
        // A snoop-invalidated copy of this block keeps its valid bit; it is
        // reclaimed in place so a tag never occupies two ways of one set.
        let (way, evicted) = match self.sets[set].find_way(tag) {
            Some(way) => (way, EvictionKind::None),
            None => self.sets[set].find_replacement(),
        };
        match evicted {
            EvictionKind::None => {}
            EvictionKind::Clean => self.stats.evictions += 1,
            EvictionKind::Dirty => {
                self.stats.evictions += 1;
                self.stats.writebacks += 1;
            }
        }
        let line = &mut self.sets[set].lines[way];
        line.valid = true;
        line.tag = tag;
        line.state = state;
        line.dirty = dirty;
        line.last_access = cycle;
        evicted
    }

    /// Reacts to a peer's read transaction.
    ///
    /// A valid `Modified`/`Exclusive` line downgrades to `Shared` (clearing
    /// dirty) and supplies the block; a `Shared` line supplies without a
    /// state change. Returns the transfer cycles when supplying.
    pub fn snoop_read(&mut self, addr: u32) -> Option<u64> {
        let AddrParts { tag, set, .. } = self.decompose(addr);
        let line = self.sets[set].find_line_mut(tag)?;
        match line.state {
            MesiState::Modified => {
                line.state = MesiState::Shared;
                line.dirty = false;
            }
            MesiState::Exclusive => line.state = MesiState::Shared,
            MesiState::Shared => {}
            MesiState::Invalid => return None,
        }
        trace!(
            "cache {}: supplying block {:#010x} ({} cycles)",
            self.id,
            addr,
            self.block_transfer_cycles
        );
        Some(self.block_transfer_cycles)
    }

    /// Reacts to a peer's write transaction: drops a `Shared` or
    /// `Exclusive` copy. Returns whether a line was actually invalidated.
    ///
    /// A `Modified` copy never reaches this handler in that state: the
    /// write transaction's read phase has already downgraded it to
    /// `Shared`, and that ordering is load-bearing for the invalidation
    /// count.
    pub fn snoop_write(&mut self, addr: u32) -> bool {
        let AddrParts { tag, set, .. } = self.decompose(addr);
        match self.sets[set].find_line_mut(tag) {
            Some(line)
                if line.state == MesiState::Shared || line.state == MesiState::Exclusive =>
            {
                line.state = MesiState::Invalid;
                trace!("cache {}: invalidated block {:#010x}", self.id, addr);
                true
            }
            _ => false,
        }
    }

    /// Reacts to a peer's upgrade: drops a `Shared` copy. Returns whether
    /// a line was actually invalidated.
    pub fn snoop_upgrade(&mut self, addr: u32) -> bool {
        let AddrParts { tag, set, .. } = self.decompose(addr);
        match self.sets[set].find_line_mut(tag) {
            Some(line) if line.state == MesiState::Shared => {
                line.state = MesiState::Invalid;
                trace!("cache {}: invalidated block {:#010x} on upgrade", self.id, addr);
                true
            }
            _ => false,
        }
    }

    /// The line currently mapped for `addr`, if any.
    pub fn line(&self, addr: u32) -> Option<&CacheLine> {
        let AddrParts { tag, set, .. } = self.decompose(addr);
        self.sets[set].find_line(tag)
    }

    /// Coherence state for `addr`; `Invalid` when no line is mapped.
    pub fn state_of(&self, addr: u32) -> MesiState {
        self.line(addr).map_or(MesiState::Invalid, |line| line.state)
    }
}
