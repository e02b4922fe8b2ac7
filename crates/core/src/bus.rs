//! Shared snooping bus.
//!
//! This module serializes all coherence traffic between the per-core
//! caches. It provides:
//! 1. **Transactions:** read, write (data acquisition strictly before
//!    invalidation), and upgrade broadcasts over the peer caches.
//! 2. **Accounting:** global invalidation and data-traffic counters,
//!    charged from the outcomes the snoop handlers report.
//! 3. **Access entry points:** the composed local-probe → transaction →
//!    fill sequences the cores drive, yielding `(hit, cycles)`.
//!
//! The bus holds no cache references. Each call receives the cache slice
//! and addresses peers by index in ascending order, which keeps the
//! coherence event ordering deterministic and reproducible.

use log::debug;

use crate::cache::{Cache, EvictionKind, LocalAccess, MesiState};
use crate::config::TimingConfig;

/// Monotonic global bus counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct BusStats {
    /// Peer lines dropped by write or upgrade transactions.
    pub invalidations: u64,
    /// Bytes moved by cache-to-cache transfers.
    pub data_traffic_bytes: u64,
}

/// Result of one memory access as seen by the issuing core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    /// Whether the access hit in the local cache.
    pub hit: bool,
    /// Cycles the access cost in the issue path; a miss stalls the core
    /// for this long.
    pub cycles: u64,
}

/// The shared bus: coherence transaction engine plus global counters.
pub struct Bus {
    stats: BusStats,
    mem_latency: u64,
    upgrade_latency: u64,
}

impl Bus {
    /// Creates a bus with the given timing model.
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            stats: BusStats::default(),
            mem_latency: timing.mem_latency,
            upgrade_latency: timing.upgrade_latency,
        }
    }

    /// Global counters.
    pub fn stats(&self) -> &BusStats {
        &self.stats
    }

    /// A core read: local probe, then on a miss the read transaction and
    /// the fill.
    ///
    /// A peer-supplied block installs as `Shared`; only a block nobody
    /// else held installs as `Exclusive`.
    pub fn read(&mut self, caches: &mut [Cache], requester: usize, addr: u32, cycle: u64) -> Access {
        match caches[requester].begin_read(addr, cycle) {
            LocalAccess::Hit { .. } => Access { hit: true, cycles: 1 },
            LocalAccess::Miss => {
                let transfer_cycles = self.process_read(caches, requester, addr);
                let supplied = transfer_cycles > 0;
                let state = if supplied {
                    MesiState::Shared
                } else {
                    MesiState::Exclusive
                };
                let evicted = caches[requester].fill(addr, cycle, state, false);
                let cycles = self.miss_cycles(evicted, transfer_cycles);
                Access { hit: false, cycles }
            }
        }
    }

    /// A core write: local probe, then an upgrade for a `Shared` hit or
    /// the write transaction and fill for a miss.
    pub fn write(
        &mut self,
        caches: &mut [Cache],
        requester: usize,
        addr: u32,
        cycle: u64,
    ) -> Access {
        match caches[requester].begin_write(addr, cycle) {
            LocalAccess::Hit { needs_upgrade: false } => Access { hit: true, cycles: 1 },
            LocalAccess::Hit { needs_upgrade: true } => {
                let bus_cycles = self.process_upgrade(caches, requester, addr);
                caches[requester].finish_upgrade(addr);
                Access {
                    hit: true,
                    cycles: 1 + bus_cycles,
                }
            }
            LocalAccess::Miss => {
                let transfer_cycles = self.process_write(caches, requester, addr);
                let evicted = caches[requester].fill(addr, cycle, MesiState::Modified, true);
                let cycles = self.miss_cycles(evicted, transfer_cycles);
                Access { hit: false, cycles }
            }
        }
    }

    /// Broadcasts a read to every peer.
    ///
    /// Returns the slowest supplier's transfer time, or 0 when no peer
    /// held the block and the requester must go to memory.
    pub fn process_read(&mut self, caches: &mut [Cache], requester: usize, addr: u32) -> u64 {
        debug!("bus: read {:#010x} from core {requester}", addr);
        self.acquire_block(caches, requester, addr)
    }

    /// Broadcasts a write to every peer: first the data-acquisition phase
    /// (identical to a read broadcast), then the invalidation phase.
    ///
    /// All acquisition snoops complete before the first invalidation, so a
    /// `Modified` peer is downgraded to `Shared` before it is invalidated
    /// and therefore counts toward the invalidation total.
    pub fn process_write(&mut self, caches: &mut [Cache], requester: usize, addr: u32) -> u64 {
        debug!("bus: write {:#010x} from core {requester}", addr);
        let max_cycles = self.acquire_block(caches, requester, addr);
        for id in 0..caches.len() {
            if id == requester {
                continue;
            }
            if caches[id].snoop_write(addr) {
                self.stats.invalidations += 1;
            }
        }
        max_cycles
    }

    /// Broadcasts an upgrade: peers drop `Shared` copies; no data moves.
    /// Returns the fixed bus-transaction overhead.
    pub fn process_upgrade(&mut self, caches: &mut [Cache], requester: usize, addr: u32) -> u64 {
        debug!("bus: upgrade {:#010x} from core {requester}", addr);
        for id in 0..caches.len() {
            if id == requester {
                continue;
            }
            if caches[id].snoop_upgrade(addr) {
                self.stats.invalidations += 1;
            }
        }
        self.upgrade_latency
    }

    /// Data-acquisition snoop round shared by read and write transactions.
    fn acquire_block(&mut self, caches: &mut [Cache], requester: usize, addr: u32) -> u64 {
        let mut max_cycles = 0;
        for id in 0..caches.len() {
            if id == requester {
                continue;
            }
            if let Some(cycles) = caches[id].snoop_read(addr) {
                self.stats.data_traffic_bytes += u64::from(caches[id].block_bytes());
                max_cycles = max_cycles.max(cycles);
            }
        }
        max_cycles
    }

    /// Miss latency: writeback of a dirty victim, then either the peer
    /// transfer or a memory fetch.
    fn miss_cycles(&self, evicted: EvictionKind, transfer_cycles: u64) -> u64 {
        let writeback = if evicted == EvictionKind::Dirty {
            self.mem_latency
        } else {
            0
        };
        let fetch = if transfer_cycles > 0 {
            transfer_cycles
        } else {
            self.mem_latency
        };
        writeback + fetch
    }
}
