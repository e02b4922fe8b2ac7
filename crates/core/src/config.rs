//! Configuration for the cache-coherence simulator.
//!
//! This module defines the structures that parameterize a run. It provides:
//! 1. **Defaults:** baseline constants (core count, memory latency, bus
//!    transfer costs, cache geometry).
//! 2. **Cache geometry:** set-index bits, associativity, and block-offset
//!    bits with the derived set count, block size, and per-core size.
//! 3. **Timing:** the constant-latency memory oracle and bus transfer costs.
//!
//! Configuration is built from CLI flags or deserialized from JSON; use
//! `Config::default()` for the baseline quad-core setup.

use serde::Deserialize;

use crate::common::error::SimError;

/// Default configuration constants for the simulator.
pub mod defaults {
    /// Number of processor cores sharing the bus.
    pub const NUM_CORES: usize = 4;

    /// Main-memory access latency in cycles; charged for a block fetch that
    /// no peer cache supplies, and again for writing back a dirty victim.
    pub const MEM_LATENCY: u64 = 100;

    /// Cycles to move one word across the bus in a cache-to-cache transfer.
    pub const WORD_TRANSFER_LATENCY: u64 = 2;

    /// Bus word size in bytes.
    pub const WORD_BYTES: u32 = 4;

    /// Fixed overhead of a bus upgrade transaction in cycles.
    pub const UPGRADE_LATENCY: u64 = 2;

    /// Default set-index bits (64 sets).
    pub const SET_BITS: u32 = 6;

    /// Default associativity (lines per set).
    pub const WAYS: usize = 2;

    /// Default block-offset bits (32-byte blocks).
    pub const BLOCK_BITS: u32 = 5;
}

/// Geometry of one per-core L1 cache.
///
/// `set_bits` (`s`), `ways` (`E`), and `block_bits` (`b`) fix `S = 2^s`
/// sets of `E` lines holding `B = 2^b` byte blocks.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CacheParams {
    /// Number of set-index bits (`s`).
    #[serde(default = "CacheParams::default_set_bits")]
    pub set_bits: u32,

    /// Associativity (`E`), lines per set.
    #[serde(default = "CacheParams::default_ways")]
    pub ways: usize,

    /// Number of block-offset bits (`b`).
    #[serde(default = "CacheParams::default_block_bits")]
    pub block_bits: u32,
}

impl CacheParams {
    fn default_set_bits() -> u32 {
        defaults::SET_BITS
    }

    fn default_ways() -> usize {
        defaults::WAYS
    }

    fn default_block_bits() -> u32 {
        defaults::BLOCK_BITS
    }

    /// Number of sets, `S = 2^s`.
    #[inline]
    pub fn num_sets(&self) -> usize {
        1 << self.set_bits
    }

    /// Block size in bytes, `B = 2^b`.
    #[inline]
    pub fn block_bytes(&self) -> u32 {
        1 << self.block_bits
    }

    /// Total cache size per core in bytes, `S * E * B`.
    pub fn size_bytes(&self) -> u64 {
        self.num_sets() as u64 * self.ways as u64 * self.block_bytes() as u64
    }

    /// Rejects degenerate geometries.
    ///
    /// All three parameters must be positive, and the tag must retain at
    /// least one bit of a 32-bit address.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.set_bits == 0 {
            return Err(SimError::Config("set-index bits must be > 0".into()));
        }
        if self.ways == 0 {
            return Err(SimError::Config("associativity must be > 0".into()));
        }
        if self.block_bits == 0 {
            return Err(SimError::Config("block bits must be > 0".into()));
        }
        if self.set_bits + self.block_bits >= 32 {
            return Err(SimError::Config(format!(
                "set bits + block bits must be < 32, got {} + {}",
                self.set_bits, self.block_bits
            )));
        }
        Ok(())
    }
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            set_bits: defaults::SET_BITS,
            ways: defaults::WAYS,
            block_bits: defaults::BLOCK_BITS,
        }
    }
}

/// Latency model for the bus and the memory oracle.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct TimingConfig {
    /// Cycles for a main-memory fetch or a dirty-block writeback.
    #[serde(default = "TimingConfig::default_mem_latency")]
    pub mem_latency: u64,

    /// Cycles per word of a cache-to-cache block transfer.
    #[serde(default = "TimingConfig::default_word_transfer_latency")]
    pub word_transfer_latency: u64,

    /// Bus word size in bytes.
    #[serde(default = "TimingConfig::default_word_bytes")]
    pub word_bytes: u32,

    /// Fixed cycles for a bus upgrade transaction.
    #[serde(default = "TimingConfig::default_upgrade_latency")]
    pub upgrade_latency: u64,
}

impl TimingConfig {
    fn default_mem_latency() -> u64 {
        defaults::MEM_LATENCY
    }

    fn default_word_transfer_latency() -> u64 {
        defaults::WORD_TRANSFER_LATENCY
    }

    fn default_word_bytes() -> u32 {
        defaults::WORD_BYTES
    }

    fn default_upgrade_latency() -> u64 {
        defaults::UPGRADE_LATENCY
    }

    /// Cycles to transfer one whole block of `block_bytes` over the bus.
    pub fn block_transfer_cycles(&self, block_bytes: u32) -> u64 {
        self.word_transfer_latency * u64::from(block_bytes / self.word_bytes)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            mem_latency: defaults::MEM_LATENCY,
            word_transfer_latency: defaults::WORD_TRANSFER_LATENCY,
            word_bytes: defaults::WORD_BYTES,
            upgrade_latency: defaults::UPGRADE_LATENCY,
        }
    }
}

/// Root configuration for one simulation run.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Application base name; core `i` reads `<app>_proc<i>.trace`.
    #[serde(default)]
    pub app: String,

    /// Per-core L1 cache geometry.
    #[serde(default)]
    pub cache: CacheParams,

    /// Bus and memory latencies.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Random seed, echoed in the report.
    ///
    /// Reserved for future tie-breaking extensions; the LRU policy breaks
    /// ties deterministically toward the lowest way index.
    #[serde(default)]
    pub seed: u64,
}
