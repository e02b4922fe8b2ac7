//! Quad-core MESI cache-coherence simulator library.
//!
//! This crate implements a cycle-driven model of a four-core shared-memory
//! multiprocessor with the following:
//! 1. **Caches:** private write-back set-associative L1s with LRU
//!    replacement and per-line MESI state.
//! 2. **Bus:** a snooping interconnect serializing read, write, and
//!    upgrade transactions, with cache-to-cache transfer and invalidation
//!    accounting.
//! 3. **Cores:** trace-driven load/store issue with stall tracking.
//! 4. **Engine:** a single-threaded lockstep cycle loop with deterministic
//!    core ordering.
//! 5. **Reporting:** per-core and global statistics rendered to any writer.

/// Shared bus and coherence transactions.
pub mod bus;
/// Per-core L1 cache with MESI state.
pub mod cache;
/// Address decomposition and error types.
pub mod common;
/// Run configuration (cache geometry, timing, defaults).
pub mod config;
/// Processor core execution model.
pub mod core;
/// Results report formatting.
pub mod report;
/// Top-level simulator and cycle engine.
pub mod sim;
/// Trace parsing and per-core trace sources.
pub mod trace;

/// Root configuration type; build from CLI flags or `Config::default()`.
pub use crate::config::Config;
/// Fatal error taxonomy.
pub use crate::common::error::SimError;
/// The whole machine; construct with `Simulator::new` and call `run`.
pub use crate::sim::Simulator;
