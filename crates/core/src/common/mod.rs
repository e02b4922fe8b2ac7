//! Common types shared across the simulator.
//!
//! Provides address field decomposition and the fatal error taxonomy.

/// Address field decomposition (tag, set index, block offset).
pub mod addr;
/// Fatal error taxonomy for configuration, trace, and report I/O.
pub mod error;
