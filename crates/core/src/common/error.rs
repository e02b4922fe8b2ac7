//! Fatal error definitions.
//!
//! This module defines the errors that abort a simulation run. It provides:
//! 1. **Configuration errors:** rejected cache geometry or run parameters.
//! 2. **Trace errors:** a required per-core trace file could not be opened.
//! 3. **I/O errors:** the results report could not be written.
//!
//! Recoverable per-line trace problems (malformed lines, unknown operation
//! codes) are not errors: the core logs a warning and skips the line.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that terminate a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Missing or invalid run parameters.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A required trace file could not be opened.
    #[error("could not open trace file '{}': {}", .path.display(), .source)]
    TraceOpen {
        /// Path of the trace file that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Writing the results report failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
