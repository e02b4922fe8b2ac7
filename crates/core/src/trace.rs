//! Memory-reference trace input.
//!
//! This module turns trace files into the `(op, address)` event streams the
//! cores consume. It provides:
//! 1. **Line grammar:** `<op> <addr>` with `op` in `{R, r, W, w}` and a hex
//!    address with optional `0x` prefix; whitespace tolerant.
//! 2. **The `TraceSource` seam:** cores pull parsed lines through a trait,
//!    so tests can substitute scripted streams for real files.
//! 3. **File discovery:** for an application `APP`, core `i` reads
//!    `APP_proc<i>.trace`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::warn;

use crate::common::error::SimError;
use crate::config::defaults;

/// A memory operation from a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Load.
    Read,
    /// Store.
    Write,
}

/// One parsed trace line.
///
/// Every variant consumes exactly one line of input; a core spends one
/// issue opportunity per line regardless of whether it was usable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedLine {
    /// Nothing on the line.
    Blank,
    /// The line did not match the grammar; carries the raw text for the
    /// diagnostic.
    Malformed(String),
    /// A single-character operation code outside `{R, r, W, w}`.
    Unknown(char),
    /// A well-formed memory reference.
    Access {
        /// Load or store.
        op: Op,
        /// 32-bit physical address.
        addr: u32,
    },
}

/// Parses one trace line.
pub fn parse_line(line: &str) -> ParsedLine {
    let mut fields = line.split_whitespace();
    let Some(op_field) = fields.next() else {
        return ParsedLine::Blank;
    };
    let op = match op_field {
        "R" | "r" => Op::Read,
        "W" | "w" => Op::Write,
        other => {
            let mut chars = other.chars();
            let first = chars.next().unwrap_or(' ');
            return if chars.next().is_none() {
                ParsedLine::Unknown(first)
            } else {
                ParsedLine::Malformed(line.trim_end().to_string())
            };
        }
    };
    let Some(addr_field) = fields.next() else {
        return ParsedLine::Malformed(line.trim_end().to_string());
    };
    let digits = addr_field
        .strip_prefix("0x")
        .or_else(|| addr_field.strip_prefix("0X"))
        .unwrap_or(addr_field);
    match u32::from_str_radix(digits, 16) {
        Ok(addr) => ParsedLine::Access { op, addr },
        Err(_) => ParsedLine::Malformed(line.trim_end().to_string()),
    }
}

/// A per-core stream of trace lines.
///
/// `None` means the stream is exhausted and the core is done.
pub trait TraceSource {
    /// Pulls and parses the next line.
    fn next_line(&mut self) -> Option<ParsedLine>;
}

/// Trace stream backed by a file, read lazily one line at a time.
pub struct FileTrace {
    path: PathBuf,
    lines: io::Lines<BufReader<File>>,
}

impl FileTrace {
    /// Opens `path`; failure is fatal to the run.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| SimError::TraceOpen {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
        })
    }
}

impl TraceSource for FileTrace {
    fn next_line(&mut self) -> Option<ParsedLine> {
        match self.lines.next()? {
            Ok(line) => Some(parse_line(&line)),
            Err(err) => {
                warn!("trace {}: read error, ending stream: {err}", self.path.display());
                None
            }
        }
    }
}

/// Path of core `core_id`'s trace for application `app`.
pub fn trace_path(app: &str, core_id: usize) -> PathBuf {
    PathBuf::from(format!("{app}_proc{core_id}.trace"))
}

/// Opens the four per-core traces for `app`.
pub fn open_app_traces(app: &str) -> Result<Vec<FileTrace>, SimError> {
    (0..defaults::NUM_CORES)
        .map(|core_id| FileTrace::open(trace_path(app, core_id)))
        .collect()
}
