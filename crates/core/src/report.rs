//! Results report formatting.
//!
//! Renders the end-of-run statistics to any writer: a parameter header
//! with the derived cache dimensions, a right-aligned per-core table, and
//! the global bus section. The CLI points this at stdout or an output
//! file.

use std::io::{self, Write};

use crate::sim::Simulator;

/// Writes the full results report for a finished run.
pub fn write_report<W: Write>(out: &mut W, sim: &Simulator) -> io::Result<()> {
    let config = sim.config();
    let cache = &config.cache;

    writeln!(out, "Cache Simulator Results for {}", config.app)?;
    writeln!(out, "===================================")?;
    writeln!(out, "Cache parameters:")?;
    writeln!(
        out,
        "  Set bits (s): {} (Sets: {})",
        cache.set_bits,
        cache.num_sets()
    )?;
    writeln!(out, "  Associativity (E): {}", cache.ways)?;
    writeln!(
        out,
        "  Block bits (b): {} (Block size: {} bytes)",
        cache.block_bits,
        cache.block_bytes()
    )?;
    writeln!(
        out,
        "  Total cache size per core: {} bytes",
        cache.size_bytes()
    )?;
    writeln!(out, "  Random seed: {}", config.seed)?;
    writeln!(out)?;

    writeln!(out, "Per-core Statistics:")?;
    writeln!(out, "-------------------")?;
    writeln!(
        out,
        "{:>10}{:>15}{:>15}{:>15}{:>15}{:>15}{:>15}{:>15}{:>15}",
        "Core ID",
        "Read Instr",
        "Write Instr",
        "Total Instr",
        "Total Cycles",
        "Idle Cycles",
        "Miss Rate",
        "Evictions",
        "Writebacks"
    )?;
    for (core, cache) in sim.cores().iter().zip(sim.caches()) {
        writeln!(
            out,
            "{:>10}{:>15}{:>15}{:>15}{:>15}{:>15}{:>15.4}{:>15}{:>15}",
            core.id(),
            cache.stats.read_count,
            cache.stats.write_count,
            core.stats.instruction_count,
            core.stats.total_cycles,
            core.stats.idle_cycles,
            cache.stats.miss_rate(),
            cache.stats.evictions,
            cache.stats.writebacks
        )?;
    }

    let bus = sim.bus().stats();
    writeln!(out)?;
    writeln!(out, "Global Statistics:")?;
    writeln!(out, "-----------------")?;
    writeln!(out, "Invalidations on bus: {}", bus.invalidations)?;
    writeln!(out, "Data traffic on bus: {} bytes", bus.data_traffic_bytes)?;
    writeln!(
        out,
        "Maximum execution time: {} cycles",
        sim.max_execution_time()
    )?;
    Ok(())
}
