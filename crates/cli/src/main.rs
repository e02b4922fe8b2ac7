//! MESI cache-coherence simulator CLI.
//!
//! This binary wires the simulator core to the outside world. It performs:
//! 1. **Flag parsing:** application name, cache geometry, and an optional
//!    output path.
//! 2. **Trace discovery:** opens the four `<app>_proc<i>.trace` files.
//! 3. **Run and report:** drives the cycle loop to completion and writes
//!    the results to stdout or the requested file.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use env_logger::Env;

use mesisim_core::config::{CacheParams, Config};
use mesisim_core::report::write_report;
use mesisim_core::trace::{self, TraceSource};
use mesisim_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "mesisim",
    about = "Quad-core MESI snooping-cache simulator",
    long_about = "Simulates four cores with private write-back L1 caches kept \
coherent over a shared snooping bus, driven by per-core memory traces.\n\n\
Example:\n  mesisim -t app1 -s 5 -E 2 -b 5 -o results.txt"
)]
struct Cli {
    /// Name of the parallel application whose four traces are to be used
    /// (core i reads <APP>_proci.trace).
    #[arg(short = 't', value_name = "APP")]
    app: String,

    /// Number of set index bits (sets per cache = 2^s).
    #[arg(short = 's', value_name = "S")]
    set_bits: u32,

    /// Associativity (number of cache lines per set).
    #[arg(short = 'E', value_name = "E")]
    ways: usize,

    /// Number of block bits (block size = 2^b bytes).
    #[arg(short = 'b', value_name = "B")]
    block_bits: u32,

    /// Write the report to this file instead of stdout.
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Random seed echoed in the report (reserved for tie-breaking
    /// extensions; replacement is deterministic).
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Missing or invalid parameters must exit 1; help still exits 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if err.kind() == ErrorKind::DisplayHelp
                || err.kind() == ErrorKind::DisplayVersion =>
        {
            let _ = err.print();
            return;
        }
        Err(err) => {
            let _ = err.print();
            process::exit(1);
        }
    };

    let config = Config {
        app: cli.app.clone(),
        cache: CacheParams {
            set_bits: cli.set_bits,
            ways: cli.ways,
            block_bits: cli.block_bits,
        },
        seed: cli.seed,
        ..Config::default()
    };
    if let Err(err) = config.cache.validate() {
        eprintln!("Error: {err}");
        let _ = Cli::command().print_help();
        process::exit(1);
    }

    if let Err(err) = run(cli, config) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli, config: Config) -> Result<()> {
    let traces = trace::open_app_traces(&config.app)?;
    log::info!("opened {} trace files for '{}'", traces.len(), config.app);
    let traces: Vec<Box<dyn TraceSource>> = traces
        .into_iter()
        .map(|t| Box::new(t) as Box<dyn TraceSource>)
        .collect();

    let mut sim = Simulator::new(config, traces)?;
    sim.run();

    match &cli.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("could not open output file '{}'", path.display()))?;
            write_report(&mut file, &sim)?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_report(&mut out, &sim)?;
            out.flush()?;
        }
    }
    Ok(())
}
