//! Top-level simulator: owns the cores, caches, and bus, and drives the
//! lockstep cycle loop until every core has drained its trace.
//!
//! Cores are polled once per cycle in ascending id order. That ordering is
//! part of the observable behavior: when two cores issue conflicting
//! coherence transactions in the same cycle, the lower id's transaction
//! completes (including its snoop effects on peer caches) before the
//! higher id's begins.

use crate::bus::Bus;
use crate::cache::Cache;
use crate::common::error::SimError;
use crate::config::Config;
use crate::core::Core;
use crate::trace::TraceSource;

/// The whole machine: four cores, four private L1 caches, one bus.
pub struct Simulator {
    config: Config,
    cores: Vec<Core>,
    caches: Vec<Cache>,
    bus: Bus,
    current_cycle: u64,
}

impl Simulator {
    /// Builds the machine, one core/cache pair per trace source.
    ///
    /// Fails when the cache geometry is degenerate.
    pub fn new(config: Config, traces: Vec<Box<dyn TraceSource>>) -> Result<Self, SimError> {
        config.cache.validate()?;
        let caches = (0..traces.len())
            .map(|id| Cache::new(id, config.cache, &config.timing))
            .collect();
        let cores = traces
            .into_iter()
            .enumerate()
            .map(|(id, trace)| Core::new(id, trace))
            .collect();
        let bus = Bus::new(&config.timing);
        Ok(Self {
            config,
            cores,
            caches,
            bus,
            current_cycle: 0,
        })
    }

    /// Polls every core once for the current cycle. Returns whether any
    /// core is still active.
    pub fn tick(&mut self) -> bool {
        let mut any_active = false;
        for id in 0..self.cores.len() {
            if self.cores[id].step(self.current_cycle, &mut self.caches, &mut self.bus) {
                any_active = true;
            }
        }
        any_active
    }

    /// Runs the cycle loop until all cores report completion.
    pub fn run(&mut self) {
        while self.tick() {
            self.current_cycle += 1;
        }
    }

    /// The cycle the engine has advanced to.
    pub fn current_cycle(&self) -> u64 {
        self.current_cycle
    }

    /// Run configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The per-core caches, indexed by core id.
    pub fn caches(&self) -> &[Cache] {
        &self.caches
    }

    /// The cores, indexed by id.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// The shared bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Slowest core's execution time: max over cores of issue plus idle
    /// cycles.
    pub fn max_execution_time(&self) -> u64 {
        self.cores
            .iter()
            .map(|core| core.stats.execution_time())
            .max()
            .unwrap_or(0)
    }
}
