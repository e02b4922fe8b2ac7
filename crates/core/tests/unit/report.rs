//! Report rendering tests.

use mesisim_core::report::write_report;
use mesisim_core::trace::TraceSource;
use mesisim_core::Simulator;

use crate::common::{sim_with_traces, small_config, ScriptedTrace};

fn render(sim: &Simulator) -> String {
    let mut out = Vec::new();
    write_report(&mut out, sim).expect("write to buffer");
    String::from_utf8(out).expect("utf-8 report")
}

#[test]
fn header_lists_parameters_and_derived_sizes() {
    let mut sim = sim_with_traces([&[], &[], &[], &[]]);
    sim.run();
    let report = render(&sim);

    assert!(report.starts_with("Cache Simulator Results for test\n"));
    assert!(report.contains("  Set bits (s): 1 (Sets: 2)"));
    assert!(report.contains("  Associativity (E): 2"));
    assert!(report.contains("  Block bits (b): 2 (Block size: 4 bytes)"));
    assert!(report.contains("  Total cache size per core: 16 bytes"));
    assert!(report.contains("  Random seed: 0"));
}

#[test]
fn per_core_rows_carry_the_counters() {
    let mut sim = sim_with_traces([&["R 0x0", "R 0x0"], &[], &[], &[]]);
    sim.run();
    let report = render(&sim);

    // One miss out of two reads.
    assert!(report.contains("0.5000"), "miss rate row missing: {report}");
    let row = report
        .lines()
        .find(|l| l.trim_start().starts_with('0') && l.contains("0.5000"))
        .expect("core 0 row");
    let fields: Vec<&str> = row.split_whitespace().collect();
    assert_eq!(
        fields,
        ["0", "2", "0", "2", "2", "99", "0.5000", "0", "0"]
    );
}

#[test]
fn global_section_reports_bus_totals() {
    let mut sim = sim_with_traces([&["R 0x0"], &["R 0x0"], &["W 0x0"], &[]]);
    sim.run();
    let report = render(&sim);

    assert!(report.contains("Invalidations on bus: 2"));
    assert!(report.contains("Data traffic on bus: 12 bytes"));
    assert!(report.contains("Maximum execution time: 100 cycles"));
}

#[test]
fn seed_is_echoed_verbatim() {
    let mut config = small_config();
    config.seed = 42;
    let traces = (0..4)
        .map(|_| Box::new(ScriptedTrace::new(&[])) as Box<dyn TraceSource>)
        .collect();
    let sim = Simulator::new(config, traces).expect("valid config");
    let report = render(&sim);
    assert!(report.contains("  Random seed: 42"));
}
