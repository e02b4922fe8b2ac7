//! File-backed trace source tests.

use std::io::Write;

use tempfile::{NamedTempFile, TempDir};

use mesisim_core::trace::{open_app_traces, trace_path, FileTrace, Op, ParsedLine, TraceSource};
use mesisim_core::SimError;

fn temp_trace(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn reads_lines_until_exhausted() {
    let file = temp_trace("R 0x0\nW 0x10\n\nR 4\n");
    let mut trace = FileTrace::open(file.path()).expect("open");

    assert_eq!(
        trace.next_line(),
        Some(ParsedLine::Access {
            op: Op::Read,
            addr: 0x0
        })
    );
    assert_eq!(
        trace.next_line(),
        Some(ParsedLine::Access {
            op: Op::Write,
            addr: 0x10
        })
    );
    assert_eq!(trace.next_line(), Some(ParsedLine::Blank));
    assert_eq!(
        trace.next_line(),
        Some(ParsedLine::Access {
            op: Op::Read,
            addr: 0x4
        })
    );
    assert_eq!(trace.next_line(), None);
    assert_eq!(trace.next_line(), None);
}

#[test]
fn empty_file_is_immediately_exhausted() {
    let file = temp_trace("");
    let mut trace = FileTrace::open(file.path()).expect("open");
    assert_eq!(trace.next_line(), None);
}

#[test]
fn missing_file_is_a_trace_open_error() {
    let Err(err) = FileTrace::open("/nonexistent/app_proc0.trace") else {
        panic!("open of a missing file must fail");
    };
    match err {
        SimError::TraceOpen { path, .. } => {
            assert!(path.ends_with("app_proc0.trace"));
        }
        other => panic!("expected TraceOpen, got {other}"),
    }
}

#[test]
fn trace_path_naming_scheme() {
    assert_eq!(
        trace_path("app1", 2),
        std::path::PathBuf::from("app1_proc2.trace")
    );
}

#[test]
fn opens_all_four_per_core_traces() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("app1");
    let app = app.to_str().unwrap();
    for core in 0..4 {
        std::fs::write(trace_path(app, core), "R 0x0\n").unwrap();
    }

    let traces = open_app_traces(app).expect("all traces present");
    assert_eq!(traces.len(), 4);
}

#[test]
fn one_missing_trace_fails_the_whole_open() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("app1");
    let app = app.to_str().unwrap();
    for core in 0..3 {
        std::fs::write(trace_path(app, core), "R 0x0\n").unwrap();
    }

    let result = open_app_traces(app);
    assert!(matches!(result, Err(SimError::TraceOpen { .. })));
}
