//! Integration tests for tracing spans and events around layout runs

use std::cell::RefCell;
use std::rc::Rc;

use graphlayout::core::logging::init_logging;
use graphlayout::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;

fn chain() -> Rc<RefCell<GraphAttributes>> {
    let mut graph = GraphAttributes::new();
    for id in ["a", "b", "c"] {
        graph.add_node(id).unwrap();
    }
    graph.connect("a", "b").unwrap();
    graph.connect("b", "c").unwrap();
    Rc::new(RefCell::new(graph))
}

#[test]
fn test_layout_call_under_trace_subscriber() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let graph = chain();
    let mut layout = GraphLayout::new(&graph);
    for algorithm in [Algorithm::SugiyamaLayout, Algorithm::StressMinimization, Algorithm::ScalingLayout] {
        layout.set_algorithm(algorithm);
        layout.call();
        assert!(layout.valid(), "{algorithm}");
    }
}

#[test]
fn test_tracing_sink_reports_failures() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::WARN)
        .set_default();

    let graph = chain();
    graph.borrow_mut().connect("c", "a").unwrap();

    // Default sink logs the diagnostic instead of collecting it
    let mut layout = GraphLayout::new(&graph);
    layout.set_algorithm(Algorithm::VisibilityLayout);
    layout.call();
    assert!(!layout.valid());
    assert_eq!(
        layout.last_failure(),
        Some(&LayoutFailure::Precondition(PreconditionViolatedCode::AcyclicHierarchies))
    );
}

#[test]
fn test_layout_with_global_logging() {
    let _ = init_logging(Some("debug"), Some("compact"));

    let graph = chain();
    let mut layout = GraphLayout::new(&graph);
    layout.set_algorithm(Algorithm::TreeLayout);
    layout.call();
    assert!(layout.valid());
}

#[test]
fn test_init_logging_rejects_unknown_format() {
    assert!(init_logging(Some("info"), Some("xml")).is_err());
}

#[test]
fn test_log_filtering_example() {
    // Component filtering is done through RUST_LOG, e.g.
    //
    // # Only the layered engine, at trace level
    // RUST_LOG="graphlayout::layouts::layered=trace" cargo test
    //
    // # Only the diagnostics emitted by the default sink
    // RUST_LOG="graphlayout::diagnostics=warn" cargo test
    let output = graphlayout::layout_json(
        r#"{"nodes": [{"id": "a"}, {"id": "b"}], "edges": [{"source": "a", "target": "b"}]}"#,
        Algorithm::SugiyamaLayout,
    );
    assert!(output.is_ok());
}
