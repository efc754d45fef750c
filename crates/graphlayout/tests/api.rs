//! Integration tests for the public API

use std::collections::HashSet;

use graphlayout::core::GraphDocument;
use graphlayout::prelude::*;
use graphlayout::{layout_json, layout_json_with_options};

const DIAMOND: &str = r#"{
    "nodes": [
        {"id": "top", "label": "Top", "width": 60.0, "height": 20.0},
        {"id": "left"},
        {"id": "right"},
        {"id": "bottom"}
    ],
    "edges": [
        {"source": "top", "target": "left"},
        {"source": "top", "target": "right"},
        {"source": "left", "target": "bottom"},
        {"source": "right", "target": "bottom"},
        {"source": "top", "target": "bottom"}
    ]
}"#;

fn parse(output: &str) -> GraphDocument {
    GraphDocument::from_json(output).unwrap()
}

#[test]
fn test_layout_keeps_labels_and_sizes() {
    let document = parse(&layout_json(DIAMOND, Algorithm::SugiyamaLayout).unwrap());
    let top = &document.nodes[0];
    assert_eq!(top.label.as_deref(), Some("Top"));
    assert_eq!(top.width, Some(60.0));
    assert_eq!(top.height, Some(20.0));
    assert_eq!(document.edges.len(), 5);
}

#[test]
fn test_sugiyama_bends_long_edges() {
    let document = parse(&layout_json(DIAMOND, Algorithm::SugiyamaLayout).unwrap());
    let long = document
        .edges
        .iter()
        .find(|e| e.source == "top" && e.target == "bottom")
        .unwrap();
    assert_eq!(long.bends.len(), 1);
}

#[test]
fn test_straight_layouts_have_no_bends() {
    for algorithm in [Algorithm::FMMMLayout, Algorithm::CircularLayout, Algorithm::TreeLayout] {
        let input = if algorithm == Algorithm::TreeLayout {
            r#"{"nodes": [{"id": "a"}, {"id": "b"}], "edges": [{"source": "a", "target": "b"}]}"#
        } else {
            DIAMOND
        };
        let document = parse(&layout_json(input, algorithm).unwrap());
        assert!(document.edges.iter().all(|e| e.bends.is_empty()), "{algorithm}");
    }
}

#[test]
fn test_dominance_requires_single_source() {
    let input = r#"{"nodes": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
        "edges": [{"source": "a", "target": "c"}, {"source": "b", "target": "c"}]}"#;
    let err = layout_json(input, Algorithm::DominanceLayout).unwrap_err();
    assert_eq!(err.to_string(), "Graph has not a single source, which violates layout preconditions");
}

#[test]
fn test_planar_layout_rejects_dense_graph() {
    let nodes: Vec<String> = (0..6).map(|i| format!(r#"{{"id": "{i}"}}"#)).collect();
    let mut edges = Vec::new();
    for i in 0..6 {
        for j in (i + 1)..6 {
            edges.push(format!(r#"{{"source": "{i}", "target": "{j}"}}"#));
        }
    }
    let input = format!(r#"{{"nodes": [{}], "edges": [{}]}}"#, nodes.join(","), edges.join(","));
    let err = layout_json(&input, Algorithm::FPPLayout).unwrap_err();
    assert_eq!(err.to_string(), "Graph is not planar, which violates layout preconditions");
}

#[test]
fn test_time_limit_reports_algorithm_failure() {
    let options = LayoutOptions {
        iterations: 1_000_000,
        time_limit_ms: Some(0),
        ..Default::default()
    };
    let err = layout_json_with_options(DIAMOND, Algorithm::FMMMLayout, options).unwrap_err();
    assert_eq!(err.to_string(), "Layout algorithm failed, because timelimit exceeded");
}

#[test]
fn test_unknown_edge_endpoint_rejected() {
    let input = r#"{"nodes": [{"id": "a"}], "edges": [{"source": "a", "target": "ghost"}]}"#;
    assert!(layout_json(input, Algorithm::CircularLayout).is_err());
}

#[test]
fn test_every_phrase_is_distinct() {
    let mut seen = HashSet::new();
    for code in AlgorithmFailureCode::ALL {
        if let Some(message) = diagnostic(&code.into()) {
            assert!(seen.insert(message));
        }
    }
    for code in PreconditionViolatedCode::ALL {
        if let Some(message) = diagnostic(&code.into()) {
            assert!(seen.insert(message));
        }
    }
    assert_eq!(seen.len(), 8 + 13);
}

#[test]
fn test_sentinels_have_no_message() {
    assert!(diagnostic(&AlgorithmFailureCode::Unknown.into()).is_none());
    assert!(diagnostic(&AlgorithmFailureCode::Stop.into()).is_none());
    assert!(diagnostic(&PreconditionViolatedCode::Unknown.into()).is_none());
    assert!(diagnostic(&PreconditionViolatedCode::Stop.into()).is_none());
}

#[test]
fn test_generic_failures() {
    assert_eq!(
        diagnostic(&LayoutFailure::Library("bad embedding".into())).as_deref(),
        Some("Layout library failure caught")
    );
    assert_eq!(
        diagnostic(&LayoutFailure::Other("anything".into())).as_deref(),
        Some("Unknown failure caught")
    );
}

#[test]
fn test_registry_builds_every_module() {
    let registry = Registry::default();
    for algorithm in Algorithm::ALL {
        let module = registry.create(algorithm).unwrap();
        assert_eq!(module.name(), algorithm.name());
    }
}

#[test]
fn test_algorithm_families_cover_every_identifier() {
    let families: HashSet<Family> = Algorithm::ALL.into_iter().map(Algorithm::family).collect();
    assert_eq!(families.len(), 7);
}
