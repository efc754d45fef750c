//! graphlayout - A layout adapter over a library of graph layout algorithms
//!
//! A [`GraphLayout`](adapter::GraphLayout) selects one of a closed set of
//! layout algorithms, runs it against caller-owned graph attributes, keeps a
//! validity flag, notifies listeners about changes and turns layout failures
//! into diagnostic messages.
//!
//! # Quick Start
//!
//! ```rust
//! use graphlayout::{layout_json, Algorithm};
//!
//! let input = r#"{"nodes": [{"id": "a"}, {"id": "b"}], "edges": [{"source": "a", "target": "b"}]}"#;
//! let output = layout_json(input, Algorithm::SugiyamaLayout).unwrap();
//! assert!(output.contains("\"x\""));
//! ```
//!
//! # Advanced Usage
//!
//! Hosts that keep the graph around hold it in an `Rc<RefCell<_>>` and
//! drive the adapter directly:
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use graphlayout::prelude::*;
//!
//! let attributes = Rc::new(RefCell::new(GraphAttributes::new()));
//! {
//!     let mut graph = attributes.borrow_mut();
//!     graph.add_node("root").unwrap();
//!     graph.add_node("leaf").unwrap();
//!     graph.connect("root", "leaf").unwrap();
//! }
//!
//! let sink = CollectingSink::new();
//! let mut layout = GraphLayout::new(&attributes).with_sink(Box::new(sink.clone()));
//! layout.set_algorithm(Algorithm::TreeLayout);
//! layout.call();
//!
//! assert!(layout.valid());
//! assert!(sink.is_empty());
//! ```

pub mod adapter;
pub mod algorithms;
pub mod core;
pub mod layouts;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

use std::cell::RefCell;
use std::rc::Rc;

pub use adapter::GraphLayout;
pub use algorithms::{Algorithm, Family, Registry};

use crate::core::{CollectingSink, GraphAttributes, GraphDocument, LayoutOptions};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapter::GraphLayout;
    pub use crate::algorithms::{Algorithm, Family, Registry};
    pub use crate::core::{
        diagnostic, AlgorithmFailureCode, CollectingSink, ConnectionId, DiagnosticSink, GraphAttributes,
        GraphDocument, LayoutFailure, LayoutModule, LayoutOptions, Point, PreconditionViolatedCode, TracingSink,
    };
}

/// Lay out a JSON graph document with default options
///
/// # Example
/// ```rust
/// use graphlayout::{layout_json, Algorithm};
///
/// let err = layout_json(r#"{"nodes": [{"id": "a"}, {"id": "b"}]}"#, Algorithm::BalloonLayout).unwrap_err();
/// assert_eq!(err.to_string(), "Graph is not connected, which violates layout preconditions");
/// ```
pub fn layout_json(input: &str, algorithm: Algorithm) -> anyhow::Result<String> {
    layout_json_with_options(input, algorithm, LayoutOptions::default())
}

/// Lay out a JSON graph document
///
/// The error carries the diagnostic message of a failed run.
pub fn layout_json_with_options(
    input: &str,
    algorithm: Algorithm,
    options: LayoutOptions,
) -> anyhow::Result<String> {
    options.validate()?;
    let document = GraphDocument::from_json(input)?;
    let attributes = Rc::new(RefCell::new(GraphAttributes::from_document(&document)?));

    let sink = CollectingSink::new();
    let mut layout = GraphLayout::with_options(&attributes, options)?.with_sink(Box::new(sink.clone()));
    layout.set_algorithm(algorithm);
    layout.call();

    if !layout.valid() {
        let message = sink
            .take()
            .pop()
            .or_else(|| layout.last_failure().map(|f| f.to_string()))
            .unwrap_or_else(|| "Layout failed".to_string());
        anyhow::bail!(message);
    }

    let output = attributes.borrow().to_document().to_json()?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = r#"{"nodes": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
        "edges": [{"source": "a", "target": "b"}, {"source": "b", "target": "c"}]}"#;

    #[test]
    fn test_layout_json_every_algorithm() {
        for algorithm in Algorithm::ALL {
            let output = layout_json(PATH, algorithm);
            assert!(output.is_ok(), "{algorithm}: {output:?}");
        }
    }

    #[test]
    fn test_layout_json_keeps_ids() {
        let output = layout_json(PATH, Algorithm::CircularLayout).unwrap();
        let document = GraphDocument::from_json(&output).unwrap();
        let ids: Vec<_> = document.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(document.nodes.iter().all(|n| n.x.is_some() && n.y.is_some()));
    }

    #[test]
    fn test_layout_json_reports_precondition() {
        let cycle = r#"{"nodes": [{"id": "a"}, {"id": "b"}],
            "edges": [{"source": "a", "target": "b"}, {"source": "b", "target": "a"}]}"#;
        let err = layout_json(cycle, Algorithm::TreeLayout).unwrap_err();
        assert_eq!(err.to_string(), "Graph is not a rooted forest, which violates layout preconditions");
    }

    #[test]
    fn test_layout_json_rejects_bad_document() {
        assert!(layout_json("not json", Algorithm::FMMMLayout).is_err());
    }

    #[test]
    fn test_layout_json_rejects_bad_options() {
        let options = LayoutOptions {
            iterations: 0,
            ..Default::default()
        };
        let err = layout_json_with_options(PATH, Algorithm::FMMMLayout, options).unwrap_err();
        assert_eq!(err.to_string(), "iterations must be at least 1");
    }
}
