//! Layouts wrapping another layout module
//!
//! Each wrapper owns an inner module, a force-directed layout unless the
//! caller supplies one, and only adds a pre- or post-processing step around
//! it. Failures of the inner module propagate unchanged.

use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::{debug, span, Level};

use super::{checked, for_each_component, normalize, EnergyLayout, EnergyVariant};
use crate::core::{GraphAttributes, LayoutFailure, LayoutModule, LayoutOptions};

fn default_inner(options: &LayoutOptions) -> Result<Box<dyn LayoutModule>, LayoutFailure> {
    Ok(Box::new(EnergyLayout::new(EnergyVariant::Fmmm, options.clone())?))
}

/// Lays out every connected component separately and packs the results
pub struct ComponentSplitterLayout {
    inner: Box<dyn LayoutModule>,
    options: LayoutOptions,
}

impl ComponentSplitterLayout {
    pub fn new(options: LayoutOptions) -> Result<Self, LayoutFailure> {
        let options = checked(options)?;
        Ok(Self {
            inner: default_inner(&options)?,
            options,
        })
    }

    pub fn with_inner(inner: Box<dyn LayoutModule>, options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            inner,
            options: checked(options)?,
        })
    }
}

impl fmt::Debug for ComponentSplitterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSplitterLayout")
            .field("inner", &self.inner.name())
            .field("options", &self.options)
            .finish()
    }
}

impl LayoutModule for ComponentSplitterLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(
            Level::DEBUG,
            "component_splitter",
            inner = self.inner.name(),
            nodes = attributes.node_count()
        );
        let _enter = layout_span.enter();

        if attributes.is_empty() {
            attributes.clear_bends();
            return Ok(());
        }
        let inner = &mut self.inner;
        for_each_component(attributes, self.options.node_spacing, |component| inner.call(component))
    }

    fn name(&self) -> &'static str {
        "component-splitter"
    }
}

/// Runs the inner module, then rescales the drawing so the average edge
/// length matches the ideal edge length
pub struct ScalingLayout {
    inner: Box<dyn LayoutModule>,
    options: LayoutOptions,
}

impl ScalingLayout {
    pub fn new(options: LayoutOptions) -> Result<Self, LayoutFailure> {
        let options = checked(options)?;
        Ok(Self {
            inner: default_inner(&options)?,
            options,
        })
    }

    pub fn with_inner(inner: Box<dyn LayoutModule>, options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            inner,
            options: checked(options)?,
        })
    }
}

impl fmt::Debug for ScalingLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalingLayout")
            .field("inner", &self.inner.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Mean length of all non-loop edges, if there are any
fn average_edge_length(attrs: &GraphAttributes) -> Option<f64> {
    let lengths: Vec<f64> = attrs
        .edges()
        .filter_map(|e| {
            let (s, t) = attrs.endpoints(e);
            (s != t).then(|| attrs.position(s).distance(attrs.position(t)))
        })
        .collect();
    if lengths.is_empty() {
        return None;
    }
    Some(lengths.iter().sum::<f64>() / lengths.len() as f64)
}

impl LayoutModule for ScalingLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(Level::DEBUG, "scaling", inner = self.inner.name());
        let _enter = layout_span.enter();

        self.inner.call(attributes)?;
        let Some(average) = average_edge_length(attributes).filter(|&l| l > 1e-9) else {
            return Ok(());
        };
        let factor = self.options.ideal_edge_length / average;
        for n in attributes.nodes().collect::<Vec<_>>() {
            let p = attributes.position(n);
            attributes.set_position(n, p * factor);
        }
        for e in attributes.edges().collect::<Vec<_>>() {
            let bends = attributes.bends(e).iter().map(|&b| b * factor).collect();
            attributes.set_bends(e, bends);
        }
        normalize(attributes);
        debug!(factor, "Drawing rescaled");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scaling"
    }
}

/// Runs the inner module on a simple copy of the graph
///
/// Self-loops and parallel edges are hidden from the inner module; they
/// come back without bends.
pub struct PreprocessorLayout {
    inner: Box<dyn LayoutModule>,
}

impl PreprocessorLayout {
    pub fn new(options: LayoutOptions) -> Result<Self, LayoutFailure> {
        let options = checked(options)?;
        Ok(Self {
            inner: default_inner(&options)?,
        })
    }

    pub fn with_inner(inner: Box<dyn LayoutModule>) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for PreprocessorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreprocessorLayout")
            .field("inner", &self.inner.name())
            .finish()
    }
}

impl LayoutModule for PreprocessorLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(Level::DEBUG, "preprocessor", inner = self.inner.name());
        let _enter = layout_span.enter();

        let (mut simple, kept) = attributes.simplified();
        debug!(
            removed = attributes.edge_count() - kept.len(),
            "Hid self-loops and parallel edges"
        );
        self.inner.call(&mut simple)?;

        for n in attributes.nodes().collect::<Vec<_>>() {
            attributes.set_position(n, simple.position(NodeIndex::new(n.index())));
        }
        attributes.clear_bends();
        for (j, &e) in kept.iter().enumerate() {
            attributes.set_bends(e, simple.bends(EdgeIndex::new(j)).to_vec());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "preprocessor"
    }
}
