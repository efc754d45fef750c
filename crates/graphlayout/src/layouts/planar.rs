//! Grid drawings for planar graphs
//!
//! Nodes are layered by breadth-first distance from a root and drawn on an
//! integer grid. Only the edge-count bound of simple planar graphs is
//! checked; a graph passing it may still be non-planar, in which case the
//! drawing simply has crossings.

use tracing::{debug, span, Level};

use super::layered::{draw_hierarchy, Drawing, Routing};
use super::{checked, for_each_component, Deadline};
use crate::core::{topology, GraphAttributes, LayoutFailure, LayoutModule, LayoutOptions, PreconditionViolatedCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanarVariant {
    PlanarStraight,
    PlanarDraw,
    Fpp,
    Schnyder,
    MixedModel,
}

impl PlanarVariant {
    fn routing(self) -> Routing {
        match self {
            PlanarVariant::PlanarStraight | PlanarVariant::Fpp | PlanarVariant::Schnyder => Routing::Straight,
            PlanarVariant::PlanarDraw | PlanarVariant::MixedModel => Routing::Polyline,
        }
    }

    /// Whether the variant needs a graph without self-loops
    fn rejects_self_loops(self) -> bool {
        matches!(self, PlanarVariant::Fpp | PlanarVariant::Schnyder)
    }

    /// Root the layering at the highest-degree node instead of the first one
    fn roots_at_hub(self) -> bool {
        matches!(self, PlanarVariant::Schnyder | PlanarVariant::MixedModel)
    }
}

/// Edge-count bound every simple planar graph satisfies
pub(crate) fn may_be_planar(attrs: &GraphAttributes) -> bool {
    let n = attrs.node_count();
    n < 3 || topology::simple_edge_count(attrs) <= 3 * n - 6
}

#[derive(Debug, Clone)]
pub struct PlanarGridLayout {
    variant: PlanarVariant,
    options: LayoutOptions,
}

impl PlanarGridLayout {
    pub fn new(variant: PlanarVariant, options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            variant,
            options: checked(options)?,
        })
    }

    pub fn variant(&self) -> PlanarVariant {
        self.variant
    }

    fn layering(&self, attrs: &GraphAttributes) -> Vec<usize> {
        let adj = topology::undirected_adjacency(attrs);
        let root = if self.variant.roots_at_hub() {
            // First node among those of maximum degree.
            (0..adj.len())
                .rev()
                .max_by_key(|&v| adj[v].len())
                .unwrap_or(0)
        } else {
            0
        };
        topology::bfs_distances(&adj, root)
            .into_iter()
            .map(|d| d.unwrap_or(0))
            .collect()
    }
}

impl LayoutModule for PlanarGridLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(
            Level::DEBUG,
            "planar_grid_layout",
            variant = ?self.variant,
            nodes = attributes.node_count()
        );
        let _enter = layout_span.enter();

        if attributes.is_empty() {
            return Ok(());
        }
        if self.variant.rejects_self_loops() && topology::has_self_loop(attributes) {
            return Err(PreconditionViolatedCode::SelfLoop.into());
        }
        if !may_be_planar(attributes) {
            return Err(PreconditionViolatedCode::Planar.into());
        }
        attributes.clear_bends();

        let deadline = Deadline::new(self.options.time_limit());
        let drawing = Drawing {
            routing: self.variant.routing(),
            grid: Some(self.options.node_spacing.min(self.options.level_spacing)),
        };
        let options = &self.options;
        for_each_component(attributes, options.node_spacing, |component| {
            let layers = self.layering(component);
            draw_hierarchy(component, Some(layers), drawing, options, &deadline)
        })?;
        debug!("Planar grid layout finished");
        Ok(())
    }

    fn name(&self) -> &'static str {
        match self.variant {
            PlanarVariant::PlanarStraight => "planar-straight",
            PlanarVariant::PlanarDraw => "planar-draw",
            PlanarVariant::Fpp => "fpp",
            PlanarVariant::Schnyder => "schnyder",
            PlanarVariant::MixedModel => "mixed-model",
        }
    }
}
