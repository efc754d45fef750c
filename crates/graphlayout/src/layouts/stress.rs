//! Distance-based layouts
//!
//! Both variants place nodes so that geometric distances approximate
//! graph-theoretic distances scaled by the ideal edge length. Node pairs in
//! different components are treated as one hop further apart than the
//! largest finite distance.

use tracing::{debug, span, trace, Level};

use super::{checked, normalize, spiral_positions, Deadline};
use crate::core::{topology, GraphAttributes, LayoutFailure, LayoutModule, LayoutOptions, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressVariant {
    /// Spring model with springs between every pair, relaxed one node at a time
    KamadaKawai,
    /// Localized stress majorization
    StressMinimization,
}

#[derive(Debug, Clone)]
pub struct StressLayout {
    variant: StressVariant,
    options: LayoutOptions,
}

impl StressLayout {
    pub fn new(variant: StressVariant, options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            variant,
            options: checked(options)?,
        })
    }

    pub fn variant(&self) -> StressVariant {
        self.variant
    }
}

/// All-pairs target distances in ideal edge lengths
fn target_distances(attrs: &GraphAttributes, k: f64) -> Vec<Vec<f64>> {
    let adj = topology::undirected_adjacency(attrs);
    let hops: Vec<Vec<Option<usize>>> = (0..adj.len())
        .map(|v| topology::bfs_distances(&adj, v))
        .collect();
    let max_hops = hops
        .iter()
        .flatten()
        .filter_map(|d| *d)
        .max()
        .unwrap_or(0);
    hops.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|d| d.unwrap_or(max_hops + 1) as f64 * k)
                .collect()
        })
        .collect()
}

/// Stress of a placement: sum over pairs of w * (|pi - pj| - dij)^2
fn stress(positions: &[Point], targets: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let d = targets[i][j];
            let diff = positions[i].distance(positions[j]) - d;
            total += diff * diff / (d * d);
        }
    }
    total
}

/// Majorization target for node `i` given all other positions
fn relaxed(i: usize, positions: &[Point], targets: &[Vec<f64>]) -> Point {
    let mut sum = Point::zero();
    let mut weights = 0.0;
    for (j, &pj) in positions.iter().enumerate() {
        if i == j {
            continue;
        }
        let d = targets[i][j];
        let w = 1.0 / (d * d);
        let delta = positions[i] - pj;
        let len = delta.length();
        let direction = if len > 1e-9 {
            delta * (1.0 / len)
        } else {
            // Coincident nodes are pushed apart along a fixed axis.
            Point::new(if i < j { 1.0 } else { -1.0 }, 0.0)
        };
        sum = sum + (pj + direction * d) * w;
        weights += w;
    }
    if weights > 0.0 {
        sum * (1.0 / weights)
    } else {
        positions[i]
    }
}

impl LayoutModule for StressLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(
            Level::DEBUG,
            "stress_layout",
            variant = ?self.variant,
            nodes = attributes.node_count()
        );
        let _enter = layout_span.enter();

        attributes.clear_bends();
        let n = attributes.node_count();
        if n == 0 {
            return Ok(());
        }

        let deadline = Deadline::new(self.options.time_limit());
        let k = self.options.ideal_edge_length;
        let targets = target_distances(attributes, k);
        let mut positions = spiral_positions(n, k, self.options.seed);
        let tolerance = 1e-5;
        let mut previous = stress(&positions, &targets);

        for iteration in 0..self.options.iterations {
            deadline.check()?;
            match self.variant {
                StressVariant::StressMinimization => {
                    for i in 0..n {
                        positions[i] = relaxed(i, &positions, &targets);
                    }
                }
                StressVariant::KamadaKawai => {
                    // Move the node farthest from its relaxed position, damped.
                    let best = (0..n)
                        .map(|i| {
                            let target = relaxed(i, &positions, &targets);
                            (i, target, target.distance(positions[i]))
                        })
                        .max_by(|a, b| a.2.total_cmp(&b.2));
                    if let Some((i, target, _)) = best {
                        positions[i] = positions[i] + (target - positions[i]) * 0.9;
                    }
                }
            }

            let current = stress(&positions, &targets);
            if previous - current < tolerance * previous.max(1e-12) && iteration > 0 {
                trace!(iteration, stress = current, "Converged");
                break;
            }
            previous = current;
        }

        for (node, p) in attributes.nodes().collect::<Vec<_>>().into_iter().zip(positions) {
            attributes.set_position(node, p);
        }
        normalize(attributes);
        debug!(stress = previous, "Stress layout finished");
        Ok(())
    }

    fn name(&self) -> &'static str {
        match self.variant {
            StressVariant::KamadaKawai => "spring-embedder-kk",
            StressVariant::StressMinimization => "stress-minimization",
        }
    }
}
