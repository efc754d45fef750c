//! Force-directed layouts
//!
//! One spring-electrical engine (attraction along edges, repulsion between
//! all node pairs, a cooling schedule) with presets for the force-directed
//! family members of the algorithm registry.

use tracing::{debug, span, trace, Level};

use super::{checked, normalize, spiral_positions, Deadline};
use crate::core::{topology, GraphAttributes, LayoutFailure, LayoutModule, LayoutOptions, Point};

/// Force-directed family member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyVariant {
    Fmmm,
    FastMultipole,
    FastMultipoleMultilevel,
    SpringFrExact,
    Gem,
    DavidsonHarel,
    Multilevel,
    ModularMultilevelMixer,
}

/// Tuning applied on top of [`LayoutOptions`]
#[derive(Debug, Clone, Copy)]
struct Preset {
    /// Multiplier on the configured iteration budget
    iteration_scale: f64,
    /// Initial maximum displacement, in ideal edge lengths
    temperature: f64,
    /// Per-iteration temperature decay
    cooling: f64,
    /// Pull toward the barycenter, relative to attraction
    gravity: f64,
    /// Ignore repulsion beyond this many ideal edge lengths
    cutoff: Option<f64>,
    /// Run a coarse warm-up pass with stretched edges first
    warm_up: bool,
}

impl EnergyVariant {
    fn preset(self) -> Preset {
        let base = Preset {
            iteration_scale: 1.0,
            temperature: 1.0,
            cooling: 0.97,
            gravity: 0.02,
            cutoff: None,
            warm_up: false,
        };
        match self {
            EnergyVariant::Fmmm => Preset { warm_up: true, ..base },
            EnergyVariant::FastMultipole => Preset {
                cutoff: Some(4.0),
                ..base
            },
            EnergyVariant::FastMultipoleMultilevel => Preset {
                cutoff: Some(4.0),
                warm_up: true,
                ..base
            },
            EnergyVariant::SpringFrExact => Preset {
                iteration_scale: 1.5,
                cooling: 0.98,
                ..base
            },
            EnergyVariant::Gem => Preset {
                temperature: 0.5,
                gravity: 0.1,
                ..base
            },
            EnergyVariant::DavidsonHarel => Preset {
                iteration_scale: 2.0,
                temperature: 0.8,
                cooling: 0.985,
                gravity: 0.05,
                ..base
            },
            EnergyVariant::Multilevel => Preset {
                warm_up: true,
                cooling: 0.96,
                ..base
            },
            EnergyVariant::ModularMultilevelMixer => Preset {
                warm_up: true,
                iteration_scale: 1.25,
                ..base
            },
        }
    }

    fn module_name(self) -> &'static str {
        match self {
            EnergyVariant::Fmmm => "fmmm",
            EnergyVariant::FastMultipole => "fast-multipole-embedder",
            EnergyVariant::FastMultipoleMultilevel => "fast-multipole-multilevel-embedder",
            EnergyVariant::SpringFrExact => "spring-embedder-fr-exact",
            EnergyVariant::Gem => "gem",
            EnergyVariant::DavidsonHarel => "davidson-harel",
            EnergyVariant::Multilevel => "multilevel",
            EnergyVariant::ModularMultilevelMixer => "modular-multilevel-mixer",
        }
    }
}

/// Spring-electrical layout
#[derive(Debug, Clone)]
pub struct EnergyLayout {
    variant: EnergyVariant,
    options: LayoutOptions,
}

impl Default for EnergyLayout {
    /// Force-directed layout with the FMMM preset and default options
    fn default() -> Self {
        Self {
            variant: EnergyVariant::Fmmm,
            options: LayoutOptions::default(),
        }
    }
}

impl EnergyLayout {
    /// Create an energy layout; fails with an illegal-parameter failure if
    /// the options are unusable
    pub fn new(variant: EnergyVariant, options: LayoutOptions) -> Result<Self, LayoutFailure> {
        Ok(Self {
            variant,
            options: checked(options)?,
        })
    }

    pub fn variant(&self) -> EnergyVariant {
        self.variant
    }

    fn simulate(
        &self,
        positions: &mut [Point],
        edges: &[(usize, usize)],
        k: f64,
        iterations: usize,
        preset: &Preset,
        deadline: &Deadline,
    ) -> Result<(), LayoutFailure> {
        let n = positions.len();
        let mut temperature = k * preset.temperature;
        let cutoff = preset.cutoff.map(|c| c * k);
        let mut disp = vec![Point::zero(); n];

        for iteration in 0..iterations {
            deadline.check()?;
            disp.iter_mut().for_each(|d| *d = Point::zero());

            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = positions[i] - positions[j];
                    let dist = delta.length().max(0.01);
                    if cutoff.is_some_and(|c| dist > c) {
                        continue;
                    }
                    let force = k * k / dist;
                    let push = delta * (force / dist);
                    disp[i] = disp[i] + push;
                    disp[j] = disp[j] - push;
                }
            }

            for &(s, t) in edges {
                let delta = positions[s] - positions[t];
                let dist = delta.length().max(0.01);
                let pull = delta * (dist / k);
                disp[s] = disp[s] - pull;
                disp[t] = disp[t] + pull;
            }

            if preset.gravity > 0.0 {
                let center = positions.iter().fold(Point::zero(), |acc, &p| acc + p) * (1.0 / n as f64);
                for (p, d) in positions.iter().zip(disp.iter_mut()) {
                    *d = *d - (*p - center) * preset.gravity;
                }
            }

            let mut moved = 0.0f64;
            for (p, d) in positions.iter_mut().zip(&disp) {
                let len = d.length();
                if len > 1e-9 {
                    let step = len.min(temperature);
                    *p = *p + *d * (step / len);
                    moved = moved.max(step);
                }
            }
            temperature *= preset.cooling;

            if moved < 1e-3 * k {
                trace!(iteration, "Converged");
                break;
            }
        }
        Ok(())
    }
}

impl LayoutModule for EnergyLayout {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        let layout_span = span!(
            Level::DEBUG,
            "energy_layout",
            variant = self.variant.module_name(),
            nodes = attributes.node_count()
        );
        let _enter = layout_span.enter();

        attributes.clear_bends();
        if attributes.is_empty() {
            return Ok(());
        }

        let preset = self.variant.preset();
        let deadline = Deadline::new(self.options.time_limit());
        let k = self.options.ideal_edge_length;
        let adjacency = topology::undirected_adjacency(attributes);
        let edges: Vec<(usize, usize)> = adjacency
            .iter()
            .enumerate()
            .flat_map(|(v, ns)| ns.iter().filter(move |&&w| v < w).map(move |&w| (v, w)))
            .collect();

        let mut positions = spiral_positions(attributes.node_count(), k, self.options.seed);
        let iterations = ((self.options.iterations as f64) * preset.iteration_scale).ceil() as usize;

        if preset.warm_up {
            let coarse = Preset {
                temperature: preset.temperature * 2.0,
                ..preset
            };
            self.simulate(&mut positions, &edges, k * 2.0, iterations / 4 + 1, &coarse, &deadline)?;
        }
        self.simulate(&mut positions, &edges, k, iterations, &preset, &deadline)?;

        for (n, p) in attributes.nodes().collect::<Vec<_>>().into_iter().zip(positions) {
            attributes.set_position(n, p);
        }
        normalize(attributes);
        debug!(iterations, "Energy layout finished");
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.variant.module_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AlgorithmFailureCode;
    use crate::layouts::testing::*;
    use petgraph::graph::NodeIndex;

    fn layout(variant: EnergyVariant) -> EnergyLayout {
        EnergyLayout::new(variant, LayoutOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_graph() {
        let mut g = GraphAttributes::new();
        assert!(layout(EnergyVariant::Fmmm).call(&mut g).is_ok());
    }

    #[test]
    fn test_connected_nodes_closer_than_unconnected() {
        let mut g = graph(&["a", "b", "c"], &[("a", "b")]);
        layout(EnergyVariant::Fmmm).call(&mut g).unwrap();
        let a = g.position(NodeIndex::new(0));
        let b = g.position(NodeIndex::new(1));
        let c = g.position(NodeIndex::new(2));
        assert!(a.distance(b) < a.distance(c));
        assert!(a.distance(b) < b.distance(c));
    }

    #[test]
    fn test_all_variants_produce_finite_distinct_positions() {
        for variant in [
            EnergyVariant::Fmmm,
            EnergyVariant::FastMultipole,
            EnergyVariant::FastMultipoleMultilevel,
            EnergyVariant::SpringFrExact,
            EnergyVariant::Gem,
            EnergyVariant::DavidsonHarel,
            EnergyVariant::Multilevel,
            EnergyVariant::ModularMultilevelMixer,
        ] {
            let mut g = path(6);
            layout(variant).call(&mut g).unwrap();
            assert!(all_finite(&g), "{variant:?}");
            assert!(distinct_positions(&g), "{variant:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let mut first = path(5);
        let mut second = path(5);
        layout(EnergyVariant::Gem).call(&mut first).unwrap();
        layout(EnergyVariant::Gem).call(&mut second).unwrap();
        for n in first.nodes() {
            assert_eq!(first.position(n), second.position(n));
        }
    }

    #[test]
    fn test_illegal_options_rejected() {
        let options = LayoutOptions {
            ideal_edge_length: -1.0,
            ..Default::default()
        };
        let err = EnergyLayout::new(EnergyVariant::Fmmm, options).unwrap_err();
        assert_eq!(err, LayoutFailure::Algorithm(AlgorithmFailureCode::IllegalParameter));
    }

    #[test]
    fn test_time_limit_exceeded() {
        let options = LayoutOptions {
            time_limit_ms: Some(0),
            iterations: 100_000,
            ..Default::default()
        };
        let mut module = EnergyLayout::new(EnergyVariant::SpringFrExact, options).unwrap();
        let mut g = path(40);
        let result = module.call(&mut g);
        assert_eq!(
            result,
            Err(LayoutFailure::Algorithm(AlgorithmFailureCode::TimelimitExceeded))
        );
    }
}
