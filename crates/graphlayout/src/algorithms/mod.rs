//! Algorithm selection
//!
//! [`Algorithm`] is the closed set of layout identifiers a host can pick
//! from. [`Registry`] turns an identifier into a ready-to-run module.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::core::{LayoutFailure, LayoutModule, LayoutOptions};
use crate::layouts::{
    BalloonLayout, CircularLayout, ComponentSplitterLayout, EnergyLayout, EnergyVariant, LayeredLayout,
    LayeredStyle, PlanarGridLayout, PlanarVariant, PreprocessorLayout, RadialTreeLayout, ScalingLayout,
    StressLayout, StressVariant, TreeLayout, TutteLayout,
};

/// Layout algorithm identifier
///
/// Numeric ids are stable and follow declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    BalloonLayout,
    CircularLayout,
    ComponentSplitterLayout,
    DavidsonHarelLayout,
    DominanceLayout,
    #[default]
    FMMMLayout,
    FPPLayout,
    FastMultipoleEmbedder,
    FastMultipoleMultilevelEmbedder,
    GEMLayout,
    MixedModelLayout,
    ModularMultilevelMixer,
    MultilevelLayout,
    PlanarDrawLayout,
    PlanarStraightLayout,
    PlanarizationGridLayout,
    PlanarizationLayout,
    PreprocessorLayout,
    RadialTreeLayout,
    ScalingLayout,
    SchnyderLayout,
    SpringEmbedderFRExact,
    SpringEmbedderKK,
    StressMinimization,
    SugiyamaLayout,
    TreeLayout,
    TutteLayout,
    VisibilityLayout,
}

/// Coarse grouping of algorithms, used for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    Energy,
    Layered,
    Tree,
    Circular,
    Planar,
    Planarization,
    Meta,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Energy => "energy",
            Family::Layered => "layered",
            Family::Tree => "tree",
            Family::Circular => "circular",
            Family::Planar => "planar",
            Family::Planarization => "planarization",
            Family::Meta => "meta",
        };
        f.pad(name)
    }
}

/// Unrecognized algorithm name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown layout algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl Algorithm {
    pub const ALL: [Algorithm; 28] = [
        Algorithm::BalloonLayout,
        Algorithm::CircularLayout,
        Algorithm::ComponentSplitterLayout,
        Algorithm::DavidsonHarelLayout,
        Algorithm::DominanceLayout,
        Algorithm::FMMMLayout,
        Algorithm::FPPLayout,
        Algorithm::FastMultipoleEmbedder,
        Algorithm::FastMultipoleMultilevelEmbedder,
        Algorithm::GEMLayout,
        Algorithm::MixedModelLayout,
        Algorithm::ModularMultilevelMixer,
        Algorithm::MultilevelLayout,
        Algorithm::PlanarDrawLayout,
        Algorithm::PlanarStraightLayout,
        Algorithm::PlanarizationGridLayout,
        Algorithm::PlanarizationLayout,
        Algorithm::PreprocessorLayout,
        Algorithm::RadialTreeLayout,
        Algorithm::ScalingLayout,
        Algorithm::SchnyderLayout,
        Algorithm::SpringEmbedderFRExact,
        Algorithm::SpringEmbedderKK,
        Algorithm::StressMinimization,
        Algorithm::SugiyamaLayout,
        Algorithm::TreeLayout,
        Algorithm::TutteLayout,
        Algorithm::VisibilityLayout,
    ];

    pub fn id(self) -> u32 {
        self as u32
    }

    /// Identifier for a host-supplied number; `None` if out of range
    pub fn from_id(id: i64) -> Option<Self> {
        usize::try_from(id).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Kebab-case name, as used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BalloonLayout => "balloon",
            Algorithm::CircularLayout => "circular",
            Algorithm::ComponentSplitterLayout => "component-splitter",
            Algorithm::DavidsonHarelLayout => "davidson-harel",
            Algorithm::DominanceLayout => "dominance",
            Algorithm::FMMMLayout => "fmmm",
            Algorithm::FPPLayout => "fpp",
            Algorithm::FastMultipoleEmbedder => "fast-multipole-embedder",
            Algorithm::FastMultipoleMultilevelEmbedder => "fast-multipole-multilevel-embedder",
            Algorithm::GEMLayout => "gem",
            Algorithm::MixedModelLayout => "mixed-model",
            Algorithm::ModularMultilevelMixer => "modular-multilevel-mixer",
            Algorithm::MultilevelLayout => "multilevel",
            Algorithm::PlanarDrawLayout => "planar-draw",
            Algorithm::PlanarStraightLayout => "planar-straight",
            Algorithm::PlanarizationGridLayout => "planarization-grid",
            Algorithm::PlanarizationLayout => "planarization",
            Algorithm::PreprocessorLayout => "preprocessor",
            Algorithm::RadialTreeLayout => "radial-tree",
            Algorithm::ScalingLayout => "scaling",
            Algorithm::SchnyderLayout => "schnyder",
            Algorithm::SpringEmbedderFRExact => "spring-embedder-fr-exact",
            Algorithm::SpringEmbedderKK => "spring-embedder-kk",
            Algorithm::StressMinimization => "stress-minimization",
            Algorithm::SugiyamaLayout => "sugiyama",
            Algorithm::TreeLayout => "tree",
            Algorithm::TutteLayout => "tutte",
            Algorithm::VisibilityLayout => "visibility",
        }
    }

    /// The CamelCase identifier, e.g. `FMMMLayout`
    pub fn identifier(self) -> String {
        format!("{self:?}")
    }

    pub fn family(self) -> Family {
        use Algorithm::*;
        match self {
            DavidsonHarelLayout | FMMMLayout | FastMultipoleEmbedder | FastMultipoleMultilevelEmbedder
            | GEMLayout | ModularMultilevelMixer | MultilevelLayout | SpringEmbedderFRExact
            | SpringEmbedderKK | StressMinimization | TutteLayout => Family::Energy,
            SugiyamaLayout | VisibilityLayout | DominanceLayout => Family::Layered,
            TreeLayout | RadialTreeLayout => Family::Tree,
            CircularLayout | BalloonLayout => Family::Circular,
            PlanarStraightLayout | PlanarDrawLayout | FPPLayout | SchnyderLayout | MixedModelLayout => {
                Family::Planar
            }
            PlanarizationLayout | PlanarizationGridLayout => Family::Planarization,
            ComponentSplitterLayout | ScalingLayout | PreprocessorLayout => Family::Meta,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    /// Accepts the kebab-case name or the CamelCase identifier, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(wanted) || a.identifier().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Constructs layout modules from identifiers
#[derive(Debug, Clone, Default)]
pub struct Registry {
    options: LayoutOptions,
}

impl Registry {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Build the module for `algorithm`
    ///
    /// Fails with an illegal-parameter failure when the configured options
    /// are unusable.
    pub fn create(&self, algorithm: Algorithm) -> Result<Box<dyn LayoutModule>, LayoutFailure> {
        let o = self.options.clone();
        let module: Box<dyn LayoutModule> = match algorithm {
            Algorithm::BalloonLayout => Box::new(BalloonLayout::new(o)?),
            Algorithm::CircularLayout => Box::new(CircularLayout::new(o)?),
            Algorithm::ComponentSplitterLayout => Box::new(ComponentSplitterLayout::new(o)?),
            Algorithm::DavidsonHarelLayout => Box::new(EnergyLayout::new(EnergyVariant::DavidsonHarel, o)?),
            Algorithm::DominanceLayout => Box::new(LayeredLayout::new(LayeredStyle::Dominance, o)?),
            Algorithm::FMMMLayout => Box::new(EnergyLayout::new(EnergyVariant::Fmmm, o)?),
            Algorithm::FPPLayout => Box::new(PlanarGridLayout::new(PlanarVariant::Fpp, o)?),
            Algorithm::FastMultipoleEmbedder => Box::new(EnergyLayout::new(EnergyVariant::FastMultipole, o)?),
            Algorithm::FastMultipoleMultilevelEmbedder => {
                Box::new(EnergyLayout::new(EnergyVariant::FastMultipoleMultilevel, o)?)
            }
            Algorithm::GEMLayout => Box::new(EnergyLayout::new(EnergyVariant::Gem, o)?),
            Algorithm::MixedModelLayout => Box::new(PlanarGridLayout::new(PlanarVariant::MixedModel, o)?),
            Algorithm::ModularMultilevelMixer => {
                Box::new(EnergyLayout::new(EnergyVariant::ModularMultilevelMixer, o)?)
            }
            Algorithm::MultilevelLayout => Box::new(EnergyLayout::new(EnergyVariant::Multilevel, o)?),
            Algorithm::PlanarDrawLayout => Box::new(PlanarGridLayout::new(PlanarVariant::PlanarDraw, o)?),
            Algorithm::PlanarStraightLayout => Box::new(PlanarGridLayout::new(PlanarVariant::PlanarStraight, o)?),
            Algorithm::PlanarizationGridLayout => {
                Box::new(LayeredLayout::new(LayeredStyle::PlanarizationGrid, o)?)
            }
            Algorithm::PlanarizationLayout => Box::new(LayeredLayout::new(LayeredStyle::Planarization, o)?),
            Algorithm::PreprocessorLayout => Box::new(PreprocessorLayout::new(o)?),
            Algorithm::RadialTreeLayout => Box::new(RadialTreeLayout::new(o)?),
            Algorithm::ScalingLayout => Box::new(ScalingLayout::new(o)?),
            Algorithm::SchnyderLayout => Box::new(PlanarGridLayout::new(PlanarVariant::Schnyder, o)?),
            Algorithm::SpringEmbedderFRExact => Box::new(EnergyLayout::new(EnergyVariant::SpringFrExact, o)?),
            Algorithm::SpringEmbedderKK => Box::new(StressLayout::new(StressVariant::KamadaKawai, o)?),
            Algorithm::StressMinimization => Box::new(StressLayout::new(StressVariant::StressMinimization, o)?),
            Algorithm::SugiyamaLayout => Box::new(LayeredLayout::new(LayeredStyle::Sugiyama, o)?),
            Algorithm::TreeLayout => Box::new(TreeLayout::new(o)?),
            Algorithm::TutteLayout => Box::new(TutteLayout::new(o)?),
            Algorithm::VisibilityLayout => Box::new(LayeredLayout::new(LayeredStyle::Visibility, o)?),
        };
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AlgorithmFailureCode;
    use std::collections::HashSet;

    #[test]
    fn test_ids_follow_declaration_order() {
        for (i, algorithm) in Algorithm::ALL.iter().enumerate() {
            assert_eq!(algorithm.id() as usize, i);
        }
        assert_eq!(Algorithm::BalloonLayout.id(), 0);
        assert_eq!(Algorithm::FMMMLayout.id(), 5);
        assert_eq!(Algorithm::VisibilityLayout.id(), 27);
    }

    #[test]
    fn test_from_id_out_of_range() {
        assert_eq!(Algorithm::from_id(-1), None);
        assert_eq!(Algorithm::from_id(28), None);
        assert_eq!(Algorithm::from_id(i64::MAX), None);
        assert_eq!(Algorithm::from_id(24), Some(Algorithm::SugiyamaLayout));
    }

    #[test]
    fn test_default_is_fmmm() {
        assert_eq!(Algorithm::default(), Algorithm::FMMMLayout);
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = Algorithm::ALL.iter().map(|a| a.name()).collect();
        assert_eq!(names.len(), 28);
    }

    #[test]
    fn test_parse_accepts_both_spellings() {
        assert_eq!("sugiyama".parse::<Algorithm>().unwrap(), Algorithm::SugiyamaLayout);
        assert_eq!("SugiyamaLayout".parse::<Algorithm>().unwrap(), Algorithm::SugiyamaLayout);
        assert_eq!("fmmmlayout".parse::<Algorithm>().unwrap(), Algorithm::FMMMLayout);
        assert_eq!(" Radial-Tree ".parse::<Algorithm>().unwrap(), Algorithm::RadialTreeLayout);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "spectral".parse::<Algorithm>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown layout algorithm: spectral");
    }

    #[test]
    fn test_families() {
        assert_eq!(Algorithm::TutteLayout.family(), Family::Energy);
        assert_eq!(Algorithm::PlanarizationGridLayout.family(), Family::Planarization);
        assert_eq!(Algorithm::ScalingLayout.family(), Family::Meta);
        assert_eq!(Family::Planar.to_string(), "planar");
    }

    #[test]
    fn test_registry_module_names_match() {
        let registry = Registry::default();
        for algorithm in Algorithm::ALL {
            let module = registry.create(algorithm).unwrap();
            assert_eq!(module.name(), algorithm.name());
        }
    }

    #[test]
    fn test_registry_rejects_illegal_options() {
        let registry = Registry::new(LayoutOptions {
            level_spacing: -5.0,
            ..Default::default()
        });
        for algorithm in Algorithm::ALL {
            assert_eq!(
                registry.create(algorithm).err(),
                Some(LayoutFailure::Algorithm(AlgorithmFailureCode::IllegalParameter)),
                "{algorithm}"
            );
        }
    }
}
