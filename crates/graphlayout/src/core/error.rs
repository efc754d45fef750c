//! Failure taxonomy for layout modules
//!
//! Layout modules report failures as a tagged value: a category plus a
//! sub-code from a closed enumeration. The adapter never lets a failure
//! escape `call()`; it hands it to the diagnostics translator instead.

use std::fmt;
use thiserror::Error;

/// Internal inconsistencies detected while an algorithm runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFailureCode {
    Unknown,
    IllegalParameter,
    NoFlow,
    Sort,
    Label,
    ExternalFace,
    ForbiddenCrossing,
    TimelimitExceeded,
    NoSolutionFound,
    Stop,
}

impl AlgorithmFailureCode {
    pub const ALL: [AlgorithmFailureCode; 10] = [
        AlgorithmFailureCode::Unknown,
        AlgorithmFailureCode::IllegalParameter,
        AlgorithmFailureCode::NoFlow,
        AlgorithmFailureCode::Sort,
        AlgorithmFailureCode::Label,
        AlgorithmFailureCode::ExternalFace,
        AlgorithmFailureCode::ForbiddenCrossing,
        AlgorithmFailureCode::TimelimitExceeded,
        AlgorithmFailureCode::NoSolutionFound,
        AlgorithmFailureCode::Stop,
    ];

    /// Reason phrase completing "Layout algorithm failed, because ..."
    ///
    /// `Unknown` and `Stop` are bookkeeping values and have no phrase.
    pub fn phrase(self) -> Option<&'static str> {
        match self {
            AlgorithmFailureCode::Unknown | AlgorithmFailureCode::Stop => None,
            AlgorithmFailureCode::IllegalParameter => Some("of an illegal parameter"),
            AlgorithmFailureCode::NoFlow => Some("min-cost flow solver could not find a legal flow"),
            AlgorithmFailureCode::Sort => Some("sequence is not sorted"),
            AlgorithmFailureCode::Label => Some("labelling failed"),
            AlgorithmFailureCode::ExternalFace => Some("external face is not correct"),
            AlgorithmFailureCode::ForbiddenCrossing => Some("crossing were forbidden"),
            AlgorithmFailureCode::TimelimitExceeded => Some("timelimit exceeded"),
            AlgorithmFailureCode::NoSolutionFound => Some("it could not find a solution"),
        }
    }
}

impl fmt::Display for AlgorithmFailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Structural requirements an input graph failed to meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreconditionViolatedCode {
    Unknown,
    SelfLoop,
    TreeHierarchies,
    AcyclicHierarchies,
    SingleSource,
    UpwardPlanar,
    Tree,
    Forest,
    Orthogonal,
    Planar,
    ClusterPlanar,
    NoCopy,
    Connected,
    Biconnected,
    Stop,
}

impl PreconditionViolatedCode {
    pub const ALL: [PreconditionViolatedCode; 15] = [
        PreconditionViolatedCode::Unknown,
        PreconditionViolatedCode::SelfLoop,
        PreconditionViolatedCode::TreeHierarchies,
        PreconditionViolatedCode::AcyclicHierarchies,
        PreconditionViolatedCode::SingleSource,
        PreconditionViolatedCode::UpwardPlanar,
        PreconditionViolatedCode::Tree,
        PreconditionViolatedCode::Forest,
        PreconditionViolatedCode::Orthogonal,
        PreconditionViolatedCode::Planar,
        PreconditionViolatedCode::ClusterPlanar,
        PreconditionViolatedCode::NoCopy,
        PreconditionViolatedCode::Connected,
        PreconditionViolatedCode::Biconnected,
        PreconditionViolatedCode::Stop,
    ];

    /// Subject phrase for "..., which violates layout preconditions"
    ///
    /// `Unknown` and `Stop` are bookkeeping values and have no phrase.
    pub fn phrase(self) -> Option<&'static str> {
        use PreconditionViolatedCode::*;
        match self {
            Unknown | Stop => None,
            SelfLoop => Some("Graph contains a self-loop"),
            TreeHierarchies => Some("Graph is not a tree"),
            AcyclicHierarchies => Some("Graph is not acyclic"),
            SingleSource => Some("Graph has not a single source"),
            UpwardPlanar => Some("Graph is not upward planar"),
            Tree => Some("Graph is not a rooted tree"),
            Forest => Some("Graph is not a rooted forest"),
            Orthogonal => Some("Layout is not orthogonal"),
            Planar => Some("Graph is not planar"),
            ClusterPlanar => Some("Graph is not cluster planar"),
            NoCopy => Some("Graph is not a copy of the corresponding graph"),
            Connected => Some("Graph is not connected"),
            Biconnected => Some("Graph is not twoconnected"),
        }
    }
}

impl fmt::Display for PreconditionViolatedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A failure raised by a layout module
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutFailure {
    #[error("algorithm failure: {0}")]
    Algorithm(AlgorithmFailureCode),

    #[error("precondition violated: {0}")]
    Precondition(PreconditionViolatedCode),

    /// Raised by modules wrapping an external layout library. No built-in
    /// engine produces it; such modules are plugged in through the
    /// `with_inner` constructors of the wrappers in `layouts::meta`.
    #[error("layout library failure: {0}")]
    Library(String),

    #[error("unclassified failure: {0}")]
    Other(String),
}

impl LayoutFailure {
    /// Shorthand for a precondition violation
    pub fn precondition(code: PreconditionViolatedCode) -> Self {
        Self::Precondition(code)
    }

    /// Shorthand for an algorithm failure
    pub fn algorithm(code: AlgorithmFailureCode) -> Self {
        Self::Algorithm(code)
    }
}

impl From<AlgorithmFailureCode> for LayoutFailure {
    fn from(code: AlgorithmFailureCode) -> Self {
        Self::Algorithm(code)
    }
}

impl From<PreconditionViolatedCode> for LayoutFailure {
    fn from(code: PreconditionViolatedCode) -> Self {
        Self::Precondition(code)
    }
}
