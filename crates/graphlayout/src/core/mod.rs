//! Core abstractions for running layouts
//!
//! Graph attributes, the layout module trait, the failure taxonomy and its
//! translation into diagnostics, change signals and configuration.

mod attributes;
mod diagnostics;
mod error;
mod geometry;
pub mod logging;
mod module;
mod options;
mod signal;
pub mod topology;

pub use attributes::*;
pub use diagnostics::*;
pub use error::*;
pub use geometry::*;
pub use module::*;
pub use options::*;
pub use signal::*;
