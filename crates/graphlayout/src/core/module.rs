//! Core trait for layout modules
//!
//! A layout module arranges the nodes (and optionally edge bends) of a
//! [`GraphAttributes`] in place.

use super::{GraphAttributes, LayoutFailure};

/// Core trait for layout algorithms
///
/// Modules are owned exclusively by the adapter that created them and are
/// replaced wholesale when the selected algorithm changes.
///
/// # Example
/// ```
/// use graphlayout::core::{GraphAttributes, LayoutModule};
/// use graphlayout::layouts::CircularLayout;
///
/// let mut attributes = GraphAttributes::new();
/// attributes.add_node("a").unwrap();
/// let mut layout = CircularLayout::default();
/// layout.call(&mut attributes).unwrap();
/// ```
pub trait LayoutModule {
    /// Compute the layout, mutating `attributes` in place
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure>;

    /// Short name of this module, used in log output
    fn name(&self) -> &'static str;
}

impl<M: LayoutModule + ?Sized> LayoutModule for Box<M> {
    fn call(&mut self, attributes: &mut GraphAttributes) -> Result<(), LayoutFailure> {
        (**self).call(attributes)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
