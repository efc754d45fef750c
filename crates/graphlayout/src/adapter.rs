//! The layout adapter
//!
//! [`GraphLayout`] holds the selected [`Algorithm`], the module built for
//! it and a validity flag telling whether the referenced attributes hold
//! the result of a successful run of that module. Failures never escape
//! [`GraphLayout::call`]: they are translated into diagnostics and handed
//! to a [`DiagnosticSink`], and the adapter simply stays invalid.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use graphlayout::prelude::*;
//!
//! let attributes = Rc::new(RefCell::new(GraphAttributes::new()));
//! attributes.borrow_mut().add_node("a").unwrap();
//!
//! let mut layout = GraphLayout::new(&attributes);
//! layout.set_algorithm(Algorithm::CircularLayout);
//! layout.call();
//! assert!(layout.valid());
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::{debug, info, span, trace, Level};

use crate::algorithms::{Algorithm, Registry};
use crate::core::{
    diagnostic, ConnectionId, DiagnosticSink, GraphAttributes, LayoutFailure, LayoutModule, LayoutOptions, Signal,
    TracingSink,
};
use crate::layouts::EnergyLayout;

/// Runs the selected layout algorithm against caller-owned attributes
pub struct GraphLayout {
    attributes: Weak<RefCell<GraphAttributes>>,
    registry: Registry,
    layout: Box<dyn LayoutModule>,
    algorithm: Algorithm,
    valid: bool,
    last_failure: Option<LayoutFailure>,
    algorithm_changed: Signal,
    valid_changed: Signal,
    sink: Box<dyn DiagnosticSink>,
}

impl GraphLayout {
    /// Adapter for `attributes` with the default algorithm and options
    ///
    /// Only a weak reference is kept; the caller stays the owner.
    pub fn new(attributes: &Rc<RefCell<GraphAttributes>>) -> Self {
        Self {
            attributes: Rc::downgrade(attributes),
            registry: Registry::default(),
            layout: Box::new(EnergyLayout::default()),
            algorithm: Algorithm::default(),
            valid: false,
            last_failure: None,
            algorithm_changed: Signal::new(),
            valid_changed: Signal::new(),
            sink: Box::new(TracingSink),
        }
    }

    /// Adapter whose modules are built with `options`
    ///
    /// Fails if the options are unusable for the default algorithm.
    pub fn with_options(
        attributes: &Rc<RefCell<GraphAttributes>>,
        options: LayoutOptions,
    ) -> Result<Self, LayoutFailure> {
        let registry = Registry::new(options);
        let layout = registry.create(Algorithm::default())?;
        Ok(Self {
            registry,
            layout,
            ..Self::new(attributes)
        })
    }

    /// Replace the diagnostic sink
    pub fn with_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn options(&self) -> &LayoutOptions {
        self.registry.options()
    }

    /// Most recent failure of `call()`, cleared by a successful run or an
    /// algorithm change
    pub fn last_failure(&self) -> Option<&LayoutFailure> {
        self.last_failure.as_ref()
    }

    /// Select a layout algorithm
    ///
    /// Selecting the current algorithm does nothing. If the module cannot be
    /// built, the current selection is kept and nothing is reported.
    /// Otherwise the result is invalidated and "algorithm changed" fires.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        if algorithm == self.algorithm {
            return;
        }
        match self.registry.create(algorithm) {
            Ok(layout) => {
                debug!(from = %self.algorithm, to = %algorithm, "Layout algorithm changed");
                self.layout = layout;
                self.algorithm = algorithm;
                self.last_failure = None;
                self.invalidate();
                self.algorithm_changed.emit();
            }
            Err(failure) => {
                debug!(%algorithm, %failure, "Could not build layout module, keeping current algorithm");
            }
        }
    }

    /// Select by numeric id; unknown ids are ignored
    pub fn set_algorithm_id(&mut self, id: i64) {
        match Algorithm::from_id(id) {
            Some(algorithm) => self.set_algorithm(algorithm),
            None => debug!(id, "Ignoring unknown layout algorithm id"),
        }
    }

    /// Select by name (kebab-case or identifier); unknown names are ignored
    pub fn set_algorithm_name(&mut self, name: &str) {
        match name.parse::<Algorithm>() {
            Ok(algorithm) => self.set_algorithm(algorithm),
            Err(err) => debug!(%err, "Ignoring unknown layout algorithm name"),
        }
    }

    /// Run the selected algorithm unless the current result is still valid
    ///
    /// A panicking module is caught and reported as an unclassified failure.
    /// The process panic hook still runs first, so with the default hook the
    /// panic message also reaches stderr. Hosts that want it elsewhere install
    /// their own hook (the wasm bindings route it to the browser console).
    pub fn call(&mut self) {
        if self.valid {
            trace!(algorithm = %self.algorithm, "Layout still valid, skipping run");
            return;
        }

        let call_span = span!(Level::INFO, "layout_call", algorithm = %self.algorithm);
        let _enter = call_span.enter();

        match self.run() {
            Ok(()) => {
                info!("Layout finished");
                self.last_failure = None;
                self.valid = true;
                self.valid_changed.emit();
            }
            Err(failure) => self.report(failure),
        }
    }

    /// Mark the current result as stale
    pub fn invalidate(&mut self) {
        if self.valid {
            self.valid = false;
            self.valid_changed.emit();
        }
    }

    /// Listen for algorithm changes
    pub fn on_algorithm_changed(&mut self, listener: impl FnMut() + 'static) -> ConnectionId {
        self.algorithm_changed.connect(listener)
    }

    /// Listen for validity changes
    pub fn on_valid_changed(&mut self, listener: impl FnMut() + 'static) -> ConnectionId {
        self.valid_changed.connect(listener)
    }

    /// Remove a listener registered with either signal
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        self.algorithm_changed.disconnect(id) || self.valid_changed.disconnect(id)
    }

    fn run(&mut self) -> Result<(), LayoutFailure> {
        let attributes = self
            .attributes
            .upgrade()
            .ok_or_else(|| LayoutFailure::Other("graph attributes were released".to_string()))?;
        let mut graph = attributes
            .try_borrow_mut()
            .map_err(|_| LayoutFailure::Other("graph attributes are already borrowed".to_string()))?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            module = self.layout.name(),
            "Running layout"
        );

        let layout = &mut self.layout;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| layout.call(&mut graph)));
        match outcome {
            Ok(result) => result,
            Err(payload) => Err(LayoutFailure::Other(panic_message(&*payload))),
        }
    }

    fn report(&mut self, failure: LayoutFailure) {
        match diagnostic(&failure) {
            Some(message) => self.sink.report(&message),
            None => debug!(%failure, "Layout stopped without a diagnostic"),
        }
        self.last_failure = Some(failure);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "layout module panicked".to_string()
    }
}

impl fmt::Debug for GraphLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphLayout")
            .field("algorithm", &self.algorithm)
            .field("valid", &self.valid)
            .field("last_failure", &self.last_failure)
            .field("attached", &(self.attributes.strong_count() > 0))
            .finish()
    }
}
