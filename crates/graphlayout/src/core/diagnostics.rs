//! Failure translation and diagnostic sinks
//!
//! [`diagnostic`] turns a [`LayoutFailure`] into the free-text message shown
//! to the embedding environment. Messages are delivered to a
//! [`DiagnosticSink`]; callers of `call()` never receive a structured error.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

use super::LayoutFailure;

/// Translate a failure into a user-visible message
///
/// Returns `None` for the `Unknown` and `Stop` sentinels of both failure
/// taxonomies: they are bookkeeping values, not user-facing conditions.
pub fn diagnostic(failure: &LayoutFailure) -> Option<String> {
    match failure {
        LayoutFailure::Algorithm(code) => code
            .phrase()
            .map(|reason| format!("Layout algorithm failed, because {reason}")),
        LayoutFailure::Precondition(code) => code
            .phrase()
            .map(|subject| format!("{subject}, which violates layout preconditions")),
        LayoutFailure::Library(_) => Some("Layout library failure caught".to_string()),
        LayoutFailure::Other(_) => Some("Unknown failure caught".to_string()),
    }
}

/// Receives diagnostic messages
pub trait DiagnosticSink {
    fn report(&mut self, message: &str);
}

/// Default sink: forwards messages to `tracing` at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, message: &str) {
        warn!(target: "graphlayout::diagnostics", "{message}");
    }
}

/// Sink that stores messages in a shared buffer
///
/// Clones share the same buffer, so a host can keep one handle and give the
/// other to the adapter.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    messages: Rc<RefCell<Vec<String>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all messages received so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Drain all messages received so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AlgorithmFailureCode, PreconditionViolatedCode};
    use std::collections::HashSet;

    #[test]
    fn test_algorithm_failure_message() {
        let msg = diagnostic(&AlgorithmFailureCode::TimelimitExceeded.into()).unwrap();
        assert_eq!(msg, "Layout algorithm failed, because timelimit exceeded");
        let msg = diagnostic(&AlgorithmFailureCode::NoFlow.into()).unwrap();
        assert_eq!(
            msg,
            "Layout algorithm failed, because min-cost flow solver could not find a legal flow"
        );
    }

    #[test]
    fn test_precondition_message() {
        let msg = diagnostic(&PreconditionViolatedCode::Connected.into()).unwrap();
        assert_eq!(msg, "Graph is not connected, which violates layout preconditions");
        let msg = diagnostic(&PreconditionViolatedCode::Biconnected.into()).unwrap();
        assert_eq!(msg, "Graph is not twoconnected, which violates layout preconditions");
    }

    #[test]
    fn test_generic_messages() {
        let msg = diagnostic(&LayoutFailure::Library("boom".into())).unwrap();
        assert_eq!(msg, "Layout library failure caught");
        let msg = diagnostic(&LayoutFailure::Other("boom".into())).unwrap();
        assert_eq!(msg, "Unknown failure caught");
    }

    #[test]
    fn test_sentinels_are_silent() {
        for failure in [
            LayoutFailure::Algorithm(AlgorithmFailureCode::Unknown),
            LayoutFailure::Algorithm(AlgorithmFailureCode::Stop),
            LayoutFailure::Precondition(PreconditionViolatedCode::Unknown),
            LayoutFailure::Precondition(PreconditionViolatedCode::Stop),
        ] {
            assert_eq!(diagnostic(&failure), None, "{failure:?}");
        }
    }

    #[test]
    fn test_every_sub_code_has_its_own_message() {
        let mut messages = HashSet::new();
        let mut count = 0;
        for code in AlgorithmFailureCode::ALL {
            if let Some(msg) = diagnostic(&code.into()) {
                messages.insert(msg);
                count += 1;
            }
        }
        for code in PreconditionViolatedCode::ALL {
            if let Some(msg) = diagnostic(&code.into()) {
                messages.insert(msg);
                count += 1;
            }
        }
        assert_eq!(count, 21);
        assert_eq!(messages.len(), count);
    }

    #[test]
    fn test_collecting_sink_shares_buffer() {
        let sink = CollectingSink::new();
        let mut handle = sink.clone();
        handle.report("one");
        handle.report("two");
        assert_eq!(sink.messages(), vec!["one", "two"]);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.is_empty());
    }
}
