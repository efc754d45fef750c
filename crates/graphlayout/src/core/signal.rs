//! Change notifications
//!
//! A [`Signal`] is a list of listeners that are invoked, in connection
//! order, each time the owner emits it. Owners only emit on real state
//! transitions, so listeners never see spurious notifications.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of connection ids, unique across all signals
static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(0);

/// Handle returned by [`Signal::connect`], used to disconnect a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// A single-threaded notification list
#[derive(Default)]
pub struct Signal {
    listeners: Vec<(ConnectionId, Box<dyn FnMut()>)>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn connect(&mut self, listener: impl FnMut() + 'static) -> ConnectionId {
        let id = ConnectionId(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed));
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not connected
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(conn, _)| *conn != id);
        self.listeners.len() != before
    }

    /// Invoke every listener once
    pub fn emit(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let hits = Rc::new(Cell::new(0));
        let mut signal = Signal::new();
        for _ in 0..3 {
            let hits = Rc::clone(&hits);
            signal.connect(move || hits.set(hits.get() + 1));
        }
        signal.emit();
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_disconnect() {
        let hits = Rc::new(Cell::new(0));
        let mut signal = Signal::new();
        let counter = Rc::clone(&hits);
        let id = signal.connect(move || counter.set(counter.get() + 1));

        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit();
        assert_eq!(hits.get(), 0);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn test_ids_unique_across_signals() {
        let mut first = Signal::new();
        let mut second = Signal::new();
        let a = first.connect(|| {});
        let b = second.connect(|| {});
        assert_ne!(a, b);
        assert!(!first.disconnect(b));
        assert_eq!(first.listener_count(), 1);
    }

    #[test]
    fn test_listeners_called_in_connection_order() {
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut signal = Signal::new();
        for n in 0..3 {
            let order = Rc::clone(&order);
            signal.connect(move || order.borrow_mut().push(n));
        }
        signal.emit();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
