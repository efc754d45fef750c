//! WebAssembly bindings for graphlayout
//!
//! The browser host polls instead of registering callbacks: change
//! notifications and diagnostics are queued and drained on request.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::adapter::GraphLayout;
use crate::core::{CollectingSink, GraphAttributes, GraphDocument};

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    // Panics caught by the adapter still pass through this hook
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// Layout adapter owning its graph, for use from JavaScript
#[wasm_bindgen]
pub struct WasmGraphLayout {
    attributes: Rc<RefCell<GraphAttributes>>,
    layout: GraphLayout,
    diagnostics: CollectingSink,
    notifications: Rc<RefCell<Vec<&'static str>>>,
}

#[wasm_bindgen]
impl WasmGraphLayout {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGraphLayout {
        let attributes = Rc::new(RefCell::new(GraphAttributes::new()));
        let diagnostics = CollectingSink::new();
        let notifications = Rc::new(RefCell::new(Vec::new()));

        let mut layout = GraphLayout::new(&attributes).with_sink(Box::new(diagnostics.clone()));
        let queue = Rc::clone(&notifications);
        layout.on_algorithm_changed(move || queue.borrow_mut().push("algorithmChanged"));
        let queue = Rc::clone(&notifications);
        layout.on_valid_changed(move || queue.borrow_mut().push("validChanged"));

        WasmGraphLayout {
            attributes,
            layout,
            diagnostics,
            notifications,
        }
    }

    /// Replace the graph with a JSON document; invalidates the layout
    pub fn load(&mut self, json: &str) -> Result<(), JsValue> {
        let document = GraphDocument::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let attributes = GraphAttributes::from_document(&document).map_err(|e| JsValue::from_str(&e.to_string()))?;
        *self.attributes.borrow_mut() = attributes;
        self.layout.invalidate();
        Ok(())
    }

    /// Select an algorithm by name; unknown names are ignored
    #[wasm_bindgen(js_name = setAlgorithm)]
    pub fn set_algorithm(&mut self, name: &str) {
        self.layout.set_algorithm_name(name);
    }

    /// Select an algorithm by numeric id; unknown ids are ignored
    #[wasm_bindgen(js_name = setAlgorithmId)]
    pub fn set_algorithm_id(&mut self, id: i32) {
        self.layout.set_algorithm_id(i64::from(id));
    }

    pub fn algorithm(&self) -> String {
        self.layout.algorithm().name().to_string()
    }

    pub fn valid(&self) -> bool {
        self.layout.valid()
    }

    pub fn call(&mut self) {
        self.layout.call();
    }

    pub fn invalidate(&mut self) {
        self.layout.invalidate();
    }

    /// The current graph as a JSON document
    pub fn document(&self) -> Result<String, JsValue> {
        self.attributes
            .borrow()
            .to_document()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Diagnostics since the last call, as a JSON array of strings
    #[wasm_bindgen(js_name = takeDiagnostics)]
    pub fn take_diagnostics(&self) -> String {
        serde_json::to_string(&self.diagnostics.take()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Notifications since the last call, as a JSON array of names
    #[wasm_bindgen(js_name = takeNotifications)]
    pub fn take_notifications(&self) -> String {
        let pending = std::mem::take(&mut *self.notifications.borrow_mut());
        serde_json::to_string(&pending).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for WasmGraphLayout {
    fn default() -> Self {
        Self::new()
    }
}
