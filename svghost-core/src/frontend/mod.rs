//! Platform side of the console, alert and SVG capabilities.
//!
//! The guest never talks to a display directly; every visible effect goes through a
//! [`Frontend`]. Embedders with a real window implement the trait themselves. [`Headless`]
//! logs through `tracing` and keeps the document in memory, which is what the `svghost`
//! binary and the tests use.

use std::collections::BTreeMap;

/// Id of the element whose geometry the guest drives through `svg_set_path`.
pub const PATH_ELEMENT_ID: &str = "path";

/// Attribute written by `svg_set_path`.
pub const PATH_DATA_ATTRIBUTE: &str = "d";

/// Receiver for the guest's visible side effects.
pub trait Frontend: 'static {
    /// Write a line to the diagnostic stream.
    fn log(&mut self, text: &str);

    /// Show a modal notification carrying `value`.
    fn alert(&mut self, value: f64);

    /// Replace the path geometry of the [`PATH_ELEMENT_ID`] element.
    fn set_path_data(&mut self, data: &str);
}

/// One element of the in-memory SVG document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SvgElement {
    pub attributes: BTreeMap<String, String>,
}

impl SvgElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }
}

/// Minimal SVG document: elements addressed by id.
#[derive(Clone, Debug, Default)]
pub struct SvgDocument {
    elements: BTreeMap<String, SvgElement>,
}

impl SvgDocument {
    /// A document with the single `path` element the guest renders into.
    pub fn with_path_element() -> Self {
        let mut doc = Self::default();
        doc.elements
            .insert(PATH_ELEMENT_ID.to_string(), SvgElement::default());
        doc
    }

    pub fn element(&self, id: &str) -> Option<&SvgElement> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut SvgElement> {
        self.elements.get_mut(id)
    }
}

/// Frontend without a display.
#[derive(Debug)]
pub struct Headless {
    pub document: SvgDocument,
    /// Every line the guest logged, oldest first.
    pub console: Vec<String>,
    /// Every value the guest alerted, oldest first.
    pub alerts: Vec<f64>,
    /// Number of `svg_set_path` calls.
    pub path_updates: u64,
}

impl Default for Headless {
    fn default() -> Self {
        Self {
            document: SvgDocument::with_path_element(),
            console: Vec::new(),
            alerts: Vec::new(),
            path_updates: 0,
        }
    }
}

impl Headless {
    /// Current `d` attribute of the path element, if the guest has set one.
    pub fn path_data(&self) -> Option<&str> {
        self.document
            .element(PATH_ELEMENT_ID)
            .and_then(|el| el.attribute(PATH_DATA_ATTRIBUTE))
    }
}

impl Frontend for Headless {
    fn log(&mut self, text: &str) {
        tracing::info!(target: "console", "{text}");
        self.console.push(text.to_string());
    }

    fn alert(&mut self, value: f64) {
        tracing::warn!(target: "alert", value, "guest alert");
        self.alerts.push(value);
    }

    fn set_path_data(&mut self, data: &str) {
        self.path_updates += 1;
        match self.document.element_mut(PATH_ELEMENT_ID) {
            Some(path) => path.set_attribute(PATH_DATA_ATTRIBUTE, data),
            None => tracing::warn!("document has no `{PATH_ELEMENT_ID}` element"),
        }
        tracing::trace!(len = data.len(), "path geometry updated");
    }
}
