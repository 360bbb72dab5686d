//! Document facade
//!
//! Creation goes to the document itself. Lookups run as selector queries
//! through `Polymer.dom(documentElement)`, so they see the logical tree and
//! every element they return is wrapped.
//!
//! ## Example
//!
//! ```ignore
//! use polymer_dom::document;
//!
//! let doc = document();
//! let drawer = doc.get_element_by_id("drawer")?.expect("drawer is in the page");
//! let items = doc.get_elements_by_class_name("menu-item")?;
//! ```

use crate::css::{class_selector, escape_identifier};
use crate::dom_api::DomApi;
use crate::element::Element;
use crate::error::{PolymerError, PolymerResult};
use crate::host::{DomHost, Host, RawNode};
use crate::node::Node;

/// The page document.
#[derive(Debug, Clone)]
pub struct Document {
	node: RawNode,
	api: DomApi,
}

impl Document {
	/// The document of the current page.
	///
	/// # Panics
	///
	/// Panics if the shim has not loaded yet.
	pub fn current() -> Self {
		Self::with_api(DomApi::current())
	}

	pub(crate) fn with_api(api: DomApi) -> Self {
		Self {
			node: Host::document(),
			api,
		}
	}

	/// The document node.
	pub fn to_node(&self) -> Node {
		Node::from_raw(self.node.clone())
	}

	/// `createElement(name)`, wrapped.
	pub fn create_element(&self, name: &str) -> PolymerResult<Element> {
		Ok(self.api.wrap_raw(Host::create_element(name)?))
	}

	/// `createElementNS(namespace, name)`, wrapped.
	pub fn create_element_ns(&self, namespace: &str, name: &str) -> PolymerResult<Element> {
		Ok(self.api.wrap_raw(Host::create_element_ns(namespace, name)?))
	}

	/// `createTextNode(text)`
	pub fn create_text_node(&self, text: &str) -> Node {
		Node::from_raw(Host::create_text_node(text))
	}

	/// Topmost element at viewport point (`x`, `y`).
	pub fn element_from_point(&self, x: f64, y: f64) -> Option<Element> {
		Host::element_from_point(x, y).map(|node| self.api.wrap_raw(node))
	}

	/// `documentElement`
	pub fn document_element(&self) -> Option<Element> {
		Host::document_element().map(|node| self.api.wrap_raw(node))
	}

	/// Element with id `id`.
	pub fn get_element_by_id(&self, id: &str) -> PolymerResult<Option<Element>> {
		if id.is_empty() {
			return Ok(None);
		}
		self.query_selector(&format!("#{}", escape_identifier(id)))
	}

	/// Elements carrying every class in the whitespace separated `names`.
	pub fn get_elements_by_class_name(&self, names: &str) -> PolymerResult<Vec<Element>> {
		match class_selector(names) {
			Some(selector) => self.query_selector_all(&selector),
			None => Ok(Vec::new()),
		}
	}

	/// Elements with tag `name` (`*` for all).
	pub fn get_elements_by_tag_name(&self, name: &str) -> PolymerResult<Vec<Element>> {
		match self.document_element() {
			Some(root) => root.get_elements_by_tag_name(name),
			None => Ok(Vec::new()),
		}
	}

	/// Always fails: namespace-qualified lookups are not supported.
	pub fn get_elements_by_tag_name_ns(
		&self,
		_namespace: &str,
		_name: &str,
	) -> PolymerResult<Vec<Element>> {
		Err(PolymerError::unsupported("getElementsByTagNameNS"))
	}

	/// First element matching `selector`.
	pub fn query_selector(&self, selector: &str) -> PolymerResult<Option<Element>> {
		match self.document_element() {
			Some(root) => root.query_selector(selector),
			None => Ok(None),
		}
	}

	/// Every element matching `selector`.
	pub fn query_selector_all(&self, selector: &str) -> PolymerResult<Vec<Element>> {
		match self.document_element() {
			Some(root) => root.query_selector_all(selector),
			None => Ok(Vec::new()),
		}
	}
}

/// The document of the current page, see [`Document::current`].
pub fn document() -> Document {
	Document::current()
}
