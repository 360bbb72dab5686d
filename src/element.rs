//! Wrapped elements
//!
//! A [`WrappedElement`] pairs the `Polymer.dom(node)` handle with the node it
//! was made for. Traversal, mutation and queries go through the shim so they
//! see the logical (light) tree; attribute and geometry reads go to the node
//! itself.
//!
//! ## Example
//!
//! ```ignore
//! use polymer_dom::document;
//!
//! let doc = document();
//! let list = doc.create_element("ul")?;
//! let item = doc.create_element("li")?;
//! list.append_child(&item)?;
//! assert_eq!(list.children(), vec![item]);
//! ```

use std::ops::Deref;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::css::{class_selector, escape_identifier};
use crate::dom_api::DomApi;
use crate::error::{PolymerError, PolymerResult};
use crate::host::{ApiHandle, ClientRect, DomHost, Host, LocalDomQuery, RawNode};
use crate::node::{AsRawNode, Node, nodes};

/// An element seen through `Polymer.dom`.
#[derive(Debug, Clone)]
pub struct WrappedElement {
	dom: ApiHandle,
	unwrapped: RawNode,
	api: DomApi,
}

impl PartialEq for WrappedElement {
	fn eq(&self, other: &Self) -> bool {
		self.unwrapped == other.unwrapped
	}
}

impl WrappedElement {
	pub(crate) fn new(dom: ApiHandle, unwrapped: RawNode, api: DomApi) -> Self {
		Self {
			dom,
			unwrapped,
			api,
		}
	}

	/// The `Polymer.dom(node)` handle.
	pub fn dom(&self) -> &ApiHandle {
		&self.dom
	}

	/// The underlying node.
	pub fn unwrapped(&self) -> &RawNode {
		&self.unwrapped
	}

	/// The underlying node as a [`Node`].
	pub fn to_node(&self) -> Node {
		Node::from_raw(self.unwrapped.clone())
	}

	pub(crate) fn api(&self) -> &DomApi {
		&self.api
	}

	fn wrap_opt(&self, node: Option<RawNode>) -> Option<Element> {
		node.map(|node| self.api.wrap_raw(node))
	}

	/// `tagName`; empty for non-elements.
	pub fn tag_name(&self) -> String {
		Host::tag_name(&self.unwrapped).unwrap_or_default()
	}

	/// `id`; empty when unset.
	pub fn id(&self) -> String {
		self.get_attribute("id").unwrap_or_default()
	}

	/// `nodeName`
	pub fn node_name(&self) -> String {
		Host::node_name(&self.unwrapped)
	}

	/// `getAttribute(name)`
	pub fn get_attribute(&self, name: &str) -> Option<String> {
		Host::get_attribute(&self.unwrapped, name)
	}

	/// `getAttributeNS(namespace, name)`, read on the unwrapped node.
	///
	/// An empty `namespace` stands for the null namespace.
	pub fn get_attribute_ns(&self, namespace: &str, name: &str) -> Option<String> {
		Host::get_attribute_ns(&self.unwrapped, namespace, name)
	}

	/// `hasAttribute(name)`
	pub fn has_attribute(&self, name: &str) -> bool {
		Host::has_attribute(&self.unwrapped, name)
	}

	/// `getBoundingClientRect()`
	///
	/// Flushes pending DOM changes first when
	/// [`BindingConfig::flush_before_layout`](crate::BindingConfig::flush_before_layout)
	/// is set.
	pub fn bounding_client_rect(&self) -> ClientRect {
		if self.api.config().flush_before_layout {
			self.api.flush();
		}
		Host::client_rect(&self.unwrapped)
	}

	/// `parentElement`, read on the underlying node.
	pub fn parent_element(&self) -> Option<Element> {
		self.wrap_opt(Host::parent_element(&self.unwrapped))
	}

	/// Local DOM root, read from the `root` property of the underlying node.
	pub fn root(&self) -> Option<Element> {
		self.wrap_opt(Host::local_root(&self.unwrapped))
	}

	/// Logical `parentNode`
	pub fn parent_node(&self) -> Option<Node> {
		Host::parent_node(&self.dom).map(Node::from_raw)
	}

	/// Logical `childNodes`
	pub fn child_nodes(&self) -> Vec<Node> {
		nodes(Host::child_nodes(&self.dom))
	}

	/// Logical `children`
	pub fn children(&self) -> Vec<Element> {
		self.api.wrap_all(Host::children(&self.dom))
	}

	/// Logical `firstChild`
	pub fn first_child(&self) -> Option<Node> {
		Host::first_child(&self.dom).map(Node::from_raw)
	}

	/// Logical `lastChild`
	pub fn last_child(&self) -> Option<Node> {
		Host::last_child(&self.dom).map(Node::from_raw)
	}

	/// Logical `nextSibling`
	pub fn next_sibling(&self) -> Option<Node> {
		Host::next_sibling(&self.dom).map(Node::from_raw)
	}

	/// Logical `previousSibling`
	pub fn previous_sibling(&self) -> Option<Node> {
		Host::previous_sibling(&self.dom).map(Node::from_raw)
	}

	/// `textContent`
	pub fn text_content(&self) -> Option<String> {
		Host::text_content(&self.dom)
	}

	/// Sets `textContent`, replacing every child.
	pub fn set_text_content(&self, text: &str) {
		Host::set_text_content(&self.dom, text);
	}

	/// `setAttribute(name, value)`
	pub fn set_attribute(&self, name: &str, value: &str) -> PolymerResult<()> {
		Host::set_attribute(&self.dom, name, value)
	}

	/// `removeAttribute(name)`
	pub fn remove_attribute(&self, name: &str) -> PolymerResult<()> {
		Host::remove_attribute(&self.dom, name)
	}

	/// `appendChild(node)`
	pub fn append_child(&self, node: &impl AsRawNode) -> PolymerResult<()> {
		Host::append_child(&self.dom, node.as_raw_node())
	}

	/// `insertBefore(node, reference)`; `None` appends.
	pub fn insert_before(
		&self,
		node: &impl AsRawNode,
		reference: Option<&dyn AsRawNode>,
	) -> PolymerResult<()> {
		Host::insert_before(
			&self.dom,
			node.as_raw_node(),
			reference.map(|reference| reference.as_raw_node()),
		)
	}

	/// `removeChild(node)`
	pub fn remove_child(&self, node: &impl AsRawNode) -> PolymerResult<()> {
		Host::remove_child(&self.dom, node.as_raw_node())
	}

	/// First logical descendant matching `selector`.
	pub fn query_selector(&self, selector: &str) -> PolymerResult<Option<Element>> {
		Ok(self.wrap_opt(Host::query_selector(&self.dom, selector)?))
	}

	/// Every logical descendant matching `selector`.
	pub fn query_selector_all(&self, selector: &str) -> PolymerResult<Vec<Element>> {
		Ok(self.api.wrap_all(Host::query_selector_all(&self.dom, selector)?))
	}

	/// Descendants carrying every class in the whitespace separated `names`.
	pub fn get_elements_by_class_name(&self, names: &str) -> PolymerResult<Vec<Element>> {
		match class_selector(names) {
			Some(selector) => self.query_selector_all(&selector),
			None => Ok(Vec::new()),
		}
	}

	/// Descendants with tag `name` (`*` for all).
	pub fn get_elements_by_tag_name(&self, name: &str) -> PolymerResult<Vec<Element>> {
		if name == "*" {
			self.query_selector_all(name)
		} else {
			self.query_selector_all(&escape_identifier(name))
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

	/// Nodes distributed to this `<content>` insertion point.
	///
	/// Empty for anything that is not an insertion point.
	pub fn get_distributed_nodes(&self) -> Vec<Node> {
		nodes(Host::local_dom_query(&self.dom, LocalDomQuery::DistributedNodes))
	}

	/// `<content>` insertion points this node is distributed to, innermost
	/// first.
	pub fn get_destination_insertion_points(&self) -> Vec<Node> {
		nodes(Host::local_dom_query(
			&self.dom,
			LocalDomQuery::DestinationInsertionPoints,
		))
	}

	/// Nodes distributed to the `<content>` node matching `selector` in the
	/// local DOM. An empty selector means the first `<content>`.
	pub fn get_content_child_nodes(&self, selector: &str) -> Vec<Node> {
		nodes(Host::local_dom_query(
			&self.dom,
			LocalDomQuery::ContentChildNodes(selector),
		))
	}

	/// Elements distributed to the `<content>` node matching `selector`.
	pub fn get_content_children(&self, selector: &str) -> Vec<Element> {
		self.api.wrap_all(Host::local_dom_query(
			&self.dom,
			LocalDomQuery::ContentChildren(selector),
		))
	}

	/// Child nodes with every insertion point replaced by its distributed
	/// nodes.
	pub fn get_effective_child_nodes(&self) -> Vec<Node> {
		nodes(Host::local_dom_query(
			&self.dom,
			LocalDomQuery::EffectiveChildNodes,
		))
	}

	/// Element children with every insertion point replaced by its
	/// distributed elements.
	pub fn get_effective_children(&self) -> Vec<Element> {
		self.api.wrap_all(Host::local_dom_query(
			&self.dom,
			LocalDomQuery::EffectiveChildren,
		))
	}

	/// First effective child matching `selector`.
	pub fn query_effective_children(&self, selector: &str) -> Option<Element> {
		self.wrap_opt(Host::query_effective_children(&self.dom, selector))
	}

	/// Every effective child matching `selector`.
	pub fn query_all_effective_children(&self, selector: &str) -> Vec<Element> {
		self.api.wrap_all(Host::local_dom_query(
			&self.dom,
			LocalDomQuery::QueryAllEffectiveChildren(selector),
		))
	}
}

/// A `<template is="dom-bind-go">` element.
///
/// The template's binding scope lives in properties on the template element;
/// [`get`](Self::get) and [`set`](Self::set) read and write them.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoBindGoTemplate {
	element: WrappedElement,
}

impl AutoBindGoTemplate {
	pub(crate) fn new(element: WrappedElement) -> Self {
		Self { element }
	}

	/// Reads binding property `name`; `None` when unset.
	pub fn get<T: DeserializeOwned>(&self, name: &str) -> PolymerResult<Option<T>> {
		Host::get_property(&self.element.unwrapped, name)
	}

	/// Writes binding property `name`.
	pub fn set<T: Serialize>(&self, name: &str, value: &T) -> PolymerResult<()> {
		Host::set_property(&self.element.unwrapped, name, value)
	}

	/// The underlying wrapped element.
	pub fn element(&self) -> &WrappedElement {
		&self.element
	}
}

impl Deref for AutoBindGoTemplate {
	type Target = WrappedElement;

	fn deref(&self) -> &WrappedElement {
		&self.element
	}
}

/// Result of wrapping resolution.
#[derive(Debug, Clone)]
pub enum Element {
	/// Any element
	Wrapped(WrappedElement),
	/// A binding template
	AutoBindGo(AutoBindGoTemplate),
}

impl Element {
	/// The wrapped element of either variant.
	pub fn as_wrapped(&self) -> &WrappedElement {
		match self {
			Self::Wrapped(element) => element,
			Self::AutoBindGo(template) => &template.element,
		}
	}

	/// Consumes the element and returns its wrapped element.
	pub fn into_wrapped(self) -> WrappedElement {
		match self {
			Self::Wrapped(element) => element,
			Self::AutoBindGo(template) => template.element,
		}
	}

	/// The binding template, if this is one.
	pub fn as_auto_bind_go(&self) -> Option<&AutoBindGoTemplate> {
		match self {
			Self::AutoBindGo(template) => Some(template),
			Self::Wrapped(_) => None,
		}
	}

	/// Returns true for binding templates.
	pub fn is_auto_bind_go(&self) -> bool {
		matches!(self, Self::AutoBindGo(_))
	}
}

impl Deref for Element {
	type Target = WrappedElement;

	fn deref(&self) -> &WrappedElement {
		self.as_wrapped()
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		self.as_wrapped() == other.as_wrapped()
	}
}

impl From<AutoBindGoTemplate> for Element {
	fn from(template: AutoBindGoTemplate) -> Self {
		Self::AutoBindGo(template)
	}
}

impl PartialEq<Node> for Element {
	fn eq(&self, other: &Node) -> bool {
		self.unwrapped() == other.raw()
	}
}

impl PartialEq<Element> for Node {
	fn eq(&self, other: &Element) -> bool {
		self.raw() == other.unwrapped()
	}
}
