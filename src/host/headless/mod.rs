//! Headless host
//!
//! An in-memory stand-in for the browser page and the Polymer shim, used on
//! every non-`wasm32` target. It keeps a node tree (attributes, local roots,
//! `<content>` insertion points), event listeners and node observers, and
//! answers the shim calls the facade makes. There is no layout, styling or
//! HTML parsing: geometry is whatever [`set_client_rect`] stored.
//!
//! State is thread-local. [`reset`] gives the current thread a fresh
//! document with the shim installed under `Polymer`.
//!
//! ## Example
//!
//! ```ignore
//! use polymer_dom::{document, headless};
//!
//! headless::reset();
//! let doc = document();
//! let host = doc.create_element("x-card")?;
//! let root = headless::attach_local_root(host.unwrapped());
//! headless::dispatch_event(host.unwrapped(), "tap", serde_json::json!({ "x": 1 }));
//! ```

mod distribution;
mod selector;
mod tree;

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use tree::{NodeKind, NodeRef};

use self::selector::SelectorList;
use crate::config::DEFAULT_POLYMER_GLOBAL;
use crate::dom_api::DomApi;
use crate::error::{PolymerError, PolymerResult};
use crate::host::{
	BoundaryValue, ClientRect, DomHost, EventHandler, LocalDomQuery, ObserveCallback,
};
use crate::{debug_log, warn_log};

/// Namespace of HTML elements.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// The `Polymer.DomApi` class of the headless shim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomApiClass;

/// `Polymer.dom(node)` wrapper of the headless shim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRef {
	node: NodeRef,
}

impl ApiRef {
	/// The wrapped node (`api.node`).
	pub fn node(&self) -> &NodeRef {
		&self.node
	}
}

/// Untyped value crossing the headless boundary.
#[derive(Debug, Clone)]
pub enum HeadlessValue {
	/// `undefined`
	Undefined,
	/// `null`
	Null,
	/// A plain node
	Node(NodeRef),
	/// A `Polymer.dom` wrapper
	Api(ApiRef),
	/// Any other value
	Json(Value),
}

impl From<Value> for HeadlessValue {
	fn from(value: Value) -> Self {
		match value {
			Value::Null => Self::Null,
			other => Self::Json(other),
		}
	}
}

/// Handle of a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// Handle of a registered node observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservationId(usize);

struct ObserverEntry {
	id: ObservationId,
	target: NodeRef,
	seen: Option<Vec<NodeRef>>,
	callback: Rc<RefCell<ObserveCallback<NodeRef>>>,
}

struct HeadlessState {
	polymer_global: Option<String>,
	document: NodeRef,
	window: NodeRef,
	observers: Vec<ObserverEntry>,
	next_id: usize,
	flush_count: usize,
}

impl HeadlessState {
	fn new() -> Self {
		let document = NodeRef::new(NodeKind::Document, "#document");
		let html = NodeRef::element("html");
		html.append(&NodeRef::element("head"));
		html.append(&NodeRef::element("body"));
		document.append(&html);
		Self {
			polymer_global: Some(DEFAULT_POLYMER_GLOBAL.to_string()),
			document,
			window: NodeRef::new(NodeKind::Window, "#window"),
			observers: Vec::new(),
			next_id: 1,
			flush_count: 0,
		}
	}

	fn next_id(&mut self) -> usize {
		let id = self.next_id;
		self.next_id += 1;
		id
	}
}

thread_local! {
	static STATE: RefCell<HeadlessState> = RefCell::new(HeadlessState::new());
}

fn with_state<R>(f: impl FnOnce(&mut HeadlessState) -> R) -> R {
	STATE.with(|state| f(&mut state.borrow_mut()))
}

fn is_installed(global: &str) -> bool {
	with_state(|state| state.polymer_global.as_deref() == Some(global))
}

fn dom_error(operation: &'static str, name: &str, detail: impl std::fmt::Display) -> PolymerError {
	PolymerError::host(operation, format!("{}: {}", name, detail))
}

fn parse_selector(operation: &'static str, selector: &str) -> PolymerResult<SelectorList> {
	SelectorList::parse(selector).map_err(|message| {
		dom_error(
			operation,
			"SyntaxError",
			format!("`{}` is not a valid selector ({})", selector, message),
		)
	})
}

fn validate_name(operation: &'static str, name: &str) -> PolymerResult<()> {
	let mut chars = name.chars();
	let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
		&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
	if valid {
		Ok(())
	} else {
		Err(dom_error(
			operation,
			"InvalidCharacterError",
			format!("`{}` is not a valid name", name),
		))
	}
}

fn validate_attribute_name(name: &str) -> PolymerResult<()> {
	let invalid = name.is_empty()
		|| name
			.chars()
			.any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '<' | '/' | '='));
	if invalid {
		return Err(dom_error(
			"setAttribute",
			"InvalidCharacterError",
			format!("`{}` is not a valid attribute name", name),
		));
	}
	Ok(())
}

fn ensure_element(operation: &'static str, node: &NodeRef) -> PolymerResult<()> {
	if node.is_element() {
		Ok(())
	} else {
		Err(dom_error(
			operation,
			"TypeError",
			format!("{:?} is not an element", node),
		))
	}
}

fn ensure_can_adopt(
	operation: &'static str,
	parent: &NodeRef,
	child: &NodeRef,
) -> PolymerResult<()> {
	if !matches!(
		parent.kind(),
		NodeKind::Element | NodeKind::Fragment | NodeKind::Document
	) {
		return Err(dom_error(
			operation,
			"HierarchyRequestError",
			format!("{:?} cannot have children", parent),
		));
	}
	if matches!(
		child.kind(),
		NodeKind::Document | NodeKind::Window | NodeKind::Fragment
	) {
		return Err(dom_error(
			operation,
			"HierarchyRequestError",
			format!("{:?} cannot be inserted", child),
		));
	}
	if child.contains(parent) {
		return Err(dom_error(
			operation,
			"HierarchyRequestError",
			"the new child is an ancestor of the parent",
		));
	}
	Ok(())
}

/// The headless [`DomHost`].
pub struct HeadlessHost;

impl DomHost for HeadlessHost {
	type Node = NodeRef;
	type Api = ApiRef;
	type Marker = DomApiClass;
	type Value = HeadlessValue;
	type Target = NodeRef;
	type Listener = ListenerId;
	type Observation = ObservationId;
	type Payload = Value;

	fn dom_api_marker(global: &str) -> Option<DomApiClass> {
		is_installed(global).then_some(DomApiClass)
	}

	fn classify(value: HeadlessValue, _marker: &DomApiClass) -> BoundaryValue<NodeRef, ApiRef> {
		match value {
			HeadlessValue::Undefined | HeadlessValue::Null | HeadlessValue::Json(Value::Null) => {
				BoundaryValue::Missing
			}
			HeadlessValue::Api(api) => BoundaryValue::Wrapped(api),
			HeadlessValue::Node(node) => BoundaryValue::Node(node),
			HeadlessValue::Json(_) => BoundaryValue::Other,
		}
	}

	fn node_value(node: &NodeRef) -> HeadlessValue {
		HeadlessValue::Node(node.clone())
	}

	fn polymer_dom(global: &str, node: &NodeRef) -> PolymerResult<ApiRef> {
		if !is_installed(global) {
			return Err(PolymerError::NotInitialized {
				global: global.to_string(),
			});
		}
		Ok(ApiRef { node: node.clone() })
	}

	fn api_node(api: &ApiRef) -> NodeRef {
		api.node.clone()
	}

	fn flush(global: &str) {
		if !is_installed(global) {
			warn_log!("`{}.dom.flush` is not available", global);
			return;
		}
		let entries: Vec<_> = with_state(|state| {
			state.flush_count += 1;
			state
				.observers
				.iter()
				.map(|entry| {
					(
						entry.id,
						entry.target.clone(),
						entry.seen.clone(),
						Rc::clone(&entry.callback),
					)
				})
				.collect()
		});

		let mut batches = Vec::new();
		for (id, target, seen, callback) in entries {
			// A callback that is running keeps its snapshot until the next flush
			if callback.try_borrow_mut().is_err() {
				debug_log!("Deferring observation {:?} while its callback runs", id);
				continue;
			}
			let current = distribution::observed_nodes(&target);
			let seen = seen.unwrap_or_default();
			let added: Vec<_> = current
				.iter()
				.filter(|n| !seen.contains(n))
				.cloned()
				.collect();
			let removed: Vec<_> = seen
				.iter()
				.filter(|n| !current.contains(n))
				.cloned()
				.collect();
			with_state(|state| {
				if let Some(entry) = state.observers.iter_mut().find(|e| e.id == id) {
					entry.seen = Some(current);
				}
			});
			if !added.is_empty() || !removed.is_empty() {
				batches.push((id, callback, added, removed));
			}
		}

		for (id, callback, added, removed) in batches {
			if !with_state(|state| state.observers.iter().any(|e| e.id == id)) {
				continue;
			}
			debug_log!(
				"Delivering observation {:?}: +{} -{}",
				id,
				added.len(),
				removed.len()
			);
			match callback.try_borrow_mut() {
				Ok(mut callback) => (*callback)(added, removed),
				Err(_) => warn_log!("Skipping re-entrant delivery to observation {:?}", id),
			}
		}
	}

	fn node_type(node: &NodeRef) -> u16 {
		node.node_type()
	}

	fn node_name(node: &NodeRef) -> String {
		node.node_name()
	}

	fn tag_name(node: &NodeRef) -> Option<String> {
		node.tag()
	}

	fn raw_text_content(node: &NodeRef) -> Option<String> {
		node.text_content()
	}

	fn get_attribute(node: &NodeRef, name: &str) -> Option<String> {
		node.attribute(name)
	}

	fn get_attribute_ns(node: &NodeRef, namespace: &str, name: &str) -> Option<String> {
		node.attribute_ns(namespace, name)
	}

	fn has_attribute(node: &NodeRef, name: &str) -> bool {
		node.attribute(name).is_some()
	}

	fn parent_element(node: &NodeRef) -> Option<NodeRef> {
		node.parent_element()
	}

	fn local_root(node: &NodeRef) -> Option<NodeRef> {
		node.local_root()
	}

	fn client_rect(node: &NodeRef) -> ClientRect {
		node.data().rect
	}

	fn get_property<T: DeserializeOwned>(node: &NodeRef, name: &str) -> PolymerResult<Option<T>> {
		let Some(value) = node.data().properties.get(name).cloned() else {
			return Ok(None);
		};
		serde_json::from_value(value)
			.map(Some)
			.map_err(|e| PolymerError::host("getProperty", format!("`{}`: {}", name, e)))
	}

	fn set_property<T: Serialize>(node: &NodeRef, name: &str, value: &T) -> PolymerResult<()> {
		let value = serde_json::to_value(value)
			.map_err(|e| PolymerError::host("setProperty", format!("`{}`: {}", name, e)))?;
		node.data_mut().properties.insert(name.to_string(), value);
		Ok(())
	}

	fn parent_node(api: &ApiRef) -> Option<NodeRef> {
		api.node.parent()
	}

	fn child_nodes(api: &ApiRef) -> Vec<NodeRef> {
		api.node.children()
	}

	fn children(api: &ApiRef) -> Vec<NodeRef> {
		api.node
			.children()
			.into_iter()
			.filter(NodeRef::is_element)
			.collect()
	}

	fn first_child(api: &ApiRef) -> Option<NodeRef> {
		api.node.first_child()
	}

	fn last_child(api: &ApiRef) -> Option<NodeRef> {
		api.node.last_child()
	}

	fn next_sibling(api: &ApiRef) -> Option<NodeRef> {
		api.node.next_sibling()
	}

	fn previous_sibling(api: &ApiRef) -> Option<NodeRef> {
		api.node.previous_sibling()
	}

	fn text_content(api: &ApiRef) -> Option<String> {
		api.node.text_content()
	}

	fn set_text_content(api: &ApiRef, text: &str) {
		let node = &api.node;
		match node.kind() {
			NodeKind::Text => node.set_text(text),
			NodeKind::Element | NodeKind::Fragment => {
				node.clear_children();
				if !text.is_empty() {
					node.append(&NodeRef::text(text));
				}
			}
			NodeKind::Document | NodeKind::Window => {}
		}
	}

	fn set_attribute(api: &ApiRef, name: &str, value: &str) -> PolymerResult<()> {
		ensure_element("setAttribute", &api.node)?;
		validate_attribute_name(name)?;
		api.node.set_attribute(name, value);
		Ok(())
	}

	fn remove_attribute(api: &ApiRef, name: &str) -> PolymerResult<()> {
		ensure_element("removeAttribute", &api.node)?;
		api.node.remove_attribute(name);
		Ok(())
	}

	fn append_child(api: &ApiRef, child: &NodeRef) -> PolymerResult<()> {
		ensure_can_adopt("appendChild", &api.node, child)?;
		api.node.append(child);
		Ok(())
	}

	fn insert_before(
		api: &ApiRef,
		child: &NodeRef,
		reference: Option<&NodeRef>,
	) -> PolymerResult<()> {
		let parent = &api.node;
		ensure_can_adopt("insertBefore", parent, child)?;
		if let Some(reference) = reference
			&& reference.parent().as_ref() != Some(parent)
		{
			return Err(dom_error(
				"insertBefore",
				"NotFoundError",
				"the reference node is not a child of this node",
			));
		}
		let reference = match reference {
			Some(reference) if reference == child => child.next_sibling(),
			other => other.cloned(),
		};
		child.detach();
		let index = reference
			.and_then(|reference| parent.index_of(&reference))
			.unwrap_or_else(|| parent.children().len());
		parent.insert_at(index, child);
		Ok(())
	}

	fn remove_child(api: &ApiRef, child: &NodeRef) -> PolymerResult<()> {
		if child.parent().as_ref() != Some(&api.node) {
			return Err(dom_error(
				"removeChild",
				"NotFoundError",
				"the node to be removed is not a child of this node",
			));
		}
		child.detach();
		Ok(())
	}

	fn query_selector(api: &ApiRef, selector: &str) -> PolymerResult<Option<NodeRef>> {
		let list = parse_selector("querySelector", selector)?;
		Ok(api.node.descendants().into_iter().find(|n| list.matches(n)))
	}

	fn query_selector_all(api: &ApiRef, selector: &str) -> PolymerResult<Vec<NodeRef>> {
		let list = parse_selector("querySelectorAll", selector)?;
		Ok(api
			.node
			.descendants()
			.into_iter()
			.filter(|n| list.matches(n))
			.collect())
	}

	fn local_dom_query(api: &ApiRef, query: LocalDomQuery<'_>) -> Vec<NodeRef> {
		let node = &api.node;
		match query {
			LocalDomQuery::DistributedNodes => distribution::distributed_nodes(node),
			LocalDomQuery::DestinationInsertionPoints => {
				distribution::destination_insertion_points(node)
			}
			LocalDomQuery::ContentChildNodes(selector) => {
				distribution::content_child_nodes(node, selector)
			}
			LocalDomQuery::ContentChildren(selector) => {
				distribution::content_child_nodes(node, selector)
					.into_iter()
					.filter(NodeRef::is_element)
					.collect()
			}
			LocalDomQuery::EffectiveChildNodes => distribution::effective_child_nodes(node),
			LocalDomQuery::EffectiveChildren => distribution::effective_child_nodes(node)
				.into_iter()
				.filter(NodeRef::is_element)
				.collect(),
			LocalDomQuery::QueryAllEffectiveChildren(selector) => {
				distribution::query_effective_children(node, selector)
			}
		}
	}

	fn query_effective_children(api: &ApiRef, selector: &str) -> Option<NodeRef> {
		distribution::query_effective_children(&api.node, selector)
			.into_iter()
			.next()
	}

	fn observe_nodes(api: &ApiRef, callback: ObserveCallback<NodeRef>) -> ObservationId {
		with_state(|state| {
			let id = ObservationId(state.next_id());
			state.observers.push(ObserverEntry {
				id,
				target: api.node.clone(),
				seen: None,
				callback: Rc::new(RefCell::new(callback)),
			});
			id
		})
	}

	fn unobserve_nodes(_api: &ApiRef, observation: ObservationId) {
		with_state(|state| state.observers.retain(|entry| entry.id != observation));
	}

	fn document() -> NodeRef {
		with_state(|state| state.document.clone())
	}

	fn document_element() -> Option<NodeRef> {
		Self::document()
			.children()
			.into_iter()
			.find(NodeRef::is_element)
	}

	fn create_element(name: &str) -> PolymerResult<NodeRef> {
		validate_name("createElement", name)?;
		Ok(NodeRef::element(name))
	}

	fn create_element_ns(namespace: &str, name: &str) -> PolymerResult<NodeRef> {
		validate_name("createElementNS", name)?;
		if namespace == XHTML_NAMESPACE {
			Ok(NodeRef::element(name))
		} else {
			Ok(NodeRef::new(NodeKind::Element, name))
		}
	}

	fn create_text_node(text: &str) -> NodeRef {
		NodeRef::text(text)
	}

	fn element_from_point(x: f64, y: f64) -> Option<NodeRef> {
		Self::document()
			.composed_descendants()
			.into_iter()
			.rev()
			.find(|node| node.is_element() && node.data().rect.contains(x, y))
	}

	fn window_target() -> NodeRef {
		with_state(|state| state.window.clone())
	}

	fn node_target(node: &NodeRef) -> NodeRef {
		node.clone()
	}

	fn add_event_listener(
		target: &NodeRef,
		event: &str,
		handler: EventHandler<Value>,
	) -> ListenerId {
		let id = ListenerId(with_state(HeadlessState::next_id));
		target.data_mut().listeners.push(tree::Registration {
			id,
			event: event.to_string(),
			handler: Rc::new(RefCell::new(handler)),
		});
		id
	}

	fn remove_event_listener(target: &NodeRef, _event: &str, listener: ListenerId) {
		target.data_mut().listeners.retain(|r| r.id != listener);
	}

	fn forget_listener(_listener: ListenerId) {}

	fn decode_payload<T: DeserializeOwned>(payload: &Value) -> Result<T, String> {
		serde_json::from_value(payload.clone()).map_err(|e| e.to_string())
	}
}

/// Gives the current thread a fresh document with the shim installed under
/// `Polymer`, and tears down the established [`DomApi`].
pub fn reset() {
	with_state(|state| *state = HeadlessState::new());
	DomApi::teardown();
}

/// Installs the shim under `Polymer`.
pub fn install_polymer() {
	install_polymer_as(DEFAULT_POLYMER_GLOBAL);
}

/// Installs the shim under a custom global.
pub fn install_polymer_as(global: &str) {
	with_state(|state| state.polymer_global = Some(global.to_string()));
}

/// Removes the shim, as if the framework had not loaded yet.
pub fn uninstall_polymer() {
	with_state(|state| state.polymer_global = None);
}

/// Attaches a local DOM root to `host` and returns it. Attaching twice
/// returns the existing root.
pub fn attach_local_root(host: &NodeRef) -> NodeRef {
	host.attach_local_root()
}

/// Dispatches `event` on `target` and returns how many listeners ran.
///
/// `detail` becomes the payload handed to listeners. A `null` detail
/// delivers the event object itself, `{"type": event}`.
pub fn dispatch_event(target: &NodeRef, event: &str, detail: Value) -> usize {
	let payload = if detail.is_null() {
		serde_json::json!({ "type": event })
	} else {
		detail
	};
	let handlers: Vec<_> = target
		.data()
		.listeners
		.iter()
		.filter(|r| r.event == event)
		.map(|r| (r.id, Rc::clone(&r.handler)))
		.collect();

	let mut invoked = 0;
	for (id, handler) in handlers {
		if !target.has_listener(id) {
			continue;
		}
		match handler.try_borrow_mut() {
			Ok(mut handler) => {
				(*handler)(payload.clone());
				invoked += 1;
			}
			Err(_) => warn_log!("Skipping re-entrant `{}` listener {:?}", event, id),
		}
	}
	invoked
}

/// The window as an event target.
pub fn window_target() -> NodeRef {
	HeadlessHost::window_target()
}

/// Sets the rect returned by `getBoundingClientRect` and used by
/// `elementFromPoint`.
pub fn set_client_rect(node: &NodeRef, rect: ClientRect) {
	node.data_mut().rect = rect;
}

/// Sets a namespaced attribute, as `setAttributeNS` would.
pub fn set_attribute_ns(node: &NodeRef, namespace: &str, name: &str, value: &str) {
	node.set_attribute_ns(namespace, name, value);
}

/// A value that already is a `Polymer.dom` wrapper of `node`.
pub fn wrapped_value(node: &NodeRef) -> HeadlessValue {
	HeadlessValue::Api(ApiRef { node: node.clone() })
}

/// A value holding the plain `node`.
pub fn node_value(node: &NodeRef) -> HeadlessValue {
	HeadlessValue::Node(node.clone())
}

/// `null`
pub fn null_value() -> HeadlessValue {
	HeadlessValue::Null
}

/// `undefined`
pub fn undefined_value() -> HeadlessValue {
	HeadlessValue::Undefined
}

/// Number of `Polymer.dom.flush()` calls since the last [`reset`].
pub fn flush_count() -> usize {
	with_state(|state| state.flush_count)
}

/// Number of listeners registered on `node`.
pub fn listener_count(node: &NodeRef) -> usize {
	node.data().listeners.len()
}

/// Number of live node observations.
pub fn observer_count() -> usize {
	with_state(|state| state.observers.len())
}
