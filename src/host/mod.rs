//! Host seam
//!
//! Every call that reaches the DOM or the Polymer shim goes through
//! [`DomHost`]. On `wasm32` the implementation is the browser host, which
//! talks to the live page through `wasm-bindgen`. Every other target gets the
//! headless host, an in-memory stand-in for the page plus the shim that the
//! native test suite runs against.
//!
//! ## Handles
//!
//! ```text
//! HostValue ──classify──► Missing | Wrapped(Api) | Node(RawNode) | Other
//!                                      │               │
//!                                  api_node     polymer_dom(node)
//!                                      ▼               ▼
//!                                   RawNode  ◄────  Api (Polymer.dom)
//! ```
//!
//! `RawNode` answers attribute and geometry reads. `Api` answers everything
//! the shim rewrites: traversal, mutation, queries and distribution.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PolymerResult;

#[cfg(target_arch = "wasm32")]
pub mod browser;
#[cfg(not(target_arch = "wasm32"))]
pub mod headless;

#[cfg(target_arch = "wasm32")]
pub(crate) use browser::BrowserHost as Host;
#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserObservation as Observation, PolymerDomApi as ApiHandle};
#[cfg(target_arch = "wasm32")]
pub use js_sys::Function as Marker;
#[cfg(target_arch = "wasm32")]
pub use wasm_bindgen::JsValue as HostValue;
#[cfg(target_arch = "wasm32")]
pub use web_sys::{Event as EventPayload, EventTarget as RawEventTarget, Node as RawNode};
/// A registered DOM event listener.
#[cfg(target_arch = "wasm32")]
pub type Listener = wasm_bindgen::closure::Closure<dyn FnMut(web_sys::Event)>;

#[cfg(not(target_arch = "wasm32"))]
pub(crate) use headless::HeadlessHost as Host;
#[cfg(not(target_arch = "wasm32"))]
pub use headless::{
	ApiRef as ApiHandle, DomApiClass as Marker, HeadlessValue as HostValue, ListenerId as Listener,
	NodeRef as RawNode, NodeRef as RawEventTarget, ObservationId as Observation,
};
/// Payload handed to event handlers: the `detail` of the event, or the
/// event object itself when it carries none.
#[cfg(not(target_arch = "wasm32"))]
pub type EventPayload = serde_json::Value;

/// DOM `nodeType` of element nodes.
pub const ELEMENT_NODE: u16 = 1;
/// DOM `nodeType` of text nodes.
pub const TEXT_NODE: u16 = 3;
/// DOM `nodeType` of comment nodes.
pub const COMMENT_NODE: u16 = 8;
/// DOM `nodeType` of documents.
pub const DOCUMENT_NODE: u16 = 9;
/// DOM `nodeType` of document fragments (local DOM roots).
pub const DOCUMENT_FRAGMENT_NODE: u16 = 11;

/// Outcome of the one runtime capability check made on an untyped value.
#[derive(Debug, Clone)]
pub enum BoundaryValue<N, A> {
	/// `null` or `undefined`
	Missing,
	/// Already a `Polymer.dom` wrapper
	Wrapped(A),
	/// A plain host node
	Node(N),
	/// Anything else
	Other,
}

/// Callback handed to `observeNodes`: `(added, removed)` per batch.
pub type ObserveCallback<N> = Box<dyn FnMut(Vec<N>, Vec<N>)>;

/// Listener handed to `addEventListener`.
pub type EventHandler<P> = Box<dyn FnMut(P)>;

/// Local-DOM queries the shim answers with a node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalDomQuery<'a> {
	/// `getDistributedNodes()`
	DistributedNodes,
	/// `getDestinationInsertionPoints()`
	DestinationInsertionPoints,
	/// `getContentChildNodes(selector)`
	ContentChildNodes(&'a str),
	/// `getContentChildren(selector)`
	ContentChildren(&'a str),
	/// `getEffectiveChildNodes()`
	EffectiveChildNodes,
	/// `getEffectiveChildren()`
	EffectiveChildren,
	/// `queryAllEffectiveChildren(selector)`
	QueryAllEffectiveChildren(&'a str),
}

impl LocalDomQuery<'_> {
	/// Name of the shim method answering the query.
	pub fn method_name(&self) -> &'static str {
		match self {
			Self::DistributedNodes => "getDistributedNodes",
			Self::DestinationInsertionPoints => "getDestinationInsertionPoints",
			Self::ContentChildNodes(_) => "getContentChildNodes",
			Self::ContentChildren(_) => "getContentChildren",
			Self::EffectiveChildNodes => "getEffectiveChildNodes",
			Self::EffectiveChildren => "getEffectiveChildren",
			Self::QueryAllEffectiveChildren(_) => "queryAllEffectiveChildren",
		}
	}
}

/// Bounding box of an element, in CSS pixels relative to the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
	/// Left edge
	pub x: f64,
	/// Top edge
	pub y: f64,
	/// Width
	pub width: f64,
	/// Height
	pub height: f64,
}

impl ClientRect {
	/// Creates a rect from its origin and size.
	pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	/// Returns true if the point lies inside a non-empty rect.
	pub fn contains(&self, x: f64, y: f64) -> bool {
		self.width > 0.0
			&& self.height > 0.0
			&& x >= self.x
			&& x < self.x + self.width
			&& y >= self.y
			&& y < self.y + self.height
	}
}

/// The browser DOM plus the Polymer shim, as seen by the facade.
///
/// Implementations are stateless from the caller's side: the page (or the
/// headless stand-in) owns the state, so every operation is an associated
/// function.
pub trait DomHost {
	/// Raw node handle, never a `Polymer.dom` wrapper.
	type Node: Clone + PartialEq + fmt::Debug + 'static;
	/// `Polymer.dom(node)` wrapper.
	type Api: Clone + fmt::Debug + 'static;
	/// The `DomApi` capability marker.
	type Marker: Clone + fmt::Debug + 'static;
	/// Untyped value crossing the host boundary.
	type Value: Clone + fmt::Debug + 'static;
	/// Anything `addEventListener` can be called on.
	type Target: Clone + fmt::Debug + 'static;
	/// Registered listener; removing it needs the handle back.
	type Listener: 'static;
	/// Registered node observation.
	type Observation: 'static;
	/// Native event as delivered to listeners.
	type Payload: 'static;

	/// Reads `<global>.DomApi`.
	fn dom_api_marker(global: &str) -> Option<Self::Marker>;
	/// Runtime capability check on an untyped value.
	fn classify(value: Self::Value, marker: &Self::Marker) -> BoundaryValue<Self::Node, Self::Api>;
	/// Wraps a node into an untyped value.
	fn node_value(node: &Self::Node) -> Self::Value;
	/// `<global>.dom(node)`.
	fn polymer_dom(global: &str, node: &Self::Node) -> PolymerResult<Self::Api>;
	/// `api.node`, the node a wrapper was made for.
	fn api_node(api: &Self::Api) -> Self::Node;
	/// `<global>.dom.flush()`.
	fn flush(global: &str);

	/// `nodeType`
	fn node_type(node: &Self::Node) -> u16;
	/// `nodeName`
	fn node_name(node: &Self::Node) -> String;
	/// `tagName`, `None` for non-elements.
	fn tag_name(node: &Self::Node) -> Option<String>;
	/// `textContent` read on the raw node.
	fn raw_text_content(node: &Self::Node) -> Option<String>;
	/// `getAttribute(name)`
	fn get_attribute(node: &Self::Node, name: &str) -> Option<String>;
	/// `getAttributeNS(namespace, name)`; an empty namespace is the null one.
	fn get_attribute_ns(node: &Self::Node, namespace: &str, name: &str) -> Option<String>;
	/// `hasAttribute(name)`
	fn has_attribute(node: &Self::Node, name: &str) -> bool;
	/// `parentElement`
	fn parent_element(node: &Self::Node) -> Option<Self::Node>;
	/// The framework-internal `root` property (local DOM root).
	fn local_root(node: &Self::Node) -> Option<Self::Node>;
	/// `getBoundingClientRect()`
	fn client_rect(node: &Self::Node) -> ClientRect;
	/// Reads a JS property and decodes it.
	fn get_property<T: DeserializeOwned>(node: &Self::Node, name: &str) -> PolymerResult<Option<T>>;
	/// Encodes a value and writes it to a JS property.
	fn set_property<T: Serialize>(node: &Self::Node, name: &str, value: &T) -> PolymerResult<()>;

	/// `Polymer.dom(node).parentNode`
	fn parent_node(api: &Self::Api) -> Option<Self::Node>;
	/// `Polymer.dom(node).childNodes`
	fn child_nodes(api: &Self::Api) -> Vec<Self::Node>;
	/// `Polymer.dom(node).children`
	fn children(api: &Self::Api) -> Vec<Self::Node>;
	/// `Polymer.dom(node).firstChild`
	fn first_child(api: &Self::Api) -> Option<Self::Node>;
	/// `Polymer.dom(node).lastChild`
	fn last_child(api: &Self::Api) -> Option<Self::Node>;
	/// `Polymer.dom(node).nextSibling`
	fn next_sibling(api: &Self::Api) -> Option<Self::Node>;
	/// `Polymer.dom(node).previousSibling`
	fn previous_sibling(api: &Self::Api) -> Option<Self::Node>;
	/// `Polymer.dom(node).textContent`
	fn text_content(api: &Self::Api) -> Option<String>;
	/// `Polymer.dom(node).textContent = text`
	fn set_text_content(api: &Self::Api, text: &str);
	/// `Polymer.dom(node).setAttribute(name, value)`
	fn set_attribute(api: &Self::Api, name: &str, value: &str) -> PolymerResult<()>;
	/// `Polymer.dom(node).removeAttribute(name)`
	fn remove_attribute(api: &Self::Api, name: &str) -> PolymerResult<()>;
	/// `Polymer.dom(node).appendChild(child)`
	fn append_child(api: &Self::Api, child: &Self::Node) -> PolymerResult<()>;
	/// `Polymer.dom(node).insertBefore(child, reference)`
	fn insert_before(
		api: &Self::Api,
		child: &Self::Node,
		reference: Option<&Self::Node>,
	) -> PolymerResult<()>;
	/// `Polymer.dom(node).removeChild(child)`
	fn remove_child(api: &Self::Api, child: &Self::Node) -> PolymerResult<()>;
	/// `Polymer.dom(node).querySelector(selector)`
	fn query_selector(api: &Self::Api, selector: &str) -> PolymerResult<Option<Self::Node>>;
	/// `Polymer.dom(node).querySelectorAll(selector)`
	fn query_selector_all(api: &Self::Api, selector: &str) -> PolymerResult<Vec<Self::Node>>;
	/// One of the node-list local DOM queries.
	fn local_dom_query(api: &Self::Api, query: LocalDomQuery<'_>) -> Vec<Self::Node>;
	/// `Polymer.dom(node).queryEffectiveChildren(selector)`
	fn query_effective_children(api: &Self::Api, selector: &str) -> Option<Self::Node>;
	/// `Polymer.dom(node).observeNodes(callback)`
	fn observe_nodes(api: &Self::Api, callback: ObserveCallback<Self::Node>) -> Self::Observation;
	/// `Polymer.dom(node).unobserveNodes(handle)`
	fn unobserve_nodes(api: &Self::Api, observation: Self::Observation);

	/// `document`
	fn document() -> Self::Node;
	/// `document.documentElement`
	fn document_element() -> Option<Self::Node>;
	/// `document.createElement(name)`
	fn create_element(name: &str) -> PolymerResult<Self::Node>;
	/// `document.createElementNS(namespace, name)`
	fn create_element_ns(namespace: &str, name: &str) -> PolymerResult<Self::Node>;
	/// `document.createTextNode(text)`
	fn create_text_node(text: &str) -> Self::Node;
	/// `document.elementFromPoint(x, y)`
	fn element_from_point(x: f64, y: f64) -> Option<Self::Node>;

	/// `window` as an event target.
	fn window_target() -> Self::Target;
	/// A node as an event target.
	fn node_target(node: &Self::Node) -> Self::Target;
	/// `target.addEventListener(event, handler)`
	fn add_event_listener(
		target: &Self::Target,
		event: &str,
		handler: EventHandler<Self::Payload>,
	) -> Self::Listener;
	/// `target.removeEventListener(event, handler)`
	fn remove_event_listener(target: &Self::Target, event: &str, listener: Self::Listener);
	/// Keeps a listener registered for the life of the page.
	fn forget_listener(listener: Self::Listener);
	/// Decodes an event payload (`detail` of a custom event, else the event).
	fn decode_payload<T: DeserializeOwned>(payload: &Self::Payload) -> Result<T, String>;
}
