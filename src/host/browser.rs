//! Browser host
//!
//! Binds the live page through `web-sys` and the Polymer shim through a
//! `wasm-bindgen` extern type. The global the shim lives under comes from
//! [`BindingConfig`](crate::BindingConfig), so every shim lookup goes through
//! `Reflect` on `globalThis` rather than a fixed `js_namespace`.

use js_sys::{Array, Function, Object, Reflect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, Document, Element, Event, EventTarget, Node};

use crate::error::{PolymerError, PolymerResult};
use crate::host::{
	BoundaryValue, ClientRect, DomHost, EventHandler, LocalDomQuery, ObserveCallback,
};
use crate::warn_log;

#[wasm_bindgen]
extern "C" {
	/// `Polymer.dom(node)` wrapper (an instance of `Polymer.DomApi`).
	#[wasm_bindgen(extends = Object)]
	#[derive(Debug, Clone, PartialEq, Eq)]
	pub type PolymerDomApi;

	#[wasm_bindgen(method, getter, structural)]
	fn node(this: &PolymerDomApi) -> Node;

	#[wasm_bindgen(method, getter, structural, js_name = parentNode)]
	fn parent_node(this: &PolymerDomApi) -> Option<Node>;

	#[wasm_bindgen(method, getter, structural, js_name = childNodes)]
	fn child_nodes(this: &PolymerDomApi) -> JsValue;

	#[wasm_bindgen(method, getter, structural)]
	fn children(this: &PolymerDomApi) -> JsValue;

	#[wasm_bindgen(method, getter, structural, js_name = firstChild)]
	fn first_child(this: &PolymerDomApi) -> Option<Node>;

	#[wasm_bindgen(method, getter, structural, js_name = lastChild)]
	fn last_child(this: &PolymerDomApi) -> Option<Node>;

	#[wasm_bindgen(method, getter, structural, js_name = nextSibling)]
	fn next_sibling(this: &PolymerDomApi) -> Option<Node>;

	#[wasm_bindgen(method, getter, structural, js_name = previousSibling)]
	fn previous_sibling(this: &PolymerDomApi) -> Option<Node>;

	#[wasm_bindgen(method, getter, structural, js_name = textContent)]
	fn text_content(this: &PolymerDomApi) -> Option<String>;

	#[wasm_bindgen(method, setter, structural, js_name = textContent)]
	fn set_text_content(this: &PolymerDomApi, text: &str);

	#[wasm_bindgen(method, catch, structural, js_name = setAttribute)]
	fn set_attribute(this: &PolymerDomApi, name: &str, value: &str) -> Result<(), JsValue>;

	#[wasm_bindgen(method, catch, structural, js_name = removeAttribute)]
	fn remove_attribute(this: &PolymerDomApi, name: &str) -> Result<(), JsValue>;

	#[wasm_bindgen(method, catch, structural, js_name = appendChild)]
	fn append_child(this: &PolymerDomApi, node: &Node) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch, structural, js_name = insertBefore)]
	fn insert_before(
		this: &PolymerDomApi,
		node: &Node,
		reference: &JsValue,
	) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch, structural, js_name = removeChild)]
	fn remove_child(this: &PolymerDomApi, node: &Node) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch, structural, js_name = querySelector)]
	fn query_selector(this: &PolymerDomApi, selector: &str) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch, structural, js_name = querySelectorAll)]
	fn query_selector_all(this: &PolymerDomApi, selector: &str) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method, structural, js_name = observeNodes)]
	fn observe_nodes(this: &PolymerDomApi, callback: &Function) -> JsValue;

	#[wasm_bindgen(method, structural, js_name = unobserveNodes)]
	fn unobserve_nodes(this: &PolymerDomApi, handle: &JsValue);
}

/// A registered `observeNodes` handle plus the closure it calls.
pub struct BrowserObservation {
	handle: JsValue,
	_callback: Closure<dyn FnMut(JsValue)>,
}

impl std::fmt::Debug for BrowserObservation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BrowserObservation")
			.field("handle", &self.handle)
			.field("callback", &"<closure>")
			.finish()
	}
}

fn js_message(value: &JsValue) -> String {
	value
		.dyn_ref::<js_sys::Error>()
		.map(|error| String::from(error.message()))
		.or_else(|| value.as_string())
		.unwrap_or_else(|| format!("{:?}", value))
}

fn polymer_object(global: &str) -> Option<JsValue> {
	Reflect::get(&js_sys::global(), &JsValue::from_str(global))
		.ok()
		.filter(|value| !value.is_null() && !value.is_undefined())
}

fn get_path(target: &JsValue, key: &str) -> Option<JsValue> {
	Reflect::get(target, &JsValue::from_str(key))
		.ok()
		.filter(|value| !value.is_null() && !value.is_undefined())
}

/// Converts an array-like shim result (Array or NodeList) into nodes.
fn nodes_from(value: JsValue) -> Vec<Node> {
	if value.is_null() || value.is_undefined() {
		return Vec::new();
	}
	Array::from(&value)
		.iter()
		.filter_map(|item| item.dyn_into::<Node>().ok())
		.collect()
}

fn optional_node(value: JsValue) -> Option<Node> {
	value.dyn_into::<Node>().ok()
}

/// Calls a shim method that may be missing; a missing method or a throw
/// yields `undefined`.
fn call_optional(api: &PolymerDomApi, method: &str, args: &[&JsValue]) -> JsValue {
	let Some(function) = get_path(api, method).and_then(|f| f.dyn_into::<Function>().ok()) else {
		return JsValue::UNDEFINED;
	};
	let array = Array::new();
	for arg in args {
		array.push(arg);
	}
	function
		.apply(api, &array)
		.unwrap_or(JsValue::UNDEFINED)
}

fn document_handle() -> Document {
	Reflect::get(&js_sys::global(), &JsValue::from_str("document"))
		.unwrap_or(JsValue::UNDEFINED)
		.unchecked_into::<Document>()
}

/// The browser [`DomHost`].
pub struct BrowserHost;

impl DomHost for BrowserHost {
	type Node = Node;
	type Api = PolymerDomApi;
	type Marker = Function;
	type Value = JsValue;
	type Target = EventTarget;
	type Listener = Closure<dyn FnMut(Event)>;
	type Observation = BrowserObservation;
	type Payload = Event;

	fn dom_api_marker(global: &str) -> Option<Function> {
		polymer_object(global)
			.and_then(|polymer| get_path(&polymer, "DomApi"))
			.and_then(|marker| marker.dyn_into::<Function>().ok())
	}

	fn classify(value: JsValue, marker: &Function) -> BoundaryValue<Node, PolymerDomApi> {
		if value.is_null() || value.is_undefined() {
			return BoundaryValue::Missing;
		}
		let is_dom_api = value.is_object()
			&& get_path(marker, "prototype")
				.and_then(|prototype| prototype.dyn_into::<Object>().ok())
				.is_some_and(|prototype| prototype.is_prototype_of(&value));
		if is_dom_api {
			return BoundaryValue::Wrapped(value.unchecked_into());
		}
		match value.dyn_into::<Node>() {
			Ok(node) => BoundaryValue::Node(node),
			Err(_) => BoundaryValue::Other,
		}
	}

	fn node_value(node: &Node) -> JsValue {
		node.clone().into()
	}

	fn polymer_dom(global: &str, node: &Node) -> PolymerResult<PolymerDomApi> {
		let not_initialized = || PolymerError::NotInitialized {
			global: global.to_string(),
		};
		let polymer = polymer_object(global).ok_or_else(not_initialized)?;
		let dom = get_path(&polymer, "dom")
			.and_then(|dom| dom.dyn_into::<Function>().ok())
			.ok_or_else(not_initialized)?;
		dom.call1(&polymer, node)
			.map(|api| api.unchecked_into::<PolymerDomApi>())
			.map_err(|e| PolymerError::host("Polymer.dom", js_message(&e)))
	}

	fn api_node(api: &PolymerDomApi) -> Node {
		api.node()
	}

	fn flush(global: &str) {
		let flushed = polymer_object(global)
			.and_then(|polymer| get_path(&polymer, "dom"))
			.and_then(|dom| {
				let flush = get_path(&dom, "flush")?.dyn_into::<Function>().ok()?;
				Some(flush.call0(&dom))
			});
		match flushed {
			Some(Ok(_)) => {}
			Some(Err(e)) => warn_log!("`{}.dom.flush` threw: {}", global, js_message(&e)),
			None => warn_log!("`{}.dom.flush` is not available", global),
		}
	}

	fn node_type(node: &Node) -> u16 {
		node.node_type()
	}

	fn node_name(node: &Node) -> String {
		node.node_name()
	}

	fn tag_name(node: &Node) -> Option<String> {
		node.dyn_ref::<Element>().map(Element::tag_name)
	}

	fn raw_text_content(node: &Node) -> Option<String> {
		node.text_content()
	}

	fn get_attribute(node: &Node, name: &str) -> Option<String> {
		node.dyn_ref::<Element>()
			.and_then(|element| element.get_attribute(name))
	}

	fn get_attribute_ns(node: &Node, namespace: &str, name: &str) -> Option<String> {
		let namespace = (!namespace.is_empty()).then_some(namespace);
		node.dyn_ref::<Element>()
			.and_then(|element| element.get_attribute_ns(namespace, name))
	}

	fn has_attribute(node: &Node, name: &str) -> bool {
		node.dyn_ref::<Element>()
			.is_some_and(|element| element.has_attribute(name))
	}

	fn parent_element(node: &Node) -> Option<Node> {
		node.parent_element().map(Into::into)
	}

	fn local_root(node: &Node) -> Option<Node> {
		get_path(node, "root").and_then(optional_node)
	}

	fn client_rect(node: &Node) -> ClientRect {
		node.dyn_ref::<Element>()
			.map(|element| {
				let rect = element.get_bounding_client_rect();
				ClientRect::new(rect.x(), rect.y(), rect.width(), rect.height())
			})
			.unwrap_or_default()
	}

	fn get_property<T: DeserializeOwned>(node: &Node, name: &str) -> PolymerResult<Option<T>> {
		let Some(value) = get_path(node, name) else {
			return Ok(None);
		};
		serde_wasm_bindgen::from_value(value)
			.map(Some)
			.map_err(|e| PolymerError::host("getProperty", format!("`{}`: {}", name, e)))
	}

	fn set_property<T: Serialize>(node: &Node, name: &str, value: &T) -> PolymerResult<()> {
		let value = value
			.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
			.map_err(|e| PolymerError::host("setProperty", format!("`{}`: {}", name, e)))?;
		Reflect::set(node, &JsValue::from_str(name), &value)
			.map(|_| ())
			.map_err(|e| PolymerError::host("setProperty", js_message(&e)))
	}

	fn parent_node(api: &PolymerDomApi) -> Option<Node> {
		api.parent_node()
	}

	fn child_nodes(api: &PolymerDomApi) -> Vec<Node> {
		nodes_from(api.child_nodes())
	}

	fn children(api: &PolymerDomApi) -> Vec<Node> {
		nodes_from(api.children())
	}

	fn first_child(api: &PolymerDomApi) -> Option<Node> {
		api.first_child()
	}

	fn last_child(api: &PolymerDomApi) -> Option<Node> {
		api.last_child()
	}

	fn next_sibling(api: &PolymerDomApi) -> Option<Node> {
		api.next_sibling()
	}

	fn previous_sibling(api: &PolymerDomApi) -> Option<Node> {
		api.previous_sibling()
	}

	fn text_content(api: &PolymerDomApi) -> Option<String> {
		api.text_content()
	}

	fn set_text_content(api: &PolymerDomApi, text: &str) {
		api.set_text_content(text);
	}

	fn set_attribute(api: &PolymerDomApi, name: &str, value: &str) -> PolymerResult<()> {
		api.set_attribute(name, value)
			.map_err(|e| PolymerError::host("setAttribute", js_message(&e)))
	}

	fn remove_attribute(api: &PolymerDomApi, name: &str) -> PolymerResult<()> {
		api.remove_attribute(name)
			.map_err(|e| PolymerError::host("removeAttribute", js_message(&e)))
	}

	fn append_child(api: &PolymerDomApi, child: &Node) -> PolymerResult<()> {
		api.append_child(child)
			.map(|_| ())
			.map_err(|e| PolymerError::host("appendChild", js_message(&e)))
	}

	fn insert_before(
		api: &PolymerDomApi,
		child: &Node,
		reference: Option<&Node>,
	) -> PolymerResult<()> {
		let reference = reference.map_or(JsValue::NULL, |node| node.clone().into());
		api.insert_before(child, &reference)
			.map(|_| ())
			.map_err(|e| PolymerError::host("insertBefore", js_message(&e)))
	}

	fn remove_child(api: &PolymerDomApi, child: &Node) -> PolymerResult<()> {
		api.remove_child(child)
			.map(|_| ())
			.map_err(|e| PolymerError::host("removeChild", js_message(&e)))
	}

	fn query_selector(api: &PolymerDomApi, selector: &str) -> PolymerResult<Option<Node>> {
		api.query_selector(selector)
			.map(optional_node)
			.map_err(|e| PolymerError::host("querySelector", js_message(&e)))
	}

	fn query_selector_all(api: &PolymerDomApi, selector: &str) -> PolymerResult<Vec<Node>> {
		api.query_selector_all(selector)
			.map(nodes_from)
			.map_err(|e| PolymerError::host("querySelectorAll", js_message(&e)))
	}

	fn local_dom_query(api: &PolymerDomApi, query: LocalDomQuery<'_>) -> Vec<Node> {
		let method = query.method_name();
		let result = match query {
			LocalDomQuery::ContentChildNodes(selector)
			| LocalDomQuery::ContentChildren(selector)
			| LocalDomQuery::QueryAllEffectiveChildren(selector) => {
				call_optional(api, method, &[&JsValue::from_str(selector)])
			}
			_ => call_optional(api, method, &[]),
		};
		nodes_from(result)
	}

	fn query_effective_children(api: &PolymerDomApi, selector: &str) -> Option<Node> {
		optional_node(call_optional(
			api,
			"queryEffectiveChildren",
			&[&JsValue::from_str(selector)],
		))
	}

	fn observe_nodes(
		api: &PolymerDomApi,
		mut callback: ObserveCallback<Node>,
	) -> BrowserObservation {
		let closure = Closure::wrap(Box::new(move |info: JsValue| {
			let added = get_path(&info, "addedNodes")
				.map(nodes_from)
				.unwrap_or_default();
			let removed = get_path(&info, "removedNodes")
				.map(nodes_from)
				.unwrap_or_default();
			callback(added, removed);
		}) as Box<dyn FnMut(JsValue)>);
		let handle = api.observe_nodes(closure.as_ref().unchecked_ref());
		BrowserObservation {
			handle,
			_callback: closure,
		}
	}

	fn unobserve_nodes(api: &PolymerDomApi, observation: BrowserObservation) {
		api.unobserve_nodes(&observation.handle);
	}

	fn document() -> Node {
		document_handle().unchecked_into()
	}

	fn document_element() -> Option<Node> {
		document_handle().document_element().map(Into::into)
	}

	fn create_element(name: &str) -> PolymerResult<Node> {
		document_handle()
			.create_element(name)
			.map(Into::into)
			.map_err(|e| PolymerError::host("createElement", js_message(&e)))
	}

	fn create_element_ns(namespace: &str, name: &str) -> PolymerResult<Node> {
		document_handle()
			.create_element_ns(Some(namespace), name)
			.map(Into::into)
			.map_err(|e| PolymerError::host("createElementNS", js_message(&e)))
	}

	fn create_text_node(text: &str) -> Node {
		document_handle().create_text_node(text).into()
	}

	fn element_from_point(x: f64, y: f64) -> Option<Node> {
		document_handle()
			.element_from_point(x as f32, y as f32)
			.map(Into::into)
	}

	fn window_target() -> EventTarget {
		js_sys::global().unchecked_into()
	}

	fn node_target(node: &Node) -> EventTarget {
		node.clone().unchecked_into()
	}

	fn add_event_listener(
		target: &EventTarget,
		event: &str,
		handler: EventHandler<Event>,
	) -> Closure<dyn FnMut(Event)> {
		let closure = Closure::wrap(handler);
		if let Err(e) =
			target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
		{
			warn_log!("addEventListener(`{}`) failed: {}", event, js_message(&e));
		}
		closure
	}

	fn remove_event_listener(
		target: &EventTarget,
		event: &str,
		listener: Closure<dyn FnMut(Event)>,
	) {
		if let Err(e) =
			target.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
		{
			warn_log!(
				"removeEventListener(`{}`) failed: {}",
				event,
				js_message(&e)
			);
		}
	}

	fn forget_listener(listener: Closure<dyn FnMut(Event)>) {
		listener.forget();
	}

	fn decode_payload<T: DeserializeOwned>(event: &Event) -> Result<T, String> {
		if let Some(custom) = event.dyn_ref::<CustomEvent>() {
			let detail = custom.detail();
			if !detail.is_null() && !detail.is_undefined() {
				return serde_wasm_bindgen::from_value(detail).map_err(|e| e.to_string());
			}
		}
		serde_wasm_bindgen::from_value(event.clone().into()).map_err(|e| e.to_string())
	}
}
