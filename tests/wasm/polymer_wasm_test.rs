//! Browser tests for the Polymer bindings
//!
//! These install a minimal `Polymer` shim that forwards to the native DOM
//! (no distribution), then drive the facade against the live page.
//!
//! Run with: `wasm-pack test --headless --chrome`

#![cfg(target_arch = "wasm32")]

use futures::channel::mpsc::TryRecvError;
use polymer_dom::{Document, DomApi, Element, PolymerError, document, event_channel, wrap};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use web_sys::{CustomEvent, CustomEventInit};

wasm_bindgen_test_configure!(run_in_browser);

const SHIM: &str = r#"
	if (globalThis.Polymer) { return; }
	class DomApi {
		constructor(node) { this.node = node; }
		get parentNode() { return this.node.parentNode; }
		get childNodes() { return Array.from(this.node.childNodes); }
		get children() { return Array.from(this.node.children || []); }
		get firstChild() { return this.node.firstChild; }
		get lastChild() { return this.node.lastChild; }
		get nextSibling() { return this.node.nextSibling; }
		get previousSibling() { return this.node.previousSibling; }
		get textContent() { return this.node.textContent; }
		set textContent(text) { this.node.textContent = text; }
		setAttribute(name, value) { this.node.setAttribute(name, value); }
		removeAttribute(name) { this.node.removeAttribute(name); }
		appendChild(node) { return this.node.appendChild(node); }
		insertBefore(node, ref) { return this.node.insertBefore(node, ref); }
		removeChild(node) { return this.node.removeChild(node); }
		querySelector(selector) { return this.node.querySelector(selector); }
		querySelectorAll(selector) { return Array.from(this.node.querySelectorAll(selector)); }
		getEffectiveChildNodes() { return this.childNodes; }
		getEffectiveChildren() { return this.children; }
		queryEffectiveChildren(selector) {
			return this.children.find((child) => child.matches(selector)) || null;
		}
		observeNodes(callback) {
			const handle = { node: this.node, callback, active: true };
			pending.push(handle);
			return handle;
		}
		unobserveNodes(handle) { handle.active = false; }
	}
	const pending = [];
	const dom = (node) => new DomApi(node);
	dom.flush = () => {
		globalThis.__polymerFlushes = (globalThis.__polymerFlushes || 0) + 1;
		for (const handle of pending.splice(0)) {
			if (handle.active) {
				handle.callback({ addedNodes: Array.from(handle.node.childNodes), removedNodes: [] });
			}
		}
	};
	globalThis.Polymer = { DomApi, dom };
"#;

fn install_shim() -> Document {
	js_sys::Function::new_no_args(SHIM)
		.call0(&JsValue::NULL)
		.expect("shim installs");
	DomApi::init().expect("shim is installed");
	document()
}

fn attached(doc: &Document, tag: &str) -> Element {
	let element = doc.create_element(tag).expect("valid tag");
	doc.query_selector("body")
		.expect("valid selector")
		.expect("the page has a body")
		.append_child(&element)
		.expect("append succeeds");
	element
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Tap {
	x: i32,
	y: i32,
}

fn dispatch(element: &Element, event: &str, detail: &Tap) {
	let init = CustomEventInit::new();
	init.set_detail(&serde_wasm_bindgen::to_value(detail).expect("serializable"));
	let event = CustomEvent::new_with_event_init_dict(event, &init).expect("valid event");
	element
		.unwrapped()
		.dispatch_event(&event)
		.expect("dispatch succeeds");
}

#[wasm_bindgen_test]
fn test_wasm_wrap_is_idempotent() {
	let doc = install_shim();
	let element = doc.create_element("div").expect("valid tag");

	let again = wrap(element.clone()).expect("elements wrap");
	let from_raw = wrap(element.unwrapped().clone()).expect("nodes wrap");
	let from_value = wrap(JsValue::from(element.dom().clone())).expect("wrappers resolve");

	assert_eq!(again, element);
	assert_eq!(from_raw, element);
	assert_eq!(from_value, element);
	assert!(DomApi::current().is_wrapped(&JsValue::from(element.dom().clone())));
	assert!(wrap(JsValue::NULL).is_none());
}

#[wasm_bindgen_test]
fn test_wasm_get_element_by_id() {
	let doc = install_shim();
	let element = attached(&doc, "section");
	element
		.set_attribute("id", "wasm.main")
		.expect("valid attribute");

	let found = doc
		.get_element_by_id("wasm.main")
		.expect("escaped id is valid");

	assert_eq!(found, Some(element.clone()));
	element.remove_attribute("id").expect("removable");
}

#[wasm_bindgen_test]
fn test_wasm_invalid_selector_is_host_error() {
	let doc = install_shim();

	let err = doc.query_selector("div[").unwrap_err();

	assert!(matches!(err, PolymerError::Host { operation: "querySelector", .. }));
}

#[wasm_bindgen_test]
fn test_wasm_traversal_and_text() {
	let doc = install_shim();
	let list = doc.create_element("ul").expect("valid tag");
	let first = doc.create_element("li").expect("valid tag");
	let last = doc.create_element("li").expect("valid tag");
	list.append_child(&last).expect("append succeeds");
	list.insert_before(&first, Some(&last))
		.expect("reference is a child");
	first.set_text_content("one");

	assert_eq!(list.children(), vec![first.clone(), last]);
	assert_eq!(list.first_child(), Some(first.to_node()));
	assert_eq!(list.text_content().as_deref(), Some("one"));
	assert_eq!(list.query_effective_children("li"), Some(first));
}

#[wasm_bindgen_test]
fn test_wasm_auto_bind_go_properties() {
	let doc = install_shim();
	let template = doc.create_element("template").expect("valid tag");
	template
		.set_attribute("is", "dom-bind-go")
		.expect("valid attribute");

	let element = wrap(template.unwrapped().clone()).expect("nodes wrap");
	let scope = element.as_auto_bind_go().expect("binding template");
	scope.set("tap", &Tap { x: 1, y: 2 }).expect("writable");

	assert_eq!(
		scope.get::<Tap>("tap").expect("readable"),
		Some(Tap { x: 1, y: 2 })
	);
}

#[wasm_bindgen_test]
fn test_wasm_event_callback_and_channel() {
	let doc = install_shim();
	let button = attached(&doc, "button");
	let taps = Rc::new(RefCell::new(Vec::new()));
	let seen = Rc::clone(&taps);
	let (tx, mut rx) = event_channel::<Tap>();

	let callback = button.subscribe_event("tap", move |tap: Tap| seen.borrow_mut().push(tap));
	let channel = button.subscribe_event("tap", tx);
	dispatch(&button, "tap", &Tap { x: 3, y: 4 });

	assert_eq!(*taps.borrow(), vec![Tap { x: 3, y: 4 }]);
	assert_eq!(rx.try_recv(), Ok(Tap { x: 3, y: 4 }));

	callback.unsubscribe();
	button.unsubscribe_event(channel);
	dispatch(&button, "tap", &Tap { x: 5, y: 6 });

	assert_eq!(taps.borrow().len(), 1);
	assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
}

#[wasm_bindgen_test]
fn test_wasm_observe_nodes_on_flush() {
	let doc = install_shim();
	let list = doc.create_element("ul").expect("valid tag");
	let item = doc.create_element("li").expect("valid tag");
	list.append_child(&item).expect("append succeeds");
	let batches = Rc::new(RefCell::new(Vec::new()));
	let seen = Rc::clone(&batches);

	let observer = list.observe_nodes(move |info| seen.borrow_mut().push(info.added_nodes.clone()));
	polymer_dom::flush_dom();

	assert_eq!(*batches.borrow(), vec![vec![item.to_node()]]);
	list.unobserve_nodes(observer);
}
