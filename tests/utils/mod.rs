//! Shared fixtures for the headless integration tests
//!
//! Every fixture starts from [`headless::reset`], so each test sees a fresh
//! `html > head, body` document with the shim installed under `Polymer`.

#![allow(dead_code)]

use polymer_dom::{Document, Element, Node, document, headless, wrap};
use rstest::fixture;

/// A fresh page.
#[fixture]
pub fn page() -> Document {
	headless::reset();
	document()
}

/// `<body>` of the current page.
pub fn body(doc: &Document) -> Element {
	doc.query_selector("body")
		.expect("`body` is a valid selector")
		.expect("the page has a body")
}

/// Creates `<tag>` and appends it to `parent`.
pub fn append(doc: &Document, parent: &Element, tag: &str) -> Element {
	let element = doc.create_element(tag).expect("valid tag name");
	parent.append_child(&element).expect("append succeeds");
	element
}

/// Wraps the local root attached to `host`.
pub fn local_root(host: &Element) -> Element {
	let root = headless::attach_local_root(host.unwrapped());
	wrap(root).expect("local roots wrap")
}

/// A card component in the page:
///
/// ```text
/// <x-card>                           local root
///   <h2 class="title">Title</h2>       <header>
///   "hello"                              <content select=".title">
///   <p>Body</p>                        </header>
/// </x-card>                            <content>
/// ```
pub struct Card {
	pub host: Element,
	pub root: Element,
	pub title: Element,
	pub text: Node,
	pub body: Element,
	pub header: Element,
	pub title_slot: Element,
	pub default_slot: Element,
}

/// A page holding one [`Card`].
#[fixture]
pub fn card(page: Document) -> (Document, Card) {
	let parent = body(&page);
	let host = append(&page, &parent, "x-card");

	let title = append(&page, &host, "h2");
	title
		.set_attribute("class", "title")
		.expect("valid attribute");
	title.set_text_content("Title");
	let text = page.create_text_node("hello");
	host.append_child(&text).expect("append succeeds");
	let card_body = append(&page, &host, "p");
	card_body.set_text_content("Body");

	let root = local_root(&host);
	let header = append(&page, &root, "header");
	let title_slot = append(&page, &header, "content");
	title_slot
		.set_attribute("select", ".title")
		.expect("valid attribute");
	let default_slot = append(&page, &root, "content");

	let card = Card {
		host,
		root,
		title,
		text,
		body: card_body,
		header,
		title_slot,
		default_slot,
	};
	(page, card)
}
