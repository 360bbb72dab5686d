//! Local DOM distribution tests
//!
//! Uses the card fixture: two light elements and a text node distributed
//! over a `<content select=".title">` and a catch-all `<content>`.

#![cfg(not(target_arch = "wasm32"))]

mod utils;

use polymer_dom::{Document, Node};
use rstest::rstest;
use utils::{Card, append, body, card, local_root, page};

fn names(nodes: &[Node]) -> Vec<String> {
	nodes.iter().map(Node::node_name).collect()
}

#[rstest]
fn test_distributed_nodes_follow_select(card: (Document, Card)) {
	let (_page, card) = card;

	assert_eq!(
		card.title_slot.get_distributed_nodes(),
		vec![card.title.to_node()]
	);
	assert_eq!(
		card.default_slot.get_distributed_nodes(),
		vec![card.text.clone(), card.body.to_node()]
	);
}

#[rstest]
fn test_distributed_nodes_of_non_insertion_point_is_empty(card: (Document, Card)) {
	let (_page, card) = card;

	assert!(card.header.get_distributed_nodes().is_empty());
	assert!(card.host.get_distributed_nodes().is_empty());
}

#[rstest]
fn test_destination_insertion_points(card: (Document, Card)) {
	let (_page, card) = card;

	assert_eq!(
		card.title.get_destination_insertion_points(),
		vec![card.title_slot.to_node()]
	);
	assert_eq!(
		card.body.get_destination_insertion_points(),
		vec![card.default_slot.to_node()]
	);
	assert!(card.header.get_destination_insertion_points().is_empty());
}

#[rstest]
fn test_content_child_nodes_by_selector(card: (Document, Card)) {
	let (_page, card) = card;

	assert_eq!(
		card.host.get_content_child_nodes("[select]"),
		vec![card.title.to_node()]
	);
	assert_eq!(
		card.host.get_content_child_nodes("header content"),
		vec![card.title.to_node()]
	);
	assert_eq!(
		card.host.get_content_child_nodes("content:not-a-pseudo"),
		Vec::<Node>::new()
	);
}

#[rstest]
fn test_content_child_nodes_empty_selector_means_first_content(card: (Document, Card)) {
	let (_page, card) = card;

	assert_eq!(
		card.host.get_content_child_nodes(""),
		vec![card.title.to_node()]
	);
}

#[rstest]
fn test_content_children_skip_text(card: (Document, Card)) {
	let (_page, card) = card;

	let selector = "#main";
	card.default_slot
		.set_attribute("id", "main")
		.expect("valid attribute");

	assert_eq!(
		card.host.get_content_children(selector),
		vec![card.body.clone()]
	);
	assert_eq!(
		names(&card.host.get_content_child_nodes(selector)),
		["#text", "P"]
	);
}

#[rstest]
fn test_content_queries_without_local_root_are_empty(page: Document) {
	let plain = append(&page, &body(&page), "div");
	append(&page, &plain, "span");

	assert!(plain.get_content_child_nodes("").is_empty());
	assert!(plain.get_content_children("content").is_empty());
}

#[rstest]
fn test_effective_children_of_host_are_light_children(card: (Document, Card)) {
	let (_page, card) = card;

	assert_eq!(
		names(&card.host.get_effective_child_nodes()),
		["H2", "#text", "P"]
	);
	assert_eq!(
		card.host.get_effective_children(),
		vec![card.title.clone(), card.body.clone()]
	);
}

#[rstest]
fn test_effective_children_replace_insertion_points(card: (Document, Card)) {
	let (_page, card) = card;

	assert_eq!(
		card.header.get_effective_child_nodes(),
		vec![card.title.to_node()]
	);
	assert_eq!(
		card.root.get_effective_children(),
		vec![card.header.clone(), card.body.clone()]
	);
}

#[rstest]
fn test_query_effective_children(card: (Document, Card)) {
	let (_page, card) = card;

	assert_eq!(
		card.host.query_effective_children("p"),
		Some(card.body.clone())
	);
	assert_eq!(card.root.query_effective_children(".title"), None);
	assert_eq!(
		card.header.query_effective_children(".title"),
		Some(card.title.clone())
	);
	assert_eq!(card.host.query_effective_children("div["), None);
}

#[rstest]
fn test_query_all_effective_children(card: (Document, Card)) {
	let (_page, card) = card;

	assert_eq!(
		card.host.query_all_effective_children("h2, p"),
		vec![card.title.clone(), card.body.clone()]
	);
	assert!(card.host.query_all_effective_children("span").is_empty());
}

#[rstest]
fn test_light_mutation_redistributes(card: (Document, Card)) {
	let (page, card) = card;

	let subtitle = append(&page, &card.host, "h3");
	subtitle
		.set_attribute("class", "title")
		.expect("valid attribute");
	card.host.remove_child(&card.body).expect("body is a child");

	assert_eq!(
		card.title_slot.get_distributed_nodes(),
		vec![card.title.to_node(), subtitle.to_node()]
	);
	assert_eq!(
		card.default_slot.get_distributed_nodes(),
		vec![card.text.clone()]
	);
}

#[rstest]
fn test_reprojection_through_nested_host(card: (Document, Card)) {
	let (page, card) = card;

	// <x-card> local root: <x-frame><content select=".title"></content></x-frame>
	let frame = page.create_element("x-frame").expect("valid tag");
	card.root
		.insert_before(&frame, Some(&card.default_slot))
		.expect("slot is a child");
	card.root
		.remove_child(&card.header)
		.expect("header is a child");
	card.header
		.remove_child(&card.title_slot)
		.expect("slot is a child");
	frame
		.append_child(&card.title_slot)
		.expect("append succeeds");
	let frame_root = local_root(&frame);
	let frame_slot = append(&page, &frame_root, "content");

	assert_eq!(
		frame_slot.get_distributed_nodes(),
		vec![card.title.to_node()]
	);
	assert_eq!(
		card.title.get_destination_insertion_points(),
		vec![card.title_slot.to_node(), frame_slot.to_node()]
	);
	assert_eq!(frame.get_effective_children(), vec![card.title.clone()]);
}
