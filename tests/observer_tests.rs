//! Node observation tests
//!
//! The headless shim delivers observations on `Polymer.dom.flush()`; every
//! test flushes explicitly and inspects the recorded batches.

#![cfg(not(target_arch = "wasm32"))]

mod utils;

use std::cell::RefCell;
use std::rc::Rc;

use polymer_dom::{Document, ObservationInfo, flush_dom, headless};
use rstest::rstest;
use utils::{Card, append, card, page};

type Batches = Rc<RefCell<Vec<ObservationInfo>>>;

fn recorder() -> (Batches, impl FnMut(&ObservationInfo) + 'static) {
	let batches: Batches = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&batches);
	(batches, move |info: &ObservationInfo| {
		sink.borrow_mut().push(info.clone())
	})
}

#[rstest]
fn test_first_batch_reports_existing_children(card: (Document, Card)) {
	let (_page, card) = card;
	let (batches, callback) = recorder();

	let observer = card.host.observe_nodes(callback);
	assert!(batches.borrow().is_empty());
	flush_dom();

	let batches = batches.borrow();
	assert_eq!(batches.len(), 1);
	assert_eq!(batches[0].observer, observer.id());
	assert_eq!(batches[0].target, card.host);
	assert_eq!(
		batches[0].added_nodes,
		vec![card.title.to_node(), card.text.clone(), card.body.to_node()]
	);
	assert!(batches[0].removed_nodes.is_empty());
}

#[rstest]
fn test_unchanged_flush_delivers_nothing(card: (Document, Card)) {
	let (_page, card) = card;
	let (batches, callback) = recorder();
	let _observer = card.host.observe_nodes(callback);

	flush_dom();
	flush_dom();

	assert_eq!(batches.borrow().len(), 1);
}

#[rstest]
fn test_batches_report_added_and_removed(card: (Document, Card)) {
	let (page, card) = card;
	let (batches, callback) = recorder();
	let _observer = card.host.observe_nodes(callback);
	flush_dom();

	let footer = append(&page, &card.host, "footer");
	card.host.remove_child(&card.text).expect("text is a child");
	flush_dom();

	let batches = batches.borrow();
	assert_eq!(batches.len(), 2);
	assert_eq!(batches[1].added_nodes, vec![footer.to_node()]);
	assert_eq!(batches[1].removed_nodes, vec![card.text.clone()]);
}

#[rstest]
fn test_insertion_point_observes_distribution(card: (Document, Card)) {
	let (page, card) = card;
	let (batches, callback) = recorder();
	let _observer = card.title_slot.observe_nodes(callback);
	flush_dom();

	let subtitle = page.create_element("h3").expect("valid tag");
	subtitle
		.set_attribute("class", "title")
		.expect("valid attribute");
	card.host.append_child(&subtitle).expect("append succeeds");
	// Does not match the slot
	append(&page, &card.host, "span");
	flush_dom();

	let batches = batches.borrow();
	assert_eq!(batches[0].added_nodes, vec![card.title.to_node()]);
	assert_eq!(batches.len(), 2);
	assert_eq!(batches[1].added_nodes, vec![subtitle.to_node()]);
	assert_eq!(batches[1].target, card.title_slot);
}

#[rstest]
fn test_empty_element_delivers_nothing_until_children_arrive(page: Document) {
	let list = page.create_element("ul").expect("valid tag");
	let (batches, callback) = recorder();
	let _observer = list.observe_nodes(callback);

	flush_dom();
	assert!(batches.borrow().is_empty());

	let item = append(&page, &list, "li");
	flush_dom();

	let batches = batches.borrow();
	assert_eq!(batches.len(), 1);
	assert_eq!(batches[0].added_nodes, vec![item.to_node()]);
}

#[rstest]
fn test_flush_inside_callback_defers_batch_to_next_flush(page: Document) {
	let list = page.create_element("ul").expect("valid tag");
	let first = append(&page, &list, "li");
	let second = page.create_element("li").expect("valid tag");
	let batches: Batches = Rc::new(RefCell::new(Vec::new()));
	let _observer = list.observe_nodes({
		let batches = Rc::clone(&batches);
		let list = list.clone();
		let second = second.clone();
		move |info| {
			batches.borrow_mut().push(info.clone());
			if batches.borrow().len() == 1 {
				list.append_child(&second).expect("append succeeds");
				flush_dom();
			}
		}
	});

	flush_dom();
	assert_eq!(batches.borrow().len(), 1);
	flush_dom();
	flush_dom();

	let batches = batches.borrow();
	assert_eq!(batches.len(), 2);
	assert_eq!(batches[0].added_nodes, vec![first.to_node()]);
	assert_eq!(batches[1].added_nodes, vec![second.to_node()]);
	assert!(batches[1].removed_nodes.is_empty());
}

#[rstest]
fn test_unobserve_stops_delivery(card: (Document, Card)) {
	let (page, card) = card;
	let (batches, callback) = recorder();
	let observer = card.host.observe_nodes(callback);
	flush_dom();
	assert_eq!(headless::observer_count(), 1);

	card.host.unobserve_nodes(observer);
	append(&page, &card.host, "footer");
	flush_dom();

	assert_eq!(headless::observer_count(), 0);
	assert_eq!(batches.borrow().len(), 1);
}

#[rstest]
fn test_dropping_observer_unobserves(card: (Document, Card)) {
	let (_page, card) = card;
	let (batches, callback) = recorder();

	{
		let _observer = card.host.observe_nodes(callback);
		assert_eq!(headless::observer_count(), 1);
	}
	flush_dom();

	assert_eq!(headless::observer_count(), 0);
	assert!(batches.borrow().is_empty());
}

#[rstest]
fn test_observers_are_independent(card: (Document, Card)) {
	let (page, card) = card;
	let (first_batches, first) = recorder();
	let (second_batches, second) = recorder();
	let first = card.host.observe_nodes(first);
	let second = card.default_slot.observe_nodes(second);
	assert_ne!(first.id(), second.id());
	flush_dom();

	drop(first);
	append(&page, &card.host, "footer");
	flush_dom();

	assert_eq!(first_batches.borrow().len(), 1);
	let second_batches = second_batches.borrow();
	assert_eq!(second_batches.len(), 2);
	assert_eq!(second_batches[1].observer, second.id());
	assert_eq!(second_batches[1].added_nodes.len(), 1);
}

#[rstest]
fn test_observer_id_display(page: Document) {
	let list = page.create_element("ul").expect("valid tag");

	let observer = list.observe_nodes(|_| {});

	assert_eq!(
		observer.id().to_string(),
		format!("observer-{}", observer.id().as_usize())
	);
	assert_eq!(observer.element(), &list);
}
