//! `<content select>` distribution for the headless shim.
//!
//! Insertion points are the `CONTENT` elements of a host's local root, in
//! tree order. Each one takes every node of the host's pool that no earlier
//! point took: the element children matching its `select` attribute, or
//! every remaining node when it has none. The pool is the host's light
//! children with nested insertion points replaced by their own distribution,
//! so reprojected nodes flow through.

use super::NodeRef;
use super::tree::NodeKind;
use super::selector::SelectorList;

pub(crate) fn is_insertion_point(node: &NodeRef) -> bool {
	node.tag()
		.is_some_and(|tag| tag.eq_ignore_ascii_case("content"))
}

/// Insertion points of `host`'s local root paired with their nodes.
pub(crate) fn distribute(host: &NodeRef) -> Vec<(NodeRef, Vec<NodeRef>)> {
	let Some(root) = host.local_root() else {
		return Vec::new();
	};
	let mut pool: Vec<Option<NodeRef>> =
		effective_child_nodes(host).into_iter().map(Some).collect();

	root.descendants()
		.into_iter()
		.filter(is_insertion_point)
		.map(|point| {
			let select = point
				.attribute("select")
				.filter(|select| !select.trim().is_empty())
				.map(|select| SelectorList::parse(&select));
			let mut taken = Vec::new();
			for slot in pool.iter_mut() {
				let Some(node) = slot.as_ref() else {
					continue;
				};
				let accepted = match &select {
					None => true,
					Some(Ok(list)) => list.matches(node),
					Some(Err(_)) => false,
				};
				if accepted {
					taken.extend(slot.take());
				}
			}
			(point, taken)
		})
		.collect()
}

/// Host whose local root contains `node`.
fn owning_host(node: &NodeRef) -> Option<NodeRef> {
	let mut current = node.parent();
	while let Some(ancestor) = current {
		if ancestor.kind() == NodeKind::Fragment {
			return ancestor.host();
		}
		current = ancestor.parent();
	}
	None
}

pub(crate) fn distributed_nodes(point: &NodeRef) -> Vec<NodeRef> {
	if !is_insertion_point(point) {
		return Vec::new();
	}
	let Some(host) = owning_host(point) else {
		return Vec::new();
	};
	distribute(&host)
		.into_iter()
		.find(|(candidate, _)| candidate == point)
		.map(|(_, nodes)| nodes)
		.unwrap_or_default()
}

pub(crate) fn destination_insertion_points(node: &NodeRef) -> Vec<NodeRef> {
	let mut points = Vec::new();
	let mut holder = node.parent();
	while let Some(host) = holder {
		let Some(point) = distribute(&host)
			.into_iter()
			.find(|(_, nodes)| nodes.contains(node))
			.map(|(point, _)| point)
		else {
			break;
		};
		holder = point.parent();
		points.push(point);
	}
	points
}

pub(crate) fn content_child_nodes(node: &NodeRef, selector: &str) -> Vec<NodeRef> {
	let selector = if selector.trim().is_empty() {
		"content"
	} else {
		selector
	};
	let Ok(list) = SelectorList::parse(selector) else {
		return Vec::new();
	};
	let scope = node.local_root().unwrap_or_else(|| node.clone());
	scope
		.descendants()
		.into_iter()
		.find(|candidate| list.matches(candidate))
		.map(|point| distributed_nodes(&point))
		.unwrap_or_default()
}

pub(crate) fn effective_child_nodes(node: &NodeRef) -> Vec<NodeRef> {
	node.children()
		.into_iter()
		.flat_map(|child| {
			if is_insertion_point(&child) {
				distributed_nodes(&child)
			} else {
				vec![child]
			}
		})
		.collect()
}

pub(crate) fn query_effective_children(node: &NodeRef, selector: &str) -> Vec<NodeRef> {
	let Ok(list) = SelectorList::parse(selector) else {
		return Vec::new();
	};
	effective_child_nodes(node)
		.into_iter()
		.filter(|child| list.matches(child))
		.collect()
}

/// Nodes an observer on `target` watches.
pub(crate) fn observed_nodes(target: &NodeRef) -> Vec<NodeRef> {
	if is_insertion_point(target) {
		distributed_nodes(target)
	} else {
		effective_child_nodes(target)
	}
}
