//! In-memory node tree backing the headless host.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};

use super::ListenerId;
use crate::host::{
	ClientRect, DOCUMENT_FRAGMENT_NODE, DOCUMENT_NODE, ELEMENT_NODE, EventHandler, TEXT_NODE,
};

/// Kind of a headless node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	/// The document node
	Document,
	/// An element
	Element,
	/// A text node
	Text,
	/// A local DOM root
	Fragment,
	/// The window; only ever used as an event target
	Window,
}

pub(crate) struct Registration {
	pub(crate) id: ListenerId,
	pub(crate) event: String,
	pub(crate) handler: Rc<RefCell<EventHandler<Value>>>,
}

pub(crate) struct NodeData {
	kind: NodeKind,
	name: String,
	attributes: Vec<(String, String)>,
	ns_attributes: Vec<(String, String, String)>,
	text: String,
	parent: Weak<RefCell<NodeData>>,
	children: Vec<NodeRef>,
	local_root: Option<NodeRef>,
	host: Weak<RefCell<NodeData>>,
	pub(crate) rect: ClientRect,
	pub(crate) properties: Map<String, Value>,
	pub(crate) listeners: Vec<Registration>,
}

/// Shared handle to a headless node. Equality is identity.
#[derive(Clone)]
pub struct NodeRef(Rc<RefCell<NodeData>>);

impl PartialEq for NodeRef {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.0.borrow();
		match data.kind {
			NodeKind::Text => write!(f, "NodeRef(#text {:?})", data.text),
			NodeKind::Element => match data.attributes.iter().find(|(name, _)| name == "id") {
				Some((_, id)) => write!(f, "NodeRef(<{} id={:?}>)", data.name, id),
				None => write!(f, "NodeRef(<{}>)", data.name),
			},
			_ => write!(f, "NodeRef({})", data.name),
		}
	}
}

impl NodeRef {
	pub(crate) fn new(kind: NodeKind, name: impl Into<String>) -> Self {
		Self(Rc::new(RefCell::new(NodeData {
			kind,
			name: name.into(),
			attributes: Vec::new(),
			ns_attributes: Vec::new(),
			text: String::new(),
			parent: Weak::new(),
			children: Vec::new(),
			local_root: None,
			host: Weak::new(),
			rect: ClientRect::default(),
			properties: Map::new(),
			listeners: Vec::new(),
		})))
	}

	pub(crate) fn element(tag: &str) -> Self {
		Self::new(NodeKind::Element, tag.to_ascii_uppercase())
	}

	pub(crate) fn text(text: &str) -> Self {
		let node = Self::new(NodeKind::Text, "#text");
		node.0.borrow_mut().text = text.to_string();
		node
	}

	pub(crate) fn data(&self) -> Ref<'_, NodeData> {
		self.0.borrow()
	}

	pub(crate) fn data_mut(&self) -> RefMut<'_, NodeData> {
		self.0.borrow_mut()
	}

	/// Kind of this node.
	pub fn kind(&self) -> NodeKind {
		self.0.borrow().kind
	}

	/// DOM `nodeType`; `0` for the window.
	pub fn node_type(&self) -> u16 {
		match self.kind() {
			NodeKind::Document => DOCUMENT_NODE,
			NodeKind::Element => ELEMENT_NODE,
			NodeKind::Text => TEXT_NODE,
			NodeKind::Fragment => DOCUMENT_FRAGMENT_NODE,
			NodeKind::Window => 0,
		}
	}

	/// DOM `nodeName`.
	pub fn node_name(&self) -> String {
		self.0.borrow().name.clone()
	}

	/// Returns true for element nodes.
	pub fn is_element(&self) -> bool {
		self.kind() == NodeKind::Element
	}

	/// Tag name of an element.
	pub fn tag(&self) -> Option<String> {
		let data = self.0.borrow();
		(data.kind == NodeKind::Element).then(|| data.name.clone())
	}

	/// Attribute value of an element.
	pub fn attribute(&self, name: &str) -> Option<String> {
		let name = name.to_ascii_lowercase();
		self.0
			.borrow()
			.attributes
			.iter()
			.find(|(key, _)| *key == name)
			.map(|(_, value)| value.clone())
	}

	/// Attribute value by namespace and local name. The empty namespace
	/// matches attributes set without one; local names are case-sensitive.
	pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<String> {
		let data = self.0.borrow();
		if namespace.is_empty() {
			return data
				.attributes
				.iter()
				.find(|(key, _)| key == name)
				.map(|(_, value)| value.clone());
		}
		data.ns_attributes
			.iter()
			.find(|(ns, key, _)| ns == namespace && key == name)
			.map(|(_, _, value)| value.clone())
	}

	pub(crate) fn set_attribute_ns(&self, namespace: &str, name: &str, value: &str) {
		if namespace.is_empty() {
			self.set_attribute(name, value);
			return;
		}
		let mut data = self.0.borrow_mut();
		data.ns_attributes
			.retain(|(ns, key, _)| ns != namespace || key != name);
		let entry = (namespace.to_string(), name.to_string(), value.to_string());
		data.ns_attributes.push(entry);
	}

	pub(crate) fn set_attribute(&self, name: &str, value: &str) {
		let name = name.to_ascii_lowercase();
		let mut data = self.0.borrow_mut();
		match data.attributes.iter_mut().find(|(key, _)| *key == name) {
			Some(entry) => entry.1 = value.to_string(),
			None => data.attributes.push((name, value.to_string())),
		}
	}

	pub(crate) fn remove_attribute(&self, name: &str) {
		let name = name.to_ascii_lowercase();
		self.0
			.borrow_mut()
			.attributes
			.retain(|(key, _)| *key != name);
	}

	/// Class names of an element.
	pub fn classes(&self) -> Vec<String> {
		self.attribute("class")
			.map(|class| class.split_whitespace().map(str::to_string).collect())
			.unwrap_or_default()
	}

	/// Parent node, if attached.
	pub fn parent(&self) -> Option<NodeRef> {
		self.0.borrow().parent.upgrade().map(NodeRef)
	}

	/// Parent node when it is an element.
	pub fn parent_element(&self) -> Option<NodeRef> {
		self.parent().filter(NodeRef::is_element)
	}

	/// Child nodes, in order.
	pub fn children(&self) -> Vec<NodeRef> {
		self.0.borrow().children.clone()
	}

	pub(crate) fn first_child(&self) -> Option<NodeRef> {
		self.0.borrow().children.first().cloned()
	}

	pub(crate) fn last_child(&self) -> Option<NodeRef> {
		self.0.borrow().children.last().cloned()
	}

	pub(crate) fn next_sibling(&self) -> Option<NodeRef> {
		self.sibling(1)
	}

	pub(crate) fn previous_sibling(&self) -> Option<NodeRef> {
		self.sibling(-1)
	}

	fn sibling(&self, offset: isize) -> Option<NodeRef> {
		let parent = self.parent()?;
		let index = parent.index_of(self)?;
		let target = index.checked_add_signed(offset)?;
		parent.0.borrow().children.get(target).cloned()
	}

	pub(crate) fn index_of(&self, child: &NodeRef) -> Option<usize> {
		self.0.borrow().children.iter().position(|c| c == child)
	}

	/// Local DOM root attached to this node.
	pub fn local_root(&self) -> Option<NodeRef> {
		self.0.borrow().local_root.clone()
	}

	/// Host of a local DOM root.
	pub fn host(&self) -> Option<NodeRef> {
		self.0.borrow().host.upgrade().map(NodeRef)
	}

	pub(crate) fn attach_local_root(&self) -> NodeRef {
		if let Some(root) = self.local_root() {
			return root;
		}
		let root = NodeRef::new(NodeKind::Fragment, "#document-fragment");
		root.0.borrow_mut().host = Rc::downgrade(&self.0);
		self.0.borrow_mut().local_root = Some(root.clone());
		root
	}

	/// Returns true if `self` is `other` or one of its ancestors.
	pub(crate) fn contains(&self, other: &NodeRef) -> bool {
		let mut current = Some(other.clone());
		while let Some(node) = current {
			if node == *self {
				return true;
			}
			current = node.parent();
		}
		false
	}

	pub(crate) fn detach(&self) {
		let Some(parent) = self.parent() else {
			return;
		};
		parent.0.borrow_mut().children.retain(|c| c != self);
		self.0.borrow_mut().parent = Weak::new();
	}

	/// Appends `child` after detaching it from its current parent.
	pub(crate) fn append(&self, child: &NodeRef) {
		let index = self.0.borrow().children.len();
		self.insert_at(index, child);
	}

	pub(crate) fn insert_at(&self, index: usize, child: &NodeRef) {
		child.detach();
		let mut data = self.0.borrow_mut();
		let index = index.min(data.children.len());
		data.children.insert(index, child.clone());
		child.0.borrow_mut().parent = Rc::downgrade(&self.0);
	}

	pub(crate) fn clear_children(&self) {
		let children = std::mem::take(&mut self.0.borrow_mut().children);
		for child in children {
			child.0.borrow_mut().parent = Weak::new();
		}
	}

	pub(crate) fn set_text(&self, text: &str) {
		self.0.borrow_mut().text = text.to_string();
	}

	/// Descendants in tree order, without entering local roots.
	pub(crate) fn descendants(&self) -> Vec<NodeRef> {
		let mut out = Vec::new();
		self.walk(false, &mut out);
		out
	}

	/// Descendants in tree order, local roots included after their host.
	pub(crate) fn composed_descendants(&self) -> Vec<NodeRef> {
		let mut out = Vec::new();
		self.walk(true, &mut out);
		out
	}

	fn walk(&self, enter_local_roots: bool, out: &mut Vec<NodeRef>) {
		for child in self.children() {
			out.push(child.clone());
			if enter_local_roots && let Some(root) = child.local_root() {
				root.walk(true, out);
			}
			child.walk(enter_local_roots, out);
		}
	}

	/// DOM `textContent`.
	pub fn text_content(&self) -> Option<String> {
		match self.kind() {
			NodeKind::Text => Some(self.0.borrow().text.clone()),
			NodeKind::Element | NodeKind::Fragment => Some(
				self.descendants()
					.iter()
					.filter(|n| n.kind() == NodeKind::Text)
					.map(|n| n.0.borrow().text.clone())
					.collect(),
			),
			NodeKind::Document | NodeKind::Window => None,
		}
	}

	pub(crate) fn has_listener(&self, id: ListenerId) -> bool {
		self.0.borrow().listeners.iter().any(|r| r.id == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const XLINK: &str = "http://www.w3.org/1999/xlink";

	fn tree() -> (NodeRef, NodeRef, NodeRef, NodeRef) {
		let root = NodeRef::element("div");
		let a = NodeRef::element("span");
		let b = NodeRef::text("hello");
		let c = NodeRef::element("p");
		root.append(&a);
		root.append(&b);
		a.append(&c);
		(root, a, b, c)
	}

	#[rstest]
	fn test_append_moves_node_between_parents() {
		let (root, a, _b, c) = tree();
		root.append(&c);
		assert!(a.children().is_empty());
		assert_eq!(root.last_child(), Some(c.clone()));
		assert_eq!(c.parent(), Some(root));
	}

	#[rstest]
	fn test_siblings() {
		let (root, a, b, _c) = tree();
		assert_eq!(a.next_sibling(), Some(b.clone()));
		assert_eq!(b.previous_sibling(), Some(a.clone()));
		assert_eq!(a.previous_sibling(), None);
		assert_eq!(root.next_sibling(), None);
	}

	#[rstest]
	fn test_contains_is_inclusive() {
		let (root, a, b, c) = tree();
		assert!(root.contains(&c));
		assert!(a.contains(&a));
		assert!(!b.contains(&root));
	}

	#[rstest]
	fn test_text_content_concatenates_descendants() {
		let (root, a, _b, c) = tree();
		c.append(&NodeRef::text("inner "));
		assert_eq!(root.text_content().as_deref(), Some("inner hello"));
		assert_eq!(a.text_content().as_deref(), Some("inner "));
	}

	#[rstest]
	fn test_descendants_skip_local_roots() {
		let (root, a, _b, _c) = tree();
		let local = a.attach_local_root();
		let shadowed = NodeRef::element("content");
		local.append(&shadowed);

		assert!(!root.descendants().contains(&shadowed));
		assert!(root.composed_descendants().contains(&shadowed));
		assert_eq!(local.host(), Some(a.clone()));
		assert_eq!(a.attach_local_root(), local);
	}

	#[rstest]
	fn test_attributes_are_case_insensitive() {
		let node = NodeRef::element("div");
		node.set_attribute("Data-Id", "7");
		assert_eq!(node.attribute("data-id").as_deref(), Some("7"));
		node.remove_attribute("DATA-ID");
		assert_eq!(node.attribute("data-id"), None);
	}

	#[rstest]
	fn test_namespaced_attributes_are_separate() {
		let node = NodeRef::element("svg");
		node.set_attribute("href", "#plain");
		node.set_attribute_ns(XLINK, "href", "#linked");

		assert_eq!(node.attribute_ns(XLINK, "href").as_deref(), Some("#linked"));
		assert_eq!(node.attribute_ns("", "href").as_deref(), Some("#plain"));
		assert_eq!(node.attribute_ns(XLINK, "HREF"), None);
		assert_eq!(node.attribute("href").as_deref(), Some("#plain"));
	}
}
