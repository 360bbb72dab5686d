//! Plain node handles.
//!
//! Node lists coming back from the shim (child nodes, distributed nodes,
//! observation batches) hold text as well as elements, so they are returned
//! as [`Node`] rather than wrapped. [`Node::as_element`] wraps on demand.

use crate::dom_api::DomApi;
use crate::element::{Element, WrappedElement};
use crate::host::{
	COMMENT_NODE, DOCUMENT_FRAGMENT_NODE, DOCUMENT_NODE, DomHost, ELEMENT_NODE, Host, RawNode,
	TEXT_NODE,
};

/// DOM node kind, from `nodeType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	/// Element node
	Element,
	/// Text node
	Text,
	/// Comment node
	Comment,
	/// Document node
	Document,
	/// Document fragment, including local DOM roots
	DocumentFragment,
	/// Any other `nodeType`
	Other(u16),
}

impl From<u16> for NodeKind {
	fn from(node_type: u16) -> Self {
		match node_type {
			ELEMENT_NODE => Self::Element,
			TEXT_NODE => Self::Text,
			COMMENT_NODE => Self::Comment,
			DOCUMENT_NODE => Self::Document,
			DOCUMENT_FRAGMENT_NODE => Self::DocumentFragment,
			other => Self::Other(other),
		}
	}
}

/// An unwrapped DOM node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
	raw: RawNode,
}

impl Node {
	/// Wraps a raw host node handle.
	pub fn from_raw(raw: RawNode) -> Self {
		Self { raw }
	}

	/// The raw host node.
	pub fn raw(&self) -> &RawNode {
		&self.raw
	}

	/// Consumes the handle and returns the raw host node.
	pub fn into_raw(self) -> RawNode {
		self.raw
	}

	/// DOM `nodeType`.
	pub fn node_type(&self) -> u16 {
		Host::node_type(&self.raw)
	}

	/// Kind derived from `nodeType`.
	pub fn kind(&self) -> NodeKind {
		NodeKind::from(self.node_type())
	}

	/// Returns true for element nodes.
	pub fn is_element(&self) -> bool {
		self.kind() == NodeKind::Element
	}

	/// DOM `nodeName`.
	pub fn node_name(&self) -> String {
		Host::node_name(&self.raw)
	}

	/// DOM `textContent`.
	pub fn text_content(&self) -> Option<String> {
		Host::raw_text_content(&self.raw)
	}

	/// Wraps the node if it is an element.
	pub fn as_element(&self) -> Option<Element> {
		self.is_element()
			.then(|| DomApi::current().wrap_raw(self.raw.clone()))
	}
}

impl From<RawNode> for Node {
	fn from(raw: RawNode) -> Self {
		Self::from_raw(raw)
	}
}

pub(crate) fn nodes(raw: Vec<RawNode>) -> Vec<Node> {
	raw.into_iter().map(Node::from_raw).collect()
}

/// Anything that can be handed to a DOM call as a node argument.
///
/// Wrapped handles are unwrapped to the underlying node before the call.
pub trait AsRawNode {
	/// The underlying node.
	fn as_raw_node(&self) -> &RawNode;
}

impl AsRawNode for RawNode {
	fn as_raw_node(&self) -> &RawNode {
		self
	}
}

impl AsRawNode for Node {
	fn as_raw_node(&self) -> &RawNode {
		&self.raw
	}
}

impl AsRawNode for WrappedElement {
	fn as_raw_node(&self) -> &RawNode {
		self.unwrapped()
	}
}

impl AsRawNode for Element {
	fn as_raw_node(&self) -> &RawNode {
		self.unwrapped()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(1, NodeKind::Element)]
	#[case(3, NodeKind::Text)]
	#[case(8, NodeKind::Comment)]
	#[case(9, NodeKind::Document)]
	#[case(11, NodeKind::DocumentFragment)]
	#[case(7, NodeKind::Other(7))]
	fn test_node_kind_from_node_type(#[case] node_type: u16, #[case] expected: NodeKind) {
		assert_eq!(NodeKind::from(node_type), expected);
	}
}
